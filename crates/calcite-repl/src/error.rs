//! Error types for the REPL channel.

/// Errors that can occur while driving the REPL channel.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Writing to or reading from the engine failed.
    #[error("channel I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A request's deadline elapsed before the engine echoed its sync marker.
    #[error("request timed out waiting for the engine")]
    Timeout,

    /// The engine hung up; queued and future requests cannot complete.
    #[error("channel closed")]
    ChannelClosed,
}
