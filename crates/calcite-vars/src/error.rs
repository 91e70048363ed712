//! Error types for the variable layer.

/// Errors that can occur while loading or querying variables.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The underlying channel failed.
    #[error(transparent)]
    Repl(#[from] calcite_repl::Error),

    /// The engine answered a diagnostic command with something unparsable.
    #[error("unparsable engine response: {0}")]
    Parse(String),
}
