//! Serial channel driver for an interactive mathematics REPL.
//!
//! The engine speaks one ordered, unframed text stream. This crate imposes
//! request/response framing on it: every command is paired with a sync
//! marker the engine echoes back once it has flushed the command's real
//! output, and incoming lines are attributed to outstanding requests in
//! strict FIFO order.

mod channel;
mod error;
mod marker;
mod repl;

pub use channel::ReplChannel;
pub use error::Error;
pub use marker::{MarkerCounter, SyncMarker};
pub use repl::Repl;

/// Result type for channel operations.
pub type Result<T> = std::result::Result<T, Error>;
