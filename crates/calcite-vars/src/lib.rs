//! Typed variable model over the REPL engine's textual session output.
//!
//! Free-text engine output becomes [`Variable`] instances through an ordered
//! registry of [`VarKind`] factories (first type match wins, with one
//! designated fallback). Variables that may have children get a stable
//! reference number so a debugger front-end can expand them lazily through
//! the [`VariableStore`] reference table.

mod constants;
mod error;
pub mod query;
mod scalar;
mod scope;
mod store;
mod variable;

pub use constants::{CHUNK_SIZE, DEFAULT_CHUNK_PREFETCH};
pub use error::Error;
pub use scalar::Scalar;
pub use scope::Scope;
pub use store::VariableStore;
pub use variable::{VarKind, Variable};

/// Result type for variable operations.
pub type Result<T> = std::result::Result<T, Error>;
