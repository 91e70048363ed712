//! Error types for expression evaluation.

/// Errors that can occur while evaluating an expression.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The underlying channel failed.
    #[error(transparent)]
    Repl(#[from] calcite_repl::Error),

    /// The variable layer failed.
    #[error(transparent)]
    Vars(#[from] calcite_vars::Error),
}
