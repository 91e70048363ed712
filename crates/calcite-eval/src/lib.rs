//! Per-context expression evaluation policy.
//!
//! The front-end hands over an expression string and a context tag; the
//! policy decides how aggressively to evaluate it. Console input passes
//! through untouched, hovers stay side-effect free (a function reference is
//! never invoked just to display it), and oversized containers degrade to a
//! dimension placeholder instead of a huge fetch.

mod context;
mod error;
mod evaluator;

pub use context::EvalContext;
pub use error::Error;
pub use evaluator::{Classification, Evaluator};

/// Sentinel surfaced when an expression has no classification at all.
pub const EVAL_UNDEFINED: &str = "undefined";

/// Separator for the dimension placeholder of values too large to fetch.
pub const SIZE_SEPARATOR: &str = "x";

/// Result type for evaluation operations.
pub type Result<T> = std::result::Result<T, Error>;
