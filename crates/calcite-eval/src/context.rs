//! Evaluation contexts as supplied by the debugger front-end.

/// Where an evaluation request came from, which decides how aggressively
/// the expression is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalContext {
    /// Console input: pass through, never intercept the response.
    Console,
    /// Watch expression: structured load preferred.
    Watch,
    /// Hover: must stay side-effect free.
    Hover,
    /// Anything else: force a raw evaluation.
    Generic,
}

impl EvalContext {
    /// Map the front-end protocol's optional context tag. Unknown or absent
    /// tags get the generic treatment.
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("repl") => EvalContext::Console,
            Some("watch") => EvalContext::Watch,
            Some("hover") => EvalContext::Hover,
            _ => EvalContext::Generic,
        }
    }
}
