//! The evaluator: dispatches an expression according to its context.

use std::sync::Arc;

use calcite_repl::Repl;
use calcite_vars::{query, VariableStore};
use regex::Regex;

use crate::context::EvalContext;
use crate::{Result, EVAL_UNDEFINED, SIZE_SEPARATOR};

/// What the engine's `which` introspection said about an expression.
///
/// `value` is the full matched line when type extraction succeeded, the
/// empty string when the engine returned *something* non-empty that did not
/// parse, and `None` when nothing came back at all.
#[derive(Debug, Clone, Default)]
pub struct Classification {
    pub value: Option<String>,
    pub ty: Option<String>,
}

impl Classification {
    fn is_undefined(&self) -> bool {
        self.value.is_none() && self.ty.is_none()
    }
}

/// Session-scoped evaluation policy over the variable store and channel.
pub struct Evaluator {
    store: Arc<VariableStore>,
    repl: Arc<dyn Repl>,
}

impl Evaluator {
    pub fn new(store: Arc<VariableStore>, repl: Arc<dyn Repl>) -> Self {
        Self { store, repl }
    }

    /// Evaluate `expression` the way its context demands.
    pub async fn evaluate(&self, expression: &str, ctx: EvalContext) -> Result<String> {
        match ctx {
            EvalContext::Console => {
                // Fire and forget: the engine's output lands on the console
                // anyway, and intercepting it here would break pause/input.
                self.repl.execute(expression).await?;
                Ok(String::new())
            }
            EvalContext::Watch => self.load_as_variable(expression).await,
            EvalContext::Hover | EvalContext::Generic => {
                let class = self.classify(expression).await?;
                if class.is_undefined() {
                    return Ok(EVAL_UNDEFINED.to_string());
                }
                if ctx == EvalContext::Hover {
                    self.handle_hover(expression, class).await
                } else {
                    self.force_evaluate(expression).await
                }
            }
        }
    }

    /// Hovering a function or script file must not invoke it; the
    /// classification text is returned verbatim instead of evaluating.
    pub async fn handle_hover(
        &self,
        expression: &str,
        class: Classification,
    ) -> Result<String> {
        if matches!(class.ty.as_deref(), Some("file") | Some("function")) {
            Ok(class.value.unwrap_or_default())
        } else {
            self.load_as_variable(expression).await
        }
    }

    /// Structured load first; when no kind claims the expression, fetch it
    /// raw only if its shape passes the loadable policy, otherwise hand back
    /// a dimension placeholder.
    pub async fn load_as_variable(&self, expression: &str) -> Result<String> {
        match self.store.load_variable(&self.repl, expression).await? {
            Some(variable) => Ok(variable.value().to_string()),
            None => {
                let size = query::get_size(self.repl.as_ref(), expression).await?;
                if self.store.loadable(&size, 0) {
                    self.force_evaluate(expression).await
                } else {
                    Ok(size
                        .iter()
                        .map(u64::to_string)
                        .collect::<Vec<_>>()
                        .join(SIZE_SEPARATOR))
                }
            }
        }
    }

    /// Raw single-line evaluation with the echo stripped.
    pub async fn force_evaluate(&self, expression: &str) -> Result<String> {
        let output = self.repl.evaluate_line(expression).await?;
        Ok(query::remove_name(expression, &output))
    }

    /// Classify `expression` via the engine's `which` introspection.
    pub async fn classify(&self, expression: &str) -> Result<Classification> {
        // A stray unterminated quote would confuse the type pattern.
        let expression = match expression.strip_prefix('\'') {
            Some(rest) if !rest.contains('\'') => rest,
            _ => expression,
        };

        let pattern = format!(
            r"^.*'{}' is (?:a|the) (?:built-in )?(\S+).*$",
            regex::escape(expression)
        );
        let type_line = match Regex::new(&pattern) {
            Ok(re) => re,
            Err(e) => {
                tracing::error!(error = %e, "bad type pattern");
                return Ok(Classification::default());
            }
        };

        let lines = self.repl.evaluate(&format!("which {}", expression)).await?;
        let mut class = Classification::default();
        for line in &lines {
            if let Some(captures) = type_line.captures(line) {
                class.value = Some(line.clone());
                class.ty = captures.get(1).map(|m| m.as_str().to_string());
            } else if class.value.is_none() && !line.is_empty() {
                // Weaker signal: the engine said something, even if the
                // type could not be extracted.
                class.value = Some(String::new());
            }
        }
        Ok(class)
    }
}
