//! Scope: the active variable frame, listed via the engine's `who` command.

use std::sync::Arc;

use async_trait::async_trait;
use calcite_repl::Repl;

use crate::store::VariableStore;
use crate::variable::{VarKind, Variable};
use crate::Result;

const SCOPE_HEADER: &str = "Variables in the current scope:";

/// A scope is constructed directly for a stack frame, never through type
/// dispatch, so it refuses every engine type.
pub struct Scope;

impl Scope {
    /// A scope variable for the frame named `name` (e.g. `local`).
    pub fn variable(name: impl Into<String>) -> Variable {
        Variable::new(name, "", Arc::new(Scope))
    }
}

#[async_trait]
impl VarKind for Scope {
    fn typename(&self) -> &'static str {
        "scope"
    }

    fn matches(&self, _ty: &str) -> bool {
        false
    }

    async fn load(
        &self,
        name: &str,
        _ty: &str,
        _repl: &Arc<dyn Repl>,
        _store: &Arc<VariableStore>,
    ) -> Result<Variable> {
        Ok(Scope::variable(name))
    }

    /// Lists the whole scope; `count`/`start` are ignored. The channel's
    /// sync marker bounds the `who` output, so all that remains here is
    /// recognizing the header and resolving the accumulated names.
    async fn list_children(
        &self,
        var: &Variable,
        repl: &Arc<dyn Repl>,
        store: &Arc<VariableStore>,
        _count: u32,
        _start: u32,
    ) -> Result<Vec<Variable>> {
        let lines = repl.evaluate(&format!("who {}", var.name())).await?;
        let names = parse_scope_listing(&lines);
        if names.is_empty() {
            return Ok(Vec::new());
        }
        Ok(store.list_variables(repl, names).await)
    }
}

/// Extract variable names from a framed `who` response: everything before
/// the header line is ignored, everything after it is one space-separated
/// name list. No header means an empty scope.
fn parse_scope_listing(lines: &[String]) -> Vec<String> {
    let mut names = String::new();
    let mut seen_header = false;
    for line in lines {
        let line = line.strip_prefix("debug> ").unwrap_or(line);
        if seen_header {
            names.push(' ');
            names.push_str(line);
        } else if line.trim() == SCOPE_HEADER {
            seen_header = true;
        }
    }
    names.split_whitespace().map(str::to_string).collect()
}
