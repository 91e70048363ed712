//! Scalar: the universal last-resort leaf representation.

use std::sync::Arc;

use async_trait::async_trait;
use calcite_repl::Repl;

use crate::query;
use crate::store::VariableStore;
use crate::variable::{VarKind, Variable};
use crate::Result;

/// Any value can be shown as its textual form, so `Scalar` matches every
/// type and is registered as the store's fallback.
pub struct Scalar;

#[async_trait]
impl VarKind for Scalar {
    fn typename(&self) -> &'static str {
        "scalar"
    }

    fn matches(&self, _ty: &str) -> bool {
        true
    }

    async fn load(
        &self,
        name: &str,
        _ty: &str,
        repl: &Arc<dyn Repl>,
        _store: &Arc<VariableStore>,
    ) -> Result<Variable> {
        let value = query::get_value(repl.as_ref(), name).await?;
        Ok(Variable::new(name, value, Arc::new(Scalar)))
    }

    async fn list_children(
        &self,
        _var: &Variable,
        _repl: &Arc<dyn Repl>,
        _store: &Arc<VariableStore>,
        _count: u32,
        _start: u32,
    ) -> Result<Vec<Variable>> {
        // Scalars have no children.
        Ok(Vec::new())
    }
}
