//! The variable model: one concrete struct, behavior injected per kind.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use calcite_repl::Repl;

use crate::store::VariableStore;
use crate::Result;

/// Behavior of one variable variant: type matching, loading, and child
/// enumeration. Kind instances double as factories in the store's registry.
#[async_trait]
pub trait VarKind: Send + Sync {
    /// Static tag identifying the variant.
    fn typename(&self) -> &'static str;

    /// Whether this kind handles values of the engine type `ty`. Must be
    /// pure and total; it runs during dispatch for every registered kind.
    fn matches(&self, ty: &str) -> bool;

    /// Materialize a variable named `name`, whose engine type `ty` already
    /// matched. May issue engine queries.
    async fn load(
        &self,
        name: &str,
        ty: &str,
        repl: &Arc<dyn Repl>,
        store: &Arc<VariableStore>,
    ) -> Result<Variable>;

    /// Produce one page of children. `start` is a zero-based offset and
    /// `count` a bounded length for kinds whose children come in chunks.
    /// Kinds with no children return an empty page with no engine round-trip.
    async fn list_children(
        &self,
        var: &Variable,
        repl: &Arc<dyn Repl>,
        store: &Arc<VariableStore>,
        count: u32,
        start: u32,
    ) -> Result<Vec<Variable>>;
}

/// A named, typed value surfaced to the debugger front-end.
#[derive(Clone)]
pub struct Variable {
    name: String,
    value: String,
    reference: i64,
    kind: Arc<dyn VarKind>,
}

impl Variable {
    /// A freshly loaded variable; no reference until the store assigns one.
    pub fn new(name: impl Into<String>, value: impl Into<String>, kind: Arc<dyn VarKind>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            reference: 0,
            kind,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Positive once assigned by the store, 0 while unset.
    pub fn reference(&self) -> i64 {
        self.reference
    }

    pub fn typename(&self) -> &'static str {
        self.kind.typename()
    }

    pub(crate) fn set_reference(&mut self, reference: i64) {
        self.reference = reference;
    }

    /// Delegate child enumeration to this variable's kind.
    pub async fn list_children(
        &self,
        repl: &Arc<dyn Repl>,
        store: &Arc<VariableStore>,
        count: u32,
        start: u32,
    ) -> Result<Vec<Variable>> {
        self.kind.list_children(self, repl, store, count, start).await
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variable")
            .field("name", &self.name)
            .field("value", &self.value)
            .field("reference", &self.reference)
            .field("typename", &self.typename())
            .finish()
    }
}
