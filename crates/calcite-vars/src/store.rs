//! Session-scoped variable registry: kind factories, reference table, and
//! the eager-fetch policy gate.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use calcite_repl::Repl;
use tokio::task::JoinSet;

use crate::constants::{CHUNK_SIZE, DEFAULT_CHUNK_PREFETCH};
use crate::query;
use crate::variable::{VarKind, Variable};
use crate::Result;

/// Registry and reference table for one debug session.
///
/// Kinds are registered once during setup and scanned in registration order;
/// the first whose `matches` accepts the engine type wins, with one
/// designated fallback tried last. The reference table is append-only and
/// only ever reset wholesale at session/step boundaries.
pub struct VariableStore {
    kinds: Vec<Arc<dyn VarKind>>,
    fallback: Option<Arc<dyn VarKind>>,
    refs: Mutex<Vec<Variable>>,
    chunk_prefetch: AtomicUsize,
    evaluate_ans: AtomicBool,
}

impl VariableStore {
    pub fn new() -> Self {
        Self {
            kinds: Vec::new(),
            fallback: None,
            refs: Mutex::new(Vec::new()),
            chunk_prefetch: AtomicUsize::new(DEFAULT_CHUNK_PREFETCH),
            evaluate_ans: AtomicBool::new(false),
        }
    }

    /// Register a kind factory. Setup-time only; order is dispatch order.
    pub fn register(&mut self, kind: Arc<dyn VarKind>) {
        self.kinds.push(kind);
    }

    /// Register the kind tried when no other matches.
    pub fn register_fallback(&mut self, kind: Arc<dyn VarKind>) {
        self.fallback = Some(kind);
    }

    /// Chunks of prefetch allowed per value; non-positive values are ignored.
    pub fn set_chunk_prefetch(&self, chunks: usize) {
        if chunks > 0 {
            self.chunk_prefetch.store(chunks, Ordering::Relaxed);
        }
    }

    pub fn max_elements_prefetch(&self) -> usize {
        self.chunk_prefetch.load(Ordering::Relaxed) * CHUNK_SIZE
    }

    /// Whether the implicit result variable `ans` participates in listings.
    pub fn set_evaluate_ans(&self, enabled: bool) {
        self.evaluate_ans.store(enabled, Ordering::Relaxed);
    }

    fn skip_variable(&self, name: &str) -> bool {
        !self.evaluate_ans.load(Ordering::Relaxed) && name == "ans"
    }

    /// Expose `variable` to the front-end for later child expansion.
    /// References start at 1 and increase strictly for the table's lifetime.
    pub fn add_reference_to(&self, variable: &mut Variable) {
        let mut refs = self.lock_refs();
        let reference = refs.len() as i64 + 1;
        variable.set_reference(reference);
        refs.push(variable.clone());
    }

    /// Bounds-checked table lookup. Invalid references are logged and yield
    /// `None`, never a panic.
    pub fn get_by_reference(&self, reference: i64) -> Option<Variable> {
        if reference > 0 {
            let refs = self.lock_refs();
            if let Some(variable) = refs.get(reference as usize - 1) {
                return Some(variable.clone());
            }
        }
        tracing::error!(reference, "invalid variable reference");
        None
    }

    /// Reset the table at a session or step boundary.
    pub fn clear_references(&self) {
        self.lock_refs().clear();
    }

    /// Page through a referenced variable's children. An invalid reference
    /// logs and produces an empty page.
    pub async fn list_by_reference(
        self: &Arc<Self>,
        repl: &Arc<dyn Repl>,
        reference: i64,
        count: u32,
        start: u32,
    ) -> Result<Vec<Variable>> {
        match self.get_by_reference(reference) {
            Some(variable) => variable.list_children(repl, self, count, start).await,
            None => Ok(Vec::new()),
        }
    }

    /// The type-dispatch algorithm: query the declared type, then let the
    /// first matching kind load the variable. Exactly one kind's `load`
    /// runs, or none. The implicit result variable is skipped without any
    /// engine round-trip while the evaluate-ans flag is off.
    pub async fn load_variable(
        self: &Arc<Self>,
        repl: &Arc<dyn Repl>,
        name: &str,
    ) -> Result<Option<Variable>> {
        if self.skip_variable(name) {
            return Ok(None);
        }

        let ty = query::get_type(repl.as_ref(), name).await?;
        for kind in &self.kinds {
            if kind.matches(&ty) {
                return kind.load(name, &ty, repl, self).await.map(Some);
            }
        }
        if let Some(fallback) = &self.fallback {
            if fallback.matches(&ty) {
                return fallback.load(name, &ty, repl, self).await.map(Some);
            }
        }
        Ok(None)
    }

    /// Resolve every name concurrently, gathering results as the individual
    /// loads complete. Ordering follows completion, not `names`. Names that
    /// resolve to nothing are skipped, logged unless it is the intentional
    /// `ans` skip.
    pub async fn list_variables(
        self: &Arc<Self>,
        repl: &Arc<dyn Repl>,
        names: Vec<String>,
    ) -> Vec<Variable> {
        let mut loads = JoinSet::new();
        for name in names {
            let store = Arc::clone(self);
            let repl = Arc::clone(repl);
            loads.spawn(async move {
                let loaded = store.load_variable(&repl, &name).await;
                (name, loaded)
            });
        }

        let mut variables = Vec::new();
        while let Some(joined) = loads.join_next().await {
            match joined {
                Ok((_, Ok(Some(variable)))) => variables.push(variable),
                Ok((name, Ok(None))) => {
                    if !self.skip_variable(&name) {
                        tracing::error!(name = %name, "could not load variable");
                    }
                }
                Ok((name, Err(e))) => {
                    tracing::error!(name = %name, error = %e, "variable load failed");
                }
                Err(e) => {
                    tracing::error!(error = %e, "variable load task panicked");
                }
            }
        }
        variables
    }

    /// Whether a value of the given dimensions is small enough to fetch
    /// eagerly. With `count > 0` (batched child listing) only vectors
    /// qualify and the bound covers `count` batches.
    pub fn loadable(&self, sizes: &[u64], count: u64) -> bool {
        loadable_within(sizes, count, self.max_elements_prefetch() as u64)
    }

    fn lock_refs(&self) -> MutexGuard<'_, Vec<Variable>> {
        match self.refs.lock() {
            Ok(refs) => refs,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for VariableStore {
    fn default() -> Self {
        Self::new()
    }
}

fn loadable_within(sizes: &[u64], count: u64, max: u64) -> bool {
    let elements: u64 = sizes.iter().product();
    if count != 0 {
        sizes.len() <= 1 && elements.saturating_mul(count) <= max
    } else {
        sizes.len() <= 2 && elements <= max
    }
}
