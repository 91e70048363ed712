//! Integration tests for the evaluation policy against a scripted engine.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use calcite_repl::Repl;
use calcite_vars::{Scalar, VariableStore};
use calcite_eval::{EvalContext, Evaluator, EVAL_UNDEFINED};

struct ScriptedRepl {
    responses: HashMap<String, Vec<String>>,
    executed: Mutex<Vec<String>>,
    evaluated: Mutex<Vec<String>>,
}

impl ScriptedRepl {
    fn new(entries: &[(&str, &[&str])]) -> Arc<Self> {
        let responses = entries
            .iter()
            .map(|(cmd, lines)| {
                (
                    cmd.to_string(),
                    lines.iter().map(|l| l.to_string()).collect(),
                )
            })
            .collect();
        Arc::new(Self {
            responses,
            executed: Mutex::new(Vec::new()),
            evaluated: Mutex::new(Vec::new()),
        })
    }

    fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }

    fn evaluated(&self) -> Vec<String> {
        self.evaluated.lock().unwrap().clone()
    }
}

#[async_trait]
impl Repl for ScriptedRepl {
    async fn execute(&self, text: &str) -> calcite_repl::Result<()> {
        self.executed.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn evaluate(&self, text: &str) -> calcite_repl::Result<Vec<String>> {
        self.evaluated.lock().unwrap().push(text.to_string());
        Ok(self.responses.get(text).cloned().unwrap_or_default())
    }
}

fn evaluator_with_scalar(scripted: &Arc<ScriptedRepl>) -> Evaluator {
    let mut store = VariableStore::new();
    store.register_fallback(Arc::new(Scalar));
    Evaluator::new(Arc::new(store), Arc::clone(scripted) as Arc<dyn Repl>)
}

fn evaluator_without_kinds(scripted: &Arc<ScriptedRepl>) -> Evaluator {
    Evaluator::new(
        Arc::new(VariableStore::new()),
        Arc::clone(scripted) as Arc<dyn Repl>,
    )
}

#[tokio::test]
async fn console_input_passes_through_without_readback() {
    let scripted = ScriptedRepl::new(&[]);
    let eval = evaluator_with_scalar(&scripted);

    let info = eval
        .evaluate("pause(10)", EvalContext::Console)
        .await
        .expect("evaluate failed");
    assert_eq!(info, "");
    assert_eq!(scripted.executed(), vec!["pause(10)"]);
    assert!(scripted.evaluated().is_empty());
}

#[tokio::test]
async fn unclassifiable_expression_reports_the_sentinel() {
    let scripted = ScriptedRepl::new(&[("which foo", &[])]);
    let eval = evaluator_with_scalar(&scripted);

    let info = eval
        .evaluate("foo", EvalContext::Hover)
        .await
        .expect("evaluate failed");
    assert_eq!(info, EVAL_UNDEFINED);
}

#[tokio::test]
async fn hovering_a_function_returns_classification_verbatim() {
    let scripted = ScriptedRepl::new(&[(
        "which sind",
        &["'sind' is a built-in function"],
    )]);
    let eval = evaluator_with_scalar(&scripted);

    let info = eval
        .evaluate("sind", EvalContext::Hover)
        .await
        .expect("evaluate failed");
    assert_eq!(info, "'sind' is a built-in function");
    // The function must not have been evaluated: only the `which` query ran.
    assert_eq!(scripted.evaluated(), vec!["which sind"]);
}

#[tokio::test]
async fn hovering_a_script_file_is_also_side_effect_free() {
    let scripted = ScriptedRepl::new(&[(
        "which myscript",
        &["'myscript' is the file /home/user/myscript.m"],
    )]);
    let eval = evaluator_with_scalar(&scripted);

    let info = eval
        .evaluate("myscript", EvalContext::Hover)
        .await
        .expect("evaluate failed");
    assert_eq!(info, "'myscript' is the file /home/user/myscript.m");
    assert_eq!(scripted.evaluated(), vec!["which myscript"]);
}

#[tokio::test]
async fn hovering_a_variable_loads_its_value() {
    let scripted = ScriptedRepl::new(&[
        ("which x", &["'x' is a variable"]),
        ("typeinfo(x)", &["ans = double"]),
        ("x", &["x = 3"]),
    ]);
    let eval = evaluator_with_scalar(&scripted);

    let info = eval
        .evaluate("x", EvalContext::Hover)
        .await
        .expect("evaluate failed");
    assert_eq!(info, "3");
}

#[tokio::test]
async fn generic_context_forces_raw_evaluation() {
    let scripted = ScriptedRepl::new(&[
        ("which x", &["'x' is a variable"]),
        ("x", &["x =", "", "  3"]),
    ]);
    let eval = evaluator_with_scalar(&scripted);

    let info = eval
        .evaluate("x", EvalContext::Generic)
        .await
        .expect("evaluate failed");
    assert_eq!(info, "3");
}

#[tokio::test]
async fn watch_loads_structured_value() {
    let scripted = ScriptedRepl::new(&[
        ("typeinfo(x)", &["ans = double"]),
        ("x", &["x = 42"]),
    ]);
    let eval = evaluator_with_scalar(&scripted);

    let info = eval
        .evaluate("x", EvalContext::Watch)
        .await
        .expect("evaluate failed");
    assert_eq!(info, "42");
}

#[tokio::test]
async fn oversized_value_degrades_to_dimension_string() {
    // No kind claims the type, and 1000x1000 is far past the default
    // prefetch bound, so only the shape is reported.
    let scripted = ScriptedRepl::new(&[
        ("typeinfo(m)", &["ans = matrix"]),
        ("size(m)", &["ans =", "", "   1000   1000"]),
    ]);
    let eval = evaluator_without_kinds(&scripted);

    let info = eval
        .evaluate("m", EvalContext::Watch)
        .await
        .expect("evaluate failed");
    assert_eq!(info, "1000x1000");
    assert!(!scripted.evaluated().contains(&"m".to_string()));
}

#[tokio::test]
async fn small_unclaimed_value_is_fetched_raw() {
    let scripted = ScriptedRepl::new(&[
        ("typeinfo(v)", &["ans = matrix"]),
        ("size(v)", &["ans = 1 3"]),
        ("v", &["v =", "", "  1  2  3"]),
    ]);
    let eval = evaluator_without_kinds(&scripted);

    let info = eval
        .evaluate("v", EvalContext::Watch)
        .await
        .expect("evaluate failed");
    assert_eq!(info, "1  2  3");
}

#[tokio::test]
async fn classify_extracts_type_from_which_output() {
    let scripted = ScriptedRepl::new(&[(
        "which foo",
        &["'foo' is a built-in function"],
    )]);
    let eval = evaluator_with_scalar(&scripted);

    let class = eval.classify("foo").await.expect("classify failed");
    assert_eq!(class.value.as_deref(), Some("'foo' is a built-in function"));
    assert_eq!(class.ty.as_deref(), Some("function"));
}

#[tokio::test]
async fn classify_records_weak_signal_for_unparsed_output() {
    let scripted = ScriptedRepl::new(&[("which s", &["warning: shadowed"])]);
    let eval = evaluator_with_scalar(&scripted);

    let class = eval.classify("s").await.expect("classify failed");
    assert_eq!(class.value.as_deref(), Some(""));
    assert!(class.ty.is_none());
}

#[tokio::test]
async fn classify_strips_a_stray_leading_quote() {
    let scripted = ScriptedRepl::new(&[(
        "which abc",
        &["'abc' is a variable"],
    )]);
    let eval = evaluator_with_scalar(&scripted);

    let class = eval.classify("'abc").await.expect("classify failed");
    assert_eq!(class.ty.as_deref(), Some("variable"));
}
