//! Fixed-template diagnostic commands and echo-stripping helpers.
//!
//! Each query sends one command and parses a single collapsed-line response.
//! The engine echoes values as `<name> = <value>` or `ans = <value>`,
//! optionally with a blank line before the value; the helpers here strip
//! those echoes before further parsing.

use calcite_repl::Repl;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::{Error, Result};

static ANS_ECHO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ans =\s*").expect("static pattern"));

/// The declared type of `name`, via `typeinfo(...)`.
pub async fn get_type(repl: &dyn Repl, name: &str) -> Result<String> {
    let output = repl.evaluate_line(&format!("typeinfo({})", name)).await?;
    Ok(clean(&output))
}

/// The textual value of `name`, its own echo stripped.
pub async fn get_value(repl: &dyn Repl, name: &str) -> Result<String> {
    let output = repl.evaluate_line(name).await?;
    Ok(remove_name(name, &output))
}

/// Array dimensions of `name`, via `size(...)`.
pub async fn get_size(repl: &dyn Repl, name: &str) -> Result<Vec<u64>> {
    let output = repl.evaluate_line(&format!("size({})", name)).await?;
    clean(&output)
        .split_whitespace()
        .map(|token| {
            token
                .parse::<u64>()
                .map_err(|_| Error::Parse(format!("size({}) yielded '{}'", name, token)))
        })
        .collect()
}

/// Number of nonzero elements of `name`, via `nnz(...)`.
pub async fn get_non_zero(repl: &dyn Repl, name: &str) -> Result<u64> {
    let output = repl.evaluate_line(&format!("nnz({})", name)).await?;
    let cleaned = clean(&output);
    cleaned
        .parse::<u64>()
        .map_err(|_| Error::Parse(format!("nnz({}) yielded '{}'", name, cleaned)))
}

/// Assign `value` to `name`, then read the stored value back.
pub async fn set_variable(repl: &dyn Repl, name: &str, value: &str) -> Result<String> {
    let result = repl.evaluate_line(&format!("{} = {}", name, value)).await?;
    tracing::debug!(name = %name, result = %result, "assignment result");
    get_value(repl, name).await
}

/// Strip a leading `ans = ` echo and surrounding whitespace.
pub fn clean(value: &str) -> String {
    ANS_ECHO.replace(value, "").trim().to_string()
}

/// Strip the variable's own echo (`<name> =` or `ans =`, optionally followed
/// by a blank line) and trim. `name` is user-controlled, so its regex
/// metacharacters are escaped before the pattern is built.
pub fn remove_name(name: &str, value: &str) -> String {
    let pattern = format!(r"^(?:ans|{}) =(?:\n\n)?\s*", regex::escape(name));
    match Regex::new(&pattern) {
        Ok(re) => re.replace(value, "").trim().to_string(),
        Err(_) => value.trim().to_string(),
    }
}
