//! The channel contract the variable and expression layers program against.

use async_trait::async_trait;

use crate::Result;

/// A serial command channel to the REPL engine.
///
/// Implementations must preserve the ordering contract: responses arrive in
/// the order commands were sent. Everything above this trait relies on it to
/// attribute output to the right request.
#[async_trait]
pub trait Repl: Send + Sync {
    /// Send a command without tracking any response. Output it produces is
    /// delivered as unsolicited lines (console passthrough).
    async fn execute(&self, text: &str) -> Result<()>;

    /// Send a command and collect its full multi-line response.
    async fn evaluate(&self, text: &str) -> Result<Vec<String>>;

    /// Send a command and collapse its response to one logical line.
    /// Embedded newlines survive; downstream echo stripping depends on them.
    async fn evaluate_line(&self, text: &str) -> Result<String> {
        Ok(self.evaluate(text).await?.join("\n"))
    }
}
