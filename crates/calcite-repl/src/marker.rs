//! Sync markers: correlation tokens echoed back by the engine.
//!
//! A marker bounds a multi-line response without a length header. After the
//! real command we send a no-op that makes the engine print the token; the
//! token's echo line marks the end of the response.

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic generator for sync marker tokens.
#[derive(Debug, Default)]
pub struct MarkerCounter {
    next: AtomicU64,
}

impl MarkerCounter {
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Produce a fresh marker. Tokens strictly increase for the lifetime of
    /// the counter, so a stale echo can never satisfy a newer request.
    pub fn next(&self) -> SyncMarker {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        SyncMarker {
            token: format!("sync:{}", n),
        }
    }
}

/// A single correlation token plus its completion matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncMarker {
    token: String,
}

impl SyncMarker {
    /// The token text itself.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The no-op command whose only output is the token on a line of its own.
    pub fn elicit(&self) -> String {
        format!("disp('{}')", self.token)
    }

    /// Whether `line` is the engine's echo of this marker. The engine may
    /// prefix output with its debug prompt while stopped at a breakpoint.
    pub fn is_echo(&self, line: &str) -> bool {
        let line = line.strip_prefix("debug> ").unwrap_or(line);
        line.trim() == self.token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_strictly_increase() {
        let counter = MarkerCounter::new();
        let a = counter.next();
        let b = counter.next();
        assert_ne!(a.token(), b.token());
        assert_eq!(a.token(), "sync:1");
        assert_eq!(b.token(), "sync:2");
    }

    #[test]
    fn echo_matches_bare_token() {
        let m = MarkerCounter::new().next();
        assert!(m.is_echo("sync:1"));
        assert!(m.is_echo("  sync:1  "));
    }

    #[test]
    fn echo_matches_prompt_prefixed_token() {
        let m = MarkerCounter::new().next();
        assert!(m.is_echo("debug> sync:1"));
    }

    #[test]
    fn echo_rejects_other_lines() {
        let m = MarkerCounter::new().next();
        assert!(!m.is_echo("sync:2"));
        assert!(!m.is_echo("ans = sync:1 something"));
        assert!(!m.is_echo(""));
    }
}
