//! Idempotency guard for one-shot transactions
//!
//! Rapid repeated input can re-trigger the same logical purchase or drop
//! while its async step is still in flight. The guard is an insert-only
//! set: the marker is set synchronously before anything async starts and
//! is never cleared, so a re-entrant trigger on the same key is refused.

use std::collections::HashSet;

/// Insert-only set of in-flight/settled transaction keys
#[derive(Debug, Clone, Default)]
pub struct TxnGuard {
    keys: HashSet<String>,
}

impl TxnGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check-and-set: true exactly once per key
    pub fn begin(&mut self, key: impl Into<String>) -> bool {
        self.keys.insert(key.into())
    }

    /// True when the key has already been claimed
    pub fn is_claimed(&self, key: &str) -> bool {
        self.keys.contains(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_begin_is_refused() {
        let mut guard = TxnGuard::new();
        assert!(guard.begin("shop:portal-3:slot-1"));
        assert!(!guard.begin("shop:portal-3:slot-1"));
        assert!(guard.is_claimed("shop:portal-3:slot-1"));
        // Distinct keys are independent
        assert!(guard.begin("shop:portal-3:slot-2"));
    }
}
