//! Batch execution counters
//!
//! Monotonic counters only. Relaxed atomics: values are exact once the
//! batch that produced them has been joined.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct MetricsRegistry {
    batches_executed: AtomicU64,
    batches_failed: AtomicU64,
    units_dispatched: AtomicU64,
    units_succeeded: AtomicU64,
    units_failed: AtomicU64,
    missing_outcomes: AtomicU64,
    unregistered_calls: AtomicU64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // Batch level

    pub fn increment_batches_executed(&self) {
        self.batches_executed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_batches_failed(&self) {
        self.batches_failed.fetch_add(1, Ordering::Relaxed);
    }

    // Unit level

    pub fn increment_units_dispatched(&self) {
        self.units_dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_units_succeeded(&self) {
        self.units_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_units_failed(&self) {
        self.units_failed.fetch_add(1, Ordering::Relaxed);
    }

    // Degradations

    pub fn add_missing_outcomes(&self, count: u64) {
        self.missing_outcomes.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_unregistered_calls(&self, count: u64) {
        self.unregistered_calls.fetch_add(count, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            batches_executed: self.batches_executed.load(Ordering::Relaxed),
            batches_failed: self.batches_failed.load(Ordering::Relaxed),
            units_dispatched: self.units_dispatched.load(Ordering::Relaxed),
            units_succeeded: self.units_succeeded.load(Ordering::Relaxed),
            units_failed: self.units_failed.load(Ordering::Relaxed),
            missing_outcomes: self.missing_outcomes.load(Ordering::Relaxed),
            unregistered_calls: self.unregistered_calls.load(Ordering::Relaxed),
        }
    }

    pub fn to_json(&self) -> String {
        let s = self.snapshot();
        format!(
            r#"{{"batches_executed":{},"batches_failed":{},"units_dispatched":{},"units_succeeded":{},"units_failed":{},"missing_outcomes":{},"unregistered_calls":{}}}"#,
            s.batches_executed,
            s.batches_failed,
            s.units_dispatched,
            s.units_succeeded,
            s.units_failed,
            s.missing_outcomes,
            s.unregistered_calls,
        )
    }
}

/// Point-in-time copy of all counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub batches_executed: u64,
    pub batches_failed: u64,
    pub units_dispatched: u64,
    pub units_succeeded: u64,
    pub units_failed: u64,
    pub missing_outcomes: u64,
    pub unregistered_calls: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registry_is_zero() {
        assert_eq!(MetricsRegistry::new().snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_counters() {
        let registry = MetricsRegistry::new();
        registry.increment_batches_executed();
        registry.increment_units_dispatched();
        registry.increment_units_dispatched();
        registry.increment_units_succeeded();
        registry.increment_units_failed();
        registry.add_missing_outcomes(2);
        registry.add_unregistered_calls(3);

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.batches_executed, 1);
        assert_eq!(snapshot.units_dispatched, 2);
        assert_eq!(snapshot.units_succeeded, 1);
        assert_eq!(snapshot.units_failed, 1);
        assert_eq!(snapshot.missing_outcomes, 2);
        assert_eq!(snapshot.unregistered_calls, 3);
    }

    #[test]
    fn test_to_json() {
        let registry = MetricsRegistry::new();
        registry.increment_batches_failed();

        let parsed: serde_json::Value = serde_json::from_str(&registry.to_json()).unwrap();
        assert_eq!(parsed["batches_failed"], 1);
        assert_eq!(parsed["units_dispatched"], 0);
    }

    #[test]
    fn test_thread_safety() {
        use std::sync::Arc;
        use std::thread;

        let registry = Arc::new(MetricsRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let reg = Arc::clone(&registry);
                thread::spawn(move || {
                    for _ in 0..100 {
                        reg.increment_units_dispatched();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.snapshot().units_dispatched, 800);
    }
}
