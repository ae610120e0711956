//! Metrics boundary
//!
//! The router and health monitor emit one observation per health tick
//! and per terminal generate/embed outcome to an injected sink; absence
//! of a sink is not an error.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Injected observation sink
pub trait MetricsSink: Send + Sync {
    /// Record one observation
    fn observe(&self, name: &str, success: bool, duration: Duration);
}

/// Counting sink used in tests and local setups
#[derive(Debug, Default)]
pub struct CountingSink {
    successes: AtomicU64,
    failures: AtomicU64,
}

impl CountingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn successes(&self) -> u64 {
        self.successes.load(Ordering::Relaxed)
    }

    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}

impl MetricsSink for CountingSink {
    fn observe(&self, _name: &str, success: bool, _duration: Duration) {
        if success {
            self.successes.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failures.fetch_add(1, Ordering::Relaxed);
        }
    }
}
