//! Pass/fail checks recorded against observed responses
//!
//! A check never stops the run. Each named check owns a pair of atomic
//! counters; components resolve their [`CheckStats`] once at construction and
//! record into it without taking any lock.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Provisioning response must be 201 Created
pub const STATUS_IS_201: &str = "status is 201";

/// Redirect response must be 307 Temporary Redirect
pub const STATUS_IS_307: &str = "status is 307";

/// Counters for one named check
#[derive(Debug, Default)]
pub struct CheckStats {
    passes: AtomicU64,
    fails: AtomicU64,
}

impl CheckStats {
    pub fn record(&self, passed: bool) {
        if passed {
            self.passes.fetch_add(1, Ordering::Relaxed);
        } else {
            self.fails.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn passes(&self) -> u64 {
        self.passes.load(Ordering::Relaxed)
    }

    pub fn fails(&self) -> u64 {
        self.fails.load(Ordering::Relaxed)
    }
}

/// Result of a single assertion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckOutcome {
    pub name: &'static str,
    pub passed: bool,
    /// Observed status, absent when the request never got a response
    pub status: Option<u16>,
}

/// Point-in-time counts for one check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckSnapshot {
    pub name: String,
    pub passes: u64,
    pub fails: u64,
}

impl CheckSnapshot {
    pub fn total(&self) -> u64 {
        self.passes + self.fails
    }

    /// Fraction of passing checks; 1.0 when nothing was recorded
    pub fn pass_rate(&self) -> f64 {
        match self.total() {
            0 => 1.0,
            total => self.passes as f64 / total as f64,
        }
    }
}

/// Registry of named checks, shared by setup and every VU
#[derive(Debug, Default)]
pub struct CheckRecorder {
    checks: RwLock<Vec<(&'static str, Arc<CheckStats>)>>,
}

impl CheckRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counters for `name`, registered on first use
    pub fn check(&self, name: &'static str) -> Arc<CheckStats> {
        if let Some(stats) = self.find(name) {
            return stats;
        }

        let mut checks = self.checks.write().unwrap_or_else(PoisonError::into_inner);
        // Lost a registration race
        if let Some((_, stats)) = checks.iter().find(|(n, _)| *n == name) {
            return Arc::clone(stats);
        }
        let stats = Arc::new(CheckStats::default());
        checks.push((name, Arc::clone(&stats)));
        stats
    }

    fn find(&self, name: &str) -> Option<Arc<CheckStats>> {
        self.checks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, stats)| Arc::clone(stats))
    }

    /// Counts for every check, in registration order
    pub fn snapshot(&self) -> Vec<CheckSnapshot> {
        self.checks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(name, stats)| CheckSnapshot {
                name: name.to_string(),
                passes: stats.passes(),
                fails: stats.fails(),
            })
            .collect()
    }

    pub fn total_failures(&self) -> u64 {
        self.snapshot().iter().map(|c| c.fails).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_registered_once() {
        let recorder = CheckRecorder::new();
        let a = recorder.check(STATUS_IS_201);
        let b = recorder.check(STATUS_IS_201);
        assert!(Arc::ptr_eq(&a, &b));

        recorder.check(STATUS_IS_307);
        let names: Vec<String> = recorder.snapshot().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec![STATUS_IS_201, STATUS_IS_307]);
    }

    #[test]
    fn test_counts_and_rates() {
        let recorder = CheckRecorder::new();
        let stats = recorder.check(STATUS_IS_307);
        stats.record(true);
        stats.record(true);
        stats.record(true);
        stats.record(false);

        let snapshot = &recorder.snapshot()[0];
        assert_eq!(snapshot.passes, 3);
        assert_eq!(snapshot.fails, 1);
        assert_eq!(snapshot.total(), 4);
        assert!((snapshot.pass_rate() - 0.75).abs() < f64::EPSILON);
        assert_eq!(recorder.total_failures(), 1);
    }

    #[test]
    fn test_empty_check_pass_rate() {
        let snapshot = CheckSnapshot {
            name: STATUS_IS_201.to_string(),
            passes: 0,
            fails: 0,
        };
        assert_eq!(snapshot.pass_rate(), 1.0);
    }

    #[test]
    fn test_concurrent_recording() {
        let recorder = Arc::new(CheckRecorder::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let recorder = Arc::clone(&recorder);
                std::thread::spawn(move || {
                    let stats = recorder.check(STATUS_IS_307);
                    for _ in 0..1000 {
                        stats.record(i % 2 == 0);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = recorder.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].passes, 4000);
        assert_eq!(snapshot[0].fails, 4000);
    }
}
