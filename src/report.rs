//! # Result Aggregation Module
//!
//! Contatori lock-free degli esiti e report finale del run.

use crate::convert::Outcome;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

/// Lock-free success/fail/skip counters.
///
/// Each job contributes exactly one increment; there is no ordering
/// guarantee between workers' updates, only the end-of-run invariant
/// `success + fail + skip == jobs submitted`.
pub struct ResultAggregator {
    success: AtomicUsize,
    fail: AtomicUsize,
    skip: AtomicUsize,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self {
            success: AtomicUsize::new(0),
            fail: AtomicUsize::new(0),
            skip: AtomicUsize::new(0),
        }
    }

    /// Record one job outcome, incrementing exactly one counter.
    pub fn record(&self, outcome: &Outcome) {
        match outcome {
            Outcome::Success => self.success.fetch_add(1, Ordering::SeqCst),
            Outcome::Fail(_) => self.fail.fetch_add(1, Ordering::SeqCst),
            Outcome::Skip(_) => self.skip.fetch_add(1, Ordering::SeqCst),
        };
    }

    /// Snapshot of (success, fail, skip).
    pub fn summary(&self) -> (usize, usize, usize) {
        (
            self.success.load(Ordering::SeqCst),
            self.fail.load(Ordering::SeqCst),
            self.skip.load(Ordering::SeqCst),
        )
    }

    /// End-of-run consistency check against the number of submitted jobs.
    pub fn accounts_for(&self, submitted: usize) -> bool {
        let (success, fail, skip) = self.summary();
        success + fail + skip == submitted
    }

    /// Log the final summary block.
    pub fn log_summary(&self, workers: usize, budget_mb: u64) {
        let (success, fail, skip) = self.summary();
        info!("----------------------------------------");
        info!("Processing finished.");
        info!("  Successful conversions: {}", success);
        info!("  Skipped:                {}", skip);
        info!("  Failed conversions:     {}", fail);
        info!("  Worker threads used:    {}", workers);
        info!("  Memory budget:          {}MB", budget_mb);
    }
}

impl Default for ResultAggregator {
    fn default() -> Self {
        Self::new()
    }
}
