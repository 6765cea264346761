//! # Job Model and Queue
//!
//! Unità di conversione immutabile e coda a priorità thread-safe, ordinata
//! per costo di memoria stimato crescente (prima i job piccoli).

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::{Mutex, PoisonError};

/// One input-to-output conversion unit with an estimated memory cost.
///
/// Immutable once created. Owned by the queue until popped, then owned by
/// exactly one worker until its outcome is recorded.
#[derive(Debug)]
pub struct Job {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Estimated memory cost in MB; 0 means unknown/unestimated.
    pub estimated_mb: u64,
}

impl Job {
    pub fn new(input: PathBuf, output: PathBuf, estimated_mb: u64) -> Self {
        Self {
            input,
            output,
            estimated_mb,
        }
    }
}

// BinaryHeap is a max-heap; ordering is inverted so the cheapest job is
// popped first. Equal costs compare equal, so the tie-break between them
// is unspecified.
impl Ord for Job {
    fn cmp(&self, other: &Self) -> Ordering {
        other.estimated_mb.cmp(&self.estimated_mb)
    }
}

impl PartialOrd for Job {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Job {
    fn eq(&self, other: &Self) -> bool {
        self.estimated_mb == other.estimated_mb
    }
}

impl Eq for Job {}

/// Thread-safe priority queue of pending jobs.
///
/// A single mutex guards the heap; per-job decode/encode work vastly
/// dominates the O(log n) hold time, so worker contention on this lock is
/// irrelevant. `pop()` returning `None` is the worker termination signal:
/// the queue is fully populated before any worker starts, so there is no
/// blocking wait or re-check loop.
pub struct JobQueue {
    heap: Mutex<BinaryHeap<Job>>,
    submitted: AtomicUsize,
}

impl JobQueue {
    pub fn new() -> Self {
        Self {
            heap: Mutex::new(BinaryHeap::new()),
            submitted: AtomicUsize::new(0),
        }
    }

    pub fn push(&self, job: Job) {
        self.submitted.fetch_add(1, AtomicOrdering::SeqCst);
        self.heap
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(job);
    }

    pub fn pop(&self) -> Option<Job> {
        self.heap
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop()
    }

    pub fn len(&self) -> usize {
        self.heap
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of jobs ever pushed, for the end-of-run counter check.
    pub fn submitted(&self) -> usize {
        self.submitted.load(AtomicOrdering::SeqCst)
    }
}

impl Default for JobQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn job(name: &str, estimated_mb: u64) -> Job {
        Job::new(
            Path::new(name).to_path_buf(),
            Path::new(name).with_extension("jpg"),
            estimated_mb,
        )
    }

    #[test]
    fn test_pop_returns_cheapest_first() {
        let queue = JobQueue::new();
        queue.push(job("b.heic", 200));
        queue.push(job("a.heic", 50));
        queue.push(job("c.heic", 120));

        assert_eq!(queue.pop().unwrap().estimated_mb, 50);
        assert_eq!(queue.pop().unwrap().estimated_mb, 120);
        assert_eq!(queue.pop().unwrap().estimated_mb, 200);
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_zero_estimate_is_scheduled_first() {
        let queue = JobQueue::new();
        queue.push(job("big.heic", 800));
        queue.push(job("unknown.heic", 0));

        assert_eq!(queue.pop().unwrap().estimated_mb, 0);
    }

    #[test]
    fn test_pop_on_empty_is_none() {
        let queue = JobQueue::new();
        assert!(queue.pop().is_none());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_submitted_counts_all_pushes() {
        let queue = JobQueue::new();
        for i in 0..5 {
            queue.push(job("x.heic", i));
        }
        queue.pop();
        assert_eq!(queue.submitted(), 5);
        assert_eq!(queue.len(), 4);
    }

    #[test]
    fn test_equal_cost_jobs_all_come_out_once() {
        let queue = JobQueue::new();
        queue.push(job("one.heic", 10));
        queue.push(job("two.heic", 10));
        queue.push(job("three.heic", 10));

        let mut names = Vec::new();
        while let Some(j) = queue.pop() {
            names.push(j.input);
        }
        names.sort();
        assert_eq!(names.len(), 3);
        names.dedup();
        assert_eq!(names.len(), 3);
    }
}
