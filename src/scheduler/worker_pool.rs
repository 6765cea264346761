//! # Worker Pool Module
//!
//! Pool a dimensione fissa di worker bloccanti che consumano la JobQueue.
//!
//! ## Responsabilità:
//! - Avvia `workers` task bloccanti sul runtime tokio
//! - Loop per-worker: pop -> enforcement soft dell'allowance ->
//!   orchestrazione -> registrazione outcome
//! - Termina ogni worker alla prima osservazione di coda vuota
//!
//! ## Enforcement a due livelli:
//! Il confronto stima vs allowance qui è SOFT: produce solo un warning e il
//! job viene comunque tentato. Il rifiuto HARD è delegato al memory gate
//! dell'orchestratore, che confronta la stessa stima con il limite
//! esplicito configurato dal chiamante. I due livelli separano "lo
//! scheduler ritiene il job rischioso" (informativo) da "il tetto del
//! chiamante non va superato" (applicato, produce Fail).

use crate::convert::{ConversionOrchestrator, Outcome};
use crate::progress::ProgressManager;
use crate::report::ResultAggregator;
use crate::scheduler::JobQueue;
use anyhow::Result;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, warn};

/// Fixed set of parallel workers pulling from one shared queue.
pub struct WorkerPool {
    workers: usize,
    allowance_mb: u64,
}

impl WorkerPool {
    /// Worker count and per-thread allowance are fixed at construction;
    /// there is no dynamic scaling and no work stealing.
    pub fn new(workers: usize, allowance_mb: u64) -> Self {
        Self {
            workers: workers.max(1),
            allowance_mb,
        }
    }

    pub fn allowance_mb(&self) -> u64 {
        self.allowance_mb
    }

    /// Run the pool to queue exhaustion. Decode/encode are blocking native
    /// I/O, so each worker is a `spawn_blocking` task.
    pub async fn run(
        &self,
        queue: Arc<JobQueue>,
        orchestrator: Arc<ConversionOrchestrator>,
        aggregator: Arc<ResultAggregator>,
        progress: ProgressManager,
    ) -> Result<()> {
        let mut handles = Vec::with_capacity(self.workers);

        for worker_id in 0..self.workers {
            let queue = queue.clone();
            let orchestrator = orchestrator.clone();
            let aggregator = aggregator.clone();
            let progress = progress.clone();
            let allowance_mb = self.allowance_mb;

            handles.push(tokio::task::spawn_blocking(move || {
                Self::worker_loop(
                    worker_id,
                    allowance_mb,
                    &queue,
                    &orchestrator,
                    &aggregator,
                    &progress,
                );
            }));
        }

        for result in join_all(handles).await {
            result?;
        }
        Ok(())
    }

    fn worker_loop(
        worker_id: usize,
        allowance_mb: u64,
        queue: &JobQueue,
        orchestrator: &ConversionOrchestrator,
        aggregator: &ResultAggregator,
        progress: &ProgressManager,
    ) {
        loop {
            // Empty queue is the permanent termination signal: jobs are
            // never added after the initial population.
            let Some(job) = queue.pop() else {
                debug!("Worker {} done, queue empty", worker_id);
                return;
            };

            // Soft enforcement: warn and attempt anyway. The hard decision
            // belongs to the orchestrator's memory gate.
            if job.estimated_mb > allowance_mb {
                warn!(
                    "Image {} requires an estimated {}MB which exceeds the per-thread allowance of {}MB",
                    job.input.display(),
                    job.estimated_mb,
                    allowance_mb
                );
            }

            let outcome = orchestrator.run(&job);
            let name = job
                .input
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .into_owned();
            match &outcome {
                Outcome::Success => progress.job_done(&format!("[OK] {}", name)),
                Outcome::Skip(reason) => progress.job_done(&format!("[SKIP] {}: {}", name, reason)),
                Outcome::Fail(reason) => progress.job_done(&format!("[FAIL] {}: {}", name, reason)),
            }
            aggregator.record(&outcome);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::stub::StubCodec;
    use crate::config::Config;
    use crate::scheduler::{budget, Job};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn fixture(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, b"heic-bytes").unwrap();
        path
    }

    fn push_job(queue: &JobQueue, input: &PathBuf, estimated_mb: u64) {
        queue.push(Job::new(
            input.clone(),
            input.with_extension("jpg"),
            estimated_mb,
        ));
    }

    async fn run_pool(
        pool: &WorkerPool,
        queue: Arc<JobQueue>,
        codec: Arc<StubCodec>,
        config: Config,
    ) -> Arc<ResultAggregator> {
        let orchestrator = Arc::new(ConversionOrchestrator::new(
            config,
            codec.clone(),
            codec,
        ));
        let aggregator = Arc::new(ResultAggregator::new());
        pool.run(
            queue,
            orchestrator,
            aggregator.clone(),
            ProgressManager::hidden(),
        )
        .await
        .unwrap();
        aggregator
    }

    #[tokio::test]
    async fn test_counters_conserve_submitted_jobs() {
        let dir = TempDir::new().unwrap();
        let queue = Arc::new(JobQueue::new());

        // A mix of convertible, skippable and missing inputs.
        for i in 0..6 {
            let input = fixture(&dir, &format!("photo{}.heic", i));
            push_job(&queue, &input, 10 * i);
        }
        let other = fixture(&dir, "notes.txt");
        push_job(&queue, &other, 0);
        push_job(&queue, &dir.path().join("ghost.heic"), 0);

        let submitted = queue.submitted();
        let codec = Arc::new(StubCodec::with_dimensions(8, 8));
        let pool = WorkerPool::new(4, 500);
        let aggregator = run_pool(&pool, queue.clone(), codec, Config::default()).await;

        let (success, fail, skip) = aggregator.summary();
        assert_eq!(success + fail + skip, submitted);
        assert_eq!(success, 6);
        assert_eq!(skip, 1);
        assert_eq!(fail, 1);
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_each_job_is_popped_exactly_once() {
        let dir = TempDir::new().unwrap();
        let queue = Arc::new(JobQueue::new());
        let n = 24;
        for i in 0..n {
            let input = fixture(&dir, &format!("img{:02}.heic", i));
            push_job(&queue, &input, (i % 5) as u64 * 7);
        }

        let codec = Arc::new(StubCodec::with_dimensions(8, 8));
        let pool = WorkerPool::new(6, 1000);
        let aggregator = run_pool(&pool, queue.clone(), codec.clone(), Config::default()).await;

        // Exactly one decode and one encode per job: no duplicate or
        // dropped dequeues.
        assert_eq!(codec.decode_count(), n);
        assert_eq!(codec.encode_count(), n);
        assert_eq!(aggregator.summary(), (n, 0, 0));
        for i in 0..n {
            assert!(dir.path().join(format!("img{:02}.jpg", i)).exists());
        }
    }

    #[tokio::test]
    async fn test_over_allowance_job_is_still_attempted() {
        let dir = TempDir::new().unwrap();
        let queue = Arc::new(JobQueue::new());
        let input = fixture(&dir, "huge.heic");
        // Estimate far above the allowance, no hard limit configured.
        push_job(&queue, &input, 5000);

        let codec = Arc::new(StubCodec::with_dimensions(8, 8));
        let pool = WorkerPool::new(2, 100);
        let aggregator = run_pool(&pool, queue, codec.clone(), Config::default()).await;

        assert_eq!(codec.decode_count(), 1);
        assert_eq!(aggregator.summary(), (1, 0, 0));
    }

    #[tokio::test]
    async fn test_hard_limit_rejects_what_soft_warning_allows() {
        let dir = TempDir::new().unwrap();
        let queue = Arc::new(JobQueue::new());
        let input = fixture(&dir, "huge.heic");
        push_job(&queue, &input, 5000);

        let codec = Arc::new(StubCodec::with_dimensions(8, 8));
        let pool = WorkerPool::new(2, 100);
        let config = Config {
            max_job_memory_mb: 1000,
            ..Default::default()
        };
        let aggregator = run_pool(&pool, queue, codec.clone(), config).await;

        assert_eq!(codec.decode_count(), 0);
        assert_eq!(aggregator.summary(), (0, 1, 0));
    }

    #[tokio::test]
    async fn test_budget_scenario_two_jobs_two_workers() {
        // Inputs A (50MB) and B (200MB), budget 400MB, 2 threads:
        // allowance 200MB each, A dequeued before B, both succeed.
        let dir = TempDir::new().unwrap();
        let queue = Arc::new(JobQueue::new());
        let a = fixture(&dir, "a.heic");
        let b = fixture(&dir, "b.heic");
        push_job(&queue, &b, 200);
        push_job(&queue, &a, 50);

        let allowance = budget::per_thread_allowance_mb(400, 2);
        assert_eq!(allowance, 200);
        assert_eq!(queue.pop().unwrap().input, a);
        push_job(&queue, &a, 50);

        let codec = Arc::new(StubCodec::with_dimensions(8, 8));
        let pool = WorkerPool::new(2, allowance);
        let aggregator = run_pool(&pool, queue, codec, Config::default()).await;

        let (success, fail, skip) = aggregator.summary();
        assert_eq!((success, fail, skip), (2, 0, 0));
    }
}
