//! # Scheduler Module
//!
//! Modulo che separa le responsabilità dello scheduling in sottomoduli:
//! - `job`: Modello del job e coda a priorità per costo crescente
//! - `budget`: Derivazione dell'allowance di memoria per-thread
//! - `worker_pool`: Pool fisso di worker con enforcement soft

pub mod budget;
pub mod job;
pub mod worker_pool;

pub use budget::per_thread_allowance_mb;
pub use job::{Job, JobQueue};
pub use worker_pool::WorkerPool;
