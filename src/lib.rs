//! # HEIF to JPEG Batch Converter Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per altri consumatori
//!
//! ## Architettura dei moduli:
//! - `config`: Gestione configurazione e validazione parametri
//! - `error`: Tipi di errore custom per diverse operazioni
//! - `codec`: Contratti e implementazioni dei collaboratori decode/encode
//! - `estimate`: Stima euristica del costo di memoria per-job
//! - `scheduler`: Coda a priorità, budget e worker pool
//! - `convert`: Orchestratore della conversione (sequenza di gate)
//! - `report`: Contatori atomici degli esiti e report finale
//! - `progress`: Progress tracking
//! - `platform`: Probe di sistema (memoria disponibile, core count)
//! - `file_manager`: Operazioni sui path e raccolta input
//!
//! ## Utilizzo:
//! ```rust
//! use heif2jpeg::{Config, ConversionOrchestrator, JobQueue, WorkerPool};
//! ```

pub mod codec;
pub mod config;
pub mod convert;
pub mod error;
pub mod estimate;
pub mod file_manager;
pub mod platform;
pub mod progress;
pub mod report;
pub mod scheduler;

pub use config::Config;
pub use convert::{ConversionOrchestrator, FailReason, Outcome, SkipReason};
pub use error::ConvertError;
pub use estimate::MemoryEstimator;
pub use report::ResultAggregator;
pub use scheduler::{Job, JobQueue, WorkerPool};
