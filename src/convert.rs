//! # Conversion Orchestrator Module
//!
//! State machine per-job: una sequenza di gate che corto-circuita al primo
//! fallimento o skip, delegando il lavoro codec ai collaboratori.
//!
//! ## Sequenza dei gate:
//! 1. Esistenza input (file regolare)
//! 2. Filtro estensione (.heic/.heif, case-insensitive)
//! 3. Collisione output (skip se esiste senza --force)
//! 4. Gate dimensioni (probe economico, PRIMA della decodifica completa)
//! 5. Memory gate (stima vs limite hard configurato, indipendente dal
//!    warning soft dello scheduler)
//! 6. Decodifica HEIF
//! 7. Estrazione metadata (l'assenza non è un errore)
//! 8. Creazione directory di output (idempotente, race-safe)
//! 9. Encoding JPEG con metadata
//!
//! Ogni fallimento resta isolato al job corrente: nessun errore attraversa
//! il boundary dell'orchestratore verso il worker loop.

use crate::codec::{HeifDecoder, JpegEncoder};
use crate::config::Config;
use crate::file_manager::FileManager;
use crate::scheduler::Job;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// Why a job was deliberately not processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Input extension is not .heic/.heif.
    NotHeif,
    /// Output already exists and --force was not given.
    OutputExists,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotHeif => write!(f, "not a HEIC/HEIF file"),
            Self::OutputExists => write!(f, "output file already exists"),
        }
    }
}

/// Why a job failed while being attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailReason {
    /// Input missing or not a regular file.
    MissingInput,
    DimensionExceeded {
        width: u32,
        height: u32,
        max_width: u32,
        max_height: u32,
    },
    MemoryExceeded {
        estimated_mb: u64,
        limit_mb: u64,
    },
    Decode(String),
    Encode(String),
    OutputDir(String),
}

impl fmt::Display for FailReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingInput => write!(f, "input missing or not a regular file"),
            Self::DimensionExceeded {
                width,
                height,
                max_width,
                max_height,
            } => write!(
                f,
                "image dimensions ({}x{}) exceed maximum allowed ({}x{})",
                width, height, max_width, max_height
            ),
            Self::MemoryExceeded {
                estimated_mb,
                limit_mb,
            } => write!(
                f,
                "estimated memory requirement ({}MB) exceeds maximum allowed ({}MB)",
                estimated_mb, limit_mb
            ),
            Self::Decode(msg) => write!(f, "decode error: {}", msg),
            Self::Encode(msg) => write!(f, "encode error: {}", msg),
            Self::OutputDir(msg) => write!(f, "output directory error: {}", msg),
        }
    }
}

/// Result of one job, produced exactly once per job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Skip(SkipReason),
    Fail(FailReason),
}

/// Runs the per-job gate/decode/encode state machine.
pub struct ConversionOrchestrator {
    config: Config,
    decoder: Arc<dyn HeifDecoder>,
    encoder: Arc<dyn JpegEncoder>,
}

impl ConversionOrchestrator {
    pub fn new(
        config: Config,
        decoder: Arc<dyn HeifDecoder>,
        encoder: Arc<dyn JpegEncoder>,
    ) -> Self {
        Self {
            config,
            decoder,
            encoder,
        }
    }

    /// Run every gate for one job and produce its outcome. Never panics and
    /// never returns an error: every collaborator failure is folded into
    /// `Outcome::Fail`.
    pub fn run(&self, job: &Job) -> Outcome {
        info!(
            "Converting '{}' -> '{}'",
            job.input.display(),
            job.output.display()
        );

        if !job.input.is_file() {
            warn!("Input not found or not a regular file: {}", job.input.display());
            return Outcome::Fail(FailReason::MissingInput);
        }

        if !FileManager::is_heif(&job.input) {
            info!("Skipping non-HEIC/HEIF file: {}", job.input.display());
            return Outcome::Skip(SkipReason::NotHeif);
        }

        if job.output.exists() && !self.config.force {
            info!(
                "Output {} already exists, skipping {}",
                job.output.display(),
                job.input.display()
            );
            return Outcome::Skip(SkipReason::OutputExists);
        }

        if let Some(fail) = self.dimension_gate(job) {
            warn!("{}: {}", job.input.display(), fail);
            return Outcome::Fail(fail);
        }

        if let Some(fail) = self.memory_gate(job) {
            warn!("{}: {}", job.input.display(), fail);
            return Outcome::Fail(fail);
        }

        let image = match self.decoder.decode(&job.input) {
            Ok(image) => image,
            Err(e) => {
                warn!("Failed to decode {}: {}", job.input.display(), e);
                return Outcome::Fail(FailReason::Decode(e.to_string()));
            }
        };

        let metadata = self.decoder.extract_metadata(&job.input);

        if let Some(parent) = job.output.parent() {
            // create_dir_all succeeds when the directory already exists, so
            // concurrent workers targeting the same directory cannot fail
            // each other here.
            if !parent.as_os_str().is_empty() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    warn!("Failed to create {}: {}", parent.display(), e);
                    return Outcome::Fail(FailReason::OutputDir(e.to_string()));
                }
            }
        }

        match self
            .encoder
            .encode(&image, self.config.quality, &metadata, &job.output)
        {
            Ok(()) => {
                info!("Successfully saved '{}'", job.output.display());
                Outcome::Success
            }
            Err(e) => {
                warn!("Failed to encode {}: {}", job.output.display(), e);
                Outcome::Fail(FailReason::Encode(e.to_string()))
            }
        }
    }

    /// Reject oversized images from the cheap probe, before paying decode
    /// cost. Only runs when a maximum was configured; a failed probe defers
    /// to the decode step for the real error.
    fn dimension_gate(&self, job: &Job) -> Option<FailReason> {
        let (max_width, max_height) = (self.config.max_width, self.config.max_height);
        if max_width == 0 && max_height == 0 {
            return None;
        }

        let (width, height) = self.decoder.probe_dimensions(&job.input).ok()?;
        let too_wide = max_width > 0 && width > max_width;
        let too_tall = max_height > 0 && height > max_height;
        if too_wide || too_tall {
            return Some(FailReason::DimensionExceeded {
                width,
                height,
                max_width,
                max_height,
            });
        }
        None
    }

    /// Hard memory-limit gate. Independent of, and stricter than, the
    /// scheduler's soft allowance warning. Jobs with an unknown (zero)
    /// estimate are exempt.
    fn memory_gate(&self, job: &Job) -> Option<FailReason> {
        let limit_mb = self.config.max_job_memory_mb;
        if limit_mb > 0 && job.estimated_mb > 0 && job.estimated_mb > limit_mb {
            return Some(FailReason::MemoryExceeded {
                estimated_mb: job.estimated_mb,
                limit_mb,
            });
        }
        None
    }
}
