//! # HEIF to JPEG Batch Converter - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing`
//! - Probe di sistema (memoria disponibile, core count) una volta allo startup
//! - Costruzione dei job con stima di memoria e avvio del worker pool
//! - Calcolo dell'exit code (1 se almeno una conversione fallisce)
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI (input, quality, limiti, memoria)
//! 2. Configura il logging (INFO o DEBUG a seconda del flag verbose)
//! 3. Deriva budget di memoria e numero di worker dai probe
//! 4. Stima il costo di ogni input e popola la coda a priorità
//! 5. Avvia il pool e stampa il riepilogo finale
//!
//! ## Esempio di utilizzo:
//! ```bash
//! heif2jpeg *.heic -q 90 -o converted/ -m 2048
//! ```

use anyhow::Result;
use clap::error::ErrorKind;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use heif2jpeg::codec::{HeifDecoder, JpegEncoder, SoftwareJpegEncoder};
use heif2jpeg::progress::ProgressManager;
use heif2jpeg::scheduler::per_thread_allowance_mb;
use heif2jpeg::{
    platform, Config, ConversionOrchestrator, JobQueue, MemoryEstimator, ResultAggregator,
    WorkerPool,
};
use heif2jpeg::file_manager::FileManager;
use heif2jpeg::scheduler::Job;

#[derive(Parser)]
#[command(name = "heif2jpeg")]
#[command(about = "Convert HEIC/HEIF images to JPEG under a memory budget")]
struct Args {
    /// Input HEIC/HEIF files (directories are expanded recursively)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// JPEG quality (1-100)
    #[arg(short, long, default_value = "95", value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: u8,

    /// Overwrite existing output files
    #[arg(short, long)]
    force: bool,

    /// Output directory for converted images (default: alongside each input)
    #[arg(short, long)]
    outdir: Option<PathBuf>,

    /// Maximum allowed image width (0 = unlimited)
    #[arg(short = 'w', long, default_value = "0")]
    maxwidth: u32,

    /// Maximum allowed image height (0 = unlimited)
    #[arg(short = 'H', long, default_value = "0")]
    maxheight: u32,

    /// Memory budget in MB for scheduling (0 = auto, 75% of available)
    #[arg(short, long, default_value = "0")]
    memory: u64,

    /// Hard per-job memory ceiling in MB (0 = unlimited)
    #[arg(long, default_value = "0")]
    max_job_memory: u64,

    /// Number of parallel workers (0 = auto from core probe)
    #[arg(long, default_value = "0")]
    workers: usize,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Argument errors must exit 1, help and version exit 0.
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            print!("{}", e);
            return Ok(());
        }
        Err(e) => {
            eprint!("{}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config = Config {
        quality: args.quality,
        force: args.force,
        output_dir: args.outdir,
        max_width: args.maxwidth,
        max_height: args.maxheight,
        memory_budget_mb: args.memory,
        max_job_memory_mb: args.max_job_memory,
        workers: args.workers,
    };

    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Create output directory up front when requested
    if let Some(ref output_dir) = config.output_dir {
        if !output_dir.exists() {
            std::fs::create_dir_all(output_dir)?;
            info!("Created output directory: {}", output_dir.display());
        }
    }

    // System probes, queried once
    let workers = if config.workers > 0 {
        config.workers
    } else {
        platform::detect_worker_count()
    };

    let budget_mb = if config.memory_budget_mb > 0 {
        info!("User-specified memory budget: {}MB", config.memory_budget_mb);
        config.memory_budget_mb
    } else {
        let available = platform::available_memory_mb();
        let budget = platform::auto_memory_budget_mb();
        info!(
            "Automatic memory budget: {}MB (75% of {}MB available)",
            budget, available
        );
        budget
    };

    if config.max_width > 0 || config.max_height > 0 {
        info!(
            "Maximum image dimensions: {} x {}",
            if config.max_width > 0 {
                config.max_width.to_string()
            } else {
                "unlimited".to_string()
            },
            if config.max_height > 0 {
                config.max_height.to_string()
            } else {
                "unlimited".to_string()
            }
        );
    }

    let decoder = build_decoder();
    let encoder: Arc<dyn JpegEncoder> = Arc::new(SoftwareJpegEncoder::new());

    // Build all jobs before any worker starts
    let inputs = FileManager::collect_inputs(&args.inputs);
    if inputs.is_empty() {
        eprintln!("Error: no input files found");
        std::process::exit(1);
    }

    let estimator = MemoryEstimator::new(decoder.clone());
    let queue = Arc::new(JobQueue::new());
    for input in &inputs {
        let output = FileManager::output_path_for(input, config.output_dir.as_deref());
        let estimated_mb = estimator.estimate(input);
        queue.push(Job::new(input.clone(), output, estimated_mb));
    }

    let submitted = queue.submitted();
    let allowance_mb = per_thread_allowance_mb(budget_mb, workers);
    info!(
        "Starting batch processing: {} jobs, {} workers, {}MB allowance per worker",
        submitted, workers, allowance_mb
    );

    let orchestrator = Arc::new(ConversionOrchestrator::new(
        config.clone(),
        decoder,
        encoder,
    ));
    let aggregator = Arc::new(ResultAggregator::new());
    let progress = ProgressManager::new(submitted as u64);

    let pool = WorkerPool::new(workers, allowance_mb);
    pool.run(queue, orchestrator, aggregator.clone(), progress.clone())
        .await?;

    let (success, fail, skip) = aggregator.summary();
    progress.finish(&format!(
        "Done: {} converted, {} failed, {} skipped",
        success, fail, skip
    ));
    aggregator.log_summary(workers, budget_mb);

    if !aggregator.accounts_for(submitted) {
        error!(
            "Outcome counters ({}) do not account for all {} submitted jobs",
            success + fail + skip,
            submitted
        );
    }

    if fail > 0 {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(feature = "libheif")]
fn build_decoder() -> Arc<dyn HeifDecoder> {
    Arc::new(heif2jpeg::codec::LibheifDecoder::new())
}

#[cfg(not(feature = "libheif"))]
fn build_decoder() -> Arc<dyn HeifDecoder> {
    Arc::new(heif2jpeg::codec::UnsupportedDecoder)
}
