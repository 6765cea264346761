//! # File Management Module
//!
//! Questo modulo gestisce le operazioni sui path e la raccolta degli input.
//!
//! ## Responsabilità:
//! - Riconoscimento estensioni HEIC/HEIF (case-insensitive)
//! - Calcolo del path di output (stesso stem, estensione `.jpg`)
//! - Espansione ricorsiva degli argomenti directory in file HEIF
//! - Formattazione human-readable delle dimensioni
//!
//! ## Raccolta input:
//! - Un argomento file viene passato così com'è, anche con estensione
//!   sbagliata: sarà l'extension filter dell'orchestratore a produrre lo
//!   Skip contabilizzato
//! - Un argomento directory viene espanso con `walkdir` ai soli file
//!   `.heic`/`.heif` sottostanti

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Manages path operations and input collection
pub struct FileManager;

impl FileManager {
    /// Check if a path has a HEIC/HEIF extension (case-insensitive)
    pub fn is_heif(path: &Path) -> bool {
        if let Some(ext) = path.extension() {
            let ext_lower = ext.to_string_lossy().to_lowercase();
            matches!(ext_lower.as_str(), "heic" | "heif")
        } else {
            false
        }
    }

    /// Output path for an input: same stem, `.jpg` extension, either
    /// alongside the input or under the given output directory.
    pub fn output_path_for(input: &Path, output_dir: Option<&Path>) -> PathBuf {
        match output_dir {
            Some(dir) => {
                let stem = input.file_stem().unwrap_or(input.as_os_str());
                let mut name = stem.to_os_string();
                name.push(".jpg");
                dir.join(name)
            }
            None => input.with_extension("jpg"),
        }
    }

    /// Expand CLI arguments into input files. Directory arguments are
    /// walked recursively for HEIF files; plain files pass through as-is.
    pub fn collect_inputs(args: &[PathBuf]) -> Vec<PathBuf> {
        let mut inputs = Vec::new();
        for arg in args {
            if arg.is_dir() {
                for entry in WalkDir::new(arg)
                    .into_iter()
                    .filter_map(|e| e.ok())
                    .filter(|e| e.file_type().is_file())
                {
                    if Self::is_heif(entry.path()) {
                        inputs.push(entry.path().to_path_buf());
                    }
                }
            } else {
                inputs.push(arg.clone());
            }
        }
        inputs
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }
}
