//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con tutti i parametri di conversione
//! - Fornisce validazione robusta dei parametri di input
//! - Supporta caricamento/salvataggio configurazione da/verso file JSON
//! - Fornisce valori di default sensati per tutti i parametri
//!
//! ## Parametri di configurazione:
//! - `quality`: Qualità JPEG (1-100, default: 95)
//! - `force`: Sovrascrive file di output esistenti (default: false)
//! - `output_dir`: Directory di output (default: None = accanto all'input)
//! - `max_width` / `max_height`: Dimensioni massime accettate (0 = illimitato)
//! - `memory_budget_mb`: Budget di memoria globale per lo scheduling
//!   (0 = auto, 75% della memoria disponibile)
//! - `max_job_memory_mb`: Limite hard per-job del memory gate (0 = illimitato)
//! - `workers`: Numero di worker (0 = auto dal probe dei core)
//!
//! ## Validazione:
//! - Controlla che quality sia 1-100
//! - Controlla che memory_budget_mb sia 0 (auto) oppure >= 100
//!
//! ## Esempio:
//! ```rust
//! use heif2jpeg::Config;
//!
//! let config = Config {
//!     quality: 85,
//!     force: true,
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Smallest accepted explicit memory budget, in MB.
pub const MIN_MEMORY_BUDGET_MB: u64 = 100;

/// Configuration for batch HEIF to JPEG conversion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// JPEG quality (1-100)
    pub quality: u8,
    /// Overwrite existing output files
    pub force: bool,
    /// Output directory (None = alongside each input)
    pub output_dir: Option<PathBuf>,
    /// Maximum accepted image width (0 = unlimited)
    pub max_width: u32,
    /// Maximum accepted image height (0 = unlimited)
    pub max_height: u32,
    /// Global memory budget in MB for allowance derivation (0 = auto)
    pub memory_budget_mb: u64,
    /// Hard per-job memory ceiling in MB for the memory gate (0 = unlimited)
    pub max_job_memory_mb: u64,
    /// Number of parallel workers (0 = auto from the core probe)
    pub workers: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            quality: 95,
            force: false,
            output_dir: None,
            max_width: 0,
            max_height: 0,
            memory_budget_mb: 0,
            max_job_memory_mb: 0,
            workers: 0,
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.quality == 0 || self.quality > 100 {
            return Err(anyhow::anyhow!("JPEG quality must be between 1 and 100"));
        }

        if self.memory_budget_mb != 0 && self.memory_budget_mb < MIN_MEMORY_BUDGET_MB {
            return Err(anyhow::anyhow!(
                "Memory budget must be at least {}MB (or 0 for auto)",
                MIN_MEMORY_BUDGET_MB
            ));
        }

        Ok(())
    }

    /// Load configuration from file
    pub async fn from_file(path: &PathBuf) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &PathBuf) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.quality = 0;
        assert!(config.validate().is_err());

        config.quality = 101;
        assert!(config.validate().is_err());

        config.quality = 95;
        config.memory_budget_mb = 50;
        assert!(config.validate().is_err());

        config.memory_budget_mb = 0;
        assert!(config.validate().is_ok());

        config.memory_budget_mb = 100;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.quality, 95);
        assert!(!config.force);
        assert!(config.output_dir.is_none());
        assert_eq!(config.max_width, 0);
        assert_eq!(config.max_height, 0);
        assert_eq!(config.memory_budget_mb, 0);
        assert_eq!(config.max_job_memory_mb, 0);
        assert_eq!(config.workers, 0);
    }

    #[tokio::test]
    async fn test_config_save_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");

        let original_config = Config {
            quality: 85,
            force: true,
            output_dir: Some(PathBuf::from("/tmp/out")),
            max_width: 8000,
            max_height: 6000,
            memory_budget_mb: 2048,
            max_job_memory_mb: 512,
            workers: 8,
        };

        // Save config
        original_config.save_to_file(&config_path).await.unwrap();

        // Load config
        let loaded_config = Config::from_file(&config_path).await.unwrap();

        assert_eq!(loaded_config.quality, 85);
        assert!(loaded_config.force);
        assert_eq!(loaded_config.output_dir, Some(PathBuf::from("/tmp/out")));
        assert_eq!(loaded_config.max_width, 8000);
        assert_eq!(loaded_config.max_height, 6000);
        assert_eq!(loaded_config.memory_budget_mb, 2048);
        assert_eq!(loaded_config.max_job_memory_mb, 512);
        assert_eq!(loaded_config.workers, 8);
    }

    #[tokio::test]
    async fn test_config_from_missing_file_is_default() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("absent.json");

        let loaded = Config::from_file(&config_path).await.unwrap();
        assert_eq!(loaded.quality, Config::default().quality);
    }
}
