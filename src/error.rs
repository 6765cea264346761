//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore custom dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce `ConvertError` enum per categorizzare tutti gli errori possibili
//! - Fornisce messaggi di errore descrittivi e strutturati
//! - Integra con `thiserror` per automatic error conversion
//!
//! ## Categorie di errori:
//! - `Io`: Errori di I/O (file non trovati, permessi, etc.)
//! - `Image`: Errori della libreria `image` durante l'encoding JPEG
//! - `Decode`: Errori di decodifica HEIF (file corrotti, container invalidi)
//! - `Encode`: Errori di scrittura/compressione JPEG
//! - `Metadata`: Errori di estrazione o embedding metadata (Exif/XMP/IPTC)
//! - `Unsupported`: Operazione non disponibile nella build corrente
//! - `Validation`: Errori di validazione input
//!
//! Gli errori dei collaboratori codec non attraversano mai il boundary
//! dell'orchestratore: vengono convertiti in un `Outcome::Fail` per-job.

/// Custom error types for HEIF to JPEG conversion
#[derive(thiserror::Error, Debug)]
pub enum ConvertError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JPEG encoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("HEIF decode error: {0}")]
    Decode(String),

    #[error("JPEG encode error: {0}")]
    Encode(String),

    #[error("Metadata error: {0}")]
    Metadata(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Validation error: {0}")]
    Validation(String),
}
