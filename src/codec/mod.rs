//! # Codec Collaborators Module
//!
//! Questo modulo definisce i contratti dei collaboratori codec e le
//! implementazioni disponibili nella build corrente.
//!
//! ## Responsabilità:
//! - Definisce i trait `HeifDecoder` e `JpegEncoder` (seam tra scheduler e codec)
//! - Definisce i tipi scambiati: `DecodedImage`, `MetadataBlock`, `MetadataKind`
//! - Seleziona le implementazioni in base alle feature di build
//!
//! ## Implementazioni:
//! - `jpeg::SoftwareJpegEncoder`: encoding JPEG in-process (sempre disponibile)
//! - `heif::LibheifDecoder`: decodifica HEIF via libheif (feature `libheif`)
//! - `UnsupportedDecoder`: fallback che fallisce ogni decodifica quando la
//!   build non include un decoder nativo
//!
//! Ogni implementazione converte gli errori nativi in `ConvertError` al
//! proprio boundary: nessun panic o salto non-locale raggiunge il chiamante.

use crate::error::ConvertError;
use std::borrow::Cow;
use std::path::Path;

pub mod jpeg;

#[cfg(feature = "libheif")]
pub mod heif;

#[cfg(test)]
pub mod stub;

pub use jpeg::SoftwareJpegEncoder;

#[cfg(feature = "libheif")]
pub use heif::LibheifDecoder;

/// Kind of a metadata block carried from the HEIF container to the JPEG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataKind {
    Exif,
    Xmp,
    Iptc,
    /// Preserved or dropped at the encoder's discretion.
    Other,
}

impl MetadataKind {
    /// Map a HEIF metadata item type string to a kind.
    pub fn from_item_type(item_type: &str) -> Self {
        match item_type {
            "Exif" => Self::Exif,
            "XMP" | "mime" => Self::Xmp,
            "IPTC" | "iptc" => Self::Iptc,
            _ => Self::Other,
        }
    }
}

/// One raw metadata block extracted from the source container.
#[derive(Debug, Clone)]
pub struct MetadataBlock {
    pub kind: MetadataKind,
    pub data: Vec<u8>,
}

/// Decoded interleaved RGB pixels with a row stride.
///
/// `stride` is in bytes and may exceed `width * 3` when the decoder pads
/// rows; consumers must address rows through it.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub pixels: Vec<u8>,
    pub stride: usize,
    pub width: u32,
    pub height: u32,
}

impl DecodedImage {
    /// Return the pixels as a tightly packed RGB buffer, copying only when
    /// the stride carries row padding.
    pub fn packed_rgb(&self) -> Cow<'_, [u8]> {
        let row_bytes = self.width as usize * 3;
        if self.stride == row_bytes {
            return Cow::Borrowed(&self.pixels);
        }

        let mut packed = Vec::with_capacity(row_bytes * self.height as usize);
        for row in 0..self.height as usize {
            let start = row * self.stride;
            packed.extend_from_slice(&self.pixels[start..start + row_bytes]);
        }
        Cow::Owned(packed)
    }
}

/// HEIF decode collaborator: dimension probe, full decode, metadata extract.
pub trait HeifDecoder: Send + Sync {
    /// Cheap metadata-only read of the image dimensions, without decoding
    /// pixel data.
    fn probe_dimensions(&self, path: &Path) -> Result<(u32, u32), ConvertError>;

    /// Full decode to interleaved RGB.
    fn decode(&self, path: &Path) -> Result<DecodedImage, ConvertError>;

    /// Extract raw metadata blocks. A file without metadata yields an empty
    /// list; extraction problems are not errors either.
    fn extract_metadata(&self, path: &Path) -> Vec<MetadataBlock>;
}

/// JPEG encode collaborator. Must write a complete file or none.
pub trait JpegEncoder: Send + Sync {
    fn encode(
        &self,
        image: &DecodedImage,
        quality: u8,
        metadata: &[MetadataBlock],
        output: &Path,
    ) -> Result<(), ConvertError>;
}

/// Decoder used when the build carries no native HEIF support. Probes and
/// decodes fail with a hint to rebuild; estimates therefore come out as 0
/// and every conversion fails at the decode gate with a clear reason.
#[cfg(not(feature = "libheif"))]
pub struct UnsupportedDecoder;

#[cfg(not(feature = "libheif"))]
impl HeifDecoder for UnsupportedDecoder {
    fn probe_dimensions(&self, _path: &Path) -> Result<(u32, u32), ConvertError> {
        Err(ConvertError::Unsupported(
            "this build has no HEIF decoder (rebuild with --features libheif)".to_string(),
        ))
    }

    fn decode(&self, _path: &Path) -> Result<DecodedImage, ConvertError> {
        Err(ConvertError::Unsupported(
            "this build has no HEIF decoder (rebuild with --features libheif)".to_string(),
        ))
    }

    fn extract_metadata(&self, _path: &Path) -> Vec<MetadataBlock> {
        Vec::new()
    }
}
