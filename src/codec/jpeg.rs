//! # JPEG Encode Collaborator
//!
//! In-process JPEG encoding of decoded RGB buffers with metadata
//! preservation, built on the `image` crate.

use crate::codec::{DecodedImage, JpegEncoder, MetadataBlock, MetadataKind};
use crate::error::ConvertError;
use image::codecs::jpeg::JpegEncoder as RgbJpegWriter;
use image::ColorType;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Adobe XMP namespace written ahead of the XMP packet in its APP1 segment.
const XMP_NAMESPACE: &[u8] = b"http://ns.adobe.com/xap/1.0/\0";

/// JPEG marker payloads are length-prefixed with a u16 that includes the
/// two length bytes themselves.
const MAX_MARKER_PAYLOAD: usize = 65533;

/// Encodes decoded RGB images to JPEG files.
///
/// ## Encoding strategy
/// 1. Pack the (possibly stride-padded) RGB rows into a tight buffer
/// 2. Compress to an in-memory JPEG at the configured quality
/// 3. Splice metadata segments (Exif/XMP as APP1, IPTC as APP13) right
///    after the SOI marker
/// 4. Write to a temporary file in the output directory and persist it
///    atomically, so a failed encode never leaves a partial output file
///
/// Blocks whose payload would overflow a single JPEG marker segment are
/// dropped with a warning rather than failing the whole conversion.
pub struct SoftwareJpegEncoder;

impl SoftwareJpegEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Compress packed RGB pixels to an in-memory JPEG.
    fn compress(image: &DecodedImage, quality: u8) -> Result<Vec<u8>, ConvertError> {
        let packed = image.packed_rgb();
        let mut jpeg = Vec::new();
        let mut writer = RgbJpegWriter::new_with_quality(&mut jpeg, quality);
        writer.encode(packed.as_ref(), image.width, image.height, ColorType::Rgb8)?;
        Ok(jpeg)
    }

    /// Build the APP marker byte + payload for one metadata block.
    ///
    /// Exif data gets the `Exif\0\0` identifier, XMP packets get the Adobe
    /// namespace prefix, IPTC goes into APP13 as-is. `Other` blocks are
    /// dropped: JPEG has no generic container for them.
    fn marker_for(block: &MetadataBlock) -> Option<(u8, Vec<u8>)> {
        match block.kind {
            MetadataKind::Exif => {
                let mut payload = Vec::with_capacity(6 + block.data.len());
                payload.extend_from_slice(b"Exif\0\0");
                payload.extend_from_slice(&block.data);
                Some((0xE1, payload))
            }
            MetadataKind::Xmp => {
                let mut payload = Vec::with_capacity(XMP_NAMESPACE.len() + block.data.len());
                payload.extend_from_slice(XMP_NAMESPACE);
                payload.extend_from_slice(&block.data);
                Some((0xE1, payload))
            }
            MetadataKind::Iptc => Some((0xED, block.data.clone())),
            MetadataKind::Other => None,
        }
    }

    /// Splice metadata segments into a compressed JPEG, right after SOI.
    fn embed_metadata(jpeg: &[u8], metadata: &[MetadataBlock]) -> Result<Vec<u8>, ConvertError> {
        if jpeg.len() < 2 || jpeg[0] != 0xFF || jpeg[1] != 0xD8 {
            return Err(ConvertError::Encode(
                "compressed stream is missing the JPEG SOI marker".to_string(),
            ));
        }

        let mut out = Vec::with_capacity(jpeg.len() + 4096);
        out.extend_from_slice(&jpeg[..2]);

        for block in metadata {
            let Some((marker, payload)) = Self::marker_for(block) else {
                debug!("Dropping metadata block with no JPEG representation");
                continue;
            };
            if payload.len() > MAX_MARKER_PAYLOAD - 2 {
                warn!(
                    "Dropping oversized {:?} metadata block ({} bytes)",
                    block.kind,
                    payload.len()
                );
                continue;
            }
            out.push(0xFF);
            out.push(marker);
            out.extend_from_slice(&((payload.len() as u16 + 2).to_be_bytes()));
            out.extend_from_slice(&payload);
        }

        out.extend_from_slice(&jpeg[2..]);
        Ok(out)
    }
}

impl Default for SoftwareJpegEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl JpegEncoder for SoftwareJpegEncoder {
    fn encode(
        &self,
        image: &DecodedImage,
        quality: u8,
        metadata: &[MetadataBlock],
        output: &Path,
    ) -> Result<(), ConvertError> {
        let jpeg = Self::compress(image, quality)?;
        let bytes = Self::embed_metadata(&jpeg, metadata)?;

        let dir = match output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        // Temp file lives in the destination directory so the final rename
        // stays on one filesystem.
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&bytes)?;
        tmp.persist(output)
            .map_err(|e| ConvertError::Encode(format!("persisting {}: {}", output.display(), e.error)))?;

        debug!(
            "Wrote {} ({} bytes, {} metadata blocks)",
            output.display(),
            bytes.len(),
            metadata.len()
        );
        Ok(())
    }
}
