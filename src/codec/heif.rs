//! # HEIF Decode Collaborator (libheif)
//!
//! Native HEIF/HEIC decoding through `libheif-rs`. Compiled only with the
//! `libheif` feature because it links the system libheif library.
//!
//! Resource lifetimes (contexts, handles, images) are managed by the
//! binding's own Drop impls, so every exit path releases them; libheif
//! error codes are converted to `ConvertError` at this boundary.

use crate::codec::{DecodedImage, HeifDecoder, MetadataBlock, MetadataKind};
use crate::error::ConvertError;
use libheif_rs::{ColorSpace, HeifContext, ImageHandle, LibHeif, RgbChroma};
use std::path::Path;
use tracing::debug;

pub struct LibheifDecoder {
    lib: LibHeif,
}

impl LibheifDecoder {
    pub fn new() -> Self {
        Self { lib: LibHeif::new() }
    }

    fn primary_handle(path: &Path) -> Result<ImageHandle, ConvertError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| ConvertError::Decode(format!("non-UTF-8 path: {}", path.display())))?;
        let ctx = HeifContext::read_from_file(path_str)
            .map_err(|e| ConvertError::Decode(format!("reading {}: {}", path.display(), e)))?;
        ctx.primary_image_handle()
            .map_err(|e| ConvertError::Decode(format!("no primary image in {}: {}", path.display(), e)))
    }
}

impl Default for LibheifDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl HeifDecoder for LibheifDecoder {
    fn probe_dimensions(&self, path: &Path) -> Result<(u32, u32), ConvertError> {
        let handle = Self::primary_handle(path)?;
        Ok((handle.width(), handle.height()))
    }

    fn decode(&self, path: &Path) -> Result<DecodedImage, ConvertError> {
        let handle = Self::primary_handle(path)?;
        let image = self
            .lib
            .decode(&handle, ColorSpace::Rgb(RgbChroma::Rgb), None)
            .map_err(|e| ConvertError::Decode(format!("decoding {}: {}", path.display(), e)))?;

        let planes = image.planes();
        let plane = planes.interleaved.ok_or_else(|| {
            ConvertError::Decode(format!("no interleaved RGB plane in {}", path.display()))
        })?;

        Ok(DecodedImage {
            pixels: plane.data.to_vec(),
            stride: plane.stride,
            width: plane.width,
            height: plane.height,
        })
    }

    fn extract_metadata(&self, path: &Path) -> Vec<MetadataBlock> {
        let handle = match Self::primary_handle(path) {
            Ok(handle) => handle,
            Err(e) => {
                debug!("Metadata extraction skipped for {}: {}", path.display(), e);
                return Vec::new();
            }
        };

        handle
            .all_metadata()
            .into_iter()
            .filter(|item| !item.raw_data.is_empty())
            .map(|item| MetadataBlock {
                kind: MetadataKind::from_item_type(&item.item_type),
                data: item.raw_data,
            })
            .collect()
    }
}
