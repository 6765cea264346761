//! Test double implementing both codec traits, used by scheduler and
//! orchestrator tests. Counts decode invocations so tests can assert which
//! gates short-circuit before the decode step.

use crate::codec::{DecodedImage, HeifDecoder, JpegEncoder, MetadataBlock};
use crate::error::ConvertError;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

pub struct StubCodec {
    /// Dimensions the probe reports; `None` simulates a probe failure.
    pub dimensions: Option<(u32, u32)>,
    pub fail_decode: bool,
    pub fail_encode: bool,
    pub metadata: Vec<MetadataBlock>,
    pub probe_calls: AtomicUsize,
    pub decode_calls: AtomicUsize,
    pub encode_calls: AtomicUsize,
}

impl StubCodec {
    pub fn with_dimensions(width: u32, height: u32) -> Self {
        Self {
            dimensions: Some((width, height)),
            ..Self::unprobeable()
        }
    }

    pub fn unprobeable() -> Self {
        Self {
            dimensions: None,
            fail_decode: false,
            fail_encode: false,
            metadata: Vec::new(),
            probe_calls: AtomicUsize::new(0),
            decode_calls: AtomicUsize::new(0),
            encode_calls: AtomicUsize::new(0),
        }
    }

    pub fn decode_count(&self) -> usize {
        self.decode_calls.load(Ordering::SeqCst)
    }

    pub fn encode_count(&self) -> usize {
        self.encode_calls.load(Ordering::SeqCst)
    }
}

impl HeifDecoder for StubCodec {
    fn probe_dimensions(&self, _path: &Path) -> Result<(u32, u32), ConvertError> {
        self.probe_calls.fetch_add(1, Ordering::SeqCst);
        self.dimensions
            .ok_or_else(|| ConvertError::Decode("stub probe failure".to_string()))
    }

    fn decode(&self, _path: &Path) -> Result<DecodedImage, ConvertError> {
        self.decode_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_decode {
            return Err(ConvertError::Decode("stub decode failure".to_string()));
        }
        let (width, height) = self.dimensions.unwrap_or((4, 4));
        Ok(DecodedImage {
            pixels: vec![100u8; (width * height * 3) as usize],
            stride: width as usize * 3,
            width,
            height,
        })
    }

    fn extract_metadata(&self, _path: &Path) -> Vec<MetadataBlock> {
        self.metadata.clone()
    }
}

impl JpegEncoder for StubCodec {
    fn encode(
        &self,
        _image: &DecodedImage,
        _quality: u8,
        _metadata: &[MetadataBlock],
        output: &Path,
    ) -> Result<(), ConvertError> {
        self.encode_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_encode {
            return Err(ConvertError::Encode("stub encode failure".to_string()));
        }
        std::fs::write(output, b"\xFF\xD8stub\xFF\xD9")?;
        Ok(())
    }
}
