//! # Memory Estimation Module
//!
//! Stima euristica del costo di memoria di una conversione, calcolata dal
//! probe delle dimensioni senza decodifica completa.
//!
//! ## Formula:
//! - buffer RGB decodificato: `width * height * 3` byte
//! - buffer di encoding JPEG (stima conservativa): `width * height * 4` byte
//! - overhead fisso per metadata e librerie: 10 MiB
//! - margine di sicurezza: 1.5x sul totale, arrotondato per eccesso ai MB
//!
//! Un probe fallito produce stima 0: "sconosciuto, non grande". I job a
//! costo 0 vengono schedulati per primi e sono esenti dal memory gate.

use crate::codec::HeifDecoder;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

const MIB: f64 = 1024.0 * 1024.0;

/// Fixed allowance for metadata and library overhead, in bytes.
const OVERHEAD_BYTES: u64 = 10 * 1024 * 1024;

/// Safety margin covering unmodeled allocator overhead.
const SAFETY_MARGIN: f64 = 1.5;

/// Heuristic per-job memory cost estimator
pub struct MemoryEstimator {
    probe: Arc<dyn HeifDecoder>,
}

impl MemoryEstimator {
    pub fn new(probe: Arc<dyn HeifDecoder>) -> Self {
        Self { probe }
    }

    /// Estimate the memory cost in MB for converting the image at `path`.
    ///
    /// Returns 0 when the dimension probe fails; that is a policy, not an
    /// error: absence of information is treated as "unknown, not large".
    pub fn estimate(&self, path: &Path) -> u64 {
        match self.probe.probe_dimensions(path) {
            Ok((width, height)) => Self::estimate_from_dimensions(width, height),
            Err(e) => {
                debug!("Dimension probe failed for {}: {}", path.display(), e);
                0
            }
        }
    }

    /// Cost in MB for an image of the given dimensions.
    pub fn estimate_from_dimensions(width: u32, height: u32) -> u64 {
        let pixels = width as u64 * height as u64;
        let decoded_bytes = pixels * 3;
        let encode_bytes = pixels * 4;
        let total = (decoded_bytes + encode_bytes + OVERHEAD_BYTES) as f64;
        (total * SAFETY_MARGIN / MIB).ceil() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::stub::StubCodec;

    #[test]
    fn test_estimate_formula() {
        // 1000x1000: (3M + 4M + 10MiB) * 1.5 / MiB, rounded up
        let expected =
            ((7_000_000.0 + 10.0 * MIB) * 1.5 / MIB).ceil() as u64;
        assert_eq!(MemoryEstimator::estimate_from_dimensions(1000, 1000), expected);
    }

    #[test]
    fn test_estimate_is_quadratic_in_linear_dimensions() {
        let base = MemoryEstimator::estimate_from_dimensions(2000, 1500);
        let doubled = MemoryEstimator::estimate_from_dimensions(4000, 3000);

        // Doubling both dimensions roughly quadruples the cost once the
        // fixed overhead term is removed; rounding leaves up to a MB of
        // slack on each estimate.
        let overhead_mb = (OVERHEAD_BYTES as f64 * SAFETY_MARGIN / MIB).ceil() as u64;
        let ratio = (doubled - overhead_mb) as f64 / (base - overhead_mb) as f64;
        assert!(ratio > 3.5 && ratio < 4.5, "ratio was {}", ratio);
    }

    #[test]
    fn test_probe_failure_yields_zero() {
        let estimator = MemoryEstimator::new(Arc::new(StubCodec::unprobeable()));
        assert_eq!(estimator.estimate(Path::new("/no/such.heic")), 0);
    }

    #[test]
    fn test_probe_success_uses_dimensions() {
        let estimator = MemoryEstimator::new(Arc::new(StubCodec::with_dimensions(4000, 3000)));
        assert_eq!(
            estimator.estimate(Path::new("/a.heic")),
            MemoryEstimator::estimate_from_dimensions(4000, 3000)
        );
    }
}
