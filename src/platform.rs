//! # Platform Probes Module
//!
//! Probe di sistema interrogati una sola volta allo startup: memoria
//! disponibile e numero di worker derivato dai core fisici.

use sysinfo::{MemoryRefreshKind, RefreshKind, System};
use tracing::debug;

/// Fallback when the memory probe reports nothing useful (4 GiB).
const FALLBACK_AVAILABLE_MB: u64 = 4096;

/// Share of available memory used for the automatic budget.
const AUTO_BUDGET_NUMERATOR: u64 = 3;
const AUTO_BUDGET_DENOMINATOR: u64 = 4;

/// Available system memory in MB, probed once.
pub fn available_memory_mb() -> u64 {
    let sys = System::new_with_specifics(
        RefreshKind::new().with_memory(MemoryRefreshKind::everything()),
    );
    let available = sys.available_memory() / (1024 * 1024);
    if available == 0 {
        debug!("Memory probe returned nothing, assuming {}MB", FALLBACK_AVAILABLE_MB);
        return FALLBACK_AVAILABLE_MB;
    }
    available
}

/// Automatic memory budget: 75% of probed available memory.
pub fn auto_memory_budget_mb() -> u64 {
    available_memory_mb() * AUTO_BUDGET_NUMERATOR / AUTO_BUDGET_DENOMINATOR
}

/// Number of parallel workers for the pool.
///
/// Half the physical core count approximates the performance cores on
/// hybrid parts and leaves headroom elsewhere; logical parallelism is the
/// fallback, the floor is 2.
pub fn detect_worker_count() -> usize {
    let sys = System::new_all();
    let cores = sys
        .physical_core_count()
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(2)
        });
    ((cores + 1) / 2).max(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_count_floor() {
        assert!(detect_worker_count() >= 2);
    }

    #[test]
    fn test_available_memory_is_nonzero() {
        assert!(available_memory_mb() > 0);
    }

    #[test]
    fn test_auto_budget_is_three_quarters() {
        let available = available_memory_mb();
        let budget = auto_memory_budget_mb();
        assert!(budget <= available);
        assert!(budget >= available / 2);
    }
}
