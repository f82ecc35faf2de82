//! Aggregate heap diagnostics.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Snapshot of heap occupancy produced by [`Heap::stats`].
///
/// [`Heap::stats`]: crate::Heap::stats
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeapStats {
    /// All blocks in the directory, used and free.
    pub total_blocks: usize,
    pub used_blocks: usize,
    pub free_blocks: usize,
    /// Sum of used payload sizes, excluding headers.
    pub used_bytes: u64,
    /// Sum of free payload sizes, excluding headers.
    pub free_bytes: u64,
    /// Largest single free payload; the biggest request that can succeed
    /// without coalescing opportunities arising first.
    pub largest_free_bytes: u64,
    /// External fragmentation: `1 - largest_free_bytes / free_bytes`,
    /// `0.0` when no free bytes remain.
    pub fragmentation: f64,
}

impl HeapStats {
    pub(crate) fn fragmentation_ratio(largest_free: u64, total_free: u64) -> f64 {
        if total_free == 0 {
            0.0
        } else {
            1.0 - largest_free as f64 / total_free as f64
        }
    }
}

impl fmt::Display for HeapStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Heap Statistics ---")?;
        writeln!(f, "Total blocks:     {}", self.total_blocks)?;
        writeln!(
            f,
            "Used blocks:      {} ({} bytes)",
            self.used_blocks, self.used_bytes
        )?;
        writeln!(
            f,
            "Free blocks:      {} ({} bytes)",
            self.free_blocks, self.free_bytes
        )?;
        writeln!(f, "Largest free:     {} bytes", self.largest_free_bytes)?;
        write!(f, "Fragmentation:    {:.1}%", self.fragmentation * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragmentation_ratio() {
        // Single free region: no fragmentation
        assert_eq!(HeapStats::fragmentation_ratio(1000, 1000), 0.0);
        // Largest holds half the free space
        assert_eq!(HeapStats::fragmentation_ratio(500, 1000), 0.5);
        // Fully allocated heap reports zero rather than dividing by zero
        assert_eq!(HeapStats::fragmentation_ratio(0, 0), 0.0);
    }
}
