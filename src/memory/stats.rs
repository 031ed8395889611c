//! Aggregate allocation statistics

use serde::Serialize;
use std::sync::Arc;

use super::block::MemoryBlock;

/// Counters derived from the allocate/deallocate event stream.
///
/// Only the allocation table mutates these; callers get snapshots. History
/// entries are shared, so a snapshot copies pointers rather than blocks.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MemoryStatistics {
    /// Every successful allocation ever made.
    pub total_allocations: u64,
    /// Live blocks right now.
    pub current_allocations: u64,
    /// Sum of all sizes ever allocated.
    pub total_bytes_allocated: u64,
    /// Sum of sizes of live blocks.
    pub current_bytes_allocated: u64,
    /// Running maximum of `current_bytes_allocated`.
    pub peak_bytes_allocated: u64,
    /// Every block ever allocated, in allocation order, freed ones included.
    pub allocation_history: Vec<Arc<MemoryBlock>>,
}

impl MemoryStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_allocation(&mut self, block: &MemoryBlock) {
        let size = block.size() as u64;
        self.total_allocations += 1;
        self.current_allocations += 1;
        self.total_bytes_allocated += size;
        self.current_bytes_allocated += size;
        self.peak_bytes_allocated = self.peak_bytes_allocated.max(self.current_bytes_allocated);
        self.allocation_history.push(Arc::new(block.clone()));
    }

    pub(crate) fn record_deallocation(&mut self, block: &MemoryBlock) {
        self.current_allocations = self.current_allocations.saturating_sub(1);
        self.current_bytes_allocated = self
            .current_bytes_allocated
            .saturating_sub(block.size() as u64);
    }

    /// Zero the live counters; totals, peak and history survive.
    pub(crate) fn reset_current(&mut self) {
        self.current_allocations = 0;
        self.current_bytes_allocated = 0;
    }

    /// Mean size over every allocation so far.
    pub fn average_block_size(&self) -> f64 {
        if self.total_allocations > 0 {
            self.total_bytes_allocated as f64 / self.total_allocations as f64
        } else {
            0.0
        }
    }
}
