//! Allocation table: the live blocks and the buffers behind them
//!
//! # Architecture
//!
//! ```text
//! AllocationTable
//!   ├─→ live:     [B1, B2, B4]             (allocation order)
//!   ├─→ buffers:  B1 → [68 69 00]          (identity → owned bytes)
//!   │             B2 → [00 .. 00 01]
//!   │             B4 → [5B 31 5D 00]
//!   ├─→ addresses: bump cursor             (synthetic, never reused)
//!   └─→ stats:    MemoryStatistics
//! ```
//!
//! The table is plain single-writer state (`&mut self`). Serialization of
//! concurrent callers is the job of [`MemoryEngine`](super::engine::MemoryEngine),
//! which keeps one of these behind a single mutex.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::{debug, trace};

use super::address::AddressSpace;
use super::block::{BlockId, MemoryBlock};
use super::data_type::DataType;
use super::encoder::Value;
use super::stats::MemoryStatistics;
use crate::error::Result;

#[derive(Debug)]
pub struct AllocationTable {
    /// Live blocks in allocation order
    live: Vec<MemoryBlock>,
    /// Backing buffer for each live block, exactly `size` bytes
    buffers: HashMap<BlockId, Box<[u8]>>,
    addresses: AddressSpace,
    stats: MemoryStatistics,
    last_allocated_at: Option<DateTime<Utc>>,
}

impl AllocationTable {
    pub fn new(addresses: AddressSpace) -> Self {
        Self {
            live: Vec::new(),
            buffers: HashMap::new(),
            addresses,
            stats: MemoryStatistics::new(),
            last_allocated_at: None,
        }
    }

    /// Validate, encode and store a new block.
    ///
    /// Nothing is mutated unless the whole allocation succeeds.
    pub fn allocate(&mut self, text: &str, data_type: DataType) -> Result<MemoryBlock> {
        let value = Value::parse(text, data_type)?;
        let size = value.size();
        let address = self.addresses.mint(size)?;

        let buffer = value.to_bytes().into_boxed_slice();
        debug_assert_eq!(buffer.len(), size);

        let block = MemoryBlock::new(BlockId::new(), address, value, self.next_timestamp());

        self.buffers.insert(block.id(), buffer);
        self.live.push(block.clone());
        self.stats.record_allocation(&block);

        debug!(
            id = %block.id(),
            address = %block.address(),
            data_type = %data_type,
            size,
            "Allocated block"
        );
        Ok(block)
    }

    /// Release a block. Unknown or already-released ids are a no-op.
    pub fn deallocate(&mut self, id: BlockId) -> Option<MemoryBlock> {
        let Some(position) = self.live.iter().position(|block| block.id() == id) else {
            trace!(id = %id, "Deallocate of unknown block ignored");
            return None;
        };

        let block = self.live.remove(position);
        self.buffers.remove(&id);
        self.stats.record_deallocation(&block);

        debug!(id = %id, address = %block.address(), size = block.size(), "Deallocated block");
        Some(block)
    }

    /// Release every live block. Returns how many were released.
    pub fn deallocate_all(&mut self) -> usize {
        let released = self.live.len();
        self.buffers.clear();
        self.live.clear();
        self.stats.reset_current();
        released
    }

    pub fn blocks(&self) -> &[MemoryBlock] {
        &self.live
    }

    pub fn get(&self, id: BlockId) -> Option<&MemoryBlock> {
        self.live.iter().find(|block| block.id() == id)
    }

    /// The backing buffer of a live block.
    pub fn buffer(&self, id: BlockId) -> Option<&[u8]> {
        self.buffers.get(&id).map(|buffer| &buffer[..])
    }

    pub fn statistics(&self) -> &MemoryStatistics {
        &self.stats
    }

    pub fn addresses(&self) -> &AddressSpace {
        &self.addresses
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Wall clock, held back so creation order stays non-decreasing.
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let stamp = match self.last_allocated_at {
            Some(last) if last > now => last,
            _ => now,
        };
        self.last_allocated_at = Some(stamp);
        stamp
    }
}
