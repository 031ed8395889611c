//! Allocation engine
//!
//! # Architecture
//!
//! ```text
//! caller ──(text, DataType)──→ MemoryEngine (Mutex)
//!                                 │
//!                                 ├─→ encoder:  validate → normalize → encode
//!                                 ├─→ AllocationTable
//!                                 │     ├─→ AddressSpace   (synthetic addresses)
//!                                 │     ├─→ BlockId → buffer
//!                                 │     └─→ MemoryStatistics
//!                                 └─→ broadcast::Sender<MemoryEvent>
//! ```
//!
//! The encoder is pure. All mutable state lives in the allocation table,
//! which the engine serializes behind one lock.

pub mod address;
pub mod block;
pub mod data_type;
pub mod encoder;
pub mod engine;
pub mod events;
pub mod stats;
pub mod table;

pub use address::AddressSpace;
pub use block::{Address, BlockId, MemoryBlock};
pub use data_type::DataType;
pub use encoder::{check, encode, hex_dump, normalize, size_of, validate, Value};
pub use engine::MemoryEngine;
pub use events::MemoryEvent;
pub use stats::MemoryStatistics;
pub use table::AllocationTable;
