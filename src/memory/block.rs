//! Allocated block records and their identities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::data_type::DataType;
use super::encoder::Value;

/// Opaque identity of a block.
///
/// A 128-bit UUIDv4, so an id is never handed out twice while the process
/// runs. Independent of the block's [`Address`].
///
/// # Examples
///
/// ```rust
/// use memsim::memory::BlockId;
///
/// let a = BlockId::new();
/// let b = BlockId::new();
/// assert_ne!(a, b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockId(Uuid);

impl BlockId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for BlockId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Synthetic address token for a live block's buffer.
///
/// Only meaningful as a label: unique among live blocks, not a pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(u64);

impl Address {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:012x}", self.0)
    }
}

/// One allocated unit of typed data.
///
/// Immutable once created; the engine hands out clones. The backing bytes
/// live in the allocation table, not here. [`MemoryBlock::bytes_representation`]
/// recomputes them from the canonical value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryBlock {
    id: BlockId,
    address: Address,
    content: String,
    data_type: DataType,
    size: usize,
    allocated_at: DateTime<Utc>,
    #[serde(skip)]
    value: Value,
}

impl MemoryBlock {
    pub(crate) fn new(
        id: BlockId,
        address: Address,
        value: Value,
        allocated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            address,
            content: value.content(),
            data_type: value.data_type(),
            size: value.size(),
            allocated_at,
            value,
        }
    }

    pub fn id(&self) -> BlockId {
        self.id
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Canonical text of the value.
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Bytes backing the block, terminator included.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn allocated_at(&self) -> DateTime<Utc> {
        self.allocated_at
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Raw memory layout of the block's value, derived on demand.
    pub fn bytes_representation(&self) -> Vec<u8> {
        self.value.to_bytes()
    }
}

impl fmt::Display for MemoryBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} ({} bytes)",
            self.address, self.data_type, self.content, self.size
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_id_unique() {
        let ids: std::collections::HashSet<_> = (0..100).map(|_| BlockId::new()).collect();
        assert_eq!(ids.len(), 100);

        let uuid = Uuid::new_v4();
        assert_eq!(BlockId::from_uuid(uuid).as_uuid(), uuid);
    }

    #[test]
    fn test_address_display() {
        assert_eq!(Address::new(0x1000).to_string(), "0x000000001000");
        assert_eq!(Address::new(0xdead_beef).to_string(), "0x0000deadbeef");
    }

    #[test]
    fn test_block_fields_derived_from_value() {
        let value = Value::parse("hi", DataType::String).unwrap();
        let block = MemoryBlock::new(BlockId::new(), Address::new(0x1000), value, Utc::now());

        assert_eq!(block.content(), "hi");
        assert_eq!(block.data_type(), DataType::String);
        assert_eq!(block.size(), 3);
        assert_eq!(block.bytes_representation(), vec![0x68, 0x69, 0x00]);
        assert_eq!(block.size(), block.bytes_representation().len());
    }

    #[test]
    fn test_block_serializes_without_value() {
        let value = Value::parse("42", DataType::Integer).unwrap();
        let block = MemoryBlock::new(BlockId::new(), Address::new(0x2000), value, Utc::now());

        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["content"], "42");
        assert_eq!(json["data_type"], "integer");
        assert_eq!(json["size"], 8);
        assert!(json.get("value").is_none());
    }
}
