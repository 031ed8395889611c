//! Synthetic address minting
//!
//! A bump cursor over an imaginary heap. Each block takes the cursor's
//! current position; the cursor then advances by the block size rounded up
//! to the configured alignment.
//!
//! ```text
//!   base                                                cursor
//!    │                                                    │
//!    ▼                                                    ▼
//!    ┌────────┬────────────────┬────────┬─────────────────┬───────────
//!    │ A1 (8) │ A2 (13 → 16)   │ A3 (8) │ A4 (3 → 8)      │  next ...
//!    └────────┴────────────────┴────────┴─────────────────┴───────────
//! ```
//!
//! Freed ranges are never handed out again, so two blocks alive at the same
//! time can never share an address.

use super::block::Address;
use crate::error::{Error, Result};

/// Round `value` up to the next multiple of `alignment` (a power of two).
pub fn align_up(value: u64, alignment: u64) -> Option<u64> {
    debug_assert!(alignment.is_power_of_two());
    value
        .checked_add(alignment - 1)
        .map(|v| v & !(alignment - 1))
}

#[derive(Debug, Clone)]
pub struct AddressSpace {
    base: u64,
    alignment: u64,
    cursor: u64,
}

impl AddressSpace {
    /// Start a cursor at `base` rounded up to `alignment`.
    pub fn new(base: u64, alignment: u64) -> Result<Self> {
        if !alignment.is_power_of_two() {
            return Err(Error::InvalidArgument(format!(
                "Address alignment must be a power of two, got {}",
                alignment
            )));
        }
        let base = align_up(base, alignment).ok_or_else(|| {
            Error::InvalidArgument(format!(
                "Base address {:#x} cannot be aligned to {}",
                base, alignment
            ))
        })?;
        Ok(Self {
            base,
            alignment,
            cursor: base,
        })
    }

    /// Reserve `size` bytes and return the address of the reservation.
    pub fn mint(&mut self, size: usize) -> Result<Address> {
        let span = align_up(size.max(1) as u64, self.alignment)
            .ok_or_else(|| Error::Internal(format!("Block size {} overflows address space", size)))?;
        let next = self
            .cursor
            .checked_add(span)
            .ok_or_else(|| Error::Internal("Synthetic address space exhausted".to_string()))?;

        let address = Address::new(self.cursor);
        self.cursor = next;
        Ok(address)
    }

    pub fn base(&self) -> u64 {
        self.base
    }

    /// Bytes of address space consumed so far, including alignment padding.
    pub fn consumed(&self) -> u64 {
        self.cursor - self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_up() {
        assert_eq!(align_up(0, 8), Some(0));
        assert_eq!(align_up(1, 8), Some(8));
        assert_eq!(align_up(8, 8), Some(8));
        assert_eq!(align_up(13, 8), Some(16));
        assert_eq!(align_up(13, 1), Some(13));
        assert_eq!(align_up(u64::MAX, 8), None);
    }

    #[test]
    fn test_mint_advances_by_aligned_size() {
        let mut space = AddressSpace::new(0x1000, 8).unwrap();

        assert_eq!(space.mint(8).unwrap().as_u64(), 0x1000);
        assert_eq!(space.mint(13).unwrap().as_u64(), 0x1008);
        assert_eq!(space.mint(3).unwrap().as_u64(), 0x1018);
        assert_eq!(space.consumed(), 0x20);
    }

    #[test]
    fn test_addresses_never_repeat() {
        let mut space = AddressSpace::new(0, 16).unwrap();
        let mut seen = std::collections::HashSet::new();
        for size in 1..200 {
            assert!(seen.insert(space.mint(size).unwrap()));
        }
    }

    #[test]
    fn test_unaligned_base_is_rounded() {
        let space = AddressSpace::new(0x1003, 8).unwrap();
        assert_eq!(space.base(), 0x1008);
    }

    #[test]
    fn test_base_that_cannot_be_aligned_is_rejected() {
        assert!(matches!(
            AddressSpace::new(u64::MAX - 2, 8),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_non_power_of_two_alignment_is_rejected() {
        assert!(AddressSpace::new(0x1000, 12).is_err());
        assert!(AddressSpace::new(0x1000, 0).is_err());
    }

    #[test]
    fn test_exhaustion_is_an_error() {
        let mut space = AddressSpace::new(u64::MAX - 15, 8).unwrap();
        assert!(space.mint(8).is_ok());
        assert!(space.mint(8).is_err());
    }
}
