//! Memory holding the live values of bound variables
//!
//! Variables are owned by the collaborator (typically a renderer), not by
//! keyreel. A binding only stores an address; every capture or tick is
//! handed the collaborator's memory through the [`VariableMemory`] trait.
//!
//! [`MemoryMap`] is a ready-made implementation backed by a set of byte
//! regions, for collaborators that have no memory model of their own.
//!
//! # Example
//!
//! ```
//! use keyreel::memory::{MemoryMap, VariableMemory};
//!
//! let mut memory = MemoryMap::new();
//! memory.add_region(0x1000, 64);
//! memory.write_value(0x1000, 32.0f64).unwrap();
//!
//! assert_eq!(memory.read_value::<f64>(0x1000).unwrap(), 32.0);
//! assert_eq!(memory.read_memory(0x1000, 8).unwrap().len(), 8);
//! ```

use crate::error::{ReelError, Result};
use std::collections::BTreeMap;

/// Access to the memory behind variable bindings
///
/// Implementations must accept reads and writes of 1 to 8 bytes at any
/// bound address.
#[cfg_attr(test, mockall::automock)]
pub trait VariableMemory {
    /// Read `size` bytes starting at `address`
    fn read_memory(&self, address: u64, size: usize) -> Result<Vec<u8>>;

    /// Write `data` starting at `address`
    fn write_memory(&mut self, address: u64, data: &[u8]) -> Result<()>;
}

/// Region-based memory addressed by absolute address
#[derive(Debug, Default, Clone)]
pub struct MemoryMap {
    /// Memory regions mapped by base address
    regions: BTreeMap<u64, Vec<u8>>,
}

impl MemoryMap {
    /// Create a new empty memory map
    pub fn new() -> Self {
        Self {
            regions: BTreeMap::new(),
        }
    }

    /// Add a zero-filled memory region
    pub fn add_region(&mut self, base_address: u64, size: usize) {
        self.regions.insert(base_address, vec![0u8; size]);
    }

    /// Number of mapped regions
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    fn locate(&self, address: u64, size: usize) -> Option<(u64, usize)> {
        let (&base, region) = self.regions.range(..=address).next_back()?;
        let offset = (address - base) as usize;
        if offset.checked_add(size)? <= region.len() {
            Some((base, offset))
        } else {
            None
        }
    }

    /// Write a typed value at the given address
    pub fn write_value<T: MemoryValue>(&mut self, address: u64, value: T) -> Result<()> {
        self.write_memory(address, &value.to_le_vec())
    }

    /// Read a typed value from the given address
    pub fn read_value<T: MemoryValue>(&self, address: u64) -> Result<T> {
        let bytes = self.read_memory(address, T::SIZE)?;
        Ok(T::from_le_slice(&bytes))
    }
}

impl VariableMemory for MemoryMap {
    fn read_memory(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        let (base, offset) = self
            .locate(address, size)
            .ok_or_else(|| ReelError::MemoryAccess {
                address,
                message: format!("{} bytes not mapped", size),
            })?;
        Ok(self.regions[&base][offset..offset + size].to_vec())
    }

    fn write_memory(&mut self, address: u64, data: &[u8]) -> Result<()> {
        let (base, offset) = self
            .locate(address, data.len())
            .ok_or_else(|| ReelError::MemoryAccess {
                address,
                message: format!("{} bytes not mapped", data.len()),
            })?;
        if let Some(region) = self.regions.get_mut(&base) {
            region[offset..offset + data.len()].copy_from_slice(data);
        }
        Ok(())
    }
}

/// Scalar types that can be stored in a [`MemoryMap`]
pub trait MemoryValue: Sized {
    /// Width in bytes
    const SIZE: usize;

    /// Little-endian bytes
    fn to_le_vec(&self) -> Vec<u8>;

    /// Decode from exactly `SIZE` little-endian bytes
    fn from_le_slice(bytes: &[u8]) -> Self;
}

macro_rules! impl_memory_value {
    ($($t:ty),*) => {
        $(
            impl MemoryValue for $t {
                const SIZE: usize = std::mem::size_of::<$t>();

                fn to_le_vec(&self) -> Vec<u8> {
                    self.to_le_bytes().to_vec()
                }

                fn from_le_slice(bytes: &[u8]) -> Self {
                    let mut buf = [0u8; std::mem::size_of::<$t>()];
                    buf.copy_from_slice(&bytes[..std::mem::size_of::<$t>()]);
                    <$t>::from_le_bytes(buf)
                }
            }
        )*
    };
}

impl_memory_value!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_read_write() {
        let mut mem = MemoryMap::new();
        mem.add_region(0x2000, 16);

        mem.write_memory(0x2004, &[1, 2, 3, 4]).unwrap();
        assert_eq!(mem.read_memory(0x2004, 4).unwrap(), vec![1, 2, 3, 4]);
        assert_eq!(mem.read_memory(0x2000, 2).unwrap(), vec![0, 0]);
    }

    #[test]
    fn test_out_of_region_access_fails() {
        let mut mem = MemoryMap::new();
        mem.add_region(0x2000, 8);

        assert!(mem.read_memory(0x1FFF, 1).is_err());
        assert!(mem.read_memory(0x2004, 8).is_err());
        assert!(mem.write_memory(0x2008, &[1]).is_err());
    }

    #[test]
    fn test_picks_containing_region() {
        let mut mem = MemoryMap::new();
        mem.add_region(0x1000, 8);
        mem.add_region(0x3000, 8);

        mem.write_value(0x3000, 7u32).unwrap();
        mem.write_value(0x1004, -3i32).unwrap();
        assert_eq!(mem.read_value::<u32>(0x3000).unwrap(), 7);
        assert_eq!(mem.read_value::<i32>(0x1004).unwrap(), -3);
        assert_eq!(mem.region_count(), 2);
    }

    #[test]
    fn test_typed_floats() {
        let mut mem = MemoryMap::new();
        mem.add_region(0x10, 16);
        mem.write_value(0x10, 1.25f32).unwrap();
        mem.write_value(0x18, -8.5f64).unwrap();
        assert_eq!(mem.read_value::<f32>(0x10).unwrap(), 1.25);
        assert_eq!(mem.read_value::<f64>(0x18).unwrap(), -8.5);
    }
}
