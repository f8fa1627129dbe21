//! Simulated address space with byte-granular symbolic content.
//!
//! This module provides [`AddressSpace`], the memory surface the string models
//! read from and write into. Every cell holds a [`Value`], so concrete and
//! symbolic bytes live side by side in the same region and a write of a
//! symbolic byte is no different from a write of a concrete one.
//!
//! # Address Space
//!
//! Regions are mapped at unique base addresses in a simulated address space
//! (growing upward from an architecture-dependent start, 16-byte aligned).
//! The addresses don't correspond to real process memory but give the modeled
//! code consistent pointers. An access must lie entirely inside one mapped
//! region.
//!
//! # Composition Rules
//!
//! Multi-byte reads compose little-endian and require every touched cell to be
//! concrete; multi-byte writes decompose the same way. An access wider than a
//! byte that lands on a symbolic cell is rejected with
//! [`Error::SymbolicAccess`](crate::Error::SymbolicAccess): the models operate
//! on single bytes, and composing wide symbolic terms belongs to the embedding
//! engine's CPU layer.
//!
//! # Memory Limits
//!
//! Total mapped size is bounded by a configurable limit (default 16MB) to
//! prevent runaway allocation. Exceeding it returns
//! [`Error::MemoryLimitExceeded`](crate::Error::MemoryLimitExceeded).

use std::collections::BTreeMap;

use bitflags::bitflags;

use crate::{expr::BitWidth, value::Value, Error, Result};

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    /// Protection mask of a mapped region.
    pub struct MemoryProtection: u8 {
        /// Region contents may be read
        const READ = 0x1;
        /// Region contents may be written
        const WRITE = 0x2;
        /// Region contents may be executed
        const EXECUTE = 0x4;
    }
}

impl MemoryProtection {
    /// Readable and writable, the protection almost every model buffer wants.
    pub const RW: MemoryProtection = MemoryProtection::READ.union(MemoryProtection::WRITE);
}

/// A mapped region of simulated memory (internal).
///
/// Tracks one mapping: its cells, its protection and a validity flag that is
/// cleared on unmap. Invalid regions stay in the map so a stale pointer is
/// reported as stale instead of landing in a recycled mapping.
#[derive(Clone, Debug)]
struct MappedRegion {
    /// One [`Value`] per byte of the region.
    cells: Vec<Value>,

    /// Protection checked on every access.
    protection: MemoryProtection,

    /// Whether this region is valid (not unmapped).
    valid: bool,
}

impl MappedRegion {
    /// Creates a region of `size` concrete zero bytes.
    fn new(size: usize, protection: MemoryProtection) -> Self {
        MappedRegion {
            cells: vec![Value::byte(0); size],
            protection,
            valid: true,
        }
    }

    /// Returns the size of this region in bytes.
    #[inline]
    fn size(&self) -> usize {
        self.cells.len()
    }
}

/// Simulated memory mapping addresses to concrete or symbolic byte cells.
///
/// The address space carries the pointer width of the modeled target
/// ([`AddressSpace::address_width`]), which the string models use as the width
/// of their results.
///
/// # Example
///
/// ```rust
/// use binsym::{AddressSpace, BitWidth, MemoryProtection, Value};
///
/// let mut space = AddressSpace::new(BitWidth::W64);
/// let base = space.map(64, MemoryProtection::RW)?;
///
/// space.write_bytes(base, b"hello\0")?;
/// assert_eq!(
///     space.read(base, BitWidth::BYTE)?,
///     Value::byte(b'h'),
/// );
/// # Ok::<(), binsym::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct AddressSpace {
    /// Regions keyed by base address; ordered so containment lookups can
    /// walk down to the nearest base.
    regions: BTreeMap<u64, MappedRegion>,
    /// Next base address to hand out.
    next_address: u64,
    /// Pointer width of the modeled target.
    address_width: BitWidth,
    /// Total bytes currently mapped.
    current_size: usize,
    /// Maximum allowed total mapping.
    max_size: usize,
}

impl AddressSpace {
    /// Default total mapping budget (16MB).
    pub const DEFAULT_LIMIT: usize = 16 * 1024 * 1024;

    /// Creates an address space for a target with the given pointer width.
    #[must_use]
    pub fn new(address_width: BitWidth) -> Self {
        Self::with_limit(address_width, Self::DEFAULT_LIMIT)
    }

    /// Creates an address space with an explicit total mapping budget.
    #[must_use]
    pub fn with_limit(address_width: BitWidth, max_size: usize) -> Self {
        AddressSpace {
            regions: BTreeMap::new(),
            next_address: Self::initial_base(address_width),
            address_width,
            current_size: 0,
            max_size,
        }
    }

    /// Start of the simulated mapping range for a pointer width.
    ///
    /// High enough to stay clear of low addresses the modeled code treats as
    /// special, and inside the representable range of the width.
    fn initial_base(address_width: BitWidth) -> u64 {
        if address_width.bits() >= 48 {
            0x7FFF_0000_0000
        } else {
            0x4000_0000 & address_width.mask()
        }
    }

    /// Returns the pointer width of the modeled target.
    #[must_use]
    pub fn address_width(&self) -> BitWidth {
        self.address_width
    }

    /// Maps a new zeroed region and returns its base address.
    ///
    /// The region starts as `size` concrete zero bytes; the base is aligned
    /// to 16 bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MemoryLimitExceeded`] if the mapping would exceed the
    /// configured budget, or [`Error::InvalidPointer`] if the address space
    /// itself is exhausted.
    pub fn map(&mut self, size: usize, protection: MemoryProtection) -> Result<u64> {
        if self.current_size + size > self.max_size {
            return Err(Error::MemoryLimitExceeded {
                current: self.current_size,
                requested: size,
                limit: self.max_size,
            });
        }

        let address = self.next_address;
        let end = address.checked_add(size as u64).filter(|end| {
            end.checked_sub(1)
                .is_some_and(|last| last <= self.address_width.mask())
        });
        let Some(end) = end else {
            return Err(Error::InvalidPointer {
                address,
                reason: "mapping range exhausted for the target pointer width",
            });
        };

        // Align the next base to 16 bytes
        self.next_address = (end + 15) & !15;
        self.regions
            .insert(address, MappedRegion::new(size, protection));
        self.current_size += size;

        Ok(address)
    }

    /// Unmaps a previously mapped region by its base address.
    ///
    /// The region becomes invalid; later accesses through stale pointers fail.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPointer`] if `base` is not the base of a
    /// mapping or the region was already unmapped.
    pub fn unmap(&mut self, base: u64) -> Result<()> {
        if let Some(region) = self.regions.get_mut(&base) {
            if region.valid {
                region.valid = false;
                self.current_size = self.current_size.saturating_sub(region.size());
                return Ok(());
            }
        }
        Err(Error::InvalidPointer {
            address: base,
            reason: "not the base of a mapped region or already unmapped",
        })
    }

    /// Finds the valid region containing `address` and the offset inside it.
    fn find_region(&self, address: u64) -> Option<(&MappedRegion, usize)> {
        let (&base, region) = self.regions.range(..=address).next_back()?;
        if region.valid && address - base < region.size() as u64 {
            #[allow(clippy::cast_possible_truncation)] // Offset bounded by region size
            let offset = (address - base) as usize;
            return Some((region, offset));
        }
        None
    }

    /// Mutable variant of [`find_region`](Self::find_region).
    fn find_region_mut(&mut self, address: u64) -> Option<(&mut MappedRegion, usize)> {
        let (&base, _) = self.regions.range(..=address).next_back()?;
        let region = self.regions.get_mut(&base)?;
        if region.valid && address - base < region.size() as u64 {
            #[allow(clippy::cast_possible_truncation)] // Offset bounded by region size
            let offset = (address - base) as usize;
            return Some((region, offset));
        }
        None
    }

    /// Reads a value of the given width.
    ///
    /// A byte read returns the cell as stored, concrete or symbolic. Wider
    /// reads compose little-endian and require every touched cell concrete.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnmappedAddress`] if the range is not inside one valid
    /// region, [`Error::AccessViolation`] if the region is not readable, or
    /// [`Error::SymbolicAccess`] if a wide read crosses a symbolic cell.
    pub fn read(&self, address: u64, width: BitWidth) -> Result<Value> {
        let count = width.bytes();
        let (region, offset) = self
            .find_region(address)
            .filter(|(region, offset)| offset + count <= region.size())
            .ok_or(Error::UnmappedAddress { address })?;

        if !region.protection.contains(MemoryProtection::READ) {
            return Err(Error::AccessViolation {
                address,
                required: "readable",
            });
        }

        let cells = &region.cells[offset..offset + count];
        if count == 1 {
            return Ok(cells[0].clone());
        }

        let mut bits = 0u64;
        for (i, cell) in cells.iter().enumerate() {
            let byte = cell.as_concrete().ok_or(Error::SymbolicAccess {
                address,
                width: width.bits(),
            })?;
            bits |= byte << (8 * i);
        }
        Ok(Value::concrete(width, bits))
    }

    /// Writes a value at the given address; the width comes from the value.
    ///
    /// A byte-wide value is stored as the cell, concrete or symbolic. Wider
    /// values must be concrete and decompose little-endian.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnmappedAddress`] if the range is not inside one valid
    /// region, [`Error::AccessViolation`] if the region is not writable, or
    /// [`Error::SymbolicAccess`] for a symbolic value wider than one byte.
    pub fn write(&mut self, address: u64, value: &Value) -> Result<()> {
        let width = value.width();
        let count = width.bytes();
        let (region, offset) = self
            .find_region_mut(address)
            .filter(|(region, offset)| offset + count <= region.size())
            .ok_or(Error::UnmappedAddress { address })?;

        if !region.protection.contains(MemoryProtection::WRITE) {
            return Err(Error::AccessViolation {
                address,
                required: "writable",
            });
        }

        if count == 1 {
            region.cells[offset] = value.clone();
            return Ok(());
        }

        let bits = value.as_concrete().ok_or(Error::SymbolicAccess {
            address,
            width: width.bits(),
        })?;
        for (i, cell) in region.cells[offset..offset + count].iter_mut().enumerate() {
            #[allow(clippy::cast_possible_truncation)] // Masked to one byte
            let byte = ((bits >> (8 * i)) & 0xFF) as u8;
            *cell = Value::byte(byte);
        }
        Ok(())
    }

    /// Writes a run of concrete bytes starting at `address`.
    ///
    /// Convenience for planting buffers and strings; equivalent to one
    /// byte-wide [`write`](Self::write) per element.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnmappedAddress`] if the range is not inside one valid
    /// region or [`Error::AccessViolation`] if the region is not writable.
    pub fn write_bytes(&mut self, address: u64, bytes: &[u8]) -> Result<()> {
        let (region, offset) = self
            .find_region_mut(address)
            .filter(|(region, offset)| offset + bytes.len() <= region.size())
            .ok_or(Error::UnmappedAddress { address })?;

        if !region.protection.contains(MemoryProtection::WRITE) {
            return Err(Error::AccessViolation {
                address,
                required: "writable",
            });
        }

        for (cell, &byte) in region.cells[offset..offset + bytes.len()].iter_mut().zip(bytes) {
            *cell = Value::byte(byte);
        }
        Ok(())
    }

    /// Returns `true` if `address` lies inside a valid mapped region.
    #[must_use]
    pub fn is_mapped(&self, address: u64) -> bool {
        self.find_region(address).is_some()
    }

    /// Returns the protection of the region containing `address`, if mapped.
    #[must_use]
    pub fn protection_at(&self, address: u64) -> Option<MemoryProtection> {
        self.find_region(address).map(|(region, _)| region.protection)
    }

    /// Returns the total bytes currently mapped.
    #[must_use]
    pub fn current_size(&self) -> usize {
        self.current_size
    }

    /// Returns the configured mapping budget in bytes.
    #[must_use]
    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

impl Default for AddressSpace {
    fn default() -> Self {
        // 64-bit target with the default 16MB budget
        Self::new(BitWidth::W64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Expr;

    #[test]
    fn test_map_and_unmap() {
        let mut space = AddressSpace::new(BitWidth::W64);

        let base = space.map(100, MemoryProtection::RW).unwrap();
        assert!(space.is_mapped(base));
        assert!(space.is_mapped(base + 99));
        assert!(!space.is_mapped(base + 100));

        space.unmap(base).unwrap();
        assert!(!space.is_mapped(base));
        assert!(matches!(
            space.unmap(base),
            Err(Error::InvalidPointer { .. })
        ));
    }

    #[test]
    fn test_new_regions_are_zeroed() {
        let mut space = AddressSpace::new(BitWidth::W64);
        let base = space.map(8, MemoryProtection::RW).unwrap();
        for offset in 0..8 {
            assert_eq!(
                space.read(base + offset, BitWidth::BYTE).unwrap(),
                Value::byte(0)
            );
        }
    }

    #[test]
    fn test_write_bytes_then_read_back() {
        let mut space = AddressSpace::new(BitWidth::W64);
        let base = space.map(16, MemoryProtection::RW).unwrap();

        space.write_bytes(base, &[1, 2, 3, 4]).unwrap();
        assert_eq!(space.read(base + 2, BitWidth::BYTE).unwrap(), Value::byte(3));
    }

    #[test]
    fn test_wide_read_composes_little_endian() {
        let mut space = AddressSpace::new(BitWidth::W64);
        let base = space.map(4, MemoryProtection::RW).unwrap();

        space.write_bytes(base, &[0x78, 0x56, 0x34, 0x12]).unwrap();
        assert_eq!(
            space.read(base, BitWidth::W32).unwrap(),
            Value::concrete(BitWidth::W32, 0x1234_5678)
        );
    }

    #[test]
    fn test_wide_write_decomposes_little_endian() {
        let mut space = AddressSpace::new(BitWidth::W64);
        let base = space.map(4, MemoryProtection::RW).unwrap();

        space
            .write(base, &Value::concrete(BitWidth::W32, 0x1234_5678))
            .unwrap();
        assert_eq!(space.read(base, BitWidth::BYTE).unwrap(), Value::byte(0x78));
        assert_eq!(
            space.read(base + 3, BitWidth::BYTE).unwrap(),
            Value::byte(0x12)
        );
    }

    #[test]
    fn test_symbolic_cell_roundtrip() {
        let mut space = AddressSpace::new(BitWidth::W64);
        let base = space.map(2, MemoryProtection::RW).unwrap();

        let sym = Value::symbolic(Expr::variable("b0", BitWidth::BYTE));
        space.write(base, &sym).unwrap();
        assert_eq!(space.read(base, BitWidth::BYTE).unwrap(), sym);
    }

    #[test]
    fn test_wide_read_across_symbolic_cell_is_rejected() {
        let mut space = AddressSpace::new(BitWidth::W64);
        let base = space.map(2, MemoryProtection::RW).unwrap();

        let sym = Value::symbolic(Expr::variable("b0", BitWidth::BYTE));
        space.write(base + 1, &sym).unwrap();
        assert!(matches!(
            space.read(base, BitWidth::W16),
            Err(Error::SymbolicAccess { width: 16, .. })
        ));
    }

    #[test]
    fn test_out_of_bounds_access() {
        let mut space = AddressSpace::new(BitWidth::W64);
        let base = space.map(8, MemoryProtection::RW).unwrap();

        assert!(matches!(
            space.read(base + 8, BitWidth::BYTE),
            Err(Error::UnmappedAddress { .. })
        ));
        // A wide read straddling the region end faults as well
        assert!(matches!(
            space.read(base + 5, BitWidth::W32),
            Err(Error::UnmappedAddress { .. })
        ));
    }

    #[test]
    fn test_protection_is_enforced() {
        let mut space = AddressSpace::new(BitWidth::W64);
        let read_only = space.map(8, MemoryProtection::READ).unwrap();
        let write_only = space.map(8, MemoryProtection::WRITE).unwrap();

        assert!(matches!(
            space.write_bytes(read_only, &[1]),
            Err(Error::AccessViolation {
                required: "writable",
                ..
            })
        ));
        assert!(matches!(
            space.read(write_only, BitWidth::BYTE),
            Err(Error::AccessViolation {
                required: "readable",
                ..
            })
        ));
    }

    #[test]
    fn test_stale_region_stays_stale() {
        let mut space = AddressSpace::new(BitWidth::W64);
        let base = space.map(8, MemoryProtection::RW).unwrap();
        space.unmap(base).unwrap();

        assert!(matches!(
            space.read(base, BitWidth::BYTE),
            Err(Error::UnmappedAddress { .. })
        ));
    }

    #[test]
    fn test_memory_limit() {
        let mut space = AddressSpace::with_limit(BitWidth::W64, 100);

        let _first = space.map(50, MemoryProtection::RW).unwrap();
        assert!(matches!(
            space.map(60, MemoryProtection::RW),
            Err(Error::MemoryLimitExceeded {
                current: 50,
                requested: 60,
                limit: 100,
            })
        ));
    }

    #[test]
    fn test_32_bit_bases_stay_representable() {
        let mut space = AddressSpace::new(BitWidth::W32);
        let base = space.map(16, MemoryProtection::RW).unwrap();
        assert!(base <= BitWidth::W32.mask());
        assert_eq!(space.address_width(), BitWidth::W32);
    }
}
