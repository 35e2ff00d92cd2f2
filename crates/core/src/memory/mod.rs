// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use std::collections::BTreeSet;
use std::ops::Range;

pub const PAGE_SIZE: u64 = 0x1000;
pub const SECTION_SIZE: u64 = 0x20_0000;

/// Guest physical memory size of a Raspberry Pi 3 class board.
pub const PHYS_MEMORY_SIZE: u64 = 0x4000_0000;

/// Start of the BCM2837 peripheral window as seen by the ARM cores.
pub const DEVICE_BASE: u64 = 0x3F00_0000;

/// Physical range whose every page must trap into the board emulation.
///
/// The last section below `PHYS_MEMORY_SIZE` holds the core-local
/// peripherals and is left to the host.
pub fn device_window() -> Range<u64> {
    DEVICE_BASE..PHYS_MEMORY_SIZE - SECTION_SIZE
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MemoryError {
    #[error("Guest address {0:#x} is outside the guest address space")]
    OutOfRange(u64),
    #[error("Guest address {0:#x} is not page aligned")]
    Unaligned(u64),
}

/// Page-level access control over a guest's physical address space.
pub trait GuestMemory: std::fmt::Debug + Send {
    /// Make the page at `addr` fault on every guest access.
    fn mark_region_inaccessible(&mut self, addr: u64) -> Result<(), MemoryError>;

    /// Check that the page at `addr` could be marked, without changing it.
    fn check_region(&self, _addr: u64) -> Result<(), MemoryError> {
        Ok(())
    }

    fn is_accessible(&self, addr: u64) -> bool;
}

/// A simple guest address space tracking inaccessible pages by page number.
#[derive(Debug, Clone)]
pub struct GuestAddressSpace {
    size: u64,
    inaccessible: BTreeSet<u64>,
}

impl Default for GuestAddressSpace {
    fn default() -> Self {
        Self::new(PHYS_MEMORY_SIZE)
    }
}

impl GuestAddressSpace {
    pub fn new(size: u64) -> Self {
        Self {
            size,
            inaccessible: BTreeSet::new(),
        }
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn inaccessible_pages(&self) -> usize {
        self.inaccessible.len()
    }
}

impl GuestMemory for GuestAddressSpace {
    fn mark_region_inaccessible(&mut self, addr: u64) -> Result<(), MemoryError> {
        self.check_region(addr)?;
        self.inaccessible.insert(addr / PAGE_SIZE);
        Ok(())
    }

    fn check_region(&self, addr: u64) -> Result<(), MemoryError> {
        if addr % PAGE_SIZE != 0 {
            return Err(MemoryError::Unaligned(addr));
        }
        if addr >= self.size {
            return Err(MemoryError::OutOfRange(addr));
        }
        Ok(())
    }

    fn is_accessible(&self, addr: u64) -> bool {
        addr < self.size && !self.inaccessible.contains(&(addr / PAGE_SIZE))
    }
}
