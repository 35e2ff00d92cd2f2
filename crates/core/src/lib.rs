// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

pub mod board;
pub mod fifo;
pub mod guest;
pub mod memory;

pub use board::bcm2837::Bcm2837;
pub use board::Board;
pub use guest::Guest;

/// Failures while bringing up a guest's board. Register accesses themselves
/// never fail.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("Failed to allocate {0} bytes of device state")]
    Allocation(usize),
    #[error("Guest memory setup failed: {0}")]
    Memory(#[from] memory::MemoryError),
    #[error("Guest {0} already has a board attached")]
    AlreadyInitialized(u32),
}

pub type BoardResult<T> = Result<T, BoardError>;
