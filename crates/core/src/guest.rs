// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::board::bcm2837::Bcm2837;
use crate::board::Board;
use crate::memory::{GuestAddressSpace, GuestMemory};
use crate::BoardResult;
use bcmvisor_config::{BoardKind, GuestManifest};

/// A guest execution context: its address space plus the board it owns.
///
/// The board lives exactly as long as the guest and is only reachable
/// through it, so two guests never share device state.
#[derive(Debug)]
pub struct Guest {
    id: u32,
    name: String,
    memory: Box<dyn GuestMemory>,
    board: Option<Box<dyn Board>>,
}

impl Guest {
    pub fn new(id: u32, name: impl Into<String>, memory: Box<dyn GuestMemory>) -> Self {
        Self {
            id,
            name: name.into(),
            memory,
            board: None,
        }
    }

    /// Build a guest with a default address space and initialize the board
    /// the manifest asks for.
    pub fn from_manifest(id: u32, manifest: &GuestManifest) -> BoardResult<Self> {
        let mut guest = Self::new(
            id,
            manifest.name.clone(),
            Box::new(GuestAddressSpace::default()),
        );
        match manifest.board {
            BoardKind::Bcm2837 => Bcm2837::initialize(&mut guest, &manifest.uart)?,
        }
        Ok(guest)
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn memory(&self) -> &dyn GuestMemory {
        self.memory.as_ref()
    }

    pub fn memory_mut(&mut self) -> &mut dyn GuestMemory {
        self.memory.as_mut()
    }

    pub fn has_board(&self) -> bool {
        self.board.is_some()
    }

    pub(crate) fn attach_board(&mut self, board: Box<dyn Board>) {
        self.board = Some(board);
    }

    pub fn board(&self) -> Option<&dyn Board> {
        self.board.as_deref()
    }

    pub fn mmio_read(&mut self, addr: u64) -> u32 {
        match self.board.as_mut() {
            Some(board) => board.mmio_read(addr),
            None => {
                tracing::warn!("Guest {}: MMIO read {:#x} with no board", self.id, addr);
                0
            }
        }
    }

    pub fn mmio_write(&mut self, addr: u64, value: u32) {
        match self.board.as_mut() {
            Some(board) => board.mmio_write(addr, value),
            None => {
                tracing::warn!(
                    "Guest {}: MMIO write {:#x} to {:#x} with no board",
                    self.id,
                    value,
                    addr
                );
            }
        }
    }

    pub fn timer_tick(&mut self) {
        if let Some(board) = self.board.as_mut() {
            board.timer_tick();
        }
    }

    pub fn is_irq_asserted(&self) -> bool {
        self.board.as_ref().is_some_and(|b| b.is_irq_asserted())
    }

    pub fn is_fiq_asserted(&self) -> bool {
        self.board.as_ref().is_some_and(|b| b.is_fiq_asserted())
    }

    /// Feed console input to the guest's serial port.
    ///
    /// Returns how many bytes were accepted; the rest were lost to overrun.
    pub fn inject_rx(&mut self, bytes: &[u8]) -> usize {
        let Some(board) = self.board.as_mut() else {
            return 0;
        };
        bytes.iter().filter(|&&b| board.inject_rx(b)).count()
    }

    pub fn drain_tx(&mut self) -> Vec<u8> {
        self.board
            .as_mut()
            .map(|b| b.drain_tx())
            .unwrap_or_default()
    }

    pub fn snapshot(&self) -> serde_json::Value {
        self.board
            .as_ref()
            .map(|b| b.snapshot())
            .unwrap_or(serde_json::Value::Null)
    }
}
