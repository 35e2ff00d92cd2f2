// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

pub mod bcm2837;

/// Trait representing the emulated peripherals of one guest's board.
///
/// Every call comes from the guest's own execution context, one at a time,
/// so implementations keep plain mutable state with no locking.
pub trait Board: std::fmt::Debug + Send {
    /// Trapped guest load. Unmodelled addresses read as zero.
    fn mmio_read(&mut self, addr: u64) -> u32;

    /// Trapped guest store. Unmodelled addresses ignore the write.
    fn mmio_write(&mut self, addr: u64, value: u32);

    /// One logical tick of the board's free-running timers.
    fn timer_tick(&mut self);

    fn is_irq_asserted(&self) -> bool;

    fn is_fiq_asserted(&self) -> bool {
        false
    }

    /// Deliver a byte from the host console to the guest's serial port.
    fn inject_rx(&mut self, _byte: u8) -> bool {
        false
    }

    /// Collect the bytes the guest has written to its serial port.
    fn drain_tx(&mut self) -> Vec<u8> {
        Vec::new()
    }

    fn snapshot(&self) -> serde_json::Value {
        serde_json::Value::Null
    }
}
