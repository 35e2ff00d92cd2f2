// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

pub mod aux;
pub mod intctrl;
pub mod regs;
pub mod systimer;

use crate::board::Board;
use crate::guest::Guest;
use crate::memory::{self, PAGE_SIZE};
use crate::{BoardError, BoardResult};
use aux::{AuxReg, AuxState};
use bcmvisor_config::UartOptions;
use intctrl::{IntCtrlReg, IntCtrlState, IrqLines};
use systimer::{SysTimerReg, SysTimerState};

/// Device block an address belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    IntCtrl,
    Aux,
    SysTimer,
}

impl Region {
    pub fn classify(addr: u64) -> Option<Self> {
        if regs::INTCTRL_RANGE.contains(&addr) {
            Some(Self::IntCtrl)
        } else if regs::AUX_RANGE.contains(&addr) {
            Some(Self::Aux)
        } else if regs::SYSTIMER_RANGE.contains(&addr) {
            Some(Self::SysTimer)
        } else {
            None
        }
    }
}

/// Per-guest BCM2837 peripheral state.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Bcm2837 {
    intctrl: IntCtrlState,
    aux: AuxState,
    systimer: SysTimerState,
}

impl Bcm2837 {
    pub fn new(uart: &UartOptions) -> BoardResult<Self> {
        Ok(Self {
            intctrl: IntCtrlState::new(),
            aux: AuxState::new(uart)?,
            systimer: SysTimerState::new(),
        })
    }

    /// Attach a fresh board to `guest` and make the whole device window trap.
    pub fn initialize(guest: &mut Guest, uart: &UartOptions) -> BoardResult<()> {
        if guest.has_board() {
            return Err(BoardError::AlreadyInitialized(guest.id()));
        }

        let board = Self::new(uart)?;

        // Validate the whole window before marking any page
        let window = memory::device_window();
        for page in window.clone().step_by(PAGE_SIZE as usize) {
            guest.memory().check_region(page)?;
        }
        for page in window.clone().step_by(PAGE_SIZE as usize) {
            guest.memory_mut().mark_region_inaccessible(page)?;
        }

        guest.attach_board(Box::new(board));
        tracing::info!(
            "Guest {}: BCM2837 attached, trapping {:#x}..{:#x}",
            guest.id(),
            window.start,
            window.end
        );
        Ok(())
    }

    pub fn intctrl(&self) -> &IntCtrlState {
        &self.intctrl
    }

    pub fn aux(&self) -> &AuxState {
        &self.aux
    }

    pub fn systimer(&self) -> &SysTimerState {
        &self.systimer
    }

    fn irq_lines(&self) -> IrqLines {
        IrqLines {
            systimer_cs: self.systimer.cs(),
            aux: self.aux.irq_pending(),
        }
    }
}

impl Board for Bcm2837 {
    fn mmio_read(&mut self, addr: u64) -> u32 {
        match Region::classify(addr) {
            Some(Region::IntCtrl) => match IntCtrlReg::from_addr(addr) {
                Some(reg) => self.intctrl.read(reg, self.irq_lines()),
                None => 0,
            },
            Some(Region::Aux) => AuxReg::from_addr(addr)
                .map(|reg| self.aux.read(reg))
                .unwrap_or(0),
            Some(Region::SysTimer) => SysTimerReg::from_addr(addr)
                .map(|reg| self.systimer.read(reg))
                .unwrap_or(0),
            None => {
                tracing::debug!("Read from unmodelled address {:#x}", addr);
                0
            }
        }
    }

    fn mmio_write(&mut self, addr: u64, value: u32) {
        match Region::classify(addr) {
            Some(Region::IntCtrl) => {
                if let Some(reg) = IntCtrlReg::from_addr(addr) {
                    self.intctrl.write(reg, value);
                }
            }
            Some(Region::Aux) => {
                if let Some(reg) = AuxReg::from_addr(addr) {
                    self.aux.write(reg, value);
                }
            }
            Some(Region::SysTimer) => {
                if let Some(reg) = SysTimerReg::from_addr(addr) {
                    self.systimer.write(reg, value);
                }
            }
            None => {
                tracing::debug!("Write {:#x} to unmodelled address {:#x}", value, addr);
            }
        }
    }

    fn timer_tick(&mut self) {
        self.systimer.tick();
    }

    fn is_irq_asserted(&self) -> bool {
        self.intctrl.basic_pending(self.irq_lines()) != 0
    }

    /// FIQ routing is not modelled; FIQ_CONTROL is storage only.
    fn is_fiq_asserted(&self) -> bool {
        false
    }

    fn inject_rx(&mut self, byte: u8) -> bool {
        self.aux.inject_rx(byte)
    }

    fn drain_tx(&mut self) -> Vec<u8> {
        self.aux.drain_tx()
    }

    fn snapshot(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::regs::*;
    use super::{Bcm2837, Region};
    use crate::board::Board;
    use bcmvisor_config::UartOptions;

    fn board() -> Bcm2837 {
        Bcm2837::new(&UartOptions::default()).unwrap()
    }

    #[test]
    fn test_region_classification() {
        assert_eq!(Region::classify(IRQ_BASIC_PENDING), Some(Region::IntCtrl));
        assert_eq!(Region::classify(DISABLE_BASIC_IRQS), Some(Region::IntCtrl));
        assert_eq!(Region::classify(AUX_IRQ), Some(Region::Aux));
        assert_eq!(Region::classify(AUX_MU_BAUD_REG), Some(Region::Aux));
        assert_eq!(Region::classify(TIMER_CS), Some(Region::SysTimer));
        assert_eq!(Region::classify(TIMER_C3), Some(Region::SysTimer));

        assert_eq!(Region::classify(DISABLE_BASIC_IRQS + 4), None);
        assert_eq!(Region::classify(TIMER_C3 + 4), None);
        assert_eq!(Region::classify(AUX_MU_BAUD_REG + 4), None);
        assert_eq!(Region::classify(0x3F20_0000), None); // GPIO
    }

    #[test]
    fn test_gaps_inside_regions_are_benign() {
        let mut b = board();
        b.mmio_write(AUX_ENABLES, 1);
        // Reserved hole between AUX_ENABLES and AUX_MU_IO_REG
        b.mmio_write(AUX_IRQ + 0x10, 0xFFFF_FFFF);
        assert_eq!(b.mmio_read(AUX_IRQ + 0x10), 0);
        // Unaligned access inside the interrupt controller
        b.mmio_write(ENABLE_IRQS_1 + 1, 0xFF);
        assert_eq!(b.mmio_read(ENABLE_IRQS_1), 0);
    }

    #[test]
    fn test_uart_irq_routes_to_line_57() {
        let mut b = board();
        b.mmio_write(AUX_ENABLES, 1);
        b.mmio_write(AUX_MU_IER_REG, 0x1);
        b.inject_rx(b'k');
        assert_eq!(b.mmio_read(AUX_IRQ), 1);
        assert!(!b.is_irq_asserted());

        b.mmio_write(ENABLE_IRQS_1, 1 << 25);
        assert_eq!(b.mmio_read(IRQ_PENDING_1), 1 << 25);
        assert_eq!(b.mmio_read(IRQ_BASIC_PENDING), 1 << 8);
        assert!(b.is_irq_asserted());

        // Draining RX drops the line
        assert_eq!(b.mmio_read(AUX_MU_IO_REG), b'k' as u32);
        assert!(!b.is_irq_asserted());
    }

    #[test]
    fn test_fiq_never_asserted() {
        let mut b = board();
        b.mmio_write(FIQ_CONTROL, 0x80 | 57);
        b.mmio_write(ENABLE_IRQS_1, 0xFFFF_FFFF);
        b.mmio_write(TIMER_C1, 1);
        b.timer_tick();
        assert!(b.is_irq_asserted());
        assert!(!b.is_fiq_asserted());
    }

    #[test]
    fn test_snapshot_contains_register_blocks() {
        let mut b = board();
        b.mmio_write(TIMER_C2, 0x77);
        b.timer_tick();
        let snap = b.snapshot();
        assert_eq!(snap["systimer"]["counter"], 1);
        assert_eq!(snap["systimer"]["compare"][2], 0x77);
        assert_eq!(snap["aux"]["mu_msr"], 0x10);
        assert!(snap["intctrl"].is_object());
    }
}
