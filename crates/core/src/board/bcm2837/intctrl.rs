// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use super::regs;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntCtrlReg {
    BasicPending,
    Pending1,
    Pending2,
    FiqControl,
    EnableIrqs1,
    EnableIrqs2,
    EnableBasicIrqs,
    DisableIrqs1,
    DisableIrqs2,
    DisableBasicIrqs,
}

impl IntCtrlReg {
    pub fn from_addr(addr: u64) -> Option<Self> {
        match addr {
            regs::IRQ_BASIC_PENDING => Some(Self::BasicPending),
            regs::IRQ_PENDING_1 => Some(Self::Pending1),
            regs::IRQ_PENDING_2 => Some(Self::Pending2),
            regs::FIQ_CONTROL => Some(Self::FiqControl),
            regs::ENABLE_IRQS_1 => Some(Self::EnableIrqs1),
            regs::ENABLE_IRQS_2 => Some(Self::EnableIrqs2),
            regs::ENABLE_BASIC_IRQS => Some(Self::EnableBasicIrqs),
            regs::DISABLE_IRQS_1 => Some(Self::DisableIrqs1),
            regs::DISABLE_IRQS_2 => Some(Self::DisableIrqs2),
            regs::DISABLE_BASIC_IRQS => Some(Self::DisableBasicIrqs),
            _ => None,
        }
    }
}

/// Live device signals feeding the pending registers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IrqLines {
    /// System timer CS match bits.
    pub systimer_cs: u32,
    /// AUX_IRQ mini-UART bit.
    pub aux: bool,
}

/// ARM interrupt controller: enable masks only, pending state is derived.
#[derive(Debug, Default, Clone, serde::Serialize)]
pub struct IntCtrlState {
    fiq_control: u8,
    irqs1_enabled: u32,
    irqs2_enabled: u32,
    basic_irqs_enabled: u8,
}

const fn bit(n: u32) -> u32 {
    1 << n
}

impl IntCtrlState {
    pub fn new() -> Self {
        Self::default()
    }

    fn is_line_enabled(&self, line: u32) -> bool {
        if line < 32 {
            self.irqs1_enabled & bit(line) != 0
        } else {
            self.irqs2_enabled & bit(line - 32) != 0
        }
    }

    /// GPU pending bits for lines 0-31, gated by ENABLE_IRQS_1.
    ///
    /// The AUX line (57) lands at bit 57 - 32 of this register.
    pub fn pending1(&self, lines: IrqLines) -> u32 {
        let mut pending = 0;
        for timer_line in [regs::IRQ_LINE_SYSTIMER_1, regs::IRQ_LINE_SYSTIMER_3] {
            if self.is_line_enabled(timer_line) && lines.systimer_cs & bit(timer_line) != 0 {
                pending |= bit(timer_line);
            }
        }
        let aux_bit = regs::IRQ_LINE_AUX - 32;
        if self.irqs1_enabled & bit(aux_bit) != 0 && lines.aux {
            pending |= bit(aux_bit);
        }
        pending
    }

    /// No lines 32-63 are modelled.
    pub fn pending2(&self, _lines: IrqLines) -> u32 {
        0
    }

    pub fn basic_pending(&self, lines: IrqLines) -> u32 {
        let mut pending = 0;
        if self.pending1(lines) != 0 {
            pending |= bit(8);
        }
        if self.pending2(lines) != 0 {
            pending |= bit(9);
        }
        pending
    }

    pub fn read(&self, reg: IntCtrlReg, lines: IrqLines) -> u32 {
        match reg {
            IntCtrlReg::BasicPending => self.basic_pending(lines),
            IntCtrlReg::Pending1 => self.pending1(lines),
            IntCtrlReg::Pending2 => self.pending2(lines),
            IntCtrlReg::FiqControl => self.fiq_control as u32,
            IntCtrlReg::EnableIrqs1 => self.irqs1_enabled,
            IntCtrlReg::EnableIrqs2 => self.irqs2_enabled,
            IntCtrlReg::EnableBasicIrqs => self.basic_irqs_enabled as u32,
            IntCtrlReg::DisableIrqs1 => !self.irqs1_enabled,
            IntCtrlReg::DisableIrqs2 => !self.irqs2_enabled,
            IntCtrlReg::DisableBasicIrqs => !(self.basic_irqs_enabled as u32),
        }
    }

    pub fn write(&mut self, reg: IntCtrlReg, value: u32) {
        match reg {
            IntCtrlReg::FiqControl => self.fiq_control = value as u8,
            IntCtrlReg::EnableIrqs1 => self.irqs1_enabled |= value,
            IntCtrlReg::EnableIrqs2 => self.irqs2_enabled |= value,
            IntCtrlReg::EnableBasicIrqs => self.basic_irqs_enabled |= value as u8,
            IntCtrlReg::DisableIrqs1 => self.irqs1_enabled &= !value,
            IntCtrlReg::DisableIrqs2 => self.irqs2_enabled &= !value,
            IntCtrlReg::DisableBasicIrqs => self.basic_irqs_enabled &= !(value as u8),
            IntCtrlReg::BasicPending | IntCtrlReg::Pending1 | IntCtrlReg::Pending2 => {
                tracing::debug!("Ignoring write {:#x} to read-only {:?}", value, reg);
            }
        }
    }
}
