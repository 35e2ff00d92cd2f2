// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! AUX block with the 16550-like mini-UART.

use super::regs;
use crate::fifo::ByteFifo;
use crate::BoardResult;
use bcmvisor_config::{TxOverflowPolicy, UartOptions};
use bitflags::bitflags;

/// Divisor Latch Access Bit in LCR.
const LCR_DLAB: u8 = 0x80;
/// No modem lines are modelled; CTS reads as asserted.
const MSR_RESET: u8 = 0x10;
/// Receiver and transmitter enabled.
const CNTL_RESET: u8 = 0x03;
/// STAT level fields saturate at the hardware FIFO depth.
const STAT_LEVEL_MAX: usize = 8;

const IER_RX: u8 = 0x1;
const IER_TX: u8 = 0x2;

const IIR_CLEAR_RX: u32 = 0x2;
const IIR_CLEAR_TX: u32 = 0x4;

bitflags! {
    /// AUX_MU_LSR_REG
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct LineStatus: u32 {
        const DATA_READY = 1 << 0;
        const RX_OVERRUN = 1 << 1;
        const TX_EMPTY = 1 << 5;
        const TX_IDLE = 1 << 6;
    }
}

bitflags! {
    /// AUX_MU_STAT_REG flag bits; the FIFO levels live in bits 16-31.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct ExtStatus: u32 {
        const SYMBOL_AVAILABLE = 1 << 0;
        const SPACE_AVAILABLE = 1 << 1;
        const RX_IDLE = 1 << 2;
        const TX_IDLE = 1 << 3;
        const RX_OVERRUN = 1 << 4;
        const TX_FULL = 1 << 5;
        const TX_EMPTY = 1 << 8;
        const TX_DONE = 1 << 9;
    }
}

/// Interrupt cause reported in IIR bits 1-2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrqCause {
    None = 0,
    Rx = 1,
    Tx = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuxReg {
    Irq,
    Enables,
    Io,
    Ier,
    Iir,
    Lcr,
    Mcr,
    Lsr,
    Msr,
    Scratch,
    Cntl,
    Stat,
    Baud,
}

impl AuxReg {
    pub fn from_addr(addr: u64) -> Option<Self> {
        match addr {
            regs::AUX_IRQ => Some(Self::Irq),
            regs::AUX_ENABLES => Some(Self::Enables),
            regs::AUX_MU_IO_REG => Some(Self::Io),
            regs::AUX_MU_IER_REG => Some(Self::Ier),
            regs::AUX_MU_IIR_REG => Some(Self::Iir),
            regs::AUX_MU_LCR_REG => Some(Self::Lcr),
            regs::AUX_MU_MCR_REG => Some(Self::Mcr),
            regs::AUX_MU_LSR_REG => Some(Self::Lsr),
            regs::AUX_MU_MSR_REG => Some(Self::Msr),
            regs::AUX_MU_SCRATCH => Some(Self::Scratch),
            regs::AUX_MU_CNTL_REG => Some(Self::Cntl),
            regs::AUX_MU_STAT_REG => Some(Self::Stat),
            regs::AUX_MU_BAUD_REG => Some(Self::Baud),
            _ => None,
        }
    }

    /// Registers that sit behind the AUX_ENABLES mini-UART gate.
    pub fn is_mini_uart(self) -> bool {
        !matches!(self, Self::Irq | Self::Enables)
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct AuxState {
    aux_enables: u8,
    mu_ier: u8,
    mu_lcr: u8,
    mu_mcr: u8,
    mu_msr: u8,
    mu_scratch: u8,
    mu_cntl: u8,
    mu_baud: u16,
    mu_rx_overrun: bool,
    mu_tx_fifo: ByteFifo,
    mu_rx_fifo: ByteFifo,
    #[serde(skip)]
    tx_overflow: TxOverflowPolicy,
}

impl AuxState {
    pub fn new(options: &UartOptions) -> BoardResult<Self> {
        Ok(Self {
            aux_enables: 0,
            mu_ier: 0,
            mu_lcr: 0,
            mu_mcr: 0,
            mu_msr: MSR_RESET,
            mu_scratch: 0,
            mu_cntl: CNTL_RESET,
            mu_baud: 0,
            mu_rx_overrun: false,
            mu_tx_fifo: ByteFifo::with_capacity(options.fifo_depth)?,
            mu_rx_fifo: ByteFifo::with_capacity(options.fifo_depth)?,
            tx_overflow: options.tx_overflow,
        })
    }

    pub fn mini_uart_enabled(&self) -> bool {
        self.aux_enables & 0x1 != 0
    }

    fn dlab(&self) -> bool {
        self.mu_lcr & LCR_DLAB != 0
    }

    /// Cause the IIR register would report right now. RX wins when both
    /// causes are active.
    pub fn irq_cause(&self) -> IrqCause {
        let rx = self.mu_ier & IER_RX != 0 && !self.mu_rx_fifo.is_empty();
        let tx = self.mu_ier & IER_TX != 0 && self.mu_tx_fifo.is_empty();
        if rx {
            IrqCause::Rx
        } else if tx {
            IrqCause::Tx
        } else {
            IrqCause::None
        }
    }

    pub fn iir(&self) -> u32 {
        let cause = self.irq_cause();
        let no_irq = (cause == IrqCause::None) as u32;
        no_irq | ((cause as u32) << 1) | (0b11 << 6)
    }

    /// Level of the AUX_IRQ mini-UART bit, also routed to GPU IRQ 57.
    pub fn irq_pending(&self) -> bool {
        self.mini_uart_enabled() && self.iir() & 0x1 == 0
    }

    pub fn lsr(&mut self) -> u32 {
        let mut lsr = LineStatus::empty();
        lsr.set(LineStatus::DATA_READY, !self.mu_rx_fifo.is_empty());
        lsr.set(LineStatus::RX_OVERRUN, self.mu_rx_overrun);
        lsr.set(LineStatus::TX_EMPTY, !self.mu_tx_fifo.is_full());
        lsr.set(LineStatus::TX_IDLE, self.mu_tx_fifo.is_empty());
        self.mu_rx_overrun = false;
        lsr.bits()
    }

    /// STAT is a pure view; reading it does not clear the overrun flag.
    ///
    /// TX_IDLE is reported while the TX queue holds data.
    pub fn stat(&self) -> u32 {
        let rx_empty = self.mu_rx_fifo.is_empty();
        let tx_empty = self.mu_tx_fifo.is_empty();
        let tx_full = self.mu_tx_fifo.is_full();

        let mut stat = ExtStatus::empty();
        stat.set(ExtStatus::SYMBOL_AVAILABLE, !rx_empty);
        stat.set(ExtStatus::SPACE_AVAILABLE, !tx_full);
        stat.set(ExtStatus::RX_IDLE, rx_empty);
        stat.set(ExtStatus::TX_IDLE, !tx_empty);
        stat.set(ExtStatus::RX_OVERRUN, self.mu_rx_overrun);
        stat.set(ExtStatus::TX_FULL, tx_full);
        stat.set(ExtStatus::TX_EMPTY, tx_empty);
        stat.set(ExtStatus::TX_DONE, rx_empty && tx_empty);

        let rx_level = self.mu_rx_fifo.len().min(STAT_LEVEL_MAX) as u32;
        let tx_level = self.mu_tx_fifo.len().min(STAT_LEVEL_MAX) as u32;
        stat.bits() | (rx_level << 16) | (tx_level << 24)
    }

    pub fn read(&mut self, reg: AuxReg) -> u32 {
        if reg.is_mini_uart() && !self.mini_uart_enabled() {
            return 0;
        }

        match reg {
            AuxReg::Irq => self.irq_pending() as u32,
            AuxReg::Enables => self.aux_enables as u32,
            AuxReg::Io => {
                if self.dlab() {
                    self.mu_lcr &= !LCR_DLAB;
                    (self.mu_baud & 0xFF) as u32
                } else {
                    self.mu_rx_fifo.dequeue().unwrap_or(0) as u32
                }
            }
            AuxReg::Ier => {
                if self.dlab() {
                    (self.mu_baud >> 8) as u32
                } else {
                    self.mu_ier as u32
                }
            }
            AuxReg::Iir => self.iir(),
            AuxReg::Lcr => self.mu_lcr as u32,
            AuxReg::Mcr => self.mu_mcr as u32,
            AuxReg::Lsr => self.lsr(),
            AuxReg::Msr => self.mu_msr as u32,
            AuxReg::Scratch => self.mu_scratch as u32,
            AuxReg::Cntl => self.mu_cntl as u32,
            AuxReg::Stat => self.stat(),
            AuxReg::Baud => self.mu_baud as u32,
        }
    }

    pub fn write(&mut self, reg: AuxReg, value: u32) {
        if reg.is_mini_uart() && !self.mini_uart_enabled() {
            tracing::debug!("Mini UART disabled, dropping write {:#x} to {:?}", value, reg);
            return;
        }

        match reg {
            AuxReg::Enables => self.aux_enables = value as u8,
            AuxReg::Io => {
                if self.dlab() {
                    self.mu_lcr &= !LCR_DLAB;
                    self.mu_baud = (self.mu_baud & 0xFF00) | (value & 0xFF) as u16;
                } else {
                    self.transmit(value as u8);
                }
            }
            AuxReg::Ier => {
                if self.dlab() {
                    self.mu_baud = (self.mu_baud & 0x00FF) | (((value & 0xFF) as u16) << 8);
                } else {
                    self.mu_ier = value as u8;
                }
            }
            AuxReg::Iir => {
                if value & IIR_CLEAR_RX != 0 {
                    self.mu_rx_fifo.clear();
                }
                if value & IIR_CLEAR_TX != 0 {
                    self.mu_tx_fifo.clear();
                }
            }
            AuxReg::Lcr => self.mu_lcr = value as u8,
            AuxReg::Mcr => self.mu_mcr = value as u8,
            AuxReg::Scratch => self.mu_scratch = value as u8,
            AuxReg::Cntl => self.mu_cntl = value as u8,
            AuxReg::Baud => self.mu_baud = value as u16,
            AuxReg::Irq | AuxReg::Lsr | AuxReg::Msr | AuxReg::Stat => {
                tracing::debug!("Ignoring write {:#x} to read-only {:?}", value, reg);
            }
        }
    }

    fn transmit(&mut self, byte: u8) {
        match self.tx_overflow {
            TxOverflowPolicy::Reject => {
                if let Err(e) = self.mu_tx_fifo.enqueue(byte) {
                    tracing::warn!("Mini UART TX: {}", e);
                }
            }
            TxOverflowPolicy::DropOldest => {
                if let Some(old) = self.mu_tx_fifo.enqueue_evicting(byte) {
                    tracing::warn!("Mini UART TX full, evicted {:#04x}", old);
                }
            }
        }
    }

    /// Host side of the wire: deliver a received byte to the guest.
    ///
    /// A full RX queue drops the byte and latches the overrun flag.
    /// Returns whether the byte was accepted.
    pub fn inject_rx(&mut self, byte: u8) -> bool {
        match self.mu_rx_fifo.enqueue(byte) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Mini UART RX overrun: {}", e);
                self.mu_rx_overrun = true;
                false
            }
        }
    }

    /// Host side of the wire: take everything the guest has transmitted.
    pub fn drain_tx(&mut self) -> Vec<u8> {
        self.mu_tx_fifo.drain()
    }

    pub fn baud_divisor(&self) -> u16 {
        self.mu_baud
    }
}
