// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! BCM2837 register addresses (ARM physical view, peripheral base 0x3F00_0000).

use crate::memory::DEVICE_BASE;
use std::ops::RangeInclusive;

// Interrupt controller
pub const IRQ_BASIC_PENDING: u64 = DEVICE_BASE + 0xB200;
pub const IRQ_PENDING_1: u64 = DEVICE_BASE + 0xB204;
pub const IRQ_PENDING_2: u64 = DEVICE_BASE + 0xB208;
pub const FIQ_CONTROL: u64 = DEVICE_BASE + 0xB20C;
pub const ENABLE_IRQS_1: u64 = DEVICE_BASE + 0xB210;
pub const ENABLE_IRQS_2: u64 = DEVICE_BASE + 0xB214;
pub const ENABLE_BASIC_IRQS: u64 = DEVICE_BASE + 0xB218;
pub const DISABLE_IRQS_1: u64 = DEVICE_BASE + 0xB21C;
pub const DISABLE_IRQS_2: u64 = DEVICE_BASE + 0xB220;
pub const DISABLE_BASIC_IRQS: u64 = DEVICE_BASE + 0xB224;

// AUX block
pub const AUX_IRQ: u64 = DEVICE_BASE + 0x21_5000;
pub const AUX_ENABLES: u64 = DEVICE_BASE + 0x21_5004;
pub const AUX_MU_IO_REG: u64 = DEVICE_BASE + 0x21_5040;
pub const AUX_MU_IER_REG: u64 = DEVICE_BASE + 0x21_5044;
pub const AUX_MU_IIR_REG: u64 = DEVICE_BASE + 0x21_5048;
pub const AUX_MU_LCR_REG: u64 = DEVICE_BASE + 0x21_504C;
pub const AUX_MU_MCR_REG: u64 = DEVICE_BASE + 0x21_5050;
pub const AUX_MU_LSR_REG: u64 = DEVICE_BASE + 0x21_5054;
pub const AUX_MU_MSR_REG: u64 = DEVICE_BASE + 0x21_5058;
pub const AUX_MU_SCRATCH: u64 = DEVICE_BASE + 0x21_505C;
pub const AUX_MU_CNTL_REG: u64 = DEVICE_BASE + 0x21_5060;
pub const AUX_MU_STAT_REG: u64 = DEVICE_BASE + 0x21_5064;
pub const AUX_MU_BAUD_REG: u64 = DEVICE_BASE + 0x21_5068;

// System timer
pub const TIMER_CS: u64 = DEVICE_BASE + 0x3000;
pub const TIMER_CLO: u64 = DEVICE_BASE + 0x3004;
pub const TIMER_CHI: u64 = DEVICE_BASE + 0x3008;
pub const TIMER_C0: u64 = DEVICE_BASE + 0x300C;
pub const TIMER_C1: u64 = DEVICE_BASE + 0x3010;
pub const TIMER_C2: u64 = DEVICE_BASE + 0x3014;
pub const TIMER_C3: u64 = DEVICE_BASE + 0x3018;

pub const INTCTRL_RANGE: RangeInclusive<u64> = IRQ_BASIC_PENDING..=DISABLE_BASIC_IRQS;
pub const AUX_RANGE: RangeInclusive<u64> = AUX_IRQ..=AUX_MU_BAUD_REG;
pub const SYSTIMER_RANGE: RangeInclusive<u64> = TIMER_CS..=TIMER_C3;

/// IRQ line of the AUX block in the 64-line GPU interrupt space.
pub const IRQ_LINE_AUX: u32 = 57;
/// System timer compare channels 1 and 3 are the ones routed to the ARM.
pub const IRQ_LINE_SYSTIMER_1: u32 = 1;
pub const IRQ_LINE_SYSTIMER_3: u32 = 3;
