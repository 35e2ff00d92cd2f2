// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use super::regs;

/// Only the four match bits of CS are implemented.
const CS_MATCH_MASK: u32 = 0xF;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SysTimerReg {
    Cs,
    Clo,
    Chi,
    /// Compare channel 0-3; other channels read 0 and ignore writes.
    Compare(u8),
}

impl SysTimerReg {
    pub fn from_addr(addr: u64) -> Option<Self> {
        match addr {
            regs::TIMER_CS => Some(Self::Cs),
            regs::TIMER_CLO => Some(Self::Clo),
            regs::TIMER_CHI => Some(Self::Chi),
            regs::TIMER_C0 => Some(Self::Compare(0)),
            regs::TIMER_C1 => Some(Self::Compare(1)),
            regs::TIMER_C2 => Some(Self::Compare(2)),
            regs::TIMER_C3 => Some(Self::Compare(3)),
            _ => None,
        }
    }
}

/// Free-running 64-bit system timer with four compare channels.
#[derive(Debug, Default, Clone, serde::Serialize)]
pub struct SysTimerState {
    cs: u32,
    counter: u64,
    compare: [u32; 4],
}

impl SysTimerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cs(&self) -> u32 {
        self.cs
    }

    pub fn counter(&self) -> u64 {
        self.counter
    }

    pub fn read(&self, reg: SysTimerReg) -> u32 {
        match reg {
            SysTimerReg::Cs => self.cs,
            SysTimerReg::Clo => self.counter as u32,
            SysTimerReg::Chi => (self.counter >> 32) as u32,
            SysTimerReg::Compare(n) => self.compare.get(n as usize).copied().unwrap_or(0),
        }
    }

    pub fn write(&mut self, reg: SysTimerReg, value: u32) {
        match reg {
            // Write-1-to-clear; zero bits leave pending matches alone.
            SysTimerReg::Cs => self.cs &= !value,
            SysTimerReg::Compare(n) => match self.compare.get_mut(n as usize) {
                Some(slot) => *slot = value,
                None => tracing::debug!("Ignoring write {:#x} to compare channel {}", value, n),
            },
            SysTimerReg::Clo | SysTimerReg::Chi => {
                tracing::debug!("Ignoring write {:#x} to read-only {:?}", value, reg);
            }
        }
    }

    /// Advance the counter by one and latch newly matched channels.
    ///
    /// Only the low 16 bits of the counter are compared against the full
    /// 32-bit compare registers.
    pub fn tick(&mut self) {
        self.counter = self.counter.wrapping_add(1);

        let clo = (self.counter & 0xFFFF) as u32;
        let mut matched = 0u32;
        for (n, &c) in self.compare.iter().enumerate() {
            if c == clo {
                matched |= 1 << n;
            }
        }

        let fired = !self.cs & matched & CS_MATCH_MASK;
        if fired != 0 {
            tracing::debug!("System timer match {:#x} at counter {}", fired, self.counter);
        }
        self.cs |= fired;
    }
}

#[cfg(test)]
mod tests {
    use super::{SysTimerReg, SysTimerState};

    #[test]
    fn test_counter_halves() {
        let mut timer = SysTimerState::new();
        timer.counter = 0x1_2345_6789;
        assert_eq!(timer.read(SysTimerReg::Clo), 0x2345_6789);
        assert_eq!(timer.read(SysTimerReg::Chi), 0x1);
    }

    #[test]
    fn test_match_latches_until_acknowledged() {
        let mut timer = SysTimerState::new();
        timer.write(SysTimerReg::Compare(0), 5);

        for _ in 0..4 {
            timer.tick();
        }
        assert_eq!(timer.read(SysTimerReg::Cs) & 0x1, 0);

        timer.tick();
        assert_eq!(timer.read(SysTimerReg::Cs) & 0x1, 0x1);

        // Stays latched while the counter moves on
        timer.tick();
        timer.tick();
        assert_eq!(timer.read(SysTimerReg::Cs) & 0x1, 0x1);

        // Writing zero does not clear
        timer.write(SysTimerReg::Cs, 0x0);
        assert_eq!(timer.read(SysTimerReg::Cs) & 0x1, 0x1);

        timer.write(SysTimerReg::Cs, 0x1);
        assert_eq!(timer.read(SysTimerReg::Cs), 0);

        timer.tick();
        assert_eq!(timer.read(SysTimerReg::Cs), 0);
    }

    #[test]
    fn test_compare_writes_are_independent() {
        let mut timer = SysTimerState::new();
        timer.write(SysTimerReg::Compare(1), 0x11);
        timer.write(SysTimerReg::Compare(3), 0x33);
        timer.write(SysTimerReg::Cs, 0xFF);

        assert_eq!(timer.read(SysTimerReg::Compare(0)), 0);
        assert_eq!(timer.read(SysTimerReg::Compare(1)), 0x11);
        assert_eq!(timer.read(SysTimerReg::Compare(2)), 0);
        assert_eq!(timer.read(SysTimerReg::Compare(3)), 0x33);
    }

    #[test]
    fn test_compare_uses_low_16_bits_of_counter() {
        let mut timer = SysTimerState::new();
        timer.counter = 0xFFFF;
        timer.write(SysTimerReg::Compare(0), 0x1234);
        timer.write(SysTimerReg::Compare(1), 0x1234);
        timer.write(SysTimerReg::Compare(3), 0x1234);

        // Counter 0x10000 has low16 == 0
        timer.tick();
        assert_eq!(timer.read(SysTimerReg::Cs), 0x4);

        // A compare value above 16 bits never matches
        let mut timer = SysTimerState::new();
        timer.write(SysTimerReg::Compare(0), 0x1_0001);
        timer.write(SysTimerReg::Compare(1), 0x1234);
        timer.write(SysTimerReg::Compare(2), 0x1234);
        timer.write(SysTimerReg::Compare(3), 0x1234);
        timer.counter = 0x1_0000;
        timer.tick();
        assert_eq!(timer.read(SysTimerReg::Cs), 0);
    }

    #[test]
    fn test_multiple_channels_fire_together() {
        let mut timer = SysTimerState::new();
        timer.write(SysTimerReg::Compare(1), 2);
        timer.write(SysTimerReg::Compare(3), 2);
        timer.tick();
        timer.tick();
        assert_eq!(timer.read(SysTimerReg::Cs), 0xA);

        timer.write(SysTimerReg::Cs, 0x2);
        assert_eq!(timer.read(SysTimerReg::Cs), 0x8);
    }

    #[test]
    fn test_out_of_range_channel_is_inert() {
        let mut timer = SysTimerState::new();
        timer.write(SysTimerReg::Compare(4), 0xDEAD);
        timer.write(SysTimerReg::Compare(u8::MAX), 0xBEEF);
        assert_eq!(timer.read(SysTimerReg::Compare(4)), 0);
        assert_eq!(timer.read(SysTimerReg::Compare(u8::MAX)), 0);
        for n in 0..4 {
            assert_eq!(timer.read(SysTimerReg::Compare(n)), 0);
        }
    }
}
