// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use bcmvisor_config::{MmioScript, MmioStep};
use bcmvisor_core::Guest;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StepFailure {
    pub step: usize,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct RunSummary {
    pub steps: usize,
    pub ticks: u64,
    /// Every byte the guest transmitted, in order.
    pub tx: Vec<u8>,
    pub failures: Vec<StepFailure>,
}

impl RunSummary {
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Replay `script` against `guest`, the way a host run loop would interleave
/// trapped accesses, timer ticks and console traffic.
pub fn run_script(guest: &mut Guest, script: &MmioScript) -> RunSummary {
    let mut summary = RunSummary::default();
    // Bytes drained from the guest but not yet matched by an expect_tx step.
    let mut pending_tx: Vec<u8> = Vec::new();

    for (idx, step) in script.steps.iter().enumerate() {
        summary.steps += 1;
        match step {
            MmioStep::Read {
                address,
                expect,
                mask,
            } => {
                let value = guest.mmio_read(*address) as u64;
                tracing::debug!("read {:#x} -> {:#x}", address, value);
                if let Some(expected) = expect {
                    let mask = mask.unwrap_or(u64::MAX);
                    if value & mask != expected & mask {
                        summary.failures.push(StepFailure {
                            step: idx,
                            message: format!(
                                "read {:#x}: expected {:#x}, got {:#x} (mask {:#x})",
                                address, expected, value, mask
                            ),
                        });
                    }
                }
            }
            MmioStep::Write { address, value } => match u32::try_from(*value) {
                Ok(value) => {
                    tracing::debug!("write {:#x} <- {:#x}", address, value);
                    guest.mmio_write(*address, value);
                }
                Err(_) => summary.failures.push(StepFailure {
                    step: idx,
                    message: format!("write {:#x}: value {:#x} exceeds 32 bits", address, value),
                }),
            },
            MmioStep::Tick { count } => {
                for _ in 0..*count {
                    guest.timer_tick();
                }
                summary.ticks += count;
            }
            MmioStep::InjectRx { bytes } => {
                let accepted = guest.inject_rx(bytes);
                if accepted < bytes.len() {
                    tracing::warn!(
                        "step {}: guest accepted {} of {} RX bytes",
                        idx,
                        accepted,
                        bytes.len()
                    );
                }
            }
            MmioStep::ExpectTx { bytes } => {
                pending_tx.extend(collect_tx(guest, &mut summary));
                if &pending_tx != bytes {
                    summary.failures.push(StepFailure {
                        step: idx,
                        message: format!(
                            "expected TX {:?}, got {:?}",
                            String::from_utf8_lossy(bytes),
                            String::from_utf8_lossy(&pending_tx)
                        ),
                    });
                }
                pending_tx.clear();
            }
            MmioStep::ExpectIrq { asserted } => {
                let actual = guest.is_irq_asserted();
                if actual != *asserted {
                    summary.failures.push(StepFailure {
                        step: idx,
                        message: format!("expected IRQ asserted={}, got {}", asserted, actual),
                    });
                }
            }
        }
    }

    collect_tx(guest, &mut summary);
    summary
}

fn collect_tx(guest: &mut Guest, summary: &mut RunSummary) -> Vec<u8> {
    let bytes = guest.drain_tx();
    summary.tx.extend_from_slice(&bytes);
    bytes
}
