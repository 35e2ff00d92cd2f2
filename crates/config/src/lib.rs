// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const SCHEMA_VERSION: &str = "1.0";

/// Reference mini-UART queue depth; matches the saturation point of the
/// STAT register level fields.
pub const DEFAULT_FIFO_DEPTH: usize = 8;

/// Default schema version for YAML configs
fn default_schema_version() -> String {
    SCHEMA_VERSION.to_string()
}

fn default_fifo_depth() -> usize {
    DEFAULT_FIFO_DEPTH
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unsupported schema_version '{0}'. Supported versions: '1.0'")]
    UnsupportedSchema(String),
    #[error("UART fifo_depth must be greater than zero")]
    ZeroFifoDepth,
    #[error("Guest name cannot be empty")]
    EmptyName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardKind {
    #[default]
    #[serde(alias = "raspi3", alias = "rpi3", alias = "bcm2710")]
    Bcm2837,
}

/// What the mini-UART does when the guest writes IO while the TX queue is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxOverflowPolicy {
    /// Discard the incoming byte; queued bytes are kept.
    #[default]
    Reject,
    /// Evict the oldest queued byte to make room for the incoming one.
    DropOldest,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct UartOptions {
    #[serde(default = "default_fifo_depth")]
    pub fifo_depth: usize,
    #[serde(default)]
    pub tx_overflow: TxOverflowPolicy,
}

impl Default for UartOptions {
    fn default() -> Self {
        Self {
            fifo_depth: DEFAULT_FIFO_DEPTH,
            tx_overflow: TxOverflowPolicy::default(),
        }
    }
}

/// Per-guest board description.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct GuestManifest {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    pub name: String,
    #[serde(default)]
    pub board: BoardKind,
    #[serde(default)]
    pub uart: UartOptions,
}

impl Default for GuestManifest {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            name: "guest".to_string(),
            board: BoardKind::default(),
            uart: UartOptions::default(),
        }
    }
}

impl GuestManifest {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let f = std::fs::File::open(&path)
            .with_context(|| format!("Failed to open guest manifest at {:?}", path.as_ref()))?;
        let manifest: Self =
            serde_yaml::from_reader(f).context("Failed to parse Guest Manifest YAML")?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let manifest: Self =
            serde_yaml::from_str(yaml).context("Failed to parse Guest Manifest YAML")?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(ConfigError::UnsupportedSchema(self.schema_version.clone()));
        }
        if self.name.trim().is_empty() {
            return Err(ConfigError::EmptyName);
        }
        if self.uart.fifo_depth == 0 {
            return Err(ConfigError::ZeroFifoDepth);
        }
        if self.uart.fifo_depth != DEFAULT_FIFO_DEPTH {
            tracing::warn!(
                "UART fifo_depth {} differs from the hardware depth of {}; STAT levels saturate at 8",
                self.uart.fifo_depth,
                DEFAULT_FIFO_DEPTH
            );
        }
        Ok(())
    }
}

/// One host-side action against a running guest.
///
/// Written in scripts as a single-key map, e.g. `- write: { address: .., value: .. }`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MmioStep {
    Read {
        address: u64,
        #[serde(default)]
        expect: Option<u64>,
        #[serde(default)]
        mask: Option<u64>,
    },
    Write {
        address: u64,
        value: u64,
    },
    Tick {
        #[serde(default = "default_tick_count")]
        count: u64,
    },
    InjectRx {
        bytes: Vec<u8>,
    },
    ExpectTx {
        bytes: Vec<u8>,
    },
    ExpectIrq {
        asserted: bool,
    },
}

fn default_tick_count() -> u64 {
    1
}

/// Scripted MMIO trace replayed against a guest by the host runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MmioScript {
    pub schema_version: String,
    #[serde(default, with = "serde_yaml::with::singleton_map_recursive")]
    pub steps: Vec<MmioStep>,
}

impl MmioScript {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let f = std::fs::File::open(&path)
            .with_context(|| format!("Failed to open MMIO script at {:?}", path.as_ref()))?;
        let script: Self =
            serde_yaml::from_reader(f).context("Failed to parse MMIO Script YAML")?;
        script.validate()?;
        Ok(script)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let script: Self =
            serde_yaml::from_str(yaml).context("Failed to parse MMIO Script YAML")?;
        script.validate()?;
        Ok(script)
    }

    pub fn validate(&self) -> Result<()> {
        if self.schema_version != SCHEMA_VERSION {
            anyhow::bail!(
                "Unsupported schema_version '{}'. Supported versions: '1.0'",
                self.schema_version
            );
        }

        for (idx, step) in self.steps.iter().enumerate() {
            match step {
                MmioStep::Tick { count: 0 } => {
                    anyhow::bail!("Step {}: tick count must be greater than zero", idx);
                }
                MmioStep::Write { value, .. } if *value > u32::MAX as u64 => {
                    anyhow::bail!("Step {}: write value {:#x} exceeds 32 bits", idx, value);
                }
                MmioStep::Read { expect, mask, .. } => {
                    for v in [expect, mask].into_iter().flatten() {
                        if *v > u32::MAX as u64 {
                            anyhow::bail!("Step {}: read operand {:#x} exceeds 32 bits", idx, v);
                        }
                    }
                }
                _ => {}
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_defaults() {
        let manifest = GuestManifest::from_yaml("name: \"pi\"\n").unwrap();
        assert_eq!(manifest.board, BoardKind::Bcm2837);
        assert_eq!(manifest.uart.fifo_depth, 8);
        assert_eq!(manifest.uart.tx_overflow, TxOverflowPolicy::Reject);
    }

    #[test]
    fn test_zero_fifo_depth_rejected() {
        let manifest = GuestManifest {
            uart: UartOptions {
                fifo_depth: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(manifest.validate(), Err(ConfigError::ZeroFifoDepth));
    }
}
