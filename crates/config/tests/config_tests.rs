// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use bcmvisor_config::{BoardKind, GuestManifest, MmioScript, MmioStep, TxOverflowPolicy};

#[test]
fn test_full_manifest_parses() {
    let yaml = r#"
schema_version: "1.0"
name: "raspi3-guest"
board: "raspi3"
uart:
  fifo_depth: 16
  tx_overflow: "drop_oldest"
"#;
    let manifest = GuestManifest::from_yaml(yaml).unwrap();
    assert_eq!(manifest.name, "raspi3-guest");
    assert_eq!(manifest.board, BoardKind::Bcm2837);
    assert_eq!(manifest.uart.fifo_depth, 16);
    assert_eq!(manifest.uart.tx_overflow, TxOverflowPolicy::DropOldest);
}

#[test]
fn test_unknown_manifest_field_rejected() {
    let yaml = r#"
name: "guest"
gpio: true
"#;
    assert!(GuestManifest::from_yaml(yaml).is_err());
}

#[test]
fn test_unsupported_schema_rejected() {
    let yaml = r#"
schema_version: "2.0"
name: "guest"
"#;
    let err = GuestManifest::from_yaml(yaml).unwrap_err();
    assert!(err.to_string().contains("schema_version"));
}

#[test]
fn test_script_steps_parse() {
    let yaml = r#"
schema_version: "1.0"
steps:
  - write: { address: 0x3F215004, value: 1 }
  - read: { address: 0x3F215054, expect: 0x60, mask: 0xFF }
  - tick: { count: 5 }
  - tick: {}
  - inject_rx: { bytes: [0x41, 0x42] }
  - expect_tx: { bytes: [0x68, 0x69] }
  - expect_irq: { asserted: false }
"#;
    let script = MmioScript::from_yaml(yaml).unwrap();
    assert_eq!(script.steps.len(), 7);
    assert_eq!(
        script.steps[0],
        MmioStep::Write {
            address: 0x3F21_5004,
            value: 1
        }
    );
    assert_eq!(
        script.steps[1],
        MmioStep::Read {
            address: 0x3F21_5054,
            expect: Some(0x60),
            mask: Some(0xFF)
        }
    );
    assert_eq!(script.steps[3], MmioStep::Tick { count: 1 });
    assert_eq!(script.steps[2], MmioStep::Tick { count: 5 });
    assert_eq!(
        script.steps[4],
        MmioStep::InjectRx {
            bytes: vec![0x41, 0x42]
        }
    );
    assert_eq!(
        script.steps[5],
        MmioStep::ExpectTx {
            bytes: vec![0x68, 0x69]
        }
    );
    assert_eq!(script.steps[6], MmioStep::ExpectIrq { asserted: false });
}

#[test]
fn test_script_steps_parse_block_style() {
    let yaml = r#"
schema_version: "1.0"
steps:
  - read:
      address: 0x3F003004
  - write:
      address: 0x3F003010
      value: 0x10
"#;
    let script = MmioScript::from_yaml(yaml).unwrap();
    assert_eq!(
        script.steps,
        vec![
            MmioStep::Read {
                address: 0x3F00_3004,
                expect: None,
                mask: None
            },
            MmioStep::Write {
                address: 0x3F00_3010,
                value: 0x10
            },
        ]
    );
}

#[test]
fn test_script_unknown_step_rejected() {
    let yaml = r#"
schema_version: "1.0"
steps:
  - poke: { address: 0x3F003004 }
"#;
    assert!(MmioScript::from_yaml(yaml).is_err());
}

#[test]
fn test_script_wide_values_rejected() {
    let write = r#"
schema_version: "1.0"
steps:
  - write: { address: 0x3F215040, value: 0x100000041 }
"#;
    let err = MmioScript::from_yaml(write).unwrap_err();
    assert!(err.to_string().contains("exceeds 32 bits"));

    let read = r#"
schema_version: "1.0"
steps:
  - read: { address: 0x3F215040, expect: 0x1, mask: 0x1FFFFFFFF }
"#;
    let err = MmioScript::from_yaml(read).unwrap_err();
    assert!(err.to_string().contains("exceeds 32 bits"));
}

#[test]
fn test_script_zero_tick_rejected() {
    let yaml = r#"
schema_version: "1.0"
steps:
  - tick: { count: 0 }
"#;
    let err = MmioScript::from_yaml(yaml).unwrap_err();
    assert!(err.to_string().contains("tick count"));
}
