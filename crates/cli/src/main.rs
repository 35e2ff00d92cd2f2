// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

mod runner;

use bcmvisor_config::{GuestManifest, MmioScript};
use bcmvisor_core::Guest;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

const EXIT_PASS: u8 = 0;
const EXIT_ASSERT_FAIL: u8 = 1;
const EXIT_CONFIG_ERROR: u8 = 2;
const EXIT_RUNTIME_ERROR: u8 = 3;

#[derive(Parser, Debug)]
#[command(author, version, about = "BCM2837 guest peripheral emulator", long_about = None)]
struct Cli {
    /// Enable register-level tracing
    #[arg(short, long, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay an MMIO script (YAML) against a freshly initialized guest.
    Run(RunArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Path to the guest manifest (YAML). Defaults to a stock BCM2837 guest.
    #[arg(short, long)]
    manifest: Option<PathBuf>,

    /// Path to the MMIO script (YAML)
    #[arg(short, long)]
    script: PathBuf,

    /// Write the final board state (JSON) to this path.
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Print the run summary as JSON instead of the guest's TX output.
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so stdout carries only guest output
    let level = if cli.trace {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run(args) => run(args),
    }
}

fn run(args: RunArgs) -> ExitCode {
    let manifest = match &args.manifest {
        Some(path) => match GuestManifest::from_file(path) {
            Ok(m) => m,
            Err(e) => {
                error!("{:#}", e);
                return ExitCode::from(EXIT_CONFIG_ERROR);
            }
        },
        None => GuestManifest::default(),
    };

    let script = match MmioScript::from_file(&args.script) {
        Ok(s) => s,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    let mut guest = match Guest::from_manifest(1, &manifest) {
        Ok(g) => g,
        Err(e) => {
            error!("Failed to create guest '{}': {}", manifest.name, e);
            return ExitCode::from(EXIT_RUNTIME_ERROR);
        }
    };

    let summary = runner::run_script(&mut guest, &script);

    if let Some(path) = &args.snapshot {
        let written = serde_json::to_string_pretty(&guest.snapshot())
            .map_err(anyhow::Error::from)
            .and_then(|json| std::fs::write(path, json).map_err(anyhow::Error::from));
        if let Err(e) = written {
            error!("Failed to write snapshot to {:?}: {:#}", path, e);
            return ExitCode::from(EXIT_RUNTIME_ERROR);
        }
        info!("Snapshot written to {:?}", path);
    }

    if args.json {
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                error!("Failed to serialize run summary: {}", e);
                return ExitCode::from(EXIT_RUNTIME_ERROR);
            }
        }
    } else {
        print!("{}", String::from_utf8_lossy(&summary.tx));
    }

    for failure in &summary.failures {
        error!("step {}: {}", failure.step, failure.message);
    }

    if summary.passed() {
        info!(
            "'{}': {} steps, {} ticks, all expectations met",
            manifest.name, summary.steps, summary.ticks
        );
        ExitCode::from(EXIT_PASS)
    } else {
        ExitCode::from(EXIT_ASSERT_FAIL)
    }
}
