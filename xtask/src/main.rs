use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use schemars::schema_for;

const FUZZ_TARGETS: &[&str] = &["parse_bytes", "intern_pool"];

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Repo automation tasks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Run the local CI suite: fmt, clippy, test.
    Ci,

    /// Write the config and report JSON Schemas into `schemas/`.
    Schema {
        #[arg(long, default_value = "schemas")]
        out_dir: PathBuf,

        /// Fail instead of writing when the files on disk are stale.
        #[arg(long)]
        check: bool,
    },

    /// Run every fuzz target for a bounded time (needs cargo-fuzz and nightly).
    Fuzz {
        /// Seconds per target.
        #[arg(long, default_value_t = 30)]
        seconds: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.cmd {
        Cmd::Ci => ci(),
        Cmd::Schema { out_dir, check } => schema(&out_dir, check),
        Cmd::Fuzz { seconds } => fuzz(seconds),
    }
}

fn ci() -> Result<()> {
    cargo(&["fmt", "--check"])?;
    cargo(&[
        "clippy",
        "--workspace",
        "--all-targets",
        "--",
        "-D",
        "warnings",
    ])?;
    cargo(&["test", "--workspace"])
}

/// Rendered schema files, keyed by file name.
fn schema_files() -> Result<Vec<(&'static str, Vec<u8>)>> {
    let config = schema_for!(hunkscan_types::ConfigFile);
    let report = schema_for!(hunkscan_types::DiffReport);

    Ok(vec![
        ("hunkscan.config.schema.json", pretty_json(&config)?),
        ("hunkscan.report.schema.json", pretty_json(&report)?),
    ])
}

fn schema(out_dir: &Path, check: bool) -> Result<()> {
    let files = schema_files()?;

    if check {
        let stale: Vec<&str> = files
            .iter()
            .filter(|(name, bytes)| {
                std::fs::read(out_dir.join(name)).map_or(true, |on_disk| on_disk != *bytes)
            })
            .map(|(name, _)| *name)
            .collect();
        if !stale.is_empty() {
            bail!(
                "schemas out of date: {} (run `cargo xtask schema`)",
                stale.join(", ")
            );
        }
        return Ok(());
    }

    std::fs::create_dir_all(out_dir).context("create schema output dir")?;
    for (name, bytes) in files {
        let path = out_dir.join(name);
        std::fs::write(&path, bytes).with_context(|| format!("write {}", path.display()))?;
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}

fn fuzz(seconds: u64) -> Result<()> {
    let max_time = format!("-max_total_time={seconds}");
    for target in FUZZ_TARGETS {
        cargo(&["+nightly", "fuzz", "run", target, "--", &max_time])?;
    }
    Ok(())
}

fn pretty_json(value: &impl serde::Serialize) -> Result<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(value).context("serialize json")?;
    bytes.push(b'\n');
    Ok(bytes)
}

fn cargo(args: &[&str]) -> Result<()> {
    let status = Command::new("cargo")
        .args(args)
        .status()
        .with_context(|| format!("run cargo {args:?}"))?;
    if !status.success() {
        bail!("command failed: cargo {args:?}");
    }
    Ok(())
}
