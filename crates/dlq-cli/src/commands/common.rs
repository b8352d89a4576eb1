//! Shared helpers for CLI commands.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use dlq_lang::parse;
use dlq_synth::Synthesizer;

/// Load a DLQ source file and run the full synthesis pipeline.
pub fn compile(path: &str) -> Result<Synthesizer> {
    if !Path::new(path).exists() {
        anyhow::bail!("File not found: {path}");
    }

    let source =
        fs::read_to_string(path).with_context(|| format!("Failed to read file: {path}"))?;

    let program = parse(&source)?;
    let mut synth = Synthesizer::new(program)?;
    synth.build_all()?;
    Ok(synth)
}
