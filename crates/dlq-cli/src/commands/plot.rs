//! Plot command implementation.

use std::fs;

use anyhow::{Context, Result};
use console::style;

use super::common;

/// Execute the plot command.
pub fn execute(input: &str, output: Option<&str>) -> Result<()> {
    let synth = common::compile(input)?;
    let circuit = synth.circuit();

    println!(
        "{} Compiled {}: {} qubits, {} ops",
        style("→").cyan().bold(),
        style(input).green(),
        circuit.num_qubits(),
        circuit.num_instructions(),
    );

    let rendering = dlq_ir::emit(circuit);
    match output {
        Some(path) => {
            fs::write(path, rendering)
                .with_context(|| format!("Failed to write rendering: {path}"))?;
            println!("{} Wrote {}", style("✓").green().bold(), style(path).green());
        }
        None => print!("{rendering}"),
    }
    Ok(())
}
