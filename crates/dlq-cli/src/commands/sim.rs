//! Sim command implementation.

use std::fs;

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use dlq_sim::{FrequencyTable, Simulator};

use super::common;

/// Execute the sim command.
pub fn execute(input: &str, output: &str, shots: u32) -> Result<()> {
    println!(
        "{} Simulating {} ({} shots)",
        style("→").cyan().bold(),
        style(input).green(),
        shots
    );

    let synth = common::compile(input)?;
    let circuit = synth.into_circuit();
    println!(
        "  Compiled: {} qubits, {} ops",
        circuit.num_qubits(),
        circuit.num_instructions()
    );

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .expect("valid spinner template"),
    );
    spinner.set_message("Simulating...");
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let result = Simulator::new().run(&circuit, shots)?;
    spinner.finish_and_clear();

    let table = FrequencyTable::from_counts(&result, &circuit);
    print_table(&table);

    let serialized = if output.ends_with(".json") {
        serde_json::to_string_pretty(&table).context("Failed to serialize result table")?
    } else {
        table.to_csv()
    };
    fs::write(output, serialized).with_context(|| format!("Failed to write table: {output}"))?;
    println!(
        "{} Wrote {}",
        style("✓").green().bold(),
        style(output).green()
    );

    Ok(())
}

/// Print the frequency table with a proportional bar per row.
fn print_table(table: &FrequencyTable) {
    println!(
        "\n{} Results ({} shots):",
        style("✓").green().bold(),
        table.shots
    );
    println!("  [{}]", style(table.registers.join(", ")).cyan());

    for row in table.rows.iter().take(16) {
        let prob = table.probability(row) * 100.0;
        let bar_len = (prob / 2.0).round() as usize;
        let bar: String = "█".repeat(bar_len);

        let values: Vec<String> = row.values.iter().map(u64::to_string).collect();
        println!(
            "  ({}): {:>6} ({:>5.2}%) {}",
            style(values.join(", ")).cyan(),
            row.count,
            prob,
            style(bar).green()
        );
    }
    if table.rows.len() > 16 {
        println!("  ... {} more rows", table.rows.len() - 16);
    }
}
