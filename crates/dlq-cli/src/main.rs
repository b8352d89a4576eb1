//! DLQ Command-Line Interface
//!
//! Compiles DLQ programs into reversible Grover circuits and either
//! simulates them (`sim`) or renders the synthesized circuit (`plot`).

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{plot, sim};

/// dlqc - compile DLQ programs to Grover-style quantum circuits
#[derive(Parser)]
#[command(name = "dlqc")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a program, simulate it and write the result table
    Sim {
        /// DLQ source file
        input: String,

        /// Output table (.csv, or .json for a JSON dump)
        output: String,

        /// Number of shots
        #[arg(default_value = "1024")]
        shots: u32,
    },

    /// Compile a program and render the circuit as text
    Plot {
        /// DLQ source file
        input: String,

        /// Write the rendering to a file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    // Execute command
    let result = match cli.command {
        Commands::Sim {
            input,
            output,
            shots,
        } => sim::execute(&input, &output, shots),

        Commands::Plot { input, output } => plot::execute(&input, output.as_deref()),
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }
}
