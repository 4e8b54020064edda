//! Transit CLI - Command-line interface for the transit catalogue
//!
//! `make-base` ingests a base document, builds the routing state and
//! stores it on disk. `process-requests` loads that state and answers a
//! batch of statistics and routing requests as JSON.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod documents;

#[derive(Parser)]
#[command(name = "transit")]
#[command(author = "Transit Catalogue Contributors")]
#[command(version)]
#[command(about = "Bus network catalogue with route statistics and fastest itineraries", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the catalogue and routing state from a base document
    MakeBase {
        /// Base document (reads stdin if omitted)
        input: Option<PathBuf>,
    },

    /// Answer stat requests against a stored routing state
    ProcessRequests {
        /// Request document (reads stdin if omitted)
        input: Option<PathBuf>,

        /// Write answers here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let result = match cli.command {
        Commands::MakeBase { input } => commands::make_base(input.as_deref()),
        Commands::ProcessRequests { input, output } => {
            commands::process_requests(input.as_deref(), output.as_deref())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
