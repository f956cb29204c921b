//! Korzent CLI - offline verification of signed receipts.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod error;
mod output;

use commands::{canonicalize, receipt_id, verify};

#[derive(Parser)]
#[command(name = "korzent")]
#[command(about = "Korzent receipt verification CLI")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify a signed receipt against a trust root public key
    Verify {
        /// Path to the receipt JSON file
        receipt: PathBuf,
        /// Public key token, or a file whose first non-comment line is the token
        #[arg(long, env = "KORZENT_TRUST_ROOT")]
        trust_root: String,
        /// Output the verdict as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show canonical bytes for input JSON
    Canonicalize {
        /// Input JSON file (or stdin if not provided)
        input: Option<String>,
    },
    /// Derive the receipt id of a JSON record
    ReceiptId {
        /// Input JSON file (or stdin if not provided)
        input: Option<String>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("KORZENT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Verify {
            receipt,
            trust_root,
            json,
        } => verify::run(&receipt, &trust_root, json),
        Commands::Canonicalize { input } => canonicalize::run(input),
        Commands::ReceiptId { input } => receipt_id::run(input),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
