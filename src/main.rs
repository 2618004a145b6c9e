//! Ledger Engine CLI
//!
//! Command-line entry point for running an operation script through the
//! in-memory ledger.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- operations.csv > accounts.csv
//! cargo run -- --workers 4 operations.csv > accounts.csv
//! cargo run -- --workers 0 --lock-timeout-ms 500 operations.csv
//! ```
//!
//! The program reads operation records from the input CSV, submits them
//! through the ledger, and writes the final account states to stdout once
//! every operation has settled. Log output (rejected operations, worker
//! activity) goes to stderr and is controlled by `RUST_LOG`.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Fatal error (missing input file, unsettled script, I/O failure)

use ledger_engine::cli;
use ledger_engine::driver;
use std::process;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = cli::parse_args();
    let config = args.to_ledger_config();

    let mut output = std::io::stdout();
    if let Err(e) = driver::run_script(&args.input_file, config, &mut output) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
