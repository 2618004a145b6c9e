use crate::core::LedgerConfig;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Run an operation script through the in-memory ledger
#[derive(Parser, Debug)]
#[command(name = "ledger-engine")]
#[command(about = "Apply a CSV script of money movements through the ordered ledger", long_about = None)]
pub struct CliArgs {
    /// Input CSV file with operation records
    #[arg(value_name = "INPUT", help = "Path to the operation script CSV")]
    pub input_file: PathBuf,

    /// Number of worker threads draining the queue
    #[arg(
        long = "workers",
        value_name = "COUNT",
        default_value_t = 1,
        help = "Worker threads (default: 1, 0 falls back to the CPU count)"
    )]
    pub workers: usize,

    /// Idle poll interval in milliseconds when the queue is drained
    #[arg(
        long = "idle-wait-ms",
        value_name = "MILLIS",
        default_value_t = 50,
        help = "Sleep between polls while the queue is empty (default: 50)"
    )]
    pub idle_wait_ms: u64,

    /// Bound on each per-account lock acquisition in milliseconds
    #[arg(
        long = "lock-timeout-ms",
        value_name = "MILLIS",
        default_value_t = 1000,
        help = "Lock acquisition timeout; timed-out work is requeued (default: 1000)"
    )]
    pub lock_timeout_ms: u64,
}

impl CliArgs {
    /// Create a LedgerConfig from CLI arguments
    ///
    /// A `--workers 0` request falls back to the machine's CPU count.
    pub fn to_ledger_config(&self) -> LedgerConfig {
        let workers = if self.workers == 0 {
            num_cpus::get()
        } else {
            self.workers
        };
        LedgerConfig {
            workers,
            idle_wait: Duration::from_millis(self.idle_wait_ms),
            lock_timeout: Duration::from_millis(self.lock_timeout_ms),
        }
    }
}
