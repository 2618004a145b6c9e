//! Demo driver: CSV script in, account states out
//!
//! This module orchestrates the demo binary. It reads an operation script
//! (see [`crate::io::csv_format`] for the format), maps script labels to the
//! account ids the ledger assigns, submits each operation, and finally
//! writes every opened account's state as CSV.
//!
//! Scripts are sequential by nature, so the driver waits for each submitted
//! transaction to reach a terminal state before reading the next row; the
//! worker pool's reordering behavior is exercised by the test suite, not by
//! the script surface. Rejected and invalid operations are logged and
//! skipped, and processing continues with the next row.

use crate::core::{Ledger, LedgerConfig};
use crate::io::csv_format::{convert_operation, write_accounts_csv, Operation, OperationRecord};
use crate::types::{AccountId, LedgerError, Transaction, TransactionStatus};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::warn;

/// How long a single script operation may take to settle
const SETTLE_TIMEOUT: Duration = Duration::from_secs(10);

/// Poll interval while waiting for a transaction to settle
const SETTLE_POLL: Duration = Duration::from_millis(5);

/// Run an operation script and write final account states
///
/// # Arguments
///
/// * `input_path` - Path to the operation script CSV
/// * `config` - Ledger configuration (worker count, timeouts)
/// * `output` - Writer for the final account-state CSV
///
/// # Errors
///
/// Fatal errors only: unreadable input, worker spawn failure, a transaction
/// that never settles, or output I/O. Malformed rows and rejected
/// operations are logged and skipped.
pub fn run_script<W: Write>(
    input_path: &Path,
    config: LedgerConfig,
    output: &mut W,
) -> Result<(), LedgerError> {
    let ledger = Ledger::new(config);
    ledger.start()?;

    // Script label -> ledger-assigned account id, in label order for output
    let mut labels: BTreeMap<u64, AccountId> = BTreeMap::new();

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(input_path)?;

    for (row, result) in reader.deserialize::<OperationRecord>().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(error) => {
                warn!(row, error = %LedgerError::from(error), "skipping malformed row");
                continue;
            }
        };

        match convert_operation(record).and_then(|op| submit(&ledger, &mut labels, op)) {
            Ok(Some(tx)) => {
                let status = wait_settled(&tx)?;
                if status == TransactionStatus::Invalid {
                    warn!(row, tx_id = tx.id(), "operation rejected at apply time");
                }
            }
            Ok(None) => {}
            Err(error) => warn!(row, error = %error, "operation rejected"),
        }
    }

    let rows: Vec<_> = labels
        .iter()
        .filter_map(|(label, id)| {
            ledger.find_account(*id).map(|account| (*label, account.snapshot()))
        })
        .collect();
    write_accounts_csv(output, &rows)
}

/// Submit one operation; `Ok(None)` for opens, which settle immediately
fn submit(
    ledger: &Ledger,
    labels: &mut BTreeMap<u64, AccountId>,
    op: Operation,
) -> Result<Option<Arc<Transaction>>, LedgerError> {
    match op {
        Operation::Open { label } => {
            if labels.contains_key(&label) {
                return Err(LedgerError::invalid_operation(format!(
                    "label {} is already open",
                    label
                )));
            }
            let account = ledger.create_account();
            labels.insert(label, account.id());
            Ok(None)
        }
        Operation::Deposit { label, amount } => {
            let id = resolve(labels, label)?;
            ledger.submit_deposit(id, amount).map(Some)
        }
        Operation::Withdraw { label, amount } => {
            let id = resolve(labels, label)?;
            ledger.submit_withdraw(id, amount).map(Some)
        }
        Operation::Transfer { from, to, amount } => {
            let source = resolve(labels, from)?;
            let destination = resolve(labels, to)?;
            ledger.submit_transfer(source, destination, amount).map(Some)
        }
    }
}

fn resolve(labels: &BTreeMap<u64, AccountId>, label: u64) -> Result<AccountId, LedgerError> {
    labels
        .get(&label)
        .copied()
        .ok_or_else(|| LedgerError::unknown_account_label(label))
}

/// Poll a transaction until it reaches a terminal state
fn wait_settled(tx: &Arc<Transaction>) -> Result<TransactionStatus, LedgerError> {
    let deadline = Instant::now() + SETTLE_TIMEOUT;
    loop {
        let status = tx.status();
        if status.is_terminal() {
            return Ok(status);
        }
        if Instant::now() >= deadline {
            return Err(LedgerError::SettleTimeout { tx_id: tx.id() });
        }
        thread::sleep(SETTLE_POLL);
    }
}
