//! CSV format handling for the demo driver
//!
//! This module centralizes the CSV concerns of the demo binary, providing:
//! - `OperationRecord` for deserializing script rows
//! - Conversion from script rows to validated `Operation` values
//! - Final account-state serialization
//!
//! All functions are pure (no I/O beyond the passed writer) for easy
//! testing.
//!
//! # Script format
//!
//! ```text
//! op,account,to,amount
//! open,1,,
//! deposit,1,,100.00
//! withdraw,1,,30
//! transfer,1,2,10
//! ```
//!
//! `account` and `to` are *labels* chosen by the script author; the driver
//! maps them to the account ids the ledger assigns. `to` is meaningful only
//! for `transfer`, `amount` only for the three money-movement ops.

use crate::types::{AccountSnapshot, LedgerError};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;

/// CSV record structure for deserialization
///
/// Matches the script format with columns: op, account, to, amount.
/// `to` and `amount` are optional because `open` rows carry neither.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct OperationRecord {
    pub op: String,
    pub account: u64,
    pub to: Option<u64>,
    pub amount: Option<String>,
}

/// A validated script operation
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Create an account and bind it to `label`
    Open { label: u64 },

    Deposit { label: u64, amount: Decimal },

    Withdraw { label: u64, amount: Decimal },

    Transfer { from: u64, to: u64, amount: Decimal },
}

/// Convert an `OperationRecord` into a validated `Operation`
///
/// This function:
/// - Matches the op string case-insensitively
/// - Parses the amount string into a `Decimal` where one is required
/// - Rejects rows whose optional fields do not fit the op
///
/// # Errors
///
/// [`LedgerError::InvalidOperation`] describing the malformed field.
pub fn convert_operation(record: OperationRecord) -> Result<Operation, LedgerError> {
    let op = record.op.trim().to_lowercase();
    match op.as_str() {
        "open" => Ok(Operation::Open {
            label: record.account,
        }),
        "deposit" => Ok(Operation::Deposit {
            label: record.account,
            amount: parse_amount(&op, record.amount)?,
        }),
        "withdraw" => Ok(Operation::Withdraw {
            label: record.account,
            amount: parse_amount(&op, record.amount)?,
        }),
        "transfer" => {
            let to = record.to.ok_or_else(|| {
                LedgerError::invalid_operation(format!(
                    "transfer from account {} is missing a 'to' label",
                    record.account
                ))
            })?;
            Ok(Operation::Transfer {
                from: record.account,
                to,
                amount: parse_amount(&op, record.amount)?,
            })
        }
        other => Err(LedgerError::invalid_operation(format!(
            "unknown op '{}'",
            other
        ))),
    }
}

fn parse_amount(op: &str, amount: Option<String>) -> Result<Decimal, LedgerError> {
    let raw = match amount {
        Some(raw) if !raw.trim().is_empty() => raw,
        _ => {
            return Err(LedgerError::invalid_operation(format!(
                "'{}' requires an amount",
                op
            )))
        }
    };
    Decimal::from_str(raw.trim()).map_err(|_| {
        LedgerError::invalid_operation(format!("invalid amount '{}' for '{}'", raw, op))
    })
}

/// Write final account states as CSV
///
/// Rows are `(label, snapshot)` pairs; callers decide the order (the demo
/// driver sorts by label).
///
/// # Output format
///
/// ```text
/// account,balance,last_transaction_id
/// 1,70.00,3
/// 2,10.00,0
/// ```
pub fn write_accounts_csv<W: Write>(
    writer: &mut W,
    rows: &[(u64, AccountSnapshot)],
) -> Result<(), LedgerError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["account", "balance", "last_transaction_id"])?;
    for (label, snapshot) in rows {
        csv_writer.write_record([
            label.to_string(),
            snapshot.balance.to_string(),
            snapshot.last_transaction_id.to_string(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}
