//! Error types for the ledger engine
//!
//! This module defines all error values surfaced to callers of the ledger.
//!
//! # Error Categories
//!
//! - **Boundary validation**: unknown account, non-positive amount,
//!   self-transfer. Returned synchronously from the submit operations
//!   before any transaction id is minted.
//! - **Demo-driver errors**: file I/O, CSV parsing, malformed operation
//!   scripts.
//!
//! Three conditions deliberately have no error value here: insufficient
//! funds (decided under the account lock at apply time, surfaced as an
//! `Invalid` transaction), a sequencing mismatch (expected control flow, the
//! transaction is requeued) and a lock timeout (transient, the transaction
//! is requeued).

use crate::types::account::AccountId;
use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for the ledger engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// No account exists with the given id
    ///
    /// Returned at the submit boundary; a worker that discovers the same
    /// condition at apply time marks the transaction Invalid instead.
    #[error("Account {id} not found")]
    AccountNotFound {
        /// The id that was looked up
        id: AccountId,
    },

    /// Amount is zero or negative
    ///
    /// All money movement requires a strictly positive amount. Rejected at
    /// the boundary so no transaction with a non-positive amount ever enters
    /// the queue.
    #[error("Amount must be strictly positive, got {amount}")]
    NonPositiveAmount {
        /// The offending amount
        amount: Decimal,
    },

    /// Transfer where source and destination are the same account
    #[error("Transfer source and destination must differ, both were {id}")]
    SameAccountTransfer {
        /// The account on both sides
        id: AccountId,
    },

    /// I/O error in the demo driver
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
    },

    /// CSV parsing error in the demo driver
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    Csv {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },

    /// Malformed operation record in a demo script
    #[error("Invalid operation: {message}")]
    InvalidOperation {
        /// What was wrong with the record
        message: String,
    },

    /// Demo script referenced an account label that was never opened
    #[error("Unknown account label {label}")]
    UnknownAccountLabel {
        /// The unresolved label
        label: u64,
    },

    /// A demo-script transaction never reached a terminal state
    #[error("Transaction {tx_id} did not settle in time")]
    SettleTimeout {
        /// The transaction still pending when the deadline passed
        tx_id: u64,
    },
}

impl From<std::io::Error> for LedgerError {
    fn from(error: std::io::Error) -> Self {
        LedgerError::Io {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for LedgerError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());
        LedgerError::Csv {
            line,
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl LedgerError {
    /// Create an AccountNotFound error
    pub fn account_not_found(id: AccountId) -> Self {
        LedgerError::AccountNotFound { id }
    }

    /// Create a NonPositiveAmount error
    pub fn non_positive_amount(amount: Decimal) -> Self {
        LedgerError::NonPositiveAmount { amount }
    }

    /// Create a SameAccountTransfer error
    pub fn same_account_transfer(id: AccountId) -> Self {
        LedgerError::SameAccountTransfer { id }
    }

    /// Create an InvalidOperation error
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        LedgerError::InvalidOperation {
            message: message.into(),
        }
    }

    /// Create an UnknownAccountLabel error
    pub fn unknown_account_label(label: u64) -> Self {
        LedgerError::UnknownAccountLabel { label }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = LedgerError::account_not_found(17);
        assert_eq!(err.to_string(), "Account 17 not found");

        let err = LedgerError::non_positive_amount(Decimal::from(-1));
        assert_eq!(err.to_string(), "Amount must be strictly positive, got -1");

        let err = LedgerError::same_account_transfer(3);
        assert_eq!(
            err.to_string(),
            "Transfer source and destination must differ, both were 3"
        );
    }

    #[test]
    fn test_csv_error_display_without_line() {
        let err = LedgerError::Csv {
            line: None,
            message: "bad header".to_string(),
        };
        assert_eq!(err.to_string(), "CSV parse error: bad header");
    }

    #[test]
    fn test_csv_error_display_with_line() {
        let err = LedgerError::Csv {
            line: Some(4),
            message: "bad field".to_string(),
        };
        assert_eq!(err.to_string(), "CSV parse error at line 4: bad field");
    }
}
