//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Account entity, identifiers and state snapshot
//! - `transaction`: Transaction entity, type and status enums
//! - `error`: Error types for the ledger engine

pub mod account;
pub mod error;
pub mod transaction;

pub use account::{Account, AccountId, AccountSnapshot, AccountState};
pub use error::LedgerError;
pub use transaction::{Transaction, TransactionId, TransactionStatus, TransactionType};
