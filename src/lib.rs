//! Ledger Engine Library
//! # Overview
//!
//! An in-process ledger that applies money-movement operations (deposit,
//! withdraw, transfer) against accounts held entirely in memory. Operations
//! are minted as ordered transaction records and drained by a pool of
//! concurrent workers, which apply them to each account in the exact order
//! the account produced them, even though workers dequeue in arbitrary
//! order.
//!
//! # Architecture
//!
//! - [`types`] - Core data types (Account, Transaction, errors)
//! - [`core`] - The execution engine:
//!   - [`core::account_store`] - Concurrent keyed collection of accounts
//!   - [`core::queue`] - Reordering work queue with requeue-to-head
//!   - [`core::factory`] - Boundary validation, id minting, enqueueing
//!   - [`core::processor`] - Worker pool, sequencing protocol, lock discipline
//!   - [`core::ledger`] - Facade exposing the external API
//! - [`cli`] / [`io`] / [`driver`] - The CSV demo binary's surface
//!
//! # Sequencing protocol
//!
//! Each account mints transaction ids from its own monotonic counter. A
//! worker may apply a transaction only when its id equals the account's
//! `last_transaction_id + 1`; anything dequeued early is requeued at the
//! *head* of the queue and retried promptly. Per-account application order
//! therefore equals mint order for any worker count, while transactions on
//! different accounts proceed independently.
//!
//! # Guarantees and limits
//!
//! - Balance and `last_transaction_id` mutate only together, under the
//!   account's lock.
//! - Transfers take both account locks in ascending-id order (no deadlock)
//!   and apply both sides inside one critical section (no torn reads).
//! - Lock acquisitions are bounded; a timeout requeues the transaction,
//!   never drops it.
//! - The *destination* of a transfer is serialized only by its lock, not by
//!   its own sequence; nothing here is durable across restarts.

// Module declarations
pub mod cli;
pub mod core;
pub mod driver;
pub mod io;
pub mod types;

pub use crate::core::{
    AccountStore, Ledger, LedgerConfig, TransactionFactory, TransactionProcessor,
    TransactionQueue,
};
pub use crate::io::write_accounts_csv;
pub use crate::types::{
    Account, AccountId, AccountSnapshot, LedgerError, Transaction, TransactionId,
    TransactionStatus, TransactionType,
};
