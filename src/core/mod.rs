//! Core business logic module
//!
//! This module contains the ordered transaction execution engine:
//! - `account_store` - Concurrent keyed collection of accounts
//! - `queue` - Reordering work queue of pending transactions
//! - `factory` - Transaction minting and enqueueing
//! - `processor` - Worker pool and per-account sequencing protocol
//! - `ledger` - Facade wiring the components and exposing the external API

pub mod account_store;
pub mod factory;
pub mod ledger;
pub mod processor;
pub mod queue;

pub use account_store::AccountStore;
pub use factory::TransactionFactory;
pub use ledger::{Ledger, LedgerConfig};
pub use processor::TransactionProcessor;
pub use queue::TransactionQueue;
