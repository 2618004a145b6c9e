//! Ledger facade
//!
//! This module wires the account store, work queue, factory and processor
//! into one owned object graph and exposes the external interface of the
//! engine: account lifecycle calls that delegate straight to the store, and
//! submit calls that mint and enqueue through the factory.
//!
//! There is no ambient global state: every collaborator is constructed here
//! and shared by `Arc`, so independent ledgers (one per test, for instance)
//! are fully isolated.

use crate::core::account_store::AccountStore;
use crate::core::factory::TransactionFactory;
use crate::core::processor::TransactionProcessor;
use crate::core::queue::TransactionQueue;
use crate::types::{Account, AccountId, LedgerError, Transaction};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;

/// Configuration consumed by the ledger core
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerConfig {
    /// Number of worker threads draining the queue
    pub workers: usize,

    /// Fixed sleep between polls while the queue is drained
    pub idle_wait: Duration,

    /// Bound on every per-account lock acquisition
    pub lock_timeout: Duration,
}

impl Default for LedgerConfig {
    /// One worker, 50 ms idle poll, 1 s lock timeout
    fn default() -> Self {
        LedgerConfig {
            workers: 1,
            idle_wait: Duration::from_millis(50),
            lock_timeout: Duration::from_millis(1000),
        }
    }
}

/// The in-process ledger
///
/// Owns the account store, the reordering work queue, the transaction
/// factory and the worker pool. Submit calls return the transaction
/// synchronously in status `Unprocessed`; there is no completion
/// notification, callers poll the transaction (or the account) for the
/// terminal state.
#[derive(Debug)]
pub struct Ledger {
    accounts: Arc<AccountStore>,
    queue: Arc<TransactionQueue>,
    factory: TransactionFactory,
    processor: Arc<TransactionProcessor>,
}

impl Ledger {
    /// Build a ledger with the given configuration
    ///
    /// Workers are not started yet; call [`Ledger::start`], or drive the
    /// processor manually with [`Ledger::process_next`].
    pub fn new(config: LedgerConfig) -> Self {
        let accounts = Arc::new(AccountStore::new());
        let queue = Arc::new(TransactionQueue::new());
        let factory = TransactionFactory::new(Arc::clone(&accounts), Arc::clone(&queue));
        let processor = Arc::new(TransactionProcessor::new(
            Arc::clone(&accounts),
            Arc::clone(&queue),
            &config,
        ));
        Ledger {
            accounts,
            queue,
            factory,
            processor,
        }
    }

    /// Spawn the worker pool
    ///
    /// Workers run until process termination.
    ///
    /// # Errors
    ///
    /// Propagates the OS error if a worker thread cannot be spawned.
    pub fn start(&self) -> std::io::Result<()> {
        Arc::clone(&self.processor).start()
    }

    /// Dequeue and process one transaction without worker threads
    ///
    /// # Returns
    ///
    /// `false` if the queue was momentarily drained.
    pub fn process_next(&self) -> bool {
        self.processor.poll_once()
    }

    // Account lifecycle: direct delegation to the store, no sequencing
    // logic involved.

    /// Create a new account with a fresh id and zero balance
    pub fn create_account(&self) -> Arc<Account> {
        self.accounts.create()
    }

    /// Delete an account
    ///
    /// Transactions already in flight against it become `Invalid` on their
    /// next pass through a worker.
    pub fn delete_account(&self, id: AccountId) -> bool {
        self.accounts.delete(id)
    }

    /// Look up an account by id
    pub fn find_account(&self, id: AccountId) -> Option<Arc<Account>> {
        self.accounts.find(id)
    }

    /// All live accounts, in no particular order
    pub fn list_accounts(&self) -> Vec<Arc<Account>> {
        self.accounts.list()
    }

    // Submit operations: boundary validation, then mint and enqueue.

    /// Submit a deposit; returns the transaction in status `Unprocessed`
    pub fn submit_deposit(
        &self,
        account_id: AccountId,
        amount: Decimal,
    ) -> Result<Arc<Transaction>, LedgerError> {
        self.factory.deposit(account_id, amount)
    }

    /// Submit a withdrawal; returns the transaction in status `Unprocessed`
    pub fn submit_withdraw(
        &self,
        account_id: AccountId,
        amount: Decimal,
    ) -> Result<Arc<Transaction>, LedgerError> {
        self.factory.withdraw(account_id, amount)
    }

    /// Submit a transfer; returns the transaction in status `Unprocessed`
    pub fn submit_transfer(
        &self,
        source_id: AccountId,
        destination_id: AccountId,
        amount: Decimal,
    ) -> Result<Arc<Transaction>, LedgerError> {
        self.factory.transfer(source_id, destination_id, amount)
    }

    /// Number of transactions currently pending in the queue
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Ledger::new(LedgerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TransactionStatus;

    fn manual_ledger() -> Ledger {
        Ledger::new(LedgerConfig {
            workers: 0,
            idle_wait: Duration::from_millis(1),
            lock_timeout: Duration::from_millis(50),
        })
    }

    #[test]
    fn test_account_lifecycle_delegates_to_store() {
        let ledger = manual_ledger();
        let account = ledger.create_account();
        assert!(ledger.find_account(account.id()).is_some());
        assert_eq!(ledger.list_accounts().len(), 1);
        assert!(ledger.delete_account(account.id()));
        assert!(ledger.find_account(account.id()).is_none());
        assert!(!ledger.delete_account(account.id()));
    }

    #[test]
    fn test_submit_returns_unprocessed_and_pending() {
        let ledger = manual_ledger();
        let account = ledger.create_account();
        let tx = ledger.submit_deposit(account.id(), Decimal::from(10)).unwrap();
        assert_eq!(tx.status(), TransactionStatus::Unprocessed);
        assert_eq!(ledger.pending(), 1);

        assert!(ledger.process_next());
        assert_eq!(tx.status(), TransactionStatus::Completed);
        assert_eq!(ledger.pending(), 0);
    }

    #[test]
    fn test_independent_ledgers_do_not_share_id_spaces() {
        let a = manual_ledger();
        let b = manual_ledger();
        assert_eq!(a.create_account().id(), 1);
        assert_eq!(b.create_account().id(), 1);
    }
}
