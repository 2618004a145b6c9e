//! Transaction minting and enqueueing
//!
//! This module provides the `TransactionFactory`, the single production path
//! by which transactions come into existence. The factory performs boundary
//! validation, mints an id from the source account's sequence, and enqueues
//! the new transaction at the tail of the work queue.
//!
//! # Boundary validation
//!
//! Validation happens *before* any id is minted, so a rejected submission
//! leaves no gap in the source account's sequence and nothing ever enters
//! the queue with a non-positive amount or an unknown account. Sufficient
//! funds are *not* judged here: the visible balance is advisory (earlier
//! submissions may still be in flight), so a withdrawal or transfer is
//! accepted and the authoritative funds check under the account lock at
//! apply time decides, marking the transaction `Invalid` on failure.

use crate::core::account_store::AccountStore;
use crate::core::queue::TransactionQueue;
use crate::types::{Account, LedgerError, Transaction, TransactionType};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::debug;

/// Mints transactions and feeds the work queue
///
/// Holds the shared account store (to resolve and validate account ids and
/// to reach the source account's sequence counter) and the shared queue.
/// Submissions return the new transaction synchronously in status
/// `Unprocessed`; callers poll for the terminal state.
#[derive(Debug)]
pub struct TransactionFactory {
    accounts: Arc<AccountStore>,
    queue: Arc<TransactionQueue>,
}

impl TransactionFactory {
    /// Create a factory over the given store and queue
    pub fn new(accounts: Arc<AccountStore>, queue: Arc<TransactionQueue>) -> Self {
        TransactionFactory { accounts, queue }
    }

    /// Mint and enqueue a deposit
    ///
    /// # Errors
    ///
    /// [`LedgerError::AccountNotFound`] if `account_id` does not resolve,
    /// [`LedgerError::NonPositiveAmount`] if `amount <= 0`. No id is minted
    /// on error.
    pub fn deposit(
        &self,
        account_id: u64,
        amount: Decimal,
    ) -> Result<Arc<Transaction>, LedgerError> {
        validate_amount(amount)?;
        let account = self.resolve(account_id)?;
        Ok(self.mint(&account, TransactionType::Deposit, None, amount))
    }

    /// Mint and enqueue a withdrawal
    ///
    /// A withdrawal exceeding the visible balance is still accepted; the
    /// visible balance may lag submissions already in flight, so only the
    /// apply-time check under the account lock rejects.
    ///
    /// # Errors
    ///
    /// As for [`TransactionFactory::deposit`].
    pub fn withdraw(
        &self,
        account_id: u64,
        amount: Decimal,
    ) -> Result<Arc<Transaction>, LedgerError> {
        validate_amount(amount)?;
        let account = self.resolve(account_id)?;
        note_visible_funds(&account, amount);
        Ok(self.mint(&account, TransactionType::Withdraw, None, amount))
    }

    /// Mint and enqueue a transfer
    ///
    /// The id is minted from the *source* account's sequence; the
    /// destination account imposes no ordering of its own.
    ///
    /// # Errors
    ///
    /// As for [`TransactionFactory::withdraw`], plus
    /// [`LedgerError::SameAccountTransfer`] when both sides name the same
    /// account; [`LedgerError::AccountNotFound`] covers either side.
    pub fn transfer(
        &self,
        source_id: u64,
        destination_id: u64,
        amount: Decimal,
    ) -> Result<Arc<Transaction>, LedgerError> {
        validate_amount(amount)?;
        if source_id == destination_id {
            return Err(LedgerError::same_account_transfer(source_id));
        }
        let source = self.resolve(source_id)?;
        // Destination must exist at submit time; apply-time revalidation
        // catches deletion in between.
        self.resolve(destination_id)?;
        note_visible_funds(&source, amount);
        Ok(self.mint(&source, TransactionType::Transfer, Some(destination_id), amount))
    }

    fn resolve(&self, account_id: u64) -> Result<Arc<Account>, LedgerError> {
        self.accounts
            .find(account_id)
            .ok_or_else(|| LedgerError::account_not_found(account_id))
    }

    fn mint(
        &self,
        source: &Arc<Account>,
        tx_type: TransactionType,
        destination_id: Option<u64>,
        amount: Decimal,
    ) -> Arc<Transaction> {
        let tx = Arc::new(Transaction::new(
            source.next_transaction_id(),
            tx_type,
            source.id(),
            destination_id,
            amount,
        ));
        debug!(
            tx_id = tx.id(),
            source = source.id(),
            ?tx_type,
            %amount,
            "minted transaction"
        );
        self.queue.push_back(Arc::clone(&tx));
        tx
    }
}

fn validate_amount(amount: Decimal) -> Result<(), LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::non_positive_amount(amount));
    }
    Ok(())
}

/// Best-effort funds visibility against the advisory balance
///
/// Logs when the requested amount exceeds what is currently visible. Not a
/// rejection: the balance may lag in-flight work, and the apply-time check
/// under the account lock is authoritative.
fn note_visible_funds(account: &Account, amount: Decimal) {
    let balance = account.balance();
    if balance < amount {
        debug!(
            account = account.id(),
            %balance,
            %amount,
            "requested amount exceeds visible balance, apply-time check will decide"
        );
    }
}
