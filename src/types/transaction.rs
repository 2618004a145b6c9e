//! Transaction-related types for the ledger engine
//!
//! This module defines the transaction entity, its type and status enums,
//! and the identifiers used throughout the system.
//!
//! # Identity
//!
//! Transaction ids are minted from the *source* account's sequence counter,
//! so an id is unique only within that account's id space, not globally.
//! The id also defines the position the transaction must occupy in the
//! source account's apply order.
//!
//! # Mutability
//!
//! Every field except `status` is immutable after creation. The status cell
//! is the only piece of a transaction that workers write, and it transitions
//! exactly once from `Unprocessed` to a terminal state.

use super::account::AccountId;
use parking_lot::RwLock;
use rust_decimal::Decimal;

/// Transaction identifier
///
/// Drawn from the source account's monotonic sequence counter.
/// Ids start at 1; an account whose `last_transaction_id` is 0 has had
/// nothing applied yet.
pub type TransactionId = u64;

/// Money-movement operations supported by the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionType {
    /// Credit funds to the source account
    Deposit,

    /// Debit funds from the source account
    ///
    /// Requires sufficient balance at apply time.
    Withdraw,

    /// Move funds from the source account to a distinct destination account
    ///
    /// Requires sufficient balance on the source at apply time. Both sides
    /// are applied under both account locks, so no external reader ever
    /// observes only one side.
    Transfer,
}

/// Lifecycle status of a transaction
///
/// `Unprocessed` transactions circulate through the work queue. `Completed`
/// and `Invalid` are terminal: once set, the status never changes again and
/// the transaction leaves the queue permanently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    /// Minted and enqueued, not yet applied or rejected
    Unprocessed,

    /// Successfully applied to the account(s)
    Completed,

    /// Rejected (unknown account, non-positive amount, insufficient funds)
    Invalid,
}

impl TransactionStatus {
    /// Whether this status admits no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransactionStatus::Completed | TransactionStatus::Invalid
        )
    }
}

/// A single money-movement transaction
///
/// Shared as `Arc<Transaction>` between the submitting caller, the work
/// queue, and the worker that eventually decides its fate. Callers poll
/// [`Transaction::status`] for the terminal state; there is no completion
/// notification.
#[derive(Debug)]
pub struct Transaction {
    /// Id minted from the source account's sequence counter
    id: TransactionId,

    /// The operation this transaction performs
    tx_type: TransactionType,

    /// Account the id was minted from; deposits and withdrawals apply here,
    /// transfers debit here
    source_account_id: AccountId,

    /// Credit side of a transfer; `None` for deposits and withdrawals
    destination_account_id: Option<AccountId>,

    /// Strictly positive amount to move
    amount: Decimal,

    /// The only mutable field; written at most once after creation
    status: RwLock<TransactionStatus>,
}

impl Transaction {
    /// Create a new `Unprocessed` transaction
    ///
    /// The id must come from the source account's sequence counter
    /// ([`crate::types::Account::next_transaction_id`]); the factory is the
    /// only production call site.
    pub fn new(
        id: TransactionId,
        tx_type: TransactionType,
        source_account_id: AccountId,
        destination_account_id: Option<AccountId>,
        amount: Decimal,
    ) -> Self {
        Transaction {
            id,
            tx_type,
            source_account_id,
            destination_account_id,
            amount,
            status: RwLock::new(TransactionStatus::Unprocessed),
        }
    }

    /// The transaction's position in the source account's apply order
    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn tx_type(&self) -> TransactionType {
        self.tx_type
    }

    pub fn source_account_id(&self) -> AccountId {
        self.source_account_id
    }

    pub fn destination_account_id(&self) -> Option<AccountId> {
        self.destination_account_id
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Current status snapshot
    pub fn status(&self) -> TransactionStatus {
        *self.status.read()
    }

    /// Transition to a terminal status
    ///
    /// Only succeeds while the transaction is still `Unprocessed`; a second
    /// terminal transition is refused so an already-decided transaction can
    /// never be re-decided.
    ///
    /// # Returns
    ///
    /// `true` if the transition was applied, `false` if the transaction was
    /// already terminal.
    pub fn mark_terminal(&self, status: TransactionStatus) -> bool {
        debug_assert!(status.is_terminal(), "mark_terminal takes a terminal status");
        let mut current = self.status.write();
        if current.is_terminal() {
            return false;
        }
        *current = status;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn deposit(id: TransactionId) -> Transaction {
        Transaction::new(id, TransactionType::Deposit, 1, None, Decimal::from(10))
    }

    #[test]
    fn test_new_transaction_is_unprocessed() {
        let tx = deposit(1);
        assert_eq!(tx.status(), TransactionStatus::Unprocessed);
        assert!(!tx.status().is_terminal());
    }

    #[test]
    fn test_terminal_transition_applies_once() {
        let tx = deposit(1);
        assert!(tx.mark_terminal(TransactionStatus::Completed));
        assert_eq!(tx.status(), TransactionStatus::Completed);

        // Second transition is refused, status unchanged
        assert!(!tx.mark_terminal(TransactionStatus::Invalid));
        assert_eq!(tx.status(), TransactionStatus::Completed);
    }

    #[test]
    fn test_invalid_is_terminal() {
        let tx = deposit(7);
        assert!(tx.mark_terminal(TransactionStatus::Invalid));
        assert!(tx.status().is_terminal());
        assert!(!tx.mark_terminal(TransactionStatus::Completed));
        assert_eq!(tx.status(), TransactionStatus::Invalid);
    }

    #[test]
    fn test_fields_reflect_construction() {
        let tx = Transaction::new(
            3,
            TransactionType::Transfer,
            5,
            Some(9),
            Decimal::new(2550, 2),
        );
        assert_eq!(tx.id(), 3);
        assert_eq!(tx.tx_type(), TransactionType::Transfer);
        assert_eq!(tx.source_account_id(), 5);
        assert_eq!(tx.destination_account_id(), Some(9));
        assert_eq!(tx.amount(), Decimal::new(2550, 2));
    }
}
