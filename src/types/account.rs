//! Account-related types for the ledger engine
//!
//! This module defines the account entity: its stable identity, the
//! monotonic counter that mints transaction ids, and the mutable
//! balance/last-transaction pair guarded by the account's lock.
//!
//! # Lock discipline
//!
//! `balance` and `last_transaction_id` live together inside a single
//! [`parking_lot::Mutex`] and change only as one atomic unit, only by the
//! worker currently holding that mutex. Reads taken through
//! [`Account::balance`], [`Account::last_transaction_id`] or
//! [`Account::snapshot`] acquire the lock briefly and are advisory: any
//! decision based on them must be re-verified under the lock before a
//! mutation is committed.

use super::transaction::TransactionId;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};

/// Account identifier
///
/// Assigned once at creation by the [`crate::core::AccountStore`] and stable
/// for the process lifetime. Also defines the global lock order: when a
/// transfer must hold two account locks, they are acquired in ascending id
/// order.
pub type AccountId = u64;

/// The mutable portion of an account, guarded by the account's mutex
///
/// The two fields form a single invariant: `last_transaction_id` is the id
/// of the highest transaction whose effect is included in `balance`.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountState {
    /// Current balance; never mutated without also considering
    /// `last_transaction_id`
    pub balance: Decimal,

    /// Sequence number of the highest transaction fully applied to this
    /// account; 0 until the account's first transaction completes
    pub last_transaction_id: TransactionId,
}

/// Consistent point-in-time view of an account
///
/// Produced under the account lock, so `balance` and `last_transaction_id`
/// are mutually consistent, but the account may move on immediately after
/// the snapshot is taken.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountSnapshot {
    pub id: AccountId,
    pub balance: Decimal,
    pub last_transaction_id: TransactionId,
}

/// A ledger account
///
/// Holds its own transaction-id mint ([`Account::next_transaction_id`]) and
/// the mutex that serializes every mutation of its balance. Accounts hold no
/// back-references to their transactions; only the id of the last applied
/// one is retained.
#[derive(Debug)]
pub struct Account {
    /// Unique, stable identity
    id: AccountId,

    /// Monotonic mint for transaction ids sourced from this account
    ///
    /// Starts at 0, strictly increasing, never reused. Minting is decoupled
    /// from application: many ids may be minted before any are applied.
    sequence: AtomicU64,

    /// The mutual-exclusion gate for `balance`/`last_transaction_id`
    state: Mutex<AccountState>,
}

impl Account {
    /// Create an account with zero balance and nothing applied yet
    pub fn new(id: AccountId) -> Self {
        Account {
            id,
            sequence: AtomicU64::new(0),
            state: Mutex::new(AccountState {
                balance: Decimal::ZERO,
                last_transaction_id: 0,
            }),
        }
    }

    pub fn id(&self) -> AccountId {
        self.id
    }

    /// Atomically increment and return the account's sequence counter
    ///
    /// The returned value becomes the id of a new transaction sourced from
    /// this account and defines the position that transaction must occupy
    /// in this account's apply order. The first minted id is 1.
    pub fn next_transaction_id(&self) -> TransactionId {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// The mutex guarding this account's mutable state
    ///
    /// Workers acquire it with a bounded `try_lock_for`; see
    /// [`crate::core::TransactionProcessor`] for the lock-order rules when
    /// two accounts are involved.
    pub fn state(&self) -> &Mutex<AccountState> {
        &self.state
    }

    /// Advisory balance read
    pub fn balance(&self) -> Decimal {
        self.state.lock().balance
    }

    /// Advisory read of the highest applied transaction id
    pub fn last_transaction_id(&self) -> TransactionId {
        self.state.lock().last_transaction_id
    }

    /// Take a consistent snapshot of the account's mutable state
    pub fn snapshot(&self) -> AccountSnapshot {
        let state = self.state.lock();
        AccountSnapshot {
            id: self.id,
            balance: state.balance,
            last_transaction_id: state.last_transaction_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_new_account_starts_empty() {
        let account = Account::new(42);
        assert_eq!(account.id(), 42);
        assert_eq!(account.balance(), Decimal::ZERO);
        assert_eq!(account.last_transaction_id(), 0);
    }

    #[test]
    fn test_sequence_starts_at_one_and_increases() {
        let account = Account::new(1);
        assert_eq!(account.next_transaction_id(), 1);
        assert_eq!(account.next_transaction_id(), 2);
        assert_eq!(account.next_transaction_id(), 3);
    }

    #[test]
    fn test_concurrent_minting_never_reuses_ids() {
        let account = Arc::new(Account::new(1));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let account = Arc::clone(&account);
            handles.push(thread::spawn(move || {
                (0..100)
                    .map(|_| account.next_transaction_id())
                    .collect::<Vec<_>>()
            }));
        }

        let mut ids: Vec<TransactionId> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 800, "every minted id must be unique");
        assert_eq!(*ids.first().unwrap(), 1);
        assert_eq!(*ids.last().unwrap(), 800);
    }

    #[test]
    fn test_snapshot_is_internally_consistent() {
        let account = Account::new(5);
        {
            let mut state = account.state().lock();
            state.balance = Decimal::from(75);
            state.last_transaction_id = 3;
        }
        let snapshot = account.snapshot();
        assert_eq!(snapshot.id, 5);
        assert_eq!(snapshot.balance, Decimal::from(75));
        assert_eq!(snapshot.last_transaction_id, 3);
    }
}
