//! Thread-safe account storage
//!
//! This module provides the `AccountStore`, the keyed collection of live
//! accounts shared between the submit boundary and the worker pool.
//!
//! # Design
//!
//! Accounts are held in a `DashMap` keyed by account id, giving fine-grained
//! concurrent access: create/find/list/delete from many threads never take a
//! store-wide lock. The id allocator is owned by the store itself rather
//! than living in a global, so independent stores (one per test, for
//! instance) allocate independent id spaces.
//!
//! # Thread Safety
//!
//! All operations are safe to call concurrently. Accounts are handed out as
//! `Arc<Account>`, so a worker holding a reference keeps the account alive
//! even if it is deleted from the store mid-flight; such a transaction fails
//! validation on its next pass because `find` no longer resolves the id.

use crate::types::{Account, AccountId};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Concurrent keyed collection of accounts
#[derive(Debug, Default)]
pub struct AccountStore {
    /// Live accounts by id
    accounts: DashMap<AccountId, Arc<Account>>,

    /// Monotonic account-id allocator; first issued id is 1
    id_allocator: AtomicU64,
}

impl AccountStore {
    /// Create an empty store
    pub fn new() -> Self {
        AccountStore {
            accounts: DashMap::new(),
            id_allocator: AtomicU64::new(0),
        }
    }

    /// Create a new account with a fresh id, zero balance and an empty
    /// transaction sequence
    ///
    /// # Returns
    ///
    /// The newly created account. Ids are unique for the lifetime of the
    /// store and never reused, even after deletion.
    pub fn create(&self) -> Arc<Account> {
        let id = self.id_allocator.fetch_add(1, Ordering::SeqCst) + 1;
        let account = Arc::new(Account::new(id));
        self.accounts.insert(id, Arc::clone(&account));
        account
    }

    /// Look up an account by id
    pub fn find(&self, id: AccountId) -> Option<Arc<Account>> {
        self.accounts.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    /// All live accounts, in no particular order
    pub fn list(&self) -> Vec<Arc<Account>> {
        self.accounts
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    /// Remove an account
    ///
    /// # Returns
    ///
    /// `true` if an account with this id existed and was removed.
    pub fn delete(&self, id: AccountId) -> bool {
        self.accounts.remove(&id).is_some()
    }

    /// Remove every account; the id allocator keeps counting
    pub fn clear(&self) {
        self.accounts.clear();
    }

    /// Number of live accounts
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_create_assigns_fresh_ids() {
        let store = AccountStore::new();
        let a = store.create();
        let b = store.create();
        assert_eq!(a.id(), 1);
        assert_eq!(b.id(), 2);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_find_returns_same_account() {
        let store = AccountStore::new();
        let created = store.create();
        let found = store.find(created.id()).expect("account must be found");
        assert!(Arc::ptr_eq(&created, &found));
        assert!(store.find(999).is_none());
    }

    #[test]
    fn test_delete_removes_exactly_once() {
        let store = AccountStore::new();
        let account = store.create();
        assert!(store.delete(account.id()));
        assert!(!store.delete(account.id()));
        assert!(store.find(account.id()).is_none());
    }

    #[test]
    fn test_deleted_ids_are_not_reused() {
        let store = AccountStore::new();
        let first = store.create();
        store.delete(first.id());
        let second = store.create();
        assert_ne!(first.id(), second.id());
    }

    #[test]
    fn test_clear_empties_the_store() {
        let store = AccountStore::new();
        store.create();
        store.create();
        store.clear();
        assert!(store.is_empty());
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_concurrent_create_yields_distinct_ids() {
        let store = Arc::new(AccountStore::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                (0..50).map(|_| store.create().id()).collect::<Vec<_>>()
            }));
        }

        let mut ids: Vec<AccountId> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 400, "every account id must be unique");
        assert_eq!(store.len(), 400);
    }
}
