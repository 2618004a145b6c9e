//! Reordering work queue for pending transactions
//!
//! This module provides the `TransactionQueue`, the deque that decouples
//! transaction minting from transaction application.
//!
//! # Reordering semantics
//!
//! Newly minted work enters at the tail ([`TransactionQueue::push_back`]).
//! When a worker discovers a transaction cannot be applied yet (its
//! predecessor in the source account's sequence has not completed, or a lock
//! acquisition timed out), it reinserts the transaction at the *head*
//! ([`TransactionQueue::push_front`]). Head reinsertion means a transaction
//! blocked only on its immediate predecessor is retried promptly instead of
//! waiting behind unrelated backlog. It bounds retry latency, not worst-case
//! busy work: a transaction with many un-applied predecessors circulates
//! repeatedly until its turn comes.
//!
//! # Thread Safety
//!
//! Safe for many concurrent producers (submit calls) and many concurrent
//! consumers (workers). [`TransactionQueue::pop_front`] is a non-blocking
//! poll; an empty result means the queue was momentarily drained, and the
//! worker loop handles idle waiting itself.

use crate::types::Transaction;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Concurrent reordering work queue of pending transactions
#[derive(Debug, Default)]
pub struct TransactionQueue {
    pending: Mutex<VecDeque<Arc<Transaction>>>,
}

impl TransactionQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        TransactionQueue {
            pending: Mutex::new(VecDeque::new()),
        }
    }

    /// Enqueue newly minted work at the tail
    pub fn push_back(&self, tx: Arc<Transaction>) {
        self.pending.lock().push_back(tx);
    }

    /// Reinsert not-yet-applicable work at the head
    ///
    /// Used for sequencing defers and lock timeouts; the transaction is
    /// still `Unprocessed` and will be retried before older backlog.
    pub fn push_front(&self, tx: Arc<Transaction>) {
        self.pending.lock().push_front(tx);
    }

    /// Take the next available transaction, if any
    ///
    /// Non-blocking: `None` means the queue is momentarily drained, not that
    /// no work will ever arrive.
    pub fn pop_front(&self) -> Option<Arc<Transaction>> {
        self.pending.lock().pop_front()
    }

    /// Number of pending transactions
    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }
}
