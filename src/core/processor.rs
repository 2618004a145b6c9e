//! Worker pool and per-account sequencing protocol
//!
//! This module provides the `TransactionProcessor`, the pool of worker
//! threads that drains the work queue and applies transactions to accounts.
//!
//! # Worker loop
//!
//! Each worker loops forever: poll the queue; if it is drained, sleep a
//! fixed idle interval and retry. A dequeued transaction goes through:
//!
//! 1. Stale guard: anything already terminal is discarded silently.
//! 2. Static validation (no lock taken): source account exists, amount is
//!    strictly positive, and for transfers the destination exists and
//!    differs from the source. Failure marks the transaction `Invalid`.
//! 3. Lock acquisition, bounded by a timeout. Deposits and withdrawals lock
//!    only the source account; transfers lock both accounts in ascending
//!    account-id order, which prevents deadlock between opposite-direction
//!    transfers over the same pair. A timeout requeues the transaction at
//!    the head of the queue, never drops it.
//! 4. Sequencing check under the source lock: the transaction's id must be
//!    `last_transaction_id + 1`. A mismatch releases the lock(s) and
//!    requeues to the head, unchanged; this is expected control flow, not an
//!    error, and only the offending transaction re-circulates.
//! 5. Funds re-validation under the lock (the submit-time check was
//!    advisory). Failure marks the transaction `Invalid`.
//! 6. Apply, update `last_transaction_id`, mark `Completed`, release in
//!    reverse acquisition order.
//!
//! No failure while processing one transaction can terminate a worker loop
//! or affect any other transaction in flight.
//!
//! # Destination ordering
//!
//! A transfer's credit side is serialized only by the destination account's
//! lock; the destination's own transaction sequence never gates it. This
//! asymmetry is a deliberate scope limitation: concurrent transfers into one
//! destination apply in lock-acquisition order, not in any id order.

use crate::core::account_store::AccountStore;
use crate::core::ledger::LedgerConfig;
use crate::core::queue::TransactionQueue;
use crate::types::{Account, AccountState, Transaction, TransactionStatus, TransactionType};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// Result of one attempt to apply a dequeued transaction
enum Outcome {
    /// Mutation applied, transaction is terminal
    Completed,

    /// Rejected with a reason, transaction is terminal
    Invalid(&'static str),

    /// Not applicable yet; requeued at the head, still `Unprocessed`
    Deferred,
}

/// Pool of worker threads enforcing the per-account sequencing protocol
#[derive(Debug)]
pub struct TransactionProcessor {
    accounts: Arc<AccountStore>,
    queue: Arc<TransactionQueue>,
    workers: usize,
    idle_wait: Duration,
    lock_timeout: Duration,
}

impl TransactionProcessor {
    /// Create a processor over the shared store and queue
    pub fn new(
        accounts: Arc<AccountStore>,
        queue: Arc<TransactionQueue>,
        config: &LedgerConfig,
    ) -> Self {
        TransactionProcessor {
            accounts,
            queue,
            workers: config.workers,
            idle_wait: config.idle_wait,
            lock_timeout: config.lock_timeout,
        }
    }

    /// Spawn the configured number of worker threads
    ///
    /// Workers run until process termination; there is no drain or shutdown
    /// primitive. The only blocking points inside a worker are the bounded
    /// lock acquisition and the fixed idle sleep.
    ///
    /// # Errors
    ///
    /// Propagates the OS error if a worker thread cannot be spawned.
    pub fn start(self: Arc<Self>) -> std::io::Result<()> {
        info!(workers = self.workers, "starting transaction workers");
        for index in 0..self.workers {
            let processor = Arc::clone(&self);
            thread::Builder::new()
                .name(format!("ledger-worker-{index}"))
                .spawn(move || processor.run_worker())?;
        }
        Ok(())
    }

    /// Dequeue and process a single transaction
    ///
    /// # Returns
    ///
    /// `false` if the queue was momentarily drained. Useful for callers that
    /// drive the processor manually instead of starting worker threads.
    pub fn poll_once(&self) -> bool {
        match self.queue.pop_front() {
            Some(tx) => {
                self.process(tx);
                true
            }
            None => false,
        }
    }

    fn run_worker(&self) {
        loop {
            if !self.poll_once() {
                trace!("queue drained, idling");
                thread::sleep(self.idle_wait);
            }
        }
    }

    /// Apply or reject one transaction
    ///
    /// Decides the transaction's fate independently of everything else in
    /// flight: terminal transactions are discarded, applicable ones are
    /// applied, not-yet-applicable ones are requeued at the head.
    pub fn process(&self, tx: Arc<Transaction>) {
        // Idempotent guard: a transaction re-observed after an earlier
        // terminal decision must not be applied again.
        if tx.status() != TransactionStatus::Unprocessed {
            debug!(tx_id = tx.id(), "skipping already-decided transaction");
            return;
        }

        match tx.tx_type() {
            TransactionType::Deposit => self.deposit(&tx),
            TransactionType::Withdraw => self.withdraw(&tx),
            TransactionType::Transfer => self.transfer(&tx),
        }
    }

    fn deposit(&self, tx: &Arc<Transaction>) {
        let Some(account) = self.lookup_source(tx) else {
            return;
        };
        if !self.check_amount(tx) {
            return;
        }

        self.with_source_lock(tx, &account, |state| {
            // Re-checked under the lock; guards a hand-constructed record
            // reaching the queue without boundary validation.
            if tx.amount() <= Decimal::ZERO {
                return Outcome::Invalid("non-positive amount");
            }
            state.balance += tx.amount();
            Outcome::Completed
        });
    }

    fn withdraw(&self, tx: &Arc<Transaction>) {
        let Some(account) = self.lookup_source(tx) else {
            return;
        };
        if !self.check_amount(tx) {
            return;
        }

        self.with_source_lock(tx, &account, |state| {
            if tx.amount() <= Decimal::ZERO {
                return Outcome::Invalid("non-positive amount");
            }
            // The submit-time funds check was advisory; this one decides.
            if state.balance < tx.amount() {
                return Outcome::Invalid("insufficient funds");
            }
            state.balance -= tx.amount();
            Outcome::Completed
        });
    }

    fn transfer(&self, tx: &Arc<Transaction>) {
        let Some(source) = self.lookup_source(tx) else {
            return;
        };
        let Some(destination_id) = tx.destination_account_id() else {
            self.invalidate(tx, "transfer without destination");
            return;
        };
        if destination_id == tx.source_account_id() {
            self.invalidate(tx, "transfer onto the source account");
            return;
        }
        let Some(destination) = self.accounts.find(destination_id) else {
            self.invalidate(tx, "destination account not found");
            return;
        };
        if !self.check_amount(tx) {
            return;
        }

        // Two distinct locks, taken in ascending account-id order so that
        // opposite-direction transfers over the same pair cannot deadlock.
        let source_first = source.id() < destination.id();
        let (first, second) = if source_first {
            (&source, &destination)
        } else {
            (&destination, &source)
        };

        let Some(mut first_guard) = first.state().try_lock_for(self.lock_timeout) else {
            self.requeue_after_timeout(tx);
            return;
        };
        let Some(mut second_guard) = second.state().try_lock_for(self.lock_timeout) else {
            drop(first_guard);
            self.requeue_after_timeout(tx);
            return;
        };

        let outcome = {
            let (src_state, dst_state) = if source_first {
                (&mut *first_guard, &mut *second_guard)
            } else {
                (&mut *second_guard, &mut *first_guard)
            };

            // Only the source side is sequenced; the destination never
            // blocks on an ordering check.
            if src_state.last_transaction_id + 1 != tx.id() {
                Outcome::Deferred
            } else if tx.amount() <= Decimal::ZERO {
                Outcome::Invalid("non-positive amount")
            } else if src_state.balance < tx.amount() {
                Outcome::Invalid("insufficient funds")
            } else {
                src_state.balance -= tx.amount();
                dst_state.balance += tx.amount();
                src_state.last_transaction_id = tx.id();
                Outcome::Completed
            }
        };

        // Release in reverse acquisition order.
        drop(second_guard);
        drop(first_guard);
        self.finish(tx, outcome);
    }

    /// Acquire the source lock, run the sequencing check, then `apply`
    ///
    /// Commits `last_transaction_id` together with whatever `apply` did to
    /// the balance, releases the lock, and settles the transaction's fate.
    fn with_source_lock(
        &self,
        tx: &Arc<Transaction>,
        account: &Account,
        apply: impl FnOnce(&mut AccountState) -> Outcome,
    ) {
        let Some(mut state) = account.state().try_lock_for(self.lock_timeout) else {
            self.requeue_after_timeout(tx);
            return;
        };

        let outcome = if state.last_transaction_id + 1 != tx.id() {
            Outcome::Deferred
        } else {
            let outcome = apply(&mut state);
            if matches!(outcome, Outcome::Completed) {
                state.last_transaction_id = tx.id();
            }
            outcome
        };

        drop(state);
        self.finish(tx, outcome);
    }

    fn finish(&self, tx: &Arc<Transaction>, outcome: Outcome) {
        match outcome {
            Outcome::Completed => {
                if tx.mark_terminal(TransactionStatus::Completed) {
                    info!(
                        tx_id = tx.id(),
                        source = tx.source_account_id(),
                        "transaction completed"
                    );
                }
            }
            Outcome::Invalid(reason) => self.invalidate(tx, reason),
            Outcome::Deferred => {
                debug!(
                    tx_id = tx.id(),
                    source = tx.source_account_id(),
                    "preceding transaction not yet applied, requeueing at head"
                );
                self.queue.push_front(Arc::clone(tx));
            }
        }
    }

    fn lookup_source(&self, tx: &Arc<Transaction>) -> Option<Arc<Account>> {
        let account = self.accounts.find(tx.source_account_id());
        if account.is_none() {
            self.invalidate(tx, "source account not found");
        }
        account
    }

    fn check_amount(&self, tx: &Arc<Transaction>) -> bool {
        if tx.amount() <= Decimal::ZERO {
            self.invalidate(tx, "non-positive amount");
            return false;
        }
        true
    }

    fn invalidate(&self, tx: &Arc<Transaction>, reason: &'static str) {
        if tx.mark_terminal(TransactionStatus::Invalid) {
            info!(
                tx_id = tx.id(),
                source = tx.source_account_id(),
                reason,
                "transaction invalid"
            );
        }
    }

    /// A timed-out lock acquisition preserves the transaction
    ///
    /// Dropping it here would lose money invisibly; the transaction goes
    /// back to the head of the queue and the worker moves on.
    fn requeue_after_timeout(&self, tx: &Arc<Transaction>) {
        warn!(
            tx_id = tx.id(),
            source = tx.source_account_id(),
            timeout_ms = self.lock_timeout.as_millis() as u64,
            "lock acquisition timed out, requeueing at head"
        );
        self.queue.push_front(Arc::clone(tx));
    }
}
