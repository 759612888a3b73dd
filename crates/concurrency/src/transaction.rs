//! Transaction registry
//!
//! The coordinator records every transaction it has ever been told
//! about, keyed by the externally supplied id. Status transitions are
//! one-way: a Running transaction may become Committed or Aborted, and
//! a finished transaction never changes again. Operations naming a
//! finished or unknown transaction are dropped by the caller; the
//! registry is what makes those checks cheap.

use avail_core::{SiteId, Timestamp, TransactionId};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Read-write versus read-only, fixed at `begin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionClass {
    /// Locks replicas, buffers writes, commits at `end`.
    ReadWrite,
    /// Reads a multiversion snapshot as of its start; never locks.
    ReadOnly,
}

/// Why a transaction was aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbortReason {
    /// Lost a wait-die decision against an older lock holder.
    WaitDie {
        /// The holder the requester was compared against.
        conflicting: TransactionId,
    },
    /// A site the transaction had locked data at failed.
    SiteFailure {
        /// The failed site.
        site: SiteId,
    },
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortReason::WaitDie { conflicting } => {
                write!(f, "wait-die conflict with {}", conflicting)
            }
            AbortReason::SiteFailure { site } => write!(f, "site {} failed", site),
        }
    }
}

/// Lifecycle state; transitions leave `Running` exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// Still issuing operations.
    Running,
    /// Finished successfully.
    Committed,
    /// Finished by abort; permanent.
    Aborted {
        /// What killed it.
        reason: AbortReason,
    },
}

/// One registered transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Externally supplied id.
    pub id: TransactionId,
    /// Logical time of `begin`; the wait-die age and the snapshot
    /// timestamp for read-only transactions.
    pub start: Timestamp,
    /// Read-write or read-only.
    pub class: TransactionClass,
    /// Current lifecycle state.
    pub status: TransactionStatus,
}

impl Transaction {
    /// True while the transaction may still issue operations.
    pub fn is_running(&self) -> bool {
        self.status == TransactionStatus::Running
    }

    /// True for read-only transactions.
    pub fn is_readonly(&self) -> bool {
        self.class == TransactionClass::ReadOnly
    }
}

/// Registry of every transaction the coordinator has seen.
#[derive(Debug, Clone, Default)]
pub struct TransactionRegistry {
    transactions: FxHashMap<TransactionId, Transaction>,
}

impl TransactionRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a transaction. Re-declaring a known id (whatever its
    /// state) is a no-op and returns false.
    pub fn begin(
        &mut self,
        id: TransactionId,
        class: TransactionClass,
        now: Timestamp,
    ) -> bool {
        if self.transactions.contains_key(&id) {
            return false;
        }
        self.transactions.insert(
            id,
            Transaction {
                id,
                start: now,
                class,
                status: TransactionStatus::Running,
            },
        );
        true
    }

    /// Look up a transaction.
    pub fn get(&self, id: TransactionId) -> Option<&Transaction> {
        self.transactions.get(&id)
    }

    /// True if `id` is registered and still Running.
    pub fn is_running(&self, id: TransactionId) -> bool {
        self.get(id).is_some_and(Transaction::is_running)
    }

    /// Start timestamp of a registered transaction.
    pub fn start_of(&self, id: TransactionId) -> Option<Timestamp> {
        self.get(id).map(|txn| txn.start)
    }

    /// Move a Running transaction to Committed. Returns false (and
    /// changes nothing) otherwise.
    pub fn mark_committed(&mut self, id: TransactionId) -> bool {
        match self.transactions.get_mut(&id) {
            Some(txn) if txn.is_running() => {
                txn.status = TransactionStatus::Committed;
                true
            }
            _ => false,
        }
    }

    /// Move a Running transaction to Aborted. Returns false (and
    /// changes nothing) otherwise; aborts never overwrite each other.
    pub fn mark_aborted(&mut self, id: TransactionId, reason: AbortReason) -> bool {
        match self.transactions.get_mut(&id) {
            Some(txn) if txn.is_running() => {
                txn.status = TransactionStatus::Aborted { reason };
                true
            }
            _ => false,
        }
    }

    /// True while any read-only transaction is Running; commits retain
    /// version history exactly as long as this holds.
    pub fn has_running_readonly(&self) -> bool {
        self.transactions
            .values()
            .any(|txn| txn.is_readonly() && txn.is_running())
    }

    /// Ids currently Running, ascending.
    pub fn running_ids(&self) -> Vec<TransactionId> {
        self.ids_where(|txn| txn.status == TransactionStatus::Running)
    }

    /// Ids that committed, ascending.
    pub fn committed_ids(&self) -> Vec<TransactionId> {
        self.ids_where(|txn| txn.status == TransactionStatus::Committed)
    }

    /// Ids that aborted, ascending.
    pub fn aborted_ids(&self) -> Vec<TransactionId> {
        self.ids_where(|txn| matches!(txn.status, TransactionStatus::Aborted { .. }))
    }

    fn ids_where(&self, pred: impl Fn(&Transaction) -> bool) -> Vec<TransactionId> {
        let mut ids: Vec<_> = self
            .transactions
            .values()
            .filter(|txn| pred(txn))
            .map(|txn| txn.id)
            .collect();
        ids.sort();
        ids
    }
}
