//! Per-site lock table for strict two-phase locking
//!
//! Locks are held from acquisition until the owning transaction commits
//! or aborts (or the site fails, which wipes the table). The invariants
//! the table maintains:
//!
//! - any number of READ locks may coexist on a variable
//! - at most one WRITE lock exists per variable, and it excludes all
//!   other locks
//! - a transaction holds at most one lock per variable; asking for
//!   WRITE while holding READ escalates the existing lock in place

use avail_core::{TransactionId, VariableId};
use rustc_hash::FxHashMap;

/// Lock strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    /// Shared read lock.
    Read,
    /// Exclusive write lock.
    Write,
}

/// One granted lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lock {
    /// Transaction holding the lock.
    pub holder: TransactionId,
    /// Current strength; READ may escalate to WRITE in place.
    pub mode: LockMode,
}

/// Outcome of a lock request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockGrant {
    /// The lock is now held (possibly escalated, possibly already held).
    Granted,
    /// Denied; the holders standing in the way, in acquisition order.
    Conflict {
        /// Transactions whose locks exclude the request.
        holders: Vec<TransactionId>,
    },
}

/// Lock table covering the variables hosted at one site.
#[derive(Debug, Clone, Default)]
pub struct LockTable {
    locks: FxHashMap<VariableId, Vec<Lock>>,
}

impl LockTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock `tid` holds on `variable`, if any.
    pub fn held_mode(&self, tid: TransactionId, variable: VariableId) -> Option<LockMode> {
        self.locks
            .get(&variable)?
            .iter()
            .find(|lock| lock.holder == tid)
            .map(|lock| lock.mode)
    }

    /// The WRITE lock holder on `variable`, if any.
    pub fn write_holder(&self, variable: VariableId) -> Option<TransactionId> {
        self.locks
            .get(&variable)?
            .iter()
            .find(|lock| lock.mode == LockMode::Write)
            .map(|lock| lock.holder)
    }

    /// Every holder on `variable` other than `tid`, in acquisition
    /// order. A non-empty result means a WRITE request by `tid` would
    /// be denied.
    pub fn other_holders(&self, variable: VariableId, tid: TransactionId) -> Vec<TransactionId> {
        self.locks
            .get(&variable)
            .map(|locks| {
                locks
                    .iter()
                    .filter(|lock| lock.holder != tid)
                    .map(|lock| lock.holder)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Request a READ lock. Denied only by another holder's WRITE lock.
    pub fn try_read(&mut self, tid: TransactionId, variable: VariableId) -> LockGrant {
        if self.held_mode(tid, variable).is_some() {
            return LockGrant::Granted;
        }
        if let Some(writer) = self.write_holder(variable) {
            return LockGrant::Conflict { holders: vec![writer] };
        }
        self.locks.entry(variable).or_default().push(Lock {
            holder: tid,
            mode: LockMode::Read,
        });
        LockGrant::Granted
    }

    /// Request a WRITE lock. Denied by any lock held by anyone else;
    /// a READ lock already held by `tid` escalates in place.
    pub fn try_write(&mut self, tid: TransactionId, variable: VariableId) -> LockGrant {
        let holders = self.other_holders(variable, tid);
        if !holders.is_empty() {
            return LockGrant::Conflict { holders };
        }
        let locks = self.locks.entry(variable).or_default();
        match locks.iter_mut().find(|lock| lock.holder == tid) {
            Some(lock) => lock.mode = LockMode::Write,
            None => locks.push(Lock {
                holder: tid,
                mode: LockMode::Write,
            }),
        }
        LockGrant::Granted
    }

    /// Release every lock `tid` holds; returns the freed variables.
    pub fn release_all(&mut self, tid: TransactionId) -> Vec<VariableId> {
        let mut freed = Vec::new();
        self.locks.retain(|variable, locks| {
            let before = locks.len();
            locks.retain(|lock| lock.holder != tid);
            if locks.len() < before {
                freed.push(*variable);
            }
            !locks.is_empty()
        });
        freed.sort();
        freed
    }

    /// Drop every lock at once (site failure).
    pub fn clear(&mut self) {
        self.locks.clear();
    }

    /// True if no locks are held at all.
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
