//! One site of the cluster
//!
//! A site owns its lock table, its multiversion store, the writes
//! buffered by uncommitted transactions, and the set of transactions
//! that have locked anything here since the last failure. Sites are
//! passive: the coordinator decides which sites to talk to and passes
//! in the logical time and the history-retention flag, so a site never
//! reads global state.
//!
//! Failure wipes everything volatile (locks, buffered writes, the
//! accessed set) and stamps the failure time. Recovery brings the site
//! back Up with every replicated variable unreadable until a committed
//! write refreshes it; unreplicated variables are readable immediately
//! because no other copy can have moved on.

use avail_concurrency::{LockGrant, LockMode, LockTable};
use avail_core::{placement, ClusterConfig, SiteId, Timestamp, TransactionId, Value, VariableId};
use avail_storage::VersionStore;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Up or Down. Down sites answer nothing until `recover`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SiteStatus {
    /// Serving reads and writes.
    Up,
    /// Failed; volatile state is gone.
    Down,
}

impl std::fmt::Display for SiteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SiteStatus::Up => write!(f, "up"),
            SiteStatus::Down => write!(f, "down"),
        }
    }
}

/// A write buffered under a WRITE lock, not yet committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingWrite {
    holder: TransactionId,
    value: Value,
}

/// Outcome of a read-write transaction's read at one site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The read completed with this value.
    Value(Value),
    /// Another transaction's WRITE lock stands in the way; the
    /// coordinator must consult the wait-die oracle, not other
    /// replicas.
    Blocked {
        /// The conflicting WRITE lock holder.
        holder: TransactionId,
    },
    /// This copy cannot serve the read (recovered and not yet
    /// refreshed); other replicas may.
    Unavailable,
}

/// Outcome of buffering a write at one site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// WRITE lock held and value buffered.
    Accepted,
    /// Denied by other holders.
    Blocked {
        /// Transactions whose locks exclude the write.
        holders: Vec<TransactionId>,
    },
}

/// One site: lock table, version store, buffered writes, failure state.
#[derive(Debug, Clone)]
pub struct Site {
    id: SiteId,
    status: SiteStatus,
    last_failed_at: Option<Timestamp>,
    hosted: Vec<VariableId>,
    locks: LockTable,
    store: VersionStore,
    pending: FxHashMap<VariableId, PendingWrite>,
    accessed: FxHashSet<TransactionId>,
}

impl Site {
    /// Build site `id` with its hosted variables seeded to their
    /// initial values.
    pub fn new(id: SiteId, config: &ClusterConfig) -> Self {
        let mut store = VersionStore::new();
        let mut hosted = Vec::new();
        for index in 1..=config.variables {
            let variable = VariableId::new(index);
            if placement::hosts(config, id, variable) {
                store.seed(variable);
                hosted.push(variable);
            }
        }
        Self {
            id,
            status: SiteStatus::Up,
            last_failed_at: None,
            hosted,
            locks: LockTable::new(),
            store,
            pending: FxHashMap::default(),
            accessed: FxHashSet::default(),
        }
    }

    /// This site's id.
    pub fn id(&self) -> SiteId {
        self.id
    }

    /// Current status.
    pub fn status(&self) -> SiteStatus {
        self.status
    }

    /// True while the site serves requests.
    pub fn is_up(&self) -> bool {
        self.status == SiteStatus::Up
    }

    /// When the site last failed, if ever.
    pub fn last_failed_at(&self) -> Option<Timestamp> {
        self.last_failed_at
    }

    /// True if a copy of `variable` lives here.
    pub fn hosts(&self, variable: VariableId) -> bool {
        self.store.contains(variable)
    }

    /// Read for a read-write transaction.
    ///
    /// A requester holding the WRITE lock reads its own buffered value;
    /// one holding a READ lock reads the committed value. Otherwise the
    /// read is blocked by a foreign WRITE lock, refused on an
    /// unavailable copy, or acquires a READ lock and completes.
    pub fn read(&mut self, tid: TransactionId, variable: VariableId) -> ReadOutcome {
        match self.locks.held_mode(tid, variable) {
            Some(LockMode::Write) => {
                if let Some(pending) = self.pending.get(&variable) {
                    if pending.holder == tid {
                        return ReadOutcome::Value(pending.value);
                    }
                }
                self.committed_read(variable)
            }
            Some(LockMode::Read) => self.committed_read(variable),
            None => {
                if let Some(holder) = self.locks.write_holder(variable) {
                    return ReadOutcome::Blocked { holder };
                }
                match self.store.current(variable) {
                    Some(record) if record.is_available() => {
                        self.locks.try_read(tid, variable);
                        self.accessed.insert(tid);
                        ReadOutcome::Value(record.value())
                    }
                    _ => ReadOutcome::Unavailable,
                }
            }
        }
    }

    fn committed_read(&self, variable: VariableId) -> ReadOutcome {
        match self.store.committed_value(variable) {
            Some(value) => ReadOutcome::Value(value),
            None => ReadOutcome::Unavailable,
        }
    }

    /// Snapshot read for a read-only transaction as of `start`.
    /// Lock-free; `None` sends the caller to another replica.
    pub fn snapshot_read(&self, start: Timestamp, variable: VariableId) -> Option<Value> {
        self.store.snapshot(variable, start)
    }

    /// Lock holders on `variable` other than `tid`. The write protocol
    /// probes every Up replica with this before acquiring anything.
    pub fn write_conflicts(&self, tid: TransactionId, variable: VariableId) -> Vec<TransactionId> {
        self.locks.other_holders(variable, tid)
    }

    /// Acquire (or escalate to) the WRITE lock on `variable` if no one
    /// else holds a lock. On denial nothing changes.
    pub fn is_writable(&mut self, tid: TransactionId, variable: VariableId) -> bool {
        match self.locks.try_write(tid, variable) {
            LockGrant::Granted => {
                self.accessed.insert(tid);
                true
            }
            LockGrant::Conflict { .. } => false,
        }
    }

    /// Acquire the WRITE lock and buffer `value` for commit time.
    ///
    /// Availability is deliberately not consulted: committing a write
    /// to a recovered copy is what makes it readable again.
    pub fn write(&mut self, tid: TransactionId, variable: VariableId, value: Value) -> WriteOutcome {
        if !self.is_writable(tid, variable) {
            return WriteOutcome::Blocked {
                holders: self.write_conflicts(tid, variable),
            };
        }
        self.pending.insert(variable, PendingWrite { holder: tid, value });
        WriteOutcome::Accepted
    }

    /// Commit `tid` here: install its buffered writes as versions
    /// stamped `now`, release its locks, forget it ever accessed us.
    /// Returns the variables that got new versions.
    pub fn commit(
        &mut self,
        tid: TransactionId,
        now: Timestamp,
        retain_history: bool,
    ) -> Vec<VariableId> {
        let mut installed: Vec<VariableId> = self
            .pending
            .iter()
            .filter(|(_, pending)| pending.holder == tid)
            .map(|(variable, _)| *variable)
            .collect();
        installed.sort();

        for variable in &installed {
            if let Some(pending) = self.pending.remove(variable) {
                self.store
                    .install(*variable, pending.value, now, retain_history);
            }
        }
        self.locks.release_all(tid);
        self.accessed.remove(&tid);
        if !installed.is_empty() {
            debug!(target: "avail::site", site = %self.id, txn = %tid, vars = installed.len(), "Writes installed");
        }
        installed
    }

    /// Abort `tid` here: drop its buffered writes and locks.
    pub fn abort(&mut self, tid: TransactionId) {
        self.pending.retain(|_, pending| pending.holder != tid);
        self.locks.release_all(tid);
        self.accessed.remove(&tid);
    }

    /// Fail the site at logical time `now`: everything volatile is
    /// wiped.
    pub fn fail(&mut self, now: Timestamp) {
        self.status = SiteStatus::Down;
        self.last_failed_at = Some(now);
        self.locks.clear();
        self.pending.clear();
        self.accessed.clear();
    }

    /// Recover the site. Replicated variables become unreadable as of
    /// the failure time until a commit refreshes them.
    pub fn recover(&mut self) {
        self.status = SiteStatus::Up;
        if let Some(failed_at) = self.last_failed_at {
            for variable in &self.hosted {
                if placement::is_replicated(*variable) {
                    self.store.mark_unavailable(*variable, failed_at);
                }
            }
        }
    }

    /// Transactions that locked something here since the last failure,
    /// ascending.
    pub fn accessed_transactions(&self) -> Vec<TransactionId> {
        let mut ids: Vec<_> = self.accessed.iter().copied().collect();
        ids.sort();
        ids
    }

    /// Current committed value of one variable, if hosted.
    pub fn committed_value(&self, variable: VariableId) -> Option<Value> {
        self.store.committed_value(variable)
    }

    /// Current committed values of every hosted variable, in variable
    /// order.
    pub fn committed_values(&self) -> BTreeMap<VariableId, Value> {
        self.store.committed_snapshot()
    }

    /// Prune every version chain to its current record.
    pub fn clear_old_versions(&mut self) {
        self.store.clear_old_versions();
    }

    /// Longest version chain among hosted variables. Diagnostic.
    pub fn max_version_chain(&self) -> usize {
        self.store.max_chain_len()
    }

    /// The lock `tid` holds on `variable` here, if any. Inspection
    /// hook for tests and state reports.
    pub fn lock_mode(&self, tid: TransactionId, variable: VariableId) -> Option<LockMode> {
        self.locks.held_mode(tid, variable)
    }
}
