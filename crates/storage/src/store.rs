//! Per-site multiversion store
//!
//! Each site keeps, per hosted variable, a chain of committed
//! `VersionRecord`s in commit order. Read-write transactions only ever
//! see the current (last) record; read-only transactions walk the
//! chain for the newest record at or before their start timestamp.
//! Chains grow only while some read-only transaction is running;
//! otherwise each commit replaces the chain outright and
//! `clear_old_versions` prunes leftovers when the last reader ends.

use crate::version::VersionRecord;
use avail_core::{Timestamp, Value, VariableId};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;

/// Multiversion storage for the variables hosted at one site.
#[derive(Debug, Clone, Default)]
pub struct VersionStore {
    chains: FxHashMap<VariableId, Vec<VersionRecord>>,
}

impl VersionStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed `variable` with its initial value, committed at time 0.
    pub fn seed(&mut self, variable: VariableId) {
        self.chains
            .insert(variable, vec![VersionRecord::new(variable.initial_value(), 0)]);
    }

    /// True if this store hosts `variable`.
    pub fn contains(&self, variable: VariableId) -> bool {
        self.chains.contains_key(&variable)
    }

    /// The current (most recently committed) record, if hosted.
    pub fn current(&self, variable: VariableId) -> Option<&VersionRecord> {
        self.chains.get(&variable).and_then(|chain| chain.last())
    }

    /// The current committed value, if hosted.
    ///
    /// Dumps report this regardless of availability; availability only
    /// gates transactional reads.
    pub fn committed_value(&self, variable: VariableId) -> Option<Value> {
        self.current(variable).map(VersionRecord::value)
    }

    /// Snapshot read as of `start`: the newest record committed at or
    /// before `start`, provided that record is still trustworthy for a
    /// snapshot of that age.
    ///
    /// Ties on the commit timestamp resolve to the latest appended
    /// record. Returns `None` when the variable is not hosted, no
    /// record is old enough, or the qualifying record cannot be
    /// trusted; the caller moves on to another replica.
    pub fn snapshot(&self, variable: VariableId, start: Timestamp) -> Option<Value> {
        let chain = self.chains.get(&variable)?;
        let record = chain.iter().rev().find(|r| r.committed_at() <= start)?;
        record.usable_at(start).then(|| record.value())
    }

    /// Install a committed write.
    ///
    /// With `retain_history` the new record is appended so older
    /// snapshots stay answerable; without it the chain is replaced by
    /// the single new record.
    pub fn install(
        &mut self,
        variable: VariableId,
        value: Value,
        now: Timestamp,
        retain_history: bool,
    ) {
        let record = VersionRecord::new(value, now);
        let chain = self.chains.entry(variable).or_default();
        if !retain_history {
            chain.clear();
        }
        chain.push(record);
    }

    /// Mark the current record of `variable` unavailable as of `at`.
    pub fn mark_unavailable(&mut self, variable: VariableId, at: Timestamp) {
        if let Some(record) = self
            .chains
            .get_mut(&variable)
            .and_then(|chain| chain.last_mut())
        {
            record.mark_unavailable(at);
        }
    }

    /// Prune every chain down to its current record.
    pub fn clear_old_versions(&mut self) {
        for chain in self.chains.values_mut() {
            if chain.len() > 1 {
                let current = chain.split_off(chain.len() - 1);
                *chain = current;
            }
        }
    }

    /// Current committed values for every hosted variable, in variable
    /// order.
    pub fn committed_snapshot(&self) -> BTreeMap<VariableId, Value> {
        self.chains
            .iter()
            .filter_map(|(variable, chain)| chain.last().map(|r| (*variable, r.value())))
            .collect()
    }

    /// Longest chain length, exposed for pruning assertions.
    pub fn max_chain_len(&self) -> usize {
        self.chains.values().map(Vec::len).max().unwrap_or(0)
    }
}
