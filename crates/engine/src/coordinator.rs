//! Cluster coordinator
//!
//! The coordinator owns everything global: the logical clock, the
//! transaction registry, the sites, the FIFO retry queue, and the event
//! buffer. It drives the replication protocols:
//!
//! - reads probe hosting sites in placement order and complete at the
//!   first usable replica; a foreign WRITE lock ends the probe and goes
//!   to the wait-die oracle instead
//! - writes are all-or-nothing: every Up replica is checked for
//!   conflicts before any lock is taken, so a denied attempt never
//!   leaves a stray lock behind
//! - commits, aborts, and recoveries sweep the retry queue; each sweep
//!   re-attempts every parked operation once in FIFO order
//!
//! Commands naming unknown or finished transactions are dropped
//! silently; the only way a parked operation leaves the queue is
//! completion or its transaction finishing.

use crate::event::Event;
use crate::report::{AbortedEntry, DumpReport, SiteDump, StateReport, VariableDump};
use crate::retry::{PendingOp, RetryQueue};
use crate::site::{ReadOutcome, Site, WriteOutcome};
use avail_concurrency::{
    waitdie, AbortReason, Transaction, TransactionClass, TransactionRegistry, TransactionStatus,
    Verdict,
};
use avail_core::{placement, ClusterConfig, SiteId, Timestamp, TransactionId, Value, VariableId};
use tracing::{debug, info, warn};

/// How one attempt at a read or write ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    Completed,
    Parked,
    Aborted,
}

/// Owner of all cluster state; one per simulation.
#[derive(Debug)]
pub struct Coordinator {
    config: ClusterConfig,
    clock: Timestamp,
    sites: Vec<Site>,
    registry: TransactionRegistry,
    retries: RetryQueue,
    events: Vec<Event>,
    retry_dirty: bool,
}

impl Coordinator {
    /// Build a fresh cluster: clock 0, all sites Up, seed values
    /// committed at time 0.
    pub fn new(config: ClusterConfig) -> Self {
        let sites = (1..=config.sites)
            .map(|index| Site::new(SiteId::new(index), &config))
            .collect();
        Self {
            config,
            clock: 0,
            sites,
            registry: TransactionRegistry::new(),
            retries: RetryQueue::new(),
            events: Vec::new(),
            retry_dirty: false,
        }
    }

    /// The configuration this cluster was built from.
    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    /// Current logical time.
    pub fn clock(&self) -> Timestamp {
        self.clock
    }

    /// Advance the clock by one. The driver calls this once per input
    /// line, after every command on the line has run.
    pub fn advance_clock(&mut self) {
        self.clock += 1;
    }

    /// Drain the events recorded since the last call.
    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// Throw the whole cluster away and rebuild it from the same
    /// configuration.
    pub fn restart(&mut self) {
        info!(target: "avail::exec", "Cluster restarted");
        *self = Self::new(self.config);
    }

    /// Read-only view of one site.
    pub fn site(&self, site_id: SiteId) -> Option<&Site> {
        let index = site_id.index().checked_sub(1)? as usize;
        self.sites.get(index)
    }

    fn site_mut(&mut self, site_id: SiteId) -> Option<&mut Site> {
        let index = site_id.index().checked_sub(1)? as usize;
        self.sites.get_mut(index)
    }

    // ==================== Transaction lifecycle ====================

    /// Register a read-write transaction at the current clock.
    pub fn begin(&mut self, tid: TransactionId) {
        self.register(tid, TransactionClass::ReadWrite);
    }

    /// Register a read-only transaction; its snapshot is the current
    /// clock.
    pub fn begin_readonly(&mut self, tid: TransactionId) {
        self.register(tid, TransactionClass::ReadOnly);
    }

    fn register(&mut self, tid: TransactionId, class: TransactionClass) {
        if self.registry.begin(tid, class, self.clock) {
            debug!(target: "avail::txn", txn = %tid, ?class, at = self.clock, "Transaction started");
            self.events.push(Event::TransactionStarted {
                transaction: tid,
                class,
                at: self.clock,
            });
        } else {
            warn!(target: "avail::txn", txn = %tid, "Duplicate begin ignored");
        }
    }

    /// Commit a Running transaction at every Up site. Unknown ids and
    /// finished transactions are ignored; an aborted transaction stays
    /// aborted.
    pub fn end(&mut self, tid: TransactionId) {
        let Some(txn) = self.registry.get(tid).copied() else {
            warn!(target: "avail::txn", txn = %tid, "end for unknown transaction ignored");
            return;
        };
        match txn.status {
            TransactionStatus::Aborted { .. } => {
                debug!(target: "avail::txn", txn = %tid, "end after abort ignored");
                return;
            }
            TransactionStatus::Committed => {
                debug!(target: "avail::txn", txn = %tid, "duplicate end ignored");
                return;
            }
            TransactionStatus::Running => {}
        }

        self.registry.mark_committed(tid);
        // False only when no read-only transaction remains running.
        let retain = self.registry.has_running_readonly();
        for site in &mut self.sites {
            if site.is_up() {
                site.commit(tid, self.clock, retain);
            }
        }
        info!(target: "avail::txn", txn = %tid, at = self.clock, "Transaction committed");
        self.events.push(Event::TransactionCommitted {
            transaction: tid,
            at: self.clock,
        });

        if txn.class == TransactionClass::ReadOnly && !retain {
            for site in &mut self.sites {
                site.clear_old_versions();
            }
            debug!(target: "avail::site", "Version history cleared after last snapshot reader");
        }

        self.retry_dirty = true;
        self.pump_retries();
    }

    fn abort_transaction(&mut self, tid: TransactionId, reason: AbortReason) {
        if !self.registry.mark_aborted(tid, reason) {
            return;
        }
        for site in &mut self.sites {
            site.abort(tid);
        }
        info!(target: "avail::txn", txn = %tid, %reason, "Transaction aborted");
        self.events.push(Event::TransactionAborted {
            transaction: tid,
            reason,
        });
        self.retry_dirty = true;
    }

    // ==================== Reads and writes ====================

    /// Read `variable` on behalf of `tid`. Completes at the first
    /// usable replica, parks, or aborts the requester per wait-die.
    pub fn read(&mut self, tid: TransactionId, variable: VariableId) {
        let Some(txn) = self.running(tid) else { return };
        if self.attempt_read(txn, variable) == Attempt::Parked {
            self.park(PendingOp::Read {
                transaction: tid,
                variable,
            });
        }
        self.pump_retries();
    }

    /// Write `value` to every Up replica of `variable` on behalf of
    /// `tid`, all replicas or none.
    pub fn write(&mut self, tid: TransactionId, variable: VariableId, value: Value) {
        let Some(txn) = self.running(tid) else { return };
        if self.attempt_write(txn, variable, value) == Attempt::Parked {
            self.park(PendingOp::Write {
                transaction: tid,
                variable,
                value,
            });
        }
        self.pump_retries();
    }

    fn attempt_read(&mut self, txn: Transaction, variable: VariableId) -> Attempt {
        match txn.class {
            TransactionClass::ReadOnly => self.attempt_snapshot_read(txn, variable),
            TransactionClass::ReadWrite => self.attempt_locking_read(txn, variable),
        }
    }

    fn attempt_snapshot_read(&mut self, txn: Transaction, variable: VariableId) -> Attempt {
        for site_id in placement::sites_for(&self.config, variable) {
            let Some(site) = self.site(site_id) else { continue };
            if !site.is_up() {
                continue;
            }
            if let Some(value) = site.snapshot_read(txn.start, variable) {
                debug!(target: "avail::txn", txn = %txn.id, var = %variable, site = %site_id, value, "Snapshot read");
                self.events.push(Event::ReadCompleted {
                    transaction: txn.id,
                    variable,
                    value,
                    site: site_id,
                });
                return Attempt::Completed;
            }
        }
        Attempt::Parked
    }

    fn attempt_locking_read(&mut self, txn: Transaction, variable: VariableId) -> Attempt {
        for site_id in placement::sites_for(&self.config, variable) {
            let outcome = match self.site_mut(site_id) {
                Some(site) if site.is_up() => site.read(txn.id, variable),
                _ => continue,
            };
            match outcome {
                ReadOutcome::Value(value) => {
                    debug!(target: "avail::txn", txn = %txn.id, var = %variable, site = %site_id, value, "Read completed");
                    self.events.push(Event::ReadCompleted {
                        transaction: txn.id,
                        variable,
                        value,
                        site: site_id,
                    });
                    return Attempt::Completed;
                }
                // A conflicting writer is authoritative; later
                // replicas carry the same uncommitted lock state.
                ReadOutcome::Blocked { holder } => {
                    return self.settle_conflict(txn, [holder]);
                }
                ReadOutcome::Unavailable => continue,
            }
        }
        Attempt::Parked
    }

    fn attempt_write(&mut self, txn: Transaction, variable: VariableId, value: Value) -> Attempt {
        let mut up_sites = Vec::new();
        let mut conflicts = Vec::new();
        for site_id in placement::sites_for(&self.config, variable) {
            if let Some(site) = self.site(site_id) {
                if site.is_up() {
                    up_sites.push(site_id);
                    conflicts.extend(site.write_conflicts(txn.id, variable));
                }
            }
        }

        if up_sites.is_empty() {
            return Attempt::Parked;
        }
        if !conflicts.is_empty() {
            // No lock was taken yet, so denial leaves nothing behind.
            return self.settle_conflict(txn, conflicts);
        }

        let mut applied = Vec::with_capacity(up_sites.len());
        for site_id in up_sites {
            if let Some(site) = self.site_mut(site_id) {
                if matches!(site.write(txn.id, variable, value), WriteOutcome::Accepted) {
                    applied.push(site_id);
                }
            }
        }
        debug!(target: "avail::txn", txn = %txn.id, var = %variable, value, sites = applied.len(), "Write buffered");
        self.events.push(Event::WriteAccepted {
            transaction: txn.id,
            variable,
            value,
            sites: applied,
        });
        Attempt::Completed
    }

    /// Decide a denied request against the oldest conflicting holder.
    fn settle_conflict(
        &mut self,
        txn: Transaction,
        holders: impl IntoIterator<Item = TransactionId>,
    ) -> Attempt {
        let Some((oldest, oldest_start)) = waitdie::oldest_holder(&self.registry, holders) else {
            return Attempt::Parked;
        };
        match waitdie::resolve(txn.start, oldest_start) {
            Verdict::Wait => Attempt::Parked,
            Verdict::Die => {
                debug!(target: "avail::txn", txn = %txn.id, holder = %oldest, "Wait-die verdict: die");
                self.abort_transaction(txn.id, AbortReason::WaitDie { conflicting: oldest });
                Attempt::Aborted
            }
        }
    }

    fn running(&self, tid: TransactionId) -> Option<Transaction> {
        match self.registry.get(tid).copied() {
            Some(txn) if txn.is_running() => Some(txn),
            Some(_) => {
                debug!(target: "avail::txn", txn = %tid, "Operation for finished transaction ignored");
                None
            }
            None => {
                warn!(target: "avail::txn", txn = %tid, "Operation for unknown transaction ignored");
                None
            }
        }
    }

    // ==================== Site failure and recovery ====================

    /// Fail a site: every transaction holding a lock there aborts
    /// everywhere, then the site goes Down. Failing a Down site again
    /// changes nothing.
    pub fn fail(&mut self, site_id: SiteId) {
        let victims = match self.site(site_id) {
            Some(site) if site.is_up() => site.accessed_transactions(),
            Some(_) => {
                debug!(target: "avail::site", site = %site_id, "fail for Down site ignored");
                return;
            }
            None => {
                warn!(target: "avail::site", site = %site_id, "fail for unknown site ignored");
                return;
            }
        };

        info!(target: "avail::site", site = %site_id, victims = victims.len(), "Site failed");
        self.events.push(Event::SiteFailed { site: site_id });
        for tid in victims {
            self.abort_transaction(tid, AbortReason::SiteFailure { site: site_id });
        }
        let now = self.clock;
        if let Some(site) = self.site_mut(site_id) {
            site.fail(now);
        }
        self.pump_retries();
    }

    /// Recover a Down site and sweep the retry queue. Recovering an Up
    /// site changes nothing.
    pub fn recover(&mut self, site_id: SiteId) {
        match self.site_mut(site_id) {
            Some(site) if !site.is_up() => site.recover(),
            Some(_) => {
                debug!(target: "avail::site", site = %site_id, "recover for Up site ignored");
                return;
            }
            None => {
                warn!(target: "avail::site", site = %site_id, "recover for unknown site ignored");
                return;
            }
        }
        info!(target: "avail::site", site = %site_id, "Site recovered");
        self.events.push(Event::SiteRecovered { site: site_id });
        self.retry_dirty = true;
        self.pump_retries();
    }

    // ==================== Retry sweeps ====================

    fn park(&mut self, op: PendingOp) {
        debug!(target: "avail::retry", op = %op, "Operation parked");
        self.events.push(Event::Parked { operation: op });
        self.retries.park(op);
    }

    /// Run sweeps until no commit, abort, or recovery happened during
    /// the last one.
    fn pump_retries(&mut self) {
        while self.retry_dirty {
            self.retry_dirty = false;
            self.sweep();
        }
    }

    fn sweep(&mut self) {
        let round = self.retries.take_round();
        if round.is_empty() {
            return;
        }
        debug!(target: "avail::retry", parked = round.len(), "Retry sweep");
        for op in round {
            let Some(txn) = self.registry.get(op.transaction()).copied() else {
                debug!(target: "avail::retry", op = %op, "Dropped parked op of unknown transaction");
                continue;
            };
            if !txn.is_running() {
                debug!(target: "avail::retry", op = %op, "Dropped parked op of finished transaction");
                continue;
            }
            let attempt = match op {
                PendingOp::Read { variable, .. } => self.attempt_read(txn, variable),
                PendingOp::Write {
                    variable, value, ..
                } => self.attempt_write(txn, variable, value),
            };
            if attempt == Attempt::Parked {
                self.retries.park(op);
            }
        }
    }

    // ==================== Inspection ====================

    /// Committed values at every site.
    pub fn dump(&self) -> DumpReport {
        DumpReport {
            sites: self.sites.iter().map(Self::dump_of).collect(),
        }
    }

    /// Committed values at one site.
    pub fn dump_site(&self, site_id: SiteId) -> Option<SiteDump> {
        self.site(site_id).map(Self::dump_of)
    }

    /// Committed copies of one variable across its hosting sites.
    pub fn dump_variable(&self, variable: VariableId) -> Option<VariableDump> {
        if !self.config.has_variable(variable) {
            return None;
        }
        let values = placement::sites_for(&self.config, variable)
            .into_iter()
            .filter_map(|site_id| {
                self.site(site_id)
                    .and_then(|site| site.committed_value(variable))
                    .map(|value| (site_id, value))
            })
            .collect();
        Some(VariableDump { variable, values })
    }

    /// Clock, site statuses, transaction statuses, and the parked
    /// queue.
    pub fn query_state(&self) -> StateReport {
        let aborted = self
            .registry
            .aborted_ids()
            .into_iter()
            .filter_map(|id| match self.registry.get(id)?.status {
                TransactionStatus::Aborted { reason } => Some(AbortedEntry {
                    transaction: id,
                    reason,
                }),
                _ => None,
            })
            .collect();
        StateReport {
            clock: self.clock,
            sites: self.sites.iter().map(|s| (s.id(), s.status())).collect(),
            running: self.registry.running_ids(),
            committed: self.registry.committed_ids(),
            aborted,
            parked: self.retries.snapshot(),
        }
    }

    /// True while any read-only transaction is running.
    pub fn has_running_readonly(&self) -> bool {
        self.registry.has_running_readonly()
    }

    fn dump_of(site: &Site) -> SiteDump {
        SiteDump {
            site: site.id(),
            status: site.status(),
            values: site.committed_values().into_iter().collect(),
        }
    }
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new(ClusterConfig::default())
    }
}
