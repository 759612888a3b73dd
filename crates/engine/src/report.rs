//! Read-only views over cluster state
//!
//! Dumps report committed values only; buffered writes and locks never
//! show up here. Down sites keep reporting their last committed values,
//! which is what makes divergence after a failure visible.

use crate::retry::PendingOp;
use crate::site::SiteStatus;
use avail_concurrency::AbortReason;
use avail_core::{SiteId, Timestamp, TransactionId, Value, VariableId};
use serde::{Deserialize, Serialize};

/// Committed state of one site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteDump {
    /// Which site.
    pub site: SiteId,
    /// Up or Down.
    pub status: SiteStatus,
    /// Committed value per hosted variable, ascending by variable.
    pub values: Vec<(VariableId, Value)>,
}

/// Committed state of the whole cluster, site by site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpReport {
    /// Every site in id order.
    pub sites: Vec<SiteDump>,
}

/// Committed copies of one variable across the cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableDump {
    /// Which variable.
    pub variable: VariableId,
    /// Committed value at each hosting site, ascending by site.
    pub values: Vec<(SiteId, Value)>,
}

/// One aborted transaction and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbortedEntry {
    /// The dead transaction.
    pub transaction: TransactionId,
    /// What killed it.
    pub reason: AbortReason,
}

/// Full controller state for `querystate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateReport {
    /// Current logical clock.
    pub clock: Timestamp,
    /// Status of each site in id order.
    pub sites: Vec<(SiteId, SiteStatus)>,
    /// Running transaction ids, ascending.
    pub running: Vec<TransactionId>,
    /// Committed transaction ids, ascending.
    pub committed: Vec<TransactionId>,
    /// Aborted transactions with reasons, ascending by id.
    pub aborted: Vec<AbortedEntry>,
    /// Parked operations, front of the queue first.
    pub parked: Vec<PendingOp>,
}
