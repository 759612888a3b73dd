//! Observable engine events
//!
//! Every state-changing command leaves a trail of events: what
//! completed, what parked, who died. Parked operations may complete
//! during a later command's retry sweep, so their completion events
//! surface under that later command. The CLI renders events one per
//! line; tests assert on them directly.

use crate::retry::PendingOp;
use avail_concurrency::{AbortReason, TransactionClass};
use avail_core::{SiteId, Timestamp, TransactionId, Value, VariableId};
use serde::{Deserialize, Serialize};

/// One observable engine transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// A transaction was registered.
    TransactionStarted {
        /// The new transaction.
        transaction: TransactionId,
        /// Read-write or read-only.
        class: TransactionClass,
        /// Its start timestamp.
        at: Timestamp,
    },
    /// A read produced a value.
    ReadCompleted {
        /// Requesting transaction.
        transaction: TransactionId,
        /// Variable read.
        variable: VariableId,
        /// Value observed.
        value: Value,
        /// Replica that served it.
        site: SiteId,
    },
    /// A write locked and buffered at every Up replica.
    WriteAccepted {
        /// Requesting transaction.
        transaction: TransactionId,
        /// Variable written.
        variable: VariableId,
        /// Buffered value.
        value: Value,
        /// Replicas holding the buffered write.
        sites: Vec<SiteId>,
    },
    /// An operation parked in the retry queue.
    Parked {
        /// The operation as it will be retried.
        operation: PendingOp,
    },
    /// A transaction committed.
    TransactionCommitted {
        /// The finished transaction.
        transaction: TransactionId,
        /// Commit timestamp.
        at: Timestamp,
    },
    /// A transaction aborted; permanent.
    TransactionAborted {
        /// The dead transaction.
        transaction: TransactionId,
        /// What killed it.
        reason: AbortReason,
    },
    /// A site went Down.
    SiteFailed {
        /// The failed site.
        site: SiteId,
    },
    /// A site came back Up.
    SiteRecovered {
        /// The recovered site.
        site: SiteId,
    },
}
