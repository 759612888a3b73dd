//! Command enum defining every simulator operation.
//!
//! Commands are the instruction set of the simulator. Every line of an
//! input script parses into one or more of these.
//!
//! Commands are:
//! - **Self-contained**: all parameters sit in the variant
//! - **Serializable**: scripts can be replayed from JSON as well as
//!   from the text grammar
//! - **Pure data**: no closures, no handles

use avail_core::{SiteId, TransactionId, Value, VariableId};
use serde::{Deserialize, Serialize};

/// A self-contained, serializable simulator operation.
///
/// Mutating commands answer with [`Output::Events`]; the three dump
/// commands and `QueryState` answer with their report types.
///
/// [`Output::Events`]: crate::Output::Events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub enum Command {
    // ==================== Transaction control ====================
    /// Start a read-write transaction.
    Begin {
        /// Transaction to register.
        transaction: TransactionId,
    },

    /// Start a read-only transaction with a snapshot at the current
    /// clock.
    BeginReadOnly {
        /// Transaction to register.
        transaction: TransactionId,
    },

    /// Attempt to commit a transaction at every Up site.
    End {
        /// Transaction to finish.
        transaction: TransactionId,
    },

    // ==================== Data access ====================
    /// Read one variable.
    Read {
        /// Issuing transaction.
        transaction: TransactionId,
        /// Variable to read.
        variable: VariableId,
    },

    /// Write one variable at every Up replica.
    Write {
        /// Issuing transaction.
        transaction: TransactionId,
        /// Variable to write.
        variable: VariableId,
        /// Value to buffer until commit.
        value: Value,
    },

    // ==================== Site control ====================
    /// Take a site Down, aborting every transaction with a lock there.
    Fail {
        /// Site to fail.
        site: SiteId,
    },

    /// Bring a Down site back Up.
    Recover {
        /// Site to recover.
        site: SiteId,
    },

    // ==================== Inspection ====================
    /// Committed values at every site.
    Dump,

    /// Committed values at one site.
    DumpSite {
        /// Site to report.
        site: SiteId,
    },

    /// Committed copies of one variable across its hosting sites.
    DumpVariable {
        /// Variable to report.
        variable: VariableId,
    },

    /// Clock, site statuses, transaction statuses, and the parked
    /// queue.
    QueryState,

    /// Throw the cluster away and rebuild it from the same
    /// configuration.
    Restart,
}

impl Command {
    /// True for commands that only report state.
    pub fn is_query(&self) -> bool {
        matches!(
            self,
            Command::Dump | Command::DumpSite { .. } | Command::DumpVariable { .. } | Command::QueryState
        )
    }
}
