//! Committed version records
//!
//! Every committed write produces a `VersionRecord`. Records carry an
//! availability flag for the available-copies protocol: when a site
//! recovers from a failure, the current record of each replicated
//! variable is marked unavailable until a fresh commit replaces it.
//! Snapshot readers may still use an unavailable record if the record
//! only became unavailable after their snapshot was taken.

use avail_core::{Timestamp, Value};
use serde::{Deserialize, Serialize};

/// One committed version of a variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    value: Value,
    committed_at: Timestamp,
    available: bool,
    /// First logical time this record became unavailable. Once set it
    /// is never overwritten, so repeated failure cycles keep the
    /// earliest stamp.
    unavailable_since: Option<Timestamp>,
}

impl VersionRecord {
    /// A freshly committed, available record.
    pub fn new(value: Value, committed_at: Timestamp) -> Self {
        Self {
            value,
            committed_at,
            available: true,
            unavailable_since: None,
        }
    }

    /// The committed value.
    #[inline]
    pub fn value(&self) -> Value {
        self.value
    }

    /// Logical time of the commit that produced this record.
    #[inline]
    pub fn committed_at(&self) -> Timestamp {
        self.committed_at
    }

    /// False once the hosting site recovered past this record.
    #[inline]
    pub fn is_available(&self) -> bool {
        self.available
    }

    /// First time the record became unavailable, if it ever did.
    #[inline]
    pub fn unavailable_since(&self) -> Option<Timestamp> {
        self.unavailable_since
    }

    /// Mark the record unavailable as of `at`.
    ///
    /// Only the first call records a stamp; later calls keep the
    /// original one.
    pub fn mark_unavailable(&mut self, at: Timestamp) {
        self.available = false;
        if self.unavailable_since.is_none() {
            self.unavailable_since = Some(at);
        }
    }

    /// Whether a snapshot taken at `start` may trust this record.
    ///
    /// Available records always qualify. Unavailable records qualify
    /// only if they became unavailable at or after `start`: the value
    /// was still the cluster-wide current one when the snapshot was
    /// taken.
    pub fn usable_at(&self, start: Timestamp) -> bool {
        match self.unavailable_since {
            None => true,
            Some(since) => self.available || since >= start,
        }
    }
}
