//! FIFO queue of parked operations
//!
//! Reads and writes that cannot run now (every replica down or
//! unreadable, or the wait-die oracle said Wait) park here. The
//! coordinator sweeps the queue on every commit, abort, and recovery:
//! each parked operation is re-attempted once per sweep in FIFO order,
//! and whatever parks again goes to the back. Operations whose
//! transaction has meanwhile finished are dropped when popped, never
//! purged eagerly.

use avail_core::{TransactionId, Value, VariableId};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// One parked operation, exactly as it will be re-attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PendingOp {
    /// A read that found no usable replica.
    Read {
        /// Requesting transaction.
        transaction: TransactionId,
        /// Variable to read.
        variable: VariableId,
    },
    /// A write that could not lock every Up replica.
    Write {
        /// Requesting transaction.
        transaction: TransactionId,
        /// Variable to write.
        variable: VariableId,
        /// Value to buffer once the locks are granted.
        value: Value,
    },
}

impl PendingOp {
    /// The transaction that issued the operation.
    pub fn transaction(&self) -> TransactionId {
        match self {
            PendingOp::Read { transaction, .. } => *transaction,
            PendingOp::Write { transaction, .. } => *transaction,
        }
    }

    /// The variable the operation touches.
    pub fn variable(&self) -> VariableId {
        match self {
            PendingOp::Read { variable, .. } => *variable,
            PendingOp::Write { variable, .. } => *variable,
        }
    }
}

impl fmt::Display for PendingOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PendingOp::Read { transaction, variable } => {
                write!(f, "R({},{})", transaction, variable)
            }
            PendingOp::Write { transaction, variable, value } => {
                write!(f, "W({},{},{})", transaction, variable, value)
            }
        }
    }
}

/// FIFO retry queue.
#[derive(Debug, Clone, Default)]
pub struct RetryQueue {
    queue: VecDeque<PendingOp>,
}

impl RetryQueue {
    /// An empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Park an operation at the back.
    pub fn park(&mut self, op: PendingOp) {
        self.queue.push_back(op);
    }

    /// Take everything queued right now, in FIFO order, leaving the
    /// queue empty. One sweep processes exactly this round; re-parked
    /// operations land behind it for the next sweep.
    pub fn take_round(&mut self) -> Vec<PendingOp> {
        self.queue.drain(..).collect()
    }

    /// Parked operations, front to back, for state reports.
    pub fn snapshot(&self) -> Vec<PendingOp> {
        self.queue.iter().copied().collect()
    }

    /// Number of parked operations.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// True when nothing is parked.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
