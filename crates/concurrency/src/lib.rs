//! Concurrency layer for availdb
//!
//! This crate implements the locking and lifecycle machinery:
//! - LockTable: per-site strict two-phase locking with READ to WRITE
//!   escalation
//! - TransactionRegistry: every transaction ever begun, with one-way
//!   status transitions
//! - waitdie: the wait-die deadlock avoidance oracle
//!
//! Read-only transactions never appear in lock tables; they exist only
//! in the registry, where their running state controls how long commits
//! retain version history.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod lock;
pub mod transaction;
pub mod waitdie;

pub use lock::{Lock, LockGrant, LockMode, LockTable};
pub use transaction::{
    AbortReason, Transaction, TransactionClass, TransactionRegistry, TransactionStatus,
};
pub use waitdie::{oldest_holder, resolve, Verdict};
