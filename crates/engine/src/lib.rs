//! Cluster engine: sites and the coordinator
//!
//! This crate composes the lower layers into a running cluster:
//! - Site: lock table + version store + buffered writes at one node
//! - Coordinator: logical clock, replication protocols, wait-die
//!   arbitration, failure handling, and the FIFO retry queue
//! - Event: everything externally observable a command caused
//! - reports: dump and state snapshots for the query commands
//!
//! The coordinator is the only component that sees more than one site;
//! sites never read global state.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod coordinator;
pub mod event;
pub mod report;
pub mod retry;
pub mod site;

pub use coordinator::Coordinator;
pub use event::Event;
pub use report::{AbortedEntry, DumpReport, SiteDump, StateReport, VariableDump};
pub use retry::{PendingOp, RetryQueue};
pub use site::{ReadOutcome, Site, SiteStatus, WriteOutcome};

// Concurrency types that appear in events and reports.
pub use avail_concurrency::{AbortReason, TransactionClass};
