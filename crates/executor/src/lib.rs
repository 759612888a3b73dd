//! # avail-executor
//!
//! The public command interface of the simulator. Adapters (the CLI,
//! JSON replay, tests) build [`Command`] values and hand them to an
//! [`Executor`], which validates arguments, drives the engine, and
//! answers with an [`Output`].
//!
//! ```ignore
//! use avail_core::{ClusterConfig, TransactionId, VariableId};
//! use avail_executor::{Command, Executor, Output};
//!
//! let mut executor = Executor::new(ClusterConfig::default());
//! let line = [
//!     Command::Begin { transaction: TransactionId::new(1) },
//! ];
//! for result in executor.execute_batch(&line) {
//!     let output = result?;
//!     // render events / reports
//! }
//! ```
//!
//! One [`execute_batch`](Executor::execute_batch) call is one input
//! line: every command on it shares a clock value and the clock moves
//! once afterwards.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod command;
mod error;
mod executor;
mod output;

// Test modules
#[cfg(test)]
mod tests;

pub use command::Command;
pub use error::Error;
pub use executor::Executor;
pub use output::Output;

// Engine types that appear inside outputs, re-exported so adapters
// only depend on this crate.
pub use avail_engine::{
    AbortReason, AbortedEntry, DumpReport, Event, PendingOp, SiteDump, SiteStatus, StateReport,
    TransactionClass, VariableDump,
};

// Identifier and configuration types that appear inside commands.
pub use avail_core::{ClusterConfig, SiteId, Timestamp, TransactionId, Value, VariableId};

/// Result type for executor operations
pub type Result<T> = std::result::Result<T, Error>;
