//! availdb — deterministic simulator of a replicated transactional store.
//!
//! Twenty variables replicated across ten sites with available-copies
//! replication. Read-write transactions take strict two-phase locks at
//! each site they touch; read-only transactions read a multiversion
//! snapshot and never block. Deadlocks are avoided with wait-die, and
//! sites can fail and recover mid-run.
//!
//! # Quick Start
//!
//! ```ignore
//! use availdb::{ClusterConfig, Command, Executor, TransactionId};
//!
//! let mut executor = Executor::new(ClusterConfig::default());
//!
//! // One input line: begin(T1)
//! let results = executor.execute_batch(&[Command::Begin {
//!     transaction: TransactionId::new(1),
//! }]);
//! ```
//!
//! # Architecture
//!
//! All operations go through the [`Executor`], which validates
//! commands against the cluster bounds and drives the coordinator.
//! Internal layers (storage, concurrency, engine) stay private; the
//! executor API is the whole public surface.

// Re-export the public API from avail-executor
pub use avail_executor::*;
