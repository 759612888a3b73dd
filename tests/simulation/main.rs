//! Simulation Test Suite
//!
//! End-to-end scenarios driven through the public executor API, one
//! `execute_batch` call per input line.
//!
//! ## Suite Structure
//!
//! - **replication**: placement, commit propagation, stale copies
//! - **locking**: lock waits, escalation, FIFO retry wakeups
//! - **wait_die**: who waits, who dies, what death releases
//! - **snapshots**: read-only isolation and failure interplay
//! - **failures**: fail/recover availability rules, restart
//! - **scripts**: combined scenarios and transcript determinism
//!
//! ## Running Tests
//!
//! ```bash
//! # Run the whole suite
//! cargo test --test simulation
//!
//! # Run one area
//! cargo test --test simulation wait_die
//! ```

mod test_utils;

mod failures;
mod replication;
mod scripts;
mod snapshots;
mod wait_die;
