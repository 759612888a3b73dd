//! Multiversion storage for availdb sites
//!
//! This crate implements the per-site storage layer:
//! - VersionRecord: one committed version with availability metadata
//! - VersionStore: per-variable chains of records, snapshot reads,
//!   history retention and pruning
//!
//! Stores are plain owned values; the engine crate decides when commits
//! happen and what logical time they carry.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod store;
pub mod version;

pub use store::VersionStore;
pub use version::VersionRecord;
