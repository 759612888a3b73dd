//! Core types for the availdb cluster simulator
//!
//! This crate defines the foundational types used throughout the system:
//! - TransactionId / VariableId / SiteId: the three id spaces of the cluster
//! - Timestamp: the global logical clock tick
//! - Value: the integer payload stored under a variable
//! - ClusterConfig: explicit cluster sizing (no ambient globals)
//! - placement: the parity-based variable-to-site placement table
//! - Error: validation errors raised at the system's edges

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod placement;
pub mod types;

// Re-export commonly used types
pub use config::{ClusterConfig, DEFAULT_SITE_COUNT, DEFAULT_VARIABLE_COUNT};
pub use error::{Error, Result};
pub use types::{SiteId, Timestamp, TransactionId, Value, VariableId};
