//! Error types for command execution.
//!
//! The engine assumes its arguments are in range, so the executor
//! validates every command first and answers with one of these when
//! an argument falls outside the configured cluster.

use serde::{Deserialize, Serialize};

/// Command validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum Error {
    /// Site index outside `1..=max`.
    #[error("site {site} out of range (cluster has {max} sites)")]
    SiteOutOfRange {
        /// Offending index.
        site: u32,
        /// Highest valid index.
        max: u32,
    },

    /// Variable index outside `1..=max`.
    #[error("variable x{variable} out of range (cluster has {max} variables)")]
    VariableOutOfRange {
        /// Offending index.
        variable: u32,
        /// Highest valid index.
        max: u32,
    },

    /// Transaction ids start at 1.
    #[error("transaction id must be positive")]
    InvalidTransactionId,
}
