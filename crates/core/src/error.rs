//! Error types shared across the cluster crates
//!
//! This module defines validation errors raised at the edges of the
//! system. Inside the engine, outcomes like a blocked read or a
//! wait-die abort are ordinary return values, not errors; only
//! malformed input (bad tokens, out-of-range indices, bad config)
//! reaches this type. We use `thiserror` for the `Display` and `Error`
//! trait implementations.

use thiserror::Error;

/// Result type alias for cluster operations
pub type Result<T> = std::result::Result<T, Error>;

/// Validation errors for cluster input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A transaction token did not have the `T<number>` form
    #[error("invalid transaction id: {token:?}")]
    InvalidTransactionId {
        /// The offending token
        token: String,
    },

    /// A variable token did not have the `x<number>` form
    #[error("invalid variable name: {token:?}")]
    InvalidVariableName {
        /// The offending token
        token: String,
    },

    /// A cluster configuration that cannot be built
    #[error("invalid cluster configuration: {reason}")]
    InvalidConfig {
        /// What was wrong with it
        reason: String,
    },
}
