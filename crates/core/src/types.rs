//! Core identifier types for the cluster
//!
//! This module defines the foundational types:
//! - TransactionId: Externally supplied transaction identifier (`T1`, `T2`, ...)
//! - VariableId: One of the cluster's data items (`x1`..`x20` by default)
//! - SiteId: One of the cluster's sites (1-based)
//! - Timestamp: Global logical clock tick
//! - Value: The integer payload stored under a variable

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Global logical clock tick.
///
/// The clock starts at 0 and advances by exactly one after each input
/// line; commands batched on one line share a tick. Transaction start
/// timestamps, version commit timestamps, and site failure timestamps
/// are all drawn from this clock.
pub type Timestamp = u64;

/// Value stored under a variable. Variable `xj` starts at `10 * j`.
pub type Value = i64;

/// Externally supplied transaction identifier.
///
/// Transactions are named by the driving workload (`begin(T1)`), so the
/// id is a plain positive integer rather than anything generated. The
/// textual form is `T` followed by the number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransactionId(u32);

impl TransactionId {
    /// Create a transaction id from its numeric part (`1` for `T1`).
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// The numeric part of the id.
    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

impl FromStr for TransactionId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix('T')
            .or_else(|| s.strip_prefix('t'))
            .ok_or_else(|| Error::InvalidTransactionId { token: s.to_string() })?;
        match digits.parse::<u32>() {
            Ok(n) if n > 0 => Ok(Self(n)),
            _ => Err(Error::InvalidTransactionId { token: s.to_string() }),
        }
    }
}

/// One of the cluster's data items.
///
/// Variables are 1-indexed. The textual form is `x` followed by the
/// index. Placement across sites is decided by index parity (see
/// `placement`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VariableId(u32);

impl VariableId {
    /// Create a variable id from its 1-based index (`2` for `x2`).
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    /// The 1-based index of the variable.
    pub fn index(&self) -> u32 {
        self.0
    }

    /// The value every variable starts with: `10 * index`, committed at
    /// time 0.
    pub fn initial_value(&self) -> Value {
        10 * Value::from(self.0)
    }
}

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

impl FromStr for VariableId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix('x')
            .or_else(|| s.strip_prefix('X'))
            .ok_or_else(|| Error::InvalidVariableName { token: s.to_string() })?;
        match digits.parse::<u32>() {
            Ok(n) if n > 0 => Ok(Self(n)),
            _ => Err(Error::InvalidVariableName { token: s.to_string() }),
        }
    }
}

/// One of the cluster's sites, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SiteId(u32);

impl SiteId {
    /// Create a site id from its 1-based index.
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    /// The 1-based index of the site.
    pub fn index(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
