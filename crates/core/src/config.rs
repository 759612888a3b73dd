//! Cluster configuration
//!
//! The whole simulated cluster is built from an explicit `ClusterConfig`
//! handed to the coordinator at construction time. Nothing reads
//! configuration from ambient global state, which is what makes
//! `restart` a clean rebuild.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Default number of sites in the cluster.
pub const DEFAULT_SITE_COUNT: u32 = 10;

/// Default number of variables (`x1`..`x20`).
pub const DEFAULT_VARIABLE_COUNT: u32 = 20;

/// Size of the simulated cluster.
///
/// The stock deployment is 10 sites and 20 variables; tests sometimes
/// build smaller clusters to keep assertions readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Number of sites, 1-based ids `1..=sites`.
    pub sites: u32,
    /// Number of variables, 1-based ids `x1..=x{variables}`.
    pub variables: u32,
}

impl ClusterConfig {
    /// Build a config, rejecting empty clusters.
    pub fn new(sites: u32, variables: u32) -> Result<Self> {
        if sites == 0 {
            return Err(Error::InvalidConfig {
                reason: "cluster needs at least one site".to_string(),
            });
        }
        if variables == 0 {
            return Err(Error::InvalidConfig {
                reason: "cluster needs at least one variable".to_string(),
            });
        }
        Ok(Self { sites, variables })
    }

    /// True if `site` names a site of this cluster.
    pub fn has_site(&self, site: crate::types::SiteId) -> bool {
        (1..=self.sites).contains(&site.index())
    }

    /// True if `variable` names a variable of this cluster.
    pub fn has_variable(&self, variable: crate::types::VariableId) -> bool {
        (1..=self.variables).contains(&variable.index())
    }
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            sites: DEFAULT_SITE_COUNT,
            variables: DEFAULT_VARIABLE_COUNT,
        }
    }
}
