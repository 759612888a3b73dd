//! Variable placement across sites
//!
//! Placement is decided by index parity:
//! - odd `xj` lives at exactly one site, `1 + (j mod sites)`
//! - even `xj` is replicated at every site
//!
//! The placement table is static for the life of a cluster; failures
//! change a site's availability, never where a variable lives.

use crate::config::ClusterConfig;
use crate::types::{SiteId, VariableId};
use smallvec::SmallVec;

/// Hosting sites for one variable, in ascending site order.
///
/// The inline capacity covers the stock 10-site deployment without
/// heap allocation.
pub type HostList = SmallVec<[SiteId; 10]>;

/// True if the variable is replicated at every site (even index).
pub fn is_replicated(variable: VariableId) -> bool {
    variable.index() % 2 == 0
}

/// The single home site of an unreplicated (odd) variable.
pub fn home_site(config: &ClusterConfig, variable: VariableId) -> SiteId {
    SiteId::new(1 + variable.index() % config.sites)
}

/// All sites hosting `variable`, in the order reads probe them.
pub fn sites_for(config: &ClusterConfig, variable: VariableId) -> HostList {
    if is_replicated(variable) {
        (1..=config.sites).map(SiteId::new).collect()
    } else {
        let mut hosts = HostList::new();
        hosts.push(home_site(config, variable));
        hosts
    }
}

/// True if `site` hosts a copy of `variable`.
pub fn hosts(config: &ClusterConfig, site: SiteId, variable: VariableId) -> bool {
    is_replicated(variable) || home_site(config, variable) == site
}
