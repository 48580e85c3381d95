//! Constants describing the Admin plugin and the permissions used by the
//! plugin repo framework

use alloy::primitives::{b256, keccak256, B256};

use crate::types::VersionTag;

/// The name of the plugin contract
pub const PLUGIN_CONTRACT_NAME: &str = "Admin";

/// The name of the plugin setup contract
pub const PLUGIN_SETUP_CONTRACT_NAME: &str = "AdminSetup";

/// The ENS subdomain under which the plugin repo is registered,
/// i.e. `admin.plugin.dao.eth` on mainnet
pub const PLUGIN_REPO_ENS_SUBDOMAIN: &str = "admin";

/// The version published by the publication step.
///
/// The release number may only be incremented for breaking changes,
/// the build number for compatible changes within a release.
pub const TARGET_VERSION: VersionTag = VersionTag { release: 1, build: 2 };

/// The name of the permission required to publish versions into a plugin repo
pub const MAINTAINER_PERMISSION_NAME: &str = "MAINTAINER_PERMISSION";

/// The name of the permission gating proposal execution on the Admin plugin
pub const EXECUTE_PROPOSAL_PERMISSION_NAME: &str = "EXECUTE_PROPOSAL_PERMISSION";

/// The permission id gating proposal execution on the Admin plugin,
/// `keccak256("EXECUTE_PROPOSAL_PERMISSION")`
pub const EXECUTE_PROPOSAL_PERMISSION_ID: B256 =
    b256!("f281525e53675515a6ba7cc7bea8a81e649b3608423ee2d73be1752cea887889");

/// Computes the permission id for a permission name
pub fn permission_id(name: &str) -> B256 {
    keccak256(name.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execute_proposal_permission_id() {
        assert_eq!(
            permission_id(EXECUTE_PROPOSAL_PERMISSION_NAME),
            EXECUTE_PROPOSAL_PERMISSION_ID,
        );
    }
}
