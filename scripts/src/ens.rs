//! ENS resolution of the plugin repo.
//!
//! Plugin repos register an ENS subdomain when the framework on the target
//! chain runs a subdomain registrar. Resolving that name is the last resort
//! of the repo lookup, after the address override and the deployment
//! record.

use alloy::{
    primitives::{keccak256, Address, B256},
    providers::DynProvider,
};
use plugin_common::constants::PLUGIN_REPO_ENS_SUBDOMAIN;
use tracing::info;

use crate::{
    constants::{PLUGIN_ENS_PARENT_DOMAIN, PLUGIN_REPO_RECORD_NAME},
    errors::ScriptError,
    solidity::{
        AddrResolver, ENSRegistry, ENSSubdomainRegistrar, PluginRepoFactory, PluginRepoRegistry,
    },
    utils::require_valid_address,
    wrapper::Deployer,
};

/// The error raised for a malformed or zero plugin repo address override
const INVALID_REPO_OVERRIDE: &str =
    "Plugin Repo in .env is not a valid address (is not an address or is address zero)";

/// The ENS domain the plugin repo registers under
pub fn plugin_ens_domain() -> String {
    format!("{PLUGIN_REPO_ENS_SUBDOMAIN}.{PLUGIN_ENS_PARENT_DOMAIN}")
}

/// The ENS namehash of a dot-separated name.
///
/// The name is assumed normalized; the constant domains the scripts resolve
/// are lowercase ASCII already.
pub fn namehash(name: &str) -> B256 {
    let mut node = B256::ZERO;
    if name.is_empty() {
        return node;
    }

    for label in name.rsplit('.') {
        let label_hash = keccak256(label.as_bytes());

        let mut buffer = [0u8; 64];
        buffer[..32].copy_from_slice(node.as_slice());
        buffer[32..].copy_from_slice(label_hash.as_slice());
        node = keccak256(buffer);
    }

    node
}

/// Whether the plugin framework on this chain runs an ENS subdomain
/// registrar
pub async fn framework_supports_ens(
    factory: Address,
    provider: &DynProvider,
) -> Result<bool, ScriptError> {
    let factory = PluginRepoFactory::new(factory, provider.clone());
    let registry_address = factory
        .pluginRepoRegistry()
        .call()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

    let registry = PluginRepoRegistry::new(registry_address, provider.clone());
    let registrar = registry
        .subdomainRegistrar()
        .call()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

    Ok(registrar != Address::ZERO)
}

/// Finds the plugin repo on the target network.
///
/// Checks, in order: the explicit address override, the persisted
/// deployment record, and the repo's ENS domain through the framework
/// registrar. Returns the repo address together with the plugin's ENS
/// domain, empty only when the framework runs without ENS.
pub async fn find_plugin_repo(
    deployer: &Deployer,
    factory: Address,
    repo_override: Option<&str>,
) -> Result<(Option<Address>, String), ScriptError> {
    let domain = plugin_ens_domain();

    if let Some(raw) = repo_override {
        let address = require_valid_address(raw.parse().ok(), INVALID_REPO_OVERRIDE)?;
        info!("using plugin repo override {address}");
        return Ok((Some(address), domain));
    }

    if let Some(record) = deployer.deployment(PLUGIN_REPO_RECORD_NAME)? {
        return Ok((Some(record.address), domain));
    }

    let provider = deployer.provider();
    let factory = PluginRepoFactory::new(factory, provider.clone());
    let registry_address = factory
        .pluginRepoRegistry()
        .call()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

    let registry = PluginRepoRegistry::new(registry_address, provider.clone());
    let registrar_address = registry
        .subdomainRegistrar()
        .call()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

    // A zero registrar means the framework runs without ENS
    if registrar_address == Address::ZERO {
        return Ok((None, String::new()));
    }

    let registrar = ENSSubdomainRegistrar::new(registrar_address, provider.clone());
    let ens_address = registrar
        .ens()
        .call()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
    let ens = ENSRegistry::new(ens_address, provider.clone());

    let node = namehash(&domain);
    let exists = ens
        .recordExists(node)
        .call()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
    if !exists {
        return Ok((None, domain));
    }

    let resolver_address = ens
        .resolver(node)
        .call()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
    let resolver = AddrResolver::new(resolver_address, provider.clone());
    let repo = resolver
        .addr(node)
        .call()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

    Ok((Some(repo), domain))
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use alloy::{
        json_abi::JsonAbi,
        primitives::{address, b256, Address, B256},
    };

    use crate::{
        constants::PLUGIN_REPO_RECORD_NAME,
        networks::Network,
        utils::{setup_bare_provider, write_deployment, DeployedContract},
        wrapper::Deployer,
    };

    use super::{find_plugin_repo, namehash, plugin_ens_domain};

    /// Builds a deployer whose provider is never reached by these tests
    async fn offline_deployer(deployments_dir: &Path) -> Deployer {
        let provider = setup_bare_provider("http://127.0.0.1:1").await.unwrap();
        Deployer::new(
            Network::Localhost,
            provider,
            address!("0000000000000000000000000000000000000001"),
            PathBuf::from("artifacts"),
            deployments_dir.to_path_buf(),
        )
        .await
        .unwrap()
    }

    #[test]
    fn test_namehash_vectors() {
        assert_eq!(namehash(""), B256::ZERO);
        assert_eq!(
            namehash("eth"),
            b256!("93cdeb708b7545dc668eb9280176169d1c33cfd8ed6f04690a0bcc88a93fc4ae"),
        );
        assert_eq!(
            namehash("foo.eth"),
            b256!("de9b09fd7c5f901e23a3f19fecc54828e9c848539801e86591bd9801b019f84f"),
        );
    }

    #[test]
    fn test_plugin_domain() {
        let domain = plugin_ens_domain();
        assert_eq!(domain, "admin.plugin.dao.eth");
        assert_ne!(namehash(&domain), B256::ZERO);
    }

    #[tokio::test]
    async fn test_find_repo_prefers_recorded_deployment() {
        let dir = tempfile::tempdir().unwrap();
        let repo = address!("00000000000000000000000000000000000000c1");
        let record = DeployedContract {
            address: repo,
            abi: JsonAbi::new(),
            transaction_hash: B256::ZERO,
            receipt: serde_json::json!({}),
        };
        write_deployment(dir.path(), Network::Localhost, PLUGIN_REPO_RECORD_NAME, &record)
            .unwrap();

        // The factory is never consulted when a record exists
        let deployer = offline_deployer(dir.path()).await;
        let (found, domain) = find_plugin_repo(&deployer, Address::ZERO, None).await.unwrap();
        assert_eq!(found, Some(repo));
        assert_eq!(domain, plugin_ens_domain());
    }

    #[tokio::test]
    async fn test_find_repo_override() {
        let dir = tempfile::tempdir().unwrap();
        let deployer = offline_deployer(dir.path()).await;

        let repo = "0x00000000000000000000000000000000000000c2";
        let (found, _) = find_plugin_repo(&deployer, Address::ZERO, Some(repo)).await.unwrap();
        assert_eq!(found, Some(address!("00000000000000000000000000000000000000c2")));

        // Zero and malformed overrides are fatal
        let zero = "0x0000000000000000000000000000000000000000";
        assert!(find_plugin_repo(&deployer, Address::ZERO, Some(zero)).await.is_err());
        assert!(find_plugin_repo(&deployer, Address::ZERO, Some("not-an-address")).await.is_err());
    }
}
