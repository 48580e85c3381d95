//! Utilities for the deploy scripts.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use alloy::{
    json_abi::JsonAbi,
    network::EthereumWallet,
    primitives::{Address, B256},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::TransactionReceipt,
    signers::local::PrivateKeySigner,
    sol_types::SolEvent,
};
use serde::{Deserialize, Serialize};

use crate::{errors::ScriptError, networks::Network};

/// Sets up the RPC client used for all chain interaction, returning the
/// provider and the address of the signing deployer
pub async fn setup_client(
    priv_key: &str,
    rpc_url: &str,
) -> Result<(DynProvider, Address), ScriptError> {
    let signer = PrivateKeySigner::from_str(priv_key)
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    let deployer = signer.address();

    let provider = ProviderBuilder::new()
        .wallet(EthereumWallet::from(signer))
        .connect(rpc_url)
        .await
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;

    Ok((provider.erased(), deployer))
}

/// Sets up a provider without a local signer.
///
/// Transactions sent through it are signed by the node, which is how
/// impersonated accounts work on local development nodes.
pub async fn setup_bare_provider(rpc_url: &str) -> Result<DynProvider, ScriptError> {
    let provider = ProviderBuilder::new()
        .connect(rpc_url)
        .await
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;

    Ok(provider.erased())
}

/// A persisted contract deployment
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployedContract {
    /// The address the contract lives at
    pub address: Address,
    /// The ABI of the contract
    pub abi: JsonAbi,
    /// The hash of the deployment transaction
    pub transaction_hash: B256,
    /// The receipt of the deployment transaction
    pub receipt: serde_json::Value,
}

/// The path of a network's deployment record file
pub fn deployments_file(deployments_dir: &Path, network: Network) -> PathBuf {
    deployments_dir.join(format!("{}.json", network.name()))
}

/// Reads all deployment records of a network, keyed by contract name.
///
/// A missing record file reads as no deployments.
pub fn read_deployments(
    deployments_dir: &Path,
    network: Network,
) -> Result<BTreeMap<String, DeployedContract>, ScriptError> {
    let path = deployments_file(deployments_dir, network);
    if !path.exists() {
        return Ok(BTreeMap::new());
    }

    let raw = fs::read_to_string(&path).map_err(|e| ScriptError::ReadFile(e.to_string()))?;
    serde_json::from_str(&raw).map_err(|e| ScriptError::ReadFile(e.to_string()))
}

/// Reads the deployment record of a single contract, if one exists
pub fn read_deployment(
    deployments_dir: &Path,
    network: Network,
    name: &str,
) -> Result<Option<DeployedContract>, ScriptError> {
    Ok(read_deployments(deployments_dir, network)?.remove(name))
}

/// Saves the deployment record of a contract, overwriting any previous
/// record with the same name
pub fn write_deployment(
    deployments_dir: &Path,
    network: Network,
    name: &str,
    record: &DeployedContract,
) -> Result<(), ScriptError> {
    fs::create_dir_all(deployments_dir).map_err(|e| ScriptError::WriteFile(e.to_string()))?;

    let mut records = read_deployments(deployments_dir, network)?;
    records.insert(name.to_string(), record.clone());

    let raw = serde_json::to_string_pretty(&records).map_err(|e| ScriptError::Serde(e.to_string()))?;
    fs::write(deployments_file(deployments_dir, network), raw)
        .map_err(|e| ScriptError::WriteFile(e.to_string()))
}

/// Finds the first log in a receipt decoding as the event `E`
pub fn find_event<E: SolEvent>(receipt: &TransactionReceipt) -> Option<E> {
    receipt
        .logs()
        .iter()
        .find_map(|log| log.log_decode::<E>().ok().map(|log| log.inner.data))
}

/// Validates an optional address override, rejecting absent and zero values
/// with the given error message
pub fn require_valid_address(
    value: Option<Address>,
    error: &str,
) -> Result<Address, ScriptError> {
    match value {
        Some(address) if address != Address::ZERO => Ok(address),
        _ => Err(ScriptError::Precondition(error.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::address;
    use eyre::Result;

    use super::*;

    fn sample_record() -> DeployedContract {
        DeployedContract {
            address: address!("00000000000000000000000000000000000000b1"),
            abi: JsonAbi::new(),
            transaction_hash: B256::ZERO,
            receipt: serde_json::json!({ "blockNumber": "0x1" }),
        }
    }

    #[test]
    fn test_deployment_record_roundtrip() -> Result<()> {
        let dir = tempfile::tempdir()?;

        // Nothing recorded yet
        assert!(read_deployment(dir.path(), Network::Hardhat, "AdminSetup")?.is_none());

        let record = sample_record();
        write_deployment(dir.path(), Network::Hardhat, "AdminSetup", &record)?;

        let read = read_deployment(dir.path(), Network::Hardhat, "AdminSetup")?.unwrap();
        assert_eq!(read.address, record.address);
        assert_eq!(read.transaction_hash, record.transaction_hash);

        // Records are per network
        assert!(read_deployment(dir.path(), Network::Sepolia, "AdminSetup")?.is_none());
        Ok(())
    }

    #[test]
    fn test_deployment_records_accumulate() -> Result<()> {
        let dir = tempfile::tempdir()?;
        write_deployment(dir.path(), Network::Hardhat, "AdminSetup", &sample_record())?;
        write_deployment(dir.path(), Network::Hardhat, "AdminRepoProxy", &sample_record())?;

        let records = read_deployments(dir.path(), Network::Hardhat)?;
        assert_eq!(records.len(), 2);
        assert!(records.contains_key("AdminSetup"));
        assert!(records.contains_key("AdminRepoProxy"));
        Ok(())
    }

    #[test]
    fn test_require_valid_address() {
        let valid = address!("0000000000000000000000000000000000000001");
        assert_eq!(
            require_valid_address(Some(valid), "missing").unwrap(),
            valid
        );
        assert!(require_valid_address(None, "missing").is_err());
        assert!(require_valid_address(Some(Address::ZERO), "missing").is_err());
    }
}
