//! The deployment wrapper.
//!
//! [`Deployer`] ties a chain backend to the artifact and deployment record
//! directories. It deploys implementations with an optional UUPS proxy in
//! front, and persists a record for every contract it creates so later
//! runs can find them.

use std::path::PathBuf;

use alloy::{
    dyn_abi::DynSolValue,
    primitives::{Address, Bytes},
    providers::DynProvider,
    rpc::types::TransactionReceipt,
};
use tracing::info;

use crate::{
    artifacts::{load_artifact, ContractArtifact},
    backend::{create_backend, NetworkBackend, NonceKind},
    constants::PROXY_FACTORY_ARTIFACT,
    errors::ScriptError,
    networks::Network,
    utils::{read_deployment, write_deployment, DeployedContract},
};

/// How a contract should be deployed
#[derive(Clone, Debug, Default)]
pub struct DeployOptions {
    /// Constructor arguments of the implementation
    pub args: Vec<DynSolValue>,
    /// Whether to put a UUPS proxy in front of the implementation
    pub with_proxy: bool,
    /// The initializer called through the proxy at creation, if any
    pub initializer: Option<String>,
    /// Arguments of the initializer call
    pub init_args: Vec<DynSolValue>,
}

/// Deploys contracts on the target network and records each deployment
pub struct Deployer {
    /// The target network
    network: Network,
    /// The chain backend deployments go through
    backend: Box<dyn NetworkBackend>,
    /// The directory contract artifacts are loaded from
    artifacts_dir: PathBuf,
    /// The directory deployment records are written to
    deployments_dir: PathBuf,
}

impl Deployer {
    /// Builds a deployer for the network, selecting the chain backend to
    /// match
    pub async fn new(
        network: Network,
        provider: DynProvider,
        sender: Address,
        artifacts_dir: PathBuf,
        deployments_dir: PathBuf,
    ) -> Result<Self, ScriptError> {
        let backend = create_backend(network, provider, sender).await?;
        Ok(Self {
            network,
            backend,
            artifacts_dir,
            deployments_dir,
        })
    }

    /// The target network
    pub fn network(&self) -> Network {
        self.network
    }

    /// The chain backend
    pub fn backend(&self) -> &dyn NetworkBackend {
        self.backend.as_ref()
    }

    /// The address deployments are sent from
    pub fn sender(&self) -> Address {
        self.backend.sender()
    }

    /// The provider the backend sends through
    pub fn provider(&self) -> &DynProvider {
        self.backend.provider()
    }

    /// The directory deployment records are written to
    pub fn deployments_dir(&self) -> &PathBuf {
        &self.deployments_dir
    }

    /// Loads a contract artifact by name
    pub fn artifact(&self, name: &str) -> Result<ContractArtifact, ScriptError> {
        load_artifact(&self.artifacts_dir, name)
    }

    /// The sender's nonce of the given kind
    pub async fn get_nonce(&self, kind: NonceKind) -> Result<u64, ScriptError> {
        self.backend.get_nonce(kind).await
    }

    /// The address a contract created by the sender at the given deployment
    /// nonce will receive, usable before the contract exists
    pub fn create_address(&self, nonce: u64) -> Address {
        self.backend.create_address(nonce)
    }

    /// A previously recorded deployment on this network
    pub fn deployment(&self, name: &str) -> Result<Option<DeployedContract>, ScriptError> {
        read_deployment(&self.deployments_dir, self.network, name)
    }

    /// Persists a deployment record under the given name
    pub fn record_deployment(
        &self,
        name: &str,
        record: &DeployedContract,
    ) -> Result<(), ScriptError> {
        write_deployment(&self.deployments_dir, self.network, name, record)
    }

    /// Deploys a contract by artifact name.
    ///
    /// Without a proxy the implementation itself is recorded under `name`.
    /// With one, a UUPS proxy is created in front of the implementation and
    /// recorded under `name` carrying the implementation ABI bound to the
    /// proxy address, which is how callers interact with it. The
    /// implementation keeps its own record alongside.
    pub async fn deploy(
        &self,
        name: &str,
        options: DeployOptions,
    ) -> Result<DeployedContract, ScriptError> {
        let artifact = self.artifact(name)?;
        info!("deploying {name}");
        let (implementation, receipt) = self.backend.deploy(&artifact, &options.args).await?;

        if !options.with_proxy {
            let record = build_record(implementation, &artifact, &receipt)?;
            self.record_deployment(name, &record)?;
            info!("deployed {name} at {implementation}");
            return Ok(record);
        }

        let implementation_record = build_record(implementation, &artifact, &receipt)?;
        self.record_deployment(&implementation_record_name(name), &implementation_record)?;

        let data = match &options.initializer {
            Some(initializer) => {
                self.backend
                    .encode_function_data(&artifact, initializer, &options.init_args)?
            },
            None => Bytes::new(),
        };

        let factory = self.artifact(PROXY_FACTORY_ARTIFACT)?;
        let (proxy, proxy_receipt) = self
            .backend
            .deploy_proxy(&factory, implementation, data)
            .await?;

        let record = build_record(proxy, &artifact, &proxy_receipt)?;
        self.record_deployment(name, &record)?;
        info!("deployed {name} proxy at {proxy} (implementation {implementation})");

        Ok(record)
    }

    /// Deploys a fresh implementation of `artifact_name` and points the
    /// recorded proxy `record_name` at it, forwarding `call` through the
    /// upgrade
    pub async fn upgrade(
        &self,
        record_name: &str,
        artifact_name: &str,
        call: Bytes,
    ) -> Result<DeployedContract, ScriptError> {
        let proxy = self.deployment(record_name)?.ok_or_else(|| {
            ScriptError::Precondition(format!("no deployment record for {record_name}"))
        })?;

        let artifact = self.artifact(artifact_name)?;
        info!("deploying {artifact_name} implementation for {record_name}");
        let (implementation, receipt) = self.backend.deploy(&artifact, &[]).await?;

        let implementation_record = build_record(implementation, &artifact, &receipt)?;
        self.record_deployment(&implementation_record_name(record_name), &implementation_record)?;

        self.backend
            .upgrade_proxy(proxy.address, implementation, call)
            .await?;
        info!("upgraded {record_name} at {} to implementation {implementation}", proxy.address);

        Ok(implementation_record)
    }
}

/// The record name of the implementation behind a proxied deployment
pub fn implementation_record_name(name: &str) -> String {
    format!("{name}_Implementation")
}

/// Builds the persisted record of a deployment
fn build_record(
    address: Address,
    artifact: &ContractArtifact,
    receipt: &TransactionReceipt,
) -> Result<DeployedContract, ScriptError> {
    Ok(DeployedContract {
        address,
        abi: artifact.abi.clone(),
        transaction_hash: receipt.transaction_hash,
        receipt: serde_json::to_value(receipt).map_err(|e| ScriptError::Serde(e.to_string()))?,
    })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use alloy::primitives::address;

    use crate::{networks::Network, utils::setup_bare_provider};

    use super::{implementation_record_name, DeployOptions, Deployer};

    #[test]
    fn test_implementation_record_name() {
        assert_eq!(
            implementation_record_name("AdminRepoProxy"),
            "AdminRepoProxy_Implementation"
        );
    }

    #[tokio::test]
    async fn test_create_address_prediction() {
        let dir = tempfile::tempdir().unwrap();
        let provider = setup_bare_provider("http://127.0.0.1:1").await.unwrap();
        let sender = address!("6ac7ea33f8831ea9dcc53393aaa88b25a785dbf0");

        let deployer = Deployer::new(
            Network::Localhost,
            provider,
            sender,
            PathBuf::from("artifacts"),
            dir.path().to_path_buf(),
        )
        .await
        .unwrap();

        assert_eq!(deployer.sender(), sender);
        assert_eq!(deployer.network(), Network::Localhost);
        assert_eq!(
            deployer.create_address(0),
            address!("cd234a471b72ba2f1ccf0a70fcaba648a5eecd8d")
        );
    }

    #[test]
    fn test_deploy_options_default() {
        let options = DeployOptions::default();
        assert!(options.args.is_empty());
        assert!(!options.with_proxy);
        assert!(options.initializer.is_none());
        assert!(options.init_args.is_empty());
    }
}
