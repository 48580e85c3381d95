//! Per-network deployment backends.
//!
//! Everything that differs between a vanilla EVM chain and a zk stack chain
//! sits behind [`NetworkBackend`]. The backend is chosen once at startup
//! from the target network, and the rest of the scripts are written against
//! the trait without branching on the chain family again.

use alloy::{
    dyn_abi::DynSolValue,
    network::TransactionBuilder,
    primitives::{keccak256, Address, Bytes, B256, U256},
    providers::{DynProvider, Provider},
    rpc::types::{TransactionReceipt, TransactionRequest},
    signers::local::{coins_bip39::English, MnemonicBuilder},
    sol_types::SolCall,
};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::{
    artifacts::{self, constructor_input, deploy_data, ContractArtifact},
    constants::{
        DEV_MNEMONIC, NUM_BYTES_ADDRESS, NUM_BYTES_WORD, PREFUND_AMOUNT_WEI,
        PREFUND_FIRST_ACCOUNT, PREFUND_LAST_ACCOUNT, ZK_BYTECODE_HASH_VERSION,
        ZK_CONTRACT_DEPLOYER, ZK_CREATE_PREFIX_INPUT, ZK_NONCE_HOLDER,
    },
    errors::ScriptError,
    networks::Network,
    solidity::{ContractDeployer, NonceHolder, ProxyFactory, UUPSUpgradeable},
    utils::find_event,
};

/// The kind of account nonce fetched from the chain.
///
/// Vanilla EVM chains keep a single account nonce. Zk stack chains track
/// transaction and deployment nonces separately, and create addresses
/// derive from the deployment nonce.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NonceKind {
    /// The nonce consumed by contract creations
    #[default]
    Deployment,
    /// The nonce consumed by ordinary transactions
    Transaction,
}

/// The chain interactions that vary with the chain family
#[async_trait]
pub trait NetworkBackend: Send + Sync {
    /// The provider transactions are sent through
    fn provider(&self) -> &DynProvider;

    /// The address transactions are signed with
    fn sender(&self) -> Address;

    /// Fetches the sender's nonce of the given kind
    async fn get_nonce(&self, kind: NonceKind) -> Result<u64, ScriptError>;

    /// The address a contract created by the sender at the given deployment
    /// nonce receives
    fn create_address(&self, nonce: u64) -> Address;

    /// Deploys the artifact with the given constructor arguments
    async fn deploy(
        &self,
        artifact: &ContractArtifact,
        args: &[DynSolValue],
    ) -> Result<(Address, TransactionReceipt), ScriptError>;

    /// ABI-encodes a call into the artifact's ABI, selector included
    fn encode_function_data(
        &self,
        artifact: &ContractArtifact,
        function: &str,
        args: &[DynSolValue],
    ) -> Result<Bytes, ScriptError> {
        artifacts::encode_function_data(&artifact.abi, function, args)
    }

    /// Deploys a UUPS proxy in front of an implementation.
    ///
    /// A fresh `ProxyFactory` bound to the implementation is deployed, then
    /// asked to create the proxy with the given initializer calldata. The
    /// proxy address is read back from the factory's `ProxyCreated` event.
    async fn deploy_proxy(
        &self,
        factory_artifact: &ContractArtifact,
        implementation: Address,
        data: Bytes,
    ) -> Result<(Address, TransactionReceipt), ScriptError> {
        let (factory_address, _) = self
            .deploy(factory_artifact, &[DynSolValue::Address(implementation)])
            .await?;

        let factory = ProxyFactory::new(factory_address, self.provider().clone());
        let receipt = factory
            .deployUUPSProxy(data)
            .send()
            .await
            .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?
            .get_receipt()
            .await
            .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?;

        let event = find_event::<ProxyFactory::ProxyCreated>(&receipt).ok_or_else(|| {
            ScriptError::InvariantViolation(
                "proxy deployment receipt has no ProxyCreated event".to_string(),
            )
        })?;

        Ok((event.proxy, receipt))
    }

    /// Points a UUPS proxy at a new implementation, forwarding `call` to the
    /// new code in the same transaction
    async fn upgrade_proxy(
        &self,
        proxy: Address,
        implementation: Address,
        call: Bytes,
    ) -> Result<TransactionReceipt, ScriptError> {
        let proxy = UUPSUpgradeable::new(proxy, self.provider().clone());
        proxy
            .upgradeToAndCall(implementation, call)
            .send()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?
            .get_receipt()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))
    }
}

/// The backend for vanilla EVM chains
pub struct EvmBackend {
    /// The provider transactions are sent through
    provider: DynProvider,
    /// The sending address
    sender: Address,
}

impl EvmBackend {
    /// Constructor
    pub fn new(provider: DynProvider, sender: Address) -> Self {
        Self { provider, sender }
    }
}

#[async_trait]
impl NetworkBackend for EvmBackend {
    fn provider(&self) -> &DynProvider {
        &self.provider
    }

    fn sender(&self) -> Address {
        self.sender
    }

    async fn get_nonce(&self, _kind: NonceKind) -> Result<u64, ScriptError> {
        // One account nonce covers both kinds
        self.provider
            .get_transaction_count(self.sender)
            .await
            .map_err(|e| ScriptError::NonceFetching(e.to_string()))
    }

    fn create_address(&self, nonce: u64) -> Address {
        self.sender.create(nonce)
    }

    async fn deploy(
        &self,
        artifact: &ContractArtifact,
        args: &[DynSolValue],
    ) -> Result<(Address, TransactionReceipt), ScriptError> {
        let data = deploy_data(artifact, args)?;
        let tx = TransactionRequest::default().with_deploy_code(data);

        let receipt = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?
            .get_receipt()
            .await
            .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?;

        let address = receipt.contract_address.ok_or_else(|| {
            ScriptError::InvariantViolation(
                "deployment receipt carries no contract address".to_string(),
            )
        })?;

        Ok((address, receipt))
    }
}

/// The backend for zk stack chains.
///
/// Creations are routed through the `ContractDeployer` system contract
/// instead of being sent as create transactions, and the resulting address
/// follows the zk derivation over the sender's deployment nonce.
pub struct ZkBackend {
    /// The provider transactions are sent through
    provider: DynProvider,
    /// The sending address
    sender: Address,
}

impl ZkBackend {
    /// Constructor
    pub fn new(provider: DynProvider, sender: Address) -> Self {
        Self { provider, sender }
    }
}

#[async_trait]
impl NetworkBackend for ZkBackend {
    fn provider(&self) -> &DynProvider {
        &self.provider
    }

    fn sender(&self) -> Address {
        self.sender
    }

    async fn get_nonce(&self, kind: NonceKind) -> Result<u64, ScriptError> {
        match kind {
            NonceKind::Transaction => self
                .provider
                .get_transaction_count(self.sender)
                .await
                .map_err(|e| ScriptError::NonceFetching(e.to_string())),
            NonceKind::Deployment => {
                let holder = NonceHolder::new(ZK_NONCE_HOLDER, self.provider.clone());
                let nonce = holder
                    .getDeploymentNonce(self.sender)
                    .call()
                    .await
                    .map_err(|e| ScriptError::NonceFetching(e.to_string()))?;

                Ok(nonce.to::<u64>())
            },
        }
    }

    fn create_address(&self, nonce: u64) -> Address {
        zk_create_address(self.sender, nonce)
    }

    async fn deploy(
        &self,
        artifact: &ContractArtifact,
        args: &[DynSolValue],
    ) -> Result<(Address, TransactionReceipt), ScriptError> {
        let call = ContractDeployer::createCall {
            salt: B256::ZERO,
            bytecodeHash: zk_bytecode_hash(&artifact.bytecode),
            input: constructor_input(artifact, args)?.into(),
        };

        // The deployment nonce the creation consumes fixes the address
        let nonce = self.get_nonce(NonceKind::Deployment).await?;
        let address = self.create_address(nonce);

        let tx = TransactionRequest::default()
            .with_to(ZK_CONTRACT_DEPLOYER)
            .with_input(call.abi_encode());

        let receipt = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?
            .get_receipt()
            .await
            .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?;

        Ok((address, receipt))
    }
}

/// Builds the backend for the target network.
///
/// On the zk local node the dev mnemonic accounts past the pre-funded range
/// are topped up first so auxiliary signers work out of the box.
pub async fn create_backend(
    network: Network,
    provider: DynProvider,
    sender: Address,
) -> Result<Box<dyn NetworkBackend>, ScriptError> {
    if network == Network::ZkLocalTestnet {
        prefund_dev_accounts(&provider).await?;
    }

    if network.is_zk() {
        Ok(Box::new(ZkBackend::new(provider, sender)))
    } else {
        Ok(Box::new(EvmBackend::new(provider, sender)))
    }
}

/// Sends a small balance to each dev mnemonic account the zk local node
/// leaves unfunded
async fn prefund_dev_accounts(provider: &DynProvider) -> Result<(), ScriptError> {
    info!("prefunding zk local dev accounts");
    for index in PREFUND_FIRST_ACCOUNT..PREFUND_LAST_ACCOUNT {
        let account = MnemonicBuilder::<English>::default()
            .phrase(DEV_MNEMONIC)
            .index(index)
            .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?
            .build()
            .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;

        let tx = TransactionRequest::default()
            .with_to(account.address())
            .with_value(PREFUND_AMOUNT_WEI);

        provider
            .send_transaction(tx)
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?
            .get_receipt()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
    }

    Ok(())
}

/// Pads zk bytecode to a whole, odd number of 32-byte words
pub fn pad_zk_bytecode(bytecode: &[u8]) -> Vec<u8> {
    let mut padded = bytecode.to_vec();
    let remainder = padded.len() % NUM_BYTES_WORD;
    if remainder != 0 {
        padded.resize(padded.len() + NUM_BYTES_WORD - remainder, 0);
    }

    if (padded.len() / NUM_BYTES_WORD) % 2 == 0 {
        padded.resize(padded.len() + NUM_BYTES_WORD, 0);
    }

    padded
}

/// Hashes zk bytecode into the marker format the `ContractDeployer` expects.
///
/// Byte zero holds the format version and byte one is reserved. Bytes two
/// through four hold the padded length in 32-byte words big-endian, and the
/// rest is the tail of the sha256 digest of the padded bytecode.
pub fn zk_bytecode_hash(bytecode: &[u8]) -> B256 {
    let padded = pad_zk_bytecode(bytecode);
    let digest = Sha256::digest(&padded);

    let mut hash = B256::from_slice(&digest);
    hash[0] = ZK_BYTECODE_HASH_VERSION;
    hash[1] = 0;

    let words = (padded.len() / NUM_BYTES_WORD) as u16;
    hash[2..4].copy_from_slice(&words.to_be_bytes());

    hash
}

/// Derives the address of a zk contract creation.
///
/// The preimage is `keccak256("zksyncCreate")` followed by the sender and
/// the deployment nonce, each left-padded to a word. The address is the low
/// twenty bytes of its keccak hash.
pub fn zk_create_address(sender: Address, nonce: u64) -> Address {
    let prefix = keccak256(ZK_CREATE_PREFIX_INPUT);

    let mut preimage = Vec::with_capacity(3 * NUM_BYTES_WORD);
    preimage.extend_from_slice(prefix.as_slice());
    preimage.extend_from_slice(B256::left_padding_from(sender.as_slice()).as_slice());
    preimage.extend_from_slice(&U256::from(nonce).to_be_bytes::<32>());

    Address::from_slice(&keccak256(&preimage)[NUM_BYTES_WORD - NUM_BYTES_ADDRESS..])
}
