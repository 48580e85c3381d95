//! Constants used in the deploy scripts

use alloy::primitives::{address, Address, U256};

/// The release metadata published alongside a new release of the plugin
pub const RELEASE_METADATA: &str = include_str!("../metadata/release-metadata.json");

/// The build metadata published alongside a new build of the plugin
pub const BUILD_METADATA: &str = include_str!("../metadata/build-metadata.json");

/// The directory deployment records are written to, one JSON file per network
pub const DEPLOYMENTS_DIR: &str = "deployments";

/// The name under which the plugin repo deployment record is saved
pub const PLUGIN_REPO_RECORD_NAME: &str = "AdminRepoProxy";

/// The artifact name of the plugin repo implementation, used to attach
/// an ABI to repo deployment records
pub const PLUGIN_REPO_ARTIFACT: &str = "PluginRepo";

/// The artifact name of the UUPS proxy factory deployed in front of
/// proxied implementations
pub const PROXY_FACTORY_ARTIFACT: &str = "ProxyFactory";

/// The file name prefix of the serialized `createVersion` proposal payload,
/// completed by the network name
pub const PROPOSAL_DATA_FILE_PREFIX: &str = "createVersionProposalData";

/// The metadata URI placeholder used on networks where nothing is pinned
pub const EMPTY_METADATA_URI: &str = "0x";

/// The release metadata URI published for placeholder builds
pub const PLACEHOLDER_RELEASE_METADATA: &str = "{}";

/// The build metadata URI published for placeholder builds
pub const PLACEHOLDER_BUILD_METADATA: &str = "placeholder-setup-build";

/// The name the release metadata JSON is pinned under
pub const RELEASE_METADATA_PIN_NAME: &str = "admin-release-metadata";

/// The name the build metadata JSON is pinned under
pub const BUILD_METADATA_PIN_NAME: &str = "admin-build-metadata";

/// The Pinata endpoint JSON blobs are pinned through
pub const PINATA_PIN_JSON_URL: &str = "https://api.pinata.cloud/pinning/pinJSONToIPFS";

/// The parent ENS domain plugin repos register their subdomain under
pub const PLUGIN_ENS_PARENT_DOMAIN: &str = "plugin.dao.eth";

/// The deployer system contract on zk chains, through which all contract
/// creations are routed
pub const ZK_CONTRACT_DEPLOYER: Address = address!("0000000000000000000000000000000000008006");

/// The nonce holder system contract on zk chains, tracking deployment nonces
/// separately from transaction nonces
pub const ZK_NONCE_HOLDER: Address = address!("0000000000000000000000000000000000008003");

/// The domain separator of the zk create-address derivation,
/// `keccak256("zksyncCreate")`
pub const ZK_CREATE_PREFIX_INPUT: &[u8] = b"zksyncCreate";

/// The version byte of the zk bytecode hash marker format
pub const ZK_BYTECODE_HASH_VERSION: u8 = 1;

/// The number of bytes in an EVM word
pub const NUM_BYTES_WORD: usize = 32;

/// The number of bytes in an Ethereum address
pub const NUM_BYTES_ADDRESS: usize = 20;

/// The mnemonic the local node test accounts are derived from
pub const DEV_MNEMONIC: &str = "test test test test test test test test test test test junk";

/// The first test account index pre-funded on zk local nodes
pub const PREFUND_FIRST_ACCOUNT: u32 = 10;

/// One past the last test account index pre-funded on zk local nodes
pub const PREFUND_LAST_ACCOUNT: u32 = 20;

/// The amount each pre-funded test account receives, 0.5 ether
pub const PREFUND_AMOUNT_WEI: U256 = U256::from_limbs([500_000_000_000_000_000, 0, 0, 0]);

/// The balance given to the impersonated management DAO signer on local
/// networks, 1 ether
pub const IMPERSONATION_BALANCE_WEI: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// The production network assumed when running locally without an
/// explicit network name override
pub const DEFAULT_PRODUCTION_NETWORK: &str = "sepolia";
