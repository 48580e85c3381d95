//! The networks the scripts can run against.
//!
//! Mirrors the framework's supported-network registry: every network has a
//! chain id and an RPC endpoint, remote endpoints are provisioned through
//! Alchemy, and the zk networks plus the local node names form two special
//! groups the backend selection and the skip predicates consult.

use std::{
    fmt::{self, Display},
    str::FromStr,
};

use alloy::primitives::{address, Address};

use crate::{
    constants::DEFAULT_PRODUCTION_NETWORK,
    errors::ScriptError,
};

/// A network the scripts can deploy to
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Network {
    /// Ethereum mainnet
    Mainnet,
    /// The Sepolia testnet
    Sepolia,
    /// The Holesky testnet
    Holesky,
    /// Polygon PoS mainnet
    Polygon,
    /// Base mainnet
    Base,
    /// Arbitrum One
    Arbitrum,
    /// The zkSync Era mainnet
    ZkMainnet,
    /// The deprecated zkSync Era Goerli testnet
    ZkTestnet,
    /// The zkSync Era Sepolia testnet
    ZksyncSepolia,
    /// A local zk node
    ZkLocalTestnet,
    /// A local node reached over localhost
    Localhost,
    /// The in-process hardhat network
    Hardhat,
    /// The coverage variant of the in-process network
    Coverage,
}

impl Network {
    /// Parses a network from its configured name.
    ///
    /// `zkSyncLocal` is accepted as an alias of the local zk node.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "mainnet" => Some(Self::Mainnet),
            "sepolia" => Some(Self::Sepolia),
            "holesky" => Some(Self::Holesky),
            "polygon" => Some(Self::Polygon),
            "base" => Some(Self::Base),
            "arbitrum" => Some(Self::Arbitrum),
            "zkMainnet" => Some(Self::ZkMainnet),
            "zkTestnet" => Some(Self::ZkTestnet),
            "zksyncSepolia" => Some(Self::ZksyncSepolia),
            "zkLocalTestnet" | "zkSyncLocal" => Some(Self::ZkLocalTestnet),
            "localhost" => Some(Self::Localhost),
            "hardhat" => Some(Self::Hardhat),
            "coverage" => Some(Self::Coverage),
            _ => None,
        }
    }

    /// The configured name of the network
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Sepolia => "sepolia",
            Self::Holesky => "holesky",
            Self::Polygon => "polygon",
            Self::Base => "base",
            Self::Arbitrum => "arbitrum",
            Self::ZkMainnet => "zkMainnet",
            Self::ZkTestnet => "zkTestnet",
            Self::ZksyncSepolia => "zksyncSepolia",
            Self::ZkLocalTestnet => "zkLocalTestnet",
            Self::Localhost => "localhost",
            Self::Hardhat => "hardhat",
            Self::Coverage => "coverage",
        }
    }

    /// The chain id of the network
    pub fn chain_id(&self) -> u64 {
        match self {
            Self::Mainnet => 1,
            Self::Sepolia => 11155111,
            Self::Holesky => 17000,
            Self::Polygon => 137,
            Self::Base => 8453,
            Self::Arbitrum => 42161,
            Self::ZkMainnet => 324,
            Self::ZkTestnet => 280,
            Self::ZksyncSepolia => 300,
            Self::ZkLocalTestnet => 270,
            Self::Localhost | Self::Hardhat | Self::Coverage => 31337,
        }
    }

    /// Whether the network is a local development node
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::Localhost | Self::Hardhat | Self::Coverage | Self::ZkLocalTestnet
        )
    }

    /// Whether contract creation on the network routes through the zk
    /// deployer system contract
    pub fn is_zk(&self) -> bool {
        matches!(
            self,
            Self::ZkMainnet | Self::ZkTestnet | Self::ZksyncSepolia | Self::ZkLocalTestnet
        )
    }

    /// The RPC endpoint of the network.
    ///
    /// Remote networks are provisioned through Alchemy and require an API
    /// key, except the deprecated zk testnet which only has a public
    /// endpoint. Local networks ignore the key.
    pub fn rpc_url(&self, api_key: Option<&str>) -> Result<String, ScriptError> {
        let subdomain = match self {
            Self::Localhost | Self::Hardhat | Self::Coverage => {
                return Ok("http://127.0.0.1:8545".to_string());
            }
            Self::ZkLocalTestnet => return Ok("http://localhost:3050".to_string()),
            Self::ZkTestnet => return Ok("https://testnet.era.zksync.dev".to_string()),
            Self::Mainnet => "eth-mainnet",
            Self::Sepolia => "eth-sepolia",
            Self::Holesky => "eth-holesky",
            Self::Polygon => "polygon-mainnet",
            Self::Base => "base-mainnet",
            Self::Arbitrum => "arb-mainnet",
            Self::ZkMainnet => "zksync-mainnet",
            Self::ZksyncSepolia => "zksync-sepolia",
        };

        let api_key = api_key.ok_or_else(|| {
            ScriptError::ClientInitialization(format!(
                "an Alchemy API key is required for network '{}'",
                self.name()
            ))
        })?;
        Ok(format!("https://{subdomain}.g.alchemy.com/v2/{api_key}"))
    }

    /// The production network this run publishes against.
    ///
    /// Remote networks are their own production network. Local runs fall
    /// back to the configured override name, defaulting to Sepolia, so that
    /// framework addresses and ENS domains resolve during integration
    /// testing.
    pub fn production(&self, override_name: Option<&str>) -> Result<Network, ScriptError> {
        if !self.is_local() {
            return Ok(*self);
        }

        let name = override_name.unwrap_or(DEFAULT_PRODUCTION_NETWORK);
        Network::from_name(name)
            .ok_or_else(|| ScriptError::Precondition(format!("unsupported network '{name}'")))
    }
}

impl Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Network::from_name(s).ok_or_else(|| format!("unsupported network '{s}'"))
    }
}

/// The framework contract addresses known for a production network.
///
/// Sourced from the published framework deployments; entries are filled in
/// as deployments are confirmed. Explicit overrides always take precedence
/// over this table.
#[derive(Copy, Clone, Debug, Default)]
pub struct KnownContracts {
    /// The `PluginRepoFactory` of the framework deployment
    pub plugin_repo_factory: Option<Address>,
    /// The DAO governing the framework deployment
    pub management_dao: Option<Address>,
    /// The `PlaceholderSetup` published for backfilling skipped builds
    pub placeholder_setup: Option<Address>,
}

/// Looks up the known framework contracts of a production network
pub fn known_contracts(network: Network) -> KnownContracts {
    match network {
        Network::Mainnet => KnownContracts {
            management_dao: Some(address!("f2d594F3C93C19D7B1a6F15B5489FFcE4B01f7dA")),
            ..Default::default()
        },
        _ => KnownContracts::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::Network;

    #[test]
    fn test_name_roundtrip() {
        let networks = [
            Network::Mainnet,
            Network::Sepolia,
            Network::Holesky,
            Network::Polygon,
            Network::Base,
            Network::Arbitrum,
            Network::ZkMainnet,
            Network::ZkTestnet,
            Network::ZksyncSepolia,
            Network::ZkLocalTestnet,
            Network::Localhost,
            Network::Hardhat,
            Network::Coverage,
        ];
        for network in networks {
            assert_eq!(Network::from_name(network.name()), Some(network));
        }
    }

    #[test]
    fn test_local_zk_alias() {
        assert_eq!(
            Network::from_name("zkSyncLocal"),
            Some(Network::ZkLocalTestnet)
        );
    }

    #[test]
    fn test_unknown_network() {
        assert_eq!(Network::from_name("goerli"), None);
    }

    #[test]
    fn test_local_and_zk_groups() {
        assert!(Network::Hardhat.is_local());
        assert!(Network::ZkLocalTestnet.is_local());
        assert!(!Network::Sepolia.is_local());

        assert!(Network::ZkMainnet.is_zk());
        assert!(Network::ZkLocalTestnet.is_zk());
        assert!(!Network::Mainnet.is_zk());
        assert!(!Network::Hardhat.is_zk());
    }

    #[test]
    fn test_rpc_url_provisioning() {
        // Local nodes need no key
        assert_eq!(
            Network::Hardhat.rpc_url(None).unwrap(),
            "http://127.0.0.1:8545"
        );

        // Remote networks are templated on the key
        let url = Network::Sepolia.rpc_url(Some("testkey")).unwrap();
        assert_eq!(url, "https://eth-sepolia.g.alchemy.com/v2/testkey");

        // A missing key is fatal for remote networks
        assert!(Network::Sepolia.rpc_url(None).is_err());
    }

    #[test]
    fn test_production_network() {
        // Remote networks map to themselves, override is ignored
        assert_eq!(
            Network::Polygon.production(Some("mainnet")).unwrap(),
            Network::Polygon
        );

        // Local runs follow the override and default to Sepolia
        assert_eq!(
            Network::Hardhat.production(Some("mainnet")).unwrap(),
            Network::Mainnet
        );
        assert_eq!(
            Network::Hardhat.production(None).unwrap(),
            Network::Sepolia
        );
        assert!(Network::Hardhat.production(Some("goerli")).is_err());
    }
}
