//! Definitions of the framework contract interfaces called during deployment

#![allow(missing_docs)]

use alloy::sol;

sol! {
    /// The factory creating plugin repositories for the framework
    #[sol(rpc)]
    contract PluginRepoFactory {
        function pluginRepoRegistry() external view returns (address);
        function createPluginRepo(string subdomain, address initialOwner) external returns (address);
    }

    /// The registry the factory registers new plugin repositories in
    #[sol(rpc)]
    contract PluginRepoRegistry {
        function subdomainRegistrar() external view returns (address);

        event PluginRepoRegistered(string subdomain, address pluginRepo);
    }

    /// A versioned plugin repository
    #[sol(rpc)]
    contract PluginRepo {
        /// The (release, build) pair of a published version
        #[derive(Debug, PartialEq)]
        struct Tag {
            uint8 release;
            uint16 build;
        }

        /// A published version of the plugin
        #[derive(Debug)]
        struct Version {
            Tag tag;
            address pluginSetup;
            bytes buildMetadata;
        }

        function latestRelease() external view returns (uint8);
        function buildCount(uint8 release) external view returns (uint256);
        function getLatestVersion(uint8 release) external view returns (Version);
        function isGranted(address where_, address who, bytes32 permissionId, bytes data) external view returns (bool);
        function createVersion(uint8 release, address pluginSetup, bytes buildMetadata, bytes releaseMetadata) external;

        event VersionCreated(uint8 release, uint16 build, address indexed pluginSetup, bytes buildMetadata);
    }

    /// The setup contract installing the plugin, holding its implementation
    /// base
    #[sol(rpc)]
    contract PluginSetup {
        function implementation() external view returns (address);
    }

    /// The registrar managing the framework's plugin ENS subdomains
    #[sol(rpc)]
    contract ENSSubdomainRegistrar {
        function ens() external view returns (address);
    }

    /// The ENS registry
    #[sol(rpc)]
    contract ENSRegistry {
        function recordExists(bytes32 node) external view returns (bool);
        function resolver(bytes32 node) external view returns (address);
    }

    /// The address-resolving subset of an ENS resolver
    #[sol(rpc)]
    contract AddrResolver {
        function addr(bytes32 node) external view returns (address);
    }

    /// The factory deploying UUPS proxies in front of implementations
    #[sol(rpc)]
    contract ProxyFactory {
        function deployUUPSProxy(bytes data) external returns (address);

        event ProxyCreated(address proxy);
    }

    /// The upgrade surface of a UUPS proxy
    #[sol(rpc)]
    contract UUPSUpgradeable {
        function upgradeToAndCall(address newImplementation, bytes data) external payable;
    }

    /// The system contract routing contract creation on zk chains
    contract ContractDeployer {
        function create(bytes32 salt, bytes32 bytecodeHash, bytes input) external payable returns (address);
    }

    /// The system contract tracking per-account deployment nonces on zk chains
    #[sol(rpc)]
    contract NonceHolder {
        function getDeploymentNonce(address account) external view returns (uint256);
    }
}
