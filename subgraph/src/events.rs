//! The on-chain events the handlers consume, with decoding helpers.
//!
//! Event shapes follow the plugin setup processor, the Admin plugin, and the
//! DAO permission manager. Signatures are type-only, so the field spellings
//! here (`where_` for the reserved word) do not affect topic hashes.

#![allow(missing_docs)]

use alloy::{
    primitives::{Address, Log, B256},
    sol,
    sol_types::SolEvent,
};

sol! {
    /// A single call bundled into a proposal
    #[derive(Debug, PartialEq)]
    struct DaoAction {
        /// The call target
        address to;
        /// The native token value sent with the call
        uint256 value;
        /// The encoded calldata
        bytes data;
    }

    /// The (release, build) pair of a prepared plugin version
    #[derive(Debug, PartialEq)]
    struct PreparedVersionTag {
        /// The release number
        uint8 release;
        /// The build number
        uint16 build;
    }

    /// A permission operation requested by a plugin setup
    #[derive(Debug, PartialEq)]
    struct MultiTargetPermission {
        /// The operation kind (grant, revoke, grant-with-condition)
        uint8 operation;
        /// The contract the permission applies on
        address where_;
        /// The address receiving or losing the permission
        address who;
        /// The condition contract, zero when unconditional
        address condition;
        /// The permission id
        bytes32 permissionId;
    }

    /// The helpers and permissions returned by a plugin setup preparation
    #[derive(Debug, PartialEq)]
    struct PreparedSetupData {
        /// Helper contracts deployed alongside the plugin
        address[] helpers;
        /// Permission operations the installer must apply
        MultiTargetPermission[] permissions;
    }

    /// Emitted by the plugin setup processor when an installation of some
    /// plugin version has been prepared for a DAO
    #[derive(Debug, PartialEq)]
    event InstallationPrepared(
        address indexed sender,
        address indexed dao,
        bytes32 preparedSetupId,
        address indexed pluginSetupRepo,
        PreparedVersionTag versionTag,
        bytes data,
        address plugin,
        PreparedSetupData preparedSetupData
    );

    /// Emitted by an Admin plugin when a proposal is created
    #[derive(Debug, PartialEq)]
    event ProposalCreated(
        uint256 indexed proposalId,
        address indexed creator,
        uint64 startDate,
        uint64 endDate,
        bytes metadata,
        DaoAction[] actions,
        uint256 allowFailureMap
    );

    /// Emitted by an Admin plugin when a proposal has been executed
    #[derive(Debug, PartialEq)]
    event ProposalExecuted(uint256 indexed proposalId);

    /// Emitted by an Admin plugin announcing the contract its membership is
    /// defined on, i.e. the DAO holding the execute-proposal permission
    #[derive(Debug, PartialEq)]
    event MembershipContractAnnounced(address indexed definingContract);

    /// Emitted by a DAO's permission manager when a permission is granted
    #[derive(Debug, PartialEq)]
    event Granted(
        bytes32 indexed permissionId,
        address indexed here,
        address where_,
        address indexed who,
        address condition
    );

    /// Emitted by a DAO's permission manager when a permission is revoked
    #[derive(Debug, PartialEq)]
    event Revoked(
        bytes32 indexed permissionId,
        address indexed here,
        address where_,
        address indexed who
    );
}

/// Chain-level metadata accompanying a decoded event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EventMeta {
    /// The address of the emitting contract
    pub address: Address,
    /// The timestamp of the containing block
    pub block_timestamp: u64,
    /// The hash of the containing transaction
    pub transaction_hash: B256,
}

impl EventMeta {
    /// Constructs event metadata
    pub fn new(address: Address, block_timestamp: u64, transaction_hash: B256) -> Self {
        Self { address, block_timestamp, transaction_hash }
    }

    /// Constructs placeholder metadata for an event emitted by `address`
    #[cfg(test)]
    pub fn mock(address: Address) -> Self {
        Self::new(address, 1, B256::ZERO)
    }
}

/// Decodes a typed event from a raw log
pub fn decode_event<E: SolEvent>(log: &Log) -> Result<E, alloy::sol_types::Error> {
    E::decode_log(log).map(|decoded| decoded.data)
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{address, bytes, U256};

    use super::*;

    #[test]
    fn test_decode_proposal_created() {
        let plugin = address!("0000000000000000000000000000000000000aaa");
        let event = ProposalCreated {
            proposalId: U256::from(7),
            creator: address!("0000000000000000000000000000000000000bbb"),
            startDate: 10,
            endDate: 20,
            metadata: bytes!("697066733a2f2f6d31"),
            actions: vec![DaoAction {
                to: address!("0000000000000000000000000000000000000ccc"),
                value: U256::ZERO,
                data: bytes!("00000000"),
            }],
            allowFailureMap: U256::ZERO,
        };

        let log = Log { address: plugin, data: event.encode_log_data() };

        let decoded: ProposalCreated = decode_event(&log).unwrap();
        assert_eq!(decoded, event);
    }

    #[test]
    fn test_decode_wrong_event() {
        let event = ProposalExecuted { proposalId: U256::from(1) };
        let log = Log {
            address: address!("0000000000000000000000000000000000000aaa"),
            data: event.encode_log_data(),
        };

        assert!(decode_event::<ProposalCreated>(&log).is_err());
    }
}
