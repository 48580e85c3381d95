//! Common types used by the deploy scripts and the subgraph handlers

use std::fmt::{self, Display};

use alloy::primitives::{Address, Bytes};
use serde::{Deserialize, Serialize};

/// A two-level plugin version identifier.
///
/// Matches the on-chain widths used by the plugin repo: releases are `uint8`,
/// builds are `uint16`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionTag {
    /// The release number, incremented for breaking changes
    pub release: u8,
    /// The build number, incremented for compatible changes within a release
    pub build: u16,
}

impl VersionTag {
    /// Constructs a version tag
    pub const fn new(release: u8, build: u16) -> Self {
        Self { release, build }
    }
}

impl Display for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.release, self.build)
    }
}

/// The governance proposal payload written when the deployer is not allowed
/// to publish a version directly.
///
/// The field names follow the JSON shape consumed by the management DAO
/// proposal tooling.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalPayload {
    /// The proposal title
    pub proposal_title: String,
    /// The one-line proposal summary
    pub proposal_summary: String,
    /// The long-form proposal description
    pub proposal_description: String,
    /// The actions the proposal should execute
    pub actions: Vec<ProposalAction>,
}

/// A single proposed action: a `createVersion` call on the plugin repo
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalAction {
    /// The plugin repo address the call targets
    pub to: Address,
    /// The decoded `createVersion` arguments
    pub create_version: CreateVersionArgs,
    /// The abi-encoded `createVersion` calldata
    pub calldata: Bytes,
}

/// The arguments of a `createVersion` call, named as the Solidity parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateVersionArgs {
    /// The targeted release number
    #[serde(rename = "_release")]
    pub release: u8,
    /// The address of the plugin setup contract being published
    #[serde(rename = "_pluginSetup")]
    pub plugin_setup: Address,
    /// The UTF-8 bytes of the build metadata URI
    #[serde(rename = "_buildMetadata")]
    pub build_metadata: Bytes,
    /// The UTF-8 bytes of the release metadata URI
    #[serde(rename = "_releaseMetadata")]
    pub release_metadata: Bytes,
}
