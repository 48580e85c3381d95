//! The entity rows the handlers maintain.
//!
//! Field names serialize in the schema's camelCase so that stored rows match
//! the queryable shape exposed by the index.

use alloy::primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

use crate::store::Entity;

/// An installed Admin plugin instance
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminPlugin {
    /// The entity id, the plugin contract address
    pub id: String,
    /// The address of the DAO the plugin is installed into
    pub dao_address: Address,
    /// The plugin contract address
    pub plugin_address: Address,
}

impl Entity for AdminPlugin {
    const KIND: &'static str = "AdminPlugin";

    fn id(&self) -> &str {
        &self.id
    }
}

/// A proposal created on an Admin plugin.
///
/// Created exactly once per (plugin, proposal id) pair; later mutated only to
/// flip `executed` and attach the execution transaction hash.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminProposal {
    /// The entity id, derived from the plugin address and proposal id
    pub id: String,
    /// The address of the DAO the proposal executes against
    pub dao_address: Address,
    /// The id of the `AdminPlugin` entity the proposal belongs to
    pub plugin: String,
    /// The proposal id as numbered by the plugin contract
    pub plugin_proposal_id: U256,
    /// The proposal creator
    pub creator: Address,
    /// The proposal metadata, decoded from the event's metadata bytes
    pub metadata: String,
    /// Whether the proposal has been executed
    pub executed: bool,
    /// The block timestamp at creation
    pub created_at: u64,
    /// The proposal start date
    pub start_date: u64,
    /// The proposal end date
    pub end_date: u64,
    /// The id of the `Administrator` entity that created the proposal
    pub administrator: String,
    /// The allow-failure bitmap carried by the proposal
    pub allow_failure_map: U256,
    /// The hash of the executing transaction, set when `executed` flips
    pub execution_tx_hash: Option<B256>,
}

impl Entity for AdminProposal {
    const KIND: &'static str = "AdminProposal";

    fn id(&self) -> &str {
        &self.id
    }
}

/// A single encoded call of a proposal, immutable once saved
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    /// The entity id, derived from plugin, DAO, call id, and action index
    pub id: String,
    /// The call target
    pub to: Address,
    /// The native token value sent with the call
    pub value: U256,
    /// The encoded calldata
    pub data: Bytes,
    /// The address of the DAO the action executes against
    pub dao_address: Address,
    /// The id of the `AdminProposal` entity the action belongs to
    pub proposal: String,
}

impl Entity for Action {
    const KIND: &'static str = "Action";

    fn id(&self) -> &str {
        &self.id
    }
}

/// An address holding (or having held) administrator rights on some plugin.
///
/// Never deleted: an address may administer several plugins and keeps its
/// historical identity after a revoke.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Administrator {
    /// The entity id, the administrator address
    pub id: String,
    /// The administrator address, in entity-id form
    pub address: String,
}

impl Entity for Administrator {
    const KIND: &'static str = "Administrator";

    fn id(&self) -> &str {
        &self.id
    }
}

/// A membership row linking an administrator to one Admin plugin.
///
/// Created on grant, deleted on revoke of the tracked permission.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdministratorAdminPlugin {
    /// The entity id, derived from the plugin and administrator addresses
    pub id: String,
    /// The id of the `Administrator` entity
    pub administrator: String,
    /// The id of the `AdminPlugin` entity
    pub plugin: String,
}

impl Entity for AdministratorAdminPlugin {
    const KIND: &'static str = "AdministratorAdminPlugin";

    fn id(&self) -> &str {
        &self.id
    }
}
