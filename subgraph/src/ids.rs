//! Deterministic entity id constructors.
//!
//! All ids are derived from event data so that reindexing produces the same
//! rows. Composite ids join their fields with [`ID_SEPARATOR`] in the
//! documented order; addresses and 32-byte values are rendered as
//! `0x`-prefixed lowercase hex, unsigned integers in an id as minimal
//! lowercase hex (proposal ids) or decimal (action indices and call ids).

use alloy::primitives::{Address, B256, U256};

/// The separator joining the fields of a composite entity id
pub const ID_SEPARATOR: &str = "_";

/// Renders an address as a `0x`-prefixed lowercase hex entity id
pub fn address_id(address: &Address) -> String {
    format!("0x{}", hex::encode(address))
}

/// Renders a 32-byte value as a `0x`-prefixed lowercase hex string,
/// the format permission ids take inside a data-source context
pub fn bytes32_id(value: &B256) -> String {
    format!("0x{}", hex::encode(value))
}

/// The id of an `AdminPlugin` entity: the plugin contract address
pub fn plugin_entity_id(plugin: &Address) -> String {
    address_id(plugin)
}

/// The id of an `Administrator` entity: the administrator address
pub fn administrator_entity_id(administrator: &Address) -> String {
    address_id(administrator)
}

/// The id of an `AdminProposal` entity.
///
/// Field order: plugin address, then the on-chain proposal id in minimal
/// lowercase hex.
pub fn proposal_entity_id(plugin: &Address, proposal_id: U256) -> String {
    [address_id(plugin), format!("0x{proposal_id:x}")].join(ID_SEPARATOR)
}

/// The id of an `Action` entity.
///
/// Field order: calling plugin address, DAO address, the call id (the
/// decimal proposal id for Admin plugin proposals), then the zero-based
/// action index in decimal.
pub fn action_entity_id(caller: &Address, dao: &Address, call_id: &str, index: usize) -> String {
    [
        address_id(caller),
        address_id(dao),
        call_id.to_string(),
        index.to_string(),
    ]
    .join(ID_SEPARATOR)
}

/// The id of an `AdministratorAdminPlugin` membership row.
///
/// Field order: plugin address, then administrator address.
pub fn administrator_plugin_entity_id(plugin: &Address, administrator: &Address) -> String {
    [address_id(plugin), address_id(administrator)].join(ID_SEPARATOR)
}
