//! Handlers for permission events on a plugin's membership contract.
//!
//! A members data source is registered on the DAO when a plugin announces
//! its membership contract. The DAO's permission manager emits grants and
//! revokes for every permission it manages, so each event is screened
//! against the plugin address and permission id carried in the data source
//! context before it touches the store.

use alloy::primitives::{Address, B256};

use crate::{
    context::{DataSourceContext, PERMISSION_ID_KEY, PLUGIN_ADDRESS_KEY},
    entities::{Administrator, AdministratorAdminPlugin},
    events::{EventMeta, Granted, Revoked},
    ids,
    runtime::Indexer,
};

/// Whether a permission event concerns the tracked plugin and permission
fn is_tracked(context: &DataSourceContext, permission_id: &B256, on: &Address) -> bool {
    context.get_string(PERMISSION_ID_KEY) == Some(ids::bytes32_id(permission_id).as_str())
        && context.get_string(PLUGIN_ADDRESS_KEY) == Some(ids::address_id(on).as_str())
}

/// Records a newly granted administrator of the tracked plugin.
///
/// Both the administrator row and the membership row are upserted, so a
/// repeated grant or one preceded by a proposal from the same address is a
/// no-op.
pub fn handle_granted(
    indexer: &mut Indexer,
    context: &DataSourceContext,
    event: &Granted,
    _meta: &EventMeta,
) {
    if !is_tracked(context, &event.permissionId, &event.where_) {
        return;
    }

    let administrator_id = ids::administrator_entity_id(&event.who);
    if !indexer.store.contains::<Administrator>(&administrator_id) {
        indexer.store.set(&Administrator {
            id: administrator_id.clone(),
            address: administrator_id.clone(),
        });
    }

    let membership_id = ids::administrator_plugin_entity_id(&event.where_, &event.who);
    if !indexer.store.contains::<AdministratorAdminPlugin>(&membership_id) {
        indexer.store.set(&AdministratorAdminPlugin {
            id: membership_id,
            administrator: administrator_id,
            plugin: ids::plugin_entity_id(&event.where_),
        });
    }
}

/// Removes the membership row of a revoked administrator.
///
/// The administrator row itself stays; the address keeps its identity and
/// may still administer other plugins.
pub fn handle_revoked(
    indexer: &mut Indexer,
    context: &DataSourceContext,
    event: &Revoked,
    _meta: &EventMeta,
) {
    if !is_tracked(context, &event.permissionId, &event.where_) {
        return;
    }

    let membership_id = ids::administrator_plugin_entity_id(&event.where_, &event.who);
    indexer.store.remove::<AdministratorAdminPlugin>(&membership_id);
}
