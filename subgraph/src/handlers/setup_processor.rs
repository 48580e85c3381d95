//! Handler for the plugin setup processor.
//!
//! The setup processor emits a preparation event for every plugin in the
//! protocol; only preparations pointing at the tracked plugin repo concern
//! this index.

use crate::{
    context::{DataSourceContext, Template, DAO_ADDRESS_KEY},
    entities::AdminPlugin,
    events::{EventMeta, InstallationPrepared},
    ids,
    runtime::Indexer,
};

/// Reacts to an installation of a plugin version being prepared.
///
/// Preparations referencing another plugin repo are ignored. For tracked
/// preparations the plugin row is written and a plugin data source is spawned
/// at the plugin address, carrying the DAO address in its context.
pub fn handle_installation_prepared(
    indexer: &mut Indexer,
    event: &InstallationPrepared,
    _meta: &EventMeta,
) {
    if event.pluginSetupRepo != indexer.plugin_repo() {
        return;
    }

    let plugin = AdminPlugin {
        id: ids::plugin_entity_id(&event.plugin),
        dao_address: event.dao,
        plugin_address: event.plugin,
    };

    let mut context = DataSourceContext::new();
    context.set_string(DAO_ADDRESS_KEY, ids::address_id(&event.dao));
    indexer.create_data_source(Template::Plugin, event.plugin, context);

    indexer.store.set(&plugin);
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{Address, Bytes, B256};

    use super::handle_installation_prepared;
    use crate::{
        context::{Template, DAO_ADDRESS_KEY},
        entities::AdminPlugin,
        events::{EventMeta, InstallationPrepared, PreparedSetupData, PreparedVersionTag},
        handlers::fixtures::{indexer, ADMIN_ONE, DAO, OTHER_REPO, PLUGIN, PLUGIN_REPO},
        ids,
    };

    fn installation_prepared(repo: Address) -> InstallationPrepared {
        InstallationPrepared {
            sender: ADMIN_ONE,
            dao: DAO,
            preparedSetupId: B256::ZERO,
            pluginSetupRepo: repo,
            versionTag: PreparedVersionTag { release: 1, build: 2 },
            data: Bytes::new(),
            plugin: PLUGIN,
            preparedSetupData: PreparedSetupData {
                helpers: Vec::new(),
                permissions: Vec::new(),
            },
        }
    }

    #[test]
    fn test_installation_prepared_tracked_repo() {
        let mut indexer = indexer();
        let event = installation_prepared(PLUGIN_REPO);
        handle_installation_prepared(&mut indexer, &event, &EventMeta::mock(PLUGIN_REPO));

        let plugin: AdminPlugin = indexer
            .store
            .get(&ids::plugin_entity_id(&PLUGIN))
            .unwrap();
        assert_eq!(plugin.dao_address, DAO);
        assert_eq!(plugin.plugin_address, PLUGIN);

        // A plugin data source is registered with the DAO in its context
        assert_eq!(indexer.data_source_count(Template::Plugin), 1);
        assert!(indexer.data_source_exists(Template::Plugin, PLUGIN));
        let context = indexer.context_of(Template::Plugin, PLUGIN).unwrap();
        assert_eq!(
            context.get_string(DAO_ADDRESS_KEY),
            Some(ids::address_id(&DAO).as_str())
        );
    }

    #[test]
    fn test_installation_prepared_other_repo_ignored() {
        let mut indexer = indexer();
        let event = installation_prepared(OTHER_REPO);
        handle_installation_prepared(&mut indexer, &event, &EventMeta::mock(OTHER_REPO));

        assert_eq!(indexer.store.count::<AdminPlugin>(), 0);
        assert_eq!(indexer.data_source_count(Template::Plugin), 0);
    }
}
