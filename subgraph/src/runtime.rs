//! The indexing state a handler invocation runs against: the entity store,
//! the set of registered data-source instances, and the static configuration
//! of the index (the tracked plugin repo).
//!
//! The surrounding runtime delivers events one at a time in chain order, so
//! handlers never deal with concurrency; everything they write here is
//! visible to the next invocation.

use alloy::primitives::Address;

use crate::context::{DataSourceContext, DataSourceInstance, Template};
use crate::store::EntityStore;

/// The mutable indexing state shared by all handler invocations
#[derive(Clone, Debug)]
pub struct Indexer {
    /// The plugin repo whose installations this index tracks; preparation
    /// events referencing any other repo are ignored
    plugin_repo: Address,
    /// The entity store
    pub store: EntityStore,
    /// The registered data-source instances, in creation order
    data_sources: Vec<DataSourceInstance>,
}

impl Indexer {
    /// Constructs an indexer tracking the given plugin repo
    pub fn new(plugin_repo: Address) -> Self {
        Self { plugin_repo, store: EntityStore::new(), data_sources: Vec::new() }
    }

    /// The plugin repo this index tracks
    pub fn plugin_repo(&self) -> Address {
        self.plugin_repo
    }

    /// Registers a data-source instance for a template rooted at `address`.
    ///
    /// Registering the same (template, address) pair again is a no-op, the
    /// original context stays attached.
    pub fn create_data_source(
        &mut self,
        template: Template,
        address: Address,
        context: DataSourceContext,
    ) {
        if self.data_source_exists(template, address) {
            return;
        }

        self.data_sources.push(DataSourceInstance { template, address, context });
    }

    /// Counts the registered instances of a template
    pub fn data_source_count(&self, template: Template) -> usize {
        self.data_sources.iter().filter(|ds| ds.template == template).count()
    }

    /// Returns whether an instance of `template` rooted at `address` exists
    pub fn data_source_exists(&self, template: Template, address: Address) -> bool {
        self.context_of(template, address).is_some()
    }

    /// The context of the instance of `template` rooted at `address`
    pub fn context_of(&self, template: Template, address: Address) -> Option<&DataSourceContext> {
        self.data_sources
            .iter()
            .find(|ds| ds.template == template && ds.address == address)
            .map(|ds| &ds.context)
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::address;

    use super::*;

    #[test]
    fn test_data_source_registration() {
        let mut indexer = Indexer::new(address!("0000000000000000000000000000000000000001"));
        let plugin = address!("0000000000000000000000000000000000000002");

        let mut context = DataSourceContext::new();
        context.set_string("daoAddress", "0x03");

        assert_eq!(indexer.data_source_count(Template::Plugin), 0);
        indexer.create_data_source(Template::Plugin, plugin, context.clone());

        assert_eq!(indexer.data_source_count(Template::Plugin), 1);
        assert!(indexer.data_source_exists(Template::Plugin, plugin));
        assert_eq!(indexer.context_of(Template::Plugin, plugin), Some(&context));

        // Re-registration keeps the original context
        let mut replacement = DataSourceContext::new();
        replacement.set_string("daoAddress", "0x04");
        indexer.create_data_source(Template::Plugin, plugin, replacement);

        assert_eq!(indexer.data_source_count(Template::Plugin), 1);
        assert_eq!(indexer.context_of(Template::Plugin, plugin), Some(&context));
    }
}
