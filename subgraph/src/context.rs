//! Per-data-source context and the dynamic templates handlers instantiate.
//!
//! When a handler discovers a new contract worth indexing it registers a
//! template instance rooted at that contract, together with an immutable
//! string-keyed context later handler invocations read their scope from.

use std::{
    collections::BTreeMap,
    fmt::{self, Display},
};

use alloy::primitives::Address;

/// The context key carrying the owning DAO address of a plugin instance
pub const DAO_ADDRESS_KEY: &str = "daoAddress";

/// The context key carrying the plugin address a membership source tracks
pub const PLUGIN_ADDRESS_KEY: &str = "pluginAddress";

/// The context key carrying the permission id a membership source tracks
pub const PERMISSION_ID_KEY: &str = "permissionId";

/// The dynamic data-source templates handlers can instantiate
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Template {
    /// Indexes one Admin plugin instance (proposal and membership events)
    Plugin,
    /// Indexes permission events on a DAO on behalf of one plugin instance
    AdminMembers,
}

impl Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Template::Plugin => write!(f, "Plugin"),
            Template::AdminMembers => write!(f, "AdminMembers"),
        }
    }
}

/// An immutable string-keyed context attached to a data-source instance
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DataSourceContext {
    /// The context entries
    entries: BTreeMap<String, String>,
}

impl DataSourceContext {
    /// Constructs an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a string entry
    pub fn set_string(&mut self, key: &str, value: impl Into<String>) {
        self.entries.insert(key.to_string(), value.into());
    }

    /// Reads a string entry
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

/// A registered data-source instance: a template rooted at a contract
/// address, carrying the context it was created with
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataSourceInstance {
    /// The template the instance runs
    pub template: Template,
    /// The contract address the instance indexes
    pub address: Address,
    /// The context attached at creation time, immutable afterwards
    pub context: DataSourceContext,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_entries() {
        let mut context = DataSourceContext::new();
        assert!(context.get_string(DAO_ADDRESS_KEY).is_none());

        context.set_string(DAO_ADDRESS_KEY, "0x00");
        assert_eq!(context.get_string(DAO_ADDRESS_KEY), Some("0x00"));
    }
}
