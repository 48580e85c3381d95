//! The entity store the handlers project events into.
//!
//! The real indexing runtime persists entities in an external database the
//! handlers only ever reach through load/save operations. This module keeps
//! the same surface over an in-memory map: rows are keyed by entity kind and
//! id, and a save within one handler invocation is visible to every later
//! load.

use std::collections::BTreeMap;

use serde::{de::DeserializeOwned, Serialize};

/// A row type storable in the entity store
pub trait Entity: Serialize + DeserializeOwned {
    /// The entity kind name the rows of this type are stored under
    const KIND: &'static str;

    /// The id of this row
    fn id(&self) -> &str;
}

/// An in-memory entity store keyed by entity kind and id
#[derive(Clone, Debug, Default)]
pub struct EntityStore {
    /// Serialized rows keyed by (kind, id)
    rows: BTreeMap<(String, String), serde_json::Value>,
}

impl EntityStore {
    /// Constructs an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the entity of type `E` with the given id, if present
    pub fn get<E: Entity>(&self, id: &str) -> Option<E> {
        let value = self.rows.get(&(E::KIND.to_string(), id.to_string()))?;
        // Rows are only ever written through `set`, so they deserialize back
        // into the entity type they were stored under
        serde_json::from_value(value.clone()).ok()
    }

    /// Saves an entity row, overwriting any previous row with the same id
    pub fn set<E: Entity>(&mut self, entity: &E) {
        match serde_json::to_value(entity) {
            Ok(value) => {
                self.rows
                    .insert((E::KIND.to_string(), entity.id().to_string()), value);
            }
            // Entity rows are plain serializable structs, this only fires on
            // a malformed entity definition
            Err(err) => tracing::error!("failed to serialize {} row: {err}", E::KIND),
        }
    }

    /// Removes the row of type `E` with the given id, if present
    pub fn remove<E: Entity>(&mut self, id: &str) {
        self.rows.remove(&(E::KIND.to_string(), id.to_string()));
    }

    /// Returns whether a row of type `E` with the given id exists
    pub fn contains<E: Entity>(&self, id: &str) -> bool {
        self.rows
            .contains_key(&(E::KIND.to_string(), id.to_string()))
    }

    /// Counts the rows stored under the entity kind of `E`
    pub fn count<E: Entity>(&self) -> usize {
        self.rows.keys().filter(|(kind, _)| kind == E::KIND).count()
    }

    /// Removes every row from the store
    pub fn clear(&mut self) {
        self.rows.clear();
    }
}

#[cfg(test)]
mod tests {
    use rand::{thread_rng, Rng};
    use serde::Deserialize;

    use super::*;

    /// A minimal entity used to exercise the store
    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct TestRow {
        /// The row id
        id: String,
        /// An arbitrary payload field
        label: String,
    }

    impl Entity for TestRow {
        const KIND: &'static str = "TestRow";

        fn id(&self) -> &str {
            &self.id
        }
    }

    #[test]
    fn test_set_get_roundtrip() {
        let mut store = EntityStore::new();
        let row = TestRow { id: "a".into(), label: "one".into() };

        assert!(store.get::<TestRow>("a").is_none());
        store.set(&row);

        assert_eq!(store.get::<TestRow>("a").unwrap(), row);
        assert_eq!(store.count::<TestRow>(), 1);
    }

    #[test]
    fn test_set_overwrites() {
        let mut store = EntityStore::new();
        store.set(&TestRow { id: "a".into(), label: "one".into() });
        store.set(&TestRow { id: "a".into(), label: "two".into() });

        assert_eq!(store.count::<TestRow>(), 1);
        assert_eq!(store.get::<TestRow>("a").unwrap().label, "two");
    }

    #[test]
    fn test_remove() {
        let mut store = EntityStore::new();
        store.set(&TestRow { id: "a".into(), label: "one".into() });
        store.set(&TestRow { id: "b".into(), label: "two".into() });

        store.remove::<TestRow>("a");

        assert!(!store.contains::<TestRow>("a"));
        assert!(store.contains::<TestRow>("b"));
        assert_eq!(store.count::<TestRow>(), 1);
    }

    #[test]
    fn test_many_rows_roundtrip() {
        let mut rng = thread_rng();
        let mut store = EntityStore::new();

        let rows: Vec<TestRow> = (0..50)
            .map(|i| TestRow {
                id: format!("row-{i}"),
                label: rng.gen::<u64>().to_string(),
            })
            .collect();
        for row in &rows {
            store.set(row);
        }

        assert_eq!(store.count::<TestRow>(), rows.len());
        for row in &rows {
            assert_eq!(&store.get::<TestRow>(&row.id).unwrap(), row);
        }
    }
}
