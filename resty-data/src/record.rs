//! Staged column values for one insert or update.

use serde_json::{Map, Value};

use crate::entity::Entity;

/// Column values staged for a single statement.
///
/// Built from a request item with [`Record::for_entity`], which keeps only the
/// keys the entity declares as columns. Save hooks receive and return a
/// `Record`, so they can inspect, enrich, or strip values before persistence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    values: Map<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep the keys of `item` that are columns of `E`; drop the rest.
    pub fn for_entity<E: Entity>(item: Map<String, Value>) -> Self {
        let mut values = Map::new();
        for (key, value) in item {
            if E::has_column(&key) {
                values.insert(key, value);
            } else {
                tracing::debug!(table = E::table_name(), field = %key, "dropping unknown field");
            }
        }
        Self { values }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(column.into(), value.into())
    }

    pub fn remove(&mut self, column: &str) -> Option<Value> {
        self.values.remove(column)
    }

    pub fn contains_key(&self, column: &str) -> bool {
        self.values.contains_key(column)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.values
    }
}

impl From<Map<String, Value>> for Record {
    fn from(values: Map<String, Value>) -> Self {
        Self { values }
    }
}
