use serde_json::{Map, Value};

use crate::error::HttpError;
use crate::request::RequestContext;
use crate::serializer::json_kind;

/// One entity-shaped mapping of a request payload.
pub type Item = Map<String, Value>;

/// The payload of a mutating verb, normalized to a sequence of items.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    items: Vec<Item>,
}

impl Dataset {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    /// Normalize a decoded request body.
    ///
    /// An array yields its elements, a single object is promoted to a
    /// one-element dataset, and `null` (no body) yields an empty dataset.
    /// Scalars, and arrays containing non-objects, are rejected.
    pub fn from_body(body: Value) -> Result<Self, HttpError> {
        match body {
            Value::Null => Ok(Self::default()),
            Value::Object(item) => Ok(Self { items: vec![item] }),
            Value::Array(values) => {
                let mut items = Vec::with_capacity(values.len());
                for (idx, value) in values.into_iter().enumerate() {
                    match value {
                        Value::Object(item) => items.push(item),
                        other => {
                            return Err(HttpError::BadRequest(format!(
                                "item {idx} must be an object, got {}",
                                json_kind(&other)
                            )))
                        }
                    }
                }
                Ok(Self { items })
            }
            other => Err(HttpError::BadRequest(format!(
                "request body must be an object or an array of objects, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Ensure there is at least one item when a fallback key is available,
    /// so that `PATCH /things/{id}` or `DELETE /things/{id}` without a body
    /// still targets the path key.
    pub fn or_single_empty(mut self, fallback_id: Option<&str>) -> Self {
        if self.items.is_empty() && fallback_id.is_some() {
            self.items.push(Item::new());
        }
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }

    pub fn into_items(self) -> Vec<Item> {
        self.items
    }
}

impl IntoIterator for Dataset {
    type Item = Item;
    type IntoIter = std::vec::IntoIter<Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl From<Vec<Item>> for Dataset {
    fn from(items: Vec<Item>) -> Self {
        Self::new(items)
    }
}

/// Field-equality constraints applied to list queries (implicit AND).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataFilters {
    pairs: Vec<(String, String)>,
}

impl DataFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive filters from a request: path parameters other than the key
    /// parameter, then query parameters. A later occurrence of a field
    /// replaces an earlier one.
    pub fn from_request(ctx: &RequestContext, id_param: &str) -> Self {
        let mut filters = Self::new();
        for (name, value) in ctx.path_params() {
            if name != id_param {
                filters.insert(name, value);
            }
        }
        for (name, value) in ctx.query() {
            filters.insert(name, value);
        }
        filters
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        let field = field.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(name, _)| *name == field) {
            Some(existing) => existing.1 = value,
            None => self.pairs.push((field, value)),
        }
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
