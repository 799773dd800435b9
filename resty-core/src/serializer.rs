//! Output serializers: turn items produced by a data step into JSON.
//!
//! A resource carries one optional serializer per operation plus a shared
//! fallback. Resolution for an operation is: operation-specific slot, then the
//! shared slot, then a configuration error raised at dump time.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

/// The four operations that produce serialized output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Retrieve,
    List,
    Create,
    Patch,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Retrieve => "retrieve",
            Operation::List => "list",
            Operation::Create => "create",
            Operation::Patch => "patch",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure to turn an item into JSON.
#[derive(Debug)]
pub enum SerializeError {
    /// The underlying serde serialization failed.
    Serde(serde_json::Error),
    /// The item did not have the shape the serializer expects.
    Shape(String),
}

impl std::fmt::Display for SerializeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SerializeError::Serde(err) => write!(f, "serialization failed: {err}"),
            SerializeError::Shape(msg) => write!(f, "unexpected shape: {msg}"),
        }
    }
}

impl std::error::Error for SerializeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SerializeError::Serde(err) => Some(err),
            SerializeError::Shape(_) => None,
        }
    }
}

impl From<serde_json::Error> for SerializeError {
    fn from(err: serde_json::Error) -> Self {
        SerializeError::Serde(err)
    }
}

/// Produces the JSON representation of one item (`dump` semantics).
pub trait Serializer<T>: Send + Sync {
    fn dump(&self, item: &T) -> Result<Value, SerializeError>;

    fn dump_many(&self, items: &[T]) -> Result<Value, SerializeError> {
        items
            .iter()
            .map(|item| self.dump(item))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array)
    }
}

/// Serializes items with their `serde::Serialize` implementation as-is.
pub struct JsonSerializer<T>(PhantomData<fn(&T)>);

impl<T> JsonSerializer<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for JsonSerializer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Serialize> Serializer<T> for JsonSerializer<T> {
    fn dump(&self, item: &T) -> Result<Value, SerializeError> {
        Ok(serde_json::to_value(item)?)
    }
}

/// Serializes items to an object restricted to a declared set of fields.
///
/// Fields absent from the item are omitted, not emitted as `null`.
///
/// ```ignore
/// let animals = FieldSerializer::<Animal>::new(["name", "legs"]);
/// ```
pub struct FieldSerializer<T> {
    fields: Vec<String>,
    _marker: PhantomData<fn(&T)>,
}

impl<T> FieldSerializer<T> {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            _marker: PhantomData,
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

impl<T: Serialize> Serializer<T> for FieldSerializer<T> {
    fn dump(&self, item: &T) -> Result<Value, SerializeError> {
        let mut source = match serde_json::to_value(item)? {
            Value::Object(map) => map,
            other => {
                return Err(SerializeError::Shape(format!(
                    "expected an object, got {}",
                    json_kind(&other)
                )))
            }
        };
        let mut out = Map::new();
        for field in &self.fields {
            if let Some(value) = source.remove(field) {
                out.insert(field.clone(), value);
            }
        }
        Ok(Value::Object(out))
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// The serializer slots of a resource.
pub struct Serializers<T> {
    shared: Option<Arc<dyn Serializer<T>>>,
    retrieve: Option<Arc<dyn Serializer<T>>>,
    list: Option<Arc<dyn Serializer<T>>>,
    create: Option<Arc<dyn Serializer<T>>>,
    patch: Option<Arc<dyn Serializer<T>>>,
}

impl<T> Serializers<T> {
    pub fn new() -> Self {
        Self {
            shared: None,
            retrieve: None,
            list: None,
            create: None,
            patch: None,
        }
    }

    pub fn set_shared(&mut self, serializer: Arc<dyn Serializer<T>>) {
        self.shared = Some(serializer);
    }

    pub fn set(&mut self, op: Operation, serializer: Arc<dyn Serializer<T>>) {
        let slot = match op {
            Operation::Retrieve => &mut self.retrieve,
            Operation::List => &mut self.list,
            Operation::Create => &mut self.create,
            Operation::Patch => &mut self.patch,
        };
        *slot = Some(serializer);
    }

    /// Resolve the serializer for `op`: specific slot first, then the shared one.
    pub fn resolve(&self, op: Operation) -> Option<&dyn Serializer<T>> {
        let specific = match op {
            Operation::Retrieve => &self.retrieve,
            Operation::List => &self.list,
            Operation::Create => &self.create,
            Operation::Patch => &self.patch,
        };
        specific.as_deref().or(self.shared.as_deref())
    }
}

impl<T> Default for Serializers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Serializers<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
            retrieve: self.retrieve.clone(),
            list: self.list.clone(),
            create: self.create.clone(),
            patch: self.patch.clone(),
        }
    }
}
