use std::sync::Arc;

use serde_json::Value;

use crate::error::HttpError;
use crate::http::Method;
use crate::serializer::{Operation, Serializer, Serializers};

/// The verbs a resource can serve.
pub const ALL_METHODS: [Method; 4] = [Method::GET, Method::POST, Method::PATCH, Method::DELETE];

/// Per-endpoint configuration, built once at route registration.
///
/// Every optional knob has a defined default:
///
/// | Field | Default |
/// |-------|---------|
/// | `id_param` (URL parameter) | `"id"` |
/// | `id_field` (entity key field) | `"id"` |
/// | `allowed_methods` | unset: every verb allowed |
/// | serializers | none: dumping fails with a configuration error |
///
/// ```ignore
/// let descriptor = ResourceDescriptor::new("AnimalResource")
///     .id_param("animal_id")
///     .serializer(FieldSerializer::new(["name", "legs"]))
///     .allowed_methods([Method::GET, Method::POST]);
/// ```
pub struct ResourceDescriptor<T> {
    name: String,
    id_param: String,
    id_field: String,
    allowed_methods: Option<Vec<Method>>,
    serializers: Serializers<T>,
}

impl<T> ResourceDescriptor<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id_param: "id".to_string(),
            id_field: "id".to_string(),
            allowed_methods: None,
            serializers: Serializers::new(),
        }
    }

    /// Name of the URL path parameter carrying the key.
    pub fn id_param(mut self, id_param: impl Into<String>) -> Self {
        self.id_param = id_param.into();
        self
    }

    /// Name of the entity's key field.
    pub fn id_field(mut self, id_field: impl Into<String>) -> Self {
        self.id_field = id_field.into();
        self
    }

    /// Restrict the verbs this resource serves. An empty set rejects every verb.
    pub fn allowed_methods(mut self, methods: impl IntoIterator<Item = Method>) -> Self {
        self.allowed_methods = Some(methods.into_iter().collect());
        self
    }

    /// Shared fallback serializer for every operation.
    pub fn serializer(mut self, serializer: impl Serializer<T> + 'static) -> Self {
        self.serializers.set_shared(Arc::new(serializer));
        self
    }

    /// Serializer for one operation, taking precedence over the shared one.
    pub fn serializer_for(mut self, op: Operation, serializer: impl Serializer<T> + 'static) -> Self {
        self.serializers.set(op, Arc::new(serializer));
        self
    }

    pub fn retrieve_serializer(self, serializer: impl Serializer<T> + 'static) -> Self {
        self.serializer_for(Operation::Retrieve, serializer)
    }

    pub fn list_serializer(self, serializer: impl Serializer<T> + 'static) -> Self {
        self.serializer_for(Operation::List, serializer)
    }

    pub fn create_serializer(self, serializer: impl Serializer<T> + 'static) -> Self {
        self.serializer_for(Operation::Create, serializer)
    }

    pub fn patch_serializer(self, serializer: impl Serializer<T> + 'static) -> Self {
        self.serializer_for(Operation::Patch, serializer)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id_param_name(&self) -> &str {
        &self.id_param
    }

    pub fn id_field_name(&self) -> &str {
        &self.id_field
    }

    pub fn allowed(&self) -> Option<&[Method]> {
        self.allowed_methods.as_deref()
    }

    pub fn is_allowed(&self, method: &Method) -> bool {
        match &self.allowed_methods {
            Some(methods) => methods.contains(method),
            None => true,
        }
    }

    /// Gate a verb against the allowed set.
    pub fn check_method(&self, method: &Method) -> Result<(), HttpError> {
        if self.is_allowed(method) {
            return Ok(());
        }
        tracing::debug!(resource = %self.name, %method, "method rejected");
        Err(HttpError::MethodNotAllowed {
            allowed: self.allowed_methods.clone().unwrap_or_default(),
        })
    }

    /// Resolve the serializer for `op`, or fail with a configuration error
    /// naming the missing serializer and this resource.
    pub fn resolve_serializer(&self, op: Operation) -> Result<&dyn Serializer<T>, HttpError> {
        self.serializers.resolve(op).ok_or_else(|| {
            HttpError::Configuration(format!(
                "No {op}_serializer or serializer defined on {}",
                self.name
            ))
        })
    }

    /// Dump a single (possibly absent) item. An absent item becomes `null`.
    pub fn dump_one(&self, op: Operation, item: Option<&T>) -> Result<Value, HttpError> {
        let serializer = self.resolve_serializer(op)?;
        match item {
            Some(item) => serializer.dump(item).map_err(|e| self.dump_failed(op, e)),
            None => Ok(Value::Null),
        }
    }

    pub fn dump_many(&self, op: Operation, items: &[T]) -> Result<Value, HttpError> {
        let serializer = self.resolve_serializer(op)?;
        serializer.dump_many(items).map_err(|e| self.dump_failed(op, e))
    }

    /// Dump a positional result list where unresolved entries are `None`;
    /// each `None` becomes `null` at its position.
    pub fn dump_positional(&self, op: Operation, items: &[Option<T>]) -> Result<Value, HttpError> {
        let serializer = self.resolve_serializer(op)?;
        items
            .iter()
            .map(|item| match item {
                Some(item) => serializer.dump(item).map_err(|e| self.dump_failed(op, e)),
                None => Ok(Value::Null),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array)
    }

    fn dump_failed(&self, op: Operation, err: impl std::fmt::Display) -> HttpError {
        HttpError::Internal(format!("{op} serialization failed on {}: {err}", self.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serializer::JsonSerializer;
    use serde_json::json;

    #[test]
    fn defaults() {
        let d = ResourceDescriptor::<Value>::new("Things");
        assert_eq!(d.id_param_name(), "id");
        assert_eq!(d.id_field_name(), "id");
        assert!(d.allowed().is_none());
        for method in ALL_METHODS {
            assert!(d.check_method(&method).is_ok());
        }
    }

    #[test]
    fn id_param_and_field_are_independent() {
        let d = ResourceDescriptor::<Value>::new("Things")
            .id_param("another_id")
            .id_field("yet_another_id");
        assert_eq!(d.id_param_name(), "another_id");
        assert_eq!(d.id_field_name(), "yet_another_id");
    }

    #[test]
    fn empty_allowed_set_rejects_everything() {
        let d = ResourceDescriptor::<Value>::new("Things").allowed_methods([]);
        for method in ALL_METHODS {
            match d.check_method(&method) {
                Err(HttpError::MethodNotAllowed { allowed }) => assert!(allowed.is_empty()),
                other => panic!("expected MethodNotAllowed, got {other:?}"),
            }
        }
    }

    #[test]
    fn missing_serializer_names_operation_and_resource() {
        let d = ResourceDescriptor::<Value>::new("AnimalResource");
        let err = d.dump_many(Operation::List, &[]).unwrap_err();
        match err {
            HttpError::Configuration(msg) => {
                assert!(msg.contains("list_serializer"));
                assert!(msg.contains("AnimalResource"));
            }
            other => panic!("expected Configuration, got {other:?}"),
        }
    }

    #[test]
    fn positional_dump_keeps_nulls() {
        let d = ResourceDescriptor::<Value>::new("Things").serializer(JsonSerializer::new());
        let out = d
            .dump_positional(Operation::Patch, &[Some(json!({"a": 1})), None])
            .unwrap();
        assert_eq!(out, json!([{"a": 1}, null]));
    }

    #[test]
    fn absent_single_item_is_null() {
        let d = ResourceDescriptor::<Value>::new("Things").serializer(JsonSerializer::new());
        assert_eq!(d.dump_one(Operation::Retrieve, None).unwrap(), Value::Null);
    }
}
