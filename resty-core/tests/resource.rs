use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use resty_core::http::Method;
use resty_core::prelude::*;
use serde_json::{json, Value};

// ─── Fixtures ───

fn animals() -> ResourceDescriptor<Value> {
    ResourceDescriptor::new("BaseRequestEndpoint")
        .id_param("another_id")
        .id_field("yet_another_id")
        .serializer(FieldSerializer::new(["name", "legs"]))
}

/// A resource that counts every data step it runs.
struct CountingResource {
    descriptor: ResourceDescriptor<Value>,
    calls: Arc<AtomicUsize>,
}

impl CountingResource {
    fn new(descriptor: ResourceDescriptor<Value>) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let resource = Self {
            descriptor,
            calls: calls.clone(),
        };
        (resource, calls)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl Resource for CountingResource {
    type Item = Value;

    fn descriptor(&self) -> &ResourceDescriptor<Value> {
        &self.descriptor
    }

    async fn data_retrieve(&self, _ctx: &RequestContext, id: &str) -> Result<Option<Value>, HttpError> {
        self.hit();
        Ok(Some(json!({ "id": id })))
    }

    async fn data_list(&self, _ctx: &RequestContext, filters: &DataFilters) -> Result<Vec<Value>, HttpError> {
        self.hit();
        Ok(filters
            .iter()
            .map(|(k, v)| {
                let mut item = serde_json::Map::new();
                item.insert(k.to_string(), Value::from(v));
                Value::Object(item)
            })
            .collect())
    }

    async fn data_create(&self, _ctx: &RequestContext, dataset: Dataset) -> Result<Vec<Value>, HttpError> {
        self.hit();
        Ok(dataset.into_iter().map(Value::Object).collect())
    }

    async fn data_patch(
        &self,
        _ctx: &RequestContext,
        dataset: Dataset,
        fallback_id: Option<&str>,
    ) -> Result<Vec<Option<Value>>, HttpError> {
        self.hit();
        Ok(dataset
            .into_iter()
            .map(|mut item| {
                let id = item.remove("id").or_else(|| fallback_id.map(Value::from))?;
                item.insert("id".into(), id);
                Some(Value::Object(item))
            })
            .collect())
    }

    async fn data_delete(
        &self,
        _ctx: &RequestContext,
        _dataset: Dataset,
        _fallback_id: Option<&str>,
    ) -> Result<(), HttpError> {
        self.hit();
        Ok(())
    }
}

// ─── Base resource ───

#[tokio::test]
async fn list_without_key_returns_empty_array() {
    let resource = BaseResource::new(animals());
    let envelope = resource.handle_get(&RequestContext::new(Method::GET)).await.unwrap();
    assert_eq!(envelope.data, json!([]));
    assert!(!envelope.timestamp.is_empty());
}

#[tokio::test]
async fn retrieve_uses_id_param_name() {
    let resource = BaseResource::new(animals());

    // `id` is not the configured key parameter, so this is a list.
    let ctx = RequestContext::new(Method::GET).with_path_param("id", "3");
    assert_eq!(resource.handle_get(&ctx).await.unwrap().data, json!([]));

    let ctx = RequestContext::new(Method::GET).with_path_param("another_id", "3");
    assert_eq!(resource.handle_get(&ctx).await.unwrap().data, json!({}));
}

#[tokio::test]
async fn post_single_object_yields_one_element() {
    let resource = BaseResource::new(animals());
    let envelope = resource
        .handle_post(
            &RequestContext::new(Method::POST),
            json!({"name": "cat", "legs": 4, "color": "black"}),
        )
        .await
        .unwrap();
    assert_eq!(envelope.data, json!([{"name": "cat", "legs": 4}]));
}

#[tokio::test]
async fn post_array_is_echoed_through_serializer() {
    let resource = BaseResource::new(animals());
    let envelope = resource
        .handle_post(
            &RequestContext::new(Method::POST),
            json!([{"name": "cat"}, {"name": "spider", "legs": 8}]),
        )
        .await
        .unwrap();
    assert_eq!(envelope.data, json!([{"name": "cat"}, {"name": "spider", "legs": 8}]));
}

#[tokio::test]
async fn patch_echoes_input() {
    let resource = BaseResource::new(animals());
    let ctx = RequestContext::new(Method::PATCH).with_path_param("another_id", "1");
    let envelope = resource.handle_patch(&ctx, json!({"legs": 3})).await.unwrap();
    assert_eq!(envelope.data, json!([{"legs": 3}]));
}

#[tokio::test]
async fn delete_returns_status_object() {
    let resource = BaseResource::new(animals());
    let ctx = RequestContext::new(Method::DELETE).with_path_param("another_id", "1");
    let envelope = resource.handle_delete(&ctx, Value::Null).await.unwrap();
    assert_eq!(envelope.data, json!({"status": "deleted"}));
}

#[tokio::test]
async fn missing_serializer_is_configuration_error() {
    let resource = BaseResource::new(ResourceDescriptor::new("NoSerializer"));
    let err = resource
        .handle_get(&RequestContext::new(Method::GET))
        .await
        .unwrap_err();
    match err {
        HttpError::Configuration(msg) => {
            assert_eq!(msg, "No list_serializer or serializer defined on NoSerializer")
        }
        other => panic!("expected Configuration, got {other:?}"),
    }
}

#[tokio::test]
async fn operation_serializer_overrides_shared() {
    let descriptor = animals().create_serializer(JsonSerializer::new());
    let resource = BaseResource::new(descriptor);
    let envelope = resource
        .handle_post(&RequestContext::new(Method::POST), json!({"name": "cat", "color": "black"}))
        .await
        .unwrap();
    assert_eq!(envelope.data, json!([{"name": "cat", "color": "black"}]));
}

#[tokio::test]
async fn scalar_body_is_bad_request() {
    let resource = BaseResource::new(animals());
    let err = resource
        .handle_post(&RequestContext::new(Method::POST), json!("cat"))
        .await
        .unwrap_err();
    assert!(matches!(err, HttpError::BadRequest(_)));
}

// ─── Method gate ───

#[tokio::test]
async fn no_allowed_methods_means_every_verb_reachable() {
    let (resource, calls) = CountingResource::new(animals());
    let ctx = RequestContext::new(Method::GET);

    assert!(resource.handle_get(&ctx).await.is_ok());
    assert!(resource.handle_post(&ctx, json!({})).await.is_ok());
    assert!(resource.handle_patch(&ctx, json!({})).await.is_ok());
    assert!(resource.handle_delete(&ctx, json!({})).await.is_ok());
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn empty_allowed_methods_rejects_before_any_data_step() {
    let (resource, calls) = CountingResource::new(animals().allowed_methods([]));
    let ctx = RequestContext::new(Method::GET).with_path_param("another_id", "1");

    let results = [
        resource.handle_get(&ctx).await,
        resource.handle_post(&ctx, json!({})).await,
        resource.handle_patch(&ctx, json!({})).await,
        resource.handle_delete(&ctx, json!({})).await,
    ];
    for result in results {
        assert!(matches!(result, Err(HttpError::MethodNotAllowed { .. })));
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn partial_allowed_set() {
    let (resource, calls) =
        CountingResource::new(animals().allowed_methods([Method::GET, Method::DELETE]));
    let ctx = RequestContext::new(Method::GET);

    assert!(resource.handle_get(&ctx).await.is_ok());
    match resource.handle_post(&ctx, json!({})).await {
        Err(HttpError::MethodNotAllowed { allowed }) => {
            assert_eq!(allowed, vec![Method::GET, Method::DELETE])
        }
        other => panic!("expected MethodNotAllowed, got {other:?}"),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

// ─── Data steps ───

#[tokio::test]
async fn list_receives_derived_filters() {
    let descriptor = ResourceDescriptor::new("Keepers").serializer(JsonSerializer::new());
    let (resource, _) = CountingResource::new(descriptor);
    let ctx = RequestContext::new(Method::GET)
        .with_path_param("zoo_id", "7")
        .with_query_param("legs", "4");
    let envelope = resource.handle_get(&ctx).await.unwrap();
    assert_eq!(envelope.data, json!([{"zoo_id": "7"}, {"legs": "4"}]));
}

#[tokio::test]
async fn patch_reports_unresolved_items_as_null() {
    let descriptor = ResourceDescriptor::new("Things").serializer(JsonSerializer::new());
    let (resource, _) = CountingResource::new(descriptor);
    let ctx = RequestContext::new(Method::PATCH);
    let envelope = resource
        .handle_patch(&ctx, json!([{"id": 1, "a": true}, {"a": false}]))
        .await
        .unwrap();
    assert_eq!(envelope.data, json!([{"id": 1, "a": true}, null]));
}

#[tokio::test]
async fn patch_without_body_targets_path_key() {
    let descriptor = ResourceDescriptor::new("Things").serializer(JsonSerializer::new());
    let (resource, _) = CountingResource::new(descriptor);
    let ctx = RequestContext::new(Method::PATCH).with_path_param("id", "5");
    let envelope = resource.handle_patch(&ctx, Value::Null).await.unwrap();
    assert_eq!(envelope.data, json!([{"id": "5"}]));
}
