//! Mounting a [`Resource`] on an axum [`Router`].

use std::sync::Arc;

use serde_json::Value;

use crate::envelope::Envelope;
use crate::error::HttpError;
use crate::http::extract::State;
use crate::http::routing::{get, MethodRouter};
use crate::http::{Bytes, Router};
use crate::request::RequestContext;
use crate::resource::Resource;

/// Build a router serving `resource` at `path` (collection) and
/// `path/{id_param}` (single item). Both routes accept GET, POST, PATCH and
/// DELETE; other verbs get axum's default 405.
///
/// ```ignore
/// let app = Router::new()
///     .merge(resource_router("/animals", animals))
///     .merge(resource_router("/zoos/{zoo_id}/keepers", keepers));
/// ```
pub fn resource_router<R: Resource>(path: &str, resource: R) -> Router {
    let resource = Arc::new(resource);
    let base = path.trim_end_matches('/');
    let collection = if base.is_empty() { "/".to_string() } else { base.to_string() };
    let item = format!("{base}/{{{}}}", resource.descriptor().id_param_name());

    tracing::debug!(
        resource = resource.descriptor().name(),
        collection = %collection,
        item = %item,
        "mounting resource"
    );

    Router::new()
        .route(&collection, verbs::<R>())
        .route(&item, verbs::<R>())
        .with_state(resource)
}

fn verbs<R: Resource>() -> MethodRouter<Arc<R>> {
    get(get_handler::<R>)
        .post(post_handler::<R>)
        .patch(patch_handler::<R>)
        .delete(delete_handler::<R>)
}

/// Decode a raw request body. An empty body is `null`.
pub fn decode_body(body: &[u8]) -> Result<Value, HttpError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body).map_err(|e| HttpError::BadRequest(format!("invalid JSON body: {e}")))
}

async fn get_handler<R: Resource>(
    State(resource): State<Arc<R>>,
    ctx: RequestContext,
) -> Result<Envelope, HttpError> {
    resource.handle_get(&ctx).await
}

async fn post_handler<R: Resource>(
    State(resource): State<Arc<R>>,
    ctx: RequestContext,
    body: Bytes,
) -> Result<Envelope, HttpError> {
    let body = decode_body(&body)?;
    resource.handle_post(&ctx, body).await
}

async fn patch_handler<R: Resource>(
    State(resource): State<Arc<R>>,
    ctx: RequestContext,
    body: Bytes,
) -> Result<Envelope, HttpError> {
    let body = decode_body(&body)?;
    resource.handle_patch(&ctx, body).await
}

async fn delete_handler<R: Resource>(
    State(resource): State<Arc<R>>,
    ctx: RequestContext,
    body: Bytes,
) -> Result<Envelope, HttpError> {
    let body = decode_body(&body)?;
    resource.handle_delete(&ctx, body).await
}
