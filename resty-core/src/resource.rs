//! The verb-to-operation pipeline.
//!
//! Each verb handler gates the method, normalizes its input, runs one
//! operation, and wraps the result in an [`Envelope`]:
//!
//! | Verb | Operation | Payload |
//! |------|-----------|---------|
//! | `GET` with key parameter | `retrieve` | one item or `null` |
//! | `GET` without key parameter | `list` | array |
//! | `POST` | `create` | array |
//! | `PATCH` | `patch` | array, `null` where an item did not resolve |
//! | `DELETE` | `delete` | `{"status": "deleted"}` |
//!
//! Every operation is a data step followed by a serialize step. Storage-aware
//! resources override the data steps, or the whole operation when it must run
//! inside a session.

use std::future::Future;

use serde_json::Value;

use crate::dataset::{DataFilters, Dataset};
use crate::descriptor::ResourceDescriptor;
use crate::envelope::Envelope;
use crate::error::HttpError;
use crate::http::Method;
use crate::request::RequestContext;
use crate::serializer::Operation;

/// A REST resource: per-verb handlers built from overridable data steps.
///
/// Uses RPITIT (return-position `impl Trait` in traits); implementors may write
/// `async fn` for any method.
pub trait Resource: Send + Sync + 'static {
    /// What the data steps produce and the serializers consume.
    type Item: Send + Sync + 'static;

    fn descriptor(&self) -> &ResourceDescriptor<Self::Item>;

    /// Filters for a list request. Defaults to the non-key path parameters
    /// followed by the query parameters.
    fn data_filters(&self, ctx: &RequestContext) -> DataFilters {
        DataFilters::from_request(ctx, self.descriptor().id_param_name())
    }

    // ── Data steps ──────────────────────────────────────────────────────

    fn data_retrieve(
        &self,
        ctx: &RequestContext,
        id: &str,
    ) -> impl Future<Output = Result<Option<Self::Item>, HttpError>> + Send;

    fn data_list(
        &self,
        _ctx: &RequestContext,
        _filters: &DataFilters,
    ) -> impl Future<Output = Result<Vec<Self::Item>, HttpError>> + Send {
        async { Ok(Vec::new()) }
    }

    fn data_create(
        &self,
        ctx: &RequestContext,
        dataset: Dataset,
    ) -> impl Future<Output = Result<Vec<Self::Item>, HttpError>> + Send;

    fn data_patch(
        &self,
        ctx: &RequestContext,
        dataset: Dataset,
        fallback_id: Option<&str>,
    ) -> impl Future<Output = Result<Vec<Option<Self::Item>>, HttpError>> + Send;

    fn data_delete(
        &self,
        _ctx: &RequestContext,
        _dataset: Dataset,
        _fallback_id: Option<&str>,
    ) -> impl Future<Output = Result<(), HttpError>> + Send {
        async { Ok(()) }
    }

    // ── Operations ──────────────────────────────────────────────────────

    fn retrieve(
        &self,
        ctx: &RequestContext,
        id: &str,
    ) -> impl Future<Output = Result<Value, HttpError>> + Send {
        async move {
            let item = self.data_retrieve(ctx, id).await?;
            self.descriptor().dump_one(Operation::Retrieve, item.as_ref())
        }
    }

    fn list(
        &self,
        ctx: &RequestContext,
        filters: &DataFilters,
    ) -> impl Future<Output = Result<Value, HttpError>> + Send {
        async move {
            let items = self.data_list(ctx, filters).await?;
            self.descriptor().dump_many(Operation::List, &items)
        }
    }

    fn create(
        &self,
        ctx: &RequestContext,
        dataset: Dataset,
    ) -> impl Future<Output = Result<Value, HttpError>> + Send {
        async move {
            let items = self.data_create(ctx, dataset).await?;
            self.descriptor().dump_many(Operation::Create, &items)
        }
    }

    fn patch(
        &self,
        ctx: &RequestContext,
        dataset: Dataset,
        fallback_id: Option<&str>,
    ) -> impl Future<Output = Result<Value, HttpError>> + Send {
        async move {
            let items = self.data_patch(ctx, dataset, fallback_id).await?;
            self.descriptor().dump_positional(Operation::Patch, &items)
        }
    }

    fn delete(
        &self,
        ctx: &RequestContext,
        dataset: Dataset,
        fallback_id: Option<&str>,
    ) -> impl Future<Output = Result<(), HttpError>> + Send {
        self.data_delete(ctx, dataset, fallback_id)
    }

    // ── Verb handlers ───────────────────────────────────────────────────

    fn handle_get(
        &self,
        ctx: &RequestContext,
    ) -> impl Future<Output = Result<Envelope, HttpError>> + Send {
        async move {
            let descriptor = self.descriptor();
            descriptor.check_method(&Method::GET)?;
            let data = match ctx.path_param(descriptor.id_param_name()) {
                Some(id) => self.retrieve(ctx, id).await?,
                None => {
                    let filters = self.data_filters(ctx);
                    self.list(ctx, &filters).await?
                }
            };
            Ok(Envelope::new(data))
        }
    }

    fn handle_post(
        &self,
        ctx: &RequestContext,
        body: Value,
    ) -> impl Future<Output = Result<Envelope, HttpError>> + Send {
        async move {
            self.descriptor().check_method(&Method::POST)?;
            let dataset = Dataset::from_body(body)?;
            let data = self.create(ctx, dataset).await?;
            Ok(Envelope::new(data))
        }
    }

    fn handle_patch(
        &self,
        ctx: &RequestContext,
        body: Value,
    ) -> impl Future<Output = Result<Envelope, HttpError>> + Send {
        async move {
            let descriptor = self.descriptor();
            descriptor.check_method(&Method::PATCH)?;
            let fallback_id = ctx.path_param(descriptor.id_param_name());
            let dataset = Dataset::from_body(body)?.or_single_empty(fallback_id);
            let data = self.patch(ctx, dataset, fallback_id).await?;
            Ok(Envelope::new(data))
        }
    }

    fn handle_delete(
        &self,
        ctx: &RequestContext,
        body: Value,
    ) -> impl Future<Output = Result<Envelope, HttpError>> + Send {
        async move {
            let descriptor = self.descriptor();
            descriptor.check_method(&Method::DELETE)?;
            let fallback_id = ctx.path_param(descriptor.id_param_name());
            let dataset = Dataset::from_body(body)?.or_single_empty(fallback_id);
            self.delete(ctx, dataset, fallback_id).await?;
            Ok(Envelope::deleted())
        }
    }
}

/// A resource without storage.
///
/// Retrieve yields an empty object, list an empty array, create and patch echo
/// their input, and delete does nothing. Useful as a stub endpoint and as the
/// reference behavior of the pipeline.
pub struct BaseResource {
    descriptor: ResourceDescriptor<Value>,
}

impl BaseResource {
    pub fn new(descriptor: ResourceDescriptor<Value>) -> Self {
        Self { descriptor }
    }
}

impl Resource for BaseResource {
    type Item = Value;

    fn descriptor(&self) -> &ResourceDescriptor<Value> {
        &self.descriptor
    }

    async fn data_retrieve(&self, _ctx: &RequestContext, _id: &str) -> Result<Option<Value>, HttpError> {
        Ok(Some(Value::Object(Default::default())))
    }

    async fn data_create(&self, _ctx: &RequestContext, dataset: Dataset) -> Result<Vec<Value>, HttpError> {
        Ok(dataset.into_iter().map(Value::Object).collect())
    }

    async fn data_patch(
        &self,
        _ctx: &RequestContext,
        dataset: Dataset,
        _fallback_id: Option<&str>,
    ) -> Result<Vec<Option<Value>>, HttpError> {
        Ok(dataset.into_iter().map(|item| Some(Value::Object(item))).collect())
    }
}
