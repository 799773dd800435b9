//! The store-backed resource.

use resty_core::{
    DataFilters, Dataset, HttpError, Item, Operation, RequestContext, Resource,
    ResourceDescriptor,
};
use resty_data::{Entity, QueryBuilder, Record};
use serde_json::Value;
use sqlx::sqlite::SqliteRow;
use sqlx::FromRow;

use crate::bind::{bind_all, bind_all_as};
use crate::error::{rejected, SqlxErrorExt, SqlxResult};
use crate::hooks::{SaveHook, SaveTarget};
use crate::session::{with_session, Session};
use crate::store::SqlxStore;

/// A [`Resource`] persisting entities of type `E` through a [`SqlxStore`].
///
/// Every operation runs in its own [`Session`]. Reads release the session
/// without committing. Mutations stage every item, serialize the result, then
/// commit once; any failure on the way rolls the whole batch back and is
/// reported as `400 Bad Request` carrying the underlying message.
///
/// The data steps and the operations share one session-scoped path per verb:
/// a data step ends with the staged entities, an operation with their
/// serialized form, and both settle the session the same way.
///
/// The descriptor's `id_field` names the key column, its `id_param` the path
/// parameter carrying the key; the two may differ.
///
/// ```ignore
/// let animals = ModelResource::<Animal>::new(
///     store.clone(),
///     ResourceDescriptor::new("Animals")
///         .id_param("animal_id")
///         .serializer(JsonSerializer::new()),
/// )?;
/// let app = resource_router("/animals", animals);
/// ```
pub struct ModelResource<E, H = ()> {
    descriptor: ResourceDescriptor<E>,
    store: SqlxStore,
    hook: H,
}

impl<E: Entity> ModelResource<E> {
    pub fn new(store: SqlxStore, descriptor: ResourceDescriptor<E>) -> Result<Self, HttpError> {
        ModelResource::with_hook(store, descriptor, ())
    }
}

impl<E: Entity, H: SaveHook<E>> ModelResource<E, H> {
    /// Build a resource running `hook` before every save.
    ///
    /// Fails with a configuration error when the entity mapping cannot back
    /// this descriptor: no table, or a key field that is not a column.
    pub fn with_hook(
        store: SqlxStore,
        descriptor: ResourceDescriptor<E>,
        hook: H,
    ) -> Result<Self, HttpError> {
        if E::table_name().is_empty() {
            return Err(HttpError::Configuration(format!(
                "No entity table defined on {}",
                descriptor.name()
            )));
        }
        if !E::has_column(descriptor.id_field_name()) {
            return Err(HttpError::Configuration(format!(
                "Key field '{}' of {} is not a column of '{}'",
                descriptor.id_field_name(),
                descriptor.name(),
                E::table_name()
            )));
        }
        Ok(Self {
            descriptor,
            store,
            hook,
        })
    }

    pub fn store(&self) -> &SqlxStore {
        &self.store
    }

    pub fn hook(&self) -> &H {
        &self.hook
    }

    fn key(&self) -> &str {
        self.descriptor.id_field_name()
    }

    fn query(&self) -> QueryBuilder {
        QueryBuilder::new(E::table_name())
    }

    /// The key an item targets: its own non-empty key field (removed from the
    /// item) or else the path key.
    fn resolve_key(&self, item: &mut Item, fallback_id: Option<&str>) -> Option<Value> {
        match item.remove(self.key()) {
            Some(Value::Null) | None => {}
            Some(Value::String(s)) if s.is_empty() => {}
            Some(id) => return Some(id),
        }
        fallback_id
            .filter(|id| !id.is_empty())
            .map(|id| Value::String(id.to_string()))
    }

    /// Finish a session: commit when the work asks for it, roll back
    /// otherwise or on error.
    async fn settle<T>(
        &self,
        session: Session,
        op: &'static str,
        outcome: Result<(T, bool), HttpError>,
    ) -> Result<T, HttpError> {
        match outcome {
            Ok((value, true)) => {
                session.commit().await.map_err(rejected)?;
                tracing::info!(resource = self.descriptor.name(), operation = op, "committed");
                Ok(value)
            }
            Ok((value, false)) => {
                release(session).await;
                Ok(value)
            }
            Err(err) => {
                tracing::warn!(
                    resource = self.descriptor.name(),
                    operation = op,
                    error = %err,
                    "rolling back"
                );
                release(session).await;
                Err(err)
            }
        }
    }
}

async fn release(session: Session) {
    let id = session.id();
    if let Err(err) = session.rollback().await {
        tracing::warn!(session = id, error = %err, "rollback failed");
    }
}

/// Serializing a mutation result is part of the unit of work: a serializer
/// failure is the client's 400, a missing serializer stays a 500.
fn serialize_failure(err: HttpError) -> HttpError {
    match err {
        HttpError::Internal(msg) => HttpError::BadRequest(msg),
        other => other,
    }
}

impl<E, H> ModelResource<E, H>
where
    E: Entity + for<'r> FromRow<'r, SqliteRow>,
    H: SaveHook<E>,
{
    // ── Statements ──

    async fn fetch_by_key(&self, session: &mut Session, id: &Value) -> SqlxResult<Option<E>> {
        let (sql, params) = self.query().where_eq(self.key(), id.clone()).select()?;
        bind_all_as(sqlx::query_as::<_, E>(&sql), params)
            .fetch_optional(session.conn())
            .await
            .map_err(|e| e.into_data_error())
    }

    async fn fetch_filtered(&self, session: &mut Session, filters: &DataFilters) -> SqlxResult<Vec<E>> {
        let mut query = self.query();
        for (field, value) in filters.iter() {
            if E::has_column(field) {
                query = query.where_eq(field, value);
            } else {
                tracing::debug!(table = E::table_name(), field, "ignoring filter on unknown field");
            }
        }
        let (sql, params) = query.order_by(self.key(), true).select()?;
        bind_all_as(sqlx::query_as::<_, E>(&sql), params)
            .fetch_all(session.conn())
            .await
            .map_err(|e| e.into_data_error())
    }

    async fn insert(&self, session: &mut Session, record: &Record) -> SqlxResult<E> {
        let (sql, params) = self.query().returning_row().insert(record)?;
        bind_all_as(sqlx::query_as::<_, E>(&sql), params)
            .fetch_one(session.conn())
            .await
            .map_err(|e| e.into_data_error())
    }

    async fn update(&self, session: &mut Session, id: Value, record: &Record) -> SqlxResult<Option<E>> {
        let (sql, params) = self
            .query()
            .where_eq(self.key(), id)
            .returning_row()
            .update(record)?;
        bind_all_as(sqlx::query_as::<_, E>(&sql), params)
            .fetch_optional(session.conn())
            .await
            .map_err(|e| e.into_data_error())
    }

    async fn delete_by_key(&self, session: &mut Session, id: Value) -> SqlxResult<u64> {
        let (sql, params) = self.query().where_eq(self.key(), id).delete()?;
        let done = bind_all(sqlx::query(&sql), params)
            .execute(session.conn())
            .await
            .map_err(|e| e.into_data_error())?;
        Ok(done.rows_affected())
    }

    // ── Staging inside an open session ──

    async fn stage_create(
        &self,
        ctx: &RequestContext,
        dataset: Dataset,
        session: &mut Session,
    ) -> Result<Vec<E>, HttpError> {
        let mut created = Vec::with_capacity(dataset.len());
        for item in dataset {
            let record = Record::for_entity::<E>(item);
            let record = self
                .hook
                .before_save(ctx, record, SaveTarget::new_row(), session)
                .await?;
            created.push(self.insert(session, &record).await.map_err(rejected)?);
        }
        Ok(created)
    }

    async fn stage_patch(
        &self,
        ctx: &RequestContext,
        dataset: Dataset,
        fallback_id: Option<&str>,
        session: &mut Session,
    ) -> Result<Vec<Option<E>>, HttpError> {
        let mut patched = Vec::with_capacity(dataset.len());
        for (position, mut item) in dataset.into_iter().enumerate() {
            let Some(id) = self.resolve_key(&mut item, fallback_id) else {
                tracing::debug!(position, "patch item has no key");
                patched.push(None);
                continue;
            };
            let Some(existing) = self.fetch_by_key(session, &id).await.map_err(rejected)? else {
                tracing::debug!(position, key = %id, "patch target not found");
                patched.push(None);
                continue;
            };
            let target = SaveTarget {
                key: Some(&id),
                existing: Some(&existing),
            };
            let record = Record::for_entity::<E>(item);
            let record = self.hook.before_save(ctx, record, target, session).await?;
            let entity = if record.is_empty() {
                Some(existing)
            } else {
                self.update(session, id, &record).await.map_err(rejected)?
            };
            patched.push(entity);
        }
        Ok(patched)
    }

    async fn stage_delete(
        &self,
        dataset: Dataset,
        fallback_id: Option<&str>,
        session: &mut Session,
    ) -> Result<u64, HttpError> {
        let mut deleted = 0;
        for (position, mut item) in dataset.into_iter().enumerate() {
            let Some(id) = self.resolve_key(&mut item, fallback_id) else {
                tracing::debug!(position, "delete item has no key");
                continue;
            };
            deleted += self.delete_by_key(session, id).await.map_err(rejected)?;
        }
        Ok(deleted)
    }

    // ── One session per verb; `finish` runs before the session settles ──

    async fn retrieve_with<R: Send>(
        &self,
        id: &str,
        finish: impl FnOnce(Option<E>) -> Result<R, HttpError> + Send,
    ) -> Result<R, HttpError> {
        let id = Value::String(id.to_string());
        with_session(&self.store, |mut session| async move {
            let outcome = match self.fetch_by_key(&mut session, &id).await {
                Ok(found) => finish(found).map(|out| (out, false)),
                Err(err) => Err(err.into()),
            };
            self.settle(session, "retrieve", outcome).await
        })
        .await
    }

    async fn list_with<R: Send>(
        &self,
        filters: &DataFilters,
        finish: impl FnOnce(Vec<E>) -> Result<R, HttpError> + Send,
    ) -> Result<R, HttpError> {
        with_session(&self.store, |mut session| async move {
            let outcome = match self.fetch_filtered(&mut session, filters).await {
                Ok(rows) => finish(rows).map(|out| (out, false)),
                Err(err) => Err(err.into()),
            };
            self.settle(session, "list", outcome).await
        })
        .await
    }

    async fn create_with<R: Send>(
        &self,
        ctx: &RequestContext,
        dataset: Dataset,
        finish: impl FnOnce(Vec<E>) -> Result<R, HttpError> + Send,
    ) -> Result<R, HttpError> {
        with_session(&self.store, |mut session| async move {
            let outcome = match self.stage_create(ctx, dataset, &mut session).await {
                Ok(created) => finish(created).map(|out| (out, true)),
                Err(err) => Err(err),
            };
            self.settle(session, "create", outcome).await
        })
        .await
    }

    /// Commits only when at least one item resolved to a stored entity.
    async fn patch_with<R: Send>(
        &self,
        ctx: &RequestContext,
        dataset: Dataset,
        fallback_id: Option<&str>,
        finish: impl FnOnce(Vec<Option<E>>) -> Result<R, HttpError> + Send,
    ) -> Result<R, HttpError> {
        with_session(&self.store, |mut session| async move {
            let outcome = match self.stage_patch(ctx, dataset, fallback_id, &mut session).await {
                Ok(patched) => {
                    let any = patched.iter().any(Option::is_some);
                    finish(patched).map(|out| (out, any))
                }
                Err(err) => Err(err),
            };
            self.settle(session, "patch", outcome).await
        })
        .await
    }
}

impl<E, H> Resource for ModelResource<E, H>
where
    E: Entity + for<'r> FromRow<'r, SqliteRow>,
    H: SaveHook<E>,
{
    type Item = E;

    fn descriptor(&self) -> &ResourceDescriptor<E> {
        &self.descriptor
    }

    async fn data_retrieve(&self, _ctx: &RequestContext, id: &str) -> Result<Option<E>, HttpError> {
        self.retrieve_with(id, Ok).await
    }

    async fn data_list(&self, _ctx: &RequestContext, filters: &DataFilters) -> Result<Vec<E>, HttpError> {
        self.list_with(filters, Ok).await
    }

    async fn data_create(&self, ctx: &RequestContext, dataset: Dataset) -> Result<Vec<E>, HttpError> {
        self.create_with(ctx, dataset, Ok).await
    }

    async fn data_patch(
        &self,
        ctx: &RequestContext,
        dataset: Dataset,
        fallback_id: Option<&str>,
    ) -> Result<Vec<Option<E>>, HttpError> {
        self.patch_with(ctx, dataset, fallback_id, Ok).await
    }

    async fn data_delete(
        &self,
        _ctx: &RequestContext,
        dataset: Dataset,
        fallback_id: Option<&str>,
    ) -> Result<(), HttpError> {
        with_session(&self.store, |mut session| async move {
            let outcome = self
                .stage_delete(dataset, fallback_id, &mut session)
                .await
                .map(|deleted| {
                    tracing::debug!(resource = self.descriptor.name(), deleted, "rows deleted");
                    ((), true)
                });
            self.settle(session, "delete", outcome).await
        })
        .await
    }

    // Serialization happens inside the session, so a failing serializer
    // rolls a mutation back.

    async fn retrieve(&self, _ctx: &RequestContext, id: &str) -> Result<Value, HttpError> {
        self.retrieve_with(id, |found| {
            self.descriptor.dump_one(Operation::Retrieve, found.as_ref())
        })
        .await
    }

    async fn list(&self, _ctx: &RequestContext, filters: &DataFilters) -> Result<Value, HttpError> {
        self.list_with(filters, |rows| self.descriptor.dump_many(Operation::List, &rows))
            .await
    }

    async fn create(&self, ctx: &RequestContext, dataset: Dataset) -> Result<Value, HttpError> {
        self.create_with(ctx, dataset, |created| {
            self.descriptor
                .dump_many(Operation::Create, &created)
                .map_err(serialize_failure)
        })
        .await
    }

    async fn patch(
        &self,
        ctx: &RequestContext,
        dataset: Dataset,
        fallback_id: Option<&str>,
    ) -> Result<Value, HttpError> {
        self.patch_with(ctx, dataset, fallback_id, |patched| {
            self.descriptor
                .dump_positional(Operation::Patch, &patched)
                .map_err(serialize_failure)
        })
        .await
    }
}
