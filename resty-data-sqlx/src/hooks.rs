use std::future::Future;

use resty_core::{HttpError, RequestContext};
use resty_data::Record;
use serde_json::Value;

use crate::session::Session;

/// The row a staged record is about to be written to.
///
/// A create has neither a key nor an existing entity. A patch carries the
/// resolved key (already removed from the record) and the entity as it is
/// stored before the update.
#[derive(Debug)]
pub struct SaveTarget<'a, E> {
    pub key: Option<&'a Value>,
    pub existing: Option<&'a E>,
}

impl<E> SaveTarget<'_, E> {
    pub(crate) fn new_row() -> Self {
        SaveTarget { key: None, existing: None }
    }

    pub fn is_new(&self) -> bool {
        self.existing.is_none()
    }
}

impl<E> Clone for SaveTarget<'_, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for SaveTarget<'_, E> {}

/// Extension point run on every staged record of a create or patch, after
/// unknown fields were dropped and before the statement executes.
///
/// Return the (possibly modified) record to persist it, or an error to abort
/// the whole operation. The error is returned to the client unchanged after
/// the session rolls back.
///
/// ```ignore
/// struct KeepLegs;
///
/// impl SaveHook<Animal> for KeepLegs {
///     async fn before_save(
///         &self,
///         _ctx: &RequestContext,
///         record: Record,
///         target: SaveTarget<'_, Animal>,
///         _session: &mut Session,
///     ) -> Result<Record, HttpError> {
///         let lost = target.existing.is_some_and(|a| a.legs > 0)
///             && record.get("legs") == Some(&serde_json::json!(0));
///         if lost {
///             return Err(HttpError::BadRequest("animals keep their legs".into()));
///         }
///         Ok(record)
///     }
/// }
/// ```
pub trait SaveHook<E>: Send + Sync + 'static {
    fn before_save(
        &self,
        _ctx: &RequestContext,
        record: Record,
        _target: SaveTarget<'_, E>,
        _session: &mut Session,
    ) -> impl Future<Output = Result<Record, HttpError>> + Send {
        async move { Ok(record) }
    }
}

/// No hook: records are saved as staged.
impl<E> SaveHook<E> for () {}
