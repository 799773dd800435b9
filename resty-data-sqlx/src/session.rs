//! Scoped transactional sessions.
//!
//! A [`Session`] owns one pooled connection inside an open transaction. It is
//! released on every exit path: [`Session::commit`] and [`Session::rollback`]
//! consume it, and dropping it returns the connection to the pool with the
//! transaction rolled back.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use sqlx::sqlite::{Sqlite, SqliteConnection, SqlitePool};
use sqlx::Transaction;

use crate::error::{SqlxErrorExt, SqlxResult};
use crate::store::SqlxStore;

static NEXT_SESSION: AtomicU64 = AtomicU64::new(1);

/// A unit of work against the store.
///
/// Committing or rolling back is the caller's decision; the session only
/// guarantees that its connection goes back to the pool.
///
/// ```ignore
/// let mut session = store.session().await?;
/// sqlx::query("DELETE FROM animals").execute(session.conn()).await?;
/// session.commit().await?;
/// ```
pub struct Session {
    tx: Transaction<'static, Sqlite>,
    release: Release,
}

impl Session {
    /// Begin a transaction on a connection acquired from `pool`.
    pub async fn begin(pool: &SqlitePool) -> SqlxResult<Self> {
        let tx = pool.begin().await.map_err(|e| e.into_data_error())?;
        let id = NEXT_SESSION.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(session = id, "session opened");
        Ok(Session {
            tx,
            release: Release { id, outcome: None },
        })
    }

    pub fn id(&self) -> u64 {
        self.release.id
    }

    /// The connection to run statements on.
    pub fn conn(&mut self) -> &mut SqliteConnection {
        &mut self.tx
    }

    pub async fn commit(self) -> SqlxResult<()> {
        let Session { tx, mut release } = self;
        let result = tx.commit().await.map_err(|e| e.into_data_error());
        release.outcome = Some(if result.is_ok() { "committed" } else { "commit failed" });
        result
    }

    pub async fn rollback(self) -> SqlxResult<()> {
        let Session { tx, mut release } = self;
        let result = tx.rollback().await.map_err(|e| e.into_data_error());
        release.outcome = Some(if result.is_ok() { "rolled back" } else { "rollback failed" });
        result
    }
}

/// Logs how a session ended once its transaction is gone.
struct Release {
    id: u64,
    outcome: Option<&'static str>,
}

impl Drop for Release {
    fn drop(&mut self) {
        match self.outcome {
            Some(outcome) => tracing::debug!(session = self.id, outcome, "session released"),
            None => tracing::debug!(session = self.id, "session dropped, rolling back"),
        }
    }
}

/// Run `scope` with a fresh session from `store`.
///
/// The session is moved into the scope and released when the scope's future
/// completes or is dropped, whether it returns `Ok`, returns `Err`, or
/// unwinds. Committing is up to the scope.
///
/// ```ignore
/// let count = with_session(&store, |mut session| async move {
///     let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM animals")
///         .fetch_one(session.conn())
///         .await
///         .map_err(|e| e.into_data_error())?;
///     Ok::<_, DataError>(row.0)
/// })
/// .await?;
/// ```
pub async fn with_session<F, Fut, T, E>(store: &SqlxStore, scope: F) -> Result<T, E>
where
    F: FnOnce(Session) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: From<resty_data::DataError>,
{
    let session = store.session().await?;
    scope(session).await
}
