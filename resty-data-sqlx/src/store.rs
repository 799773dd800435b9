use std::time::Duration;

use resty_core::config::{ConfigError, RestConfig};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::error::{SqlxErrorExt, SqlxResult};
use crate::session::Session;

/// Pool settings read from the `store.*` configuration keys.
///
/// ```yaml
/// store:
///   url: "sqlite://zoo.db?mode=rwc"
///   max_connections: 5
///   acquire_timeout_secs: 30
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl StoreConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(30),
        }
    }

    pub fn from_config(config: &RestConfig) -> Result<Self, ConfigError> {
        let url: String = config.get("store.url")?;
        let max_connections = config.get_or("store.max_connections", 5u32)?;
        let acquire_timeout = config.get_or("store.acquire_timeout_secs", 30u64)?;
        Ok(Self {
            url,
            max_connections,
            acquire_timeout: Duration::from_secs(acquire_timeout),
        })
    }
}

/// The store engine: a shared SQLite connection pool that hands out sessions.
#[derive(Clone)]
pub struct SqlxStore {
    pool: SqlitePool,
}

impl SqlxStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &StoreConfig) -> SqlxResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.url)
            .await
            .map_err(|e| e.into_data_error())?;
        tracing::info!(max_connections = config.max_connections, "store connected");
        Ok(Self { pool })
    }

    /// Get the underlying pool reference.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn session(&self) -> SqlxResult<Session> {
        Session::begin(&self.pool).await
    }
}
