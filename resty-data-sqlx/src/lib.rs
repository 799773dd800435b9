//! # resty-data-sqlx: SQLx backend for resty
//!
//! This crate backs resty resources with a SQLite database through
//! [SQLx](https://github.com/launchbadge/sqlx). It depends on [`resty-data`]
//! for the entity mapping and statement builder, and adds the store, the
//! scoped session, and the store-backed resource.
//!
//! # What's in this crate
//!
//! | Type | Description |
//! |------|-------------|
//! | [`SqlxStore`] | Shared connection pool handing out sessions |
//! | [`StoreConfig`] | Pool settings read from `store.*` configuration keys |
//! | [`Session`] | One transaction on one pooled connection, released on every exit path |
//! | [`with_session`] | Runs a scope with a fresh session |
//! | [`ModelResource`] | `Resource` implementation persisting an [`Entity`](resty_data::Entity) |
//! | [`SaveHook`] | Validation/enrichment step run before each save |
//! | [`SaveTarget`] | The key and stored entity a save is aimed at |
//! | [`SqlxErrorExt`] | Extension trait to convert `sqlx::Error` → `DataError` (`.into_data_error()`) |
//! | [`SqlxResult<T>`] | Type alias for `Result<T, DataError>` |
//!
//! # Quick start
//!
//! ```ignore
//! use resty_core::prelude::*;
//! use resty_data_sqlx::{ModelResource, SqlxStore, StoreConfig};
//!
//! #[derive(serde::Serialize, sqlx::FromRow)]
//! struct Animal { id: i64, name: Option<String>, legs: i64 }
//!
//! impl resty_data::Entity for Animal {
//!     fn table_name() -> &'static str { "animals" }
//!     fn columns() -> &'static [&'static str] { &["id", "name", "legs"] }
//! }
//!
//! let store = SqlxStore::connect(&StoreConfig::new("sqlite::memory:")).await?;
//! let animals = ModelResource::<Animal>::new(
//!     store,
//!     ResourceDescriptor::new("Animals").serializer(JsonSerializer::new()),
//! )?;
//! let app = resource_router("/animals", animals);
//! ```
//!
//! # Transactions
//!
//! Every `ModelResource` operation opens its own [`Session`]:
//!
//! - **Reads** (retrieve, list) serialize inside the session and roll it back.
//! - **Mutations** (create, patch, delete) stage every item, serialize the
//!   result, and commit once. Any failure rolls the batch back and surfaces as
//!   `400 Bad Request` with the underlying message.
//! - A dropped session rolls back and returns its connection to the pool.
//!
//! # Error bridging
//!
//! Due to Rust's orphan rules, `From<sqlx::Error> for DataError` can't be
//! implemented here. Use the [`SqlxErrorExt`] trait instead:
//!
//! ```ignore
//! use resty_data_sqlx::SqlxErrorExt;
//!
//! let row = sqlx::query("SELECT ...")
//!     .fetch_one(session.conn())
//!     .await
//!     .map_err(|e| e.into_data_error())?;
//! ```

mod bind;
pub mod error;
pub mod hooks;
pub mod resource;
pub mod session;
pub mod store;

pub use error::{SqlxErrorExt, SqlxResult};
pub use hooks::{SaveHook, SaveTarget};
pub use resource::ModelResource;
pub use session::{with_session, Session};
pub use store::{SqlxStore, StoreConfig};

/// Re-exports of the most commonly used types from both `resty-data` and this crate.
pub mod prelude {
    pub use crate::{
        with_session, ModelResource, SaveHook, SaveTarget, Session, SqlxErrorExt, SqlxStore,
        StoreConfig,
    };
    pub use resty_data::prelude::*;
}
