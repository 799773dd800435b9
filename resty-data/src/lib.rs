//! # resty-data
//!
//! Backend-agnostic pieces of the store-backed resource: the [`Entity`]
//! field-mapping table, the [`Record`] staging map that filters request items
//! down to assignable columns, the statement [`QueryBuilder`], and
//! [`DataError`]. Drivers live in backend crates such as `resty-data-sqlx`.

pub mod entity;
pub mod error;
pub mod query;
pub mod record;

pub use entity::Entity;
pub use error::DataError;
pub use query::{QueryBuilder, QueryError, Statement};
pub use record::Record;

pub mod prelude {
    //! Re-exports of the most commonly used data types.
    pub use crate::{DataError, Entity, QueryBuilder, Record};
}
