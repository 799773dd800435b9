//! resty: declarative REST resources over axum.
//!
//! This facade crate re-exports the resty sub-crates through a single
//! dependency with feature flags. Import everything you need with:
//!
//! ```ignore
//! use resty::prelude::*;
//! ```
//!
//! # Feature flags
//!
//! | Feature     | Default | Crate                        |
//! |-------------|---------|------------------------------|
//! | `data`      | **yes** | `resty-data` (abstractions)  |
//! | `data-sqlx` | **yes** | `resty-data-sqlx` (SQLite)   |

pub extern crate resty_core;

// Re-export everything from resty-core at the top level for convenience.
pub use resty_core::*;

#[cfg(feature = "data")]
pub use resty_data;

#[cfg(feature = "data-sqlx")]
pub use resty_data_sqlx;

/// Unified prelude. Import everything with `use resty::prelude::*`.
pub mod prelude {
    pub use resty_core::prelude::*;

    #[cfg(feature = "data")]
    pub use resty_data::prelude::*;

    #[cfg(feature = "data-sqlx")]
    pub use resty_data_sqlx::prelude::*;
}
