//! HTTP re-exports from Axum, so resources and tests depend on one path.

pub use axum::http::request::Parts;
pub use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri};
pub use axum::{serve, Json, Router};
pub use bytes::Bytes;

pub mod body {
    pub use axum::body::Body;
}

pub mod response {
    pub use axum::response::{IntoResponse, Response};
}

pub mod extract {
    pub use axum::extract::{FromRequestParts, RawPathParams, State};
}

pub mod routing {
    pub use axum::routing::{delete, get, patch, post, MethodRouter};
}
