//! In-process HTTP testing for resty routers.

mod app;
mod response;

pub use app::{TestApp, TestRequest};
pub use response::{resolve_path, tokenize_path, PathToken, TestResponse};
