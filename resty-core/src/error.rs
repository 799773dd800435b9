use crate::http::header::ALLOW;
use crate::http::response::{IntoResponse, Response};
use crate::http::{HeaderValue, Json, Method, StatusCode};

/// Helper to create a JSON error response with a standard `{ "error": message }` body.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let body = serde_json::json!({ "error": message.into() });
    (status, Json(body)).into_response()
}

/// Client- and server-visible failures of the resource pipeline.
///
/// | Variant | Status | Raised when |
/// |---------|--------|-------------|
/// | `NotFound` | 404 | explicit lookups in custom resources (the built-in pipeline never 404s) |
/// | `BadRequest` | 400 | malformed bodies, storage or serialization failures during a mutation |
/// | `MethodNotAllowed` | 405 | the verb is not in the resource's allowed set |
/// | `Configuration` | 500 | missing serializer or invalid entity mapping |
/// | `Internal` | 500 | storage failures outside a mutation |
pub enum HttpError {
    NotFound(String),
    BadRequest(String),
    MethodNotAllowed { allowed: Vec<Method> },
    Configuration(String),
    Internal(String),
}

impl HttpError {
    pub fn status(&self) -> StatusCode {
        match self {
            HttpError::NotFound(_) => StatusCode::NOT_FOUND,
            HttpError::BadRequest(_) => StatusCode::BAD_REQUEST,
            HttpError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            HttpError::Configuration(_) | HttpError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Build the 400-class error used when a mutation has been rolled back.
    pub fn bad_request(err: impl std::fmt::Display) -> Self {
        HttpError::BadRequest(err.to_string())
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        match self {
            HttpError::MethodNotAllowed { allowed } => {
                let names: Vec<&str> = allowed.iter().map(Method::as_str).collect();
                let body = serde_json::json!({
                    "error": "Method not allowed",
                    "allowed": names,
                });
                let mut resp = (StatusCode::METHOD_NOT_ALLOWED, Json(body)).into_response();
                if let Ok(value) = HeaderValue::from_str(&names.join(", ")) {
                    resp.headers_mut().insert(ALLOW, value);
                }
                resp
            }
            other => {
                let status = other.status();
                let message = match other {
                    HttpError::NotFound(msg)
                    | HttpError::BadRequest(msg)
                    | HttpError::Configuration(msg)
                    | HttpError::Internal(msg) => msg,
                    HttpError::MethodNotAllowed { .. } => unreachable!(),
                };
                error_response(status, message)
            }
        }
    }
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpError::NotFound(msg) => write!(f, "Not Found: {msg}"),
            HttpError::BadRequest(msg) => write!(f, "Bad Request: {msg}"),
            HttpError::MethodNotAllowed { allowed } => {
                let names: Vec<&str> = allowed.iter().map(Method::as_str).collect();
                write!(f, "Method Not Allowed (allowed: [{}])", names.join(", "))
            }
            HttpError::Configuration(msg) => write!(f, "Configuration Error: {msg}"),
            HttpError::Internal(msg) => write!(f, "Internal Error: {msg}"),
        }
    }
}

impl std::fmt::Debug for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        <Self as std::fmt::Display>::fmt(self, f)
    }
}

impl std::error::Error for HttpError {}

impl From<serde_json::Error> for HttpError {
    fn from(err: serde_json::Error) -> Self {
        HttpError::BadRequest(err.to_string())
    }
}
