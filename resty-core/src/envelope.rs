use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::http::response::{IntoResponse, Response};
use crate::http::{Json, StatusCode};

/// The `{ "timestamp": ..., "data": ... }` wrapper applied to every verb's result.
///
/// The timestamp is taken when the envelope is built, in ISO-8601 (RFC 3339) form
/// with microsecond precision.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T = Value> {
    pub timestamp: String,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn new(data: T) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            data,
        }
    }
}

impl Envelope<Value> {
    /// The payload returned by every successful DELETE.
    pub fn deleted() -> Self {
        Self::new(serde_json::json!({ "status": "deleted" }))
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_is_rfc3339() {
        let env = Envelope::new(Value::Null);
        assert!(chrono::DateTime::parse_from_rfc3339(&env.timestamp).is_ok());
    }

    #[test]
    fn deleted_payload() {
        let env = Envelope::deleted();
        assert_eq!(env.data, serde_json::json!({ "status": "deleted" }));
        let json = serde_json::to_value(&env).unwrap();
        assert!(json["timestamp"].is_string());
    }
}
