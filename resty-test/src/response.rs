use bytes::Bytes;
use http::header::{HeaderMap, HeaderName};
use http::StatusCode;
use http_body_util::BodyExt;
use resty_core::http::response::Response;
use serde::de::DeserializeOwned;
use serde_json::Value;

// ─── JSON path resolution ───

#[derive(Debug, Clone, PartialEq)]
pub enum PathToken {
    Field(String),
    Index(usize),
    Len,
}

/// Split `data[0].name` or `data.len()` into tokens.
pub fn tokenize_path(path: &str) -> Vec<PathToken> {
    let mut tokens = Vec::new();
    for segment in path.split('.').filter(|s| !s.is_empty()) {
        if segment == "len()" {
            tokens.push(PathToken::Len);
            continue;
        }
        let (field, mut rest) = match segment.find('[') {
            Some(pos) => segment.split_at(pos),
            None => (segment, ""),
        };
        if !field.is_empty() {
            tokens.push(PathToken::Field(field.to_string()));
        }
        while let Some(stripped) = rest.strip_prefix('[') {
            let end = stripped.find(']').expect("unclosed bracket in JSON path");
            let index = stripped[..end]
                .parse()
                .expect("non-numeric array index in JSON path");
            tokens.push(PathToken::Index(index));
            rest = &stripped[end + 1..];
        }
    }
    tokens
}

static NULL: Value = Value::Null;

/// Resolve a path against `root`. Missing fields and indices resolve to `null`.
pub fn resolve_path(root: &Value, path: &str) -> Value {
    let mut current = root;
    for token in tokenize_path(path) {
        current = match token {
            PathToken::Field(name) => current.get(name.as_str()).unwrap_or(&NULL),
            PathToken::Index(idx) => current.get(idx).unwrap_or(&NULL),
            PathToken::Len => {
                let len = match current {
                    Value::Array(a) => a.len(),
                    Value::Object(o) => o.len(),
                    Value::String(s) => s.len(),
                    other => panic!("len() applied to non-collection in \"{path}\": got {other}"),
                };
                return Value::from(len);
            }
        };
    }
    current.clone()
}

// ─── TestResponse ───

/// Response wrapper with status, envelope, and JSON-path assertions.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub(crate) async fn read(response: Response) -> Self {
        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .expect("failed to read response body")
            .to_bytes();
        TestResponse {
            status: parts.status,
            headers: parts.headers,
            body,
        }
    }

    pub fn assert_ok(self) -> Self {
        self.assert_status(StatusCode::OK)
    }

    pub fn assert_bad_request(self) -> Self {
        self.assert_status(StatusCode::BAD_REQUEST)
    }

    pub fn assert_not_found(self) -> Self {
        self.assert_status(StatusCode::NOT_FOUND)
    }

    pub fn assert_method_not_allowed(self) -> Self {
        self.assert_status(StatusCode::METHOD_NOT_ALLOWED)
    }

    pub fn assert_server_error(self) -> Self {
        self.assert_status(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn assert_status(self, expected: StatusCode) -> Self {
        assert_eq!(
            self.status,
            expected,
            "Expected {expected}, got {}\nBody: {}",
            self.status,
            self.text()
        );
        self
    }

    // ── Envelope ──

    /// Assert a `{"timestamp": <string>, "data": ...}` body whose `data`
    /// equals `expected`.
    pub fn assert_data(self, expected: impl Into<Value>) -> Self {
        let root: Value = self.json();
        assert!(
            root.get("timestamp").is_some_and(Value::is_string),
            "response is not an envelope\n  Body: {root}"
        );
        let expected = expected.into();
        assert_eq!(root["data"], expected, "envelope data mismatch\n  Body: {root}");
        self
    }

    /// The envelope's `data` payload.
    pub fn data(&self) -> Value {
        resolve_path(&self.json(), "data")
    }

    /// The `error` message of an error body.
    pub fn error(&self) -> String {
        self.json_path("error")
    }

    // ── JSON-path assertions ──

    /// Assert that a JSON path resolves to the expected value.
    ///
    /// Supports dot-separated fields, array indices, and `len()`:
    /// ```ignore
    /// resp.assert_json_path("data[0].name", "cat")
    ///     .assert_json_path("data.len()", 2);
    /// ```
    pub fn assert_json_path(self, path: &str, expected: impl Into<Value>) -> Self {
        let root: Value = self.json();
        let actual = resolve_path(&root, path);
        let expected = expected.into();
        assert_eq!(
            actual, expected,
            "JSON path \"{path}\" assertion failed\n  Expected: {expected}\n  Actual:   {actual}\n  Body: {root}",
        );
        self
    }

    /// Extract and deserialize a value at a JSON path.
    pub fn json_path<T: DeserializeOwned>(&self, path: &str) -> T {
        let root: Value = self.json();
        let value = resolve_path(&root, path);
        serde_json::from_value(value.clone()).unwrap_or_else(|e| {
            panic!("Failed to deserialize JSON path \"{path}\": {e}\n  Value: {value}\n  Body: {root}")
        })
    }

    pub fn header(&self, name: impl AsRef<str>) -> Option<&str> {
        let name: HeaderName = name.as_ref().parse().ok()?;
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Deserialize the entire response body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body)
            .unwrap_or_else(|e| panic!("Failed to parse JSON: {e}\nBody: {}", self.text()))
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }
}
