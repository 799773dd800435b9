use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::{request, Method, Request};
use resty_core::http::body::Body;
use resty_core::http::Router;
use serde::Serialize;
use tower::util::ServiceExt;

use crate::response::TestResponse;

/// Drives a resty [`Router`] in process: every request goes through
/// `tower::ServiceExt::oneshot` on a clone of the router, no socket involved.
///
/// ```ignore
/// let app = TestApp::new(resource_router("/animals", animals));
/// app.post("/animals").json(&json!({"name": "cat"})).send().await
///     .assert_ok()
///     .assert_json_path("data[0].name", "cat");
/// app.get("/animals").query("legs", "4").send().await.assert_ok();
/// ```
#[derive(Clone)]
pub struct TestApp {
    router: Router,
}

impl TestApp {
    pub fn new(router: Router) -> Self {
        Self { router }
    }

    pub fn get(&self, uri: &str) -> TestRequest<'_> {
        self.request(Method::GET, uri)
    }

    pub fn post(&self, uri: &str) -> TestRequest<'_> {
        self.request(Method::POST, uri)
    }

    pub fn patch(&self, uri: &str) -> TestRequest<'_> {
        self.request(Method::PATCH, uri)
    }

    pub fn delete(&self, uri: &str) -> TestRequest<'_> {
        self.request(Method::DELETE, uri)
    }

    /// Any verb, including the ones resources never route (`PUT`, `HEAD`, ...).
    pub fn request(&self, method: Method, uri: &str) -> TestRequest<'_> {
        TestRequest {
            app: self,
            method,
            uri: uri.to_string(),
            query: Vec::new(),
            head: Request::builder(),
            body: Vec::new(),
        }
    }

    async fn dispatch(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router failed to answer");
        TestResponse::read(response).await
    }
}

/// A request under construction. Nothing is sent until [`TestRequest::send`].
pub struct TestRequest<'a> {
    app: &'a TestApp,
    method: Method,
    uri: String,
    query: Vec<(String, String)>,
    head: request::Builder,
    body: Vec<u8>,
}

impl TestRequest<'_> {
    pub fn header<K, V>(mut self, name: K, value: V) -> Self
    where
        K: TryInto<HeaderName>,
        K::Error: Into<http::Error>,
        V: TryInto<HeaderValue>,
        V::Error: Into<http::Error>,
    {
        self.head = self.head.header(name, value);
        self
    }

    /// Append a query parameter, e.g. a list filter.
    pub fn query(mut self, name: &str, value: &str) -> Self {
        self.query.push((name.to_string(), value.to_string()));
        self
    }

    /// JSON body with `Content-Type: application/json`.
    pub fn json(mut self, body: &impl Serialize) -> Self {
        self.body = serde_json::to_vec(body).expect("body is not serializable");
        self.header(CONTENT_TYPE, "application/json")
    }

    /// Raw body bytes, sent as is (e.g. malformed JSON).
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub async fn send(self) -> TestResponse {
        let mut uri = self.uri;
        if !self.query.is_empty() {
            let encoded = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(&self.query)
                .finish();
            uri.push(if uri.contains('?') { '&' } else { '?' });
            uri.push_str(&encoded);
        }
        let request = self
            .head
            .method(self.method)
            .uri(uri)
            .body(Body::from(self.body))
            .expect("invalid test request");
        self.app.dispatch(request).await
    }
}
