use crate::error::HttpError;
use crate::http::extract::{FromRequestParts, RawPathParams};
use crate::http::{HeaderMap, Method, Parts};

/// The request information a resource sees: verb, path parameters,
/// query parameters, and headers.
///
/// Extracted from an axum request by [`FromRequestParts`], or built by hand
/// when driving a resource outside of a router:
///
/// ```ignore
/// let ctx = RequestContext::new(Method::GET).with_path_param("id", "3");
/// let envelope = resource.handle_get(&ctx).await?;
/// ```
#[derive(Debug, Clone)]
pub struct RequestContext {
    method: Method,
    path_params: Vec<(String, String)>,
    query: Vec<(String, String)>,
    headers: HeaderMap,
}

impl RequestContext {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            path_params: Vec::new(),
            query: Vec::new(),
            headers: HeaderMap::new(),
        }
    }

    pub fn with_path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_params.push((name.into(), value.into()));
        self
    }

    pub fn with_query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Get a path parameter by name.
    ///
    /// Linear scan; routes carry one to three parameters.
    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn path_params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.path_params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn query(&self) -> impl Iterator<Item = (&str, &str)> {
        self.query.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

/// Parse a query string into key-value pairs.
pub fn parse_query_string(query: Option<&str>) -> Vec<(String, String)> {
    match query {
        Some(q) => form_urlencoded::parse(q.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect(),
        None => Vec::new(),
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let raw = RawPathParams::from_request_parts(parts, state)
            .await
            .map_err(|rejection| HttpError::BadRequest(rejection.body_text()))?;
        let path_params = raw
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Ok(Self {
            method: parts.method.clone(),
            path_params,
            query: parse_query_string(parts.uri.query()),
            headers: parts.headers.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_query_decodes_pairs() {
        let pairs = parse_query_string(Some("name=big%20cat&legs=4"));
        assert_eq!(
            pairs,
            vec![
                ("name".to_string(), "big cat".to_string()),
                ("legs".to_string(), "4".to_string()),
            ]
        );
        assert!(parse_query_string(None).is_empty());
    }

    #[test]
    fn path_param_lookup() {
        let ctx = RequestContext::new(Method::PATCH).with_path_param("another_id", "9");
        assert_eq!(ctx.path_param("another_id"), Some("9"));
        assert_eq!(ctx.path_param("id"), None);
        assert_eq!(ctx.method(), &Method::PATCH);
    }
}
