use std::sync::Arc;

use http::Method;
use smallvec::SmallVec;

use crate::ids::RequestId;
use crate::router::ParamVec;

/// Maximum inline headers before heap allocation.
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header storage. Names are shared `Arc<str>`.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// An incoming request as seen by middleware and handlers.
#[derive(Debug, Clone)]
pub struct HandlerRequest {
    /// Correlation id, taken from `X-Request-Id` when the client sent a valid one.
    pub request_id: RequestId,
    pub method: Method,
    /// Request path without the query string.
    pub path: String,
    /// Raw query string (text after `?`), if any.
    pub query: Option<String>,
    pub headers: HeaderVec,
    /// Typed path parameters, filled in by the dispatcher once a route matched.
    pub path_params: ParamVec,
}

impl HandlerRequest {
    /// Build a request for `method` and `uri`. Anything after `?` is split off into `query`.
    #[must_use]
    pub fn new(method: Method, uri: &str) -> Self {
        let (path, query) = match uri.split_once('?') {
            Some((path, query)) => (path.to_string(), Some(query.to_string())),
            None => (uri.to_string(), None),
        };
        Self {
            request_id: RequestId::new(),
            method,
            path,
            query,
            headers: HeaderVec::new(),
            path_params: ParamVec::new(),
        }
    }

    /// Append a header. Re-reads `X-Request-Id` so correlation follows the client.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        if name.eq_ignore_ascii_case("x-request-id") {
            self.request_id = RequestId::from_header_or_new(Some(&value));
        }
        self.headers.push((Arc::from(name), value));
        self
    }

    /// Get a header by name (case-insensitive per RFC 7230)
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The `Origin` header, used for CORS decisions.
    #[inline]
    #[must_use]
    pub fn origin(&self) -> Option<&str> {
        self.get_header("origin")
    }

    /// Get an extracted path parameter by name.
    ///
    /// Uses "last write wins" semantics when a template repeats a name.
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&crate::router::PathValue> {
        self.path_params
            .iter()
            .rfind(|p| p.name.as_ref() == name)
            .map(|p| &p.value)
    }
}
