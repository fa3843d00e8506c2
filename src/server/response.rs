use std::sync::Arc;

use http::StatusCode;
use serde_json::Value;
use tracing::warn;

use super::HeaderVec;

/// Body of a [`HandlerResponse`].
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ResponseBody {
    #[default]
    Empty,
    /// Written as `text/plain`
    Text(String),
    /// Written as `application/json`
    Json(Value),
}

impl ResponseBody {
    /// Strings become plain text, every other JSON value stays JSON.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(s) => ResponseBody::Text(s),
            Value::Null => ResponseBody::Empty,
            other => ResponseBody::Json(other),
        }
    }

    #[must_use]
    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            ResponseBody::Empty => None,
            ResponseBody::Text(_) => Some("text/plain"),
            ResponseBody::Json(_) => Some("application/json"),
        }
    }

    /// Serialized body bytes as the transport should write them.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            ResponseBody::Empty => Vec::new(),
            ResponseBody::Text(s) => s.as_bytes().to_vec(),
            ResponseBody::Json(v) => v.to_string().into_bytes(),
        }
    }
}

impl From<&str> for ResponseBody {
    fn from(s: &str) -> Self {
        ResponseBody::Text(s.to_string())
    }
}

impl From<String> for ResponseBody {
    fn from(s: String) -> Self {
        ResponseBody::Text(s)
    }
}

impl From<Value> for ResponseBody {
    fn from(v: Value) -> Self {
        ResponseBody::from_value(v)
    }
}

/// A response under construction.
///
/// Middleware and the dispatcher write to it through [`header`](Self::header),
/// [`status`](Self::status), [`end`](Self::end) and
/// [`send_status`](Self::send_status). Ending marks the response flushed; any
/// write after that is dropped with a warning.
#[derive(Debug, Clone)]
pub struct HandlerResponse {
    status: u16,
    /// Set once a writer chose the status explicitly.
    status_set: bool,
    headers: HeaderVec,
    body: ResponseBody,
    flushed: bool,
}

impl Default for HandlerResponse {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerResponse {
    /// An open response with status 200 and no headers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: 200,
            status_set: false,
            headers: HeaderVec::new(),
            body: ResponseBody::Empty,
            flushed: false,
        }
    }

    fn writable(&self, what: &str) -> bool {
        if self.flushed {
            warn!(write = what, status = self.status, "Write after response end ignored");
        }
        !self.flushed
    }

    /// Add or replace a header (names compare case-insensitively).
    pub fn header(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        if self.writable("header") {
            self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
            self.headers.push((Arc::from(name), value.into()));
        }
        self
    }

    pub fn status(&mut self, code: u16) -> &mut Self {
        if self.writable("status") {
            self.status = code;
            self.status_set = true;
        }
        self
    }

    /// Finish the response with whatever status and headers are set.
    pub fn end(&mut self) {
        if self.writable("end") {
            self.flushed = true;
        }
    }

    /// Finish the response with a body.
    pub fn end_with(&mut self, body: impl Into<ResponseBody>) {
        if self.writable("end") {
            self.set_body(body.into());
            self.flushed = true;
        }
    }

    /// Finish the response with `code` and its reason phrase as the body.
    pub fn send_status(&mut self, code: u16) {
        if self.writable("send_status") {
            self.status = code;
            let reason = StatusCode::from_u16(code)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("Unknown");
            self.set_body(ResponseBody::Text(reason.to_string()));
            self.flushed = true;
        }
    }

    /// Set status and body and end the response in one step.
    pub fn complete(&mut self, code: u16, body: impl Into<ResponseBody>) {
        if self.writable("complete") {
            self.status = code;
            self.set_body(body.into());
            self.flushed = true;
        }
    }

    /// End the response with `body`, answering `default_code` unless a
    /// status was already set through [`status`](Self::status).
    pub fn finish(&mut self, default_code: u16, body: impl Into<ResponseBody>) {
        if self.writable("finish") {
            if !self.status_set {
                self.status = default_code;
            }
            self.set_body(body.into());
            self.flushed = true;
        }
    }

    /// Drop everything written so far, including an end, and reopen the response.
    ///
    /// Only the dispatcher calls this, before it replaces a failed request's
    /// partial response with an error response.
    pub(crate) fn discard(&mut self) {
        *self = Self::new();
    }

    fn set_body(&mut self, body: ResponseBody) {
        if let Some(ct) = body.content_type() {
            if self.get_header("content-type").is_none() {
                self.headers.push((Arc::from("content-type"), ct.to_string()));
            }
        }
        self.body = body;
    }

    /// Has the response been ended?
    #[inline]
    #[must_use]
    pub fn flushed(&self) -> bool {
        self.flushed
    }

    /// Whether [`status`](Self::status) was called before the response ended.
    #[must_use]
    pub fn status_was_set(&self) -> bool {
        self.status_set
    }

    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status
    }

    #[must_use]
    pub fn body(&self) -> &ResponseBody {
        &self.body
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderVec {
        &self.headers
    }

    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}
