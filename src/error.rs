//! Error taxonomy for template compilation, route registration and request dispatch.
//!
//! Registration-time errors ([`TemplateError`], [`RegistrationError`]) are local:
//! the route is rejected and simply absent from the table. Request-time errors
//! ([`DispatchError`]) terminate one request with a 500 response and never reach
//! the serving process.

use http::Method;

use crate::router::ParamKind;

/// A route template failed validation or compilation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TemplateError {
    /// The controller prefix contains characters outside `[0-9a-zA-Z-_/]`.
    #[error("route prefix '{prefix}' is illegal, should consist of '0-9 a-z A-Z - _ /'")]
    IllegalPrefix { prefix: String },

    /// The pattern could not be scanned (unbalanced braces, empty placeholder name).
    #[error("route pattern '{pattern}' is malformed: {reason}")]
    MalformedPattern { pattern: String, reason: &'static str },

    /// The assembled expression was rejected by the regex engine.
    #[error("route pattern '{pattern}' does not compile")]
    Regex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// A route could not be inserted into the [`Router`](crate::router::Router).
#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("cannot register {method} route: {source}")]
    InvalidTemplate {
        method: Method,
        #[source]
        source: TemplateError,
    },

    /// The action's parameter list does not line up with the template's placeholders.
    #[error("action '{action}' takes {declared} parameter(s) but route '{route}' captures {expected}")]
    ArityMismatch {
        action: String,
        route: String,
        declared: usize,
        expected: usize,
    },
}

/// A captured path segment could not be converted to its declared kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("path parameter '{name}' expects {kind}, got '{raw}'")]
pub struct ParamConversionError {
    pub name: String,
    pub kind: ParamKind,
    pub raw: String,
}

/// Per-request failures. Each one maps to a single 500 response.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    ParamConversion(#[from] ParamConversionError),

    /// Extracted values do not fit the handler's argument list.
    #[error("cannot bind parameters for '{action}': {reason}")]
    Binding { action: String, reason: String },

    #[error("{0}")]
    Handler(anyhow::Error),

    #[error("handler '{action}' panicked: {message}")]
    HandlerPanicked { action: String, message: String },

    #[error("{0}")]
    Middleware(anyhow::Error),
}

/// Configuration could not be read or parsed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}'")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config YAML")]
    Yaml(#[from] serde_yaml::Error),

    #[error("'{0}' is not an HTTP method")]
    InvalidMethod(String),
}
