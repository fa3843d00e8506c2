use http::Method;
use tracing::debug;

use super::Middleware;
use crate::server::{HandlerRequest, HandlerResponse};

/// CORS (Cross-Origin Resource Sharing) preflight middleware
///
/// Answers `OPTIONS` requests from whitelisted origins and ends the response;
/// other methods pass through untouched. The whitelist is captured at
/// construction and never changes, so one instance can serve every request
/// thread.
///
/// # Origin decision
///
/// - whitelist starts with `*`: every origin is allowed and echoed as `*`
/// - the request `Origin` is listed: that origin is echoed back
/// - otherwise: `405 Method Not Allowed`
///
/// # Example
///
/// ```rust
/// use http::Method;
/// use routeplate::middleware::{CorsMiddleware, Middleware};
/// use routeplate::server::{HandlerRequest, HandlerResponse};
///
/// let cors = CorsMiddleware::new(["http://localhost"]);
/// let mut req = HandlerRequest::new(Method::OPTIONS, "/books")
///     .with_header("Origin", "http://localhost");
/// let mut res = HandlerResponse::new();
/// cors.apply(&mut req, &mut res).unwrap();
///
/// assert!(res.flushed());
/// assert_eq!(res.get_header("Access-Control-Allow-Origin"), Some("http://localhost"));
/// ```
#[derive(Debug, Clone)]
pub struct CorsMiddleware {
    whitelist: Vec<String>,
    allowed_methods: Vec<Method>,
    allowed_headers: Vec<String>,
    allow_credentials: bool,
}

/// Allow every origin with the default methods and headers.
impl Default for CorsMiddleware {
    fn default() -> Self {
        Self::new(["*"])
    }
}

impl CorsMiddleware {
    /// Create a CORS middleware for the given origin whitelist.
    ///
    /// Defaults: methods `GET, POST, PUT, DELETE`; headers
    /// `X-Requested-With, Content-Type, Ajax`; credentials allowed.
    pub fn new<I, S>(whitelist: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            whitelist: whitelist.into_iter().map(Into::into).collect(),
            allowed_methods: vec![Method::GET, Method::POST, Method::PUT, Method::DELETE],
            allowed_headers: vec![
                "X-Requested-With".into(),
                "Content-Type".into(),
                "Ajax".into(),
            ],
            allow_credentials: true,
        }
    }

    #[must_use]
    pub fn allowed_methods(mut self, methods: &[Method]) -> Self {
        self.allowed_methods = methods.to_vec();
        self
    }

    #[must_use]
    pub fn allowed_headers(mut self, headers: &[&str]) -> Self {
        self.allowed_headers = headers.iter().map(|h| (*h).to_string()).collect();
        self
    }

    #[must_use]
    pub fn allow_credentials(mut self, allow: bool) -> Self {
        self.allow_credentials = allow;
        self
    }

    #[must_use]
    pub fn whitelist(&self) -> &[String] {
        &self.whitelist
    }

    /// The value for `Access-Control-Allow-Origin`, or `None` if the origin is refused.
    fn allow_origin<'a>(&'a self, origin: Option<&'a str>) -> Option<&'a str> {
        if self.whitelist.first().is_some_and(|o| o == "*") {
            return Some("*");
        }
        origin.filter(|o| self.whitelist.iter().any(|w| w == o))
    }
}

impl Middleware for CorsMiddleware {
    fn apply(&self, req: &mut HandlerRequest, res: &mut HandlerResponse) -> anyhow::Result<()> {
        if req.method != Method::OPTIONS {
            return Ok(());
        }

        match self.allow_origin(req.origin()) {
            Some(allowed) => {
                let methods = self
                    .allowed_methods
                    .iter()
                    .map(Method::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                res.header("Vary", "Origin");
                if self.allow_credentials {
                    res.header("Access-Control-Allow-Credentials", "true");
                }
                res.header("Access-Control-Allow-Origin", allowed)
                    .header("Access-Control-Allow-Methods", methods)
                    .header("Access-Control-Allow-Headers", self.allowed_headers.join(", "));
                res.end();
            }
            None => {
                debug!(
                    request_id = %req.request_id,
                    origin = req.origin().unwrap_or("-"),
                    "CORS preflight refused"
                );
                res.send_status(405);
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "cors"
    }
}
