use tracing::debug;

use super::Middleware;
use crate::server::{HandlerRequest, HandlerResponse};

/// Logs every request that reaches the chain at debug level.
///
/// Never touches the response.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingMiddleware;

impl Middleware for TracingMiddleware {
    fn apply(&self, req: &mut HandlerRequest, _res: &mut HandlerResponse) -> anyhow::Result<()> {
        debug!(
            request_id = %req.request_id,
            method = %req.method,
            path = %req.path,
            origin = req.origin().unwrap_or("-"),
            path_params = ?req.path_params,
            "Request received"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "tracing"
    }
}
