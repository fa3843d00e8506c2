use std::sync::Arc;

use tracing::debug;

use crate::dispatcher::ControllerId;
use crate::server::{HandlerRequest, HandlerResponse};

/// A request/response interceptor.
///
/// A unit may set headers or status, end the response (which stops the chain
/// and skips the handler), or do nothing. An `Err` aborts the chain and the
/// request is answered with a 500; whatever the unit wrote, an end included,
/// is discarded.
///
/// Closures with the same signature are middleware too:
///
/// ```rust
/// use routeplate::middleware::MiddlewareChain;
/// use routeplate::server::{HandlerRequest, HandlerResponse};
///
/// let mut chain = MiddlewareChain::new();
/// chain.add_global(|_req: &mut HandlerRequest, res: &mut HandlerResponse| -> anyhow::Result<()> {
///     res.header("X-Powered-By", "routeplate");
///     Ok(())
/// });
/// ```
pub trait Middleware: Send + Sync {
    fn apply(&self, req: &mut HandlerRequest, res: &mut HandlerResponse) -> anyhow::Result<()>;

    /// Name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<F> Middleware for F
where
    F: Fn(&mut HandlerRequest, &mut HandlerResponse) -> anyhow::Result<()> + Send + Sync,
{
    fn apply(&self, req: &mut HandlerRequest, res: &mut HandlerResponse) -> anyhow::Result<()> {
        self(req, res)
    }
}

/// Which requests a middleware unit sees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MiddlewareScope {
    /// Every request, matched or not.
    Global,
    /// Only requests routed to this controller's actions.
    Controller(ControllerId),
}

/// How a chain run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainOutcome {
    /// Every applicable unit ran and the response is still open.
    Completed,
    /// A unit ended the response.
    ShortCircuited,
}

#[derive(Clone)]
struct MiddlewareUnit {
    scope: MiddlewareScope,
    middleware: Arc<dyn Middleware>,
}

/// Ordered middleware, registered once at startup.
///
/// For a request routed to controller `C` the chain runs every global unit in
/// registration order, then every unit scoped to `C` in registration order.
/// Requests without a route only see global units.
#[derive(Clone, Default)]
pub struct MiddlewareChain {
    units: Vec<MiddlewareUnit>,
}

impl MiddlewareChain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, scope: MiddlewareScope, middleware: Arc<dyn Middleware>) -> &mut Self {
        debug!(
            middleware = middleware.name(),
            scope = ?scope,
            position = self.units.len(),
            "Middleware registered"
        );
        self.units.push(MiddlewareUnit { scope, middleware });
        self
    }

    pub fn add_global(&mut self, middleware: impl Middleware + 'static) -> &mut Self {
        self.add(MiddlewareScope::Global, Arc::new(middleware))
    }

    pub fn add_for(
        &mut self,
        controller: impl Into<ControllerId>,
        middleware: impl Middleware + 'static,
    ) -> &mut Self {
        self.add(MiddlewareScope::Controller(controller.into()), Arc::new(middleware))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    fn applicable<'a>(
        &'a self,
        controller: Option<&'a ControllerId>,
    ) -> impl Iterator<Item = &'a MiddlewareUnit> {
        let global = self
            .units
            .iter()
            .filter(|u| u.scope == MiddlewareScope::Global);
        let scoped = self.units.iter().filter(move |u| match (&u.scope, controller) {
            (MiddlewareScope::Controller(owner), Some(c)) => owner == c,
            _ => false,
        });
        global.chain(scoped)
    }

    /// Run the units that apply to `controller`, stopping once the response ends.
    ///
    /// # Errors
    ///
    /// The first unit failure, unmodified. Later units do not run.
    pub fn run(
        &self,
        controller: Option<&ControllerId>,
        req: &mut HandlerRequest,
        res: &mut HandlerResponse,
    ) -> anyhow::Result<ChainOutcome> {
        for (idx, unit) in self.applicable(controller).enumerate() {
            if res.flushed() {
                break;
            }
            unit.middleware.apply(req, res)?;
            if res.flushed() {
                debug!(
                    request_id = %req.request_id,
                    middleware_idx = idx,
                    middleware_name = unit.middleware.name(),
                    status = res.status_code(),
                    "Middleware ended the response"
                );
            }
        }

        Ok(if res.flushed() {
            ChainOutcome::ShortCircuited
        } else {
            ChainOutcome::Completed
        })
    }
}
