//! Dispatcher core: handler descriptors, positional binding and the per-request flow.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info};

use crate::error::DispatchError;
use crate::middleware::{ChainOutcome, MiddlewareChain};
use crate::router::{PathParam, PathValue, Router};
use crate::server::{HandlerRequest, HandlerResponse};

/// Name of the controller that owns a group of actions.
///
/// Controller-scoped middleware is keyed by this id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ControllerId(Arc<str>);

impl ControllerId {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(Arc::from(name))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ControllerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ControllerId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// What an action sees while it runs: the live request and response.
///
/// An action may add headers, pick the status, or end the response itself.
/// On success the dispatcher keeps an explicit status and never overwrites an
/// ended response; on failure everything the action wrote is replaced by a 500.
pub struct ActionContext<'a> {
    pub request: &'a HandlerRequest,
    pub response: &'a mut HandlerResponse,
}

/// Conversion from an extracted [`PathValue`] to a handler argument.
pub trait FromPathValue: Sized {
    /// Human-readable type name for binding errors.
    const EXPECTS: &'static str;

    fn from_path_value(value: &PathValue) -> Option<Self>;
}

impl FromPathValue for String {
    const EXPECTS: &'static str = "string";

    fn from_path_value(value: &PathValue) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl FromPathValue for i32 {
    const EXPECTS: &'static str = "int";

    fn from_path_value(value: &PathValue) -> Option<Self> {
        value.as_i32()
    }
}

impl FromPathValue for i64 {
    const EXPECTS: &'static str = "long";

    fn from_path_value(value: &PathValue) -> Option<Self> {
        value.as_i64()
    }
}

impl FromPathValue for PathValue {
    const EXPECTS: &'static str = "any";

    fn from_path_value(value: &PathValue) -> Option<Self> {
        Some(value.clone())
    }
}

/// Type-erased invoker built once at registration.
pub type InvokeFn =
    Arc<dyn Fn(&mut ActionContext<'_>, &[PathParam]) -> Result<Value, DispatchError> + Send + Sync>;

/// Functions that can serve as actions.
///
/// Implemented for `Fn(&mut ActionContext, A1, .., An) -> anyhow::Result<R>` with
/// up to three [`FromPathValue`] arguments and a `Serialize` result. `Args` is
/// the argument tuple and only exists to keep the impls apart.
pub trait IntoAction<Args>: Send + Sync + 'static {
    /// Number of path parameters the function binds.
    const ARITY: usize;

    fn into_invoke(self, action: Arc<str>) -> InvokeFn;
}

fn check_arity(action: &str, expected: usize, params: &[PathParam]) -> Result<(), DispatchError> {
    if params.len() == expected {
        Ok(())
    } else {
        Err(DispatchError::Binding {
            action: action.to_string(),
            reason: format!("expected {expected} parameter(s), got {}", params.len()),
        })
    }
}

fn bind<T: FromPathValue>(action: &str, param: &PathParam) -> Result<T, DispatchError> {
    T::from_path_value(&param.value).ok_or_else(|| DispatchError::Binding {
        action: action.to_string(),
        reason: format!(
            "parameter '{}' is {} but the handler expects {}",
            param.name,
            param.value.kind(),
            T::EXPECTS
        ),
    })
}

fn to_body<R: Serialize>(out: R) -> Result<Value, DispatchError> {
    serde_json::to_value(out).map_err(|e| DispatchError::Handler(e.into()))
}

macro_rules! impl_into_action {
    ($arity:expr; $($ty:ident $var:ident $idx:tt),*) => {
        impl<F, R, $($ty,)*> IntoAction<($($ty,)*)> for F
        where
            F: Fn(&mut ActionContext<'_>, $($ty),*) -> anyhow::Result<R> + Send + Sync + 'static,
            R: Serialize,
            $($ty: FromPathValue,)*
        {
            const ARITY: usize = $arity;

            #[allow(unused_variables)]
            fn into_invoke(self, action: Arc<str>) -> InvokeFn {
                Arc::new(move |ctx: &mut ActionContext<'_>, params: &[PathParam]| -> Result<Value, DispatchError> {
                    check_arity(&action, $arity, params)?;
                    $(let $var: $ty = bind(&action, &params[$idx])?;)*
                    let out = (self)(ctx, $($var),*).map_err(DispatchError::Handler)?;
                    to_body(out)
                })
            }
        }
    };
}

impl_into_action!(0;);
impl_into_action!(1; A a 0);
impl_into_action!(2; A a 0, B b 1);
impl_into_action!(3; A a 0, B b 1, C c 2);

/// Handler descriptor: a controller-owned callable plus its binding shape.
///
/// # Example
///
/// ```rust
/// use routeplate::dispatcher::{Action, ActionContext, ControllerId};
///
/// fn show(_ctx: &mut ActionContext<'_>, category: String, id: i32) -> anyhow::Result<String> {
///     Ok(format!("{category}#{id}"))
/// }
///
/// let books = ControllerId::new("books");
/// let action = Action::new(&books, "show", show);
/// assert_eq!(action.arity(), 2);
/// ```
#[derive(Clone)]
pub struct Action {
    controller: ControllerId,
    name: Arc<str>,
    arity: usize,
    invoke: InvokeFn,
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("controller", &self.controller)
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

impl Action {
    /// Wrap a typed handler function.
    pub fn new<Args, H: IntoAction<Args>>(controller: &ControllerId, name: &str, handler: H) -> Self {
        let name: Arc<str> = Arc::from(name);
        Self {
            controller: controller.clone(),
            invoke: handler.into_invoke(Arc::clone(&name)),
            name,
            arity: H::ARITY,
        }
    }

    /// Wrap an untyped handler that reads the extracted parameters itself.
    pub fn raw<F>(controller: &ControllerId, name: &str, arity: usize, handler: F) -> Self
    where
        F: Fn(&mut ActionContext<'_>, &[PathParam]) -> anyhow::Result<Value>
            + Send
            + Sync
            + 'static,
    {
        let name: Arc<str> = Arc::from(name);
        let action = Arc::clone(&name);
        Self {
            controller: controller.clone(),
            name,
            arity,
            invoke: Arc::new(move |ctx: &mut ActionContext<'_>, params: &[PathParam]| -> Result<Value, DispatchError> {
                check_arity(&action, arity, params)?;
                handler(ctx, params).map_err(DispatchError::Handler)
            }),
        }
    }

    #[must_use]
    pub fn controller(&self) -> &ControllerId {
        &self.controller
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of path parameters this action binds positionally.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Invoke the action with extracted parameters, in template order.
    ///
    /// # Errors
    ///
    /// Binding failures and handler failures, as [`DispatchError`].
    pub fn invoke(
        &self,
        ctx: &mut ActionContext<'_>,
        params: &[PathParam],
    ) -> Result<Value, DispatchError> {
        (self.invoke)(ctx, params)
    }
}

/// How a request ended.
#[derive(Debug)]
pub enum Disposition {
    /// No template matched (method, path); answered 404.
    NoRoute,
    /// Middleware ended the response; the handler never ran.
    ShortCircuited,
    /// The handler returned a value; status 200 unless the handler chose one.
    Handled,
    /// Conversion, binding, middleware or handler failure; answered 500 even
    /// if the failing stage had already ended the response.
    Failed(DispatchError),
}

/// Result of [`Dispatcher::dispatch`]: the disposition and the single final response.
#[derive(Debug)]
pub struct DispatchOutcome {
    pub disposition: Disposition,
    pub response: HandlerResponse,
}

impl DispatchOutcome {
    #[must_use]
    pub fn status(&self) -> u16 {
        self.response.status_code()
    }
}

/// Routes a request, runs the middleware chain and invokes the matched action.
///
/// The dispatcher owns the route table and the middleware chain. Both are
/// built during startup and only read afterwards, so a dispatcher wrapped in
/// an `Arc` can serve any number of concurrent requests without locking.
#[derive(Clone, Default)]
pub struct Dispatcher {
    router: Router,
    middleware: MiddlewareChain,
}

impl Dispatcher {
    #[must_use]
    pub fn new(router: Router, middleware: MiddlewareChain) -> Self {
        info!(
            routes = router.len(),
            middleware = middleware.len(),
            "Dispatcher ready"
        );
        Self { router, middleware }
    }

    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    #[must_use]
    pub fn middleware(&self) -> &MiddlewareChain {
        &self.middleware
    }

    /// Handle one request to completion.
    ///
    /// Unmatched requests still pass through global middleware (so CORS
    /// preflights are answered) and end as [`Disposition::NoRoute`] unless a
    /// middleware ended the response first.
    pub fn dispatch(&self, mut request: HandlerRequest) -> DispatchOutcome {
        let mut response = HandlerResponse::new();
        let request_id = request.request_id;

        let Some(entry) = self.router.route(&request.method, &request.path) else {
            return match self.middleware.run(None, &mut request, &mut response) {
                Ok(ChainOutcome::ShortCircuited) => {
                    DispatchOutcome {
                        disposition: Disposition::ShortCircuited,
                        response,
                    }
                }
                Ok(ChainOutcome::Completed) => {
                    info!(
                        request_id = %request_id,
                        method = %request.method,
                        path = %request.path,
                        "No route matched"
                    );
                    response.send_status(404);
                    DispatchOutcome {
                        disposition: Disposition::NoRoute,
                        response,
                    }
                }
                Err(e) => fail(&request, None, DispatchError::Middleware(e), response),
            };
        };

        let action = &entry.action;
        debug!(
            request_id = %request_id,
            route = %entry.template,
            controller = %action.controller(),
            action = %action.name(),
            "Route selected"
        );

        match entry.template.extract(&request.path) {
            Ok(params) => request.path_params = params.unwrap_or_default(),
            Err(e) => return fail(&request, Some(action), e.into(), response),
        }

        match self
            .middleware
            .run(Some(action.controller()), &mut request, &mut response)
        {
            Ok(ChainOutcome::Completed) => {}
            Ok(ChainOutcome::ShortCircuited) => {
                return DispatchOutcome {
                    disposition: Disposition::ShortCircuited,
                    response,
                };
            }
            Err(e) => return fail(&request, Some(action), DispatchError::Middleware(e), response),
        }

        let start = Instant::now();
        let result = {
            let mut ctx = ActionContext {
                request: &request,
                response: &mut response,
            };
            catch_unwind(AssertUnwindSafe(|| {
                action.invoke(&mut ctx, &request.path_params)
            }))
        };

        match result {
            Ok(Ok(value)) => {
                info!(
                    request_id = %request_id,
                    action = %action.name(),
                    elapsed_us = start.elapsed().as_micros() as u64,
                    "Handler execution complete"
                );
                response.finish(200, value);
                DispatchOutcome {
                    disposition: Disposition::Handled,
                    response,
                }
            }
            Ok(Err(e)) => fail(&request, Some(action), e, response),
            Err(panic) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                let e = DispatchError::HandlerPanicked {
                    action: action.name().to_string(),
                    message,
                };
                fail(&request, Some(action), e, response)
            }
        }
    }
}

/// Answer a failed request with a 500 carrying the error message.
///
/// Whatever the failing stage already wrote is thrown away first, even an
/// ended response, so the 500 never carries stale headers or a stale status.
fn fail(
    request: &HandlerRequest,
    action: Option<&Action>,
    e: DispatchError,
    mut response: HandlerResponse,
) -> DispatchOutcome {
    error!(
        request_id = %request.request_id,
        method = %request.method,
        path = %request.path,
        action = action.map_or("-", Action::name),
        discarded_status = response.flushed().then(|| response.status_code()),
        error = %e,
        "Request failed"
    );
    response.discard();
    response.complete(500, e.to_string());
    DispatchOutcome {
        disposition: Disposition::Failed(e),
        response,
    }
}
