//! Route table: registration and selection.

use std::collections::HashMap;
use std::sync::Arc;

use http::Method;
use tracing::{debug, info, warn};

use super::template::RouteTemplate;
use crate::dispatcher::{Action, ControllerId, IntoAction};
use crate::error::RegistrationError;

/// One registered route.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    pub method: Method,
    pub template: Arc<RouteTemplate>,
    pub action: Action,
}

/// Routes for one HTTP method, split by priority.
///
/// Each bucket keeps registration order.
#[derive(Debug, Clone, Default)]
struct MethodRoutes {
    literal: Vec<RouteEntry>,
    universal: Vec<RouteEntry>,
}

impl MethodRoutes {
    fn iter(&self) -> impl Iterator<Item = &RouteEntry> {
        self.literal.iter().chain(self.universal.iter())
    }
}

/// Route table matching `(method, path)` to a registered action.
///
/// Selection is a linear scan. Fixed literal templates are always tried
/// before universal ones (wildcards and placeholders), so an exact path wins
/// over a parameterised route no matter which was registered first. Within
/// each group the first registered match wins.
///
/// Routes are added during startup; afterwards the table is only read, and
/// it can be shared across threads without locking.
#[derive(Debug, Clone, Default)]
pub struct Router {
    routes: HashMap<Method, MethodRoutes>,
    count: usize,
}

impl Router {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile and register a route.
    ///
    /// # Errors
    ///
    /// - [`RegistrationError::InvalidTemplate`] when the prefix or pattern
    ///   does not compile. The route is not added.
    /// - [`RegistrationError::ArityMismatch`] when the action binds a different
    ///   number of parameters than the template captures.
    pub fn register(
        &mut self,
        method: Method,
        prefix: &str,
        pattern: &str,
        action: Action,
    ) -> Result<Arc<RouteTemplate>, RegistrationError> {
        let template = RouteTemplate::new(prefix, pattern)
            .into_valid()
            .map_err(|source| {
                warn!(method = %method, prefix = %prefix, pattern = %pattern, error = %source, "Route registration rejected");
                RegistrationError::InvalidTemplate {
                    method: method.clone(),
                    source,
                }
            })?;

        if action.arity() != template.params().len() {
            warn!(
                method = %method,
                route = %template,
                action = %action.name(),
                declared = action.arity(),
                expected = template.params().len(),
                "Route registration rejected: parameter count mismatch"
            );
            return Err(RegistrationError::ArityMismatch {
                action: action.name().to_string(),
                route: template.to_string(),
                declared: action.arity(),
                expected: template.params().len(),
            });
        }

        let template = Arc::new(template);
        let entry = RouteEntry {
            method: method.clone(),
            template: Arc::clone(&template),
            action,
        };

        info!(
            method = %method,
            route = %template,
            controller = %entry.action.controller(),
            action = %entry.action.name(),
            universal = template.is_universal(),
            "Route registered"
        );

        let bucket = self.routes.entry(method).or_default();
        if template.is_universal() {
            bucket.universal.push(entry);
        } else {
            bucket.literal.push(entry);
        }
        self.count += 1;

        Ok(template)
    }

    /// Register several actions that share a controller and a prefix.
    ///
    /// ```rust
    /// use routeplate::dispatcher::ActionContext;
    /// use routeplate::router::Router;
    ///
    /// fn list(_ctx: &mut ActionContext<'_>) -> anyhow::Result<&'static str> {
    ///     Ok("all books")
    /// }
    ///
    /// let mut router = Router::new();
    /// router.controller("books", "/books").get("list", "list", list).unwrap();
    /// assert!(router.route(&http::Method::GET, "/books/list").is_some());
    /// ```
    pub fn controller(&mut self, controller: impl Into<ControllerId>, prefix: &str) -> ControllerScope<'_> {
        ControllerScope {
            router: self,
            controller: controller.into(),
            prefix: prefix.to_string(),
        }
    }

    /// Select the route for `(method, path)`, or `None` (404).
    #[must_use]
    pub fn route(&self, method: &Method, path: &str) -> Option<&RouteEntry> {
        let found = self
            .routes
            .get(method)?
            .iter()
            .find(|entry| entry.template.is_match(path));

        if let Some(entry) = found {
            debug!(method = %method, path = %path, route = %entry.template, "Route matched");
        }
        found
    }

    /// All routes, grouped by method in alphabetical method order, each group
    /// in selection order.
    pub fn routes(&self) -> impl Iterator<Item = &RouteEntry> {
        let mut methods: Vec<_> = self.routes.iter().collect();
        methods.sort_unstable_by(|(a, _), (b, _)| a.as_str().cmp(b.as_str()));
        methods.into_iter().flat_map(|(_, bucket)| bucket.iter())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Log every registered route at info level.
    pub fn dump_routes(&self) {
        info!(count = self.count, "Routing table");
        for entry in self.routes() {
            let handler = format!("{}::{}", entry.action.controller(), entry.action.name());
            info!(
                method = %entry.method,
                route = %entry.template,
                regex = entry.template.compiled_pattern().unwrap_or_default(),
                handler = %handler,
                "Route"
            );
        }
    }
}

/// Registration helper bound to one controller and its route prefix.
pub struct ControllerScope<'a> {
    router: &'a mut Router,
    controller: ControllerId,
    prefix: String,
}

impl ControllerScope<'_> {
    #[must_use]
    pub fn id(&self) -> &ControllerId {
        &self.controller
    }

    /// Register `handler` as action `name` under this controller's prefix.
    ///
    /// # Errors
    ///
    /// See [`Router::register`].
    pub fn route<Args, H: IntoAction<Args>>(
        &mut self,
        method: Method,
        pattern: &str,
        name: &str,
        handler: H,
    ) -> Result<&mut Self, RegistrationError> {
        let action = Action::new(&self.controller, name, handler);
        self.router.register(method, &self.prefix, pattern, action)?;
        Ok(self)
    }

    /// # Errors
    ///
    /// See [`Router::register`].
    pub fn get<Args, H: IntoAction<Args>>(
        &mut self,
        pattern: &str,
        name: &str,
        handler: H,
    ) -> Result<&mut Self, RegistrationError> {
        self.route(Method::GET, pattern, name, handler)
    }

    /// # Errors
    ///
    /// See [`Router::register`].
    pub fn post<Args, H: IntoAction<Args>>(
        &mut self,
        pattern: &str,
        name: &str,
        handler: H,
    ) -> Result<&mut Self, RegistrationError> {
        self.route(Method::POST, pattern, name, handler)
    }

    /// # Errors
    ///
    /// See [`Router::register`].
    pub fn put<Args, H: IntoAction<Args>>(
        &mut self,
        pattern: &str,
        name: &str,
        handler: H,
    ) -> Result<&mut Self, RegistrationError> {
        self.route(Method::PUT, pattern, name, handler)
    }

    /// # Errors
    ///
    /// See [`Router::register`].
    pub fn delete<Args, H: IntoAction<Args>>(
        &mut self,
        pattern: &str,
        name: &str,
        handler: H,
    ) -> Result<&mut Self, RegistrationError> {
        self.route(Method::DELETE, pattern, name, handler)
    }
}
