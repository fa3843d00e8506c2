//! # routeplate
//!
//! **routeplate** is a template-driven HTTP routing layer. It compiles
//! declarative route templates into matchers, selects the route for an
//! incoming `(method, path)`, converts path parameters to typed values, and
//! runs the request through an ordered middleware chain to a handler.
//!
//! ## Architecture
//!
//! - **[`router`]** - route template compiler and the route table
//! - **[`middleware`]** - short-circuiting middleware chain, CORS preflight handling
//! - **[`dispatcher`]** - handler descriptors, parameter binding, error mapping
//! - **[`server`]** - request and response types handed to middleware and handlers
//! - **[`config`]** / **[`logging`]** - startup configuration and `tracing` setup
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Transport
//!     participant Dispatcher
//!     participant Router
//!     participant Chain as Middleware Chain
//!     participant Handler
//!
//!     Transport->>Dispatcher: dispatch(GET /books/novel/42.html)
//!     Dispatcher->>Router: route(GET, path)
//!     alt No Route Match
//!         Dispatcher-->>Transport: 404 Not Found
//!     end
//!     Router-->>Dispatcher: RouteEntry
//!     Dispatcher->>Dispatcher: extract {category: "novel", id: 42}
//!     Dispatcher->>Chain: global, then controller-scoped
//!     alt Response ended by middleware
//!         Chain-->>Transport: response as written
//!     end
//!     Dispatcher->>Handler: show(ctx, "novel", 42)
//!     alt Handler failed
//!         Dispatcher-->>Transport: 500 + message
//!     end
//!     Handler-->>Transport: 200 + body
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use http::Method;
//! use routeplate::dispatcher::{ActionContext, Dispatcher, Disposition};
//! use routeplate::middleware::{CorsMiddleware, MiddlewareChain};
//! use routeplate::router::Router;
//! use routeplate::server::HandlerRequest;
//!
//! fn show(_ctx: &mut ActionContext<'_>, category: String, id: i32) -> anyhow::Result<String> {
//!     Ok(format!("{category} #{id}"))
//! }
//!
//! let mut router = Router::new();
//! router
//!     .controller("books", "books")
//!     .get("{string:category}/{int:id}.html", "show", show)
//!     .unwrap();
//!
//! let mut chain = MiddlewareChain::new();
//! chain.add_global(CorsMiddleware::new(["http://localhost"]));
//!
//! let dispatcher = Dispatcher::new(router, chain);
//! let outcome = dispatcher.dispatch(HandlerRequest::new(Method::GET, "/books/novel/42.html"));
//! assert!(matches!(outcome.disposition, Disposition::Handled));
//! assert_eq!(outcome.status(), 200);
//! ```

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod ids;
pub mod logging;
pub mod middleware;
pub mod router;
pub mod server;

pub use config::RouterConfig;
pub use dispatcher::{Action, ActionContext, ControllerId, Dispatcher, Disposition};
pub use error::{DispatchError, ParamConversionError, RegistrationError, TemplateError};
pub use middleware::{CorsMiddleware, Middleware, MiddlewareChain};
pub use router::{ParamKind, PathValue, RouteTemplate, Router};
pub use server::{HandlerRequest, HandlerResponse};
