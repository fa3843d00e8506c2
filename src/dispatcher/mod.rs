//! # Dispatcher Module
//!
//! The dispatcher turns a matched route into a response.
//!
//! ## Request Flow
//!
//! 1. [`Router::route`](crate::router::Router::route) selects a template for
//!    `(method, path)`, or nothing (404)
//! 2. The template extracts typed path parameters
//! 3. Global middleware runs, then middleware scoped to the action's controller;
//!    any unit may end the response and skip everything after it
//! 4. Extracted values are bound positionally to the handler's arguments
//! 5. The handler's return value becomes the 200 body; a failure becomes a 500
//!
//! ## Handler Registration
//!
//! Handlers are plain functions wrapped in an [`Action`]. The binding shape is
//! resolved once, when the action is built:
//!
//! ```rust
//! use http::Method;
//! use routeplate::dispatcher::{Action, ActionContext, ControllerId, Dispatcher};
//! use routeplate::middleware::MiddlewareChain;
//! use routeplate::router::Router;
//! use routeplate::server::HandlerRequest;
//!
//! fn get_book(_ctx: &mut ActionContext<'_>, id: i64) -> anyhow::Result<String> {
//!     Ok(format!("book {id}"))
//! }
//!
//! let books = ControllerId::new("books");
//! let mut router = Router::new();
//! router
//!     .register(Method::GET, "books", "{long:id}", Action::new(&books, "get_book", get_book))
//!     .unwrap();
//!
//! let dispatcher = Dispatcher::new(router, MiddlewareChain::new());
//! let outcome = dispatcher.dispatch(HandlerRequest::new(Method::GET, "/books/42"));
//! assert_eq!(outcome.status(), 200);
//! ```
//!
//! ## Error Handling
//!
//! - No matching route: 404, logged at info
//! - Parameter conversion, binding, middleware or handler failure: 500 with the
//!   error message as body, logged at error
//! - Handler panics are caught and treated as handler failures

mod core;

pub use self::core::{
    Action, ActionContext, ControllerId, Disposition, DispatchOutcome, Dispatcher, FromPathValue,
    IntoAction, InvokeFn,
};
