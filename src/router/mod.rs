//! # Router Module
//!
//! Route templates and the route table.
//!
//! ## Templates
//!
//! A route is declared as a controller prefix plus an action pattern. The
//! pattern mixes literal text, typed placeholders and wildcards:
//!
//! | Pattern piece | Matches | Captured as |
//! |---|---|---|
//! | `{int:id}` | `[0-9]+` | [`PathValue::Int`] |
//! | `{long:id}` | `[0-9]+` | [`PathValue::Long`] |
//! | `{string:slug}` / `{slug}` | `[0-9a-zA-Z-_]+` | [`PathValue::Str`] |
//! | `*` | `[0-9a-zA-Z-_./]*` across segments | nothing |
//!
//! `RouteTemplate::new("books", "{string:category}/{int:id}.html")` compiles
//! to `^/books/([0-9a-zA-Z\-_]+)/([0-9]+).html$`.
//!
//! ## Selection
//!
//! [`Router::route`] scans the routes registered for the request method.
//! Literal templates are tried first, then universal ones, each group in
//! registration order; the first match wins. No match means 404.
//!
//! ## Example
//!
//! ```rust
//! use http::Method;
//! use routeplate::dispatcher::ActionContext;
//! use routeplate::router::Router;
//!
//! fn show(_ctx: &mut ActionContext<'_>, id: String) -> anyhow::Result<String> {
//!     Ok(id)
//! }
//! fn list(_ctx: &mut ActionContext<'_>) -> anyhow::Result<&'static str> {
//!     Ok("list")
//! }
//!
//! let mut router = Router::new();
//! let mut books = router.controller("books", "/books");
//! books.get("{string:id}", "show", show).unwrap();
//! books.get("list", "list", list).unwrap();
//!
//! // The literal route wins although it was registered second.
//! let entry = router.route(&Method::GET, "/books/list").unwrap();
//! assert_eq!(entry.action.name(), "list");
//! ```

mod core;
mod template;
#[cfg(test)]
mod tests;

pub use self::core::{ControllerScope, RouteEntry, Router};
pub use self::template::{
    ParamKind, ParamSpec, ParamVec, PathParam, PathValue, RouteTemplate, MAX_INLINE_PARAMS,
};
