//! # Server Module
//!
//! Request and response types shared by the router, the middleware chain and
//! the dispatcher. A transport layer (any HTTP server library) builds a
//! [`HandlerRequest`] from its wire request, hands it to
//! [`Dispatcher::dispatch`](crate::dispatcher::Dispatcher::dispatch), and
//! writes the returned [`HandlerResponse`] back to the client.
//!
//! The response carries a completion flag. Once a middleware unit or the
//! dispatcher ends the response, every later write is ignored, so a request
//! always produces exactly one well-formed response.

mod request;
mod response;

pub use request::{HandlerRequest, HeaderVec, MAX_INLINE_HEADERS};
pub use response::{HandlerResponse, ResponseBody};
