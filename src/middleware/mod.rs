//! # Middleware Module
//!
//! Ordered request interceptors. Global units run for every request; units
//! scoped to a controller run only for that controller's actions, after all
//! global units. The chain stops as soon as a unit ends the response.

mod core;
mod cors;
mod tracing;

pub use self::core::{ChainOutcome, Middleware, MiddlewareChain, MiddlewareScope};
pub use self::cors::CorsMiddleware;
pub use self::tracing::TracingMiddleware;
