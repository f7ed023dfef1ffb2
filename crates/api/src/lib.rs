//! HTTP layer for quill.
//!
//! Handlers stay thin: extract, call a service, render a view context
//! or redirect. Authentication rides on a Bearer token resolved by the
//! auth middleware; protected routes bounce anonymous visitors to the
//! login route with a `next` parameter.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{AppState, auth_middleware};
