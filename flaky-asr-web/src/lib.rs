//! # Flaky ASR web utilities
//!
//! HTTP-facing pieces shared by the server: the error type that renders the
//! simulator's JSON error bodies, and the middleware that gates requests
//! through admission control and tags them with request ids.

pub mod errors;
pub mod middleware;

// Re-export commonly used types and functions
pub use errors::{ErrorBody, WebError, WebResult};
pub use middleware::{admission_middleware, request_id_middleware, RequestId, REQUEST_ID_HEADER};
