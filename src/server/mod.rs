//! HTTP server.
//!
//! - [`api`]: Router, shared state, and route handlers
//! - [`cors`]: Cross-origin policy layer
//! - [`metrics`]: Prometheus counters and histogram
//! - [`request`]: Strict/lenient request body parsing

pub mod api;
pub mod cors;
pub mod metrics;
pub mod request;
