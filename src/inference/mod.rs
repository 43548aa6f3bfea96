//! Summarization inference.
//!
//! - [`backend`]: The `Summarizer` trait and its error type
//! - [`extractive`]: In-process extractive backend
//! - [`hub`]: Remote model-hub backend
//! - [`provider`]: Long-lived provider wrapping one backend
//! - [`tokens`]: Whitespace token accounting

pub mod backend;
pub mod extractive;
pub mod hub;
pub mod provider;
pub mod tokens;
