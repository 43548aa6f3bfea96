//! summary-server: text summarization over HTTP.
//!
//! One inference provider is loaded at startup and shared by every request
//! to `POST /summarize`. The summarization capability itself is an opaque
//! backend behind the [`inference::backend::Summarizer`] trait.

pub mod config;
pub mod error;
pub mod inference;
pub mod server;
