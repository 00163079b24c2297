//! HTTP client functionality for shortload
//!
//! This crate provides the `HttpClient` seam the workload talks through, a
//! `reqwest`-backed implementation with per-request redirect control, and an
//! offline mock mode for tests.

pub mod client;
pub mod config;
pub mod errors;
pub mod types;

// Re-export main types for convenience
pub use client::{HttpClient, HttpManager};
pub use config::HttpConfig;
pub use errors::HttpError;
pub use types::{HttpMethod, HttpRequest, HttpResponse};
