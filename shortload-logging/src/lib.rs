//! Logging setup for shortload
//!
//! Everything in the workspace logs through `tracing`; this crate installs
//! the global `tracing-subscriber` from the logging configuration.

pub mod init;

pub use init::{build_env_filter, filter_directives, init_logging_from_config, init_simple_tracing};
