//! Domain-driven configuration management for shortload
//!
//! Configuration is split by functional domain (target service, workload
//! shape, HTTP client, logging), loaded from YAML with `SHORTLOAD_*`
//! environment overrides, and validated before use.

pub mod duration;
pub mod error;
pub mod loader;
pub mod validation;

// Domain-specific configuration modules
pub mod domains;

// Re-export main types
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;

// Re-export domain configurations
pub use domains::{
    http::HttpConfig,
    logging::{LogFormat, LogLevel, LoggingConfig},
    target::TargetConfig,
    workload::{SetupPolicy, WorkloadConfig, DEFAULT_ITERATIONS},
    ShortloadConfig,
};

pub use duration::parse_duration;
