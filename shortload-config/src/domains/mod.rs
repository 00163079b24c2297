//! Domain-specific configuration modules

pub mod http;
pub mod logging;
pub mod target;
pub mod workload;

use crate::error::ConfigResult;
use crate::validation::Validatable;
use serde::{Deserialize, Serialize};

const SAMPLE_HEADER: &str = "\
# shortload configuration
#
# Durations take humantime values such as 500ms, 90s or 5m.
# workload.iterations and workload.duration are both optional:
#   neither set      -> 10000 iterations shared by all VUs
#   duration only    -> time-bound, runs until the duration elapses
#   iterations only  -> runs until the budget is spent
#   both             -> whichever limit is reached first
# The same rule applies per layer: SHORTLOAD_DURATION or --duration without
# an iteration count also drops any iteration count set in this file.
";

/// Main shortload configuration combining all domains
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ShortloadConfig {
    /// Target service endpoints
    #[serde(default)]
    pub target: target::TargetConfig,

    /// Pool size, setup policy and VU scheduling
    #[serde(default)]
    pub workload: workload::WorkloadConfig,

    /// HTTP client configuration
    #[serde(default)]
    pub http: http::HttpConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: logging::LoggingConfig,
}

impl ShortloadConfig {
    /// Validate all domain configurations
    pub fn validate_all(&self) -> ConfigResult<()> {
        self.target.validate()?;
        self.workload.validate()?;
        self.http.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Generate a sample configuration file
    pub fn generate_sample() -> String {
        let config = ShortloadConfig::default();
        match serde_yaml::to_string(&config) {
            Ok(body) => format!("{}{}", SAMPLE_HEADER, body),
            Err(_) => "# Failed to generate sample config".to_string(),
        }
    }
}
