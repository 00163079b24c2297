//! Workload shape: token pool size, setup policy and VU scheduling

use crate::error::ConfigResult;
use crate::validation::{validate_positive, Validatable};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Iteration budget of a run that sets neither `iterations` nor `duration`
pub const DEFAULT_ITERATIONS: u64 = 10_000;

/// Workload configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkloadConfig {
    /// Number of provisioning calls made during setup
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,

    /// How setup treats failed provisioning responses
    #[serde(default)]
    pub setup_policy: SetupPolicy,

    /// Number of concurrent virtual users
    #[serde(default = "default_vus")]
    pub vus: usize,

    /// Total iterations shared across all virtual users. Unset means
    /// [`DEFAULT_ITERATIONS`] unless `duration` is set, see
    /// [`WorkloadConfig::effective_iterations`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterations: Option<u64>,

    /// Wall-clock limit for the load phase, e.g. `90s` or `5m`
    #[serde(
        with = "humantime_serde",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub duration: Option<Duration>,

    /// Base seed for per-VU token sampling; VU `n` uses `seed + n`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// What setup does with a provisioning response that failed its check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SetupPolicy {
    /// Keep only 201 responses carrying a token; the pool may shrink
    #[default]
    SkipInvalid,
    /// Keep any extractable token even when the status check failed
    Lenient,
    /// Abort setup on the first failed check or missing token
    FailFast,
}

impl SetupPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SetupPolicy::SkipInvalid => "skip_invalid",
            SetupPolicy::Lenient => "lenient",
            SetupPolicy::FailFast => "fail_fast",
        }
    }
}

impl fmt::Display for SetupPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SetupPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "skip_invalid" | "skip" => Ok(SetupPolicy::SkipInvalid),
            "lenient" => Ok(SetupPolicy::Lenient),
            "fail_fast" | "abort" => Ok(SetupPolicy::FailFast),
            _ => Err(format!("Invalid setup policy: {}", s)),
        }
    }
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            pool_size: default_pool_size(),
            setup_policy: SetupPolicy::default(),
            vus: default_vus(),
            iterations: None,
            duration: None,
            seed: None,
        }
    }
}

impl WorkloadConfig {
    /// Iteration budget the run actually uses. A duration on its own makes
    /// the run time-bound; with neither limit set the default budget applies.
    pub fn effective_iterations(&self) -> Option<u64> {
        match (self.iterations, self.duration) {
            (Some(iterations), _) => Some(iterations),
            (None, Some(_)) => None,
            (None, None) => Some(DEFAULT_ITERATIONS),
        }
    }
}

impl Validatable for WorkloadConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_positive(self.pool_size, "pool_size", self.domain_name())?;
        validate_positive(self.vus, "vus", self.domain_name())?;

        if let Some(iterations) = self.iterations {
            validate_positive(iterations, "iterations", self.domain_name())?;
        }

        if self.duration.is_some_and(|d| d.is_zero()) {
            return Err(self.validation_error("duration must be greater than 0"));
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "workload"
    }
}

fn default_pool_size() -> usize {
    1000
}

fn default_vus() -> usize {
    10
}
