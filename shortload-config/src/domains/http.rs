//! Client settings shared by provisioning and redirect requests

use crate::error::ConfigResult;
use crate::validation::{validate_positive, validate_required_string, Validatable};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One client serves every VU, so the idle pool is sized for `vus` concurrent
/// connections to a single host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Whole-request deadline; a request that misses it fails its check
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,

    /// Only used by requests that follow redirects; redirect checks never do
    pub max_redirects: u32,

    pub user_agent: String,

    /// Set to `false` for targets with self-signed certificates
    pub verify_ssl: bool,

    pub max_idle_per_host: usize,

    #[serde(with = "humantime_serde")]
    pub idle_timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
            max_redirects: 10,
            user_agent: format!("shortload/{}", env!("CARGO_PKG_VERSION")),
            verify_ssl: true,
            max_idle_per_host: 100,
            idle_timeout: Duration::from_secs(90),
        }
    }
}

impl Validatable for HttpConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.timeout.is_zero() {
            return Err(self.validation_error("timeout must be greater than 0"));
        }
        if self.connect_timeout.is_zero() {
            return Err(self.validation_error("connect_timeout must be greater than 0"));
        }
        if self.connect_timeout > self.timeout {
            return Err(self.validation_error(format!(
                "connect_timeout ({:?}) cannot exceed timeout ({:?})",
                self.connect_timeout, self.timeout
            )));
        }
        if self.idle_timeout.is_zero() {
            return Err(self.validation_error("idle_timeout must be greater than 0"));
        }
        validate_positive(self.max_idle_per_host, "max_idle_per_host", self.domain_name())?;
        validate_required_string(&self.user_agent, "user_agent", self.domain_name())
    }

    fn domain_name(&self) -> &'static str {
        "http"
    }
}
