//! Configuration loading and environment variable handling

use crate::domains::ShortloadConfig;
use crate::duration::parse_duration;
use crate::error::{ConfigError, ConfigResult};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Configuration loader with environment variable support
pub struct ConfigLoader {
    /// Environment variable prefix
    prefix: String,
}

impl ConfigLoader {
    /// Create a new config loader with default prefix
    pub fn new() -> Self {
        Self {
            prefix: "SHORTLOAD".to_string(),
        }
    }

    /// Create a new config loader with custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Load configuration from a YAML file with environment overrides
    pub fn from_file(&self, path: impl AsRef<Path>) -> ConfigResult<ShortloadConfig> {
        let path = path.as_ref();
        log::debug!("Loading configuration from {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: ShortloadConfig = serde_yaml::from_str(&content)?;

        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env(&self) -> ConfigResult<ShortloadConfig> {
        let mut config = ShortloadConfig::default();
        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Load configuration with fallback chain
    pub fn load(&self, config_path: Option<impl AsRef<Path>>) -> ConfigResult<ShortloadConfig> {
        match config_path {
            Some(path) => self.from_file(path),
            None => self.from_env(),
        }
    }

    /// Apply environment variable overrides to configuration
    fn apply_env_overrides(&self, config: &mut ShortloadConfig) -> ConfigResult<()> {
        self.apply_target_overrides(&mut config.target)?;
        self.apply_workload_overrides(&mut config.workload)?;
        self.apply_http_overrides(&mut config.http)?;
        self.apply_logging_overrides(&mut config.logging)?;
        Ok(())
    }

    fn apply_target_overrides(
        &self,
        config: &mut crate::domains::target::TargetConfig,
    ) -> ConfigResult<()> {
        if let Ok(endpoint) = self.get_env_var("ADMIN_ENDPOINT") {
            config.admin_endpoint = endpoint;
        }

        if let Ok(base) = self.get_env_var("REDIRECT_BASE_URL") {
            config.redirect_base_url = base;
        }

        if let Ok(target) = self.get_env_var("TARGET_URL") {
            config.target_url = target;
        }

        Ok(())
    }

    fn apply_workload_overrides(
        &self,
        config: &mut crate::domains::workload::WorkloadConfig,
    ) -> ConfigResult<()> {
        if let Some(pool_size) = self.parse_env_var::<usize>("POOL_SIZE")? {
            config.pool_size = pool_size;
        }

        if let Some(vus) = self.parse_env_var::<usize>("VUS")? {
            config.vus = vus;
        }

        let iterations = self.parse_env_var::<u64>("ITERATIONS")?;
        let duration = self.env_duration("DURATION")?;
        match (iterations, duration) {
            (Some(iterations), duration) => {
                config.iterations = Some(iterations);
                config.duration = duration.or(config.duration);
            }
            // A layer that only sets a duration makes the run time-bound
            (None, Some(duration)) => {
                config.iterations = None;
                config.duration = Some(duration);
            }
            (None, None) => {}
        }

        if let Some(seed) = self.parse_env_var::<u64>("SEED")? {
            config.seed = Some(seed);
        }

        if let Ok(policy) = self.get_env_var("SETUP_POLICY") {
            config.setup_policy = crate::domains::workload::SetupPolicy::from_str(&policy)
                .map_err(|reason| self.env_error("SETUP_POLICY", &policy, reason))?;
        }

        Ok(())
    }

    /// Apply HTTP config overrides
    fn apply_http_overrides(
        &self,
        config: &mut crate::domains::http::HttpConfig,
    ) -> ConfigResult<()> {
        if let Some(timeout) = self.env_duration("HTTP_TIMEOUT")? {
            config.timeout = timeout;
        }

        if let Some(connect_timeout) = self.env_duration("HTTP_CONNECT_TIMEOUT")? {
            config.connect_timeout = connect_timeout;
        }

        if let Some(max_redirects) = self.parse_env_var::<u32>("HTTP_MAX_REDIRECTS")? {
            config.max_redirects = max_redirects;
        }

        if let Ok(user_agent) = self.get_env_var("HTTP_USER_AGENT") {
            config.user_agent = user_agent;
        }

        if let Some(verify_ssl) = self.parse_env_var::<bool>("HTTP_VERIFY_SSL")? {
            config.verify_ssl = verify_ssl;
        }

        Ok(())
    }

    /// Apply logging config overrides
    fn apply_logging_overrides(
        &self,
        config: &mut crate::domains::logging::LoggingConfig,
    ) -> ConfigResult<()> {
        if let Ok(log_level) = self.get_env_var("LOG_LEVEL") {
            config.level = crate::domains::logging::LogLevel::from_str(&log_level)
                .map_err(|reason| self.env_error("LOG_LEVEL", &log_level, reason))?;
        }

        if let Ok(format) = self.get_env_var("LOG_FORMAT") {
            config.format = crate::domains::logging::LogFormat::from_str(&format)
                .map_err(|reason| self.env_error("LOG_FORMAT", &format, reason))?;
        }

        Ok(())
    }

    /// Get environment variable with prefix
    fn get_env_var(&self, name: &str) -> Result<String, std::env::VarError> {
        std::env::var(format!("{}_{}", self.prefix, name))
    }

    /// Parse a prefixed environment variable if it is set
    fn parse_env_var<T>(&self, name: &str) -> ConfigResult<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get_env_var(name) {
            Ok(raw) => raw
                .trim()
                .parse()
                .map(Some)
                .map_err(|e: T::Err| self.env_error(name, &raw, e)),
            Err(_) => Ok(None),
        }
    }

    /// Parse a prefixed duration variable: `30` is seconds, `500ms` or `5m` carry a unit
    fn env_duration(&self, name: &str) -> ConfigResult<Option<Duration>> {
        match self.get_env_var(name) {
            Ok(raw) => parse_duration(&raw)
                .map(Some)
                .map_err(|reason| self.env_error(name, &raw, reason)),
            Err(_) => Ok(None),
        }
    }

    fn env_error(&self, name: &str, value: &str, reason: impl std::fmt::Display) -> ConfigError {
        ConfigError::Env {
            var: format!("{}_{}", self.prefix, name),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::workload::SetupPolicy;
    use std::io::Write;

    #[test]
    fn test_from_env_defaults() {
        let loader = ConfigLoader::with_prefix("SHORTLOAD_TEST_DEFAULTS");
        let config = loader.from_env().unwrap();
        assert_eq!(config, ShortloadConfig::default());
    }

    #[test]
    fn test_env_overrides() {
        temp_env::with_vars(
            [
                ("SLTEST_ADMIN_ENDPOINT", Some("http://10.0.0.5:8080/admin/tokens")),
                ("SLTEST_POOL_SIZE", Some("25")),
                ("SLTEST_VUS", Some("4")),
                ("SLTEST_DURATION", Some("45s")),
                ("SLTEST_HTTP_TIMEOUT", Some("2500ms")),
                ("SLTEST_SETUP_POLICY", Some("fail_fast")),
                ("SLTEST_LOG_LEVEL", Some("debug")),
            ],
            || {
                let config = ConfigLoader::with_prefix("SLTEST").from_env().unwrap();
                assert_eq!(config.target.admin_endpoint, "http://10.0.0.5:8080/admin/tokens");
                assert_eq!(config.workload.pool_size, 25);
                assert_eq!(config.workload.vus, 4);
                assert_eq!(config.workload.duration, Some(Duration::from_secs(45)));
                assert_eq!(config.workload.iterations, None);
                assert_eq!(config.http.timeout, Duration::from_millis(2500));
                assert_eq!(config.workload.setup_policy, SetupPolicy::FailFast);
                assert_eq!(
                    config.logging.level,
                    crate::domains::logging::LogLevel::Debug
                );
            },
        );
    }

    #[test]
    fn test_invalid_env_value() {
        temp_env::with_var("SLBAD_POOL_SIZE", Some("lots"), || {
            let err = ConfigLoader::with_prefix("SLBAD").from_env().unwrap_err();
            match err {
                ConfigError::Env { var, value, .. } => {
                    assert_eq!(var, "SLBAD_POOL_SIZE");
                    assert_eq!(value, "lots");
                }
                other => panic!("unexpected error: {other}"),
            }
        });

        temp_env::with_var("SLBADDUR_DURATION", Some("later"), || {
            let err = ConfigLoader::with_prefix("SLBADDUR").from_env().unwrap_err();
            assert!(matches!(err, ConfigError::Env { .. }));
        });
    }

    #[test]
    fn test_env_override_still_validated() {
        temp_env::with_var("SLZERO_VUS", Some("0"), || {
            let err = ConfigLoader::with_prefix("SLZERO").from_env().unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { .. }));
        });
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "target:\n  redirect_base_url: \"http://127.0.0.1:9000\"\nworkload:\n  pool_size: 3\n  iterations: 12\n"
        )
        .unwrap();

        let loader = ConfigLoader::with_prefix("SHORTLOAD_TEST_FILE");
        let config = loader.load(Some(file.path())).unwrap();
        assert_eq!(config.target.redirect_base_url, "http://127.0.0.1:9000");
        assert_eq!(config.workload.pool_size, 3);
        assert_eq!(config.workload.iterations, Some(12));
    }

    #[test]
    fn test_env_duration_makes_file_run_time_bound() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "workload:\n  iterations: 12\n  duration: 1m\n").unwrap();

        temp_env::with_var("SLDUR_DURATION", Some("20s"), || {
            let config = ConfigLoader::with_prefix("SLDUR").from_file(file.path()).unwrap();
            assert_eq!(config.workload.iterations, None);
            assert_eq!(config.workload.duration, Some(Duration::from_secs(20)));
        });

        temp_env::with_vars(
            [
                ("SLBOTH_DURATION", Some("20s")),
                ("SLBOTH_ITERATIONS", Some("7")),
            ],
            || {
                let config = ConfigLoader::with_prefix("SLBOTH").from_file(file.path()).unwrap();
                assert_eq!(config.workload.iterations, Some(7));
                assert_eq!(config.workload.duration, Some(Duration::from_secs(20)));
            },
        );
    }

    #[test]
    fn test_missing_file() {
        let loader = ConfigLoader::new();
        let err = loader.from_file("/nonexistent/shortload.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { ref path, .. } if path.ends_with("shortload.yaml")));
    }
}
