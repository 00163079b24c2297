//! Errors raised while loading a shortload configuration

use std::path::PathBuf;
use thiserror::Error;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A `SHORTLOAD_*` override that does not parse
    #[error("{var}={value:?}: {reason}")]
    Env {
        var: String,
        value: String,
        reason: String,
    },

    /// A value that parsed but breaks a rule of its section
    #[error("invalid {section} settings: {message}")]
    Invalid { section: String, message: String },
}
