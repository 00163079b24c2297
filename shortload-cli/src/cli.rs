//! CLI argument parsing definitions

use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use shortload_config::{SetupPolicy, ShortloadConfig};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(author, version, about = "Provision a token pool, then load-test its redirects", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Set the log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Provision the token pool and run the redirect workload
    Run(RunArgs),

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        config_cmd: ConfigCommands,
    },
}

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Number of concurrent virtual users
    #[arg(long, value_name = "N")]
    pub vus: Option<usize>,

    /// Total iterations shared across all VUs
    #[arg(long, value_name = "N")]
    pub iterations: Option<u64>,

    /// Load phase limit, e.g. 90s or 5m; without --iterations the run is time-bound only
    #[arg(long, value_name = "DURATION", value_parser = shortload_config::parse_duration)]
    pub duration: Option<Duration>,

    /// Number of tokens to provision during setup
    #[arg(long, value_name = "N")]
    pub pool_size: Option<usize>,

    /// What to do with failed provisioning responses: skip_invalid, lenient, fail_fast
    #[arg(long, value_name = "POLICY")]
    pub setup_policy: Option<SetupPolicy>,

    /// Token-issuance endpoint
    #[arg(long, value_name = "URL")]
    pub admin_endpoint: Option<String>,

    /// Base URL of the redirect service
    #[arg(long, value_name = "URL")]
    pub redirect_base_url: Option<String>,

    /// URL provisioned tokens should redirect to
    #[arg(long, value_name = "URL")]
    pub target_url: Option<String>,

    /// Seed for reproducible token sampling
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Summary format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Validate a configuration file
    Validate {
        /// Path to the configuration file (defaults to --config)
        #[arg(long, value_name = "PATH")]
        config_file: Option<PathBuf>,
    },

    /// Generate a sample configuration file
    Generate {
        /// Output file path; prints to stdout when omitted
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },

    /// Show the effective configuration
    Show {
        /// Output format: yaml, json
        #[arg(long, value_name = "FORMAT", default_value = "yaml")]
        format: String,
    },
}

impl RunArgs {
    /// Layer command-line overrides on top of the loaded configuration
    pub fn apply(&self, config: &mut ShortloadConfig) -> Result<()> {
        if let Some(vus) = self.vus {
            config.workload.vus = vus;
        }
        if let Some(pool_size) = self.pool_size {
            config.workload.pool_size = pool_size;
        }
        if let Some(policy) = self.setup_policy {
            config.workload.setup_policy = policy;
        }
        if let Some(seed) = self.seed {
            config.workload.seed = Some(seed);
        }

        match (self.iterations, self.duration) {
            (Some(iterations), duration) => {
                config.workload.iterations = Some(iterations);
                config.workload.duration = duration.or(config.workload.duration);
            }
            (None, Some(duration)) => {
                config.workload.iterations = None;
                config.workload.duration = Some(duration);
            }
            (None, None) => {}
        }

        if let Some(endpoint) = &self.admin_endpoint {
            config.target.admin_endpoint = endpoint.clone();
        }
        if let Some(base) = &self.redirect_base_url {
            config.target.redirect_base_url = base.clone();
        }
        if let Some(target) = &self.target_url {
            config.target.target_url = target.clone();
        }

        config
            .validate_all()
            .map_err(|e| anyhow!("Invalid run options: {}", e))
    }
}
