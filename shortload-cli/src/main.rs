use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser};
use shortload_config::{ConfigLoader, LogLevel, ShortloadConfig};
use shortload_logging::{init_logging_from_config, init_simple_tracing};
use std::path::PathBuf;
use tracing::{debug, info};

mod cli;
mod commands;

use cli::{Cli, Commands, ConfigCommands};

/// Load configuration from file or use defaults
fn load_config(config_path: Option<&PathBuf>) -> Result<ShortloadConfig> {
    let loader = ConfigLoader::new();

    match config_path {
        Some(path) => {
            if !path.exists() {
                return Err(anyhow!("Configuration file not found: {:?}", path));
            }
            info!("Loading configuration from: {:?}", path);
            loader
                .from_file(path)
                .context(format!("Failed to load configuration from {:?}", path))
        }
        None => {
            debug!("No configuration file specified. Loading from environment or defaults.");
            loader
                .from_env()
                .context("Failed to load configuration from environment")
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    // Config file commands work on files that may not load yet
    if let Commands::Config { config_cmd } = &command {
        match config_cmd {
            ConfigCommands::Validate { config_file } => {
                init_simple_tracing(cli.log_level.as_deref())?;
                let path = config_file.as_ref().or(cli.config.as_ref()).ok_or_else(|| {
                    anyhow!("No configuration file given. Use --config-file or --config")
                })?;
                return commands::config::validate(path);
            }
            ConfigCommands::Generate { output, force } => {
                init_simple_tracing(cli.log_level.as_deref())?;
                return commands::config::generate(output.as_deref(), *force);
            }
            ConfigCommands::Show { .. } => {}
        }
    }

    let mut config = load_config(cli.config.as_ref())?;
    let level_override = cli
        .log_level
        .as_deref()
        .map(str::parse::<LogLevel>)
        .transpose()
        .map_err(anyhow::Error::msg)?;
    init_logging_from_config(&config.logging, level_override)?;

    match command {
        Commands::Run(args) => {
            args.apply(&mut config)?;
            commands::run::execute(&config, args.output).await
        }
        Commands::Config {
            config_cmd: ConfigCommands::Show { format },
        } => {
            println!("{}", commands::config::show(&config, &format)?);
            Ok(())
        }
        Commands::Config { .. } => Ok(()),
    }
}
