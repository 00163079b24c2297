use anyhow::Result;
use shortload_config::{LogFormat, LogLevel, LoggingConfig};
use tracing_subscriber::EnvFilter;

/// Build the `EnvFilter` directive string for a logging configuration
pub fn filter_directives(config: &LoggingConfig) -> String {
    directives_at(config.level, &config.directives)
}

fn directives_at(level: LogLevel, extra: &[String]) -> String {
    std::iter::once(level.to_string())
        .chain(extra.iter().cloned())
        .collect::<Vec<_>>()
        .join(",")
}

/// Resolve the filter for a run
///
/// An explicit level (`--log-level`) wins. Without one, a valid `RUST_LOG`
/// replaces the configured level and directives.
pub fn build_env_filter(config: &LoggingConfig, level_override: Option<LogLevel>) -> EnvFilter {
    let configured = || {
        EnvFilter::try_new(filter_directives(config)).unwrap_or_else(|_| EnvFilter::new("info"))
    };

    match level_override {
        Some(level) => EnvFilter::try_new(directives_at(level, &config.directives))
            .unwrap_or_else(|_| configured()),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| configured()),
    }
}

/// Initialize logging from configuration
pub fn init_logging_from_config(
    config: &LoggingConfig,
    level_override: Option<LogLevel>,
) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(build_env_filter(config, level_override))
        .with_writer(std::io::stderr)
        .with_file(config.include_location)
        .with_line_number(config.include_location);

    // Use try_init to avoid panic if global subscriber already set
    let result = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Text => builder.try_init(),
    };

    if result.is_err() {
        tracing::debug!("Global tracing subscriber already initialized, skipping");
    }

    Ok(())
}

/// Initialize plain console tracing: `log_level`, else `RUST_LOG`, else warnings only
pub fn init_simple_tracing(log_level: Option<&str>) -> Result<()> {
    let env_filter = match log_level {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    if tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_err()
    {
        tracing::debug!("Global tracing subscriber already initialized, skipping");
    }

    Ok(())
}
