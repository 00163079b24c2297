//! `shortload run`: provision the pool, then drive the redirect workload

use crate::cli::OutputFormat;
use anyhow::{bail, Context, Result};
use shortload_config::ShortloadConfig;
use shortload_core::{LoadRunner, RunSummary};
use tracing::{info, warn};

pub async fn execute(config: &ShortloadConfig, output: OutputFormat) -> Result<()> {
    let runner = LoadRunner::from_config(config).context("Failed to build HTTP client")?;

    info!(
        admin_endpoint = %config.target.admin_endpoint,
        redirect_base_url = %config.target.redirect_base_url,
        pool_size = config.workload.pool_size,
        policy = %config.workload.setup_policy,
        "Starting run"
    );

    let summary = runner
        .run_until(shutdown_signal())
        .await
        .context("Run aborted")?;

    println!("{}", render(&summary, output)?);

    if summary.has_failures() {
        bail!(
            "{} check(s) failed ({:.2}% failure rate)",
            summary.failed_checks(),
            summary.check_failure_rate * 100.0
        );
    }

    Ok(())
}

/// Format a summary for stdout
pub fn render(summary: &RunSummary, output: OutputFormat) -> Result<String> {
    match output {
        OutputFormat::Text => Ok(summary.render_text().trim_end().to_string()),
        OutputFormat::Json => {
            serde_json::to_string_pretty(summary).context("Failed to format summary as JSON")
        }
        OutputFormat::Yaml => {
            serde_yaml::to_string(summary).context("Failed to format summary as YAML")
        }
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => warn!("Interrupt received, stopping run"),
        Err(e) => {
            warn!(error = %e, "Unable to listen for interrupt signal");
            std::future::pending::<()>().await
        }
    }
}
