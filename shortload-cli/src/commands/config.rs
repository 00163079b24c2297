//! `shortload config` subcommands

use anyhow::{anyhow, bail, Context, Result};
use shortload_config::{ConfigLoader, ShortloadConfig};
use std::fs;
use std::path::Path;
use tracing::{error, info};

/// Load and validate a configuration file, environment overrides included
pub fn validate(config_file: &Path) -> Result<()> {
    info!("Validating configuration file: {:?}", config_file);

    if !config_file.exists() {
        bail!("Configuration file not found: {:?}", config_file);
    }

    match ConfigLoader::new().from_file(config_file) {
        Ok(_config) => {
            println!("✅ Configuration file is valid");
            info!("Configuration validation passed");
            Ok(())
        }
        Err(e) => {
            println!("❌ Configuration validation failed: {}", e);
            error!("Configuration validation failed: {}", e);
            Err(anyhow!(e))
        }
    }
}

/// Write the default configuration as YAML, or print it when no path is given
pub fn generate(output: Option<&Path>, force: bool) -> Result<()> {
    let content = ShortloadConfig::generate_sample();

    let Some(output) = output else {
        print!("{}", content);
        return Ok(());
    };

    info!("Generating configuration at: {:?}", output);

    if output.exists() && !force {
        bail!(
            "Output file already exists: {:?}. Use --force to overwrite.",
            output
        );
    }

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent).context("Failed to create output directory")?;
    }

    fs::write(output, content)
        .with_context(|| format!("Failed to write configuration to {:?}", output))?;
    println!("✅ Configuration written to {}", output.display());
    Ok(())
}

/// Render the effective configuration
pub fn show(config: &ShortloadConfig, format: &str) -> Result<String> {
    match format.to_lowercase().as_str() {
        "yaml" | "yml" => serde_yaml::to_string(config).context("Failed to format configuration"),
        "json" => serde_json::to_string_pretty(config).context("Failed to format configuration"),
        other => bail!("Unsupported format '{}'. Use yaml or json", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_generate_then_validate() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("shortload.yaml");

        generate(Some(&path), false).unwrap();
        assert!(path.exists());
        validate(&path).unwrap();
    }

    #[test]
    fn test_generate_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shortload.yaml");
        fs::write(&path, "existing").unwrap();

        assert!(generate(Some(&path), false).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "existing");

        generate(Some(&path), true).unwrap();
        assert_ne!(fs::read_to_string(&path).unwrap(), "existing");
    }

    #[test]
    fn test_validate_rejects_bad_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.yaml");
        fs::write(&path, "workload:\n  vus: 0\n").unwrap();

        assert!(validate(&path).is_err());
        assert!(validate(&dir.path().join("missing.yaml")).is_err());
    }

    #[test]
    fn test_show_formats() {
        let config = ShortloadConfig::default();
        let yaml = show(&config, "yaml").unwrap();
        assert!(yaml.contains("redirect_base_url"));

        let json = show(&config, "JSON").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["workload"]["vus"], 10);

        assert!(show(&config, "toml").is_err());
    }
}
