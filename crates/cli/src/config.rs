//! Configuration management for the CLI
//!
//! Settings are layered, highest precedence first: command-line flags (and
//! the `AWS_REGION` / `CLUSTER_NAME` variables clap reads for them),
//! `ECS_AUDIT_*` environment variables, then the JSON config file.

use crate::output::OutputFormat;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Persisted CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Default AWS region
    pub region: Option<String>,
    /// Default ECS cluster name
    pub cluster_name: Option<String>,
    /// Default output format
    pub format: Option<String>,
}

impl Config {
    /// Load configuration from file, returning defaults if it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).context("Failed to read config file")?;

        serde_json::from_str(&content).context("Failed to parse config file")
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs_next::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".config").join("ecs-audit").join("config.json"))
    }
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub region: Option<String>,
    pub cluster_name: Option<String>,
    pub format: Option<OutputFormat>,
}

/// Fully resolved audit settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditSettings {
    pub region: String,
    pub cluster_name: String,
    pub format: OutputFormat,
}

/// Resolve settings from the config file, environment and overrides
pub fn resolve_settings(config_path: &Path, overrides: CliOverrides) -> Result<AuditSettings> {
    let mut builder = config::Config::builder()
        .add_source(
            config::File::from(config_path)
                .format(config::FileFormat::Json)
                .required(false),
        )
        .add_source(config::Environment::with_prefix("ECS_AUDIT"));

    if let Some(region) = overrides.region {
        builder = builder.set_override("region", region)?;
    }
    if let Some(cluster_name) = overrides.cluster_name {
        builder = builder.set_override("cluster_name", cluster_name)?;
    }

    let layered: Config = builder
        .build()
        .context("Failed to load configuration")?
        .try_deserialize()
        .context("Invalid configuration")?;

    let region = non_empty(layered.region).context(
        "No AWS region configured (use --region, AWS_REGION or the config file)",
    )?;
    let cluster_name = non_empty(layered.cluster_name).context(
        "No cluster name configured (use --cluster, CLUSTER_NAME or the config file)",
    )?;

    let format = match (overrides.format, layered.format) {
        (Some(format), _) => format,
        (None, Some(name)) => OutputFormat::parse(&name)
            .with_context(|| format!("Unknown output format in configuration: {}", name))?,
        (None, None) => OutputFormat::default(),
    };

    Ok(AuditSettings {
        region,
        cluster_name,
        format,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
