//! Configuration file commands

use anyhow::Result;
use std::path::Path;

use crate::config::{resolve_settings, CliOverrides, Config};
use crate::output::{print_success, OutputFormat};

/// Print the settings an audit would run with
pub fn show_config(config_path: &Path, overrides: CliOverrides) -> Result<()> {
    let settings = resolve_settings(config_path, overrides)?;
    println!("Config file:  {}", config_path.display());
    println!("Region:       {}", settings.region);
    println!("Cluster:      {}", settings.cluster_name);
    println!("Format:       {}", format_name(settings.format));
    Ok(())
}

/// Write the given values to the config file, keeping unset fields
pub fn init_config(config_path: &Path, overrides: CliOverrides) -> Result<()> {
    let mut config = Config::load(config_path)?;

    if let Some(region) = overrides.region {
        config.region = Some(region);
    }
    if let Some(cluster_name) = overrides.cluster_name {
        config.cluster_name = Some(cluster_name);
    }
    if let Some(format) = overrides.format {
        config.format = Some(format_name(format).to_string());
    }

    config.save(config_path)?;
    print_success(&format!("Configuration written to {}", config_path.display()));
    Ok(())
}

fn format_name(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Text => "text",
        OutputFormat::Table => "table",
        OutputFormat::Json => "json",
    }
}
