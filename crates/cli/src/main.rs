//! ECS Capacity Audit CLI
//!
//! Audits the capacity configuration of an ECS cluster: counts the tasks its
//! EC2-launched services want, run and may scale to, and recommends host
//! counts for the auto-scaling group backing the cluster.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{resolve_settings, CliOverrides, Config};
use crate::output::{print_error, LogFormat, OutputFormat};

/// ECS Capacity Audit CLI
#[derive(Parser)]
#[command(name = "ecs-audit")]
#[command(author, version, about = "Capacity auditor for ECS clusters", long_about = None)]
pub struct Cli {
    /// AWS region of the cluster
    #[arg(long, env = "AWS_REGION", global = true)]
    pub region: Option<String>,

    /// ECS cluster name
    #[arg(long = "cluster", short = 'c', env = "CLUSTER_NAME", global = true)]
    pub cluster_name: Option<String>,

    /// Output format (defaults to the config file value, then text)
    #[arg(long, short, global = true)]
    pub format: Option<OutputFormat>,

    /// Path to the config file (default: ~/.config/ecs-audit/config.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Describe service batches one at a time instead of concurrently
    #[arg(long)]
    pub sequential_batches: bool,

    /// Write Prometheus text exposition to this file after the audit
    #[arg(long)]
    pub metrics_file: Option<PathBuf>,

    /// Diagnostic log format on stderr
    #[arg(long, default_value = "text")]
    pub log_format: LogFormat,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(long, short, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a capacity audit and print the report (default)
    Report,

    /// Inspect or write the config file
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the resolved settings
    Show,

    /// Save --region, --cluster and --format to the config file
    Init,
}

fn init_tracing(format: LogFormat, verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = match cli.config {
        Some(path) => path,
        None => Config::default_path()?,
    };
    let overrides = CliOverrides {
        region: cli.region,
        cluster_name: cli.cluster_name,
        format: cli.format,
    };

    match cli.command.unwrap_or(Commands::Report) {
        Commands::Report => {
            let settings = resolve_settings(&config_path, overrides)?;
            debug!(
                region = %settings.region,
                cluster = %settings.cluster_name,
                "Settings resolved"
            );

            let clients = client::AwsClients::connect(&settings.region)
                .await
                .into_audit_clients();
            commands::report::run_report(
                &settings,
                clients,
                !cli.sequential_batches,
                cli.metrics_file.as_deref(),
            )
            .await?;
        }
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::Show => commands::config::show_config(&config_path, overrides)?,
            ConfigCommands::Init => commands::config::init_config(&config_path, overrides)?,
        },
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_format, cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            print_error(&format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}
