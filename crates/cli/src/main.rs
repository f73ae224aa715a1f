//! SCM CLI - command line client for the procurement portal API

mod commands;
mod config;
mod logging;

use anyhow::{Context as _, Result};
use clap::{Parser, ValueEnum};
use commands::{Commands, Context};
use scm_core::BrowserLocation;
use std::path::PathBuf;
use tracing::{Level, debug, error, warn};

#[derive(Parser)]
#[command(name = "scm")]
#[command(about = "Command line client for the SCM procurement portal API")]
#[command(version)]
struct Cli {
    /// Set logging level
    #[arg(short = 'l', long, global = true, default_value = "info")]
    log_level: LogLevel,

    /// State directory for settings, session and logs
    #[arg(short = 'd', long, global = true)]
    data_dir: Option<PathBuf>,

    /// Settings file (defaults to <data-dir>/config.toml)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Absolute backend URL or relative path prefix, overriding settings
    #[arg(long, global = true)]
    api_base: Option<String>,

    /// Page URL to discover the API origin from when no base is configured
    #[arg(long, global = true, env = "SCM_PAGE_URL")]
    location: Option<String>,

    /// Disable file logging (only log to stderr)
    #[arg(long, global = true)]
    no_file_log: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let state_dir = config::state_dir(cli.data_dir.clone());
    logging::init_logging(cli.log_level.into(), &state_dir, cli.no_file_log)?;

    let mut settings = config::load_settings(cli.config.as_deref(), &state_dir)?;
    if let Some(api_base) = cli.api_base {
        settings.api_base = Some(api_base);
    }

    let location = cli
        .location
        .as_deref()
        .map(BrowserLocation::parse)
        .transpose()
        .context("Invalid --location")?;

    let ctx = Context {
        state_dir,
        config_path: cli.config,
        settings,
        location,
    };

    debug!("Starting SCM CLI");

    tokio::select! {
        result = cli.command.execute(ctx) => {
            if let Err(e) = result {
                error!("Command failed: {e:#}");
                std::process::exit(1);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, request canceled");
            std::process::exit(130);
        }
    }

    Ok(())
}

#[derive(Clone, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}
