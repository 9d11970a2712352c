use crate::config::env_file::DEFAULT_ENV_FILE;
use crate::utils::error::{Result, SoleilError};
use crate::utils::time::parse_date;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_BIND: &str = "0.0.0.0:8001";

#[derive(Debug, Clone, Parser)]
#[command(name = "mme-soleil")]
#[command(about = "Madame Soleil: solar power production prediction service")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Environment file exported before the configuration is read
    #[arg(long, global = true, default_value = DEFAULT_ENV_FILE)]
    pub env_file: String,

    /// Read the configuration from the current environment only
    #[arg(long, global = true)]
    pub no_env_file: bool,

    #[arg(long, short, global = true, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CommonArgs {
    /// The env file to load, if any. An empty `--env-file` disables loading.
    pub fn env_file(&self) -> Option<PathBuf> {
        if self.no_env_file || self.env_file.trim().is_empty() {
            None
        } else {
            Some(PathBuf::from(&self.env_file))
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run the HTTP service and the hourly model job
    Serve(ServeArgs),
    /// Run the model once and print the forecast as CSV
    Forecast(ForecastArgs),
    /// Load and validate the configuration, then exit
    Check,
}

#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    #[arg(long, default_value = DEFAULT_BIND)]
    pub bind: String,
}

impl Default for ServeArgs {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

impl ServeArgs {
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.bind
            .parse()
            .map_err(|_| SoleilError::InvalidConfigValue {
                field: "--bind".to_string(),
                value: self.bind.clone(),
                reason: "expected an address like 0.0.0.0:8001".to_string(),
            })
    }
}

#[derive(Debug, Clone, Args)]
pub struct ForecastArgs {
    /// First day to model (YYYY-MM-DD), defaults to today
    #[arg(long, value_parser = parse_start_date)]
    pub start_date: Option<NaiveDate>,

    #[arg(long, default_value = "3")]
    pub days: u32,

    /// CSV file to write; stdout when omitted
    #[arg(long)]
    pub output: Option<PathBuf>,
}

fn parse_start_date(value: &str) -> std::result::Result<NaiveDate, String> {
    parse_date(value).ok_or_else(|| format!("'{}' is not a YYYY-MM-DD date", value))
}

impl Cli {
    /// The subcommand to run; `serve` with its defaults when none was given.
    pub fn command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or_else(|| Command::Serve(ServeArgs::default()))
    }
}
