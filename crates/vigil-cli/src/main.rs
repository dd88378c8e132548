//! `vigil`: command-line desk for the health alert API.
//!
//! # Usage
//!
//! ```text
//! vigil login --username dho.gulu
//! vigil alerts list --status Alive --district Gulu
//! vigil alerts verify 42 --file verification.json
//! vigil --url https://alerts.example.org/api/v1 alerts stats
//! ```

mod commands;
mod render;
mod settings;

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand};
use settings::Settings;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "vigil", version, about = "Health alert reporting and case management")]
struct Cli {
  /// Path to a TOML config file (api_base_url, timeout_secs, session_file).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the alert API; overrides config and environment.
  #[arg(long)]
  url: Option<String>,

  /// Increase log verbosity (-v info, -vv debug).
  #[arg(short, long, action = ArgAction::Count, global = true)]
  verbose: u8,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Sign in and store the session token.
  Login {
    #[arg(short, long, env = "VIGIL_USERNAME")]
    username: Option<String>,
    #[arg(long, env = "VIGIL_PASSWORD", hide_env_values = true)]
    password: Option<String>,
  },
  /// Sign out and clear the stored session.
  Logout,
  /// Show who is signed in and whether the token is still valid.
  Status,
  #[command(subcommand)]
  Alerts(AlertCommand),
  #[command(subcommand)]
  Users(UserCommand),
}

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
  /// Alive, Dead, Unknown or all.
  #[arg(long, default_value = "all")]
  pub status:   String,
  #[arg(long, default_value = "all")]
  pub district: String,
  #[arg(long, default_value = "all")]
  pub source:   String,
  /// Calendar day, YYYY-MM-DD.
  #[arg(long, default_value = "")]
  pub date:     String,
}

#[derive(Subcommand, Debug)]
pub enum AlertCommand {
  /// List alerts, optionally filtered.
  List {
    #[command(flatten)]
    filter: FilterArgs,
    /// Print JSON instead of a table.
    #[arg(long)]
    json:   bool,
  },
  /// Show one alert.
  Show { id: u64 },
  /// Dashboard counters.
  Stats {
    #[arg(long)]
    json: bool,
  },
  /// Write the (filtered) list as CSV.
  Export {
    #[command(flatten)]
    filter: FilterArgs,
    /// Output file; defaults to alerts_export_<date>.csv.
    #[arg(short, long)]
    out:    Option<PathBuf>,
  },
  /// Submit a public alert from a JSON file. No login required.
  Report {
    #[arg(long)]
    file: PathBuf,
  },
  /// Apply a partial update from a JSON file.
  Update {
    id:   u64,
    #[arg(long)]
    file: PathBuf,
  },
  /// Permanently delete an alert.
  Delete { id: u64 },
  /// Verify an alert using a completed form in a JSON file.
  Verify {
    id:   u64,
    #[arg(long)]
    file: PathBuf,
  },
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
  List,
  Create {
    #[arg(long)]
    file: PathBuf,
  },
  Update {
    id:   u64,
    #[arg(long)]
    file: PathBuf,
  },
  Delete { id: u64 },
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();

  let default_level = match cli.verbose {
    0 => LevelFilter::WARN,
    1 => LevelFilter::INFO,
    _ => LevelFilter::DEBUG,
  };
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy(),
    )
    .init();

  let mut settings = Settings::load(cli.config.as_deref())?;
  if let Some(url) = cli.url {
    settings.api_base_url = url;
  }
  tracing::debug!(base_url = %settings.api_base_url, "settings loaded");

  commands::run(&settings, cli.command).await
}
