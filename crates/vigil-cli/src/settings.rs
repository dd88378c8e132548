//! Layered CLI settings: defaults, then the TOML file, then the environment.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::Context as _;
use serde::Deserialize;
use vigil_client::{ApiConfig, DEFAULT_BASE_URL};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  pub api_base_url: String,
  pub timeout_secs: u64,
  /// Where the login session is kept between invocations.
  #[serde(default)]
  pub session_file: Option<PathBuf>,
}

impl Settings {
  /// Read `file` (or `~/.config/vigil/config.toml` when `None`), then
  /// `NEXT_PUBLIC_*` and `VIGIL_*` environment variables. Later sources win.
  pub fn load(file: Option<&Path>) -> anyhow::Result<Self> { Self::load_with_env(file, None) }

  /// As [`Settings::load`], reading variables from `env` instead of the
  /// process environment when it is given.
  fn load_with_env(
    file: Option<&Path>,
    env: Option<config::Map<String, String>>,
  ) -> anyhow::Result<Self> {
    let mut builder = config::Config::builder()
      .set_default("api_base_url", DEFAULT_BASE_URL)?
      .set_default("timeout_secs", 30)?;

    let file = file.map(Path::to_path_buf).or_else(|| config_dir().map(|d| d.join("config.toml")));
    if let Some(path) = file {
      builder = builder.add_source(config::File::from(expand_tilde(&path)).required(false));
    }

    let settings = builder
      .add_source(config::Environment::with_prefix("NEXT_PUBLIC").source(env.clone()))
      .add_source(config::Environment::with_prefix("VIGIL").source(env))
      .build()
      .context("failed to read configuration")?;

    settings
      .try_deserialize()
      .context("failed to deserialise settings")
  }

  pub fn api_config(&self) -> ApiConfig {
    ApiConfig {
      base_url: self.api_base_url.clone(),
      timeout:  Duration::from_secs(self.timeout_secs),
    }
  }

  pub fn session_path(&self) -> PathBuf {
    match &self.session_file {
      Some(path) => expand_tilde(path),
      None => config_dir()
        .map(|d| d.join("session.json"))
        .unwrap_or_else(|| PathBuf::from(".vigil-session.json")),
    }
  }
}

fn config_dir() -> Option<PathBuf> {
  if let Ok(dir) = std::env::var("XDG_CONFIG_HOME")
    && !dir.is_empty()
  {
    return Some(PathBuf::from(dir).join("vigil"));
  }
  std::env::var("HOME")
    .ok()
    .map(|home| PathBuf::from(home).join(".config").join("vigil"))
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
