//! Layered runtime settings: defaults, then `spurpoint.toml`, then
//! `SPURPOINT_*` environment variables. CLI flags are applied by the caller.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::Context as _;
use serde::Deserialize;
use spurpoint_aprs::{AprsConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use spurpoint_core::message::ReceivedAtZone;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  /// SQLite file holding messages and preferences.
  pub database_path: PathBuf,
  pub api_url:       String,
  pub timeout_secs:  u64,
  /// Zone used to render `received_at` for newly ingested messages.
  pub time_zone:     ReceivedAtZone,
  /// Log destination while the table view owns the terminal.
  pub log_file:      PathBuf,
}

impl Settings {
  /// Load settings from `path` (optional) and the environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .set_default("database_path", "spurpoint.db")?
      .set_default("api_url", DEFAULT_BASE_URL)?
      .set_default("timeout_secs", DEFAULT_TIMEOUT.as_secs() as i64)?
      .set_default("time_zone", "local")?
      .set_default("log_file", "spurpoint.log")?
      .add_source(config::File::from(path.to_path_buf()).required(false))
      .add_source(config::Environment::with_prefix("SPURPOINT"))
      .build()
      .context("failed to read config file")?;

    settings
      .try_deserialize()
      .context("failed to deserialise settings")
  }

  /// HTTP timeout, kept within 3..=10 seconds.
  pub fn timeout(&self) -> Duration { Duration::from_secs(self.timeout_secs.clamp(3, 10)) }

  pub fn database_path(&self) -> PathBuf { expand_tilde(&self.database_path) }

  pub fn log_file(&self) -> PathBuf { expand_tilde(&self.log_file) }

  pub fn aprs_config(&self) -> AprsConfig {
    AprsConfig { base_url: self.api_url.clone(), timeout: self.timeout() }
  }
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
