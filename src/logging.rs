//! File logging.
//!
//! The terminal belongs to the UI, so every record goes to a log file through
//! a non-blocking writer. `USERDECK_LOG` takes precedence over the configured
//! level and accepts any `EnvFilter` directive.

use crate::config::LogConfig;
use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_ENV: &str = "USERDECK_LOG";

const LOG_FILE_NAME: &str = "userdeck.log";

/// Default log location: $XDG_DATA_HOME/userdeck/userdeck.log
pub fn default_log_path() -> Option<PathBuf> {
  dirs::data_dir().map(|d| d.join("userdeck").join(LOG_FILE_NAME))
}

fn filter_for(level: &str) -> EnvFilter {
  EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
  })
}

/// Install the global subscriber. Keep the returned guard alive until exit
/// or buffered records are lost.
pub fn init(config: &LogConfig) -> Result<WorkerGuard> {
  let path = config
    .file
    .clone()
    .or_else(default_log_path)
    .ok_or_else(|| eyre!("Could not determine a log file location; set log.file"))?;

  let dir = path
    .parent()
    .filter(|p| !p.as_os_str().is_empty())
    .map(PathBuf::from)
    .unwrap_or_else(|| PathBuf::from("."));
  std::fs::create_dir_all(&dir)?;

  let file_name = path
    .file_name()
    .ok_or_else(|| eyre!("Log path has no file name: {}", path.display()))?;

  let appender = tracing_appender::rolling::never(&dir, file_name);
  let (writer, guard) = tracing_appender::non_blocking(appender);

  tracing_subscriber::registry()
    .with(filter_for(&config.level))
    .with(
      tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true),
    )
    .try_init()
    .map_err(|e| eyre!("Failed to install log subscriber: {}", e))?;

  Ok(guard)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_path_file_name() {
    if let Some(path) = default_log_path() {
      assert!(path.ends_with("userdeck/userdeck.log"));
    }
  }

  #[test]
  fn test_configured_level_used_without_env() {
    if std::env::var(LOG_ENV).is_err() {
      assert_eq!(filter_for("debug").to_string(), "debug");
    }
  }
}
