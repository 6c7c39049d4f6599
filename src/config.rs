use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Base URL of the public record service
pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub api: ApiConfig,
  /// Custom title for header (defaults to the service host if not set)
  pub title: Option<String>,
  #[serde(default)]
  pub notifications: NotificationsConfig,
  #[serde(default)]
  pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  #[serde(default = "default_base_url")]
  pub base_url: String,
  /// Request timeout in seconds. Unset means the transport default.
  pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: default_base_url(),
      timeout_secs: None,
    }
  }
}

impl ApiConfig {
  pub fn timeout(&self) -> Option<Duration> {
    self.timeout_secs.map(Duration::from_secs)
  }
}

fn default_base_url() -> String {
  DEFAULT_BASE_URL.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationsConfig {
  /// How long a toast stays on screen
  #[serde(default = "default_toast_ms")]
  pub duration_ms: u64,
}

impl Default for NotificationsConfig {
  fn default() -> Self {
    Self {
      duration_ms: default_toast_ms(),
    }
  }
}

impl NotificationsConfig {
  pub fn duration(&self) -> Duration {
    Duration::from_millis(self.duration_ms)
  }
}

fn default_toast_ms() -> u64 {
  4000
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
  /// Filter used when USERDECK_LOG is not set
  #[serde(default = "default_log_level")]
  pub level: String,
  /// Log file path (default: $XDG_DATA_HOME/userdeck/userdeck.log)
  pub file: Option<PathBuf>,
}

impl Default for LogConfig {
  fn default() -> Self {
    Self {
      level: default_log_level(),
      file: None,
    }
  }
}

fn default_log_level() -> String {
  "info".to_string()
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided (must exist)
  /// 2. ./userdeck.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/userdeck/config.yaml
  ///
  /// Every field has a default, so no file at all is fine.
  /// `USERDECK_BASE_URL` overrides `api.base_url`.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    let mut config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => Config::default(),
    };

    if let Ok(url) = std::env::var("USERDECK_BASE_URL") {
      if !url.trim().is_empty() {
        config.api.base_url = url;
      }
    }

    Ok(config)
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("userdeck.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("userdeck").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents).map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> std::result::Result<Self, serde_yaml::Error> {
    // An empty file deserializes to unit, not to an empty mapping
    if contents.trim().is_empty() {
      return Ok(Config::default());
    }
    serde_yaml::from_str(contents)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
    assert_eq!(config.api.timeout(), None);
    assert_eq!(config.notifications.duration(), Duration::from_secs(4));
    assert_eq!(config.log.level, "info");
  }

  #[test]
  fn test_parse_partial_file() {
    let config = Config::parse(
      "api:\n  base_url: http://localhost:3000\n  timeout_secs: 5\ntitle: Staff\n",
    )
    .unwrap();

    assert_eq!(config.api.base_url, "http://localhost:3000");
    assert_eq!(config.api.timeout(), Some(Duration::from_secs(5)));
    assert_eq!(config.title.as_deref(), Some("Staff"));
    assert_eq!(config.notifications.duration_ms, 4000);
  }

  #[test]
  fn test_parse_empty_file() {
    let config = Config::parse("").unwrap();
    assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
  }

  #[test]
  fn test_missing_explicit_path_is_error() {
    let err = Config::load(Some(Path::new("/nonexistent/userdeck.yaml"))).unwrap_err();
    assert!(err.to_string().contains("Config file not found"));
  }
}
