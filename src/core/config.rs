use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};
use tracing::debug;

/// How overlapping simulated commits are resolved.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CommitPolicy {
    /// Every pending commit fires; the last timer to fire wins.
    #[default]
    LastTimerWins,
    /// A new request cancels pending commits; only the newest one lands.
    LatestRequestWins,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LatencyConfig {
    #[serde(default = "default_exchange_ms")]
    pub exchange_ms: u64,
    #[serde(default = "default_swap_ms")]
    pub swap_ms: u64,
    #[serde(default)]
    pub policy: CommitPolicy,
}

fn default_exchange_ms() -> u64 {
    1000
}

fn default_swap_ms() -> u64 {
    300
}

impl LatencyConfig {
    pub fn exchange_delay(&self) -> Duration {
        Duration::from_millis(self.exchange_ms)
    }

    pub fn swap_delay(&self) -> Duration {
        Duration::from_millis(self.swap_ms)
    }
}

impl Default for LatencyConfig {
    fn default() -> Self {
        LatencyConfig {
            exchange_ms: default_exchange_ms(),
            swap_ms: default_swap_ms(),
            policy: CommitPolicy::default(),
        }
    }
}

fn default_icons_dir() -> String {
    "tokens".to_string()
}

fn default_from() -> String {
    "USD".to_string()
}

fn default_to() -> String {
    "ETH".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub prices_path: Option<String>,
    #[serde(default = "default_icons_dir")]
    pub icons_dir: String,
    #[serde(default = "default_from")]
    pub default_from: String,
    #[serde(default = "default_to")]
    pub default_to: String,
    #[serde(default)]
    pub latency: LatencyConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            prices_path: None,
            icons_dir: default_icons_dir(),
            default_from: default_from(),
            default_to: default_to(),
            latency: LatencyConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads the config from the default location, or falls back to defaults
    /// when no config file has been created yet.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(path = %config_path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "swapfx", "swapfx")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
prices_path: "/tmp/prices.json"
icons_dir: "assets/tokens"
default_from: "ETH"
default_to: "WBTC"
latency:
  exchange_ms: 250
  swap_ms: 50
  policy: latest_request_wins
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.prices_path.as_deref(), Some("/tmp/prices.json"));
        assert_eq!(config.icons_dir, "assets/tokens");
        assert_eq!(config.default_from, "ETH");
        assert_eq!(config.default_to, "WBTC");
        assert_eq!(config.latency.exchange_delay(), Duration::from_millis(250));
        assert_eq!(config.latency.swap_delay(), Duration::from_millis(50));
        assert_eq!(config.latency.policy, CommitPolicy::LatestRequestWins);
    }

    #[test]
    fn test_config_defaults_for_missing_fields() {
        let config: AppConfig = serde_yaml::from_str("latency:\n  swap_ms: 10\n").unwrap();
        assert!(config.prices_path.is_none());
        assert_eq!(config.icons_dir, "tokens");
        assert_eq!(config.default_from, "USD");
        assert_eq!(config.default_to, "ETH");
        assert_eq!(config.latency.exchange_ms, 1000);
        assert_eq!(config.latency.swap_ms, 10);
        assert_eq!(config.latency.policy, CommitPolicy::LastTimerWins);
    }

    #[test]
    fn test_load_from_path_reports_parse_errors() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "latency: [not, a, map]").unwrap();

        let err = AppConfig::load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
