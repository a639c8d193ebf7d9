use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::model::DEFAULT_DIAL_STEP;

const APP_DIR: &str = "clickwheel";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub wheel: WheelConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub spotify: SpotifyConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WheelConfig {
    /// Dial quantization step, 1..=100
    #[serde(default = "default_step")]
    pub step: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Scrubber refresh cadence
    #[serde(default = "default_interval_ms")]
    pub refresh_interval_ms: u64,
    /// How often the Spotify player state is polled
    #[serde(default = "default_interval_ms")]
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyConfig {
    #[serde(default = "default_client_id")]
    pub client_id: String,
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
    #[serde(default = "default_device_name")]
    pub device_name: String,
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_dir")]
    pub dir: PathBuf,
    /// Used when `RUST_LOG` is not set
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            step: default_step(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            refresh_interval_ms: default_interval_ms(),
            poll_interval_ms: default_interval_ms(),
        }
    }
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            client_id: default_client_id(),
            redirect_uri: default_redirect_uri(),
            device_name: default_device_name(),
            cache_dir: default_cache_dir(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            filter: default_log_filter(),
        }
    }
}

fn default_step() -> u8 {
    DEFAULT_DIAL_STEP
}

fn default_interval_ms() -> u64 {
    1000
}

fn default_client_id() -> String {
    "492e1e45ea814fa3ac555fe1576aaf5b".to_string()
}

fn default_redirect_uri() -> String {
    "http://127.0.0.1:8898/login".to_string()
}

fn default_device_name() -> String {
    "ClickWheel".to_string()
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(".cache")
}

fn default_log_dir() -> PathBuf {
    PathBuf::from(".logs")
}

fn default_log_filter() -> String {
    "clickwheel=debug,librespot=info,rspotify=info,warn".to_string()
}

impl SyncConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms.max(1))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(&config_path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let mut config: Self = toml::from_str(content)?;
        config.wheel.step = config.wheel.step.clamp(1, 100);
        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.wheel.step, 5);
        assert_eq!(config.sync.refresh_interval(), Duration::from_secs(1));
        assert_eq!(config.spotify.device_name, "ClickWheel");
        assert!(config.spotify.redirect_uri.starts_with("http://127.0.0.1"));
        assert!(Config::config_path().ends_with("clickwheel/config.toml"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config =
            Config::parse("[wheel]\nstep = 10\n\n[sync]\npoll_interval_ms = 2500\n").unwrap();
        assert_eq!(config.wheel.step, 10);
        assert_eq!(config.sync.poll_interval(), Duration::from_millis(2500));
        assert_eq!(config.sync.refresh_interval_ms, 1000);
        assert_eq!(config.logging.dir, PathBuf::from(".logs"));
    }

    #[test]
    fn test_step_is_clamped() {
        let config = Config::parse("[wheel]\nstep = 0\n").unwrap();
        assert_eq!(config.wheel.step, 1);
        let config = Config::parse("[wheel]\nstep = 200\n").unwrap();
        assert_eq!(config.wheel.step, 100);
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        assert!(Config::parse("[wheel]\nstep = \"five\"\n").is_err());
    }
}
