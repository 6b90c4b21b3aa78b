use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::platform;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

/// Where and how to reach the station directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Endpoint listing the currently available mirrors.
    #[serde(default = "default_discovery_url")]
    pub discovery_url: String,
    /// Mirror used when discovery fails or returns nothing.
    #[serde(default = "default_fallback_mirror")]
    pub fallback_mirror: String,
    /// URL scheme for mirror requests. Only tests point this at plain http.
    #[serde(default = "default_scheme")]
    pub scheme: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Quiet period after the last keystroke before a search is sent.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Country selected on startup; empty means all countries.
    #[serde(default)]
    pub default_country: String,
    /// Country codes offered by the country selector, in cycling order.
    #[serde(default = "default_countries")]
    pub countries: Vec<String>,
    /// Genre tags offered by the genre selector, in cycling order.
    #[serde(default = "default_genres")]
    pub genres: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Volume (0-100) used until the user has saved one.
    #[serde(default = "default_volume")]
    pub default_volume: u8,
    #[serde(default = "default_volume_step")]
    pub volume_step: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Key-value file holding volume, favorites and the selected mirror.
    #[serde(default = "default_prefs_file")]
    pub prefs_file: PathBuf,
}

impl ApiConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            discovery_url: default_discovery_url(),
            fallback_mirror: default_fallback_mirror(),
            scheme: default_scheme(),
            user_agent: default_user_agent(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            default_country: String::new(),
            countries: default_countries(),
            genres: default_genres(),
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            default_volume: default_volume(),
            volume_step: default_volume_step(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            prefs_file: default_prefs_file(),
        }
    }
}

fn default_discovery_url() -> String {
    "https://all.api.radio-browser.info/json/servers".to_string()
}

fn default_fallback_mirror() -> String {
    "de1.api.radio-browser.info".to_string()
}

fn default_scheme() -> String {
    "https".to_string()
}

fn default_user_agent() -> String {
    format!("retro-radio/{}", env!("CARGO_PKG_VERSION"))
}

fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_request_timeout_secs() -> u64 {
    15
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_countries() -> Vec<String> {
    ["", "US", "GB", "AU", "CA", "JP"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_genres() -> Vec<String> {
    ["", "pop", "rock", "jazz", "classical", "electronic", "lofi", "news"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_volume() -> u8 {
    100
}

fn default_volume_step() -> u8 {
    5
}

fn default_prefs_file() -> PathBuf {
    platform::data_dir().join("prefs.json")
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
        let config: Self = toml::from_str(&content)?;
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
        platform::config_dir().join("config.toml")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            search: SearchConfig::default(),
            player: PlayerConfig::default(),
            paths: PathsConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.scheme, "https");
        assert_eq!(config.api.fallback_mirror, "de1.api.radio-browser.info");
        assert!(config.api.discovery_url.ends_with("/json/servers"));
        assert_eq!(config.search.debounce(), Duration::from_millis(500));
        assert_eq!(config.search.countries.first().map(String::as_str), Some(""));
        assert!(config.search.countries.iter().any(|c| c == "JP"));
        assert_eq!(config.player.default_volume, 100);
        assert!(config.paths.prefs_file.ends_with("retro-radio/prefs.json"));
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [api]
            scheme = "http"

            [search]
            debounce_ms = 250
            "#,
        )
        .unwrap();
        assert_eq!(config.api.scheme, "http");
        assert_eq!(config.api.request_timeout(), Duration::from_secs(15));
        assert_eq!(config.search.debounce_ms, 250);
        assert_eq!(config.search.genres.len(), 8);
        assert_eq!(config.player.volume_step, 5);
    }
}
