use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{env, fs, path::PathBuf};

/// Environment variable holding the CWB open-data API key.
///
/// When set it takes precedence over the key stored in the config file, and
/// it is read at call time rather than cached.
pub const API_KEY_ENV: &str = "CWB_API_KEY";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "CWB-..."
/// observation_station = "臺北"
/// forecast_location = "臺北市"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API key for the open-data platform; `CWB_API_KEY` overrides it.
    pub api_key: Option<String>,

    /// Station name for the real-time observation dataset (O-A0003-001).
    #[serde(default = "default_observation_station")]
    pub observation_station: String,

    /// Administrative area for the 36-hour forecast dataset (F-C0032-001).
    #[serde(default = "default_forecast_location")]
    pub forecast_location: String,

    /// Base URL of the open-data datastore API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_observation_station() -> String {
    "臺北".to_string()
}

fn default_forecast_location() -> String {
    "臺北市".to_string()
}

fn default_base_url() -> String {
    "https://opendata.cwb.gov.tw/api/v1/rest/datastore".to_string()
}

const fn default_timeout() -> u64 {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            observation_station: default_observation_station(),
            forecast_location: default_forecast_location(),
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Config {
    /// Resolve the API key: environment first, then the config file.
    pub fn resolve_api_key(&self) -> Result<String> {
        pick_api_key(env::var(API_KEY_ENV).ok(), self.api_key.as_deref()).ok_or_else(|| {
            anyhow!(
                "No API key configured.\n\
                 Hint: run `weathercard configure` or export {API_KEY_ENV}."
            )
        })
    }

    /// Load config from disk, or return the defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("tw", "weathercard", "weathercard")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

fn pick_api_key(from_env: Option<String>, from_file: Option<&str>) -> Option<String> {
    from_env
        .filter(|key| !key.trim().is_empty())
        .or_else(|| from_file.map(str::to_owned))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_taipei() {
        let cfg = Config::default();

        assert_eq!(cfg.observation_station, "臺北");
        assert_eq!(cfg.forecast_location, "臺北市");
        assert_eq!(
            cfg.base_url,
            "https://opendata.cwb.gov.tw/api/v1/rest/datastore"
        );
        assert_eq!(cfg.timeout_secs, 10);
        assert!(cfg.api_key.is_none());
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let cfg: Config = toml::from_str("api_key = \"CWB-TEST\"").expect("valid toml");

        assert_eq!(cfg.api_key.as_deref(), Some("CWB-TEST"));
        assert_eq!(cfg.observation_station, "臺北");
        assert_eq!(cfg.timeout_secs, 10);
    }

    #[test]
    fn env_key_wins_over_file_key() {
        let key = pick_api_key(Some("ENV-KEY".into()), Some("FILE-KEY"));
        assert_eq!(key.as_deref(), Some("ENV-KEY"));
    }

    #[test]
    fn blank_env_key_is_ignored() {
        let key = pick_api_key(Some("   ".into()), Some("FILE-KEY"));
        assert_eq!(key.as_deref(), Some("FILE-KEY"));
    }

    #[test]
    fn resolve_api_key_errors_with_hint_when_unset() {
        let cfg = Config {
            api_key: None,
            ..Config::default()
        };

        // Only meaningful when CWB_API_KEY is not exported in the test env.
        if env::var(API_KEY_ENV).is_err() {
            let err = cfg.resolve_api_key().unwrap_err();
            assert!(err.to_string().contains("weathercard configure"));
        }
    }

    #[test]
    fn config_round_trips_through_toml() {
        let cfg = Config {
            api_key: Some("CWB-TEST".into()),
            observation_station: "板橋".into(),
            forecast_location: "新北市".into(),
            base_url: "http://localhost:9999".into(),
            timeout_secs: 3,
        };

        let toml = toml::to_string_pretty(&cfg).expect("serialize");
        let parsed: Config = toml::from_str(&toml).expect("parse");

        assert_eq!(parsed.api_key.as_deref(), Some("CWB-TEST"));
        assert_eq!(parsed.observation_station, "板橋");
        assert_eq!(parsed.forecast_location, "新北市");
        assert_eq!(parsed.base_url, "http://localhost:9999");
        assert_eq!(parsed.timeout_secs, 3);
    }
}
