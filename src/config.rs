use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

const CONFIG_FILE_NAME: &str = "config.toml";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub lastfm: LastfmConfig,
    pub tidal: TidalConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lastfm: LastfmConfig::default(),
            tidal: TidalConfig::default(),
        }
    }
}

/// Last.fm listing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LastfmConfig {
    /// Site base URL
    pub base_url: String,
    /// Hard ceiling on pagination, in pages
    pub page_cap: u32,
}

impl Default for LastfmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.last.fm".to_string(),
            page_cap: 1000,
        }
    }
}

/// Tidal API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TidalConfig {
    /// Country code sent with every API call
    pub country_code: String,
    /// Candidate count requested per artist search
    pub search_limit: usize,
}

impl Default for TidalConfig {
    fn default() -> Self {
        Self {
            country_code: "US".to_string(),
            search_limit: 5,
        }
    }
}

impl Config {
    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("ferry");

        fs::create_dir_all(&config_dir)
            .context("Failed to create config directory")?;

        Ok(config_dir.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from file, or create default if not exists
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let contents = fs::read_to_string(&path)
                .context("Failed to read config file")?;

            let config: Config = toml::from_str(&contents)
                .context("Failed to parse config file")?;

            Ok(config)
        } else {
            // Create default config and save it
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        fs::write(&path, contents)
            .context("Failed to write config file")?;

        Ok(())
    }
}
