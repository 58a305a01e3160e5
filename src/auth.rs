use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// OAuth session state persisted between runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedCredentials {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub user_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

pub struct TidalAuth;

impl TidalAuth {
    pub fn credentials_path() -> Result<PathBuf> {
        let mut path = config_dir()
            .ok_or_else(|| anyhow!("Could not find config directory"))?;
        path.push("ferry");
        fs::create_dir_all(&path)?;
        path.push("credentials.json");
        Ok(path)
    }

    pub fn load_credentials() -> Result<SavedCredentials> {
        Self::load_credentials_from(&Self::credentials_path()?)
    }

    pub fn load_credentials_from(path: &Path) -> Result<SavedCredentials> {
        if !path.exists() {
            return Err(anyhow!("No saved credentials found at {}", path.display()));
        }

        let contents = fs::read_to_string(path)?;
        let creds: SavedCredentials = serde_json::from_str(&contents)?;
        Ok(creds)
    }

    pub fn save_credentials(creds: &SavedCredentials) -> Result<()> {
        Self::save_credentials_to(&Self::credentials_path()?, creds)
    }

    pub fn save_credentials_to(path: &Path, creds: &SavedCredentials) -> Result<()> {
        let contents = serde_json::to_string_pretty(creds)?;
        fs::write(path, contents)?;
        Ok(())
    }
}
