use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::{header, Client as HttpClient};
use serde_json::Value;

use super::{EntityKind, MusicService, SearchOutcome};
use crate::auth::{SavedCredentials, TidalAuth};
use crate::config::TidalConfig;

const API_BASE: &str = "https://api.tidal.com/v1";
const OAUTH_TOKEN_URL: &str = "https://auth.tidal.com/v1/oauth2/token";
const CLIENT_ID: &str = "dN2N95wCyEBTllu4";

/// Tidal client speaking the v1 API directly
pub struct TidalClient {
    creds: SavedCredentials,
    config: TidalConfig,
    http_client: HttpClient,
}

impl TidalClient {
    pub fn new(creds: SavedCredentials, config: TidalConfig) -> Self {
        Self {
            creds,
            config,
            http_client: HttpClient::new(),
        }
    }

    pub fn credentials(&self) -> &SavedCredentials {
        &self.creds
    }

    pub fn save_credentials(&self) -> Result<()> {
        TidalAuth::save_credentials(&self.creds)
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.creds.access_token)
    }

    fn is_token_expired(&self) -> bool {
        if let Some(expires_at) = self.creds.expires_at {
            // Refresh when less than 5 minutes of validity remain
            return expires_at - Duration::minutes(5) < Utc::now();
        }
        // No stored expiry; rely on the 401 retry path
        false
    }

    pub async fn refresh_token_if_needed(&mut self) -> Result<()> {
        if !self.is_token_expired() {
            return Ok(());
        }

        tracing::info!("Token expired or expiring soon, attempting to refresh");
        self.refresh_token().await
    }

    async fn refresh_token(&mut self) -> Result<()> {
        let refresh_token = self.creds.refresh_token.clone();

        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", &refresh_token),
            ("client_id", CLIENT_ID),
        ];

        let response = self
            .http_client
            .post(OAUTH_TOKEN_URL)
            .form(&params)
            .send()
            .await?;

        if response.status().is_success() {
            let json: Value = response.json().await?;

            if let Some(access_token) = json.get("access_token").and_then(|v| v.as_str()) {
                self.creds.access_token = access_token.to_string();
            }

            if let Some(refresh_token) = json.get("refresh_token").and_then(|v| v.as_str()) {
                self.creds.refresh_token = refresh_token.to_string();
            }

            if let Some(expires_in) = json.get("expires_in").and_then(|v| v.as_i64()) {
                self.creds.expires_at = Some(Utc::now() + Duration::seconds(expires_in));
            }

            self.save_credentials()?;
            tracing::info!("Token refreshed");

            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(anyhow!(
                "Failed to refresh token. Status: {} - {}",
                status,
                body
            ))
        }
    }

    /// Pick the top-ranked hit out of a search response body.
    ///
    /// Tidal returns the best candidate under `topHit`, with the entity
    /// wrapped in `value` and the kind under `type`. Anything malformed or
    /// absent counts as no match.
    fn parse_search_outcome(json: &Value) -> SearchOutcome {
        let Some(hit) = json.get("topHit").filter(|v| !v.is_null()) else {
            return SearchOutcome::NoMatch;
        };

        let kind = hit
            .get("type")
            .and_then(|t| t.as_str())
            .map(EntityKind::from_type_tag)
            .unwrap_or(EntityKind::Other);

        let value = hit.get("value").unwrap_or(hit);

        let Some(id) = value.get("id").and_then(|v| v.as_u64()) else {
            return SearchOutcome::NoMatch;
        };

        let name = value
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();

        SearchOutcome::Match { id, name, kind }
    }
}

#[async_trait]
impl MusicService for TidalClient {
    fn is_authenticated(&self) -> bool {
        !self.creds.access_token.is_empty()
    }

    async fn search_artist(&mut self, query: &str, limit: usize) -> Result<SearchOutcome> {
        for attempt in 0..2 {
            let limit_param = limit.to_string();

            let response = self
                .http_client
                .get(format!("{}/search", API_BASE))
                .header(header::AUTHORIZATION, self.bearer())
                .query(&[
                    ("query", query),
                    ("limit", limit_param.as_str()),
                    ("countryCode", self.config.country_code.as_str()),
                    ("types", "ARTISTS"),
                ])
                .send()
                .await;

            match response {
                Ok(resp) if resp.status().is_success() => {
                    let json: Value = resp.json().await?;
                    return Ok(Self::parse_search_outcome(&json));
                }
                Ok(resp) if resp.status().as_u16() == 401 && attempt == 0 => {
                    tracing::debug!("Search got 401, attempting token refresh");
                    if self.refresh_token().await.is_ok() {
                        continue;
                    }
                    return Err(anyhow!("Search failed: token refresh failed"));
                }
                Ok(resp) => {
                    return Err(anyhow!("Search failed with status: {}", resp.status()));
                }
                Err(e) => {
                    return Err(anyhow!("Network error during search: {}", e));
                }
            }
        }

        Err(anyhow!("Search failed after token refresh"))
    }

    async fn add_favorite_artist(&mut self, artist_id: u64) -> Result<()> {
        for attempt in 0..2 {
            let url = format!(
                "{}/users/{}/favorites/artists",
                API_BASE, self.creds.user_id
            );

            let response = self
                .http_client
                .post(&url)
                .header(header::AUTHORIZATION, self.bearer())
                .query(&[("countryCode", self.config.country_code.as_str())])
                .form(&[("artistIds", artist_id.to_string())])
                .send()
                .await;

            match response {
                Ok(resp) if resp.status().is_success() => {
                    return Ok(());
                }
                Ok(resp) if resp.status().as_u16() == 401 && attempt == 0 => {
                    tracing::debug!("Favorite add got 401, attempting token refresh");
                    if self.refresh_token().await.is_ok() {
                        continue;
                    }
                    return Err(anyhow!("Failed to add favorite: token refresh failed"));
                }
                Ok(resp) => {
                    let status = resp.status();
                    let body = resp.text().await.unwrap_or_default();
                    return Err(anyhow!("Failed to add favorite: {} - {}", status, body));
                }
                Err(e) => {
                    return Err(anyhow!("Network error adding favorite: {}", e));
                }
            }
        }

        Err(anyhow!("Failed to add favorite after token refresh"))
    }
}
