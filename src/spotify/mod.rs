//! Spotify Web API client.
//!
//! Uses Client Credentials flow for server-to-server authentication. The
//! bearer credential lives only in process memory and is refreshed in place
//! once it expires.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::error::AppError;

const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const API_BASE: &str = "https://api.spotify.com/v1";

/// Outbound catalog search, as consumed by the orchestrator.
#[async_trait]
pub trait SearchOutbound: Send + Sync {
    async fn search(
        &self,
        query: &str,
        limit: u32,
        offset: u32,
    ) -> Result<RawSearchResponse, AppError>;
}

/// Spotify API client with credential caching.
#[derive(Clone)]
pub struct SpotifyClient {
    client: Client,
    client_id: String,
    client_secret: String,
    token_url: String,
    api_base: String,
    // Held across the whole check-then-refresh sequence so concurrent
    // expired observers trigger a single upstream token call.
    credential: Arc<Mutex<Option<CachedCredential>>>,
}

#[derive(Clone)]
struct CachedCredential {
    access_token: String,
    token_type: String,
    expires_at: Instant,
}

impl CachedCredential {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

impl SpotifyClient {
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self::with_endpoints(client_id, client_secret, TOKEN_URL.into(), API_BASE.into())
    }

    /// Build a client against non-default endpoints. Tests point this at a
    /// local mock server.
    pub fn with_endpoints(
        client_id: String,
        client_secret: String,
        token_url: String,
        api_base: String,
    ) -> Self {
        Self {
            client: Client::new(),
            client_id,
            client_secret,
            token_url,
            api_base,
            credential: Arc::new(Mutex::new(None)),
        }
    }

    /// Returns a valid `(access_token, token_type)` pair, refreshing first
    /// when no credential is held or the held one has expired. On refresh
    /// failure the previously cached credential is left untouched.
    async fn token_details(&self) -> Result<(String, String), AppError> {
        let mut guard = self.credential.lock().await;

        match guard.as_ref() {
            Some(cred) if !cred.is_expired() => {
                Ok((cred.access_token.clone(), cred.token_type.clone()))
            }
            _ => {
                let cred = self.fetch_credential().await?;
                let pair = (cred.access_token.clone(), cred.token_type.clone());
                *guard = Some(cred);
                Ok(pair)
            }
        }
    }

    async fn fetch_credential(&self) -> Result<CachedCredential, AppError> {
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];

        let res = self
            .client
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("token request failed: {}", e)))?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "token request failed: {} - {}",
                status, body
            )));
        }

        let body: TokenResponse = res
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("token parse failed: {}", e)))?;

        Ok(CachedCredential {
            access_token: body.access_token,
            token_type: body.token_type,
            expires_at: Instant::now() + Duration::from_secs(body.expires_in),
        })
    }
}

#[async_trait]
impl SearchOutbound for SpotifyClient {
    /// Search the catalog for tracks. Non-2xx statuses, transport errors and
    /// non-decodable bodies all surface as `AppError::Upstream`.
    async fn search(
        &self,
        query: &str,
        limit: u32,
        offset: u32,
    ) -> Result<RawSearchResponse, AppError> {
        let (access_token, token_type) = self.token_details().await?;

        let url = format!(
            "{}/search?q={}&type=track&limit={}&offset={}",
            self.api_base,
            urlencoding::encode(query),
            limit,
            offset,
        );

        let res = self
            .client
            .get(&url)
            .header("Authorization", format!("{} {}", token_type, access_token))
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("search request failed: {}", e)))?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "Spotify API error {}: {}",
                status, body
            )));
        }

        res.json()
            .await
            .map_err(|e| AppError::Upstream(format!("search parse failed: {}", e)))
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    token_type: String,
    expires_in: u64,
}

/// Raw search response, mirroring the upstream wire shape.
#[derive(Clone, Debug, Deserialize)]
pub struct RawSearchResponse {
    pub tracks: RawTrackPage,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RawTrackPage {
    #[serde(default)]
    pub href: String,
    pub limit: u32,
    #[serde(default)]
    pub next: Option<String>,
    pub offset: u32,
    #[serde(default)]
    pub previous: Option<String>,
    pub total: u32,
    pub items: Vec<RawTrack>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RawTrack {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub explicit: bool,
    #[serde(default)]
    pub href: String,
    #[serde(default)]
    pub artists: Vec<RawArtist>,
    #[serde(default)]
    pub album: RawAlbum,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct RawArtist {
    pub name: String,
    #[serde(default)]
    pub href: String,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct RawAlbum {
    #[serde(default)]
    pub album_type: String,
    #[serde(default)]
    pub total_tracks: u32,
    #[serde(default)]
    pub images: Vec<RawImage>,
    #[serde(default)]
    pub name: String,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct RawImage {
    pub url: String,
}
