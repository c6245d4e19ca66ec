use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

const PLAYER_ENDPOINT: &str = "https://api.spotify.com/v1/me/player";
const TOKEN_ENDPOINT: &str = "https://accounts.spotify.com/api/token";

/// Refresh the bearer token this many seconds before its recorded expiry.
const EXPIRY_MARGIN_SECS: u64 = 60;

/// The current playback snapshot the display cares about.
#[derive(Debug, Clone, PartialEq)]
pub struct NowPlaying {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub art_url: Option<String>,
}

impl NowPlaying {
    pub fn display_text(&self) -> String {
        format!("{} - {}", self.title, self.artist)
    }
}

// --- Wire format (Spotify Web API) ---

#[derive(Debug, Deserialize)]
struct PlaybackResponse {
    item: Option<TrackItem>,
}

#[derive(Debug, Deserialize)]
struct TrackItem {
    id: Option<String>,
    name: String,
    #[serde(default)]
    artists: Vec<ArtistRef>,
    album: Option<AlbumRef>,
}

#[derive(Debug, Deserialize)]
struct ArtistRef {
    name: String,
}

#[derive(Debug, Deserialize)]
struct AlbumRef {
    #[serde(default)]
    images: Vec<ImageRef>,
}

#[derive(Debug, Deserialize)]
struct ImageRef {
    url: String,
}

/// Parse a `/v1/me/player` response body. `Ok(None)` means no active
/// track (a valid empty state, not an error).
pub fn parse_playback(body: &str) -> Result<Option<NowPlaying>> {
    let resp: PlaybackResponse =
        serde_json::from_str(body).context("malformed playback response")?;

    Ok(resp.item.map(|item| {
        let artist = item
            .artists
            .first()
            .map(|a| a.name.clone())
            .unwrap_or_default();
        // Local files carry no track id; name+artist stands in for one.
        let id = item
            .id
            .clone()
            .unwrap_or_else(|| format!("{}{}", item.name, artist));
        // The first image is the largest one (640x640).
        let art_url = item
            .album
            .and_then(|a| a.images.into_iter().next())
            .map(|i| i.url);
        NowPlaying {
            id,
            title: item.name,
            artist,
            art_url,
        }
    }))
}

// --- OAuth token cache (externally provisioned, spotipy-compatible) ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenCache {
    #[serde(default)]
    pub access_token: Option<String>,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_at: Option<u64>,
}

pub fn parse_token_cache(body: &str) -> Result<TokenCache> {
    serde_json::from_str(body).context("malformed token cache")
}

impl TokenCache {
    /// A cached access token is usable until shortly before expiry.
    pub fn usable_access_token(&self, now_unix: u64) -> Option<&str> {
        let token = self.access_token.as_deref()?;
        let expires_at = self.expires_at?;
        if now_unix + EXPIRY_MARGIN_SECS < expires_at {
            Some(token)
        } else {
            None
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
    #[serde(default)]
    refresh_token: Option<String>,
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Thin Spotify Web API client: refreshes the bearer token from the cache
/// file when needed and polls the player endpoint. Interactive
/// authorization never happens here; the cache file is provisioned
/// externally.
pub struct SpotifyClient {
    client: Client,
    client_id: String,
    client_secret: String,
    cache_path: PathBuf,
    cache: Option<TokenCache>,
}

impl SpotifyClient {
    pub fn new(client: Client, client_id: &str, client_secret: &str, cache_path: &Path) -> Self {
        Self {
            client,
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            cache_path: cache_path.to_path_buf(),
            cache: None,
        }
    }

    fn load_cache(&mut self) -> Result<&mut TokenCache> {
        if self.cache.is_none() {
            let body = std::fs::read_to_string(&self.cache_path).with_context(|| {
                format!("cannot read token cache {}", self.cache_path.display())
            })?;
            self.cache = Some(parse_token_cache(&body)?);
        }
        Ok(self.cache.as_mut().expect("cache just loaded"))
    }

    async fn bearer(&mut self) -> Result<String> {
        let now = now_unix();
        if let Some(token) = self.load_cache()?.usable_access_token(now) {
            return Ok(token.to_string());
        }
        self.refresh().await
    }

    /// Exchange the cached refresh token for a fresh bearer token and
    /// persist the rotated cache.
    async fn refresh(&mut self) -> Result<String> {
        let refresh_token = self.load_cache()?.refresh_token.clone();
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.as_str()),
        ];

        let resp = self
            .client
            .post(TOKEN_ENDPOINT)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&params)
            .send()
            .await
            .context("token refresh request failed")?
            .error_for_status()
            .context("token refresh rejected")?;

        let token: TokenResponse = resp.json().await.context("malformed token response")?;

        let cache = self.cache.as_mut().expect("cache loaded by refresh");
        cache.access_token = Some(token.access_token.clone());
        cache.expires_at = Some(now_unix() + token.expires_in);
        if let Some(rotated) = token.refresh_token {
            cache.refresh_token = rotated;
        }
        if let Ok(body) = serde_json::to_string_pretty(cache) {
            if let Err(e) = std::fs::write(&self.cache_path, body) {
                tracing::warn!("could not persist token cache: {e}");
            }
        }

        Ok(token.access_token)
    }

    /// One playback query. `Ok(None)` covers both "no session" (HTTP 204)
    /// and "session without a track item".
    pub async fn current_playback(&mut self) -> Result<Option<NowPlaying>> {
        let bearer = self.bearer().await?;
        let resp = self
            .client
            .get(PLAYER_ENDPOINT)
            .bearer_auth(bearer)
            .send()
            .await
            .context("playback request failed")?;

        match resp.status() {
            StatusCode::NO_CONTENT => Ok(None),
            StatusCode::UNAUTHORIZED => {
                // Stale token; drop it so the next tick refreshes.
                if let Some(cache) = self.cache.as_mut() {
                    cache.access_token = None;
                }
                anyhow::bail!("playback query unauthorized, token dropped")
            }
            _ => {
                let resp = resp.error_for_status().context("playback query rejected")?;
                let body = resp.text().await.context("playback body unreadable")?;
                parse_playback(&body)
            }
        }
    }
}
