use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::display::TargetKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Data-refresh tick interval (playback poll), in milliseconds.
    #[serde(default = "default_refresh_ms")]
    pub refresh_ms: u64,
    /// Marquee tick interval, independent of the data tick.
    #[serde(default = "default_scroll_ms")]
    pub scroll_ms: u64,
    /// Vinyl animation tick interval.
    #[serde(default = "default_vinyl_ms")]
    pub vinyl_ms: u64,
    #[serde(default = "default_vinyl_step")]
    pub vinyl_step_degrees: f32,
    #[serde(default = "default_true")]
    pub vinyl_enabled: bool,
    /// Optional disc texture; near-white pixels become transparent.
    #[serde(default)]
    pub vinyl_texture: Option<PathBuf>,
    /// Square side of the decoded artwork bitmap kept in memory.
    #[serde(default = "default_art_size")]
    pub art_size: u32,
    #[serde(default)]
    pub display_target: TargetKind,
    /// Spotify app credentials; environment variables win over the file.
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    /// Externally provisioned OAuth token cache (spotipy-compatible JSON).
    #[serde(default = "default_token_cache")]
    pub token_cache: PathBuf,
}

fn default_refresh_ms() -> u64 {
    1000
}

fn default_scroll_ms() -> u64 {
    400
}

fn default_vinyl_ms() -> u64 {
    50
}

fn default_vinyl_step() -> f32 {
    crate::vinyl::DEFAULT_STEP_DEGREES
}

fn default_true() -> bool {
    true
}

fn default_art_size() -> u32 {
    600
}

fn default_token_cache() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".spotify_cache")
}

impl Default for AppConfig {
    fn default() -> Self {
        toml::from_str("").expect("empty config populates all defaults")
    }
}

impl AppConfig {
    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("platter");
        path.push("config.toml");
        path
    }

    /// Read the config file if present, fill everything else from
    /// defaults, then let the environment override the credentials.
    pub fn load(path: Option<&Path>) -> Self {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::default_path);
        let mut config = match fs::read_to_string(&path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("ignoring malformed config {}: {e}", path.display());
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        };

        if let Ok(id) = std::env::var("SPOTIFY_CLIENT_ID") {
            config.client_id = id;
        }
        if let Ok(secret) = std::env::var("SPOTIFY_CLIENT_SECRET") {
            config.client_secret = secret;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_cadence() {
        let config = AppConfig::default();
        assert_eq!(config.refresh_ms, 1000);
        assert_eq!(config.scroll_ms, 400);
        assert_eq!(config.vinyl_ms, 50);
        assert_eq!(config.vinyl_step_degrees, -2.0);
        assert!(config.vinyl_enabled);
        assert_eq!(config.art_size, 600);
        assert_eq!(config.display_target, TargetKind::Primary);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config: AppConfig =
            toml::from_str("refresh_ms = 2500\ndisplay_target = \"secondary\"").unwrap();
        assert_eq!(config.refresh_ms, 2500);
        assert_eq!(config.display_target, TargetKind::Secondary);
        assert_eq!(config.scroll_ms, 400);
        assert!(config.vinyl_texture.is_none());
    }
}
