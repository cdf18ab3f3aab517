//! Configuration management for lastospot.
//!
//! Configuration is read once at start-up. Values come from the process
//! environment, optionally seeded from a `.env` file in the local data
//! directory:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults for the service endpoints
//!
//! The four credentials (`SPOT_ID`, `SPOT_SECRET`, `LAST_KEY`, `LAST_USER`)
//! have no default. Missing any of them is a fatal start-up error reported
//! before the first network call.

use std::{env, io::ErrorKind, net::SocketAddr, path::PathBuf};

use thiserror::Error;

/// Address the local redirect catcher binds to.
pub const REDIRECT_ADDRESS: &str = "127.0.0.1:9292";

/// Redirect URI registered with the Spotify application.
pub const REDIRECT_URI: &str = "http://localhost:9292";

/// Scopes needed to read the profile and write private and public playlists.
pub const SPOTIFY_SCOPE: &str = "playlist-modify-public playlist-modify-private user-read-private";

pub const DEFAULT_SPOTIFY_AUTH_URL: &str = "https://accounts.spotify.com";
pub const DEFAULT_SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_LASTFM_API_URL: &str = "http://ws.audioscrobbler.com/2.0";

const REQUIRED_VARS: [&str; 4] = ["SPOT_ID", "SPOT_SECRET", "LAST_KEY", "LAST_USER"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing env parameter: {}", .0.join(", "))]
    Missing(Vec<&'static str>),
    #[error("Invalid redirect address {0}: {1}")]
    InvalidAddress(String, std::net::AddrParseError),
}

/// Runtime configuration shared by every stage of a run.
#[derive(Debug, Clone)]
pub struct Config {
    pub spotify_client_id: String,
    pub spotify_client_secret: String,
    pub lastfm_api_key: String,
    pub lastfm_user: String,
    pub spotify_auth_url: String,
    pub spotify_api_url: String,
    pub lastfm_api_url: String,
    pub redirect_address: SocketAddr,
    pub redirect_uri: String,
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// All missing required variables are reported together so the user can
    /// fix them in one go.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Empty values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let missing: Vec<&'static str> = REQUIRED_VARS
            .iter()
            .copied()
            .filter(|key| get(*key).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let redirect_address = REDIRECT_ADDRESS
            .parse()
            .map_err(|e| ConfigError::InvalidAddress(REDIRECT_ADDRESS.to_string(), e))?;

        Ok(Self {
            spotify_client_id: get("SPOT_ID").unwrap_or_default(),
            spotify_client_secret: get("SPOT_SECRET").unwrap_or_default(),
            lastfm_api_key: get("LAST_KEY").unwrap_or_default(),
            lastfm_user: get("LAST_USER").unwrap_or_default(),
            spotify_auth_url: trim_base(get("SPOTIFY_AUTH_URL"), DEFAULT_SPOTIFY_AUTH_URL),
            spotify_api_url: trim_base(get("SPOTIFY_API_URL"), DEFAULT_SPOTIFY_API_URL),
            lastfm_api_url: trim_base(get("LASTFM_API_URL"), DEFAULT_LASTFM_API_URL),
            redirect_address,
            redirect_uri: REDIRECT_URI.to_string(),
        })
    }
}

fn trim_base(value: Option<String>, default: &str) -> String {
    value
        .unwrap_or_else(|| default.to_string())
        .trim_end_matches('/')
        .to_string()
}

/// Loads environment variables from a `.env` file in the local data directory.
///
/// The file lives in:
/// - Linux: `~/.local/share/lastospot/.env`
/// - macOS: `~/Library/Application Support/lastospot/.env`
/// - Windows: `%LOCALAPPDATA%/lastospot/.env`
///
/// A missing file is not an error; the variables may come straight from the
/// environment. Variables already set in the environment win over the file.
pub async fn load_env() -> Result<(), String> {
    let path = env_path();
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    match dotenv::from_path(&path) {
        Ok(()) => Ok(()),
        Err(dotenv::Error::Io(e)) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(format!("{}: {}", path.display(), e)),
    }
}

fn env_path() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("lastospot/.env");
    path
}
