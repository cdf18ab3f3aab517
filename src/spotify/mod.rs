//! # Spotify Integration Module
//!
//! Thin wrappers around the parts of the Spotify Web API that lastospot
//! needs. Every call is a single awaited request; nothing runs in parallel.
//!
//! ## Modules
//!
//! - [`auth`] - authorization-code flow with the local redirect catcher,
//!   code-for-token exchange and profile lookup
//! - [`search`] - single-result track search
//! - [`playlist`] - playlist discovery, creation, item listing, removal and
//!   append
//!
//! ## API Coverage
//!
//! - `GET /authorize` (browser), `POST /api/token`
//! - `GET /me`
//! - `GET /search`
//! - `GET|POST /users/{user_id}/playlists`
//! - `GET|POST|DELETE /users/{user_id}/playlists/{playlist_id}/tracks`
//!
//! All calls take the base URLs from [`crate::config::Config`] and the bearer
//! token from the run's [`crate::types::Session`].

use std::time::Duration;

use reqwest::{Response, StatusCode};
use thiserror::Error;

pub mod auth;
pub mod playlist;
pub mod search;

/// Longest `Retry-After` the client is willing to sleep through.
pub const MAX_RETRY_AFTER_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum SpotifyError {
    #[error("Spotify request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Spotify rate limit asks to wait {0} seconds")]
    RateLimited(u64),
    #[error("Unexpected Spotify response: {0}")]
    Malformed(String),
}

/// Seconds to wait before retrying a `429 Too Many Requests` response.
///
/// `None` for any other status.
pub fn retry_after(response: &Response) -> Option<Duration> {
    if response.status() != StatusCode::TOO_MANY_REQUESTS {
        return None;
    }

    let secs = response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(1);
    Some(Duration::from_secs(secs))
}
