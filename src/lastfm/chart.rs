use reqwest::Client;
use serde_json::Value;
use thiserror::Error;

use crate::{
    config::Config,
    types::{LastfmErrorResponse, RankValue, ScrobbleTrack, TopTracksResponse},
};

/// Chart window requested from Last.fm.
pub const CHART_PERIOD: &str = "1month";

/// Number of chart entries requested. No further pages are fetched.
pub const CHART_LIMIT: u32 = 30;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("Last.fm request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Last.fm error {code}: {message}")]
    Api { code: u32, message: String },
    #[error("Unexpected Last.fm response: {0}")]
    Malformed(String),
}

/// Fetches the user's top tracks of the last month, in chart order.
///
/// # Arguments
///
/// * `http` - Shared HTTP client
/// * `config` - Runtime configuration providing the Last.fm user, API key
///   and base URL
///
/// # Returns
///
/// - `Ok(Vec<ScrobbleTrack>)` - At most [`CHART_LIMIT`] tracks, possibly empty
/// - `Err(ChartError::Http)` - Network error or a body that is not JSON
/// - `Err(ChartError::Api)` - Last.fm answered with an error object
/// - `Err(ChartError::Malformed)` - The chart did not have the expected shape
///
/// # API Endpoint
///
/// `GET {lastfm_url}/?method=user.gettoptracks&period=1month&limit=30&format=json`
pub async fn fetch_top_tracks(
    http: &Client,
    config: &Config,
) -> Result<Vec<ScrobbleTrack>, ChartError> {
    let limit = CHART_LIMIT.to_string();
    let response = http
        .get(format!("{}/", config.lastfm_api_url))
        .query(&[
            ("method", "user.gettoptracks"),
            ("user", config.lastfm_user.as_str()),
            ("api_key", config.lastfm_api_key.as_str()),
            ("period", CHART_PERIOD),
            ("limit", limit.as_str()),
            ("format", "json"),
        ])
        .send()
        .await?;

    // Last.fm reports API errors as JSON bodies, sometimes with a 200 status
    let body: Value = response.json().await?;
    parse_chart(body)
}

/// Turns a `user.gettoptracks` body into scrobble tracks.
///
/// The rank is taken verbatim from each entry's `@attr.rank`.
pub fn parse_chart(body: Value) -> Result<Vec<ScrobbleTrack>, ChartError> {
    if body.get("error").is_some() {
        let err: LastfmErrorResponse =
            serde_json::from_value(body).map_err(|e| ChartError::Malformed(e.to_string()))?;
        return Err(ChartError::Api {
            code: err.error,
            message: err.message,
        });
    }

    let chart: TopTracksResponse =
        serde_json::from_value(body).map_err(|e| ChartError::Malformed(e.to_string()))?;

    chart
        .toptracks
        .track
        .into_vec()
        .into_iter()
        .map(|entry| -> Result<ScrobbleTrack, ChartError> {
            let rank = parse_rank(&entry.attr.rank).ok_or_else(|| {
                ChartError::Malformed(format!("invalid rank for track '{}'", entry.name))
            })?;
            Ok(ScrobbleTrack {
                rank,
                name: entry.name,
                artist: entry.artist.name,
            })
        })
        .collect()
}

fn parse_rank(rank: &RankValue) -> Option<u32> {
    let rank = match rank {
        RankValue::Number(n) => *n,
        RankValue::Text(s) => s.trim().parse().ok()?,
    };
    (rank >= 1).then_some(rank)
}
