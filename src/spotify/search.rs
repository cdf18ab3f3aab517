use reqwest::Client;
use tokio::time::sleep;

use crate::{
    config::Config,
    spotify::{MAX_RETRY_AFTER_SECS, SpotifyError, retry_after},
    types::{SearchResponse, Session},
};

const MAX_ATTEMPTS: usize = 3;

/// Searches a single track and returns the URI of the best match.
///
/// # Arguments
///
/// * `http` - Shared HTTP client
/// * `config` - Runtime configuration providing the API base URL
/// * `session` - Access token used as bearer credential
/// * `query` - Free-text query, `"<name> <artist>"`
///
/// # Returns
///
/// - `Ok(Some(uri))` - URI of the first result
/// - `Ok(None)` - The search worked but found nothing
/// - `Err(SpotifyError::Http)` - Network error, error status or undecodable body
/// - `Err(SpotifyError::RateLimited)` - Still rate limited after three attempts,
///   or asked to wait longer than [`MAX_RETRY_AFTER_SECS`]
///
/// # Rate Limiting
///
/// A `429 Too Many Requests` response is retried with the same query after
/// the `Retry-After` delay (one second when the header is missing).
///
/// # API Endpoint
///
/// `GET /search?q=...&type=track&limit=1&market=from_token`
pub async fn search_track(
    http: &Client,
    config: &Config,
    session: &Session,
    query: &str,
) -> Result<Option<String>, SpotifyError> {
    let api_url = format!("{}/search", config.spotify_api_url);

    let mut attempt = 1;
    loop {
        let response = http
            .get(&api_url)
            .bearer_auth(&session.access_token)
            .query(&[
                ("q", query),
                ("type", "track"),
                ("limit", "1"),
                ("market", "from_token"),
            ])
            .send()
            .await?;

        if let Some(wait) = retry_after(&response) {
            if wait.as_secs() > MAX_RETRY_AFTER_SECS || attempt >= MAX_ATTEMPTS {
                return Err(SpotifyError::RateLimited(wait.as_secs()));
            }
            sleep(wait).await;
            attempt += 1;
            continue;
        }

        let json = response.error_for_status()?.json::<SearchResponse>().await?;
        return Ok(json.tracks.items.into_iter().next().and_then(|t| t.uri));
    }
}
