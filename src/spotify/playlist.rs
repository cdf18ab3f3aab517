use reqwest::Client;

use crate::{
    config::Config,
    spotify::SpotifyError,
    types::{
        AddTrackToPlaylistRequest, CreatePlaylistRequest, GetUserPlaylistsResponse, Playlist,
        PlaylistItemsResponse, RemoveTracksRequest, Session, SnapshotResponse, TrackUri,
    },
};

/// Maximum number of URIs Spotify accepts in one add or remove call.
pub const MAX_TRACKS_PER_REQUEST: usize = 100;

/// Number of playlists inspected during discovery. Only the first page is read.
pub const DISCOVERY_LIMIT: u32 = 50;

fn playlists_url(config: &Config, session: &Session) -> String {
    format!(
        "{uri}/users/{user}/playlists",
        uri = config.spotify_api_url,
        user = session.user_id
    )
}

fn tracks_url(config: &Config, session: &Session, playlist_id: &str) -> String {
    format!(
        "{uri}/users/{user}/playlists/{id}/tracks",
        uri = config.spotify_api_url,
        user = session.user_id,
        id = playlist_id
    )
}

/// Returns the first page of the user's playlists.
///
/// Only one page of [`DISCOVERY_LIMIT`] playlists is requested. A managed
/// playlist further down the user's library is not seen.
///
/// # Arguments
///
/// * `http` - Shared HTTP client
/// * `config` - Runtime configuration providing the API base URL
/// * `session` - Access token and id of the acting user
///
/// # Returns
///
/// - `Ok(Vec<Playlist>)` - Playlists in the order Spotify lists them
/// - `Err(SpotifyError::Http)` - Network error, error status or undecodable body
///
/// # API Endpoint
///
/// `GET /users/{user_id}/playlists?limit=50`
pub async fn list(
    http: &Client,
    config: &Config,
    session: &Session,
) -> Result<Vec<Playlist>, SpotifyError> {
    let res = http
        .get(playlists_url(config, session))
        .bearer_auth(&session.access_token)
        .query(&[("limit", DISCOVERY_LIMIT)])
        .send()
        .await?
        .error_for_status()?
        .json::<GetUserPlaylistsResponse>()
        .await?;

    Ok(res.items)
}

/// Creates a private playlist owned by the session user.
///
/// # Arguments
///
/// * `http` - Shared HTTP client
/// * `config` - Runtime configuration providing the API base URL
/// * `session` - Access token and id of the acting user
/// * `name` - Display name of the new playlist
/// * `description` - Description shown under the name
///
/// # Returns
///
/// - `Ok(Playlist)` - The new, empty playlist
/// - `Err(SpotifyError::Http)` - Network error or error status
/// - `Err(SpotifyError::Malformed)` - The response carried no playlist id
///
/// # API Endpoint
///
/// `POST /users/{user_id}/playlists` with `{"name", "description", "public": false}`
pub async fn create(
    http: &Client,
    config: &Config,
    session: &Session,
    name: &str,
    description: &str,
) -> Result<Playlist, SpotifyError> {
    let body = CreatePlaylistRequest {
        name: name.to_string(),
        description: description.to_string(),
        public: false,
    };

    let playlist = http
        .post(playlists_url(config, session))
        .bearer_auth(&session.access_token)
        .json(&body)
        .send()
        .await?
        .error_for_status()?
        .json::<Playlist>()
        .await?;

    if playlist.id.is_empty() {
        return Err(SpotifyError::Malformed(
            "created playlist has no id".to_string(),
        ));
    }
    Ok(playlist)
}

/// URIs of every item currently in the playlist, in playlist order.
///
/// Follows `next` links until the last page. Items without a URI (removed or
/// unavailable tracks) are skipped.
pub async fn track_uris(
    http: &Client,
    config: &Config,
    session: &Session,
    playlist_id: &str,
) -> Result<Vec<String>, SpotifyError> {
    let mut uris = Vec::new();

    let mut page = http
        .get(tracks_url(config, session, playlist_id))
        .bearer_auth(&session.access_token)
        .query(&[("fields", "items(track(uri)),next")])
        .send()
        .await?
        .error_for_status()?
        .json::<PlaylistItemsResponse>()
        .await?;

    loop {
        uris.extend(
            page.items
                .into_iter()
                .filter_map(|item| item.track.and_then(|t| t.uri)),
        );

        let Some(next) = page.next else {
            break;
        };
        page = http
            .get(&next)
            .bearer_auth(&session.access_token)
            .send()
            .await?
            .error_for_status()?
            .json::<PlaylistItemsResponse>()
            .await?;
    }

    Ok(uris)
}

/// Removes every occurrence of the given URIs from the playlist.
///
/// URIs are sent in consecutive batches of [`MAX_TRACKS_PER_REQUEST`].
/// Callers pass each URI once; Spotify drops all of its entries anyway.
///
/// # Errors
///
/// Fails with `SpotifyError::Http` on the first batch that is rejected.
/// Earlier batches stay removed.
///
/// # API Endpoint
///
/// `DELETE /users/{user_id}/playlists/{playlist_id}/tracks` with
/// `{"tracks": [{"uri": ...}]}`
pub async fn remove_tracks(
    http: &Client,
    config: &Config,
    session: &Session,
    playlist_id: &str,
    uris: &[String],
) -> Result<(), SpotifyError> {
    for chunk in uris.chunks(MAX_TRACKS_PER_REQUEST) {
        let body = RemoveTracksRequest {
            tracks: chunk.iter().map(|uri| TrackUri { uri: uri.clone() }).collect(),
        };

        http.delete(tracks_url(config, session, playlist_id))
            .bearer_auth(&session.access_token)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json::<SnapshotResponse>()
            .await?;
    }
    Ok(())
}

/// Appends the URIs to the end of the playlist, keeping their order.
///
/// One request per [`MAX_TRACKS_PER_REQUEST`] URIs. Batches go out one after
/// the other, so the playlist order equals the order of `uris`.
///
/// # API Endpoint
///
/// `POST /users/{user_id}/playlists/{playlist_id}/tracks` with `{"uris": [...]}`
pub async fn add_tracks(
    http: &Client,
    config: &Config,
    session: &Session,
    playlist_id: &str,
    uris: &[String],
) -> Result<(), SpotifyError> {
    for chunk in uris.chunks(MAX_TRACKS_PER_REQUEST) {
        let body = AddTrackToPlaylistRequest {
            uris: chunk.to_vec(),
        };

        http.post(tracks_url(config, session, playlist_id))
            .bearer_auth(&session.access_token)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json::<SnapshotResponse>()
            .await?;
    }
    Ok(())
}
