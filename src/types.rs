use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Decoded query parameters of the authorization redirect.
///
/// Keeps every pair in arrival order. Keys may repeat; [`CallbackParams::get`]
/// returns the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackParams {
    pairs: Vec<(String, String)>,
}

impl CallbackParams {
    pub fn from_query(query: &str) -> Self {
        let pairs = url::form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Self { pairs }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }
}

/// Outcome of the authorization redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationResult {
    Granted(CallbackParams),
    /// The user (or the service) refused access. Holds the `error` value.
    Denied(String),
}

impl AuthorizationResult {
    pub fn from_params(params: CallbackParams) -> Self {
        if params.contains("error") {
            let kind = params.get("error").unwrap_or_default().to_string();
            AuthorizationResult::Denied(kind)
        } else {
            AuthorizationResult::Granted(params)
        }
    }
}

/// Credentials of the acting Spotify user, valid for the current run only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrobbleTrack {
    pub rank: u32,
    pub name: String,
    pub artist: String,
}

impl ScrobbleTrack {
    pub fn search_query(&self) -> String {
        format!("{} {}", self.name, self.artist)
    }
}

#[derive(Tabled)]
pub struct ScrobbleTableRow {
    #[tabled(rename = "#")]
    pub rank: u32,
    pub name: String,
    pub artist: String,
}

impl From<&ScrobbleTrack> for ScrobbleTableRow {
    fn from(track: &ScrobbleTrack) -> Self {
        Self {
            rank: track.rank,
            name: track.name.clone(),
            artist: track.artist.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTrack {
    pub source: ScrobbleTrack,
    pub uri: Option<String>,
}

/// URIs of the resolved tracks in rank order, misses left out.
pub fn resolved_uris(tracks: &[ResolvedTrack]) -> Vec<String> {
    tracks.iter().filter_map(|t| t.uri.clone()).collect()
}

// Spotify wire types

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub tracks: SearchTracks,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchTracks {
    pub items: Vec<Track>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub uri: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetUserPlaylistsResponse {
    pub items: Vec<Playlist>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub owner: Option<PlaylistOwner>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlaylistOwner {
    pub id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub description: String,
    pub public: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistItemsResponse {
    pub items: Vec<PlaylistItem>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistItem {
    pub track: Option<Track>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddTrackToPlaylistRequest {
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RemoveTracksRequest {
    pub tracks: Vec<TrackUri>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrackUri {
    pub uri: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotResponse {
    pub snapshot_id: Option<String>,
}

// Last.fm wire types

#[derive(Debug, Clone, Deserialize)]
pub struct TopTracksResponse {
    pub toptracks: TopTracks,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopTracks {
    #[serde(default)]
    pub track: ChartEntries,
}

/// A chart with a single entry comes back as an object instead of a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ChartEntries {
    Many(Vec<ChartEntry>),
    One(Box<ChartEntry>),
}

impl Default for ChartEntries {
    fn default() -> Self {
        ChartEntries::Many(Vec::new())
    }
}

impl ChartEntries {
    pub fn into_vec(self) -> Vec<ChartEntry> {
        match self {
            ChartEntries::Many(entries) => entries,
            ChartEntries::One(entry) => vec![*entry],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartEntry {
    pub name: String,
    pub artist: ChartArtist,
    #[serde(rename = "@attr")]
    pub attr: RankAttr,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartArtist {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RankAttr {
    pub rank: RankValue,
}

/// Last.fm reports the rank as a string; numbers are accepted too.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RankValue {
    Number(u32),
    Text(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct LastfmErrorResponse {
    pub error: u32,
    #[serde(default)]
    pub message: String,
}
