#![allow(dead_code)]

use std::{
    collections::HashMap,
    net::{SocketAddr, TcpListener as StdTcpListener},
    sync::{Arc, Mutex},
    time::Instant,
};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use base64::{Engine, engine::general_purpose::STANDARD};
use lastospot::{config::Config, types::Session};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};

pub const CLIENT_ID: &str = "client-id";
pub const CLIENT_SECRET: &str = "client-secret";
pub const AUTH_CODE: &str = "the-code";
pub const ACCESS_TOKEN: &str = "token-123";
pub const USER_ID: &str = "me";
pub const ITEMS_PAGE_SIZE: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakePlaylist {
    pub id: String,
    pub name: String,
    pub owner: String,
    pub uris: Vec<String>,
}

#[derive(Debug, Default)]
pub struct FakeState {
    pub base_url: String,
    /// search query -> track uri
    pub catalog: HashMap<String, String>,
    pub chart: Value,
    pub playlists: Vec<FakePlaylist>,
    pub token_calls: usize,
    pub searches: Vec<String>,
    pub search_times: Vec<Instant>,
    /// status every search answers with instead of a result
    pub search_status: Option<u16>,
    /// number of upcoming searches answered with 429
    pub rate_limited: usize,
    pub retry_after_secs: u64,
    /// "create", "delete", "add" in call order
    pub writes: Vec<String>,
    pub deleted: Vec<Vec<String>>,
    pub added: Vec<Vec<String>>,
    pub created: usize,
}

pub type Shared = Arc<Mutex<FakeState>>;

/// Fake Spotify accounts service, Spotify Web API and Last.fm API on one port.
pub struct FakeServices {
    pub state: Shared,
    pub addr: SocketAddr,
}

impl FakeServices {
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(FakeState::default()));

        let app = Router::new()
            .route("/accounts/api/token", axum::routing::post(token))
            .route("/v1/me", get(me))
            .route("/v1/search", get(search))
            .route(
                "/v1/users/{user}/playlists",
                get(list_playlists).post(create_playlist),
            )
            .route(
                "/v1/users/{user}/playlists/{id}/tracks",
                get(playlist_items).post(add_items).delete(remove_items),
            )
            .route("/lastfm/", get(chart))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        state.lock().unwrap().base_url = format!("http://{}", addr);
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { state, addr }
    }

    pub fn config(&self) -> Config {
        let redirect_port = free_port();
        let mut config = Config::from_lookup(|key| match key {
            "SPOT_ID" => Some(CLIENT_ID.to_string()),
            "SPOT_SECRET" => Some(CLIENT_SECRET.to_string()),
            "LAST_KEY" => Some("lastfm-key".to_string()),
            "LAST_USER" => Some("scrobbler".to_string()),
            _ => None,
        })
        .unwrap();

        config.spotify_auth_url = format!("http://{}/accounts", self.addr);
        config.spotify_api_url = format!("http://{}/v1", self.addr);
        config.lastfm_api_url = format!("http://{}/lastfm", self.addr);
        config.redirect_address = SocketAddr::from(([127, 0, 0, 1], redirect_port));
        config.redirect_uri = format!("http://127.0.0.1:{}", redirect_port);
        config
    }

    pub fn set_chart(&self, tracks: &[(&str, &str)]) {
        self.state.lock().unwrap().chart = chart_json(tracks);
    }

    pub fn add_to_catalog(&self, name: &str, artist: &str, uri: &str) {
        self.state
            .lock()
            .unwrap()
            .catalog
            .insert(format!("{} {}", name, artist), uri.to_string());
    }

    pub fn add_playlist(&self, id: &str, name: &str, owner: &str, uris: &[&str]) {
        self.state.lock().unwrap().playlists.push(FakePlaylist {
            id: id.to_string(),
            name: name.to_string(),
            owner: owner.to_string(),
            uris: uris.iter().map(|u| u.to_string()).collect(),
        });
    }

    pub fn playlists_named(&self, name: &str) -> Vec<FakePlaylist> {
        self.state
            .lock()
            .unwrap()
            .playlists
            .iter()
            .filter(|p| p.name == name)
            .cloned()
            .collect()
    }

    pub fn writes(&self) -> Vec<String> {
        self.state.lock().unwrap().writes.clone()
    }
}

pub fn chart_json(tracks: &[(&str, &str)]) -> Value {
    let entries: Vec<Value> = tracks
        .iter()
        .enumerate()
        .map(|(i, (name, artist))| {
            json!({
                "name": name,
                "playcount": "12",
                "artist": { "name": artist, "mbid": "" },
                "@attr": { "rank": (i + 1).to_string() }
            })
        })
        .collect();

    json!({
        "toptracks": {
            "track": entries,
            "@attr": { "user": "scrobbler", "page": "1", "perPage": "30" }
        }
    })
}

pub fn free_port() -> u16 {
    StdTcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

pub fn session() -> Session {
    Session {
        access_token: ACCESS_TOKEN.to_string(),
        user_id: USER_ID.to_string(),
    }
}

pub fn http() -> Client {
    Client::builder().no_proxy().build().unwrap()
}

/// Browser stand-in: follows the authorization URL straight to the redirect.
pub fn redirect_with(extra: &'static str, keep_state: bool) -> impl FnOnce(&str) {
    move |auth_url: &str| {
        let url = url::Url::parse(auth_url).unwrap();
        let query: HashMap<String, String> = url.query_pairs().into_owned().collect();
        let redirect_uri = query["redirect_uri"].clone();
        let state = if keep_state {
            query["state"].clone()
        } else {
            "forged".to_string()
        };

        let target = format!("{}/?{}&state={}", redirect_uri, extra, state);
        tokio::spawn(async move {
            let _ = http().get(target).send().await;
        });
    }
}

pub fn grant() -> impl FnOnce(&str) {
    redirect_with("code=the-code", true)
}

pub fn deny() -> impl FnOnce(&str) {
    redirect_with("error=access_denied", true)
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {}", ACCESS_TOKEN))
}

#[derive(Deserialize)]
struct TokenForm {
    grant_type: String,
    code: String,
    redirect_uri: String,
}

async fn token(
    State(state): State<Shared>,
    headers: HeaderMap,
    axum::Form(form): axum::Form<TokenForm>,
) -> (StatusCode, Json<Value>) {
    state.lock().unwrap().token_calls += 1;

    let expected = format!(
        "Basic {}",
        STANDARD.encode(format!("{}:{}", CLIENT_ID, CLIENT_SECRET))
    );
    let basic_ok = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == expected);

    if !basic_ok
        || form.grant_type != "authorization_code"
        || form.code != AUTH_CODE
        || !form.redirect_uri.starts_with("http://127.0.0.1:")
    {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_grant" })),
        );
    }

    (
        StatusCode::OK,
        Json(json!({
            "access_token": ACCESS_TOKEN,
            "token_type": "Bearer",
            "expires_in": 3600
        })),
    )
}

async fn me(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({})));
    }
    (StatusCode::OK, Json(json!({ "id": USER_ID })))
}

async fn search(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({}))).into_response();
    }
    assert_eq!(params.get("type").map(String::as_str), Some("track"));
    assert_eq!(params.get("limit").map(String::as_str), Some("1"));
    assert_eq!(params.get("market").map(String::as_str), Some("from_token"));

    let q = params.get("q").cloned().unwrap_or_default();
    let mut state = state.lock().unwrap();
    state.searches.push(q.clone());
    state.search_times.push(Instant::now());

    if state.rate_limited > 0 {
        state.rate_limited -= 1;
        return (
            StatusCode::TOO_MANY_REQUESTS,
            [("retry-after", state.retry_after_secs.to_string())],
            Json(json!({ "error": { "status": 429 } })),
        )
            .into_response();
    }
    if let Some(status) = state.search_status {
        let status = StatusCode::from_u16(status).unwrap();
        return (status, Json(json!({ "error": { "status": status.as_u16() } }))).into_response();
    }

    let items: Vec<Value> = state
        .catalog
        .get(&q)
        .map(|uri| vec![json!({ "uri": uri, "name": q })])
        .unwrap_or_default();
    (StatusCode::OK, Json(json!({ "tracks": { "items": items } }))).into_response()
}

async fn list_playlists(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(user): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) || user != USER_ID {
        return (StatusCode::UNAUTHORIZED, Json(json!({})));
    }
    let limit: usize = params
        .get("limit")
        .and_then(|l| l.parse().ok())
        .unwrap_or(20);

    let state = state.lock().unwrap();
    let items: Vec<Value> = state
        .playlists
        .iter()
        .take(limit)
        .map(|p| json!({ "id": p.id, "name": p.name, "owner": { "id": p.owner } }))
        .collect();
    (StatusCode::OK, Json(json!({ "items": items, "next": null })))
}

#[derive(Deserialize)]
struct CreateBody {
    name: String,
    description: String,
}

async fn create_playlist(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(user): Path<String>,
    Json(body): Json<CreateBody>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) || user != USER_ID {
        return (StatusCode::UNAUTHORIZED, Json(json!({})));
    }
    assert!(!body.description.is_empty());

    let mut state = state.lock().unwrap();
    state.created += 1;
    let id = format!("created-{}", state.created);
    state.writes.push("create".to_string());
    state.playlists.push(FakePlaylist {
        id: id.clone(),
        name: body.name.clone(),
        owner: user.clone(),
        uris: Vec::new(),
    });
    (
        StatusCode::CREATED,
        Json(json!({ "id": id, "name": body.name, "owner": { "id": user } })),
    )
}

async fn playlist_items(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path((_user, id)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({})));
    }
    let offset: usize = params
        .get("offset")
        .and_then(|o| o.parse().ok())
        .unwrap_or(0);

    let state = state.lock().unwrap();
    let Some(playlist) = state.playlists.iter().find(|p| p.id == id) else {
        return (StatusCode::NOT_FOUND, Json(json!({})));
    };

    let page: Vec<Value> = playlist
        .uris
        .iter()
        .skip(offset)
        .take(ITEMS_PAGE_SIZE)
        .map(|uri| json!({ "track": { "uri": uri } }))
        .collect();
    let next = if offset + ITEMS_PAGE_SIZE < playlist.uris.len() {
        json!(format!(
            "{}/v1/users/{}/playlists/{}/tracks?offset={}",
            state.base_url,
            USER_ID,
            id,
            offset + ITEMS_PAGE_SIZE
        ))
    } else {
        Value::Null
    };
    (StatusCode::OK, Json(json!({ "items": page, "next": next })))
}

#[derive(Deserialize)]
struct AddBody {
    uris: Vec<String>,
}

async fn add_items(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path((_user, id)): Path<(String, String)>,
    Json(body): Json<AddBody>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({})));
    }
    let mut state = state.lock().unwrap();
    state.writes.push("add".to_string());
    state.added.push(body.uris.clone());
    let Some(playlist) = state.playlists.iter_mut().find(|p| p.id == id) else {
        return (StatusCode::NOT_FOUND, Json(json!({})));
    };
    playlist.uris.extend(body.uris);
    (StatusCode::CREATED, Json(json!({ "snapshot_id": "snap" })))
}

#[derive(Deserialize)]
struct RemoveBody {
    tracks: Vec<RemoveUri>,
}

#[derive(Deserialize)]
struct RemoveUri {
    uri: String,
}

async fn remove_items(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path((_user, id)): Path<(String, String)>,
    Json(body): Json<RemoveBody>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({})));
    }
    let uris: Vec<String> = body.tracks.into_iter().map(|t| t.uri).collect();

    let mut state = state.lock().unwrap();
    state.writes.push("delete".to_string());
    state.deleted.push(uris.clone());
    let Some(playlist) = state.playlists.iter_mut().find(|p| p.id == id) else {
        return (StatusCode::NOT_FOUND, Json(json!({})));
    };
    // every occurrence of a listed uri goes
    playlist.uris.retain(|u| !uris.contains(u));
    (StatusCode::OK, Json(json!({ "snapshot_id": "snap" })))
}

async fn chart(
    State(state): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    assert_eq!(
        params.get("method").map(String::as_str),
        Some("user.gettoptracks")
    );
    assert_eq!(params.get("user").map(String::as_str), Some("scrobbler"));
    assert_eq!(params.get("api_key").map(String::as_str), Some("lastfm-key"));
    assert_eq!(params.get("period").map(String::as_str), Some("1month"));
    assert_eq!(params.get("limit").map(String::as_str), Some("30"));
    assert_eq!(params.get("format").map(String::as_str), Some("json"));

    Json(state.lock().unwrap().chart.clone())
}
