use std::time::Duration;

use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::Client;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    config::{self, Config},
    server::{CatchError, RedirectCatcher},
    success,
    types::{AuthorizationResult, CallbackParams, Session, TokenResponse, UserProfile},
    warning,
};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Redirect(#[from] CatchError),
    #[error("The app was denied permission ({0}), please try again.")]
    Denied(String),
    #[error("Authorization redirect did not carry a code")]
    MissingCode,
    #[error("Authorization redirect returned an unexpected state")]
    StateMismatch,
    #[error("Spotify request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Spotify response is missing `{0}`")]
    MissingField(&'static str),
}

/// Options of a single authorization run.
#[derive(Debug, Clone)]
pub struct AuthOptions {
    pub timeout: Duration,
    pub log_requests: bool,
}

impl Default for AuthOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(300),
            log_requests: false,
        }
    }
}

/// Fresh anti-forgery token for the authorization request.
pub fn generate_state() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Builds the URL the user opens to grant the app access.
///
/// Every query value is form-encoded.
///
/// # Example
///
/// ```
/// let url = authorize_url(&config, &generate_state());
/// // https://accounts.spotify.com/authorize?client_id=...&response_type=code&...
/// ```
pub fn authorize_url(config: &Config, state: &str) -> String {
    format!(
        "{auth_url}/authorize?client_id={client_id}&response_type=code&redirect_uri={redirect_uri}&state={state}&scope={scope}",
        auth_url = config.spotify_auth_url,
        client_id = encode(&config.spotify_client_id),
        redirect_uri = encode(&config.redirect_uri),
        state = encode(state),
        scope = encode(config::SPOTIFY_SCOPE),
    )
}

fn encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Opens the authorization URL in the default browser.
///
/// Fire and forget: a failure only prints the URL for manual navigation.
pub fn open_in_browser(auth_url: &str) {
    if webbrowser::open(auth_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }
}

/// Runs the authorization-code flow and resolves the acting user.
///
/// 1. Binds the redirect catcher (a busy port fails here, before any browser)
/// 2. Hands the authorization URL to `open`
/// 3. Waits for exactly one redirect
/// 4. Verifies `state`, exchanges the code and fetches the profile
pub async fn authorize<F>(
    http: &Client,
    config: &Config,
    options: &AuthOptions,
    open: F,
) -> Result<Session, AuthError>
where
    F: FnOnce(&str),
{
    let catcher = RedirectCatcher::bind(config.redirect_address)
        .await?
        .log_requests(options.log_requests);

    let state = generate_state();
    open(&authorize_url(config, &state));

    let params = match catcher.wait(options.timeout).await? {
        AuthorizationResult::Denied(kind) => return Err(AuthError::Denied(kind)),
        AuthorizationResult::Granted(params) => params,
    };
    let code = verified_code(&params, &state)?;
    success!("App granted permissions.");

    let access_token = exchange_code(http, config, code).await?;
    let user_id = current_user(http, config, &access_token).await?;

    Ok(Session {
        access_token,
        user_id,
    })
}

/// Checks the redirect against the `state` that was sent and returns its code.
///
/// A missing or different `state` is rejected before the code is looked at.
pub fn verified_code<'a>(params: &'a CallbackParams, state: &str) -> Result<&'a str, AuthError> {
    if params.get("state") != Some(state) {
        return Err(AuthError::StateMismatch);
    }
    params.get("code").ok_or(AuthError::MissingCode)
}

/// Exchanges an authorization code for an access token.
///
/// The client credentials travel in an `Authorization: Basic` header, the
/// code and redirect URI in the form body.
///
/// # Returns
///
/// - `Ok(String)` - The access token
/// - `Err(AuthError::Http)` - Network error or a rejected code
/// - `Err(AuthError::MissingField)` - The response had no `access_token`
///
/// # API Endpoint
///
/// `POST {auth_url}/api/token` with `grant_type=authorization_code`
pub async fn exchange_code(http: &Client, config: &Config, code: &str) -> Result<String, AuthError> {
    let credentials = STANDARD.encode(format!(
        "{}:{}",
        config.spotify_client_id, config.spotify_client_secret
    ));

    let res = http
        .post(format!("{}/api/token", config.spotify_auth_url))
        .header("Authorization", format!("Basic {}", credentials))
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", config.redirect_uri.as_str()),
        ])
        .send()
        .await?
        .error_for_status()?;

    let json = res.json::<TokenResponse>().await?;
    json.access_token
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingField("access_token"))
}

/// Looks up the id of the user the token belongs to.
///
/// # API Endpoint
///
/// `GET /me`
pub async fn current_user(http: &Client, config: &Config, token: &str) -> Result<String, AuthError> {
    let profile = http
        .get(format!("{}/me", config.spotify_api_url))
        .bearer_auth(token)
        .send()
        .await?
        .error_for_status()?
        .json::<UserProfile>()
        .await?;

    Ok(profile.id)
}
