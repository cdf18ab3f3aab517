use std::sync::Arc;

use axum::{
    Extension,
    extract::{OriginalUri, RawQuery},
    http::Method,
    response::Html,
};
use tokio::sync::{Mutex, oneshot};

use crate::{
    info,
    types::{AuthorizationResult, CallbackParams},
};

const PAGE_TEMPLATE: &str = r#"<html>
    <head>
        <title>{status}</title>
    </head>
    <body>
        <p>{status}</p>
        <p>You can close this window now.</p>
        <script>
            window.open('', '_self', ''); window.close();
        </script>
    </body>
</html>
"#;

const STATUS_GRANTED: &str = "User successfully authenticated.";
const STATUS_DENIED: &str = "There was a problem authenticating the user.";
const STATUS_ALREADY_HANDLED: &str = "The authorization redirect was already handled.";

/// Single-slot hand-off between the callback handler and the waiting flow.
///
/// The first request takes the sender out of the slot; every later request
/// finds it empty and leaves the captured result untouched.
#[derive(Clone)]
pub struct CallbackSlot {
    sender: Arc<Mutex<Option<oneshot::Sender<AuthorizationResult>>>>,
    log_requests: bool,
}

impl CallbackSlot {
    pub fn new(log_requests: bool) -> (Self, oneshot::Receiver<AuthorizationResult>) {
        let (tx, rx) = oneshot::channel();
        let slot = Self {
            sender: Arc::new(Mutex::new(Some(tx))),
            log_requests,
        };
        (slot, rx)
    }

    async fn fill(&self, result: AuthorizationResult) -> bool {
        let Some(sender) = self.sender.lock().await.take() else {
            return false;
        };
        // the receiver is only gone when the flow gave up waiting
        sender.send(result).is_ok()
    }
}

pub fn render_page(status: &str) -> String {
    PAGE_TEMPLATE.replace("{status}", status)
}

pub async fn callback(
    method: Method,
    OriginalUri(uri): OriginalUri,
    RawQuery(query): RawQuery,
    Extension(slot): Extension<CallbackSlot>,
) -> Html<String> {
    if slot.log_requests {
        info!("{} {}", method, uri);
    }

    let params = CallbackParams::from_query(query.as_deref().unwrap_or_default());
    let result = AuthorizationResult::from_params(params);
    let status = match &result {
        AuthorizationResult::Granted(_) => STATUS_GRANTED,
        AuthorizationResult::Denied(_) => STATUS_DENIED,
    };

    if slot.fill(result).await {
        Html(render_page(status))
    } else {
        Html(render_page(STATUS_ALREADY_HANDLED))
    }
}
