use std::{future::IntoFuture, io, net::SocketAddr, time::Duration};

use axum::{Extension, Router, routing::get};
use thiserror::Error;
use tokio::net::TcpListener;

use crate::{
    api::{self, CallbackSlot},
    types::AuthorizationResult,
};

/// Time given to in-flight connections to finish after the redirect arrived.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum CatchError {
    #[error("Cannot listen on {addr}: {source}")]
    Bind { addr: SocketAddr, source: io::Error },
    #[error("No authorization redirect received within {0:?}")]
    Timeout(Duration),
    #[error("Redirect listener failed: {0}")]
    Serve(io::Error),
    #[error("Redirect listener stopped before a redirect arrived")]
    Stopped,
}

/// One-shot local listener capturing the authorization redirect.
///
/// The socket is bound by [`RedirectCatcher::bind`] so a busy port is
/// reported before the browser is opened. [`RedirectCatcher::wait`] consumes
/// the catcher; the socket is closed when it returns or when its future is
/// dropped.
pub struct RedirectCatcher {
    listener: TcpListener,
    log_requests: bool,
}

impl RedirectCatcher {
    /// Binds the listening socket. Nothing is served until [`Self::wait`].
    pub async fn bind(addr: SocketAddr) -> Result<Self, CatchError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| CatchError::Bind { addr, source })?;

        Ok(Self {
            listener,
            log_requests: false,
        })
    }

    /// Prints the method and URI of every received request.
    pub fn log_requests(mut self, enabled: bool) -> Self {
        self.log_requests = enabled;
        self
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serves until the first redirect is captured, then shuts the listener down.
    pub async fn wait(self, timeout: Duration) -> Result<AuthorizationResult, CatchError> {
        let (slot, result_rx) = CallbackSlot::new(self.log_requests);
        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();

        let app = Router::new().route("/", get(api::callback).layer(Extension(slot)));

        let server = axum::serve(self.listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop_rx.await;
            })
            .into_future();
        tokio::pin!(server);

        let captured = tokio::select! {
            served = &mut server => {
                return Err(match served {
                    Ok(()) => CatchError::Stopped,
                    Err(e) => CatchError::Serve(e),
                });
            }
            captured = tokio::time::timeout(timeout, result_rx) => captured,
        };

        let _ = stop_tx.send(());
        // the response page is still being written; give it a moment
        let _ = tokio::time::timeout(SHUTDOWN_GRACE, &mut server).await;

        match captured {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(_)) => Err(CatchError::Stopped),
            Err(_) => Err(CatchError::Timeout(timeout)),
        }
    }
}
