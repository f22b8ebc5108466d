use std::net::SocketAddr;

use axum::extract::{RawQuery, State};
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use scoutgate_common::auth::RedirectCoordinator;
use scoutgate_domain::{Result, ScoutGateError};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use url::Url;

const SUCCESS_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>ScoutGate</title></head>
<body><h1>Login complete</h1><p>You can close this window and return to the app.</p></body>
</html>"#;

const IGNORED_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>ScoutGate</title></head>
<body><h1>No login in progress</h1><p>This link has expired. Start the login again from the app.</p></body>
</html>"#;

/// Whether `uri` is an `http` redirect on the loopback interface
pub fn is_loopback_redirect(uri: &Url) -> bool {
    uri.scheme() == "http"
        && matches!(uri.host_str(), Some("127.0.0.1" | "localhost" | "[::1]"))
}

/// Loopback HTTP server that hands OAuth redirect callbacks to a
/// [`RedirectCoordinator`].
///
/// Binds the exact host and port of the coordinator's redirect URI (it is
/// registered with the provider, so it cannot be ephemeral) and serves its
/// path.
pub struct LoopbackCallbackServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl LoopbackCallbackServer {
    /// Start serving callbacks for `coordinator`.
    ///
    /// # Errors
    /// `Config` if the redirect URI is not a loopback `http` URL with a port,
    /// `Network` if the address cannot be bound.
    pub async fn start(coordinator: RedirectCoordinator) -> Result<Self> {
        let redirect_uri = coordinator.redirect_uri().clone();
        if !is_loopback_redirect(&redirect_uri) {
            return Err(ScoutGateError::Config(format!(
                "redirect URI {redirect_uri} is not a loopback http URL"
            )));
        }
        let port = redirect_uri.port().ok_or_else(|| {
            ScoutGateError::Config("loopback redirect URI must name a port".to_string())
        })?;
        let host = match redirect_uri.host_str() {
            Some("[::1]") => "[::1]",
            _ => "127.0.0.1",
        };

        let listener = TcpListener::bind(format!("{host}:{port}")).await.map_err(|err| {
            ScoutGateError::Network(format!("failed to bind OAuth loopback server: {err}"))
        })?;
        let addr = listener
            .local_addr()
            .map_err(|err| ScoutGateError::Network(format!("failed to determine port: {err}")))?;

        let app = Router::new()
            .route(redirect_uri.path(), get(handle_callback))
            .with_state(coordinator);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
            {
                error!(error = %err, "OAuth callback server error");
            }
        });

        info!(%addr, path = redirect_uri.path(), "OAuth loopback server listening");
        Ok(Self { addr, shutdown_tx: Some(shutdown_tx), handle: Some(handle) })
    }

    pub const fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Shut down the loopback server gracefully.
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.await {
                if err.is_panic() {
                    return Err(ScoutGateError::Internal(format!(
                        "OAuth callback server panicked: {err}"
                    )));
                }
            }
        }

        Ok(())
    }
}

impl Drop for LoopbackCallbackServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if !handle.is_finished() {
                handle.abort();
            }
        }
    }
}

async fn handle_callback(
    State(coordinator): State<RedirectCoordinator>,
    RawQuery(query): RawQuery,
) -> Html<&'static str> {
    let mut callback = coordinator.redirect_uri().clone();
    callback.set_query(query.as_deref());

    if coordinator.resume(callback.as_str()) {
        debug!("loopback callback delivered");
        Html(SUCCESS_PAGE)
    } else {
        debug!("loopback callback ignored: no redirect in flight");
        Html(IGNORED_PAGE)
    }
}
