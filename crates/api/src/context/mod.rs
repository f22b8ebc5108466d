//! Application context - dependency injection container
//!
//! Built once at process start from an [`AppConfig`] and torn down with
//! [`AppContext::shutdown`]. There is no global session container: everything
//! that needs the orchestrator or the session manager borrows the context.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use scoutgate_common::SecretString;
use scoutgate_core::{
    AccessTokenValidator, AuthOrchestrator, AuthorizationPolicy, SessionManager, SessionStore,
    TokenExchangeClient,
};
use scoutgate_domain::{AppConfig, Result, SessionStoreKind};
use scoutgate_infra::{
    CallableTokenExchange, FirebaseAuthBackend, FirestoreProfileProvisioner,
    HitobitoIdentityProvider, HitobitoUserInfoClient, HttpClient, KeyringSessionStore,
    LoopbackCallbackServer, MemorySessionStore,
};
use tokio::sync::Mutex;
use tracing::{info, warn};
use url::Url;

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: AppConfig,
    pub orchestrator: Arc<AuthOrchestrator>,
    pub sessions: Arc<SessionManager>,
    provider: Arc<HitobitoIdentityProvider>,
    callback_server: Mutex<Option<LoopbackCallbackServer>>,
}

impl AppContext {
    /// Wire every adapter from `config` and restore the persisted session.
    ///
    /// A session store that cannot be read is logged and treated as empty.
    ///
    /// # Errors
    /// `Config` if the configuration is invalid or an adapter cannot be built.
    pub async fn new(config: AppConfig) -> Result<Self> {
        let store: Arc<dyn SessionStore> = match config.session.store {
            SessionStoreKind::Keyring => {
                Arc::new(KeyringSessionStore::new(config.session.keyring_service.clone())?)
            }
            SessionStoreKind::Memory => Arc::new(MemorySessionStore::new()),
        };

        let ctx = Self::with_session_store(config, store)?;

        match ctx.sessions.restore().await {
            Ok(true) => info!(uid = ?ctx.sessions.current_uid(), "Restored persisted session"),
            Ok(false) => info!("No persisted session"),
            Err(err) => warn!(error = %err, "Failed to restore persisted session"),
        }

        Ok(ctx)
    }

    /// Wire the context around an explicit session store; no restore is
    /// attempted.
    ///
    /// # Errors
    /// `Config` if the configuration is invalid or an adapter cannot be built.
    pub fn with_session_store(config: AppConfig, store: Arc<dyn SessionStore>) -> Result<Self> {
        config.validate()?;

        let http = HttpClient::from_config(&config.http)?;
        let redirect_timeout = Duration::from_secs(config.session.redirect_timeout_seconds);

        let provider =
            Arc::new(HitobitoIdentityProvider::new(&config.oauth, &http, redirect_timeout)?);
        let user_info =
            Arc::new(HitobitoUserInfoClient::new(http.clone(), config.oauth.issuer.clone()));
        let exchange =
            Arc::new(CallableTokenExchange::new(http.clone(), config.backend.exchange_url()));
        let session_backend = Arc::new(FirebaseAuthBackend::new(
            http.clone(),
            config.backend.identity_toolkit_url.clone(),
            SecretString::new(config.backend.api_key.clone()),
        ));

        let sessions = Arc::new(SessionManager::new(session_backend, store));

        let mut orchestrator = AuthOrchestrator::new(
            provider.clone(),
            AccessTokenValidator::new(user_info),
            AuthorizationPolicy::new(config.authorization.required_group_id),
            TokenExchangeClient::new(exchange),
            Arc::clone(&sessions),
        );
        if config.session.provision_profile {
            orchestrator = orchestrator.with_profile_provisioner(Arc::new(
                FirestoreProfileProvisioner::new(
                    http,
                    config.backend.firestore_url.clone(),
                    config.backend.project_id.clone(),
                ),
            ));
        }

        info!(
            issuer = %config.oauth.issuer,
            project_id = %config.backend.project_id,
            required_group_id = config.authorization.required_group_id,
            store = %config.session.store,
            "AppContext initialized"
        );

        Ok(Self {
            config,
            orchestrator: Arc::new(orchestrator),
            sessions,
            provider,
            callback_server: Mutex::new(None),
        })
    }

    /// Whether the configured redirect URI is served by the loopback server
    pub fn uses_loopback_redirect(&self) -> bool {
        Url::parse(&self.config.oauth.redirect_uri)
            .is_ok_and(|uri| scoutgate_infra::redirect::is_loopback_redirect(&uri))
    }

    /// Start the loopback callback server if the redirect URI needs one.
    ///
    /// Returns the bound address, or `None` for custom-scheme redirects which
    /// arrive through [`crate::commands::handle_deep_link`]. Calling it again
    /// while the server runs returns the existing address.
    ///
    /// # Errors
    /// `Network` if the redirect port cannot be bound.
    pub async fn start_callback_server(&self) -> Result<Option<SocketAddr>> {
        if !self.uses_loopback_redirect() {
            return Ok(None);
        }

        let mut server = self.callback_server.lock().await;
        if let Some(running) = server.as_ref() {
            return Ok(Some(running.local_addr()));
        }

        let started = LoopbackCallbackServer::start(self.provider.coordinator()).await?;
        let addr = started.local_addr();
        *server = Some(started);
        Ok(Some(addr))
    }

    /// Cancel any in-flight login and stop the callback server.
    ///
    /// # Errors
    /// `Internal` if the callback server task panicked.
    pub async fn shutdown(&self) -> Result<()> {
        info!("Shutting down AppContext");

        if self.orchestrator.cancel_redirect() {
            info!("Cancelled in-flight login during shutdown");
        }

        if let Some(server) = self.callback_server.lock().await.take() {
            server.shutdown().await?;
        }

        info!("AppContext shutdown complete");
        Ok(())
    }
}
