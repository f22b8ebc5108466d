use std::time::Duration;

use async_trait::async_trait;
use scoutgate_common::auth::{
    AuthorizationResponse, IssuerConfiguration, OAuthConfig, OidcClient, RedirectCoordinator,
    TokenResponse,
};
use scoutgate_core::{IdentityProvider, PresentationContext};
use scoutgate_domain::{AuthError, OAuthSettings, Result, ScoutGateError};
use tracing::{debug, info};
use url::Url;

use crate::errors::{map_oauth_error, map_redirect_error};
use crate::http::HttpClient;

/// OIDC public client for the Hitobito issuer
///
/// Owns the [`RedirectCoordinator`] for the configured redirect URI; hand a
/// clone of it to whatever delivers callbacks (deep-link handler or the
/// loopback server).
#[derive(Debug, Clone)]
pub struct HitobitoIdentityProvider {
    client: OidcClient,
    coordinator: RedirectCoordinator,
    redirect_timeout: Duration,
}

impl HitobitoIdentityProvider {
    /// # Errors
    /// Returns `ScoutGateError::Config` if the redirect URI does not parse.
    pub fn new(settings: &OAuthSettings, http: &HttpClient, redirect_timeout: Duration) -> Result<Self> {
        let redirect_uri = Url::parse(&settings.redirect_uri).map_err(|e| {
            ScoutGateError::Config(format!("invalid redirect URI {}: {e}", settings.redirect_uri))
        })?;

        let config = OAuthConfig::new(
            settings.issuer.clone(),
            settings.client_id.clone(),
            settings.redirect_uri.clone(),
            settings.scopes.clone(),
        );

        Ok(Self {
            client: OidcClient::with_http_client(config, http.inner().clone()),
            coordinator: RedirectCoordinator::new(redirect_uri),
            redirect_timeout,
        })
    }

    pub fn coordinator(&self) -> RedirectCoordinator {
        self.coordinator.clone()
    }

    pub const fn redirect_timeout(&self) -> Duration {
        self.redirect_timeout
    }
}

#[async_trait]
impl IdentityProvider for HitobitoIdentityProvider {
    async fn discover_issuer(&self) -> Result<IssuerConfiguration> {
        let issuer = self.client.discover().await.map_err(map_oauth_error)?;
        debug!(authorization_endpoint = %issuer.authorization_endpoint, "issuer discovered");
        Ok(issuer)
    }

    async fn start_authorization_redirect(
        &self,
        issuer: &IssuerConfiguration,
        presentation: &dyn PresentationContext,
    ) -> Result<AuthorizationResponse> {
        if !presentation.is_available() {
            return Err(AuthError::RedirectUnavailable(
                "no presentation surface is available".to_string(),
            )
            .into());
        }

        let request = self.client.authorization_request(issuer).map_err(map_oauth_error)?;
        // Registered before launch so a fast callback cannot race the waiter
        let waiter = self.coordinator.begin(request.state()).map_err(map_redirect_error)?;

        info!(
            redirect_uri = %self.coordinator.redirect_uri(),
            timeout_secs = self.redirect_timeout.as_secs(),
            "presenting authorization page"
        );
        presentation.present(request.url()).await?;

        let callback = waiter.wait(Some(self.redirect_timeout)).await.map_err(map_redirect_error)?;
        debug!("authorization callback accepted");
        Ok(request.into_response(callback.code))
    }

    fn resume_redirect(&self, url: &str) -> bool {
        self.coordinator.resume(url)
    }

    fn cancel_redirect(&self) -> bool {
        self.coordinator.cancel()
    }

    async fn redeem_code(
        &self,
        issuer: &IssuerConfiguration,
        authorization: &AuthorizationResponse,
    ) -> Result<TokenResponse> {
        self.client.redeem_code(issuer, authorization).await.map_err(map_oauth_error)
    }
}
