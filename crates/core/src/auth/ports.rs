//! Port interfaces for the login pipeline
//!
//! These traits define the boundaries between the login orchestration and
//! the identity provider, trusted backend and session infrastructure.

use async_trait::async_trait;
use scoutgate_common::auth::{AuthorizationResponse, IssuerConfiguration, TokenResponse};
use scoutgate_common::SecretString;
use scoutgate_domain::{CustomAuthToken, ProviderAccessToken, Result, Session, UserInfo};
use url::Url;

/// Foreground surface able to show the authorization page
///
/// Mobile builds present a web-authentication sheet anchored to the key
/// window; desktop builds open the system browser.
#[async_trait]
pub trait PresentationContext: Send + Sync {
    /// Whether a foreground surface can be resolved right now
    fn is_available(&self) -> bool;

    /// Present the authorization URL to the user
    async fn present(&self, url: &Url) -> Result<()>;
}

/// OIDC identity provider client
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Fetch the issuer's well-known configuration (never cached)
    async fn discover_issuer(&self) -> Result<IssuerConfiguration>;

    /// Launch the interactive code + PKCE redirect and wait for its callback
    ///
    /// Fails immediately with `AuthError::RedirectUnavailable` if
    /// `presentation` has no surface.
    async fn start_authorization_redirect(
        &self,
        issuer: &IssuerConfiguration,
        presentation: &dyn PresentationContext,
    ) -> Result<AuthorizationResponse>;

    /// Deliver a callback URL to the in-flight redirect
    ///
    /// Returns `false` (no-op) when nothing is in flight or the URL does not
    /// belong to this provider.
    fn resume_redirect(&self, url: &str) -> bool;

    /// Resolve the in-flight redirect as cancelled
    fn cancel_redirect(&self) -> bool;

    /// Exchange the authorization code for tokens
    async fn redeem_code(
        &self,
        issuer: &IssuerConfiguration,
        authorization: &AuthorizationResponse,
    ) -> Result<TokenResponse>;
}

/// Provider user-info endpoint
#[async_trait]
pub trait UserInfoSource: Send + Sync {
    /// One authenticated GET; fails only on transport errors or a missing
    /// subject id
    async fn fetch_user_info(
        &self,
        issuer: &IssuerConfiguration,
        access_token: &ProviderAccessToken,
    ) -> Result<UserInfo>;
}

/// Unvalidated response of the trusted token-exchange backend
#[derive(Debug, Clone)]
pub struct MintedToken {
    /// Subject id echoed by the backend
    pub user_id: String,
    pub token: SecretString,
}

/// Trusted backend that mints custom authentication tokens
#[async_trait]
pub trait CustomTokenBackend: Send + Sync {
    async fn mint_custom_token(
        &self,
        subject_id: &str,
        access_token: &ProviderAccessToken,
    ) -> Result<MintedToken>;
}

/// Second-party identity system
#[async_trait]
pub trait SessionBackend: Send + Sync {
    /// Sign in with a custom token, yielding a new session
    async fn sign_in_with_custom_token(&self, token: &CustomAuthToken) -> Result<Session>;

    /// Delete the remote account behind `session`
    async fn delete_account(&self, session: &Session) -> Result<()>;
}

/// Persistence of the current session handle
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self) -> Result<Option<Session>>;

    async fn save(&self, session: &Session) -> Result<()>;

    /// Remove any persisted session; succeeds when nothing is stored
    async fn clear(&self) -> Result<()>;
}
