//! OAuth 2.0 / OIDC authorization-code flow with PKCE
//!
//! Provider-agnostic building blocks for a public client (no client secret):
//!
//! ```text
//! ┌──────────────────┐
//! │    OidcClient    │  discovery, authorization URL, code redemption
//! └────────┬─────────┘
//!          │
//!          ├──► PKCE utilities       (verifier, S256 challenge, state)
//!          │
//!          └──► RedirectCoordinator  (suspend until the redirect callback)
//! ```
//!
//! # Usage Example
//!
//! ```no_run
//! use scoutgate_common::auth::{OAuthConfig, OidcClient, RedirectCoordinator};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = OAuthConfig::new(
//!     "https://db.scout.ch",
//!     "client-id",
//!     "scoutgate://oauth/callback",
//!     vec!["openid".to_string(), "with_roles".to_string()],
//! );
//! let client = OidcClient::new(config)?;
//! let coordinator = RedirectCoordinator::new(url::Url::parse(client.redirect_uri())?);
//!
//! let issuer = client.discover().await?;
//! let request = client.authorization_request(&issuer)?;
//! let waiter = coordinator.begin(request.state())?;
//! // open request.url() in the system browser, then:
//! let callback = waiter.wait(None).await?;
//! let tokens = client.redeem_code(&issuer, &request.into_response(callback.code)).await?;
//! # let _ = tokens;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod pkce;
pub mod redirect;
pub mod types;

pub use client::{AuthorizationRequest, OAuthClientError, OidcClient};
pub use pkce::{code_challenge, generate_code_verifier, generate_state, validate_state, PkceChallenge};
pub use redirect::{RedirectCoordinator, RedirectError, RedirectWaiter};
pub use types::{
    AuthorizationCallback, AuthorizationResponse, IssuerConfiguration, OAuthConfig,
    OAuthErrorResponse, TokenResponse, DISCOVERY_PATH,
};
