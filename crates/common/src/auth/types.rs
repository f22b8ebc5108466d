//! OAuth 2.0 / OIDC types and structures
//!
//! Configuration of the OAuth application, discovered issuer metadata, token
//! endpoint responses, and the short-lived values exchanged during one
//! authorization-code flow.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::security::SecretString;

/// Path appended to the issuer URL for OIDC discovery
pub const DISCOVERY_PATH: &str = "/.well-known/openid-configuration";

/// OAuth application configuration
///
/// Immutable, loaded once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthConfig {
    /// Issuer base URL (e.g., `https://db.scout.ch`)
    pub issuer: String,

    /// OAuth client ID registered with the provider
    pub client_id: String,

    /// Redirect URI (custom scheme deep link for mobile, loopback for desktop)
    pub redirect_uri: String,

    /// Scopes to request
    pub scopes: Vec<String>,
}

impl OAuthConfig {
    /// Create a new OAuth configuration
    #[must_use]
    pub fn new(
        issuer: impl Into<String>,
        client_id: impl Into<String>,
        redirect_uri: impl Into<String>,
        scopes: Vec<String>,
    ) -> Self {
        Self {
            issuer: issuer.into(),
            client_id: client_id.into(),
            redirect_uri: redirect_uri.into(),
            scopes,
        }
    }

    /// Well-known discovery document URL for the issuer
    #[must_use]
    pub fn discovery_url(&self) -> String {
        format!("{}{}", self.issuer.trim_end_matches('/'), DISCOVERY_PATH)
    }

    /// Get scopes as space-separated string
    #[must_use]
    pub fn scope_string(&self) -> String {
        self.scopes.join(" ")
    }
}

/// Discovered OIDC issuer metadata
///
/// Fetched per login attempt. Only the endpoints are required; the capability
/// lists default to empty, meaning "not advertised".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerConfiguration {
    #[serde(default)]
    pub issuer: Option<String>,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    #[serde(default)]
    pub userinfo_endpoint: Option<String>,
    #[serde(default)]
    pub response_types_supported: Vec<String>,
    #[serde(default)]
    pub grant_types_supported: Vec<String>,
    #[serde(default)]
    pub code_challenge_methods_supported: Vec<String>,
}

impl IssuerConfiguration {
    /// Whether the issuer permits the authorization-code grant
    ///
    /// An absent `grant_types_supported` defaults to
    /// `["authorization_code", "implicit"]` (RFC 8414 §2).
    #[must_use]
    pub fn supports_authorization_code(&self) -> bool {
        self.grant_types_supported.is_empty()
            || self.grant_types_supported.iter().any(|g| g == "authorization_code")
    }

    /// Whether the issuer accepts S256 PKCE challenges
    ///
    /// Providers that do not advertise challenge methods are assumed to
    /// accept S256.
    #[must_use]
    pub fn supports_pkce_s256(&self) -> bool {
        self.code_challenge_methods_supported.is_empty()
            || self.code_challenge_methods_supported.iter().any(|m| m == "S256")
    }
}

/// Token endpoint response (RFC 6749 §5.1)
///
/// `access_token` is optional at the type level so that a response lacking it
/// is reported as a domain error instead of a decode failure.
#[derive(Clone, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<SecretString>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub refresh_token: Option<SecretString>,
    #[serde(default)]
    pub id_token: Option<SecretString>,
    #[serde(default)]
    pub scope: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &self.access_token.as_ref().map(|_| "***"))
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "***"))
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

/// OAuth error response from authorization server (RFC 6749 §5.2)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OAuthErrorResponse {
    pub error: String,
    pub error_description: Option<String>,
}

impl fmt::Display for OAuthErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error_description {
            Some(desc) => write!(f, "{}: {}", self.error, desc),
            None => write!(f, "{}", self.error),
        }
    }
}

impl std::error::Error for OAuthErrorResponse {}

/// Code and state delivered back through the redirect URI
#[derive(Clone, PartialEq, Eq)]
pub struct AuthorizationCallback {
    pub code: SecretString,
    pub state: String,
}

impl fmt::Debug for AuthorizationCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizationCallback")
            .field("code", &"***")
            .field("state", &self.state)
            .finish()
    }
}

/// Result of one interactive redirect
///
/// Binds the authorization code to the PKCE verifier generated for the same
/// attempt. Discarded after redemption.
#[derive(Clone)]
pub struct AuthorizationResponse {
    pub code: SecretString,
    pub code_verifier: SecretString,
    pub redirect_uri: String,
}

impl fmt::Debug for AuthorizationResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizationResponse")
            .field("code", &"***")
            .field("code_verifier", &"***")
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}
