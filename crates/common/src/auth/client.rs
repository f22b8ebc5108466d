//! OAuth 2.0 / OIDC client implementation with PKCE support
//!
//! Handles the provider-facing half of the authorization-code flow:
//! - Issuer discovery via the well-known document
//! - Authorization URL building (PKCE S256 + CSRF state)
//! - Authorization code redemption
//!
//! The interactive half (presenting the URL and receiving the callback) lives
//! in [`super::redirect`].

use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use super::pkce::PkceChallenge;
use super::types::{
    AuthorizationResponse, IssuerConfiguration, OAuthConfig, OAuthErrorResponse, TokenResponse,
};
use crate::error::{ErrorClassification, ErrorSeverity};
use crate::security::SecretString;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const JSON: &str = "application/json";

/// Error type for OAuth client operations
#[derive(Debug, Error)]
pub enum OAuthClientError {
    /// Transport-level failure (DNS, TLS, connect, timeout)
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Non-success status without a parseable OAuth error body
    #[error("unexpected HTTP status {status} from {endpoint}")]
    HttpStatus { endpoint: String, status: u16 },

    /// OAuth server returned an error response
    #[error("OAuth error: {0}")]
    Provider(OAuthErrorResponse),

    /// Failed to parse response body
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Endpoint from configuration or discovery is not a valid URL
    #[error("invalid endpoint URL {url}: {reason}")]
    InvalidEndpoint { url: String, reason: String },

    /// Issuer does not advertise a capability the flow depends on
    #[error("issuer does not support {0}")]
    UnsupportedFlow(&'static str),
}

impl OAuthClientError {
    /// Whether the failure happened at the transport or HTTP layer
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::RequestFailed(_) | Self::HttpStatus { .. })
    }
}

impl ErrorClassification for OAuthClientError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::RequestFailed(_) => true,
            Self::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::RequestFailed(_) | Self::HttpStatus { .. } => ErrorSeverity::Warning,
            Self::Provider(_) | Self::ParseError(_) => ErrorSeverity::Error,
            Self::InvalidEndpoint { .. } | Self::UnsupportedFlow(_) => ErrorSeverity::Critical,
        }
    }
}

/// Authorization request prepared for one redirect
///
/// Holds the PKCE verifier until the callback arrives. Dropping the request
/// discards the verifier.
#[derive(Debug)]
pub struct AuthorizationRequest {
    url: Url,
    state: String,
    code_verifier: SecretString,
    redirect_uri: String,
}

impl AuthorizationRequest {
    /// URL to present in the external user agent
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// CSRF state embedded in the URL
    #[must_use]
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Bind the returned authorization code to this request's verifier
    #[must_use]
    pub fn into_response(self, code: SecretString) -> AuthorizationResponse {
        AuthorizationResponse {
            code,
            code_verifier: self.code_verifier,
            redirect_uri: self.redirect_uri,
        }
    }
}

/// OIDC client for public (secret-less) applications
///
/// Implements RFC 6749 (OAuth 2.0), RFC 7636 (PKCE) and OIDC discovery.
#[derive(Debug, Clone)]
pub struct OidcClient {
    config: OAuthConfig,
    http: Client,
}

impl OidcClient {
    /// Create a client with its own HTTP connection pool
    ///
    /// # Errors
    /// Returns error if the TLS backend cannot be initialised
    pub fn new(config: OAuthConfig) -> Result<Self, OAuthClientError> {
        let http = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self::with_http_client(config, http))
    }

    /// Create a client sharing an existing reqwest client
    #[must_use]
    pub const fn with_http_client(config: OAuthConfig, http: Client) -> Self {
        Self { config, http }
    }

    /// Get a reference to the OAuth configuration
    #[must_use]
    pub const fn config(&self) -> &OAuthConfig {
        &self.config
    }

    /// Get the configured redirect URI
    #[must_use]
    pub fn redirect_uri(&self) -> &str {
        &self.config.redirect_uri
    }

    /// Fetch and parse the issuer's well-known metadata
    ///
    /// Never cached: every login attempt re-discovers so that endpoint
    /// rotation on the provider side is picked up.
    ///
    /// # Errors
    /// Transport failures, non-success status, malformed document, or
    /// endpoints that are not valid URLs.
    pub async fn discover(&self) -> Result<IssuerConfiguration, OAuthClientError> {
        let url = self.config.discovery_url();
        debug!(%url, "fetching OIDC discovery document");

        let response = self.http.get(&url).header(ACCEPT, JSON).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(OAuthClientError::HttpStatus { endpoint: url, status: status.as_u16() });
        }

        let body = response.bytes().await?;
        let issuer: IssuerConfiguration = serde_json::from_slice(&body)
            .map_err(|e| OAuthClientError::ParseError(format!("discovery document: {e}")))?;

        parse_endpoint(&issuer.authorization_endpoint)?;
        parse_endpoint(&issuer.token_endpoint)?;

        info!(
            authorization_endpoint = %issuer.authorization_endpoint,
            token_endpoint = %issuer.token_endpoint,
            "Discovered issuer configuration"
        );

        Ok(issuer)
    }

    /// Build the authorization URL for a fresh PKCE challenge
    ///
    /// # Errors
    /// Returns error if the issuer lacks the authorization-code grant or S256
    /// PKCE, or if its authorization endpoint is not a valid URL.
    pub fn authorization_request(
        &self,
        issuer: &IssuerConfiguration,
    ) -> Result<AuthorizationRequest, OAuthClientError> {
        if !issuer.supports_authorization_code() {
            return Err(OAuthClientError::UnsupportedFlow("the authorization_code grant"));
        }
        if !issuer.supports_pkce_s256() {
            return Err(OAuthClientError::UnsupportedFlow("S256 PKCE challenges"));
        }

        let challenge = PkceChallenge::generate();
        let mut url = parse_endpoint(&issuer.authorization_endpoint)?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("scope", &self.config.scope_string())
            .append_pair("state", &challenge.state)
            .append_pair("code_challenge", &challenge.code_challenge)
            .append_pair("code_challenge_method", challenge.challenge_method());

        Ok(AuthorizationRequest {
            url,
            state: challenge.state,
            code_verifier: challenge.code_verifier,
            redirect_uri: self.config.redirect_uri.clone(),
        })
    }

    /// Exchange an authorization code for tokens (single round trip)
    ///
    /// # Errors
    /// Transport failures, OAuth error responses, or malformed token bodies.
    pub async fn redeem_code(
        &self,
        issuer: &IssuerConfiguration,
        authorization: &AuthorizationResponse,
    ) -> Result<TokenResponse, OAuthClientError> {
        let form = [
            ("grant_type", "authorization_code"),
            ("code", authorization.code.expose()),
            ("code_verifier", authorization.code_verifier.expose()),
            ("redirect_uri", authorization.redirect_uri.as_str()),
            ("client_id", self.config.client_id.as_str()),
        ];

        debug!(endpoint = %issuer.token_endpoint, "redeeming authorization code");
        let response =
            self.http.post(&issuer.token_endpoint).header(ACCEPT, JSON).form(&form).send().await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(error_from_body(&issuer.token_endpoint, status, &body));
        }

        serde_json::from_slice(&body)
            .map_err(|e| OAuthClientError::ParseError(format!("token response: {e}")))
    }
}

fn parse_endpoint(raw: &str) -> Result<Url, OAuthClientError> {
    Url::parse(raw).map_err(|e| OAuthClientError::InvalidEndpoint {
        url: raw.to_string(),
        reason: e.to_string(),
    })
}

fn error_from_body(endpoint: &str, status: StatusCode, body: &[u8]) -> OAuthClientError {
    serde_json::from_slice::<OAuthErrorResponse>(body).map_or_else(
        |_| OAuthClientError::HttpStatus { endpoint: endpoint.to_string(), status: status.as_u16() },
        OAuthClientError::Provider,
    )
}

#[cfg(test)]
mod tests {
    //! Unit tests for auth::client.
    use std::collections::HashMap;

    use super::*;

    fn create_test_config() -> OAuthConfig {
        OAuthConfig::new(
            "https://db.scout.example",
            "test_client_id",
            "scoutgate://oauth/callback",
            vec!["openid".to_string(), "name".to_string(), "with_roles".to_string()],
        )
    }

    fn create_issuer() -> IssuerConfiguration {
        IssuerConfiguration {
            issuer: Some("https://db.scout.example".to_string()),
            authorization_endpoint: "https://db.scout.example/oauth/authorize".to_string(),
            token_endpoint: "https://db.scout.example/oauth/token".to_string(),
            userinfo_endpoint: Some("https://db.scout.example/oauth/userinfo".to_string()),
            response_types_supported: vec!["code".to_string()],
            grant_types_supported: vec!["authorization_code".to_string()],
            code_challenge_methods_supported: vec!["S256".to_string()],
        }
    }

    #[test]
    fn test_authorization_request_parameters() {
        let client = OidcClient::new(create_test_config()).unwrap();
        let request = client.authorization_request(&create_issuer()).unwrap();

        let url = request.url();
        assert!(url.as_str().starts_with("https://db.scout.example/oauth/authorize?"));

        let params: HashMap<String, String> = url.query_pairs().into_owned().collect();
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["client_id"], "test_client_id");
        assert_eq!(params["redirect_uri"], "scoutgate://oauth/callback");
        assert_eq!(params["scope"], "openid name with_roles");
        assert_eq!(params["code_challenge_method"], "S256");
        assert_eq!(params["state"], request.state());
        assert!(!params["code_challenge"].is_empty());
    }

    #[test]
    fn test_authorization_request_binds_verifier() {
        let client = OidcClient::new(create_test_config()).unwrap();
        let request = client.authorization_request(&create_issuer()).unwrap();

        let params: HashMap<String, String> = request.url().query_pairs().into_owned().collect();
        let challenge = params["code_challenge"].clone();

        let response = request.into_response(SecretString::new("code-123"));
        assert_eq!(super::super::pkce::code_challenge(response.code_verifier.expose()), challenge);
        assert_eq!(response.code.expose(), "code-123");
        assert_eq!(response.redirect_uri, "scoutgate://oauth/callback");
    }

    #[test]
    fn test_authorization_request_rejects_unsupported_issuer() {
        let client = OidcClient::new(create_test_config()).unwrap();

        let mut no_code_grant = create_issuer();
        no_code_grant.grant_types_supported = vec!["client_credentials".to_string()];
        assert!(matches!(
            client.authorization_request(&no_code_grant),
            Err(OAuthClientError::UnsupportedFlow(_))
        ));

        let mut plain_only = create_issuer();
        plain_only.code_challenge_methods_supported = vec!["plain".to_string()];
        assert!(matches!(
            client.authorization_request(&plain_only),
            Err(OAuthClientError::UnsupportedFlow(_))
        ));
    }

    #[test]
    fn test_invalid_authorization_endpoint() {
        let client = OidcClient::new(create_test_config()).unwrap();
        let mut issuer = create_issuer();
        issuer.authorization_endpoint = "not a url".to_string();

        assert!(matches!(
            client.authorization_request(&issuer),
            Err(OAuthClientError::InvalidEndpoint { .. })
        ));
    }

    #[test]
    fn test_error_classification() {
        let status = OAuthClientError::HttpStatus { endpoint: "x".to_string(), status: 503 };
        assert!(status.is_retryable());
        assert!(status.is_transport());

        let provider = OAuthClientError::Provider(OAuthErrorResponse {
            error: "invalid_grant".to_string(),
            error_description: None,
        });
        assert!(!provider.is_retryable());
        assert!(!provider.is_transport());
        assert_eq!(provider.severity(), ErrorSeverity::Error);
    }
}
