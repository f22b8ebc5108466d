//! Application configuration structures
//!
//! Loaded once at startup by the infra config loader (environment first,
//! then config files) and validated before any service is constructed.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::constants::{
    DEFAULT_EXCHANGE_FUNCTION, DEFAULT_FIRESTORE_URL, DEFAULT_FUNCTIONS_REGION,
    DEFAULT_HTTP_MAX_ATTEMPTS, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_IDENTITY_TOOLKIT_URL,
    DEFAULT_ISSUER, DEFAULT_KEYRING_SERVICE, DEFAULT_REDIRECT_TIMEOUT_SECS, DEFAULT_REDIRECT_URI,
    DEFAULT_REQUIRED_GROUP_ID, DEFAULT_SCOPES,
};
use crate::errors::{Result, ScoutGateError};
use crate::impl_domain_label_conversions;

/// Root configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub oauth: OAuthSettings,
    pub backend: BackendConfig,
    #[serde(default)]
    pub authorization: AuthorizationConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

/// Identity provider application registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthSettings {
    #[serde(default = "default_issuer")]
    pub issuer: String,
    pub client_id: String,
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
}

/// Trusted backend and second-party identity system endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Firebase project id
    pub project_id: String,
    /// Web API key for the Identity Toolkit REST API
    pub api_key: String,
    #[serde(default = "default_functions_region")]
    pub functions_region: String,
    /// Overrides `https://{region}-{project}.cloudfunctions.net` (emulators, tests)
    #[serde(default)]
    pub functions_base_url: Option<String>,
    #[serde(default = "default_exchange_function")]
    pub exchange_function: String,
    #[serde(default = "default_identity_toolkit_url")]
    pub identity_toolkit_url: String,
    #[serde(default = "default_firestore_url")]
    pub firestore_url: String,
}

impl BackendConfig {
    /// Base URL of the callable functions
    #[must_use]
    pub fn functions_url(&self) -> String {
        self.functions_base_url.as_deref().map_or_else(
            || format!("https://{}-{}.cloudfunctions.net", self.functions_region, self.project_id),
            |base| base.trim_end_matches('/').to_string(),
        )
    }

    /// Full URL of the token-exchange callable
    #[must_use]
    pub fn exchange_url(&self) -> String {
        format!("{}/{}", self.functions_url(), self.exchange_function)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationConfig {
    #[serde(default = "default_required_group_id")]
    pub required_group_id: i64,
}

impl Default for AuthorizationConfig {
    fn default() -> Self {
        Self { required_group_id: DEFAULT_REQUIRED_GROUP_ID }
    }
}

/// Where the session handle is persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStoreKind {
    #[default]
    Keyring,
    Memory,
}

impl_domain_label_conversions!(SessionStoreKind {
    Keyring => "keyring",
    Memory => "memory",
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub store: SessionStoreKind,
    #[serde(default = "default_keyring_service")]
    pub keyring_service: String,
    #[serde(default = "default_redirect_timeout")]
    pub redirect_timeout_seconds: u64,
    /// Write the initial user profile after login
    #[serde(default = "default_true")]
    pub provision_profile: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            store: SessionStoreKind::default(),
            keyring_service: default_keyring_service(),
            redirect_timeout_seconds: DEFAULT_REDIRECT_TIMEOUT_SECS,
            provision_profile: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_http_timeout")]
    pub timeout_seconds: u64,
    /// Transport attempts per request; 1 disables retries
    #[serde(default = "default_http_max_attempts")]
    pub max_attempts: u32,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_seconds: DEFAULT_HTTP_TIMEOUT_SECS, max_attempts: DEFAULT_HTTP_MAX_ATTEMPTS }
    }
}

impl AppConfig {
    /// Check the configuration before wiring services
    ///
    /// # Errors
    /// Returns `ScoutGateError::Config` describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        parse_url("oauth.issuer", &self.oauth.issuer)?;
        parse_url("oauth.redirect_uri", &self.oauth.redirect_uri)?;
        require("oauth.client_id", &self.oauth.client_id)?;
        if !self.oauth.scopes.iter().any(|s| s == "openid") {
            return Err(ScoutGateError::Config("oauth.scopes must include openid".to_string()));
        }

        require("backend.project_id", &self.backend.project_id)?;
        require("backend.api_key", &self.backend.api_key)?;
        require("backend.exchange_function", &self.backend.exchange_function)?;
        parse_url("backend.functions_url", &self.backend.functions_url())?;
        parse_url("backend.identity_toolkit_url", &self.backend.identity_toolkit_url)?;
        parse_url("backend.firestore_url", &self.backend.firestore_url)?;

        if self.authorization.required_group_id <= 0 {
            return Err(ScoutGateError::Config(
                "authorization.required_group_id must be positive".to_string(),
            ));
        }
        if self.session.redirect_timeout_seconds == 0 {
            return Err(ScoutGateError::Config(
                "session.redirect_timeout_seconds must be positive".to_string(),
            ));
        }
        if self.http.max_attempts == 0 {
            return Err(ScoutGateError::Config("http.max_attempts must be at least 1".to_string()));
        }
        Ok(())
    }
}

fn parse_url(field: &str, value: &str) -> Result<Url> {
    Url::parse(value).map_err(|e| ScoutGateError::Config(format!("{field} is not a valid URL: {e}")))
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ScoutGateError::Config(format!("{field} must not be empty")));
    }
    Ok(())
}

fn default_issuer() -> String {
    DEFAULT_ISSUER.to_string()
}

fn default_redirect_uri() -> String {
    DEFAULT_REDIRECT_URI.to_string()
}

fn default_scopes() -> Vec<String> {
    DEFAULT_SCOPES.iter().map(|s| (*s).to_string()).collect()
}

fn default_functions_region() -> String {
    DEFAULT_FUNCTIONS_REGION.to_string()
}

fn default_exchange_function() -> String {
    DEFAULT_EXCHANGE_FUNCTION.to_string()
}

fn default_identity_toolkit_url() -> String {
    DEFAULT_IDENTITY_TOOLKIT_URL.to_string()
}

fn default_firestore_url() -> String {
    DEFAULT_FIRESTORE_URL.to_string()
}

const fn default_required_group_id() -> i64 {
    DEFAULT_REQUIRED_GROUP_ID
}

fn default_keyring_service() -> String {
    DEFAULT_KEYRING_SERVICE.to_string()
}

const fn default_redirect_timeout() -> u64 {
    DEFAULT_REDIRECT_TIMEOUT_SECS
}

const fn default_true() -> bool {
    true
}

const fn default_http_timeout() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}

const fn default_http_max_attempts() -> u32 {
    DEFAULT_HTTP_MAX_ATTEMPTS
}
