//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If a required variable is missing, falls back to loading from file
//! 3. Probes multiple paths for config files (or `SCOUTGATE_CONFIG`)
//! 4. Supports JSON and TOML formats
//!
//! The loaded configuration is always validated before it is returned.
//!
//! ## Environment Variables
//! Required:
//! - `SCOUTGATE_OAUTH_CLIENT_ID`: Hitobito OAuth application id
//! - `SCOUTGATE_FIREBASE_PROJECT_ID`: Firebase project id
//! - `SCOUTGATE_FIREBASE_API_KEY`: Firebase web API key
//!
//! Optional (defaults in `scoutgate_domain::constants`):
//! - `SCOUTGATE_OAUTH_ISSUER`, `SCOUTGATE_OAUTH_REDIRECT_URI`
//! - `SCOUTGATE_OAUTH_SCOPES`: space or comma separated
//! - `SCOUTGATE_FUNCTIONS_REGION`, `SCOUTGATE_FUNCTIONS_BASE_URL`,
//!   `SCOUTGATE_EXCHANGE_FUNCTION`
//! - `SCOUTGATE_IDENTITY_TOOLKIT_URL`, `SCOUTGATE_FIRESTORE_URL`
//! - `SCOUTGATE_REQUIRED_GROUP_ID`
//! - `SCOUTGATE_SESSION_STORE` (`keyring`/`memory`), `SCOUTGATE_KEYRING_SERVICE`
//! - `SCOUTGATE_REDIRECT_TIMEOUT`: seconds
//! - `SCOUTGATE_PROVISION_PROFILE`: true/false
//! - `SCOUTGATE_HTTP_TIMEOUT`: seconds, `SCOUTGATE_HTTP_MAX_ATTEMPTS`
//!
//! ## File Locations
//! `SCOUTGATE_CONFIG` wins if set. Otherwise the loader probes (in order):
//! 1. `./config.{json,toml}` and `./scoutgate.{json,toml}`
//! 2. Parent directories (up to 2 levels)
//! 3. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use scoutgate_domain::constants::{
    DEFAULT_EXCHANGE_FUNCTION, DEFAULT_FIRESTORE_URL, DEFAULT_FUNCTIONS_REGION,
    DEFAULT_IDENTITY_TOOLKIT_URL, DEFAULT_ISSUER, DEFAULT_KEYRING_SERVICE, DEFAULT_REDIRECT_URI,
    DEFAULT_SCOPES,
};
use scoutgate_domain::{
    AppConfig, AuthorizationConfig, BackendConfig, HttpConfig, OAuthSettings, Result,
    ScoutGateError, SessionConfig, SessionStoreKind,
};

const CONFIG_PATH_VAR: &str = "SCOUTGATE_CONFIG";
const FILE_STEMS: [&str; 2] = ["config", "scoutgate"];
const FILE_EXTENSIONS: [&str; 2] = ["json", "toml"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `ScoutGateError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Validation fails
pub fn load() -> Result<AppConfig> {
    // Try loading from environment first
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Failed to load from environment, trying file");
            let explicit = std::env::var(CONFIG_PATH_VAR).ok().map(PathBuf::from);
            load_from_file(explicit)
        }
    }
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `ScoutGateError::Config` if required variables are missing
/// or have invalid values.
pub fn load_from_env() -> Result<AppConfig> {
    let client_id = env_var("SCOUTGATE_OAUTH_CLIENT_ID")?;
    let project_id = env_var("SCOUTGATE_FIREBASE_PROJECT_ID")?;
    let api_key = env_var("SCOUTGATE_FIREBASE_API_KEY")?;

    let session_defaults = SessionConfig::default();
    let http_defaults = HttpConfig::default();

    let config = AppConfig {
        oauth: OAuthSettings {
            issuer: env_or("SCOUTGATE_OAUTH_ISSUER", DEFAULT_ISSUER),
            client_id,
            redirect_uri: env_or("SCOUTGATE_OAUTH_REDIRECT_URI", DEFAULT_REDIRECT_URI),
            scopes: std::env::var("SCOUTGATE_OAUTH_SCOPES").ok().map_or_else(
                || DEFAULT_SCOPES.iter().map(|s| (*s).to_string()).collect(),
                |raw| split_scopes(&raw),
            ),
        },
        backend: BackendConfig {
            project_id,
            api_key,
            functions_region: env_or("SCOUTGATE_FUNCTIONS_REGION", DEFAULT_FUNCTIONS_REGION),
            functions_base_url: std::env::var("SCOUTGATE_FUNCTIONS_BASE_URL").ok(),
            exchange_function: env_or("SCOUTGATE_EXCHANGE_FUNCTION", DEFAULT_EXCHANGE_FUNCTION),
            identity_toolkit_url: env_or(
                "SCOUTGATE_IDENTITY_TOOLKIT_URL",
                DEFAULT_IDENTITY_TOOLKIT_URL,
            ),
            firestore_url: env_or("SCOUTGATE_FIRESTORE_URL", DEFAULT_FIRESTORE_URL),
        },
        authorization: AuthorizationConfig {
            required_group_id: env_parse(
                "SCOUTGATE_REQUIRED_GROUP_ID",
                AuthorizationConfig::default().required_group_id,
            )?,
        },
        session: SessionConfig {
            store: env_parse("SCOUTGATE_SESSION_STORE", session_defaults.store)?,
            keyring_service: env_or("SCOUTGATE_KEYRING_SERVICE", DEFAULT_KEYRING_SERVICE),
            redirect_timeout_seconds: env_parse(
                "SCOUTGATE_REDIRECT_TIMEOUT",
                session_defaults.redirect_timeout_seconds,
            )?,
            provision_profile: env_bool(
                "SCOUTGATE_PROVISION_PROFILE",
                session_defaults.provision_profile,
            ),
        },
        http: HttpConfig {
            timeout_seconds: env_parse("SCOUTGATE_HTTP_TIMEOUT", http_defaults.timeout_seconds)?,
            max_attempts: env_parse("SCOUTGATE_HTTP_MAX_ATTEMPTS", http_defaults.max_attempts)?,
        },
    };

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `ScoutGateError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid or validation fails
pub fn load_from_file(path: Option<PathBuf>) -> Result<AppConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ScoutGateError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            ScoutGateError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| ScoutGateError::Config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<AppConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| ScoutGateError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| ScoutGateError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(ScoutGateError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches the current working directory, its two parents, and the
/// executable's directory and its two parents. Within each directory
/// `config.*` is preferred over `scoutgate.*` and JSON over TOML.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd);
    }
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.push(exe_dir.to_path_buf());
        }
    }

    roots.iter().flat_map(|root| candidates_in(root)).find(|path| path.exists())
}

fn candidates_in(root: &Path) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    for dir in [root.to_path_buf(), root.join(".."), root.join("../..")] {
        for stem in FILE_STEMS {
            for ext in FILE_EXTENSIONS {
                candidates.push(dir.join(format!("{stem}.{ext}")));
            }
        }
    }
    candidates
}

/// Get required environment variable
///
/// # Errors
/// Returns `ScoutGateError::Config` if the variable is not set or blank.
fn env_var(key: &str) -> Result<String> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ScoutGateError::Config(format!("Missing required environment variable: {key}"))),
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an optional environment variable, falling back to `default`
fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ScoutGateError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(default),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

fn split_scopes(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
