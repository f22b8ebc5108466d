use std::path::{Path, PathBuf};
use std::time::Duration;

use scoutgate_domain::{AuthError, ScoutGateError};
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter used when `RUST_LOG` is unset or invalid
pub const DEFAULT_LOG_FILTER: &str = "info,scoutgate=debug";

/// Install the global tracing subscriber.
///
/// Honors `RUST_LOG`; `json` switches the formatter to one JSON object per
/// line. A second call is a no-op, so tests may call it freely.
pub fn init_tracing(json: bool) {
    let _ = tracing_subscriber::registry()
        .with(log_filter())
        .with(json.then(|| fmt::layer().json()))
        .with((!json).then(fmt::layer))
        .try_init();
}

/// Load `.env` (or `env_file`) into the environment, then install tracing.
///
/// The load result is returned rather than logged so the caller can report it
/// through the subscriber it just configured.
pub fn init_tracing_with_env(
    json: bool,
    env_file: Option<&Path>,
) -> Result<PathBuf, dotenvy::Error> {
    let loaded = match env_file {
        Some(path) => dotenvy::from_path(path).map(|()| path.to_path_buf()),
        None => dotenvy::dotenv(),
    };
    init_tracing(json);
    loaded
}

fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Log the outcome of a command execution with structured fields.
///
/// Callers must avoid forwarding sensitive values in `command`.
#[inline]
pub fn log_command_execution(command: &str, elapsed: Duration, outcome: Result<(), &str>) {
    let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

    match outcome {
        Ok(()) => info!(command, duration_ms, "command_execution_success"),
        Err(error_type) => {
            warn!(command, duration_ms, error_type, "command_execution_failure");
        }
    }
}

/// Convert a `ScoutGateError` into a stable label suitable for logging.
#[inline]
pub fn error_label(error: &ScoutGateError) -> &'static str {
    match error {
        ScoutGateError::Network(_) => "network",
        ScoutGateError::Decode(_) => "decode",
        ScoutGateError::Config(_) => "config",
        ScoutGateError::Storage(_) => "storage",
        ScoutGateError::Internal(_) => "internal",
        ScoutGateError::Auth(auth) => match auth {
            AuthError::RedirectUnavailable(_) => "auth.redirect_unavailable",
            AuthError::Cancelled => "auth.cancelled",
            AuthError::RedirectTimedOut(_) => "auth.timed_out",
            AuthError::NoAccessToken => "auth.no_access_token",
            AuthError::NotAuthorized(_) => "auth.not_authorized",
            AuthError::SubjectMismatch => "auth.subject_mismatch",
            AuthError::EmptyToken => "auth.empty_token",
            AuthError::Session(_) => "auth.session",
            AuthError::Provider(_) => "auth.provider",
            AuthError::StateMismatch => "auth.state_mismatch",
            AuthError::LoginInProgress => "auth.login_in_progress",
        },
    }
}
