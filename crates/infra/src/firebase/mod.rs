//! Firebase adapters
//!
//! - [`CallableTokenExchange`]: the trusted callable function that mints a
//!   custom token for a verified Hitobito member
//! - [`FirebaseAuthBackend`]: Identity Toolkit REST sign-in and account deletion
//! - [`FirestoreProfileProvisioner`]: initial `users/{uid}` document

mod auth;
mod firestore;
mod functions;

pub use auth::{uid_from_id_token, FirebaseAuthBackend};
pub use firestore::FirestoreProfileProvisioner;
pub use functions::CallableTokenExchange;

use reqwest::StatusCode;
use scoutgate_domain::{AuthError, ScoutGateError};
use serde::Deserialize;

/// Google API error envelope: `{"error": {"code", "message", "status"}}`
#[derive(Debug, Deserialize)]
struct GoogleErrorEnvelope {
    error: GoogleError,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

impl GoogleError {
    fn describe(&self) -> String {
        match (&self.status, self.message.is_empty()) {
            (Some(status), true) => status.clone(),
            (Some(status), false) => format!("{status}: {}", self.message),
            (None, _) => self.message.clone(),
        }
    }
}

fn parse_google_error(body: &[u8]) -> Option<GoogleError> {
    serde_json::from_slice::<GoogleErrorEnvelope>(body).ok().map(|envelope| envelope.error)
}

/// Map a non-success Google API response: 5xx and 429 are transport-level,
/// everything else is reported through `reject`.
fn classify_failure(
    service: &str,
    status: StatusCode,
    body: &[u8],
    reject: impl FnOnce(String) -> AuthError,
) -> ScoutGateError {
    let detail = parse_google_error(body)
        .map(|e| e.describe())
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));

    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        ScoutGateError::Network(format!("{service} unavailable: {detail}"))
    } else {
        reject(detail).into()
    }
}
