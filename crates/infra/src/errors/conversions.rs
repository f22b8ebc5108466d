//! Conversions from external infrastructure errors into domain errors.

use keyring::Error as KeyringError;
use reqwest::Error as HttpError;
use scoutgate_common::auth::{OAuthClientError, RedirectError};
use scoutgate_domain::{AuthError, ScoutGateError};
use thiserror::Error;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct InfraError(#[from] pub ScoutGateError);

impl From<InfraError> for ScoutGateError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoScoutGateError {
    fn into_scoutgate(self) -> ScoutGateError;
}

/* -------------------------------------------------------------------------- */
/* keyring::Error → ScoutGateError */
/* -------------------------------------------------------------------------- */

impl IntoScoutGateError for KeyringError {
    fn into_scoutgate(self) -> ScoutGateError {
        use KeyringError::*;

        let description = self.to_string();

        match self {
            NoEntry => ScoutGateError::Storage("keychain entry not found".into()),
            BadEncoding(_) => {
                ScoutGateError::Storage("credential in keychain is not valid UTF-8".into())
            }
            TooLong(name, limit) => ScoutGateError::Storage(format!(
                "keychain attribute '{name}' exceeds platform limit ({limit})"
            )),
            Invalid(attr, reason) => {
                ScoutGateError::Config(format!("keychain attribute '{attr}' is invalid: {reason}"))
            }
            Ambiguous(entries) => ScoutGateError::Storage(format!(
                "multiple keychain entries matched request ({} results)",
                entries.len()
            )),
            PlatformFailure(err) => {
                ScoutGateError::Storage(format!("keychain platform error: {err}"))
            }
            NoStorageAccess(err) => {
                ScoutGateError::Storage(format!("unable to access secure storage: {err}"))
            }
            _ => ScoutGateError::Storage(description),
        }
    }
}

impl From<KeyringError> for InfraError {
    fn from(value: KeyringError) -> Self {
        InfraError(value.into_scoutgate())
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → ScoutGateError */
/* -------------------------------------------------------------------------- */

impl IntoScoutGateError for HttpError {
    fn into_scoutgate(self) -> ScoutGateError {
        if self.is_timeout() {
            return ScoutGateError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return ScoutGateError::Network("HTTP connection failure".into());
        }

        if self.is_decode() {
            return ScoutGateError::Decode(self.to_string());
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                400..=499 if code != 429 => AuthError::Provider(message).into(),
                _ => ScoutGateError::Network(message),
            };
        }

        if self.is_builder() {
            return ScoutGateError::Internal(format!("invalid HTTP request: {self}"));
        }

        ScoutGateError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_scoutgate())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → ScoutGateError */
/* -------------------------------------------------------------------------- */

impl IntoScoutGateError for serde_json::Error {
    fn into_scoutgate(self) -> ScoutGateError {
        ScoutGateError::Decode(self.to_string())
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(value.into_scoutgate())
    }
}

/* -------------------------------------------------------------------------- */
/* OAuth client and redirect errors → ScoutGateError */
/* -------------------------------------------------------------------------- */

impl IntoScoutGateError for OAuthClientError {
    fn into_scoutgate(self) -> ScoutGateError {
        match self {
            Self::RequestFailed(err) => err.into_scoutgate(),
            Self::HttpStatus { endpoint, status } => {
                ScoutGateError::Network(format!("HTTP {status} from {endpoint}"))
            }
            Self::Provider(response) => AuthError::Provider(response.to_string()).into(),
            Self::ParseError(message) => ScoutGateError::Decode(message),
            Self::InvalidEndpoint { .. } | Self::UnsupportedFlow(_) => {
                ScoutGateError::Config(self.to_string())
            }
        }
    }
}

impl From<OAuthClientError> for InfraError {
    fn from(value: OAuthClientError) -> Self {
        InfraError(value.into_scoutgate())
    }
}

impl IntoScoutGateError for RedirectError {
    fn into_scoutgate(self) -> ScoutGateError {
        match self {
            Self::Cancelled => AuthError::Cancelled,
            Self::TimedOut(limit) => AuthError::RedirectTimedOut(limit.as_secs()),
            Self::StateMismatch => AuthError::StateMismatch,
            Self::AlreadyInFlight => AuthError::LoginInProgress,
            Self::MissingCode | Self::Provider { .. } => AuthError::Provider(self.to_string()),
        }
        .into()
    }
}

impl From<RedirectError> for InfraError {
    fn from(value: RedirectError) -> Self {
        InfraError(value.into_scoutgate())
    }
}

/// Map an OIDC client failure straight to the domain error
#[must_use]
pub fn map_oauth_error(err: OAuthClientError) -> ScoutGateError {
    InfraError::from(err).into()
}

/// Map a redirect failure straight to the domain error
#[must_use]
pub fn map_redirect_error(err: RedirectError) -> ScoutGateError {
    InfraError::from(err).into()
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
