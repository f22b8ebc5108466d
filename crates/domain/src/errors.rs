//! Error types used throughout the application

use scoutgate_common::{ErrorClassification, ErrorSeverity};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::FailureKind;

/// Main error type for ScoutGate
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum ScoutGateError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Authentication and authorization failures of a login attempt
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail")]
pub enum AuthError {
    /// No presentation surface, or the user agent could not be launched
    #[error("the authorization flow could not be started: {0}")]
    RedirectUnavailable(String),

    #[error("the login was cancelled by the user")]
    Cancelled,

    #[error("no authorization callback received within {0} seconds")]
    RedirectTimedOut(u64),

    #[error("no access token present")]
    NoAccessToken,

    /// Carries the user-facing denial message
    #[error("{0}")]
    NotAuthorized(String),

    #[error("token subject mismatch")]
    SubjectMismatch,

    #[error("empty token")]
    EmptyToken,

    #[error("session error: {0}")]
    Session(String),

    /// Error response from the identity provider or trusted backend
    #[error("provider error: {0}")]
    Provider(String),

    #[error("authorization callback state mismatch")]
    StateMismatch,

    #[error("a login attempt is already in progress")]
    LoginInProgress,
}

impl AuthError {
    /// Stable failure kind for UI and logging
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::RedirectUnavailable(_) => FailureKind::RedirectUnavailable,
            Self::Cancelled => FailureKind::Cancelled,
            Self::RedirectTimedOut(_) => FailureKind::TimedOut,
            Self::NoAccessToken => FailureKind::NoAccessToken,
            Self::NotAuthorized(_) => FailureKind::NotAuthorized,
            Self::SubjectMismatch => FailureKind::SubjectMismatch,
            Self::EmptyToken => FailureKind::EmptyToken,
            Self::Session(_) => FailureKind::Session,
            Self::Provider(_) => FailureKind::Provider,
            Self::StateMismatch => FailureKind::StateMismatch,
            Self::LoginInProgress => FailureKind::LoginInProgress,
        }
    }
}

impl ScoutGateError {
    /// Stable failure kind for UI and logging
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::Network(_) => FailureKind::Network,
            Self::Decode(_) => FailureKind::Decode,
            Self::Auth(auth) => auth.kind(),
            Self::Config(_) => FailureKind::Config,
            Self::Storage(_) | Self::Internal(_) => FailureKind::Internal,
        }
    }

    /// Borrow the inner [`AuthError`], if any
    #[must_use]
    pub const fn as_auth(&self) -> Option<&AuthError> {
        match self {
            Self::Auth(auth) => Some(auth),
            _ => None,
        }
    }
}

impl ErrorClassification for AuthError {
    fn is_retryable(&self) -> bool {
        matches!(self, Self::Cancelled | Self::RedirectTimedOut(_) | Self::LoginInProgress)
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Cancelled => ErrorSeverity::Info,
            Self::RedirectTimedOut(_) | Self::LoginInProgress | Self::NotAuthorized(_) => {
                ErrorSeverity::Warning
            }
            Self::StateMismatch | Self::SubjectMismatch => ErrorSeverity::Critical,
            _ => ErrorSeverity::Error,
        }
    }

    fn is_user_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl ErrorClassification for ScoutGateError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Auth(auth) => auth.is_retryable(),
            _ => false,
        }
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Network(_) => ErrorSeverity::Warning,
            Self::Auth(auth) => auth.severity(),
            Self::Config(_) => ErrorSeverity::Critical,
            Self::Decode(_) | Self::Storage(_) | Self::Internal(_) => ErrorSeverity::Error,
        }
    }

    fn is_user_cancellation(&self) -> bool {
        self.as_auth().is_some_and(AuthError::is_user_cancellation)
    }
}

/// Result type alias for ScoutGate operations
pub type Result<T> = std::result::Result<T, ScoutGateError>;
