//! Login state machine vocabulary

use serde::{Deserialize, Serialize};

use crate::errors::ScoutGateError;
use crate::impl_domain_label_conversions;

/// Outcome of the authorization policy; derived, never stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationDecision {
    pub allowed: bool,
    pub reason: Option<String>,
}

impl AuthorizationDecision {
    #[must_use]
    pub const fn allow() -> Self {
        Self { allowed: true, reason: None }
    }

    #[must_use]
    pub fn deny(reason: impl Into<String>) -> Self {
        Self { allowed: false, reason: Some(reason.into()) }
    }
}

/// Category of a failed login attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Network,
    Decode,
    RedirectUnavailable,
    Cancelled,
    TimedOut,
    NoAccessToken,
    NotAuthorized,
    SubjectMismatch,
    EmptyToken,
    Session,
    Provider,
    StateMismatch,
    LoginInProgress,
    Config,
    Internal,
}

impl_domain_label_conversions!(FailureKind {
    Network => "network",
    Decode => "decode",
    RedirectUnavailable => "redirect_unavailable",
    Cancelled => "cancelled",
    TimedOut => "timed_out",
    NoAccessToken => "no_access_token",
    NotAuthorized => "not_authorized",
    SubjectMismatch => "subject_mismatch",
    EmptyToken => "empty_token",
    Session => "session",
    Provider => "provider",
    StateMismatch => "state_mismatch",
    LoginInProgress => "login_in_progress",
    Config => "config",
    Internal => "internal",
});

/// Why an attempt ended in `Failed`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureReason {
    pub kind: FailureKind,
    pub message: String,
}

impl FailureReason {
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self.kind, FailureKind::Cancelled)
    }
}

impl From<&ScoutGateError> for FailureReason {
    fn from(err: &ScoutGateError) -> Self {
        Self { kind: err.kind(), message: err.to_string() }
    }
}

/// Stage label of [`AuthState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthStage {
    Idle,
    DiscoveringIssuer,
    AwaitingRedirect,
    RedeemingCode,
    FetchingUserInfo,
    CheckingAuthorization,
    ExchangingToken,
    EstablishingSession,
    Success,
    Failed,
}

impl_domain_label_conversions!(AuthStage {
    Idle => "idle",
    DiscoveringIssuer => "discovering_issuer",
    AwaitingRedirect => "awaiting_redirect",
    RedeemingCode => "redeeming_code",
    FetchingUserInfo => "fetching_user_info",
    CheckingAuthorization => "checking_authorization",
    ExchangingToken => "exchanging_token",
    EstablishingSession => "establishing_session",
    Success => "success",
    Failed => "failed",
});

/// Login state machine
///
/// `Idle → DiscoveringIssuer → AwaitingRedirect → RedeemingCode →
/// FetchingUserInfo → CheckingAuthorization → ExchangingToken →
/// EstablishingSession → Success`, with `Failed` reachable from every
/// non-terminal state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum AuthState {
    #[default]
    Idle,
    DiscoveringIssuer,
    AwaitingRedirect,
    RedeemingCode,
    FetchingUserInfo,
    CheckingAuthorization,
    ExchangingToken,
    EstablishingSession,
    Success { uid: String },
    Failed(FailureReason),
}

impl AuthState {
    #[must_use]
    pub const fn stage(&self) -> AuthStage {
        match self {
            Self::Idle => AuthStage::Idle,
            Self::DiscoveringIssuer => AuthStage::DiscoveringIssuer,
            Self::AwaitingRedirect => AuthStage::AwaitingRedirect,
            Self::RedeemingCode => AuthStage::RedeemingCode,
            Self::FetchingUserInfo => AuthStage::FetchingUserInfo,
            Self::CheckingAuthorization => AuthStage::CheckingAuthorization,
            Self::ExchangingToken => AuthStage::ExchangingToken,
            Self::EstablishingSession => AuthStage::EstablishingSession,
            Self::Success { .. } => AuthStage::Success,
            Self::Failed(_) => AuthStage::Failed,
        }
    }

    /// `Success` or `Failed`
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Success { .. } | Self::Failed(_))
    }

    /// An attempt is running (neither idle nor terminal)
    #[must_use]
    pub const fn is_in_flight(&self) -> bool {
        !matches!(self, Self::Idle) && !self.is_terminal()
    }
}
