//! Login and account commands
//!
//! The UI-facing layer over [`AuthOrchestrator`](scoutgate_core::AuthOrchestrator)
//! and [`SessionManager`](scoutgate_core::SessionManager). Each login attempt
//! ends in exactly one [`LoginOutcome`]; cancellation is reported as its own
//! variant so the UI can stay quiet about it.

use std::time::Instant;

use scoutgate_common::ErrorClassification;
use scoutgate_core::PresentationContext;
use scoutgate_domain::constants::{
    CANCELLED_MESSAGE, GENERIC_FAILURE_MESSAGE, NETWORK_FAILURE_MESSAGE,
};
use scoutgate_domain::{AuthError, AuthState, ScoutGateError, Session};
use serde::Serialize;
use tracing::{debug, info};

use crate::context::AppContext;
use crate::utils::logging::{error_label, log_command_execution};

/// Terminal result of one login attempt, as shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LoginOutcome {
    Success { uid: String },
    /// The user backed out; no error should be shown
    Cancelled,
    Failed { message: String },
}

impl LoginOutcome {
    pub fn from_result(result: &Result<Session, ScoutGateError>) -> Self {
        match result {
            Ok(session) => Self::Success { uid: session.uid.clone() },
            Err(err) if err.is_user_cancellation() => Self::Cancelled,
            Err(err) => Self::Failed { message: user_message(err) },
        }
    }

    /// Status line for the UI
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Cancelled => Some(CANCELLED_MESSAGE),
            Self::Failed { message } => Some(message),
        }
    }

    /// Whether the UI should raise an error for this outcome
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// The single message shown for a failed attempt
///
/// Denials carry their own wording; transport failures get the network
/// message; everything else collapses to a generic retry hint so internal
/// details stay in the logs.
pub fn user_message(err: &ScoutGateError) -> String {
    match err {
        ScoutGateError::Auth(AuthError::NotAuthorized(message)) => message.clone(),
        ScoutGateError::Auth(AuthError::LoginInProgress) => err.to_string(),
        ScoutGateError::Network(_) => NETWORK_FAILURE_MESSAGE.to_string(),
        _ => GENERIC_FAILURE_MESSAGE.to_string(),
    }
}

/// Snapshot of the authentication state for the UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthStatus {
    pub signed_in: bool,
    pub uid: Option<String>,
    pub state: AuthState,
}

/// Run one login attempt through `presentation`.
pub async fn login(ctx: &AppContext, presentation: &dyn PresentationContext) -> LoginOutcome {
    let command_name = "auth::login";
    let start = Instant::now();
    info!(command = command_name, "Executing login");

    let result = ctx.orchestrator.login(presentation).await;

    let outcome_label = result.as_ref().err().map(error_label);
    log_command_execution(command_name, start.elapsed(), outcome_label.map_or(Ok(()), Err));

    let outcome = LoginOutcome::from_result(&result);
    debug!(?outcome, "login finished");
    outcome
}

pub fn auth_status(ctx: &AppContext) -> AuthStatus {
    let uid = ctx.sessions.current_uid();
    AuthStatus { signed_in: uid.is_some(), uid, state: ctx.orchestrator.state() }
}

/// Sign out locally.
///
/// # Errors
/// A user-facing message if the persisted session could not be removed; the
/// in-memory session is gone either way.
pub async fn sign_out(ctx: &AppContext) -> Result<(), String> {
    let command_name = "auth::sign_out";
    let start = Instant::now();

    let result = ctx.sessions.sign_out().await;
    if result.is_ok() {
        ctx.orchestrator.reset();
    }

    let outcome = result.as_ref().map(|_| ()).map_err(error_label);
    log_command_execution(command_name, start.elapsed(), outcome);
    result.map_err(|err| user_message(&err))
}

/// Delete the signed-in account at the session backend.
///
/// # Errors
/// `"Not signed in"` without a session, otherwise the failure's user-facing
/// message. The session survives a failed deletion.
pub async fn delete_account(ctx: &AppContext) -> Result<(), String> {
    let command_name = "auth::delete_account";
    let start = Instant::now();

    let Some(session) = ctx.sessions.current_session() else {
        log_command_execution(command_name, start.elapsed(), Err("not_signed_in"));
        return Err("Not signed in".to_string());
    };

    let result = ctx.sessions.delete_account(&session).await;
    if result.is_ok() {
        ctx.orchestrator.reset();
    }

    let outcome = result.as_ref().map(|_| ()).map_err(error_label);
    log_command_execution(command_name, start.elapsed(), outcome);
    result.map_err(|err| user_message(&err))
}

/// Deliver a redirect callback (custom-scheme deep link).
///
/// Returns whether an in-flight login accepted it; duplicates and stray
/// links are ignored.
pub fn handle_deep_link(ctx: &AppContext, url: &str) -> bool {
    let accepted = ctx.orchestrator.resume_redirect(url);
    debug!(accepted, "deep link delivered");
    accepted
}

/// Abort the login waiting for its redirect, if any
pub fn cancel_login(ctx: &AppContext) -> bool {
    ctx.orchestrator.cancel_redirect()
}
