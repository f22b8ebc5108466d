//! End-to-end login orchestration
//!
//! Sequences discovery, the interactive redirect, code redemption, user-info
//! retrieval, the authorization check, the custom token exchange and session
//! establishment into one all-or-nothing operation.
//!
//! ```text
//! Idle → DiscoveringIssuer → AwaitingRedirect → RedeemingCode →
//! FetchingUserInfo → CheckingAuthorization → ExchangingToken →
//! EstablishingSession → Success
//!                    ╲ any stage ╲→ Failed(reason)
//! ```
//!
//! Authorization is checked before the exchange so that a denied user never
//! reaches the trusted backend. Nothing is retried automatically.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use scoutgate_common::ErrorClassification;
use scoutgate_domain::constants::NOT_AUTHORIZED_MESSAGE;
use scoutgate_domain::{
    AuthError, AuthState, FailureKind, FailureReason, Result, ScoutGateError, Session, UserProfile,
};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::exchange::TokenExchangeClient;
use super::policy::AuthorizationPolicy;
use super::ports::{IdentityProvider, PresentationContext};
use super::session::SessionManager;
use super::validator::AccessTokenValidator;
use crate::user::ports::ProfileProvisioner;

/// Login state machine driver
pub struct AuthOrchestrator {
    provider: Arc<dyn IdentityProvider>,
    validator: AccessTokenValidator,
    policy: AuthorizationPolicy,
    exchange: TokenExchangeClient,
    sessions: Arc<SessionManager>,
    provisioner: Option<Arc<dyn ProfileProvisioner>>,
    state: watch::Sender<AuthState>,
    in_flight: AtomicBool,
}

impl AuthOrchestrator {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        validator: AccessTokenValidator,
        policy: AuthorizationPolicy,
        exchange: TokenExchangeClient,
        sessions: Arc<SessionManager>,
    ) -> Self {
        let (state, _) = watch::channel(AuthState::Idle);
        Self {
            provider,
            validator,
            policy,
            exchange,
            sessions,
            provisioner: None,
            state,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Provision the initial user profile after each successful sign-in
    #[must_use]
    pub fn with_profile_provisioner(mut self, provisioner: Arc<dyn ProfileProvisioner>) -> Self {
        self.provisioner = Some(provisioner);
        self
    }

    /// Session manager shared with the rest of the application
    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    /// Current state snapshot
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Observe state transitions
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    /// Whether an attempt is running
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Return to `Idle` after a terminal state
    ///
    /// Ignored while an attempt is in flight.
    pub fn reset(&self) {
        if !self.is_in_flight() {
            self.state.send_replace(AuthState::Idle);
        }
    }

    /// Deliver a redirect callback URL; no-op when nothing is in flight
    pub fn resume_redirect(&self, url: &str) -> bool {
        self.provider.resume_redirect(url)
    }

    /// Cancel the in-flight redirect
    ///
    /// The running `login` fails with `AuthError::Cancelled`.
    pub fn cancel_redirect(&self) -> bool {
        let cancelled = self.provider.cancel_redirect();
        if cancelled {
            debug!("redirect cancelled externally");
        }
        cancelled
    }

    /// Run one login attempt
    ///
    /// # Errors
    /// `AuthError::LoginInProgress` if another attempt is running (that
    /// attempt is unaffected); otherwise the first failure of any stage.
    pub async fn login(&self, presentation: &dyn PresentationContext) -> Result<Session> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("login rejected: another attempt is in flight");
            return Err(AuthError::LoginInProgress.into());
        }
        let _attempt = AttemptGuard { orchestrator: self };

        match self.run(presentation).await {
            Ok(session) => {
                info!(uid = %session.uid, "Login succeeded");
                self.transition(AuthState::Success { uid: session.uid.clone() });
                Ok(session)
            }
            Err(err) => {
                let reason = FailureReason::from(&err);
                if err.is_user_cancellation() {
                    info!("Login cancelled by user");
                } else {
                    warn!(kind = %reason.kind, error = %err, "Login failed");
                }
                self.transition(AuthState::Failed(reason));
                Err(err)
            }
        }
    }

    async fn run(&self, presentation: &dyn PresentationContext) -> Result<Session> {
        self.transition(AuthState::DiscoveringIssuer);
        let issuer = self.provider.discover_issuer().await?;

        self.transition(AuthState::AwaitingRedirect);
        let authorization =
            self.provider.start_authorization_redirect(&issuer, presentation).await?;

        self.transition(AuthState::RedeemingCode);
        let tokens = self.provider.redeem_code(&issuer, &authorization).await?;
        drop(authorization);
        let access_token = self.validator.extract_access_token(&tokens)?;

        self.transition(AuthState::FetchingUserInfo);
        let user_info = self.validator.fetch_user_info(&issuer, &access_token).await?;

        self.transition(AuthState::CheckingAuthorization);
        let decision = self.policy.evaluate(&user_info);
        if !decision.allowed {
            let message = decision.reason.unwrap_or_else(|| NOT_AUTHORIZED_MESSAGE.to_string());
            return Err(AuthError::NotAuthorized(message).into());
        }

        self.transition(AuthState::ExchangingToken);
        let custom_token =
            self.exchange.exchange_for_custom_token(&user_info.sub, &access_token).await?;
        drop(access_token);

        self.transition(AuthState::EstablishingSession);
        let session = self.sessions.establish_session(&custom_token).await?;

        if let Some(provisioner) = &self.provisioner {
            let profile = UserProfile::from_user_info(&session.uid, &user_info, Utc::now());
            if let Err(err) = provisioner.provision(&session, &profile).await {
                warn!(uid = %session.uid, error = %err, "Profile provisioning failed, rolling back session");
                if let Err(sign_out_err) = self.sessions.sign_out().await {
                    warn!(error = %sign_out_err, "Rollback sign-out failed");
                }
                return Err(err);
            }
        }

        Ok(session)
    }

    fn transition(&self, next: AuthState) {
        debug!(stage = %next.stage(), "auth state transition");
        self.state.send_replace(next);
    }
}

/// Clears the in-flight flag when an attempt ends, including when the
/// `login` future is dropped mid-flight
struct AttemptGuard<'a> {
    orchestrator: &'a AuthOrchestrator,
}

impl Drop for AttemptGuard<'_> {
    fn drop(&mut self) {
        self.orchestrator.state.send_if_modified(|state| {
            if state.is_in_flight() {
                *state = AuthState::Failed(FailureReason {
                    kind: FailureKind::Cancelled,
                    message: ScoutGateError::from(AuthError::Cancelled).to_string(),
                });
                true
            } else {
                false
            }
        });
        self.orchestrator.in_flight.store(false, Ordering::Release);
    }
}
