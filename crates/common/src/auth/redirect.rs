//! Redirect coordination for interactive authorization
//!
//! The authorization step hands control to an external user agent (system
//! browser, web authentication sheet) and suspends until the agent returns
//! through the redirect URI. [`RedirectCoordinator`] is the rendezvous point:
//!
//! ```text
//!  login flow                          platform glue
//!  ──────────                          ─────────────
//!  begin(state) ──► RedirectWaiter
//!  waiter.wait().await  ◄────────────  resume(callback_url)   (deep link,
//!                        ◄───────────  cancel()               loopback server,
//!                                                             dismissed sheet)
//! ```
//!
//! At most one redirect is in flight. `resume` and `cancel` are no-ops when
//! nothing is pending, so duplicate deliveries of the same callback URL are
//! harmless.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{debug, warn};
use url::Url;

use super::pkce::validate_state;
use super::types::AuthorizationCallback;
use crate::error::{ErrorClassification, ErrorSeverity};
use crate::security::SecretString;

/// OAuth error code sent when the user declines consent
const ACCESS_DENIED: &str = "access_denied";

/// Why an in-flight redirect ended without an authorization code
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RedirectError {
    /// User dismissed the user agent or declined consent
    #[error("authorization was cancelled by the user")]
    Cancelled,

    /// No callback arrived before the deadline
    #[error("no authorization callback received within {0:?}")]
    TimedOut(Duration),

    /// Callback state does not match the request (possible CSRF)
    #[error("authorization callback state mismatch")]
    StateMismatch,

    /// Callback carried neither a code nor an error
    #[error("authorization callback is missing the code parameter")]
    MissingCode,

    /// Provider reported an error in the callback
    #[error("authorization failed: {error}")]
    Provider { error: String, description: Option<String> },

    /// Another redirect is already pending
    #[error("another authorization redirect is already in flight")]
    AlreadyInFlight,
}

impl ErrorClassification for RedirectError {
    fn is_retryable(&self) -> bool {
        matches!(self, Self::TimedOut(_) | Self::Cancelled)
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Cancelled => ErrorSeverity::Info,
            Self::TimedOut(_) | Self::AlreadyInFlight => ErrorSeverity::Warning,
            Self::MissingCode | Self::Provider { .. } => ErrorSeverity::Error,
            Self::StateMismatch => ErrorSeverity::Critical,
        }
    }

    fn is_user_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

type CallbackResult = Result<AuthorizationCallback, RedirectError>;

struct PendingRedirect {
    id: u64,
    expected_state: String,
    sender: oneshot::Sender<CallbackResult>,
}

struct Inner {
    redirect_uri: Url,
    pending: Mutex<Option<PendingRedirect>>,
    next_id: AtomicU64,
}

/// Rendezvous between a suspended login flow and the redirect callback
#[derive(Clone)]
pub struct RedirectCoordinator {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for RedirectCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedirectCoordinator")
            .field("redirect_uri", &self.inner.redirect_uri.as_str())
            .field("in_flight", &self.is_in_flight())
            .finish()
    }
}

impl RedirectCoordinator {
    /// Create a coordinator that accepts callbacks addressed to `redirect_uri`
    #[must_use]
    pub fn new(redirect_uri: Url) -> Self {
        Self {
            inner: Arc::new(Inner {
                redirect_uri,
                pending: Mutex::new(None),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Registered redirect URI
    #[must_use]
    pub fn redirect_uri(&self) -> &Url {
        &self.inner.redirect_uri
    }

    /// Whether a redirect is currently awaiting its callback
    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.inner.pending.lock().is_some()
    }

    /// Register a new in-flight redirect expecting `expected_state`
    ///
    /// # Errors
    /// Returns [`RedirectError::AlreadyInFlight`] if another redirect is
    /// pending.
    pub fn begin(&self, expected_state: impl Into<String>) -> Result<RedirectWaiter, RedirectError> {
        let mut pending = self.inner.pending.lock();
        if pending.is_some() {
            return Err(RedirectError::AlreadyInFlight);
        }

        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = oneshot::channel();
        *pending = Some(PendingRedirect { id, expected_state: expected_state.into(), sender });
        drop(pending);

        debug!(redirect_id = id, "authorization redirect started");
        Ok(RedirectWaiter { id, receiver, inner: Arc::clone(&self.inner) })
    }

    /// Deliver a callback URL to the in-flight redirect
    ///
    /// Returns `true` if the URL was consumed. URLs for a different redirect
    /// target, or deliveries while nothing is in flight, are ignored.
    pub fn resume(&self, callback_url: &str) -> bool {
        let Ok(url) = Url::parse(callback_url) else {
            debug!("ignoring unparseable redirect callback");
            return false;
        };

        if !self.matches_redirect_uri(&url) {
            debug!(scheme = url.scheme(), "ignoring callback for a different redirect target");
            return false;
        }

        let Some(pending) = self.inner.pending.lock().take() else {
            debug!("redirect callback received with no flow in flight");
            return false;
        };

        let outcome = parse_callback(&url, &pending.expected_state);
        if let Err(err) = &outcome {
            warn!(redirect_id = pending.id, error = %err, "authorization redirect ended without code");
        } else {
            debug!(redirect_id = pending.id, "authorization callback delivered");
        }

        // Receiver gone means the waiter was dropped; nothing left to notify.
        let _ = pending.sender.send(outcome);
        true
    }

    /// Cancel the in-flight redirect (user dismissed the user agent)
    ///
    /// Returns `true` if a redirect was pending.
    pub fn cancel(&self) -> bool {
        let Some(pending) = self.inner.pending.lock().take() else {
            return false;
        };

        debug!(redirect_id = pending.id, "authorization redirect cancelled");
        let _ = pending.sender.send(Err(RedirectError::Cancelled));
        true
    }

    fn matches_redirect_uri(&self, url: &Url) -> bool {
        let expected = &self.inner.redirect_uri;
        url.scheme() == expected.scheme()
            && url.host_str() == expected.host_str()
            && url.port_or_known_default() == expected.port_or_known_default()
            && url.path().trim_end_matches('/') == expected.path().trim_end_matches('/')
    }
}

/// Suspends the login flow until the redirect completes
///
/// Dropping the waiter abandons the redirect and frees the coordinator for a
/// new attempt.
pub struct RedirectWaiter {
    id: u64,
    receiver: oneshot::Receiver<CallbackResult>,
    inner: Arc<Inner>,
}

impl RedirectWaiter {
    /// Wait for the callback, optionally bounded by `timeout`
    ///
    /// # Errors
    /// Any [`RedirectError`] produced by the callback, cancellation, or
    /// timeout.
    pub async fn wait(mut self, timeout: Option<Duration>) -> CallbackResult {
        let received = match timeout {
            Some(limit) => match tokio::time::timeout(limit, &mut self.receiver).await {
                Ok(received) => received,
                Err(_) => return Err(RedirectError::TimedOut(limit)),
            },
            None => (&mut self.receiver).await,
        };

        // Sender dropped without a result: treat as abandonment by the user agent.
        received.unwrap_or(Err(RedirectError::Cancelled))
    }
}

impl Drop for RedirectWaiter {
    fn drop(&mut self) {
        let mut pending = self.inner.pending.lock();
        if pending.as_ref().is_some_and(|p| p.id == self.id) {
            *pending = None;
        }
    }
}

fn parse_callback(url: &Url, expected_state: &str) -> CallbackResult {
    let mut code = None;
    let mut state = None;
    let mut error = None;
    let mut description = None;

    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            "error_description" => description = Some(value.into_owned()),
            _ => {}
        }
    }

    // Error responses echo `state` too, so an error without it is a mismatch.
    match state {
        Some(state) if validate_state(expected_state, &state) => {}
        _ => return Err(RedirectError::StateMismatch),
    }

    if let Some(error) = error {
        if error == ACCESS_DENIED {
            return Err(RedirectError::Cancelled);
        }
        return Err(RedirectError::Provider { error, description });
    }

    let code = code.filter(|c| !c.is_empty()).ok_or(RedirectError::MissingCode)?;
    Ok(AuthorizationCallback { code: SecretString::new(code), state: expected_state.to_string() })
}

#[cfg(test)]
mod tests {
    //! Unit tests for auth::redirect.
    use super::*;

    const REDIRECT: &str = "scoutgate://oauth/callback";

    fn coordinator() -> RedirectCoordinator {
        RedirectCoordinator::new(Url::parse(REDIRECT).unwrap())
    }

    #[tokio::test]
    async fn test_resume_delivers_code() {
        let coordinator = coordinator();
        let waiter = coordinator.begin("state-1").unwrap();

        assert!(coordinator.resume(&format!("{REDIRECT}?code=abc&state=state-1")));

        let callback = waiter.wait(None).await.unwrap();
        assert_eq!(callback.code.expose(), "abc");
        assert!(!coordinator.is_in_flight());
    }

    #[tokio::test]
    async fn test_duplicate_resume_is_noop() {
        let coordinator = coordinator();
        let waiter = coordinator.begin("s").unwrap();
        let url = format!("{REDIRECT}?code=abc&state=s");

        assert!(coordinator.resume(&url));
        assert!(!coordinator.resume(&url));
        assert!(waiter.wait(None).await.is_ok());
    }

    #[test]
    fn test_resume_without_flow_is_noop() {
        let coordinator = coordinator();
        let url = format!("{REDIRECT}?code=abc&state=s");

        assert!(!coordinator.resume(&url));
        assert!(!coordinator.resume(&url));
        assert!(!coordinator.is_in_flight());
    }

    #[tokio::test]
    async fn test_foreign_callback_is_ignored() {
        let coordinator = coordinator();
        let waiter = coordinator.begin("s").unwrap();

        assert!(!coordinator.resume("https://evil.example/callback?code=abc&state=s"));
        assert!(!coordinator.resume("not a url"));
        assert!(coordinator.is_in_flight());

        assert!(coordinator.cancel());
        assert_eq!(waiter.wait(None).await.unwrap_err(), RedirectError::Cancelled);
    }

    #[tokio::test]
    async fn test_state_mismatch() {
        let coordinator = coordinator();
        let waiter = coordinator.begin("expected").unwrap();

        assert!(coordinator.resume(&format!("{REDIRECT}?code=abc&state=forged")));
        assert_eq!(waiter.wait(None).await.unwrap_err(), RedirectError::StateMismatch);
    }

    #[tokio::test]
    async fn test_access_denied_is_cancellation() {
        let coordinator = coordinator();
        let waiter = coordinator.begin("s").unwrap();

        assert!(coordinator.resume(&format!("{REDIRECT}?error=access_denied&state=s")));
        let err = waiter.wait(None).await.unwrap_err();
        assert!(err.is_user_cancellation());
    }

    #[tokio::test]
    async fn test_error_without_matching_state_is_mismatch() {
        let coordinator = coordinator();
        let waiter = coordinator.begin("s").unwrap();

        assert!(coordinator.resume(&format!("{REDIRECT}?error=access_denied")));
        assert_eq!(waiter.wait(None).await.unwrap_err(), RedirectError::StateMismatch);

        let waiter = coordinator.begin("t").unwrap();
        coordinator.resume(&format!("{REDIRECT}?error=server_error&state=forged"));
        let err = waiter.wait(None).await.unwrap_err();
        assert_eq!(err, RedirectError::StateMismatch);
        assert!(!err.is_user_cancellation());
    }

    #[tokio::test]
    async fn test_provider_error() {
        let coordinator = coordinator();
        let waiter = coordinator.begin("s").unwrap();

        coordinator.resume(&format!(
            "{REDIRECT}?error=server_error&error_description=boom&state=s"
        ));
        assert_eq!(
            waiter.wait(None).await.unwrap_err(),
            RedirectError::Provider {
                error: "server_error".to_string(),
                description: Some("boom".to_string())
            }
        );
    }

    #[tokio::test]
    async fn test_missing_code() {
        let coordinator = coordinator();
        let waiter = coordinator.begin("s").unwrap();

        coordinator.resume(&format!("{REDIRECT}?state=s"));
        assert_eq!(waiter.wait(None).await.unwrap_err(), RedirectError::MissingCode);
    }

    #[tokio::test]
    async fn test_timeout_frees_coordinator() {
        let coordinator = coordinator();
        let waiter = coordinator.begin("s").unwrap();

        let err = waiter.wait(Some(Duration::from_millis(10))).await.unwrap_err();
        assert!(matches!(err, RedirectError::TimedOut(_)));
        assert!(!coordinator.is_in_flight());
        assert!(coordinator.begin("next").is_ok());
    }

    #[test]
    fn test_second_begin_rejected() {
        let coordinator = coordinator();
        let _waiter = coordinator.begin("s").unwrap();
        assert!(matches!(coordinator.begin("t"), Err(RedirectError::AlreadyInFlight)));
    }

    #[test]
    fn test_dropped_waiter_frees_coordinator() {
        let coordinator = coordinator();
        drop(coordinator.begin("s").unwrap());
        assert!(!coordinator.is_in_flight());
        assert!(!coordinator.cancel());
    }

    #[tokio::test]
    async fn test_loopback_redirect_matches_port() {
        let coordinator = RedirectCoordinator::new(Url::parse("http://127.0.0.1:8765/callback").unwrap());
        let _waiter = coordinator.begin("s").unwrap();

        assert!(!coordinator.resume("http://127.0.0.1:9999/callback?code=a&state=s"));
        assert!(coordinator.resume("http://127.0.0.1:8765/callback?code=a&state=s"));
    }
}
