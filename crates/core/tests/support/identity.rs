//! Identity provider side mocks
//!
//! The mock provider drives a real [`RedirectCoordinator`]; the mock
//! presentation plays the role of the user agent and decides how the
//! redirect ends.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use scoutgate_common::auth::{
    generate_state, AuthorizationResponse, IssuerConfiguration, RedirectCoordinator,
    RedirectError, TokenResponse,
};
use scoutgate_common::SecretString;
use scoutgate_core::{IdentityProvider, PresentationContext, UserInfoSource};
use scoutgate_domain::{AuthError, ProviderAccessToken, Result, ScoutGateError, UserInfo};
use url::Url;

pub const REDIRECT_URI: &str = "scoutgate://oauth/callback";
pub const AUTH_CODE: &str = "mock-auth-code";
pub const ACCESS_TOKEN: &str = "mock-hitobito-token";

pub fn issuer() -> IssuerConfiguration {
    IssuerConfiguration {
        issuer: Some("https://db.scout.example".to_string()),
        authorization_endpoint: "https://db.scout.example/oauth/authorize".to_string(),
        token_endpoint: "https://db.scout.example/oauth/token".to_string(),
        userinfo_endpoint: Some("https://db.scout.example/oauth/userinfo".to_string()),
        response_types_supported: vec!["code".to_string()],
        grant_types_supported: vec!["authorization_code".to_string()],
        code_challenge_methods_supported: vec!["S256".to_string()],
    }
}

fn map_redirect_error(err: RedirectError) -> ScoutGateError {
    match err {
        RedirectError::Cancelled => AuthError::Cancelled,
        RedirectError::TimedOut(limit) => AuthError::RedirectTimedOut(limit.as_secs()),
        RedirectError::StateMismatch => AuthError::StateMismatch,
        RedirectError::AlreadyInFlight => AuthError::LoginInProgress,
        other => AuthError::Provider(other.to_string()),
    }
    .into()
}

/// In-memory identity provider
pub struct MockIdentityProvider {
    coordinator: RedirectCoordinator,
    access_token: Mutex<Option<String>>,
    redirect_timeout: Mutex<Duration>,
    pub discover_calls: AtomicUsize,
    pub redeem_calls: AtomicUsize,
}

impl MockIdentityProvider {
    pub fn new() -> Self {
        Self {
            coordinator: RedirectCoordinator::new(Url::parse(REDIRECT_URI).unwrap()),
            access_token: Mutex::new(Some(ACCESS_TOKEN.to_string())),
            redirect_timeout: Mutex::new(Duration::from_secs(5)),
            discover_calls: AtomicUsize::new(0),
            redeem_calls: AtomicUsize::new(0),
        }
    }

    pub fn coordinator(&self) -> RedirectCoordinator {
        self.coordinator.clone()
    }

    /// Token endpoint omits `access_token`
    pub fn without_access_token(&self) {
        *self.access_token.lock() = None;
    }

    pub fn set_redirect_timeout(&self, timeout: Duration) {
        *self.redirect_timeout.lock() = timeout;
    }

    pub fn redeem_count(&self) -> usize {
        self.redeem_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn discover_issuer(&self) -> Result<IssuerConfiguration> {
        self.discover_calls.fetch_add(1, Ordering::SeqCst);
        Ok(issuer())
    }

    async fn start_authorization_redirect(
        &self,
        issuer: &IssuerConfiguration,
        presentation: &dyn PresentationContext,
    ) -> Result<AuthorizationResponse> {
        if !presentation.is_available() {
            return Err(AuthError::RedirectUnavailable("no foreground window".to_string()).into());
        }

        let state = generate_state();
        let waiter = self.coordinator.begin(state.clone()).map_err(map_redirect_error)?;
        let url = Url::parse_with_params(&issuer.authorization_endpoint, &[("state", &state)])
            .map_err(|e| ScoutGateError::Internal(e.to_string()))?;

        presentation.present(&url).await?;

        let timeout = *self.redirect_timeout.lock();
        let callback = waiter.wait(Some(timeout)).await.map_err(map_redirect_error)?;
        Ok(AuthorizationResponse {
            code: callback.code,
            code_verifier: SecretString::new("mock-verifier"),
            redirect_uri: REDIRECT_URI.to_string(),
        })
    }

    fn resume_redirect(&self, url: &str) -> bool {
        self.coordinator.resume(url)
    }

    fn cancel_redirect(&self) -> bool {
        self.coordinator.cancel()
    }

    async fn redeem_code(
        &self,
        _issuer: &IssuerConfiguration,
        authorization: &AuthorizationResponse,
    ) -> Result<TokenResponse> {
        self.redeem_calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(authorization.code.expose(), AUTH_CODE);

        Ok(TokenResponse {
            access_token: self.access_token.lock().clone().map(SecretString::new),
            token_type: "Bearer".to_string(),
            expires_in: Some(7200),
            refresh_token: None,
            id_token: None,
            scope: Some("openid with_roles".to_string()),
        })
    }
}

/// How the mock user agent ends the redirect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentAction {
    /// Deliver a valid callback (twice, to check idempotence)
    Approve,
    /// Provider reports `access_denied`
    Deny,
    /// User dismisses the sheet
    Dismiss,
    /// Deliver a callback carrying a forged state
    ForgeState,
    /// Show the page and never return
    Hang,
    /// The user agent cannot be launched
    FailToLaunch,
}

/// Mock user agent
pub struct MockPresentation {
    coordinator: RedirectCoordinator,
    action: PresentAction,
    available: bool,
    pub presented: Mutex<Vec<Url>>,
}

impl MockPresentation {
    pub fn new(coordinator: RedirectCoordinator, action: PresentAction) -> Self {
        Self { coordinator, action, available: true, presented: Mutex::new(Vec::new()) }
    }

    /// No foreground surface can be resolved
    pub fn unavailable(coordinator: RedirectCoordinator) -> Self {
        Self { available: false, ..Self::new(coordinator, PresentAction::Approve) }
    }

    pub fn presented_count(&self) -> usize {
        self.presented.lock().len()
    }
}

#[async_trait]
impl PresentationContext for MockPresentation {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn present(&self, url: &Url) -> Result<()> {
        self.presented.lock().push(url.clone());
        let state = url
            .query_pairs()
            .find(|(k, _)| k == "state")
            .map(|(_, v)| v.into_owned())
            .unwrap_or_default();

        match self.action {
            PresentAction::Approve => {
                let callback = format!("{REDIRECT_URI}?code={AUTH_CODE}&state={state}");
                assert!(self.coordinator.resume(&callback));
                assert!(!self.coordinator.resume(&callback), "duplicate delivery must be a no-op");
            }
            PresentAction::Deny => {
                self.coordinator.resume(&format!("{REDIRECT_URI}?error=access_denied&state={state}"));
            }
            PresentAction::Dismiss => {
                self.coordinator.cancel();
            }
            PresentAction::ForgeState => {
                self.coordinator.resume(&format!("{REDIRECT_URI}?code={AUTH_CODE}&state=forged"));
            }
            PresentAction::Hang => {}
            PresentAction::FailToLaunch => {
                return Err(AuthError::RedirectUnavailable("browser failed to start".into()).into());
            }
        }
        Ok(())
    }
}

/// User-info endpoint returning a fixed result
pub struct MockUserInfoSource {
    result: Mutex<Result<UserInfo>>,
    pub calls: AtomicUsize,
}

impl MockUserInfoSource {
    pub fn returning(user: UserInfo) -> Self {
        Self { result: Mutex::new(Ok(user)), calls: AtomicUsize::new(0) }
    }

    pub fn fail_with(&self, err: ScoutGateError) {
        *self.result.lock() = Err(err);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserInfoSource for MockUserInfoSource {
    async fn fetch_user_info(
        &self,
        _issuer: &IssuerConfiguration,
        access_token: &ProviderAccessToken,
    ) -> Result<UserInfo> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(access_token.expose(), ACCESS_TOKEN);
        self.result.lock().clone()
    }
}
