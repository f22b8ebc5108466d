//! Shared test helpers for `scoutgate-core` integration tests.
//!
//! Lightweight in-memory mocks for every login pipeline port, plus a
//! [`Harness`] that wires them into an [`AuthOrchestrator`] so scenario tests
//! can focus on behaviour instead of boilerplate.

#![allow(dead_code)]

pub mod backends;
pub mod identity;

use std::sync::Arc;

use scoutgate_core::{
    AccessTokenValidator, AuthOrchestrator, AuthorizationPolicy, SessionManager,
    TokenExchangeClient,
};
use scoutgate_domain::{HitobitoRole, UserInfo};

pub use backends::{MockProvisioner, MockSessionBackend, MockSessionStore, MockTokenBackend};
pub use identity::{MockIdentityProvider, MockPresentation, MockUserInfoSource, PresentAction};

pub const SUBJECT: &str = "4242";
pub const REQUIRED_GROUP: i64 = 1244;

/// User info with one role per group id
pub fn user_in_groups(groups: &[i64]) -> UserInfo {
    let mut info = UserInfo::new(SUBJECT)
        .with_roles(groups.iter().map(|g| Some(HitobitoRole::in_group(*g))).collect());
    info.first_name = Some("Max".to_string());
    info.nickname = Some("Fuchs".to_string());
    info
}

/// All mocks plus the orchestrator built from them
pub struct Harness {
    pub provider: Arc<MockIdentityProvider>,
    pub user_info: Arc<MockUserInfoSource>,
    pub token_backend: Arc<MockTokenBackend>,
    pub session_backend: Arc<MockSessionBackend>,
    pub store: Arc<MockSessionStore>,
    pub provisioner: Arc<MockProvisioner>,
    pub orchestrator: AuthOrchestrator,
}

impl Harness {
    pub fn new(user: UserInfo) -> Self {
        Self::with_token_backend(user, MockTokenBackend::echoing())
    }

    pub fn with_token_backend(user: UserInfo, token_backend: MockTokenBackend) -> Self {
        let provider = Arc::new(MockIdentityProvider::new());
        let user_info = Arc::new(MockUserInfoSource::returning(user));
        let token_backend = Arc::new(token_backend);
        let session_backend = Arc::new(MockSessionBackend::default());
        let store = Arc::new(MockSessionStore::default());
        let provisioner = Arc::new(MockProvisioner::default());

        let sessions = Arc::new(SessionManager::new(session_backend.clone(), store.clone()));
        let orchestrator = AuthOrchestrator::new(
            provider.clone(),
            AccessTokenValidator::new(user_info.clone()),
            AuthorizationPolicy::new(REQUIRED_GROUP),
            TokenExchangeClient::new(token_backend.clone()),
            sessions,
        )
        .with_profile_provisioner(provisioner.clone());

        Self { provider, user_info, token_backend, session_backend, store, provisioner, orchestrator }
    }

    /// Presentation that completes the redirect with a valid code
    pub fn approving_presentation(&self) -> MockPresentation {
        MockPresentation::new(self.provider.coordinator(), PresentAction::Approve)
    }
}
