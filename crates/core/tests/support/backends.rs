//! Trusted backend, session backend, store and provisioner mocks

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use parking_lot::Mutex;
use scoutgate_common::SecretString;
use scoutgate_core::{
    CustomTokenBackend, MintedToken, ProfileProvisioner, SessionBackend, SessionStore,
};
use scoutgate_domain::{
    AuthError, CustomAuthToken, ProviderAccessToken, Result, ScoutGateError, Session, UserProfile,
};

/// Token-exchange backend with a scripted response
pub struct MockTokenBackend {
    echoed_user_id: Option<String>,
    token: String,
    failure: Option<ScoutGateError>,
    pub calls: AtomicUsize,
}

impl MockTokenBackend {
    /// Echoes the requested subject and mints a non-empty token
    pub fn echoing() -> Self {
        Self {
            echoed_user_id: None,
            token: "firebase-custom-token".to_string(),
            failure: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Echoes `user_id` regardless of the request
    pub fn echoing_user(user_id: &str) -> Self {
        Self { echoed_user_id: Some(user_id.to_string()), ..Self::echoing() }
    }

    pub fn minting(token: &str) -> Self {
        Self { token: token.to_string(), ..Self::echoing() }
    }

    pub fn failing(err: ScoutGateError) -> Self {
        Self { failure: Some(err), ..Self::echoing() }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CustomTokenBackend for MockTokenBackend {
    async fn mint_custom_token(
        &self,
        subject_id: &str,
        _access_token: &ProviderAccessToken,
    ) -> Result<MintedToken> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        Ok(MintedToken {
            user_id: self.echoed_user_id.clone().unwrap_or_else(|| subject_id.to_string()),
            token: SecretString::new(self.token.clone()),
        })
    }
}

pub fn session_for(uid: &str) -> Session {
    Session {
        uid: uid.to_string(),
        id_token: SecretString::new(format!("id-token-{uid}")),
        refresh_token: Some(SecretString::new("refresh")),
        expires_at: Some(Utc::now() + Duration::hours(1)),
        established_at: Utc::now(),
    }
}

/// Second-party identity system
#[derive(Default)]
pub struct MockSessionBackend {
    fail_sign_in: AtomicBool,
    fail_delete: AtomicBool,
    pub sign_in_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
}

impl MockSessionBackend {
    pub fn fail_sign_in(&self) {
        self.fail_sign_in.store(true, Ordering::SeqCst);
    }

    pub fn fail_delete(&self) {
        self.fail_delete.store(true, Ordering::SeqCst);
    }

    pub fn sign_in_count(&self) -> usize {
        self.sign_in_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionBackend for MockSessionBackend {
    async fn sign_in_with_custom_token(&self, token: &CustomAuthToken) -> Result<Session> {
        self.sign_in_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_sign_in.load(Ordering::SeqCst) {
            return Err(AuthError::Session("INVALID_CUSTOM_TOKEN".to_string()).into());
        }
        Ok(session_for(&token.subject_id))
    }

    async fn delete_account(&self, _session: &Session) -> Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(ScoutGateError::Network("connection refused".to_string()));
        }
        Ok(())
    }
}

/// In-memory session store
#[derive(Default)]
pub struct MockSessionStore {
    stored: Mutex<Option<Session>>,
    fail_clear: AtomicBool,
    pub saves: AtomicUsize,
}

impl MockSessionStore {
    pub fn seeded(session: Session) -> Self {
        Self { stored: Mutex::new(Some(session)), ..Self::default() }
    }

    pub fn stored(&self) -> Option<Session> {
        self.stored.lock().clone()
    }

    pub fn fail_clear(&self) {
        self.fail_clear.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl SessionStore for MockSessionStore {
    async fn load(&self) -> Result<Option<Session>> {
        Ok(self.stored.lock().clone())
    }

    async fn save(&self, session: &Session) -> Result<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        *self.stored.lock() = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        if self.fail_clear.load(Ordering::SeqCst) {
            return Err(ScoutGateError::Storage("keychain locked".to_string()));
        }
        *self.stored.lock() = None;
        Ok(())
    }
}

/// Profile provisioner recording what it was asked to write
#[derive(Default)]
pub struct MockProvisioner {
    fail: AtomicBool,
    pub profiles: Mutex<Vec<UserProfile>>,
}

impl MockProvisioner {
    pub fn fail(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn provisioned(&self) -> Vec<UserProfile> {
        self.profiles.lock().clone()
    }
}

#[async_trait]
impl ProfileProvisioner for MockProvisioner {
    async fn provision(&self, _session: &Session, profile: &UserProfile) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ScoutGateError::Network("firestore unavailable".to_string()));
        }
        self.profiles.lock().push(profile.clone());
        Ok(())
    }
}
