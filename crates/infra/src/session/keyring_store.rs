use async_trait::async_trait;
use chrono::{DateTime, Utc};
use keyring::Entry;
use scoutgate_common::SecretString;
use scoutgate_core::SessionStore;
use scoutgate_domain::constants::KEYRING_SESSION_ACCOUNT;
use scoutgate_domain::{Result, ScoutGateError, Session};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use zeroize::Zeroize;

use crate::errors::InfraError;

/// Keychain representation of a [`Session`]
///
/// Only this module ever sees the token material in clear.
#[derive(Serialize, Deserialize)]
struct StoredSession {
    uid: String,
    id_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_at: Option<DateTime<Utc>>,
    established_at: DateTime<Utc>,
}

impl From<&Session> for StoredSession {
    fn from(session: &Session) -> Self {
        Self {
            uid: session.uid.clone(),
            id_token: session.id_token.expose().to_string(),
            refresh_token: session.refresh_token.as_ref().map(|t| t.expose().to_string()),
            expires_at: session.expires_at,
            established_at: session.established_at,
        }
    }
}

impl From<StoredSession> for Session {
    fn from(stored: StoredSession) -> Self {
        Self {
            uid: stored.uid,
            id_token: SecretString::new(stored.id_token),
            refresh_token: stored.refresh_token.map(SecretString::new),
            expires_at: stored.expires_at,
            established_at: stored.established_at,
        }
    }
}

/// Persists the session handle in the platform keychain
///
/// One entry (`service` / `firebase-session`) holds the JSON-encoded session.
/// An entry that cannot be decoded is treated as absent.
pub struct KeyringSessionStore {
    service: String,
    entry: Entry,
}

impl std::fmt::Debug for KeyringSessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyringSessionStore").field("service", &self.service).finish()
    }
}

impl KeyringSessionStore {
    /// # Errors
    /// Returns an error if the platform keychain rejects the entry attributes.
    pub fn new(service: impl Into<String>) -> Result<Self> {
        let service = service.into();
        let entry = Entry::new(&service, KEYRING_SESSION_ACCOUNT)
            .map_err(|err| ScoutGateError::from(InfraError::from(err)))?;
        Ok(Self { service, entry })
    }

    pub fn service(&self) -> &str {
        &self.service
    }
}

#[async_trait]
impl SessionStore for KeyringSessionStore {
    async fn load(&self) -> Result<Option<Session>> {
        let mut raw = match self.entry.get_password() {
            Ok(raw) => raw,
            Err(keyring::Error::NoEntry) => return Ok(None),
            Err(err) => return Err(InfraError::from(err).into()),
        };

        let decoded = serde_json::from_str::<StoredSession>(&raw);
        raw.zeroize();
        match decoded {
            Ok(stored) => {
                debug!(service = %self.service, "session loaded from keychain");
                Ok(Some(stored.into()))
            }
            Err(err) => {
                warn!(service = %self.service, error = %err, "ignoring unreadable keychain session");
                Ok(None)
            }
        }
    }

    async fn save(&self, session: &Session) -> Result<()> {
        let mut raw = serde_json::to_string(&StoredSession::from(session))
            .map_err(|err| ScoutGateError::from(InfraError::from(err)))?;
        let result = self.entry.set_password(&raw);
        raw.zeroize();
        result.map_err(|err| InfraError::from(err).into())
    }

    async fn clear(&self) -> Result<()> {
        match self.entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(err) => Err(InfraError::from(err).into()),
        }
    }
}
