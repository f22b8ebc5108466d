//! Session lifecycle
//!
//! Owns the second-party session handle:
//! 1. Establishes it from a custom token and persists it through the store
//! 2. Restores the persisted handle on startup
//! 3. Exposes it synchronously for UI gating
//! 4. Destroys it on sign-out or account deletion
//!
//! Mutations are serialized through one async mutex; reads go through a
//! snapshot lock and never wait on network I/O.

use std::sync::Arc;

use parking_lot::RwLock;
use scoutgate_domain::{AuthError, CustomAuthToken, Result, Session};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::ports::{SessionBackend, SessionStore};

/// Session manager
pub struct SessionManager {
    backend: Arc<dyn SessionBackend>,
    store: Arc<dyn SessionStore>,
    current: RwLock<Option<Session>>,
    mutation: Mutex<()>,
}

impl SessionManager {
    pub fn new(backend: Arc<dyn SessionBackend>, store: Arc<dyn SessionStore>) -> Self {
        Self { backend, store, current: RwLock::new(None), mutation: Mutex::new(()) }
    }

    /// Load the persisted session, if any
    ///
    /// Should be called on app startup. Returns whether a session was
    /// restored.
    ///
    /// # Errors
    /// Returns error if the store cannot be read (not if it is empty)
    pub async fn restore(&self) -> Result<bool> {
        let _guard = self.mutation.lock().await;
        match self.store.load().await? {
            Some(session) => {
                if session.is_expired_at(chrono::Utc::now()) {
                    debug!(uid = %session.uid, "restored session id token has expired");
                }
                info!(uid = %session.uid, "Session restored from store");
                *self.current.write() = Some(session);
                Ok(true)
            }
            None => {
                debug!("No persisted session found");
                Ok(false)
            }
        }
    }

    /// Sign in with `custom_token` and make the result the current session
    ///
    /// A store write failure is logged; the session stays usable for this
    /// process.
    pub async fn establish_session(&self, custom_token: &CustomAuthToken) -> Result<Session> {
        let _guard = self.mutation.lock().await;

        let session = self.backend.sign_in_with_custom_token(custom_token).await?;
        if session.uid != custom_token.subject_id {
            warn!(uid = %session.uid, subject = %custom_token.subject_id, "session uid differs from token subject");
        }

        if let Err(err) = self.store.save(&session).await {
            warn!(error = %err, "Failed to persist session");
        }

        *self.current.write() = Some(session.clone());
        info!(uid = %session.uid, "Session established");
        Ok(session)
    }

    /// Current session snapshot
    pub fn current_session(&self) -> Option<Session> {
        self.current.read().clone()
    }

    /// Uid of the current session
    pub fn current_uid(&self) -> Option<String> {
        self.current.read().as_ref().map(|s| s.uid.clone())
    }

    /// Whether a session is present
    pub fn is_signed_in(&self) -> bool {
        self.current.read().is_some()
    }

    /// Drop the local session; never touches the network
    ///
    /// # Errors
    /// `AuthError::Session` if the persisted handle cannot be removed. The
    /// in-memory session is cleared regardless.
    pub async fn sign_out(&self) -> Result<()> {
        let _guard = self.mutation.lock().await;
        let previous = self.current.write().take();

        self.store
            .clear()
            .await
            .map_err(|e| AuthError::Session(format!("failed to clear persisted session: {e}")))?;

        if let Some(session) = previous {
            info!(uid = %session.uid, "Signed out");
        }
        Ok(())
    }

    /// Delete the remote account, then invalidate the local session
    ///
    /// On failure the current session is left untouched.
    pub async fn delete_account(&self, session: &Session) -> Result<()> {
        let _guard = self.mutation.lock().await;

        self.backend.delete_account(session).await?;

        let was_current = {
            let mut current = self.current.write();
            let matches = current.as_ref().is_some_and(|c| c.uid == session.uid);
            if matches {
                *current = None;
            }
            matches
        };
        if was_current {
            if let Err(err) = self.store.clear().await {
                warn!(error = %err, "Account deleted but persisted session could not be cleared");
            }
        }

        info!(uid = %session.uid, "Account deleted");
        Ok(())
    }
}
