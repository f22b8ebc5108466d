//! Custom token exchange with response integrity checks

use std::sync::Arc;

use scoutgate_common::security::constant_time_eq;
use scoutgate_domain::{AuthError, CustomAuthToken, ProviderAccessToken, Result};
use tracing::{debug, warn};

use super::ports::CustomTokenBackend;

/// Client of the trusted token-exchange backend
#[derive(Clone)]
pub struct TokenExchangeClient {
    backend: Arc<dyn CustomTokenBackend>,
}

impl TokenExchangeClient {
    pub fn new(backend: Arc<dyn CustomTokenBackend>) -> Self {
        Self { backend }
    }

    /// Trade the provider access token for a custom token bound to
    /// `subject_id`
    ///
    /// # Errors
    /// - backend errors as returned by the port
    /// - `AuthError::SubjectMismatch` if the backend echoes a different id
    /// - `AuthError::EmptyToken` if the minted token is blank
    pub async fn exchange_for_custom_token(
        &self,
        subject_id: &str,
        access_token: &ProviderAccessToken,
    ) -> Result<CustomAuthToken> {
        let minted = self.backend.mint_custom_token(subject_id, access_token).await?;

        if !constant_time_eq(minted.user_id.as_bytes(), subject_id.as_bytes()) {
            warn!(expected = %subject_id, echoed = %minted.user_id, "custom token bound to another subject");
            return Err(AuthError::SubjectMismatch.into());
        }
        if minted.token.is_blank() {
            return Err(AuthError::EmptyToken.into());
        }

        debug!(subject = %subject_id, "custom token issued");
        Ok(CustomAuthToken { subject_id: subject_id.to_string(), token: minted.token })
    }
}
