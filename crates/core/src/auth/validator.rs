//! Access token extraction and user-info retrieval

use std::sync::Arc;

use scoutgate_common::auth::{IssuerConfiguration, TokenResponse};
use scoutgate_domain::{AuthError, ProviderAccessToken, Result, UserInfo};
use tracing::debug;

use super::ports::UserInfoSource;

/// Pull the provider access token out of a token response
///
/// # Errors
/// `AuthError::NoAccessToken` if the token is absent or blank.
pub fn extract_access_token(response: &TokenResponse) -> Result<ProviderAccessToken> {
    match &response.access_token {
        Some(token) if !token.is_blank() => Ok(ProviderAccessToken::new(token.clone())),
        _ => Err(AuthError::NoAccessToken.into()),
    }
}

/// Validates provider tokens and resolves the identity behind them
#[derive(Clone)]
pub struct AccessTokenValidator {
    source: Arc<dyn UserInfoSource>,
}

impl AccessTokenValidator {
    pub fn new(source: Arc<dyn UserInfoSource>) -> Self {
        Self { source }
    }

    /// See [`extract_access_token`]
    pub fn extract_access_token(&self, response: &TokenResponse) -> Result<ProviderAccessToken> {
        extract_access_token(response)
    }

    /// Fetch the claims for `access_token`
    pub async fn fetch_user_info(
        &self,
        issuer: &IssuerConfiguration,
        access_token: &ProviderAccessToken,
    ) -> Result<UserInfo> {
        let info = self.source.fetch_user_info(issuer, access_token).await?;
        debug!(subject = %info.sub, roles = info.roles().count(), "user info resolved");
        Ok(info)
    }
}
