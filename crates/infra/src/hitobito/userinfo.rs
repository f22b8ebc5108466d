use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Method, StatusCode};
use scoutgate_common::auth::IssuerConfiguration;
use scoutgate_core::UserInfoSource;
use scoutgate_domain::{AuthError, ProviderAccessToken, Result, ScoutGateError, UserInfo};
use tracing::debug;

use crate::http::{read_json, HttpClient};

/// Hitobito's user-info path, used when discovery omits the endpoint
const FALLBACK_USERINFO_PATH: &str = "/oauth/userinfo";

/// Fetches the member record with the provider access token
#[derive(Debug, Clone)]
pub struct HitobitoUserInfoClient {
    http: HttpClient,
    issuer: String,
}

impl HitobitoUserInfoClient {
    pub fn new(http: HttpClient, issuer: impl Into<String>) -> Self {
        Self { http, issuer: issuer.into() }
    }

    fn endpoint(&self, issuer: &IssuerConfiguration) -> String {
        issuer.userinfo_endpoint.clone().unwrap_or_else(|| {
            format!("{}{FALLBACK_USERINFO_PATH}", self.issuer.trim_end_matches('/'))
        })
    }
}

#[async_trait]
impl UserInfoSource for HitobitoUserInfoClient {
    async fn fetch_user_info(
        &self,
        issuer: &IssuerConfiguration,
        access_token: &ProviderAccessToken,
    ) -> Result<UserInfo> {
        let endpoint = self.endpoint(issuer);
        let request = self
            .http
            .request(Method::GET, &endpoint)
            .bearer_auth(access_token.expose())
            .header(ACCEPT, "application/json");

        let response = self.http.send(request).await?;
        let status = response.status();

        match status {
            s if s.is_success() => {
                let info: UserInfo = read_json(response, "user-info response").await?;
                debug!(sub = %info.sub, roles = info.roles().count(), "user info received");
                Ok(info)
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AuthError::Provider(format!(
                "user-info endpoint rejected the access token (HTTP {})",
                status.as_u16()
            ))
            .into()),
            _ => Err(ScoutGateError::Network(format!(
                "user-info endpoint returned HTTP {}",
                status.as_u16()
            ))),
        }
    }
}
