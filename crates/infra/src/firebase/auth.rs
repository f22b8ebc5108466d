use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use reqwest::{Method, Response};
use scoutgate_common::SecretString;
use scoutgate_core::SessionBackend;
use scoutgate_domain::{AuthError, CustomAuthToken, Result, ScoutGateError, Session};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::classify_failure;
use crate::errors::InfraError;
use crate::http::HttpClient;

/// Identity Toolkit REST client (Firebase Authentication)
#[derive(Debug, Clone)]
pub struct FirebaseAuthBackend {
    http: HttpClient,
    base_url: String,
    api_key: SecretString,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInRequest<'a> {
    token: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    id_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    /// Seconds, as a decimal string
    #[serde(default)]
    expires_in: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteRequest<'a> {
    id_token: &'a str,
}

impl FirebaseAuthBackend {
    pub fn new(http: HttpClient, base_url: impl Into<String>, api_key: SecretString) -> Self {
        Self { http, base_url: base_url.into(), api_key }
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/accounts:{method}", self.base_url.trim_end_matches('/'))
    }

    async fn post<T: Serialize + Sync>(&self, method: &str, body: &T) -> Result<Response> {
        let request = self
            .http
            .request(Method::POST, self.endpoint(method))
            .query(&[("key", self.api_key.expose())])
            .json(body);
        self.http.send(request).await
    }
}

async fn failure(response: Response) -> ScoutGateError {
    let status = response.status();
    match response.bytes().await {
        Ok(body) => classify_failure("identity toolkit", status, &body, AuthError::Session),
        Err(err) => InfraError::from(err).into(),
    }
}

/// Read the Firebase uid from an ID token's payload (`user_id`, else `sub`)
///
/// The token is not verified here; it was just issued to us over TLS.
///
/// # Errors
/// Returns `ScoutGateError::Decode` if the token is not a JWT or has no subject.
pub fn uid_from_id_token(id_token: &str) -> Result<String> {
    let parts: Vec<&str> = id_token.split('.').collect();
    if parts.len() != 3 {
        return Err(ScoutGateError::Decode("invalid ID token format".into()));
    }

    let payload_bytes = URL_SAFE_NO_PAD.decode(parts[1]).map_err(|err| {
        ScoutGateError::Decode(format!("failed to decode ID token payload: {err}"))
    })?;

    let payload: serde_json::Value = serde_json::from_slice(&payload_bytes).map_err(|err| {
        ScoutGateError::Decode(format!("failed to parse ID token payload: {err}"))
    })?;

    ["user_id", "sub"]
        .iter()
        .find_map(|claim| payload.get(*claim).and_then(|value| value.as_str()))
        .filter(|uid| !uid.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ScoutGateError::Decode("subject claim missing from ID token".into()))
}

#[async_trait]
impl SessionBackend for FirebaseAuthBackend {
    async fn sign_in_with_custom_token(&self, token: &CustomAuthToken) -> Result<Session> {
        let body = SignInRequest { token: token.token.expose(), return_secure_token: true };
        let response = self.post("signInWithCustomToken", &body).await?;
        if !response.status().is_success() {
            return Err(failure(response).await);
        }

        let bytes =
            response.bytes().await.map_err(|err| ScoutGateError::from(InfraError::from(err)))?;
        let parsed: SignInResponse = serde_json::from_slice(&bytes)
            .map_err(|e| ScoutGateError::Decode(format!("sign-in response: {e}")))?;

        let uid = uid_from_id_token(&parsed.id_token)?;
        let now = Utc::now();
        let expires_at = parsed
            .expires_in
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .map(|secs| now + Duration::seconds(secs));

        debug!(uid = %uid, expires_at = ?expires_at, "custom token accepted");
        Ok(Session {
            uid,
            id_token: SecretString::new(parsed.id_token),
            refresh_token: parsed.refresh_token.map(SecretString::new),
            expires_at,
            established_at: now,
        })
    }

    async fn delete_account(&self, session: &Session) -> Result<()> {
        let body = DeleteRequest { id_token: session.id_token.expose() };
        let response = self.post("delete", &body).await?;
        if !response.status().is_success() {
            return Err(failure(response).await);
        }

        info!(uid = %session.uid, "Firebase account deleted");
        Ok(())
    }
}
