use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use scoutgate_common::SecretString;
use scoutgate_core::{CustomTokenBackend, MintedToken};
use scoutgate_domain::{AuthError, ProviderAccessToken, Result, ScoutGateError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{classify_failure, GoogleError};
use crate::errors::InfraError;
use crate::http::HttpClient;

/// Client for the token-exchange callable function
///
/// Speaks the callable protocol: the payload is wrapped in `data`, the
/// function answers with `result` or `error`.
#[derive(Debug, Clone)]
pub struct CallableTokenExchange {
    http: HttpClient,
    url: String,
}

#[derive(Serialize)]
struct CallableRequest<T> {
    data: T,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExchangeRequest<'a> {
    user_id: &'a str,
    hitobito_access_token: &'a str,
}

#[derive(Deserialize)]
struct CallableResponse {
    #[serde(default)]
    result: Option<ExchangeResult>,
    #[serde(default)]
    error: Option<GoogleError>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExchangeResult {
    #[serde(default)]
    user_id: Value,
    // Missing and blank tokens are rejected by the exchange client
    #[serde(default)]
    firebase_auth_token: Option<String>,
}

impl CallableTokenExchange {
    pub fn new(http: HttpClient, url: impl Into<String>) -> Self {
        Self { http, url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

fn echoed_user_id(value: Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Err(ScoutGateError::Decode("exchange result has no userId".to_string())),
        other => Err(ScoutGateError::Decode(format!("exchange result userId has type {other}"))),
    }
}

#[async_trait]
impl CustomTokenBackend for CallableTokenExchange {
    async fn mint_custom_token(
        &self,
        subject_id: &str,
        access_token: &ProviderAccessToken,
    ) -> Result<MintedToken> {
        let payload = CallableRequest {
            data: ExchangeRequest { user_id: subject_id, hitobito_access_token: access_token.expose() },
        };
        let request = self
            .http
            .request(Method::POST, &self.url)
            .header(CONTENT_TYPE, "application/json")
            .json(&payload);

        let response = self.http.send(request).await?;
        let status = response.status();
        let body =
            response.bytes().await.map_err(|err| ScoutGateError::from(InfraError::from(err)))?;

        if !status.is_success() {
            return Err(classify_failure("token exchange", status, &body, AuthError::Provider));
        }

        let parsed: CallableResponse = serde_json::from_slice(&body)
            .map_err(|e| ScoutGateError::Decode(format!("exchange response: {e}")))?;

        if let Some(error) = parsed.error {
            return Err(AuthError::Provider(error.describe()).into());
        }
        let result = parsed
            .result
            .ok_or_else(|| ScoutGateError::Decode("exchange response has no result".to_string()))?;

        debug!(subject = subject_id, "custom token minted");
        Ok(MintedToken {
            user_id: echoed_user_id(result.user_id)?,
            token: SecretString::new(result.firebase_auth_token.unwrap_or_default()),
        })
    }
}
