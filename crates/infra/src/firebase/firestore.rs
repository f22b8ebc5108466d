use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Method, Response, StatusCode};
use scoutgate_core::ProfileProvisioner;
use scoutgate_domain::constants::USERS_COLLECTION;
use scoutgate_domain::{AuthError, Result, ScoutGateError, Session, UserProfile};
use serde_json::{json, Map, Value};
use tracing::{debug, info};
use url::Url;

use super::{classify_failure, parse_google_error};
use crate::errors::InfraError;
use crate::http::HttpClient;

/// Fields rewritten on every login; `createdAt` is only written on creation
const UPDATED_FIELDS: [&str; 7] =
    ["uid", "firstName", "lastName", "nickname", "email", "primaryGroupId", "updatedAt"];

/// Writes the initial `users/{uid}` document through the Firestore REST API
///
/// The first login creates the document; later logins refresh the profile
/// fields and leave `createdAt` and any app-managed fields untouched.
#[derive(Debug, Clone)]
pub struct FirestoreProfileProvisioner {
    http: HttpClient,
    base_url: String,
    project_id: String,
}

impl FirestoreProfileProvisioner {
    pub fn new(http: HttpClient, base_url: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self { http, base_url: base_url.into(), project_id: project_id.into() }
    }

    fn document_url(&self, uid: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ScoutGateError::Config(format!("invalid Firestore URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| ScoutGateError::Config("Firestore URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend([
                "projects",
                self.project_id.as_str(),
                "databases",
                "(default)",
                "documents",
                USERS_COLLECTION,
                uid,
            ]);
        Ok(url)
    }

    async fn patch(&self, session: &Session, url: Url, fields: Value) -> Result<Response> {
        let request = self
            .http
            .request(Method::PATCH, url)
            .bearer_auth(session.id_token.expose())
            .json(&json!({ "fields": fields }));
        self.http.send(request).await
    }
}

fn string_value(value: Option<&str>) -> Value {
    value.map_or_else(|| json!({ "nullValue": null }), |s| json!({ "stringValue": s }))
}

fn timestamp_value(value: DateTime<Utc>) -> Value {
    json!({ "timestampValue": value.to_rfc3339_opts(SecondsFormat::Millis, true) })
}

/// Firestore typed-value encoding of a profile
fn profile_fields(profile: &UserProfile) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert("uid".into(), string_value(Some(&profile.uid)));
    fields.insert("firstName".into(), string_value(profile.first_name.as_deref()));
    fields.insert("lastName".into(), string_value(profile.last_name.as_deref()));
    fields.insert("nickname".into(), string_value(profile.nickname.as_deref()));
    fields.insert("email".into(), string_value(profile.email.as_deref()));
    fields.insert(
        "primaryGroupId".into(),
        profile.primary_group_id.map_or_else(
            || json!({ "nullValue": null }),
            // int64 travels as a decimal string
            |id| json!({ "integerValue": id.to_string() }),
        ),
    );
    fields.insert("createdAt".into(), timestamp_value(profile.created_at));
    fields.insert("updatedAt".into(), timestamp_value(profile.updated_at));
    fields
}

fn already_exists(status: StatusCode, body: &[u8]) -> bool {
    if status == StatusCode::CONFLICT {
        return true;
    }
    status == StatusCode::BAD_REQUEST
        && parse_google_error(body)
            .and_then(|e| e.status)
            .is_some_and(|s| s == "FAILED_PRECONDITION" || s == "ALREADY_EXISTS")
}

async fn body_of(response: Response) -> Result<(StatusCode, Vec<u8>)> {
    let status = response.status();
    let body =
        response.bytes().await.map_err(|err| ScoutGateError::from(InfraError::from(err)))?;
    Ok((status, body.to_vec()))
}

#[async_trait]
impl ProfileProvisioner for FirestoreProfileProvisioner {
    async fn provision(&self, session: &Session, profile: &UserProfile) -> Result<()> {
        let fields = profile_fields(profile);

        let mut create_url = self.document_url(&profile.uid)?;
        create_url.query_pairs_mut().append_pair("currentDocument.exists", "false");
        let response = self.patch(session, create_url, Value::Object(fields.clone())).await?;
        let (status, body) = body_of(response).await?;

        if status.is_success() {
            info!(uid = %profile.uid, "user profile created");
            return Ok(());
        }
        if !already_exists(status, &body) {
            return Err(classify_failure("firestore", status, &body, AuthError::Provider));
        }

        debug!(uid = %profile.uid, "user profile exists, refreshing fields");
        let mut update_url = self.document_url(&profile.uid)?;
        {
            let mut query = update_url.query_pairs_mut();
            for field in UPDATED_FIELDS {
                query.append_pair("updateMask.fieldPaths", field);
            }
        }
        let updated: Map<String, Value> = fields
            .into_iter()
            .filter(|(name, _)| UPDATED_FIELDS.contains(&name.as_str()))
            .collect();

        let response = self.patch(session, update_url, Value::Object(updated)).await?;
        let (status, body) = body_of(response).await?;
        if !status.is_success() {
            return Err(classify_failure("firestore", status, &body, AuthError::Provider));
        }

        info!(uid = %profile.uid, "user profile updated");
        Ok(())
    }
}
