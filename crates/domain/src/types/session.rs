//! Second-party session and user profile types

use std::fmt;

use chrono::{DateTime, Utc};
use scoutgate_common::SecretString;
use serde::{Deserialize, Serialize};

use super::identity::UserInfo;

/// Authenticated second-party session handle
///
/// Owned by the session manager. Destroyed on sign-out or account deletion.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    /// Second-party user id (equals the provider subject id for custom-token
    /// sign-ins)
    pub uid: String,
    pub id_token: SecretString,
    pub refresh_token: Option<SecretString>,
    pub expires_at: Option<DateTime<Utc>>,
    pub established_at: DateTime<Utc>,
}

impl Session {
    /// Whether the id token has expired at `now`
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("uid", &self.uid)
            .field("id_token", &"***")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "***"))
            .field("expires_at", &self.expires_at)
            .field("established_at", &self.established_at)
            .finish()
    }
}

/// Initial user profile written after the first successful login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub nickname: Option<String>,
    pub email: Option<String>,
    pub primary_group_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// Project provider claims onto the profile document
    #[must_use]
    pub fn from_user_info(uid: impl Into<String>, info: &UserInfo, now: DateTime<Utc>) -> Self {
        Self {
            uid: uid.into(),
            first_name: info.first_name.clone(),
            last_name: info.last_name.clone(),
            nickname: info.nickname.clone(),
            email: info.email.clone(),
            primary_group_id: info.primary_group_id,
            created_at: now,
            updated_at: now,
        }
    }
}
