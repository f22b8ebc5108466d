//! External identity types
//!
//! Claims returned by the Hitobito user-info endpoint and the bearer tokens
//! that flow through a single login attempt.

use std::fmt;

use scoutgate_common::SecretString;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Provider access token
///
/// Used once to fetch user info and once to request the custom token. Never
/// persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderAccessToken(SecretString);

impl ProviderAccessToken {
    pub fn new(token: impl Into<SecretString>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        self.0.expose()
    }
}

impl fmt::Debug for ProviderAccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ProviderAccessToken(***)")
    }
}

/// Custom authentication token minted by the trusted backend
///
/// Bound to the subject id it was requested for.
#[derive(Clone, PartialEq, Eq)]
pub struct CustomAuthToken {
    pub subject_id: String,
    pub token: SecretString,
}

impl fmt::Debug for CustomAuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomAuthToken")
            .field("subject_id", &self.subject_id)
            .field("token", &"***")
            .finish()
    }
}

/// User-info claims from the identity provider
///
/// Only the subject id is mandatory. Field names follow the provider's
/// snake_case JSON; camelCase aliases are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(deserialize_with = "deserialize_subject")]
    pub sub: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub email: Option<String>,
    #[serde(default, alias = "firstName", deserialize_with = "lenient_text")]
    pub first_name: Option<String>,
    #[serde(default, alias = "lastName", deserialize_with = "lenient_text")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub nickname: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub address: Option<String>,
    #[serde(default, alias = "zipCode", deserialize_with = "lenient_text")]
    pub zip_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub town: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub birthday: Option<String>,
    #[serde(default, alias = "primaryGroupId", deserialize_with = "lenient_id")]
    pub primary_group_id: Option<i64>,
    /// Absent list, null entries and entries that are not role objects all
    /// mean "no role"
    #[serde(default, deserialize_with = "lenient_roles")]
    pub roles: Option<Vec<Option<HitobitoRole>>>,
}

impl UserInfo {
    /// Minimal user info with only a subject id
    #[must_use]
    pub fn new(sub: impl Into<String>) -> Self {
        Self {
            sub: sub.into(),
            email: None,
            first_name: None,
            last_name: None,
            nickname: None,
            address: None,
            zip_code: None,
            town: None,
            country: None,
            birthday: None,
            primary_group_id: None,
            roles: None,
        }
    }

    /// Builder-style helper to attach roles
    #[must_use]
    pub fn with_roles(mut self, roles: Vec<Option<HitobitoRole>>) -> Self {
        self.roles = Some(roles);
        self
    }

    /// All non-null roles
    pub fn roles(&self) -> impl Iterator<Item = &HitobitoRole> {
        self.roles.iter().flatten().flatten()
    }

    /// Non-null group ids across all roles
    pub fn group_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.roles().filter_map(|role| role.group_id)
    }

    /// Best-effort display name: nickname, then first + last name
    #[must_use]
    pub fn display_name(&self) -> Option<String> {
        if let Some(nick) = self.nickname.as_deref().filter(|n| !n.trim().is_empty()) {
            return Some(nick.to_string());
        }
        let full = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        (!full.is_empty()).then_some(full)
    }
}

/// One group membership role
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitobitoRole {
    #[serde(default, alias = "groupId", deserialize_with = "lenient_id")]
    pub group_id: Option<i64>,
    #[serde(default, alias = "groupName", deserialize_with = "lenient_text")]
    pub group_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub role: Option<String>,
    #[serde(default, alias = "roleClass", deserialize_with = "lenient_text")]
    pub role_class: Option<String>,
    #[serde(default, alias = "roleName", deserialize_with = "lenient_text")]
    pub role_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text_list")]
    pub permissions: Option<Vec<String>>,
}

impl HitobitoRole {
    /// Role in the given group, all other fields empty
    #[must_use]
    pub fn in_group(group_id: i64) -> Self {
        Self { group_id: Some(group_id), ..Self::default() }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(i64),
    Text(String),
}

fn deserialize_subject<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let subject = match RawId::deserialize(deserializer)? {
        RawId::Number(n) => n.to_string(),
        RawId::Text(s) => s.trim().to_string(),
    };
    if subject.is_empty() {
        return Err(serde::de::Error::custom("subject id is empty"));
    }
    Ok(subject)
}

// Optional claims never fail the whole document: a value of the wrong type
// reads as absent.

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_text_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    })
}

// Group ids arrive as numbers or numeric strings depending on provider version.
fn lenient_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_roles<'de, D>(deserializer: D) -> Result<Option<Vec<Option<HitobitoRole>>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => Some(
            items
                .into_iter()
                .map(|item| match item {
                    Value::Object(_) => HitobitoRole::deserialize(item).ok(),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    })
}
