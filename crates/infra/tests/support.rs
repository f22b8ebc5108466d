//! Shared fixtures for infra integration tests
#![allow(dead_code)]

use std::net::TcpListener;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use parking_lot::Mutex;
use scoutgate_common::auth::RedirectCoordinator;
use scoutgate_core::PresentationContext;
use scoutgate_domain::{OAuthSettings, Result};
use scoutgate_infra::HttpClient;
use serde_json::{json, Value};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const CLIENT_ID: &str = "scoutgate-test-client";
pub const REDIRECT_URI: &str = "scoutgate://oauth/callback";
pub const AUTH_CODE: &str = "hitobito-auth-code";
pub const ACCESS_TOKEN: &str = "hitobito-access-token";
pub const SUBJECT: &str = "4242";
pub const REQUIRED_GROUP: i64 = 1244;
pub const API_KEY: &str = "firebase-web-key";
pub const PROJECT_ID: &str = "scoutgate-test";

pub fn http() -> HttpClient {
    HttpClient::builder().timeout(Duration::from_secs(5)).build().expect("http client")
}

pub fn oauth_settings(issuer: &str, redirect_uri: &str) -> OAuthSettings {
    OAuthSettings {
        issuer: issuer.to_string(),
        client_id: CLIENT_ID.to_string(),
        redirect_uri: redirect_uri.to_string(),
        scopes: vec!["openid".to_string(), "name".to_string(), "with_roles".to_string()],
    }
}

pub fn discovery_document(issuer: &str) -> Value {
    json!({
        "issuer": issuer,
        "authorization_endpoint": format!("{issuer}/oauth/authorize"),
        "token_endpoint": format!("{issuer}/oauth/token"),
        "userinfo_endpoint": format!("{issuer}/oauth/userinfo"),
        "response_types_supported": ["code"],
        "grant_types_supported": ["authorization_code", "refresh_token"],
        "code_challenge_methods_supported": ["S256"]
    })
}

/// Mount discovery and a token endpoint that issues `ACCESS_TOKEN`
pub async fn mount_issuer(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/.well-known/openid-configuration"))
        .respond_with(ResponseTemplate::new(200).set_body_json(discovery_document(&server.uri())))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": ACCESS_TOKEN,
            "token_type": "Bearer",
            "expires_in": 7200,
            "scope": "openid name with_roles"
        })))
        .mount(server)
        .await;
}

/// Hitobito user-info body with one role per group
pub fn member_json(groups: &[i64]) -> Value {
    let roles: Vec<Value> = groups
        .iter()
        .map(|group| {
            json!({
                "group_id": group,
                "group_name": format!("Abteilung {group}"),
                "role_name": "Leitung",
                "role_class": "Group::Abteilung::Abteilungsleitung",
                "permissions": ["group_full"]
            })
        })
        .collect();

    json!({
        "sub": SUBJECT.parse::<i64>().unwrap(),
        "email": "fuchs@example.ch",
        "first_name": "Anna",
        "last_name": "Muster",
        "nickname": "Fuchs",
        "primary_group_id": groups.first(),
        "roles": roles
    })
}

/// Unsigned JWT carrying `uid` the way Firebase ID tokens do
pub fn id_token_for(uid: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(json!({ "user_id": uid, "sub": uid }).to_string());
    format!("{header}.{payload}.signature")
}

/// Port that was free a moment ago
pub fn free_loopback_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    listener.local_addr().expect("local addr").port()
}

pub fn state_of(url: &Url) -> String {
    url.query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.into_owned())
        .unwrap_or_default()
}

/// User agent that approves immediately by delivering the callback
pub struct ApprovingPresentation {
    coordinator: RedirectCoordinator,
    pub presented: Mutex<Vec<Url>>,
}

impl ApprovingPresentation {
    pub fn new(coordinator: RedirectCoordinator) -> Self {
        Self { coordinator, presented: Mutex::new(Vec::new()) }
    }

    pub fn last_presented(&self) -> Option<Url> {
        self.presented.lock().last().cloned()
    }
}

#[async_trait]
impl PresentationContext for ApprovingPresentation {
    fn is_available(&self) -> bool {
        true
    }

    async fn present(&self, url: &Url) -> Result<()> {
        self.presented.lock().push(url.clone());
        let callback = format!(
            "{}?code={AUTH_CODE}&state={}",
            self.coordinator.redirect_uri(),
            state_of(url)
        );
        assert!(self.coordinator.resume(&callback), "callback should be accepted");
        Ok(())
    }
}
