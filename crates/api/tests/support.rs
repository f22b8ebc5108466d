//! Shared fixtures for app integration tests
#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use scoutgate_app::AppContext;
use scoutgate_core::PresentationContext;
use scoutgate_domain::{
    AppConfig, AuthorizationConfig, BackendConfig, HttpConfig, OAuthSettings, Result,
    SessionConfig, SessionStoreKind,
};
use scoutgate_infra::MemorySessionStore;
use serde_json::{json, Value};
use tokio::sync::Notify;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const REDIRECT_URI: &str = "scoutgate://oauth/callback";
pub const AUTH_CODE: &str = "hitobito-auth-code";
pub const ACCESS_TOKEN: &str = "hitobito-access-token";
pub const SUBJECT: &str = "4242";
pub const REQUIRED_GROUP: i64 = 1244;
pub const PROJECT_ID: &str = "scoutgate-test";
pub const EXCHANGE_PATH: &str = "/getFirebaseAuthToken";
pub const SIGN_IN_PATH: &str = "/accounts:signInWithCustomToken";
pub const DELETE_PATH: &str = "/accounts:delete";
pub const DOCUMENT_PATH: &str = "/projects/scoutgate-test/databases/(default)/documents/users/4242";

/// Configuration pointing every endpoint at `server`, memory-backed session
pub fn config_for(server: &MockServer) -> AppConfig {
    let base = server.uri();
    AppConfig {
        oauth: OAuthSettings {
            issuer: base.clone(),
            client_id: "scoutgate-test-client".to_string(),
            redirect_uri: REDIRECT_URI.to_string(),
            scopes: vec!["openid".to_string(), "with_roles".to_string()],
        },
        backend: BackendConfig {
            project_id: PROJECT_ID.to_string(),
            api_key: "firebase-web-key".to_string(),
            functions_region: "europe-west6".to_string(),
            functions_base_url: Some(base.clone()),
            exchange_function: EXCHANGE_PATH.trim_start_matches('/').to_string(),
            identity_toolkit_url: base.clone(),
            firestore_url: base,
        },
        authorization: AuthorizationConfig { required_group_id: REQUIRED_GROUP },
        session: SessionConfig {
            store: SessionStoreKind::Memory,
            redirect_timeout_seconds: 5,
            ..SessionConfig::default()
        },
        http: HttpConfig { timeout_seconds: 5, max_attempts: 1 },
    }
}

/// Context over `server` with a fresh in-memory store
pub fn context_for(server: &MockServer) -> AppContext {
    AppContext::with_session_store(config_for(server), Arc::new(MemorySessionStore::new()))
        .expect("context should wire")
}

/// Hitobito user-info body with one role per group
pub fn member_json(groups: &[i64]) -> Value {
    let roles: Vec<Value> = groups
        .iter()
        .map(|group| json!({ "group_id": group, "group_name": "Pfadi", "role_name": "Leitung" }))
        .collect();

    json!({
        "sub": SUBJECT,
        "email": "fuchs@example.ch",
        "first_name": "Anna",
        "last_name": "Muster",
        "nickname": "Fuchs",
        "roles": roles
    })
}

pub fn id_token_for(uid: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(json!({ "user_id": uid }).to_string());
    format!("{header}.{payload}.signature")
}

/// Mount the whole pipeline: issuer, user-info for `groups`, token
/// exchange, Firebase sign-in and the Firestore profile write
pub async fn mount_pipeline(server: &MockServer, groups: &[i64]) {
    let issuer = server.uri();
    Mock::given(method("GET"))
        .and(path("/.well-known/openid-configuration"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "issuer": issuer,
            "authorization_endpoint": format!("{issuer}/oauth/authorize"),
            "token_endpoint": format!("{issuer}/oauth/token"),
            "userinfo_endpoint": format!("{issuer}/oauth/userinfo"),
            "code_challenge_methods_supported": ["S256"]
        })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": ACCESS_TOKEN,
            "token_type": "Bearer",
            "expires_in": 7200
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/oauth/userinfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(member_json(groups)))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path(EXCHANGE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": { "userId": SUBJECT, "firebaseAuthToken": "firebase-custom-token" }
        })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path(SIGN_IN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "idToken": id_token_for(SUBJECT),
            "refreshToken": "firebase-refresh",
            "expiresIn": "3600"
        })))
        .mount(server)
        .await;

    Mock::given(method("PATCH"))
        .and(path(DOCUMENT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(server)
        .await;
}

/// Number of requests `server` received on `request_path`
pub async fn hits(server: &MockServer, request_path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == request_path)
        .count()
}

fn state_of(url: &Url) -> String {
    url.query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.into_owned())
        .unwrap_or_default()
}

/// How the test user agent reacts to the authorization page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    Approve,
    Deny,
    Ignore,
}

/// User agent that answers through the deep-link command
pub struct DeepLinkBrowser {
    ctx: Arc<AppContext>,
    reaction: Reaction,
    /// Signalled once the authorization page is shown
    pub presented: Arc<Notify>,
}

impl DeepLinkBrowser {
    pub fn new(ctx: &Arc<AppContext>, reaction: Reaction) -> Self {
        Self { ctx: Arc::clone(ctx), reaction, presented: Arc::new(Notify::new()) }
    }
}

#[async_trait]
impl PresentationContext for DeepLinkBrowser {
    fn is_available(&self) -> bool {
        true
    }

    async fn present(&self, url: &Url) -> Result<()> {
        self.presented.notify_one();
        let state = state_of(url);
        let callback = match self.reaction {
            Reaction::Approve => format!("{REDIRECT_URI}?code={AUTH_CODE}&state={state}"),
            Reaction::Deny => format!("{REDIRECT_URI}?error=access_denied&state={state}"),
            Reaction::Ignore => return Ok(()),
        };
        assert!(scoutgate_app::handle_deep_link(&self.ctx, &callback));
        Ok(())
    }
}

/// Port that was free a moment ago
pub fn free_loopback_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    listener.local_addr().expect("local addr").port()
}
