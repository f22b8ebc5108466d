//! Federated login pipeline
//!
//! Services are leaf-first:
//! - [`validator`]: access token extraction and user-info retrieval
//! - [`policy`]: group-membership authorization
//! - [`exchange`]: custom token exchange with integrity checks
//! - [`session`]: session lifecycle
//! - [`orchestrator`]: the login state machine tying them together

pub mod exchange;
pub mod orchestrator;
pub mod policy;
pub mod ports;
pub mod session;
pub mod validator;

pub use exchange::TokenExchangeClient;
pub use orchestrator::AuthOrchestrator;
pub use policy::AuthorizationPolicy;
pub use ports::{
    CustomTokenBackend, IdentityProvider, MintedToken, PresentationContext, SessionBackend,
    SessionStore, UserInfoSource,
};
pub use session::SessionManager;
pub use validator::{extract_access_token, AccessTokenValidator};
