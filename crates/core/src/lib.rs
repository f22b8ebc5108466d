//! # ScoutGate Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port/adapter interfaces (traits) for the identity provider, trusted
//!   backend, session backend and stores
//! - The login services and the orchestrating state machine
//!
//! ## Architecture Principles
//! - Only depends on `scoutgate-common` and `scoutgate-domain`
//! - No HTTP, keychain, or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod auth;
pub mod user;

pub use auth::{
    AccessTokenValidator, AuthOrchestrator, AuthorizationPolicy, CustomTokenBackend,
    IdentityProvider, MintedToken, PresentationContext, SessionBackend, SessionManager,
    SessionStore, TokenExchangeClient, UserInfoSource,
};
pub use user::ports::ProfileProvisioner;
