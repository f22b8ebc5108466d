//! # ScoutGate Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - Hitobito OIDC provider and user-info adapters
//! - Firebase callable function, Identity Toolkit and Firestore clients
//! - Keychain and in-memory session stores
//! - Loopback callback server and system browser presentation
//! - Shared HTTP client, configuration loader and error conversions
//!
//! ## Architecture
//! - Implements traits defined in `scoutgate-core`
//! - Depends on `scoutgate-common`, `scoutgate-domain` and `scoutgate-core`
//! - Contains all "impure" code (network, keychain, processes)

pub mod config;
pub mod errors;
pub mod firebase;
pub mod hitobito;
pub mod http;
pub mod redirect;
pub mod session;

// Re-export commonly used items
pub use errors::InfraError;
pub use firebase::{CallableTokenExchange, FirebaseAuthBackend, FirestoreProfileProvisioner};
pub use hitobito::{HitobitoIdentityProvider, HitobitoUserInfoClient};
pub use http::HttpClient;
pub use redirect::{LoopbackCallbackServer, SystemBrowser};
pub use session::{KeyringSessionStore, MemorySessionStore};
