//! Domain types

pub mod auth_state;
pub mod identity;
pub mod session;

pub use auth_state::{AuthState, AuthStage, AuthorizationDecision, FailureKind, FailureReason};
pub use identity::{CustomAuthToken, HitobitoRole, ProviderAccessToken, UserInfo};
pub use session::{Session, UserProfile};
