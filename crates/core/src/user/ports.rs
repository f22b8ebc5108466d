//! Port interfaces for user profile provisioning
//!
//! These traits define the boundaries between core business logic
//! and infrastructure implementations for user profile operations.

use async_trait::async_trait;
use scoutgate_domain::{Result, Session, UserProfile};

/// Writes the initial user profile for a freshly established session
#[async_trait]
pub trait ProfileProvisioner: Send + Sync {
    /// Create or update the profile document owned by `session`
    async fn provision(&self, session: &Session, profile: &UserProfile) -> Result<()>;
}
