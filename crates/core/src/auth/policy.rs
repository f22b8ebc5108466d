//! Group-membership authorization policy

use std::collections::HashSet;

use scoutgate_domain::constants::{DEFAULT_REQUIRED_GROUP_ID, NOT_AUTHORIZED_MESSAGE};
use scoutgate_domain::{AuthorizationDecision, UserInfo};

/// Decide whether `user_info` may use the application
///
/// Allowed iff any non-null role carries `required_group_id`. An absent
/// roles list, null entries and null group ids contribute nothing.
pub fn evaluate(user_info: &UserInfo, required_group_id: i64) -> AuthorizationDecision {
    let groups: HashSet<i64> = user_info.group_ids().collect();
    if groups.contains(&required_group_id) {
        AuthorizationDecision::allow()
    } else {
        AuthorizationDecision::deny(NOT_AUTHORIZED_MESSAGE)
    }
}

/// Authorization policy bound to the configured group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthorizationPolicy {
    required_group_id: i64,
}

impl AuthorizationPolicy {
    #[must_use]
    pub const fn new(required_group_id: i64) -> Self {
        Self { required_group_id }
    }

    #[must_use]
    pub const fn required_group_id(&self) -> i64 {
        self.required_group_id
    }

    #[must_use]
    pub fn evaluate(&self, user_info: &UserInfo) -> AuthorizationDecision {
        evaluate(user_info, self.required_group_id)
    }
}

impl Default for AuthorizationPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_REQUIRED_GROUP_ID)
    }
}
