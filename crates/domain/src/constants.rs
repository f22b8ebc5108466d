//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Authorization
pub const DEFAULT_REQUIRED_GROUP_ID: i64 = 1244;
pub const NOT_AUTHORIZED_MESSAGE: &str = "You are not a member of the required group. \
     Please contact an administrator to request access.";

// Identity provider
pub const DEFAULT_ISSUER: &str = "https://db.scout.ch";
pub const DEFAULT_REDIRECT_URI: &str = "scoutgate://oauth/callback";
pub const DEFAULT_SCOPES: &[&str] = &["openid", "email", "name", "with_roles"];

// Redirect
pub const DEFAULT_REDIRECT_TIMEOUT_SECS: u64 = 300;

// Trusted backend
pub const DEFAULT_FUNCTIONS_REGION: &str = "europe-west6";
pub const DEFAULT_EXCHANGE_FUNCTION: &str = "getFirebaseAuthToken";
pub const DEFAULT_IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1";
pub const DEFAULT_FIRESTORE_URL: &str = "https://firestore.googleapis.com/v1";
pub const USERS_COLLECTION: &str = "users";

// Session persistence
pub const DEFAULT_KEYRING_SERVICE: &str = "scoutgate";
pub const KEYRING_SESSION_ACCOUNT: &str = "firebase-session";

// HTTP
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_HTTP_MAX_ATTEMPTS: u32 = 1;

// User-facing messages
pub const CANCELLED_MESSAGE: &str = "Login cancelled.";
pub const GENERIC_FAILURE_MESSAGE: &str = "Login failed. Please try again.";
pub const NETWORK_FAILURE_MESSAGE: &str =
    "Could not reach the server. Check your connection and try again.";
