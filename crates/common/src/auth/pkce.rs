//! PKCE (Proof Key for Code Exchange) implementation for OAuth 2.0
//!
//! Implements RFC 7636 for public clients that cannot hold a client secret.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::security::{constant_time_eq, SecretString};

/// Generate a cryptographically secure code verifier
///
/// 32 random bytes, base64url encoded without padding (43 characters, inside
/// the RFC 7636 43-128 range).
pub fn generate_code_verifier() -> String {
    random_urlsafe(32)
}

/// Derive the S256 code challenge: BASE64URL(SHA256(ASCII(code_verifier)))
pub fn code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Generate a random state token for CSRF protection
pub fn generate_state() -> String {
    random_urlsafe(32)
}

/// Compare the state sent in the authorization request with the one received
/// in the callback, in constant time
pub fn validate_state(expected: &str, actual: &str) -> bool {
    constant_time_eq(expected.as_bytes(), actual.as_bytes())
}

fn random_urlsafe(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// PKCE material for one authorization attempt
///
/// The verifier stays in memory until code redemption; the challenge and
/// state travel in the authorization URL.
#[derive(Debug, Clone)]
pub struct PkceChallenge {
    pub code_verifier: SecretString,
    pub code_challenge: String,
    pub state: String,
}

impl PkceChallenge {
    /// Generate fresh verifier, challenge, and state
    #[must_use]
    pub fn generate() -> Self {
        let verifier = generate_code_verifier();
        let challenge = code_challenge(&verifier);
        Self { code_verifier: SecretString::new(verifier), code_challenge: challenge, state: generate_state() }
    }

    /// Challenge method, always S256
    #[must_use]
    pub const fn challenge_method(&self) -> &'static str {
        "S256"
    }
}
