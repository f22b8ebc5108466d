//! Secret string type with automatic memory zeroization
//!
//! Wraps provider access tokens, custom auth tokens, and session credentials.
//! The wrapped value is zeroed when dropped and redacted in all formatting.

use std::fmt;

use serde::{Deserialize, Deserializer};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Secret string that zeroes memory on drop
///
/// Intentionally does not implement `Serialize`: persisting a secret requires
/// an explicit [`SecretString::expose`] at the storage boundary.
#[derive(Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct SecretString {
    inner: String,
}

impl SecretString {
    /// Wrap a secret value
    pub fn new(value: impl Into<String>) -> Self {
        Self { inner: value.into() }
    }

    /// Expose the inner value
    ///
    /// The exposed value must not be stored or logged. Use only for the
    /// immediate operation that needs it (HTTP header, request body).
    pub fn expose(&self) -> &str {
        &self.inner
    }

    /// Byte length of the secret
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the secret is empty
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Whether the secret is empty or consists only of whitespace
    pub fn is_blank(&self) -> bool {
        self.inner.trim().is_empty()
    }

    /// Compare with another secret in constant time
    pub fn constant_time_eq(&self, other: &Self) -> bool {
        constant_time_eq(self.inner.as_bytes(), other.inner.as_bytes())
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

// Not constant-time. Use `constant_time_eq` for anything attacker-controlled.
impl PartialEq for SecretString {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl Eq for SecretString {}

impl<'de> Deserialize<'de> for SecretString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Self::new)
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretString(***)")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***")
    }
}

/// Constant-time byte comparison
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }

    result == 0
}
