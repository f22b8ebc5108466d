//! Error classification shared across ScoutGate crates
//!
//! Every layer defines its own `thiserror` enum; this module provides the
//! common vocabulary those enums use to describe themselves so that logging,
//! UI messaging, and retry decisions stay consistent.
//!
//! ## ErrorClassification Trait
//!
//! - **`is_retryable()`**: May the *user* restart the operation with a
//!   reasonable chance of success? (The login pipeline itself never retries.)
//! - **`severity()`**: How serious is this error?
//! - **`is_user_cancellation()`**: Did the user abort on purpose? UI layers
//!   suppress error toasts for these.
//! - **`retry_after()`**: Suggested delay before a manual retry, if known.
//!
//! ## ErrorSeverity Levels
//!
//! | Level | Use Case | Examples |
//! |-------|----------|----------|
//! | **Info** | Expected conditions | User cancelled the browser sheet |
//! | **Warning** | Policy outcomes, degraded paths | Not a member of the required group |
//! | **Error** | Failure requiring attention | Network errors, malformed responses |
//! | **Critical** | Integrity at risk | Token bound to the wrong subject, CSRF state mismatch |
//!
//! ## Example
//!
//! ```rust,ignore
//! use scoutgate_common::error::{ErrorClassification, ErrorSeverity};
//! use thiserror::Error;
//!
//! #[derive(Debug, Error)]
//! pub enum FetchError {
//!     #[error("timed out")]
//!     Timeout,
//!     #[error("bad payload: {0}")]
//!     Payload(String),
//! }
//!
//! impl ErrorClassification for FetchError {
//!     fn is_retryable(&self) -> bool {
//!         matches!(self, Self::Timeout)
//!     }
//!
//!     fn severity(&self) -> ErrorSeverity {
//!         ErrorSeverity::Error
//!     }
//! }
//! ```

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Standard interface for classifying errors by their characteristics
pub trait ErrorClassification {
    /// Whether a manual retry of the whole operation may succeed
    fn is_retryable(&self) -> bool;

    /// Severity level used for logging and alerting decisions
    fn severity(&self) -> ErrorSeverity;

    /// Check if this is a critical error requiring immediate attention
    fn is_critical(&self) -> bool {
        self.severity() == ErrorSeverity::Critical
    }

    /// Whether the error is the result of a deliberate user cancellation
    fn is_user_cancellation(&self) -> bool {
        false
    }

    /// Suggested delay before retrying, if the source provided one
    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

/// Error severity levels for monitoring and alerting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Informational, expected during normal use
    Info,
    /// Warning, should be monitored but not critical
    Warning,
    /// Error, requires attention and action
    Error,
    /// Critical, immediate action required
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}
