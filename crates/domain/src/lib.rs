//! # ScoutGate Domain
//!
//! Business domain types for the ScoutGate login pipeline.
//!
//! This crate contains:
//! - Identity types (UserInfo, CustomAuthToken, Session, UserProfile)
//! - The login state machine vocabulary (AuthState, FailureReason)
//! - Domain error types and Result definitions
//! - Configuration structures and constants
//!
//! ## Architecture
//! - Depends only on the foundation tier of `scoutgate-common`
//! - No I/O; pure data structures and validation

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
