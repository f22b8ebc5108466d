//! # ScoutGate App
//!
//! Application layer - commands and the `scoutgate` binary.
//!
//! This crate contains:
//! - Auth commands (UI → backend bridge)
//! - Application context (dependency injection)
//! - Logging setup
//!
//! ## Architecture
//! - Depends on `common`, `domain`, `core`, and `infra`
//! - Wires up the hexagonal architecture

pub mod commands;
pub mod context;
pub mod utils;

// Re-export for convenience
pub use commands::*;
pub use context::*;
