//! Shared helpers for the command layer

pub mod logging;

pub use logging::{error_label, init_tracing, init_tracing_with_env, log_command_execution};
