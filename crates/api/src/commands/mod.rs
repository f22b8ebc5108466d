//! Commands - UI to backend bridge

mod auth;

pub use auth::*;
