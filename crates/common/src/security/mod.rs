//! Secret handling primitives
//!
//! Bearer tokens flowing through the login pipeline are wrapped in
//! [`SecretString`] so they are zeroed on drop and never rendered by `Debug`
//! or `Display`.

pub mod secret_string;

pub use secret_string::{constant_time_eq, SecretString};
