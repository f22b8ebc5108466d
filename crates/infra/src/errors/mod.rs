//! Infrastructure error conversions

mod conversions;

pub use conversions::{map_oauth_error, map_redirect_error, InfraError};
