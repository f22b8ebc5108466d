//! Hitobito identity provider adapters
//!
//! Hitobito (the MiData / db.scout.ch membership database) acts as the OIDC
//! issuer. [`HitobitoIdentityProvider`] drives discovery, the PKCE redirect
//! and code redemption; [`HitobitoUserInfoClient`] reads the member record
//! including group roles.

mod provider;
mod userinfo;

pub use provider::HitobitoIdentityProvider;
pub use userinfo::HitobitoUserInfoClient;
