//! Bearer-token authentication and role guards.
//!
//! Tokens are issued by an external identity provider; this feature only
//! validates them and exposes the caller as [`model::AuthenticatedUser`].

mod jwks;
mod validator;

pub mod guards;
pub mod model;

pub use jwks::JwksClient;
pub use validator::{JwtValidator, KeySource};
