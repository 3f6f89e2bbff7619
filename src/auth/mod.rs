//! Authentication module
//!
//! The PlanetScale API authenticates every request with an API key header
//! composed from the service token id and secret. The OpenAPI document is
//! public and is read without credentials.

mod authenticator;
mod types;

pub use authenticator::Authenticator;
pub use types::AuthConfig;
