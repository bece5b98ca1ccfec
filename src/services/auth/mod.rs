pub mod claims;
pub mod error;
pub mod factory;
pub mod jwks;
pub mod permission;
pub mod verifier;

pub use claims::{ClaimSet, Permission};
pub use error::AuthError;
pub use factory::build_auth_service;
pub use verifier::AuthService;
