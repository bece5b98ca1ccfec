//! Scope check against a verified claim set.

use crate::services::auth::{AuthError, ClaimSet, Permission};

/// Passes only when `required` is a member of the granted permissions.
/// An empty permission set never grants anything.
pub fn check(claims: &ClaimSet, required: Permission) -> Result<(), AuthError> {
    if claims.has_permission(required.as_str()) {
        Ok(())
    } else {
        Err(AuthError::InsufficientScope)
    }
}
