use std::{collections::BTreeSet, fmt};

use serde::Deserialize;

/// Access token claims as they arrive on the wire.
///
/// NOTE:
/// - `iss`/`aud`/`exp`/`nbf` are checked by `jsonwebtoken::Validation` before this type is
///   deserialized, so only what the application reads is kept here.
/// - Permissions come from the RBAC `permissions` array and/or the space-separated `scope` claim.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessTokenClaims {
    #[serde(default)]
    pub sub: String,
    #[serde(default)]
    pub jti: Option<String>,

    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub permissions: Option<Vec<String>>,
}

/// Verified claims handed to the guard and, through it, to handlers.
///
/// Lives for one request only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimSet {
    pub subject: String,
    pub jti: Option<String>,
    pub permissions: BTreeSet<String>,
}

impl ClaimSet {
    pub fn has_permission(&self, scope: &str) -> bool {
        self.permissions.contains(scope)
    }
}

impl From<AccessTokenClaims> for ClaimSet {
    fn from(claims: AccessTokenClaims) -> Self {
        let mut permissions: BTreeSet<String> = claims
            .permissions
            .unwrap_or_default()
            .into_iter()
            .filter(|p| !p.trim().is_empty())
            .collect();

        if let Some(scope) = claims.scope.as_deref() {
            permissions.extend(scope.split_whitespace().map(str::to_string));
        }

        Self {
            subject: claims.sub,
            jti: claims.jti,
            permissions,
        }
    }
}

/// Scopes the drinks API knows how to enforce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    GetDrinksDetail,
    PostDrinks,
    PatchDrinks,
    DeleteDrinks,
}

impl Permission {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GetDrinksDetail => "get:drinks-detail",
            Self::PostDrinks => "post:drinks",
            Self::PatchDrinks => "patch:drinks",
            Self::DeleteDrinks => "delete:drinks",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
