use thiserror::Error;

/// Why a request could not be authorized.
///
/// The `Display` text is what clients see, so it never carries token contents
/// or library error detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("authorization header is expected")]
    MissingHeader,
    #[error("authorization header must be 'Bearer <token>'")]
    InvalidHeader,
    #[error("authorization token is malformed")]
    MalformedToken,
    #[error("authorization token is expired")]
    ExpiredToken,
    #[error("authorization token signature is invalid")]
    InvalidSignature,
    #[error("incorrect claims, please check the audience and issuer")]
    InvalidClaims,
    #[error("unable to find the appropriate signing key")]
    UnknownKey,
    #[error("signing keys are currently unavailable")]
    KeySetUnavailable,
    #[error("permission not granted")]
    InsufficientScope,
}

impl AuthError {
    /// Stable machine-readable name, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingHeader => "missing_header",
            Self::InvalidHeader => "invalid_header",
            Self::MalformedToken => "malformed_token",
            Self::ExpiredToken => "token_expired",
            Self::InvalidSignature => "invalid_signature",
            Self::InvalidClaims => "invalid_claims",
            Self::UnknownKey => "unknown_key",
            Self::KeySetUnavailable => "key_set_unavailable",
            Self::InsufficientScope => "insufficient_scope",
        }
    }

    /// Authenticated but not allowed, as opposed to not authenticated at all.
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::InsufficientScope)
    }
}
