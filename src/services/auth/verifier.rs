use jsonwebtoken::{
    Algorithm, DecodingKey, Header, Validation,
    errors::{Error as JwtError, ErrorKind},
    jwk::Jwk,
};

use crate::services::auth::{
    AuthError, ClaimSet, claims::AccessTokenClaims, jwks::KeyStore,
};

/// Extract the token from an `Authorization` header value.
///
/// Exactly `Bearer <token>`; the scheme is matched case-insensitively.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let raw = header.ok_or(AuthError::MissingHeader)?;

    let mut parts = raw.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        _ => Err(AuthError::InvalidHeader),
    }
}

/// Stateless JWT checks against one given key.
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    issuer: String,
    audience: String,
    algorithms: Vec<Algorithm>,
    leeway_seconds: u64,
}

impl TokenVerifier {
    pub fn new(
        issuer: impl Into<String>,
        audience: impl Into<String>,
        algorithms: Vec<Algorithm>,
        leeway_seconds: u64,
    ) -> Self {
        Self {
            issuer: issuer.into(),
            audience: audience.into(),
            algorithms,
            leeway_seconds,
        }
    }

    pub fn decode_header(&self, token: &str) -> Result<Header, AuthError> {
        jsonwebtoken::decode_header(token).map_err(|_| AuthError::MalformedToken)
    }

    /// Verify signature and registered claims, then project into a `ClaimSet`.
    pub fn verify_with_key(
        &self,
        token: &str,
        header: &Header,
        jwk: &Jwk,
    ) -> Result<ClaimSet, AuthError> {
        if !self.algorithms.contains(&header.alg) {
            return Err(AuthError::InvalidSignature);
        }
        if !jwk_allows(jwk, header.alg) {
            return Err(AuthError::InvalidSignature);
        }

        let key = DecodingKey::from_jwk(jwk).map_err(|err| {
            tracing::warn!(error = %err, kid = ?jwk.common.key_id, "unusable signing key");
            AuthError::KeySetUnavailable
        })?;

        let mut validation = Validation::new(header.alg);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.validate_nbf = true;
        validation.leeway = self.leeway_seconds;

        let data = jsonwebtoken::decode::<AccessTokenClaims>(token, &key, &validation)
            .map_err(classify)?;

        if data.claims.sub.trim().is_empty() {
            return Err(AuthError::InvalidClaims);
        }

        Ok(ClaimSet::from(data.claims))
    }
}

/// A JWK that pins `alg` may only verify tokens of that algorithm.
fn jwk_allows(jwk: &Jwk, alg: Algorithm) -> bool {
    let Some(pinned) = jwk.common.key_algorithm.as_ref() else {
        return true;
    };
    // Both enums serialize to the JOSE name ("RS256", "EdDSA", ...).
    match (serde_json::to_value(pinned), serde_json::to_value(alg)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn classify(err: JwtError) -> AuthError {
    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
        ErrorKind::InvalidIssuer
        | ErrorKind::InvalidAudience
        | ErrorKind::InvalidSubject
        | ErrorKind::ImmatureSignature
        | ErrorKind::MissingRequiredClaim(_) => AuthError::InvalidClaims,
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => AuthError::InvalidSignature,
        _ => AuthError::MalformedToken,
    }
}

/// Token verifier bound to the process-wide signing-key set.
pub struct AuthService {
    verifier: TokenVerifier,
    keys: KeyStore,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("verifier", &self.verifier)
            .field("keys", &self.keys)
            .finish()
    }
}

impl AuthService {
    pub fn new(verifier: TokenVerifier, keys: KeyStore) -> Self {
        Self { verifier, keys }
    }

    /// `Authorization` header value -> verified claims.
    ///
    /// Reads the key set and may refresh it, nothing else.
    pub async fn verify(&self, authorization: Option<&str>) -> Result<ClaimSet, AuthError> {
        let token = bearer_token(authorization)?;
        let header = self.verifier.decode_header(token)?;
        let kid = header.kid.as_deref().ok_or(AuthError::MalformedToken)?;

        let jwk = self.keys.key_for(kid).await?;

        self.verifier.verify_with_key(token, &header, &jwk)
    }
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{EncodingKey, get_current_timestamp};
    use serde_json::json;

    use super::*;
    use crate::test_support::{self, AUDIENCE, ISSUER, KEY_A, KEY_B};

    fn service() -> AuthService {
        test_support::auth_service()
    }

    fn header(token: &str) -> String {
        format!("Bearer {token}")
    }

    #[test]
    fn bearer_header_shapes() {
        assert_eq!(bearer_token(Some("Bearer abc")), Ok("abc"));
        assert_eq!(bearer_token(Some("bearer  abc")), Ok("abc"));
        assert_eq!(bearer_token(None), Err(AuthError::MissingHeader));
        assert_eq!(bearer_token(Some("Bearer")), Err(AuthError::InvalidHeader));
        assert_eq!(bearer_token(Some("Basic abc")), Err(AuthError::InvalidHeader));
        assert_eq!(
            bearer_token(Some("Bearer abc def")),
            Err(AuthError::InvalidHeader)
        );
        assert_eq!(bearer_token(Some("")), Err(AuthError::InvalidHeader));
    }

    #[tokio::test]
    async fn valid_token_yields_claims() {
        let token = test_support::token(&["get:drinks-detail", "post:drinks"]);
        let claims = service().verify(Some(&header(&token))).await.unwrap();

        assert_eq!(claims.subject, test_support::SUBJECT);
        assert!(claims.has_permission("post:drinks"));
        assert!(claims.has_permission("get:drinks-detail"));
        assert!(!claims.has_permission("delete:drinks"));
    }

    #[tokio::test]
    async fn token_without_permissions_claim_has_empty_set() {
        let token = test_support::sign(
            &KEY_A,
            KEY_A.kid,
            &json!({
                "iss": ISSUER,
                "aud": AUDIENCE,
                "sub": test_support::SUBJECT,
                "exp": get_current_timestamp() + 600,
            }),
        );
        let claims = service().verify(Some(&header(&token))).await.unwrap();
        assert!(claims.permissions.is_empty());
    }

    #[tokio::test]
    async fn audience_may_be_an_array() {
        let token = test_support::sign(
            &KEY_A,
            KEY_A.kid,
            &json!({
                "iss": ISSUER,
                "aud": ["https://other.api/", AUDIENCE],
                "sub": test_support::SUBJECT,
                "exp": get_current_timestamp() + 600,
                "permissions": ["patch:drinks"],
            }),
        );
        let claims = service().verify(Some(&header(&token))).await.unwrap();
        assert!(claims.has_permission("patch:drinks"));
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let token = test_support::sign(
            &KEY_A,
            KEY_A.kid,
            &json!({
                "iss": ISSUER,
                "aud": AUDIENCE,
                "sub": test_support::SUBJECT,
                "exp": get_current_timestamp() - 3600,
                "permissions": ["post:drinks"],
            }),
        );
        assert_eq!(
            service().verify(Some(&header(&token))).await,
            Err(AuthError::ExpiredToken)
        );
    }

    #[tokio::test]
    async fn wrong_audience_or_issuer_is_invalid_claims() {
        for (iss, aud) in [(ISSUER, "someone-else"), ("https://evil.test/", AUDIENCE)] {
            let token = test_support::sign(
                &KEY_A,
                KEY_A.kid,
                &json!({
                    "iss": iss,
                    "aud": aud,
                    "sub": test_support::SUBJECT,
                    "exp": get_current_timestamp() + 600,
                }),
            );
            assert_eq!(
                service().verify(Some(&header(&token))).await,
                Err(AuthError::InvalidClaims)
            );
        }
    }

    #[tokio::test]
    async fn missing_subject_is_invalid_claims() {
        let token = test_support::sign(
            &KEY_A,
            KEY_A.kid,
            &json!({
                "iss": ISSUER,
                "aud": AUDIENCE,
                "exp": get_current_timestamp() + 600,
            }),
        );
        assert_eq!(
            service().verify(Some(&header(&token))).await,
            Err(AuthError::InvalidClaims)
        );
    }

    #[tokio::test]
    async fn signature_from_another_key_is_rejected() {
        // Signed with key B but claims to be key A.
        let token = test_support::sign(
            &KEY_B,
            KEY_A.kid,
            &test_support::claims(&["post:drinks"]),
        );
        assert_eq!(
            service().verify(Some(&header(&token))).await,
            Err(AuthError::InvalidSignature)
        );
    }

    #[tokio::test]
    async fn unknown_kid_is_rejected() {
        let token = test_support::sign(&KEY_A, "retired", &test_support::claims(&[]));
        assert_eq!(
            service().verify(Some(&header(&token))).await,
            Err(AuthError::UnknownKey)
        );
    }

    #[tokio::test]
    async fn garbage_and_kidless_tokens_are_malformed() {
        assert_eq!(
            service().verify(Some("Bearer not-a-jwt")).await,
            Err(AuthError::MalformedToken)
        );

        let kidless = jsonwebtoken::encode(
            &Header::new(Algorithm::EdDSA),
            &test_support::claims(&[]),
            &EncodingKey::from_ed_pem(KEY_A.private_pem.as_bytes()).unwrap(),
        )
        .unwrap();
        assert_eq!(
            service().verify(Some(&header(&kidless))).await,
            Err(AuthError::MalformedToken)
        );
    }

    #[tokio::test]
    async fn algorithm_outside_allowlist_is_rejected() {
        let mut hs = Header::new(Algorithm::HS256);
        hs.kid = Some(KEY_A.kid.to_string());
        let token = jsonwebtoken::encode(
            &hs,
            &test_support::claims(&["post:drinks"]),
            &EncodingKey::from_secret(b"guessable"),
        )
        .unwrap();

        assert_eq!(
            service().verify(Some(&header(&token))).await,
            Err(AuthError::InvalidSignature)
        );
    }
}
