/// Factory: build `AuthService` from application `AuthConfig`.
use std::{sync::Arc, time::Duration};

use anyhow::Context;

use crate::config::{AuthConfig, JwksSource};
use crate::services::auth::{AuthService, jwks::KeyStore, verifier::TokenVerifier};

pub async fn build_auth_service(config: &AuthConfig) -> anyhow::Result<Arc<AuthService>> {
    let keys = match &config.jwks {
        JwksSource::Inline(json) => {
            KeyStore::from_json(json).context("AUTH_JWKS_JSON is not a usable JWK set")?
        }
        JwksSource::Remote(url) => KeyStore::remote(
            url.clone(),
            Duration::from_secs(config.jwks_refresh_min_interval_seconds),
        )
        .await
        .with_context(|| format!("could not load signing keys from {url}"))?,
    };

    let verifier = TokenVerifier::new(
        config.issuer.clone(),
        config.audience.clone(),
        config.algorithms.clone(),
        config.leeway_seconds,
    );

    Ok(Arc::new(AuthService::new(verifier, keys)))
}
