//! Signing-key set (JWKS) used to verify access tokens.
//!
//! Loaded once at startup. A remote set is re-fetched only when a token names a `kid`
//! we do not hold, and never more often than the configured minimum interval.

use std::{
    sync::{Arc, RwLock},
    time::{Duration, Instant},
};

use jsonwebtoken::jwk::{Jwk, JwkSet};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::services::auth::AuthError;

#[derive(Debug, Error)]
pub enum JwksError {
    #[error("failed to fetch jwks: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("invalid jwks document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("jwks contains no keys")]
    Empty,
}

enum KeySource {
    Static,
    Remote {
        client: reqwest::Client,
        url: url::Url,
    },
}

pub struct KeyStore {
    keys: RwLock<Arc<JwkSet>>,
    source: KeySource,
    // Serializes refreshes and remembers when the last one happened.
    last_refresh: Mutex<Option<Instant>>,
    min_refresh_interval: Duration,
}

impl std::fmt::Debug for KeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let source = match &self.source {
            KeySource::Static => "static".to_string(),
            KeySource::Remote { url, .. } => url.to_string(),
        };
        f.debug_struct("KeyStore")
            .field("source", &source)
            .field("keys", &self.current().keys.len())
            .finish()
    }
}

impl KeyStore {
    pub fn from_static(keys: JwkSet) -> Self {
        Self {
            keys: RwLock::new(Arc::new(keys)),
            source: KeySource::Static,
            last_refresh: Mutex::new(None),
            min_refresh_interval: Duration::ZERO,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, JwksError> {
        let keys: JwkSet = serde_json::from_str(json)?;
        if keys.keys.is_empty() {
            return Err(JwksError::Empty);
        }
        Ok(Self::from_static(keys))
    }

    /// Fetch the key set once; startup fails if the authority is unreachable.
    pub async fn remote(url: url::Url, min_refresh_interval: Duration) -> Result<Self, JwksError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()?;

        let keys = fetch(&client, &url).await?;
        tracing::info!(url = %url, keys = keys.keys.len(), "loaded signing keys");

        Ok(Self {
            keys: RwLock::new(Arc::new(keys)),
            source: KeySource::Remote { client, url },
            last_refresh: Mutex::new(Some(Instant::now())),
            min_refresh_interval,
        })
    }

    pub fn current(&self) -> Arc<JwkSet> {
        match self.keys.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Look up a key by `kid`, refreshing a remote set once when it is missing.
    pub async fn key_for(&self, kid: &str) -> Result<Jwk, AuthError> {
        if let Some(jwk) = self.current().find(kid) {
            return Ok(jwk.clone());
        }

        if let Err(err) = self.refresh().await {
            tracing::warn!(error = %err, "signing key refresh failed");
            return Err(AuthError::KeySetUnavailable);
        }

        self.current()
            .find(kid)
            .cloned()
            .ok_or(AuthError::UnknownKey)
    }

    async fn refresh(&self) -> Result<(), JwksError> {
        let KeySource::Remote { client, url } = &self.source else {
            return Ok(());
        };

        let mut last = self.last_refresh.lock().await;
        if let Some(at) = *last
            && at.elapsed() < self.min_refresh_interval
        {
            return Ok(());
        }

        let keys = fetch(client, url).await?;
        tracing::info!(url = %url, keys = keys.keys.len(), "refreshed signing keys");

        self.replace(keys);
        *last = Some(Instant::now());
        Ok(())
    }

    fn replace(&self, keys: JwkSet) {
        let next = Arc::new(keys);
        match self.keys.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }
}

async fn fetch(client: &reqwest::Client, url: &url::Url) -> Result<JwkSet, JwksError> {
    let keys = client
        .get(url.clone())
        .send()
        .await?
        .error_for_status()?
        .json::<JwkSet>()
        .await?;

    if keys.keys.is_empty() {
        return Err(JwksError::Empty);
    }
    Ok(keys)
}
