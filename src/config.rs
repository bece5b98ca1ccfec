/*
 * Responsibility
 * - 環境変数の読み込み (DATABASE_URL, CORS 許可、Auth / JWKS 設定など)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use jsonwebtoken::Algorithm;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()))
    }

    fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Where the signing-key set comes from.
#[derive(Debug, Clone)]
pub enum JwksSource {
    /// Fetched at startup and refreshed when an unknown `kid` shows up.
    Remote(url::Url),
    /// Inline JWK set; never refreshed.
    Inline(String),
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub issuer: String,
    pub audience: String,
    pub jwks: JwksSource,
    pub algorithms: Vec<Algorithm>,
    pub leeway_seconds: u64,
    pub jwks_refresh_min_interval_seconds: u64,
}

pub struct Config {
    pub addr: SocketAddr,
    pub database_url: Option<String>,
    pub database_max_connections: u32,

    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    pub auth: AuthConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let database_url = non_empty(std::env::var("DATABASE_URL").ok());
        if database_url.is_none() && app_env.is_production() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let database_max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(5);

        let cors_allowed_origins = split_list(&std::env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default());

        let auth = AuthConfig::from_env()?;

        Ok(Self {
            addr,
            database_url,
            database_max_connections,
            app_env,
            cors_allowed_origins,
            auth,
        })
    }

    /// Only what `setup-db` needs; the auth settings are not required there.
    pub fn database_url_from_env() -> Result<String, ConfigError> {
        dotenvy::dotenv().ok();
        non_empty(std::env::var("DATABASE_URL").ok())
            .ok_or(ConfigError::Missing("DATABASE_URL"))
    }
}

impl AuthConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let issuer =
            std::env::var("AUTH_ISSUER").map_err(|_| ConfigError::Missing("AUTH_ISSUER"))?;

        let audience =
            std::env::var("AUTH_AUDIENCE").map_err(|_| ConfigError::Missing("AUTH_AUDIENCE"))?;

        let jwks = match non_empty(std::env::var("AUTH_JWKS_JSON").ok()) {
            Some(json) => JwksSource::Inline(json),
            None => {
                let url = match std::env::var("AUTH_JWKS_URL").ok() {
                    Some(raw) => url::Url::parse(&raw).map_err(|_| ConfigError::Invalid("AUTH_JWKS_URL"))?,
                    None => default_jwks_url(&issuer).ok_or(ConfigError::Invalid("AUTH_ISSUER"))?,
                };
                JwksSource::Remote(url)
            }
        };

        let algorithms = parse_algorithms(
            &std::env::var("AUTH_ALGORITHMS").unwrap_or_else(|_| "RS256".to_string()),
        )
        .ok_or(ConfigError::Invalid("AUTH_ALGORITHMS"))?;

        let leeway_seconds = std::env::var("ACCESS_TOKEN_LEEWAY_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(60);

        let jwks_refresh_min_interval_seconds = std::env::var("JWKS_REFRESH_MIN_INTERVAL_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(60);

        Ok(Self {
            issuer,
            audience,
            jwks,
            algorithms,
            leeway_seconds,
            jwks_refresh_min_interval_seconds,
        })
    }
}

/// `KEY=` (or only whitespace) counts as unset.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// `https://tenant.auth0.com/` -> `https://tenant.auth0.com/.well-known/jwks.json`
fn default_jwks_url(issuer: &str) -> Option<url::Url> {
    let mut base = url::Url::parse(issuer).ok()?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(".well-known/jwks.json").ok()
}

/// Empty or unknown entries make the whole list invalid.
fn parse_algorithms(raw: &str) -> Option<Vec<Algorithm>> {
    let names = split_list(raw);
    if names.is_empty() {
        return None;
    }
    names
        .iter()
        .map(|name| Algorithm::from_str(name).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jwks_url_is_derived_from_issuer() {
        let url = default_jwks_url("https://tenant.auth0.com/").unwrap();
        assert_eq!(url.as_str(), "https://tenant.auth0.com/.well-known/jwks.json");

        let url = default_jwks_url("https://idp.example.com/realms/drinks").unwrap();
        assert_eq!(
            url.as_str(),
            "https://idp.example.com/realms/drinks/.well-known/jwks.json"
        );
    }

    #[test]
    fn algorithms_parse_as_a_list() {
        assert_eq!(
            parse_algorithms("RS256, EdDSA"),
            Some(vec![Algorithm::RS256, Algorithm::EdDSA])
        );
        assert_eq!(parse_algorithms("RS256,nope"), None);
        assert_eq!(parse_algorithms(" , "), None);
    }

    #[test]
    fn blank_values_count_as_unset() {
        assert_eq!(non_empty(None), None);
        assert_eq!(non_empty(Some(String::new())), None);
        assert_eq!(non_empty(Some("  ".to_string())), None);
        assert_eq!(
            non_empty(Some("postgres://localhost/drinks".to_string())),
            Some("postgres://localhost/drinks".to_string())
        );
    }

    #[test]
    fn app_env_accepts_short_production_name() {
        assert!(AppEnv::parse("PROD").is_production());
        assert!(!AppEnv::parse("staging").is_production());
    }
}
