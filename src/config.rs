use serde::Deserialize;
use tracing::warn;

use crate::auth::permissions::PermissionSet;

/// Signing secret used when neither `JWT_SECRET` nor `SECRET_KEY` is set.
pub const INSECURE_DEFAULT_SECRET: &str = "fittrack-insecure-dev-secret";

/// `DATABASE_URL` value selecting the in-memory stores.
pub const MEMORY_DATABASE_URL: &str = "memory://";

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    /// True when `secret` is the built-in fallback.
    pub insecure: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub default_permissions: PermissionSet,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set (use {MEMORY_DATABASE_URL} for in-memory storage)"))?;

        let (secret, insecure) = match lookup("JWT_SECRET").or_else(|| lookup("SECRET_KEY")) {
            Some(s) if !s.trim().is_empty() => (s, false),
            _ => {
                warn!("JWT_SECRET is not set; signing tokens with the built-in insecure secret");
                (INSECURE_DEFAULT_SECRET.to_string(), true)
            }
        };

        let jwt = JwtConfig {
            secret,
            issuer: lookup("JWT_ISSUER").unwrap_or_else(|| "fittrack".into()),
            audience: lookup("JWT_AUDIENCE").unwrap_or_else(|| "fittrack-users".into()),
            ttl_minutes: lookup("JWT_TTL_MINUTES")
                .and_then(|v| v.parse::<i64>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(30),
            insecure,
        };

        let default_permissions = match lookup("DEFAULT_PERMISSIONS") {
            Some(raw) => PermissionSet::parse_list(&raw)?,
            None => PermissionSet::parse_list("view")?,
        };

        let port = lookup("APP_PORT")
            .or_else(|| lookup("PORT"))
            .map(|p| p.parse::<u16>())
            .transpose()?
            .unwrap_or(8080);

        Ok(Self {
            database_url,
            jwt,
            default_permissions,
            host: lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
        })
    }

    pub fn uses_memory_storage(&self) -> bool {
        self.database_url == MEMORY_DATABASE_URL
    }

    /// Configuration for tests and local runs without a database.
    pub fn for_tests() -> Self {
        Self {
            database_url: MEMORY_DATABASE_URL.into(),
            jwt: JwtConfig {
                secret: "test-secret".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 30,
                insecure: false,
            },
            default_permissions: PermissionSet::default(),
            host: "127.0.0.1".into(),
            port: 0,
        }
    }
}
