/**
 * Server Configuration
 *
 * This module handles loading and validation of server configuration from
 * environment variables (optionally seeded from a `.env` file by the
 * binary).
 *
 * # Keys
 *
 * | Key | Default |
 * |---|---|
 * | `TOKEN_KEY` | required, at least 32 bytes |
 * | `ACCESS_TOKEN_DURATION_SECS` | 900 |
 * | `REFRESH_TOKEN_DURATION_SECS` | 6000 |
 * | `VERIFICATION_CODE_TTL_SECS` | 1800 |
 * | `DATABASE_URL` | unset, in-memory storage |
 * | `CLOUDINARY_URL` | unset, image uploads disabled |
 * | `SERVER_PORT` | 3000 |
 * | `CORS_ORIGINS` | unset, any origin |
 * | `BCRYPT_COST` | 12 |
 *
 * # Error Handling
 *
 * Unlike optional services, a missing or malformed required value stops
 * startup with a `ConfigError`. Durations must lie in
 * `1..=MAX_DURATION_SECS`.
 */
use sqlx::PgPool;
use std::str::FromStr;
use thiserror::Error;

use crate::backend::auth::sessions::MIN_KEY_LEN;
use crate::backend::auth::TokenPolicy;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BCRYPT_COST: u32 = 12;

/// Upper bound for every configured duration (ten years)
pub const MAX_DURATION_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },

    #[error("database unavailable: {0}")]
    Database(#[from] sqlx::Error),

    #[error("database migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Typed server configuration
#[derive(Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub token_key: String,
    pub policy: TokenPolicy,
    pub database_url: Option<String>,
    pub cloudinary_url: Option<String>,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub bcrypt_cost: u32,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("policy", &self.policy)
            .field("database", &self.database_url.is_some())
            .field("cloudinary", &self.cloudinary_url.is_some())
            .field("port", &self.port)
            .field("cors_origins", &self.cors_origins)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish_non_exhaustive()
    }
}

impl ServerConfig {
    /// Read the configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`
    ///
    /// Blank values count as unset.
    ///
    /// # Arguments
    ///
    /// * `lookup` - Returns the raw value of a key, if any
    ///
    /// # Errors
    ///
    /// * `Missing` - `TOKEN_KEY` is not set
    /// * `Invalid` - A value does not parse, or the key is too short
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let token_key = get("TOKEN_KEY").ok_or(ConfigError::Missing("TOKEN_KEY"))?;
        if token_key.len() < MIN_KEY_LEN {
            return Err(ConfigError::Invalid {
                key: "TOKEN_KEY",
                message: format!("must be at least {} bytes", MIN_KEY_LEN),
            });
        }

        let defaults = TokenPolicy::default();
        let access_secs = duration_secs(
            get("ACCESS_TOKEN_DURATION_SECS"),
            "ACCESS_TOKEN_DURATION_SECS",
            defaults.access_ttl.num_seconds().unsigned_abs(),
        )?;
        let refresh_secs = duration_secs(
            get("REFRESH_TOKEN_DURATION_SECS"),
            "REFRESH_TOKEN_DURATION_SECS",
            defaults.refresh_ttl.num_seconds().unsigned_abs(),
        )?;
        let code_secs = duration_secs(
            get("VERIFICATION_CODE_TTL_SECS"),
            "VERIFICATION_CODE_TTL_SECS",
            defaults.code_ttl.as_secs(),
        )?;

        let cors_origins = get("CORS_ORIGINS")
            .map(|origins| {
                origins
                    .split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            token_key,
            policy: TokenPolicy {
                access_ttl: chrono::Duration::seconds(access_secs as i64),
                refresh_ttl: chrono::Duration::seconds(refresh_secs as i64),
                code_ttl: std::time::Duration::from_secs(code_secs),
            },
            database_url: get("DATABASE_URL"),
            cloudinary_url: get("CLOUDINARY_URL"),
            port: parse_or(get("SERVER_PORT"), "SERVER_PORT", DEFAULT_PORT)?,
            cors_origins,
            bcrypt_cost: parse_or(get("BCRYPT_COST"), "BCRYPT_COST", DEFAULT_BCRYPT_COST)?,
        })
    }
}

fn parse_or<T>(value: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            message: format!("{:?}: {}", raw, e),
        }),
        None => Ok(default),
    }
}

/// Parse a duration in seconds and check it against `MAX_DURATION_SECS`
fn duration_secs(value: Option<String>, key: &'static str, default: u64) -> Result<u64, ConfigError> {
    let secs = parse_or(value, key, default)?;
    if !(1..=MAX_DURATION_SECS).contains(&secs) {
        return Err(ConfigError::Invalid {
            key,
            message: format!("must be between 1 and {} seconds", MAX_DURATION_SECS),
        });
    }
    Ok(secs)
}

/// Connect to PostgreSQL and apply pending migrations
///
/// # Errors
///
/// `Database` if the pool cannot connect, `Migration` if a migration fails
pub async fn load_database(database_url: &str) -> Result<PgPool, ConfigError> {
    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(database_url).await?;
    tracing::info!("Database connection pool created successfully");

    tracing::info!("Running database migrations...");
    sqlx::migrate!().run(&pool).await?;
    tracing::info!("Database migrations completed successfully");

    Ok(pool)
}
