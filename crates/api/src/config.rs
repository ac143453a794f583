//! Application configuration

use std::{env, path::PathBuf, str::FromStr};

use jsonwebtoken::Algorithm;

/// Signing algorithms usable with a shared secret
const HMAC_ALGORITHMS: &[Algorithm] = &[Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Token lifetimes are capped at one year
const MAX_TOKEN_TTL_MINUTES: i64 = 60 * 24 * 366;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub host: String,
    pub port: u16,
    /// Include internal error detail in error responses
    pub debug: bool,
    pub cors_allowed_origins: Vec<String>,

    // Database
    pub database_url: String,

    // Authentication
    pub secret_key: String,
    pub algorithm: Algorithm,
    pub access_token_expire_minutes: i64,

    // Search collaborator
    /// Absent means the search feature is disabled
    pub google_drive_credentials: Option<PathBuf>,
    pub google_drive_api_url: String,
    pub search_timeout_ms: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            // Server
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_or("PORT", 8000)?,
            debug: parse_flag("DEBUG"),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(str::trim)
                        .filter(|o| !o.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),

            // Database
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://users.db?mode=rwc".to_string()),

            // Authentication
            secret_key: {
                let secret =
                    env::var("SECRET_KEY").map_err(|_| ConfigError::Missing("SECRET_KEY"))?;
                if secret.len() < 32 {
                    return Err(ConfigError::WeakSecret(
                        "SECRET_KEY must be at least 32 characters",
                    ));
                }
                secret
            },
            algorithm: parse_algorithm(
                &env::var("ALGORITHM").unwrap_or_else(|_| "HS256".to_string()),
            )?,
            access_token_expire_minutes: {
                let minutes: i64 = parse_or("ACCESS_TOKEN_EXPIRE_MINUTES", 60 * 24)?;
                if minutes <= 0 || minutes > MAX_TOKEN_TTL_MINUTES {
                    return Err(ConfigError::Invalid(
                        "ACCESS_TOKEN_EXPIRE_MINUTES",
                        format!("must be between 1 and {} minutes", MAX_TOKEN_TTL_MINUTES),
                    ));
                }
                minutes
            },

            // Search collaborator
            google_drive_credentials: env::var("GOOGLE_DRIVE_CREDENTIALS")
                .ok()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            google_drive_api_url: env::var("GOOGLE_DRIVE_API_URL")
                .unwrap_or_else(|_| "https://www.googleapis.com".to_string()),
            search_timeout_ms: parse_or("SEARCH_TIMEOUT_MS", 10_000)?,
        })
    }

    /// Socket address the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn access_token_ttl(&self) -> time::Duration {
        time::Duration::minutes(self.access_token_expire_minutes)
    }

    pub fn search_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.search_timeout_ms)
    }

    pub fn search_enabled(&self) -> bool {
        self.google_drive_credentials.is_some()
    }
}

/// Parse a JWT algorithm identifier, accepting only the HMAC family
pub fn parse_algorithm(value: &str) -> Result<Algorithm, ConfigError> {
    let algorithm = Algorithm::from_str(value.trim())
        .map_err(|_| ConfigError::UnsupportedAlgorithm(value.to_string()))?;

    if !HMAC_ALGORITHMS.contains(&algorithm) {
        return Err(ConfigError::UnsupportedAlgorithm(value.to_string()));
    }
    Ok(algorithm)
}

fn parse_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(name, raw)),
        Err(_) => Ok(default),
    }
}

fn parse_flag(name: &str) -> bool {
    env::var(name)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
    #[error("Unsupported signing algorithm: {0} (expected HS256, HS384 or HS512)")]
    UnsupportedAlgorithm(String),
    #[error("Weak secret: {0}")]
    WeakSecret(&'static str),
}
