// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Builds ServerConfig from environment variables with validated defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

//! Environment-based configuration management for production deployment

use std::env;
use std::fmt::{Display, Formatter, Result as FmtResult};

use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::database::DatabaseConfig;
use crate::constants::{limits, ports};
use crate::errors::{AppError, AppResult};

/// Shortest JWT secret accepted in production
const MIN_PRODUCTION_SECRET_LENGTH: usize = 32;
/// Length of the generated development secret
const DEV_SECRET_LENGTH: usize = 48;

/// Environment type for security and other configurations
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Deployed
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Session and password hashing settings
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing secret for session tokens
    pub jwt_secret: String,
    /// Session lifetime in hours
    pub session_expiry_hours: i64,
    /// bcrypt work factor
    pub bcrypt_cost: u32,
    /// Add `Secure` to the session cookie
    pub cookie_secure: bool,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("session_expiry_hours", &self.session_expiry_hours)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("cookie_secure", &self.cookie_secure)
            .finish()
    }
}

impl AuthConfig {
    /// Settings for tests: fixed secret, cheapest bcrypt cost
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            jwt_secret: "test-secret-that-is-long-enough-for-hs256-signing".to_owned(),
            session_expiry_hours: limits::DEFAULT_SESSION_HOURS,
            bcrypt_cost: bcrypt::MIN_COST,
            cookie_secure: false,
        }
    }
}

/// Outbound email settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// From address on every email
    pub from_address: String,
    /// Deliver queued emails right after they are enqueued
    pub deliver_immediately: bool,
}

/// Top-level server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,
    /// HTTP listen host
    pub host: String,
    /// Deployment environment
    pub environment: Environment,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Authentication configuration
    pub auth: AuthConfig,
    /// Mail configuration
    pub mail: MailConfig,
    /// Public site origin used in emails and the sitemap
    pub public_base_url: String,
    /// Origins allowed by CORS; empty means same-origin only
    pub cors_allowed_origins: Vec<String>,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but malformed, or if
    /// `JWT_SECRET` is missing or too short in production
    pub fn from_env() -> AppResult<Self> {
        let environment = Environment::from_str_or_default(
            &env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        );

        let config = Self {
            http_port: parse_env("HTTP_PORT", ports::DEFAULT_HTTP_PORT)?,
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".into()),
            environment,
            database: DatabaseConfig::from_env()?,
            auth: AuthConfig {
                jwt_secret: load_jwt_secret(environment)?,
                session_expiry_hours: parse_env(
                    "SESSION_EXPIRY_HOURS",
                    limits::DEFAULT_SESSION_HOURS,
                )?,
                bcrypt_cost: parse_env("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
                cookie_secure: parse_env("COOKIE_SECURE", environment.is_production())?,
            },
            mail: MailConfig {
                from_address: env::var("MAIL_FROM")
                    .unwrap_or_else(|_| "PawHub <no-reply@pawhub.local>".into()),
                deliver_immediately: parse_env("MAIL_DELIVER_IMMEDIATELY", true)?,
            },
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into())
                .trim_end_matches('/')
                .to_owned(),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_owned)
                        .collect()
                })
                .unwrap_or_default(),
            request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS", 30)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Configuration for integration tests: in-memory database, cheap hashing
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            http_port: 0,
            host: "127.0.0.1".into(),
            environment: Environment::Testing,
            database: DatabaseConfig::in_memory(),
            auth: AuthConfig::for_testing(),
            mail: MailConfig {
                from_address: "PawHub <test@pawhub.local>".into(),
                deliver_immediately: false,
            },
            public_base_url: "https://pawhub.test".into(),
            cors_allowed_origins: Vec::new(),
            request_timeout_secs: 30,
        }
    }

    /// Check cross-field constraints
    ///
    /// # Errors
    ///
    /// Returns a config error describing the first invalid setting
    pub fn validate(&self) -> AppResult<()> {
        if self.auth.session_expiry_hours <= 0 {
            return Err(AppError::config("SESSION_EXPIRY_HOURS must be positive"));
        }
        if !(bcrypt::MIN_COST..=bcrypt::MAX_COST).contains(&self.auth.bcrypt_cost) {
            return Err(AppError::config(format!(
                "BCRYPT_COST must be between {} and {}",
                bcrypt::MIN_COST,
                bcrypt::MAX_COST
            )));
        }
        if !self.public_base_url.starts_with("http://")
            && !self.public_base_url.starts_with("https://")
        {
            return Err(AppError::config(
                "PUBLIC_BASE_URL must start with http:// or https://",
            ));
        }
        Ok(())
    }

    /// One-line redacted summary for startup logs
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "env={} listen={}:{} database={} session_hours={} bcrypt_cost={} cookie_secure={} public_url={}",
            self.environment,
            self.host,
            self.http_port,
            self.database.url,
            self.auth.session_expiry_hours,
            self.auth.bcrypt_cost,
            self.auth.cookie_secure,
            self.public_base_url,
        )
    }
}

/// Parse an optional environment variable, falling back to `default`
fn parse_env<T>(name: &str, default: T) -> AppResult<T>
where
    T: std::str::FromStr,
    T::Err: Display,
{
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map_err(|e| AppError::config(format!("Invalid {name} '{value}': {e}"))),
        Err(_) => Ok(default),
    }
}

/// Read `JWT_SECRET`; development gets a random per-process secret
fn load_jwt_secret(environment: Environment) -> AppResult<String> {
    match env::var("JWT_SECRET") {
        Ok(secret) if environment.is_production() && secret.len() < MIN_PRODUCTION_SECRET_LENGTH => {
            Err(AppError::config(format!(
                "JWT_SECRET must be at least {MIN_PRODUCTION_SECRET_LENGTH} characters in production"
            )))
        }
        Ok(secret) => Ok(secret),
        Err(_) if environment.is_production() => {
            Err(AppError::config("JWT_SECRET is required in production"))
        }
        Err(_) => {
            warn!("JWT_SECRET not set; generated a random secret, sessions will not survive restarts");
            Ok(rand::thread_rng()
                .sample_iter(&Alphanumeric)
                .take(DEV_SECRET_LENGTH)
                .map(char::from)
                .collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parsing() {
        assert_eq!(Environment::from_str_or_default("PROD"), Environment::Production);
        assert_eq!(Environment::from_str_or_default("test"), Environment::Testing);
        assert_eq!(Environment::from_str_or_default("staging"), Environment::Development);
    }

    #[test]
    fn test_testing_config_is_valid() {
        assert!(ServerConfig::for_testing().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ServerConfig::for_testing();
        config.auth.bcrypt_cost = 1;
        assert!(config.validate().is_err());

        let mut config = ServerConfig::for_testing();
        config.public_base_url = "pawhub.test".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_summary_redacts_secret() {
        let config = ServerConfig::for_testing();
        assert!(!config.summary().contains(&config.auth.jwt_secret));
        assert!(!format!("{:?}", config.auth).contains(&config.auth.jwt_secret));
    }
}
