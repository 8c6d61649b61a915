// ABOUTME: Session authentication with HS256 JWTs and bcrypt password hashing
// ABOUTME: Issues session tokens, validates them and hashes passwords off the async runtime
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

//! # Authentication and Session Management
//!
//! A session is an HS256 JWT carried in the `pawhub_session` cookie (or an
//! `Authorization: Bearer` header). The token only proves identity; the role
//! and active flag are re-read from the database on every request by
//! [`crate::middleware::auth::AuthMiddleware`].

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::constants::limits::MAX_PASSWORD_BYTES;
use crate::constants::service_names::SESSION_AUDIENCE;
use crate::errors::{AppError, AppResult};
use crate::models::User;

/// `JWT` claims for a user session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User `ID`
    pub sub: String,
    /// User email at issue time
    pub email: String,
    /// Role at issue time; informational only
    pub role: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Audience
    pub aud: String,
    /// User's session version at issue time
    #[serde(default)]
    pub ver: i64,
}

impl Claims {
    /// Parse the subject as a user id
    ///
    /// # Errors
    ///
    /// Returns an auth error if the subject is not a UUID
    pub fn user_id(&self) -> AppResult<Uuid> {
        Uuid::parse_str(&self.sub).map_err(|_| AppError::auth_invalid("Session subject is invalid"))
    }
}

/// How the request presented its session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    /// `pawhub_session` cookie
    SessionCookie,
    /// `Authorization: Bearer` header
    BearerToken,
}

impl AuthMethod {
    /// Get a human-readable display name for the authentication method
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::SessionCookie => "Session Cookie",
            Self::BearerToken => "Bearer Token",
        }
    }
}

/// Authenticated request context
#[derive(Debug, Clone)]
pub struct AuthResult {
    /// Authenticated user `ID`
    pub user_id: Uuid,
    /// The user as currently stored, including the live role
    pub user: User,
    /// Authentication method used
    pub auth_method: AuthMethod,
}

/// Authentication manager for session tokens and passwords
pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry_hours: i64,
    bcrypt_cost: u32,
}

impl AuthManager {
    /// Create a manager from the auth configuration
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            token_expiry_hours: config.session_expiry_hours,
            bcrypt_cost: config.bcrypt_cost,
        }
    }

    /// Session lifetime
    #[must_use]
    pub const fn session_hours(&self) -> i64 {
        self.token_expiry_hours
    }

    /// Issue a session token for a user
    ///
    /// # Errors
    ///
    /// Returns an error if token encoding fails
    pub fn generate_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role.as_str().to_owned(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.token_expiry_hours)).timestamp(),
            aud: SESSION_AUDIENCE.to_owned(),
            ver: user.session_version,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to sign session token: {e}")))
    }

    /// Validate a session token
    ///
    /// # Errors
    ///
    /// Returns `AUTH_EXPIRED` for expired tokens and `AUTH_INVALID` for any
    /// other validation failure
    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_audience(&[SESSION_AUDIENCE]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AppError::auth_expired(),
                ErrorKind::InvalidSignature => {
                    AppError::auth_invalid("Session token signature verification failed")
                }
                _ => AppError::auth_invalid(format!("Session token is invalid: {e}")),
            })
    }

    /// Hash a password on the blocking pool
    ///
    /// Passwords bcrypt would truncate are refused instead.
    ///
    /// # Errors
    ///
    /// Returns 400 for an over-long password, or an internal error if hashing
    /// fails or the blocking task panics
    pub async fn hash_password(&self, password: &str) -> AppResult<String> {
        let password = password.to_owned();
        let cost = self.bcrypt_cost;
        tokio::task::spawn_blocking(move || bcrypt::non_truncating_hash(password, cost))
            .await
            .map_err(|e| AppError::internal(format!("Password hashing task failed: {e}")))?
            .map_err(|e| match e {
                bcrypt::BcryptError::Truncation(_) => AppError::invalid_input(format!(
                    "Password must be at most {MAX_PASSWORD_BYTES} bytes"
                )),
                other => AppError::internal(format!("Failed to hash password: {other}")),
            })
    }

    /// Verify a password against a stored hash on the blocking pool
    ///
    /// # Errors
    ///
    /// Returns an error if the blocking task panics; a malformed hash or an
    /// over-long password counts as a mismatch
    pub async fn verify_password(&self, password: &str, password_hash: &str) -> AppResult<bool> {
        let password = password.to_owned();
        let password_hash = password_hash.to_owned();
        let verified = tokio::task::spawn_blocking(move || bcrypt::non_truncating_verify(password, &password_hash))
            .await
            .map_err(|e| AppError::internal(format!("Password verification task failed: {e}")))?;
        Ok(verified.unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;
    use crate::permissions::UserRole;

    fn manager() -> AuthManager {
        AuthManager::new(&AuthConfig::for_testing())
    }

    fn user() -> User {
        User::new("groomer@pawhub.test".into(), String::new(), None, UserRole::BusinessOwner)
    }

    #[test]
    fn test_token_round_trip_carries_identity() {
        let auth = manager();
        let user = user();
        let token = auth.generate_token(&user).unwrap();

        let claims = auth.validate_token(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), user.id);
        assert_eq!(claims.role, "business_owner");
        assert_eq!(claims.aud, SESSION_AUDIENCE);
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let mut other_config = AuthConfig::for_testing();
        other_config.jwt_secret = "a-completely-different-secret-value-for-tests".into();
        let token = AuthManager::new(&other_config).generate_token(&user()).unwrap();

        let err = manager().validate_token(&token).unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthInvalid);
    }

    #[test]
    fn test_expired_token_reports_expiry() {
        let mut config = AuthConfig::for_testing();
        config.session_expiry_hours = -1;
        let token = AuthManager::new(&config).generate_token(&user()).unwrap();

        let err = manager().validate_token(&token).unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthExpired);
    }

    #[test]
    fn test_garbage_token_is_invalid() {
        let err = manager().validate_token("not.a.jwt").unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthInvalid);
    }

    #[tokio::test]
    async fn test_password_hash_and_verify() {
        let auth = manager();
        let hash = auth.hash_password("correct horse").await.unwrap();
        assert!(auth.verify_password("correct horse", &hash).await.unwrap());
        assert!(!auth.verify_password("wrong horse", &hash).await.unwrap());
        assert!(!auth.verify_password("anything", "not-a-hash").await.unwrap());
    }

    #[tokio::test]
    async fn test_long_passwords_are_not_truncated() {
        let auth = manager();
        let prefix = "x".repeat(MAX_PASSWORD_BYTES);

        let err = auth
            .hash_password(&format!("{prefix}REAL-SECRET"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);

        // A hash of the longest accepted password must not accept longer inputs sharing it
        let hash = auth.hash_password(&prefix).await.unwrap();
        assert!(auth.verify_password(&prefix, &hash).await.unwrap());
        assert!(!auth
            .verify_password(&format!("{prefix}anything"), &hash)
            .await
            .unwrap());
    }
}
