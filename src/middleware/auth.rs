// ABOUTME: Request authentication from the session cookie or a bearer token
// ABOUTME: Validates the JWT and reloads the user so role changes apply immediately
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

use std::sync::Arc;

use axum::http::HeaderMap;

use crate::auth::{AuthManager, AuthMethod, AuthResult};
use crate::constants::cookies::SESSION;
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::security::cookies::get_cookie_value;

/// Middleware for session authentication
#[derive(Clone)]
pub struct AuthMiddleware {
    auth_manager: Arc<AuthManager>,
    database: Database,
}

impl AuthMiddleware {
    /// Create new auth middleware
    #[must_use]
    pub const fn new(auth_manager: Arc<AuthManager>, database: Database) -> Self {
        Self {
            auth_manager,
            database,
        }
    }

    /// Authenticate a request from its headers
    ///
    /// The session cookie is preferred; the `Authorization: Bearer` header is
    /// the fallback for API clients.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No credentials were presented (401)
    /// - The token is invalid or expired (401)
    /// - The user no longer exists or is deactivated (401)
    /// - The user has logged out since the token was issued (401)
    /// - The user lookup fails
    #[tracing::instrument(
        skip(self, headers),
        fields(
            auth_method = tracing::field::Empty,
            user_id = tracing::field::Empty,
            success = tracing::field::Empty,
        )
    )]
    pub async fn authenticate_request_with_headers(
        &self,
        headers: &HeaderMap,
    ) -> AppResult<AuthResult> {
        let (token, method) = if let Some(token) = get_cookie_value(headers, SESSION) {
            (token, AuthMethod::SessionCookie)
        } else if let Some(token) = bearer_token(headers)? {
            (token, AuthMethod::BearerToken)
        } else {
            return Err(AppError::auth_required());
        };

        tracing::Span::current().record("auth_method", method.display_name());
        match self.authenticate_token(&token, method).await {
            Ok(result) => {
                tracing::Span::current()
                    .record("user_id", result.user_id.to_string())
                    .record("success", true);
                Ok(result)
            }
            Err(e) => {
                tracing::Span::current().record("success", false);
                tracing::debug!("Session authentication failed: {}", e);
                Err(e)
            }
        }
    }

    /// Like [`Self::authenticate_request_with_headers`] but anonymous requests
    /// yield `None`; presented but invalid credentials are still an error
    ///
    /// # Errors
    ///
    /// Returns an error if credentials are present but invalid
    pub async fn authenticate_optional(&self, headers: &HeaderMap) -> AppResult<Option<AuthResult>> {
        match self.authenticate_request_with_headers(headers).await {
            Ok(result) => Ok(Some(result)),
            Err(e) if e.code == crate::errors::ErrorCode::AuthRequired => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn authenticate_token(&self, token: &str, method: AuthMethod) -> AppResult<AuthResult> {
        let claims = self.auth_manager.validate_token(token)?;
        let user_id = claims.user_id()?;

        let user = self
            .database
            .users()
            .get(user_id)
            .await?
            .ok_or_else(|| AppError::auth_invalid("Session user no longer exists"))?;

        if !user.is_active {
            AppLogger::log_security_event(
                "inactive_session",
                "low",
                "Session presented for a deactivated account",
                Some(user_id),
            );
            return Err(AppError::auth_invalid("Account is deactivated"));
        }
        if claims.ver != user.session_version {
            return Err(AppError::auth_invalid("Session has been signed out"));
        }

        Ok(AuthResult {
            user_id,
            user,
            auth_method: method,
        })
    }

    /// Get reference to the auth manager
    #[must_use]
    pub fn auth_manager(&self) -> &AuthManager {
        &self.auth_manager
    }
}

fn bearer_token(headers: &HeaderMap) -> AppResult<Option<String>> {
    let Some(value) = headers.get(axum::http::header::AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|_| AppError::auth_invalid("Authorization header is not valid text"))?;
    value
        .strip_prefix("Bearer ")
        .map(|token| Some(token.trim().to_owned()))
        .ok_or_else(|| {
            AppError::auth_invalid("Invalid authorization header format - must be 'Bearer <token>'")
        })
}
