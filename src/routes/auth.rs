// ABOUTME: Registration, login, logout and profile route handlers
// ABOUTME: Issues the HttpOnly session cookie and returns the token for API clients
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

//! Authentication routes
//!
//! Login answers the same 401 for an unknown email and a wrong password so
//! the endpoint cannot be used to probe for accounts.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::limits::MAX_NAME_LENGTH;
use crate::database::UserUpdate;
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::models::User;
use crate::permissions::UserRole;
use crate::resources::ServerResources;
use crate::routes::{authenticate, ApiJson};
use crate::routes::types::UserResponse;
use crate::security::cookies::{clear_session_cookie, session_cookie};
use crate::services::validation::{normalize_email, optional_text, validate_password};

/// Registration body
#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub display_name: Option<String>,
    pub phone: Option<String>,
    /// `pet_owner` (default) or `business_owner`
    pub role: Option<String>,
}

/// Registration input after validation
struct ValidRegistration {
    email: String,
    password: String,
    display_name: Option<String>,
    phone: Option<String>,
    role: UserRole,
}

impl RegisterRequest {
    fn validate(self) -> AppResult<ValidRegistration> {
        let email = normalize_email(self.email.as_deref().unwrap_or_default())?;
        let password = self.password.unwrap_or_default();
        validate_password(&password)?;
        let role = match self.role.as_deref().map(str::trim) {
            None | Some("") => UserRole::PetOwner,
            Some(raw) => raw.parse::<UserRole>()?,
        };
        if !role.is_self_assignable() {
            return Err(AppError::permission_denied(
                "This role cannot be chosen at registration",
            ));
        }
        Ok(ValidRegistration {
            email,
            password,
            display_name: optional_text("Display name", self.display_name.as_deref(), MAX_NAME_LENGTH)?,
            phone: optional_text("Phone", self.phone.as_deref(), 40)?,
            role,
        })
    }
}

/// Login body
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Profile edit body
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub display_name: Option<String>,
    pub phone: Option<String>,
}

/// Session issued on login or registration
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    /// The signed-in user
    pub user: UserResponse,
    /// Same token as the cookie, for `Authorization: Bearer` clients
    pub token: String,
    /// Token expiry
    pub expires_at: String,
}

/// Authentication routes implementation
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create all authentication routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/auth/register", post(Self::handle_register))
            .route("/api/auth/login", post(Self::handle_login))
            .route("/api/auth/logout", post(Self::handle_logout))
            .route("/api/auth/me", get(Self::handle_me).patch(Self::handle_update_me))
            .with_state(resources)
    }

    fn session_response(resources: &ServerResources, user: User, status: StatusCode) -> AppResult<Response> {
        let auth_manager = &resources.auth_manager;
        let token = auth_manager.generate_token(&user)?;
        let hours = auth_manager.session_hours();
        let cookie = session_cookie(&token, hours, resources.config.auth.cookie_secure)?;

        let body = SessionResponse {
            user: user.into(),
            token,
            expires_at: (Utc::now() + Duration::hours(hours)).to_rfc3339(),
        };
        let mut response = (status, Json(body)).into_response();
        response.headers_mut().insert(header::SET_COOKIE, cookie);
        Ok(response)
    }

    /// Handle POST /api/auth/register
    async fn handle_register(
        State(resources): State<Arc<ServerResources>>,
        ApiJson(body): ApiJson<RegisterRequest>,
    ) -> Result<Response, AppError> {
        let input = body.validate()?;
        let password_hash = resources.auth_manager.hash_password(&input.password).await?;

        let mut user = User::new(input.email, password_hash, input.display_name, input.role);
        user.phone = input.phone;
        resources.database.users().create(&user).await?;

        AppLogger::log_auth_event(Some(user.id), "register", true, Some(user.role.as_str()));
        Self::session_response(&resources, user, StatusCode::CREATED)
    }

    /// Handle POST /api/auth/login
    async fn handle_login(
        State(resources): State<Arc<ServerResources>>,
        ApiJson(body): ApiJson<LoginRequest>,
    ) -> Result<Response, AppError> {
        let email = body.email.as_deref().unwrap_or_default().trim().to_lowercase();
        let password = body.password.unwrap_or_default();
        if email.is_empty() || password.is_empty() {
            return Err(AppError::invalid_input("Email and password are required"));
        }

        let invalid = || AppError::auth_invalid("Invalid email or password");
        let Some(user) = resources.database.users().get_by_email(&email).await? else {
            AppLogger::log_auth_event(None, "login", false, Some("unknown email"));
            return Err(invalid());
        };
        if !resources
            .auth_manager
            .verify_password(&password, &user.password_hash)
            .await?
        {
            AppLogger::log_auth_event(Some(user.id), "login", false, Some("wrong password"));
            return Err(invalid());
        }
        if !user.is_active {
            AppLogger::log_auth_event(Some(user.id), "login", false, Some("deactivated"));
            return Err(AppError::auth_invalid("Account is deactivated"));
        }

        resources.database.users().touch_last_active(user.id).await?;
        AppLogger::log_auth_event(Some(user.id), "login", true, None);
        Self::session_response(&resources, user, StatusCode::OK)
    }

    /// Handle POST /api/auth/logout
    ///
    /// Clears the cookie and bumps the user's session version, which voids
    /// every token issued before, including copies used as bearer tokens.
    async fn handle_logout(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        // A missing, expired or already revoked session has nothing to revoke
        if let Ok(Some(auth)) = resources.auth_middleware.authenticate_optional(&headers).await {
            resources.database.users().revoke_sessions(auth.user_id).await?;
            AppLogger::log_auth_event(Some(auth.user_id), "logout", true, None);
        }

        let mut response = StatusCode::NO_CONTENT.into_response();
        response.headers_mut().insert(
            header::SET_COOKIE,
            clear_session_cookie(resources.config.auth.cookie_secure),
        );
        Ok(response)
    }

    /// Handle GET /api/auth/me
    async fn handle_me(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let response: UserResponse = auth.user.into();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle PATCH /api/auth/me
    async fn handle_update_me(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        ApiJson(body): ApiJson<UpdateProfileRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let update = UserUpdate {
            display_name: optional_text("Display name", body.display_name.as_deref(), MAX_NAME_LENGTH)?,
            phone: optional_text("Phone", body.phone.as_deref(), 40)?,
            role: None,
        };
        let user = resources
            .database
            .users()
            .update(auth.user_id, &update)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;

        let response: UserResponse = user.into();
        Ok((StatusCode::OK, Json(response)).into_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(role: Option<&str>) -> RegisterRequest {
        RegisterRequest {
            email: Some(" Ada@Example.com ".into()),
            password: Some("correct horse".into()),
            role: role.map(Into::into),
            ..Default::default()
        }
    }

    #[test]
    fn test_register_defaults_to_pet_owner() {
        let valid = request(None).validate().unwrap();
        assert_eq!(valid.role, UserRole::PetOwner);
        assert_eq!(valid.email, "ada@example.com");
    }

    #[test]
    fn test_register_rejects_admin_role() {
        let err = request(Some("admin")).validate().unwrap_err();
        assert_eq!(err.http_status(), 403);
    }

    #[test]
    fn test_register_rejects_short_password() {
        let mut req = request(Some("business_owner"));
        req.password = Some("short".into());
        assert_eq!(req.validate().unwrap_err().http_status(), 400);
    }
}
