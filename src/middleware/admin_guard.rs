// ABOUTME: Role guards for admin and business-management routes
// ABOUTME: Returns 403 when an authenticated user lacks the required role
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

//! Role Guards
//!
//! Handlers authenticate first (401 on failure) and then call one of these
//! guards (403 on failure). The role checked is the one loaded from the
//! database during authentication, never the one baked into the token.
//!
//! ```rust,no_run
//! use pawhub_server::auth::AuthResult;
//! use pawhub_server::middleware::admin_guard::require_admin;
//!
//! fn admin_handler(auth: &AuthResult) -> Result<String, pawhub_server::errors::AppError> {
//!     let admin = require_admin(auth)?;
//!     Ok(format!("Welcome admin: {}", admin.email))
//! }
//! ```

use crate::auth::AuthResult;
use crate::errors::{AppError, ErrorCode};
use crate::logging::AppLogger;
use crate::models::User;

/// Require admin privileges
///
/// # Errors
///
/// Returns 403 Forbidden if the user is not an admin
pub fn require_admin(auth: &AuthResult) -> Result<&User, AppError> {
    if !auth.user.role.is_admin() {
        AppLogger::log_security_event(
            "admin_access_denied",
            "medium",
            "Non-admin attempted to use an admin route",
            Some(auth.user_id),
        );
        return Err(AppError::new(
            ErrorCode::PermissionDenied,
            "Admin privileges required",
        ));
    }
    Ok(&auth.user)
}

/// Require a role that may create and manage business listings
///
/// # Errors
///
/// Returns 403 Forbidden for pet owners
pub fn require_business_manager(auth: &AuthResult) -> Result<&User, AppError> {
    if !auth.user.role.can_manage_businesses() {
        return Err(AppError::permission_denied(
            "Only business owners can manage business listings",
        ));
    }
    Ok(&auth.user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthMethod;
    use crate::permissions::UserRole;

    fn auth_as(role: UserRole) -> AuthResult {
        let user = User::new("u@pawhub.test".into(), String::new(), None, role);
        AuthResult {
            user_id: user.id,
            user,
            auth_method: AuthMethod::SessionCookie,
        }
    }

    #[test]
    fn test_require_admin() {
        assert!(require_admin(&auth_as(UserRole::Admin)).is_ok());
        let err = require_admin(&auth_as(UserRole::BusinessOwner)).unwrap_err();
        assert_eq!(err.http_status(), 403);
    }

    #[test]
    fn test_pet_owner_cannot_manage_businesses() {
        assert!(require_business_manager(&auth_as(UserRole::BusinessOwner)).is_ok());
        assert!(require_business_manager(&auth_as(UserRole::Admin)).is_ok());
        assert_eq!(
            require_business_manager(&auth_as(UserRole::PetOwner))
                .unwrap_err()
                .http_status(),
            403
        );
    }
}
