// ABOUTME: Admin user management route handlers
// ABOUTME: Lists users, edits role and display name, and toggles accounts active
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use tracing::info;

use crate::auth::AuthResult;
use crate::constants::limits::MAX_ADMIN_PAGE_SIZE;
use crate::database::UserFilter;
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::pagination::{Page, PageParams};
use crate::resources::ServerResources;
use crate::routes::{parse_id, ApiJson, ApiQuery};
use crate::routes::types::UserResponse;

use super::types::{ListUsersQuery, UpdateUserRequest};

/// List users with role, active and text filters
pub(super) async fn handle_list_users(
    State(resources): State<Arc<ServerResources>>,
    ApiQuery(query): ApiQuery<ListUsersQuery>,
) -> AppResult<impl IntoResponse> {
    let filter = UserFilter {
        role: query.role()?,
        is_active: query.active,
        q: query.q.filter(|q| !q.trim().is_empty()),
    };
    let params = PageParams::new(query.page, query.per_page, MAX_ADMIN_PAGE_SIZE);
    let (users, total) = resources.database.users().list(&filter, params).await?;

    Ok((
        StatusCode::OK,
        Json(Page::new(users, params, total).map(UserResponse::from)),
    ))
}

/// Get a single user
pub(super) async fn handle_get_user(
    State(resources): State<Arc<ServerResources>>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let user_id = parse_id(&id, "User")?;
    let user = resources
        .database
        .users()
        .get(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;
    Ok((StatusCode::OK, Json(UserResponse::from(user))))
}

/// Change a user's role or display name
pub(super) async fn handle_update_user(
    State(resources): State<Arc<ServerResources>>,
    Extension(auth): Extension<AuthResult>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateUserRequest>,
) -> AppResult<impl IntoResponse> {
    let user_id = parse_id(&id, "User")?;
    let update = request.validate()?;

    if user_id == auth.user_id && update.role.is_some_and(|role| !role.is_admin()) {
        return Err(AppError::invalid_input("Admins cannot remove their own admin role"));
    }

    let user = resources
        .database
        .users()
        .update(user_id, &update)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    AppLogger::log_admin_action(auth.user_id, "update_user", "user", &user_id.to_string());
    info!(user.id = %user_id, role = %user.role.as_str(), "User updated by admin");
    Ok((StatusCode::OK, Json(UserResponse::from(user))))
}

/// Flip a user's active flag
pub(super) async fn handle_toggle_user(
    State(resources): State<Arc<ServerResources>>,
    Extension(auth): Extension<AuthResult>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let user_id = parse_id(&id, "User")?;
    if user_id == auth.user_id {
        return Err(AppError::invalid_input("Admins cannot deactivate themselves"));
    }

    let users = resources.database.users();
    let user = users
        .get(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;
    if !users.set_active(user_id, !user.is_active).await? {
        return Err(AppError::not_found("User"));
    }
    let user = users
        .get(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    let action = if user.is_active { "activate_user" } else { "deactivate_user" };
    AppLogger::log_admin_action(auth.user_id, action, "user", &user_id.to_string());
    Ok((StatusCode::OK, Json(UserResponse::from(user))))
}
