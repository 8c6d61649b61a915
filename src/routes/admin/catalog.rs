// ABOUTME: Admin category management route handlers
// ABOUTME: Creates, edits and toggles the service categories businesses are listed under
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

use crate::auth::AuthResult;
use crate::constants::limits::MAX_ADMIN_PAGE_SIZE;
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::resources::ServerResources;
use crate::routes::types::CategoryResponse;
use crate::routes::{parse_id, ApiJson, ApiQuery, PageQuery};

use super::paginate;
use super::types::CategoryRequest;

/// List every category, inactive included, in display order
pub(super) async fn handle_list_categories(
    State(resources): State<Arc<ServerResources>>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> AppResult<impl IntoResponse> {
    let categories = resources.database.content().list_categories(true).await?;
    let params = query.params_with_max(MAX_ADMIN_PAGE_SIZE);
    Ok((
        StatusCode::OK,
        Json(paginate(categories, params).map(CategoryResponse::from)),
    ))
}

pub(super) async fn handle_get_category(
    State(resources): State<Arc<ServerResources>>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let category_id = parse_id(&id, "Category")?;
    let category = resources
        .database
        .content()
        .get_category(category_id)
        .await?
        .ok_or_else(|| AppError::not_found("Category"))?;
    Ok((StatusCode::OK, Json(CategoryResponse::from(category))))
}

/// Create a category; a taken slug is a conflict
pub(super) async fn handle_create_category(
    State(resources): State<Arc<ServerResources>>,
    Extension(auth): Extension<AuthResult>,
    ApiJson(request): ApiJson<CategoryRequest>,
) -> AppResult<impl IntoResponse> {
    let category = request.validate_new()?;
    resources.database.content().create_category(&category).await?;

    AppLogger::log_admin_action(auth.user_id, "create_category", "category", &category.id.to_string());
    Ok((StatusCode::CREATED, Json(CategoryResponse::from(category))))
}

pub(super) async fn handle_update_category(
    State(resources): State<Arc<ServerResources>>,
    Extension(auth): Extension<AuthResult>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<CategoryRequest>,
) -> AppResult<impl IntoResponse> {
    let category_id = parse_id(&id, "Category")?;
    let update = request.validate_update()?;
    let category = resources
        .database
        .content()
        .update_category(category_id, &update)
        .await?
        .ok_or_else(|| AppError::not_found("Category"))?;

    AppLogger::log_admin_action(auth.user_id, "update_category", "category", &id);
    Ok((StatusCode::OK, Json(CategoryResponse::from(category))))
}

/// Flip a category's active flag
pub(super) async fn handle_toggle_category(
    State(resources): State<Arc<ServerResources>>,
    Extension(auth): Extension<AuthResult>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let category_id = parse_id(&id, "Category")?;
    let content = resources.database.content();
    let mut category = content
        .get_category(category_id)
        .await?
        .ok_or_else(|| AppError::not_found("Category"))?;
    category.is_active = !category.is_active;
    if !content.set_category_active(category_id, category.is_active).await? {
        return Err(AppError::not_found("Category"));
    }

    AppLogger::log_admin_action(auth.user_id, "toggle_category", "category", &id);
    Ok((StatusCode::OK, Json(CategoryResponse::from(category))))
}
