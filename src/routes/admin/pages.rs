// ABOUTME: Admin CMS page route handlers
// ABOUTME: Creates and edits static pages and toggles whether they are published
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
use crate::routes::types::PageResponse;
use crate::routes::{parse_id, ApiJson, ApiQuery, PageQuery};

use super::paginate;
use super::types::PageRequest;

/// List every page, drafts included
pub(super) async fn handle_list_pages(
    State(resources): State<Arc<ServerResources>>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> AppResult<impl IntoResponse> {
    let pages = resources.database.content().list_pages(true).await?;
    let params = query.params_with_max(MAX_ADMIN_PAGE_SIZE);
    Ok((StatusCode::OK, Json(paginate(pages, params).map(PageResponse::from))))
}

pub(super) async fn handle_get_page(
    State(resources): State<Arc<ServerResources>>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let page_id = parse_id(&id, "Page")?;
    let page = resources
        .database
        .content()
        .get_page(page_id)
        .await?
        .ok_or_else(|| AppError::not_found("Page"))?;
    Ok((StatusCode::OK, Json(PageResponse::from(page))))
}

pub(super) async fn handle_create_page(
    State(resources): State<Arc<ServerResources>>,
    Extension(auth): Extension<AuthResult>,
    ApiJson(request): ApiJson<PageRequest>,
) -> AppResult<impl IntoResponse> {
    let page = request.validate_new()?;
    resources.database.content().create_page(&page).await?;

    AppLogger::log_admin_action(auth.user_id, "create_page", "page", &page.id.to_string());
    Ok((StatusCode::CREATED, Json(PageResponse::from(page))))
}

pub(super) async fn handle_update_page(
    State(resources): State<Arc<ServerResources>>,
    Extension(auth): Extension<AuthResult>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<PageRequest>,
) -> AppResult<impl IntoResponse> {
    let page_id = parse_id(&id, "Page")?;
    let update = request.validate_update()?;
    let page = resources
        .database
        .content()
        .update_page(page_id, &update)
        .await?
        .ok_or_else(|| AppError::not_found("Page"))?;

    AppLogger::log_admin_action(auth.user_id, "update_page", "page", &id);
    Ok((StatusCode::OK, Json(PageResponse::from(page))))
}

/// Publish a draft or unpublish a live page
pub(super) async fn handle_toggle_published(
    State(resources): State<Arc<ServerResources>>,
    Extension(auth): Extension<AuthResult>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let page_id = parse_id(&id, "Page")?;
    let content = resources.database.content();
    let page = content
        .get_page(page_id)
        .await?
        .ok_or_else(|| AppError::not_found("Page"))?;
    if !content.set_page_published(page_id, !page.is_published).await? {
        return Err(AppError::not_found("Page"));
    }
    let page = content
        .get_page(page_id)
        .await?
        .ok_or_else(|| AppError::not_found("Page"))?;

    let action = if page.is_published { "publish_page" } else { "unpublish_page" };
    AppLogger::log_admin_action(auth.user_id, action, "page", &id);
    Ok((StatusCode::OK, Json(PageResponse::from(page))))
}
