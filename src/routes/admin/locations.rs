// ABOUTME: Admin route handlers for cities, districts and neighborhoods
// ABOUTME: One set of handlers serves every level; the level travels as a request extension
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};

use crate::auth::AuthResult;
use crate::constants::limits::MAX_ADMIN_PAGE_SIZE;
use crate::database::LocationLevel;
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::pagination::PageParams;
use crate::resources::ServerResources;
use crate::routes::types::LocationResponse;
use crate::routes::{parse_id, parse_ref, ApiJson, ApiQuery};

use super::paginate;
use super::types::{ListLocationsQuery, LocationRequest};

/// Routes for one level under `/api/admin/{plural}`
pub(super) fn routes(level: LocationLevel, plural: &str) -> Router<Arc<ServerResources>> {
    Router::new()
        .route(
            &format!("/api/admin/{plural}"),
            get(handle_list_locations).post(handle_create_location),
        )
        .route(
            &format!("/api/admin/{plural}/:id"),
            get(handle_get_location).patch(handle_update_location),
        )
        .route(
            &format!("/api/admin/{plural}/:id/toggle"),
            post(handle_toggle_location),
        )
        .layer(Extension(level))
}

fn resource_name(level: LocationLevel) -> String {
    level.label().to_lowercase()
}

/// List nodes of a level, optionally under one parent
async fn handle_list_locations(
    State(resources): State<Arc<ServerResources>>,
    Extension(level): Extension<LocationLevel>,
    ApiQuery(query): ApiQuery<ListLocationsQuery>,
) -> AppResult<impl IntoResponse> {
    let parent_id = parse_ref(query.parent_id.as_deref(), "parent_id")?;
    if parent_id.is_some() && level.parent().is_none() {
        return Err(AppError::invalid_input("Cities have no parent"));
    }
    let nodes = resources
        .database
        .locations()
        .list(level, parent_id, query.include_inactive.unwrap_or(true))
        .await?;

    let params = PageParams::new(query.page, query.per_page, MAX_ADMIN_PAGE_SIZE);
    Ok((
        StatusCode::OK,
        Json(paginate(nodes, params).map(LocationResponse::from)),
    ))
}

async fn handle_get_location(
    State(resources): State<Arc<ServerResources>>,
    Extension(level): Extension<LocationLevel>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let node_id = parse_id(&id, level.label())?;
    let node = resources
        .database
        .locations()
        .get(level, node_id)
        .await?
        .ok_or_else(|| AppError::not_found(level.label()))?;
    Ok((StatusCode::OK, Json(LocationResponse::from(node))))
}

/// Create a node; its slug must be unused among its siblings
async fn handle_create_location(
    State(resources): State<Arc<ServerResources>>,
    Extension(level): Extension<LocationLevel>,
    Extension(auth): Extension<AuthResult>,
    ApiJson(request): ApiJson<LocationRequest>,
) -> AppResult<impl IntoResponse> {
    let (parent_id, input) = request.validate_new()?;
    if parent_id.is_some() && level.parent().is_none() {
        return Err(AppError::invalid_input("Cities have no parent"));
    }
    let node = resources.database.locations().create(level, parent_id, &input).await?;

    AppLogger::log_admin_action(
        auth.user_id,
        &format!("create_{}", resource_name(level)),
        &resource_name(level),
        &node.id.to_string(),
    );
    Ok((StatusCode::CREATED, Json(LocationResponse::from(node))))
}

async fn handle_update_location(
    State(resources): State<Arc<ServerResources>>,
    Extension(level): Extension<LocationLevel>,
    Extension(auth): Extension<AuthResult>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<LocationRequest>,
) -> AppResult<impl IntoResponse> {
    let node_id = parse_id(&id, level.label())?;
    let patch = request.validate_update()?;
    let node = resources
        .database
        .locations()
        .update(level, node_id, &patch)
        .await?
        .ok_or_else(|| AppError::not_found(level.label()))?;

    AppLogger::log_admin_action(
        auth.user_id,
        &format!("update_{}", resource_name(level)),
        &resource_name(level),
        &id,
    );
    Ok((StatusCode::OK, Json(LocationResponse::from(node))))
}

/// Flip a node's active flag
///
/// Children keep their own flag but drop out of public views while a
/// parent is hidden.
async fn handle_toggle_location(
    State(resources): State<Arc<ServerResources>>,
    Extension(level): Extension<LocationLevel>,
    Extension(auth): Extension<AuthResult>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let node_id = parse_id(&id, level.label())?;
    let locations = resources.database.locations();
    let mut node = locations
        .get(level, node_id)
        .await?
        .ok_or_else(|| AppError::not_found(level.label()))?;
    node.is_active = !node.is_active;
    if !locations.set_active(level, node_id, node.is_active).await? {
        return Err(AppError::not_found(level.label()));
    }

    AppLogger::log_admin_action(
        auth.user_id,
        &format!("toggle_{}", resource_name(level)),
        &resource_name(level),
        &id,
    );
    Ok((StatusCode::OK, Json(LocationResponse::from(node))))
}
