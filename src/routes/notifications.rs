// ABOUTME: In-app notification route handlers
// ABOUTME: Lists, counts and marks the caller's own notifications read
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::constants::limits::MAX_PAGE_SIZE;
use crate::errors::AppError;
use crate::pagination::{Page, PageParams};
use crate::resources::ServerResources;
use crate::routes::types::NotificationResponse;
use crate::routes::{authenticate, parse_id, ApiQuery};

/// Notification list query
#[derive(Debug, Default, Deserialize)]
pub struct ListNotificationsQuery {
    /// Only unread notifications
    pub unread_only: Option<bool>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Notification routes implementation
pub struct NotificationRoutes;

impl NotificationRoutes {
    /// Create all notification routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/notifications", get(Self::handle_list))
            .route("/api/notifications/unread-count", get(Self::handle_unread_count))
            .route("/api/notifications/read-all", post(Self::handle_mark_all_read))
            .route("/api/notifications/:id/read", post(Self::handle_mark_read))
            .with_state(resources)
    }

    /// Handle GET /api/notifications
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        ApiQuery(query): ApiQuery<ListNotificationsQuery>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let params = PageParams::new(query.page, query.per_page, MAX_PAGE_SIZE);
        let (notifications, total) = resources
            .database
            .notifications()
            .list_for_user(auth.user_id, query.unread_only.unwrap_or(false), params)
            .await?;

        let response = Page::new(notifications, params, total).map(NotificationResponse::from);
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle GET /api/notifications/unread-count
    async fn handle_unread_count(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let unread = resources.database.notifications().unread_count(auth.user_id).await?;
        Ok((StatusCode::OK, Json(json!({ "unread": unread }))).into_response())
    }

    /// Handle POST /api/notifications/:id/read
    async fn handle_mark_read(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let notification_id = parse_id(&id, "Notification")?;
        if !resources
            .database
            .notifications()
            .mark_read(notification_id, auth.user_id)
            .await?
        {
            return Err(AppError::not_found("Notification"));
        }
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle POST /api/notifications/read-all
    async fn handle_mark_all_read(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let marked = resources.database.notifications().mark_all_read(auth.user_id).await?;
        Ok((StatusCode::OK, Json(json!({ "marked": marked }))).into_response())
    }
}
