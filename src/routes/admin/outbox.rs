// ABOUTME: Admin email outbox route handlers
// ABOUTME: Lets operators inspect queued, sent and failed emails and retry delivery
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};

use crate::auth::AuthResult;
use crate::constants::limits::MAX_ADMIN_PAGE_SIZE;
use crate::errors::AppResult;
use crate::logging::AppLogger;
use crate::models::EmailStatus;
use crate::pagination::{Page, PageParams};
use crate::resources::ServerResources;
use crate::routes::ApiQuery;
use crate::routes::types::OutboxEmailResponse;

use super::types::{FlushOutboxQuery, ListOutboxQuery};

const DEFAULT_FLUSH_LIMIT: u32 = 50;
const MAX_FLUSH_LIMIT: u32 = 500;

pub(super) async fn handle_list_outbox(
    State(resources): State<Arc<ServerResources>>,
    ApiQuery(query): ApiQuery<ListOutboxQuery>,
) -> AppResult<impl IntoResponse> {
    let status = query
        .status
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.trim().to_lowercase().parse::<EmailStatus>())
        .transpose()?;
    let params = PageParams::new(query.page, query.per_page, MAX_ADMIN_PAGE_SIZE);
    let (emails, total) = resources.database.outbox().list(status, params).await?;

    Ok((
        StatusCode::OK,
        Json(Page::new(emails, params, total).map(OutboxEmailResponse::from)),
    ))
}

/// Hand the oldest queued emails to the mailer now
pub(super) async fn handle_flush_outbox(
    State(resources): State<Arc<ServerResources>>,
    Extension(auth): Extension<AuthResult>,
    ApiQuery(query): ApiQuery<FlushOutboxQuery>,
) -> AppResult<impl IntoResponse> {
    let limit = query.limit.unwrap_or(DEFAULT_FLUSH_LIMIT).clamp(1, MAX_FLUSH_LIMIT);
    let summary = resources.dispatcher.flush_queued(i64::from(limit)).await?;

    AppLogger::log_admin_action(auth.user_id, "flush_outbox", "email_outbox", "queued");
    Ok((StatusCode::OK, Json(summary)))
}
