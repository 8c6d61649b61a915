// ABOUTME: Admin review moderation route handlers
// ABOUTME: Lists reviews by business and rating and removes reviews, re-ranking the business
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
use crate::database::ReviewFilter;
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::pagination::{Page, PageParams};
use crate::resources::ServerResources;
use crate::routes::types::ReviewResponse;
use crate::routes::{parse_id, parse_ref, ApiQuery};
use crate::services::reviews::delete_review;

use super::types::ListReviewsQuery;

pub(super) async fn handle_list_reviews(
    State(resources): State<Arc<ServerResources>>,
    ApiQuery(query): ApiQuery<ListReviewsQuery>,
) -> AppResult<impl IntoResponse> {
    if query.rating.is_some_and(|r| !(1..=5).contains(&r)) {
        return Err(AppError::invalid_input("rating must be between 1 and 5"));
    }
    let filter = ReviewFilter {
        business_id: parse_ref(query.business_id.as_deref(), "business_id")?,
        rating: query.rating,
    };
    let params = PageParams::new(query.page, query.per_page, MAX_ADMIN_PAGE_SIZE);
    let (reviews, total) = resources.database.reviews().list(&filter, params).await?;

    Ok((
        StatusCode::OK,
        Json(Page::new(reviews, params, total).map(ReviewResponse::from)),
    ))
}

/// Delete a review; the business's rating and rank are recomputed
pub(super) async fn handle_delete_review(
    State(resources): State<Arc<ServerResources>>,
    Extension(auth): Extension<AuthResult>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let review_id = parse_id(&id, "Review")?;
    let review = delete_review(&resources, review_id).await?;

    AppLogger::log_admin_action(auth.user_id, "delete_review", "review", &id);
    info!(review.id = %review_id, business.id = %review.business_id, "Review removed by admin");
    Ok(StatusCode::NO_CONTENT)
}
