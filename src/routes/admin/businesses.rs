// ABOUTME: Admin business moderation route handlers
// ABOUTME: Filters listings, changes plan and verification, and toggles businesses active
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
use crate::database::AdminBusinessFilter;
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::pagination::{Page, PageParams};
use crate::resources::ServerResources;
use crate::routes::types::BusinessResponse;
use crate::routes::{parse_id, parse_ref, ApiJson, ApiQuery};
use crate::services::businesses::moderate_business;

use super::types::{ListBusinessesQuery, UpdateBusinessRequest};

/// List businesses, including inactive ones
pub(super) async fn handle_list_businesses(
    State(resources): State<Arc<ServerResources>>,
    ApiQuery(query): ApiQuery<ListBusinessesQuery>,
) -> AppResult<impl IntoResponse> {
    let filter = AdminBusinessFilter {
        plan: query
            .plan
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .map(str::parse)
            .transpose()?,
        city_id: parse_ref(query.city_id.as_deref(), "city_id")?,
        is_active: query.active,
        is_verified: query.verified,
        q: query.q.filter(|q| !q.trim().is_empty()),
    };
    let params = PageParams::new(query.page, query.per_page, MAX_ADMIN_PAGE_SIZE);
    let (businesses, total) = resources.database.businesses().admin_list(&filter, params).await?;

    Ok((
        StatusCode::OK,
        Json(Page::new(businesses, params, total).map(BusinessResponse::from)),
    ))
}

/// Get a single business by id, active or not
pub(super) async fn handle_get_business(
    State(resources): State<Arc<ServerResources>>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let business_id = parse_id(&id, "Business")?;
    let business = resources
        .database
        .businesses()
        .get(business_id)
        .await?
        .ok_or_else(|| AppError::not_found("Business"))?;
    Ok((StatusCode::OK, Json(BusinessResponse::from(business))))
}

/// Change plan, verification, category or location
///
/// A plan change re-ranks the business in the same transaction.
pub(super) async fn handle_update_business(
    State(resources): State<Arc<ServerResources>>,
    Extension(auth): Extension<AuthResult>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateBusinessRequest>,
) -> AppResult<impl IntoResponse> {
    let business_id = parse_id(&id, "Business")?;
    let patch = request.validate()?;
    let business = moderate_business(&resources.database, business_id, patch).await?;

    if let Some(plan) = patch.plan {
        info!(
            business.id = %business_id,
            plan = %plan.as_str(),
            featured_score = business.featured_score,
            "Business plan changed"
        );
    }

    AppLogger::log_admin_action(auth.user_id, "update_business", "business", &business_id.to_string());
    Ok((StatusCode::OK, Json(BusinessResponse::from(business))))
}

/// Flip a business's active flag
pub(super) async fn handle_toggle_business(
    State(resources): State<Arc<ServerResources>>,
    Extension(auth): Extension<AuthResult>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let business_id = parse_id(&id, "Business")?;
    let businesses = resources.database.businesses();
    let business = businesses
        .get(business_id)
        .await?
        .ok_or_else(|| AppError::not_found("Business"))?;
    if !businesses.set_active(business_id, !business.is_active).await? {
        return Err(AppError::not_found("Business"));
    }
    let business = businesses
        .get(business_id)
        .await?
        .ok_or_else(|| AppError::not_found("Business"))?;

    let action = if business.is_active {
        "activate_business"
    } else {
        "deactivate_business"
    };
    AppLogger::log_admin_action(auth.user_id, action, "business", &business_id.to_string());
    Ok((StatusCode::OK, Json(BusinessResponse::from(business))))
}
