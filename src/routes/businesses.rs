// ABOUTME: Public catalog search and business owner listing management routes
// ABOUTME: Search and detail are anonymous; create, edit, services and bookings need a manager
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

//! Business routes
//!
//! `GET /api/businesses/:id` takes a slug, every other `:id` route a UUID.
//! Inactive listings are invisible to the public and answer 404.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::constants::limits::{DETAIL_RECENT_REVIEWS, MAX_ADMIN_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::database::{AppointmentFilter, BusinessSearch, BusinessSort, ReviewFilter};
use crate::errors::{AppError, AppResult};
use crate::middleware::require_business_manager;
use crate::models::AppointmentStatus;
use crate::pagination::{Page, PageParams};
use crate::resources::ServerResources;
use crate::routes::services::CreateServiceRequest;
use crate::routes::types::{
    AppointmentResponse, BusinessResponse, CategoryResponse, ReviewResponse, ServiceResponse,
};
use crate::routes::{authenticate, parse_id, parse_ref, ApiJson, ApiQuery, PageQuery};
use crate::services::businesses::{create_business, get_managed, update_business, ListingDetails, ListingRefs};
use crate::services::reviews::create_review;

/// Public search query
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    /// Category slug
    pub category: Option<String>,
    /// City slug
    pub city: Option<String>,
    /// District slug
    pub district: Option<String>,
    /// Neighborhood slug
    pub neighborhood: Option<String>,
    /// Free-text filter on name and description
    pub q: Option<String>,
    pub min_rating: Option<f64>,
    pub verified: Option<bool>,
    /// `featured` (default), `rating`, `reviews`, `newest` or `name`
    pub sort: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl SearchQuery {
    fn into_search(self) -> AppResult<(BusinessSearch, PageParams)> {
        let sort = match self.sort.as_deref().map(str::trim) {
            None | Some("") => BusinessSort::default(),
            Some(raw) => raw.parse()?,
        };
        if let Some(min_rating) = self.min_rating {
            if !(0.0..=5.0).contains(&min_rating) {
                return Err(AppError::out_of_range("min_rating must be between 0 and 5"));
            }
        }
        let params = PageParams::new(self.page, self.per_page, MAX_PAGE_SIZE);
        Ok((
            BusinessSearch {
                category: self.category,
                city: self.city,
                district: self.district,
                neighborhood: self.neighborhood,
                q: self.q,
                min_rating: self.min_rating,
                verified: self.verified,
                sort,
            },
            params,
        ))
    }
}

/// Create or edit body for a listing
#[derive(Debug, Default, Deserialize)]
pub struct ListingRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub category_id: Option<String>,
    pub city_id: Option<String>,
    pub district_id: Option<String>,
    pub neighborhood_id: Option<String>,
}

impl ListingRequest {
    /// Split into details and parsed references
    pub fn into_parts(self) -> AppResult<(ListingDetails, ListingRefs)> {
        let refs = ListingRefs {
            category_id: parse_ref(self.category_id.as_deref(), "category_id")?,
            city_id: parse_ref(self.city_id.as_deref(), "city_id")?,
            district_id: parse_ref(self.district_id.as_deref(), "district_id")?,
            neighborhood_id: parse_ref(self.neighborhood_id.as_deref(), "neighborhood_id")?,
        };
        let details = ListingDetails {
            name: self.name,
            description: self.description,
            phone: self.phone,
            email: self.email,
            address: self.address,
        };
        Ok((details, refs))
    }
}

/// Owner view of bookings
#[derive(Debug, Default, Deserialize)]
pub struct BusinessAppointmentsQuery {
    /// Status filter, e.g. `PENDING`
    pub status: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// New review body
#[derive(Debug, Default, Deserialize)]
pub struct CreateReviewRequest {
    /// 1 to 5
    pub rating: Option<i64>,
    pub comment: Option<String>,
}

/// Listing detail page
#[derive(Debug, Serialize, Deserialize)]
pub struct BusinessDetailResponse {
    pub business: BusinessResponse,
    pub category: Option<CategoryResponse>,
    /// Active services, cheapest first
    pub services: Vec<ServiceResponse>,
    /// Newest reviews
    pub recent_reviews: Vec<ReviewResponse>,
}

/// Business routes implementation
pub struct BusinessRoutes;

impl BusinessRoutes {
    /// Create all business routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/businesses",
                get(Self::handle_search).post(Self::handle_create),
            )
            .route(
                "/api/businesses/:id",
                get(Self::handle_detail).patch(Self::handle_update),
            )
            .route("/api/businesses/:id/services", post(Self::handle_create_service))
            .route(
                "/api/businesses/:id/appointments",
                get(Self::handle_list_appointments),
            )
            .route(
                "/api/businesses/:id/reviews",
                get(Self::handle_list_reviews).post(Self::handle_create_review),
            )
            .with_state(resources)
    }

    /// Handle GET /api/businesses
    async fn handle_search(
        State(resources): State<Arc<ServerResources>>,
        ApiQuery(query): ApiQuery<SearchQuery>,
    ) -> Result<Response, AppError> {
        let (search, params) = query.into_search()?;
        let (businesses, total) = resources.database.businesses().search(&search, params).await?;

        let response = Page::new(businesses, params, total).map(BusinessResponse::from);
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle GET /api/businesses/:slug
    async fn handle_detail(
        State(resources): State<Arc<ServerResources>>,
        Path(slug): Path<String>,
    ) -> Result<Response, AppError> {
        let database = &resources.database;
        let business = database
            .businesses()
            .get_by_slug(&slug)
            .await?
            .filter(|b| b.is_active)
            .ok_or_else(|| AppError::not_found("Business"))?;

        let category = match business.category_id {
            Some(category_id) => database
                .content()
                .get_category(category_id)
                .await?
                .filter(|c| c.is_active)
                .map(CategoryResponse::from),
            None => None,
        };
        let services = database.services().list_for_business(business.id, false).await?;
        let filter = ReviewFilter {
            business_id: Some(business.id),
            rating: None,
        };
        let recent = PageParams::new(Some(1), Some(DETAIL_RECENT_REVIEWS), DETAIL_RECENT_REVIEWS);
        let (reviews, _) = database.reviews().list(&filter, recent).await?;

        let response = BusinessDetailResponse {
            business: business.into(),
            category,
            services: services.into_iter().map(Into::into).collect(),
            recent_reviews: reviews.into_iter().map(Into::into).collect(),
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle POST /api/businesses
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        ApiJson(body): ApiJson<ListingRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let owner = require_business_manager(&auth)?;
        let (details, refs) = body.into_parts()?;

        let business = create_business(&resources.database, owner, &details, refs).await?;
        tracing::info!(business.id = %business.id, owner.id = %owner.id, slug = %business.slug, "Business listed");

        let response: BusinessResponse = business.into();
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle PATCH /api/businesses/:id
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        ApiJson(body): ApiJson<ListingRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let business_id = parse_id(&id, "Business")?;
        get_managed(&resources.database, &auth.user, business_id).await?;
        let (details, refs) = body.into_parts()?;

        let business = update_business(&resources.database, business_id, &details, refs).await?;
        let response: BusinessResponse = business.into();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle POST /api/businesses/:id/services
    async fn handle_create_service(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        ApiJson(body): ApiJson<CreateServiceRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let business_id = parse_id(&id, "Business")?;
        let business = get_managed(&resources.database, &auth.user, business_id).await?;

        let service = body.validate(business.id)?;
        resources.database.services().create(&service).await?;

        let response: ServiceResponse = service.into();
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle GET /api/businesses/:id/appointments
    async fn handle_list_appointments(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        ApiQuery(query): ApiQuery<BusinessAppointmentsQuery>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let business_id = parse_id(&id, "Business")?;
        get_managed(&resources.database, &auth.user, business_id).await?;

        let status = query
            .status
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(str::parse::<AppointmentStatus>)
            .transpose()?;
        let filter = AppointmentFilter {
            user_id: None,
            business_id: Some(business_id),
            status,
        };
        let params = PageParams::new(query.page, query.per_page, MAX_ADMIN_PAGE_SIZE);
        let (appointments, total) = resources.database.appointments().list(&filter, params).await?;

        let response = Page::new(appointments, params, total).map(AppointmentResponse::from);
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle GET /api/businesses/:id/reviews
    async fn handle_list_reviews(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
        ApiQuery(query): ApiQuery<PageQuery>,
    ) -> Result<Response, AppError> {
        let business_id = parse_id(&id, "Business")?;
        resources
            .database
            .businesses()
            .get(business_id)
            .await?
            .filter(|b| b.is_active)
            .ok_or_else(|| AppError::not_found("Business"))?;

        let filter = ReviewFilter {
            business_id: Some(business_id),
            rating: None,
        };
        let params = query.params();
        let (reviews, total) = resources.database.reviews().list(&filter, params).await?;

        let response = Page::new(reviews, params, total).map(ReviewResponse::from);
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle POST /api/businesses/:id/reviews
    async fn handle_create_review(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        ApiJson(body): ApiJson<CreateReviewRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let business_id = parse_id(&id, "Business")?;
        let rating = body.rating.ok_or_else(|| AppError::missing_field("Rating"))?;

        let review = create_review(&resources, &auth.user, business_id, rating, body.comment.as_deref()).await?;
        let response: ReviewResponse = review.into();
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }
}
