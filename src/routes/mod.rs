// ABOUTME: Route module organization for PawHub HTTP endpoints
// ABOUTME: Groups routes by domain and holds the helpers every handler shares
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

//! Route module for the PawHub server
//!
//! Each domain module exposes a `XRoutes::routes(resources)` constructor and
//! thin handlers: authenticate, parse, call a manager or service, shape the
//! response. Business rules live in [`crate::services`].

/// Admin CMS routes
pub mod admin;
/// Booking routes
pub mod appointments;
/// Registration, login and session routes
pub mod auth;
/// Public catalog and owner listing management
pub mod businesses;
/// Categories, SEO location tree and CMS pages
pub mod content;
/// Business owner dashboard
pub mod dashboard;
/// Error-mapped request extractors
pub mod extract;
/// Health check routes
pub mod health;
/// In-app notification routes
pub mod notifications;
/// Pet profile routes
pub mod pets;
/// Review reply routes
pub mod reviews;
/// Service catalog edits
pub mod services;
/// XML sitemap
pub mod sitemap;
/// Shared JSON view models
pub mod types;

pub use admin::AdminRoutes;
pub use appointments::AppointmentRoutes;
pub use auth::AuthRoutes;
pub use businesses::BusinessRoutes;
pub use content::ContentRoutes;
pub use dashboard::DashboardRoutes;
pub use extract::{ApiJson, ApiQuery};
pub use health::HealthRoutes;
pub use notifications::NotificationRoutes;
pub use pets::PetRoutes;
pub use reviews::ReviewRoutes;
pub use services::ServiceRoutes;
pub use sitemap::SitemapRoutes;

use axum::http::HeaderMap;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthResult;
use crate::constants::limits::MAX_PAGE_SIZE;
use crate::errors::{AppError, AppResult};
use crate::pagination::PageParams;
use crate::resources::ServerResources;

/// Authenticate from the session cookie or bearer header
pub(crate) async fn authenticate(headers: &HeaderMap, resources: &ServerResources) -> AppResult<AuthResult> {
    resources
        .auth_middleware
        .authenticate_request_with_headers(headers)
        .await
}

/// Parse a path id; malformed ids are reported like unknown ones
pub(crate) fn parse_id(raw: &str, resource: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::not_found(resource))
}

/// Parse an optional id from a request body
pub(crate) fn parse_ref(raw: Option<&str>, field: &str) -> AppResult<Option<Uuid>> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| Uuid::parse_str(s).map_err(|_| AppError::invalid_input(format!("{field} is not a valid id"))))
        .transpose()
}

/// `page` and `per_page` query parameters
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    /// 1-based page
    pub page: Option<u32>,
    /// Page size, clamped to the route's maximum
    pub per_page: Option<u32>,
}

impl PageQuery {
    /// Clamp to the public page size
    #[must_use]
    pub fn params(&self) -> PageParams {
        PageParams::new(self.page, self.per_page, MAX_PAGE_SIZE)
    }

    /// Clamp to a route-specific page size
    #[must_use]
    pub fn params_with_max(&self, max_per_page: u32) -> PageParams {
        PageParams::new(self.page, self.per_page, max_per_page)
    }
}
