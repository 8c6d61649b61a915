// ABOUTME: Owner-managed service catalog route handlers
// ABOUTME: Edits and soft-deletes services; creation hangs off the business routes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::patch,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::constants::limits::{MAX_NAME_LENGTH, MAX_SERVICE_MINUTES, MAX_TEXT_LENGTH};
use crate::database::ServiceUpdate;
use crate::errors::{AppError, AppResult};
use crate::models::{Service, User};
use crate::resources::ServerResources;
use crate::routes::types::ServiceResponse;
use crate::routes::{authenticate, parse_id, ApiJson};
use crate::services::businesses::get_managed;
use crate::services::validation::{optional_text, required_text};

/// New service body
#[derive(Debug, Default, Deserialize)]
pub struct CreateServiceRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub duration_minutes: Option<u32>,
    pub price_cents: Option<i64>,
}

/// Service edit body; absent fields stay unchanged
#[derive(Debug, Default, Deserialize)]
pub struct UpdateServiceRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub duration_minutes: Option<u32>,
    pub price_cents: Option<i64>,
}

fn check_duration(minutes: u32) -> AppResult<u32> {
    if minutes == 0 || minutes > MAX_SERVICE_MINUTES {
        return Err(AppError::out_of_range(format!(
            "Duration must be between 1 and {MAX_SERVICE_MINUTES} minutes"
        )));
    }
    Ok(minutes)
}

fn check_price(cents: i64) -> AppResult<i64> {
    if cents < 0 {
        return Err(AppError::out_of_range("Price cannot be negative"));
    }
    Ok(cents)
}

impl CreateServiceRequest {
    /// Validate into a new active service of `business_id`
    pub fn validate(self, business_id: Uuid) -> AppResult<Service> {
        let name = required_text("Name", self.name.as_deref().unwrap_or_default(), MAX_NAME_LENGTH)?;
        let duration_minutes = check_duration(
            self.duration_minutes
                .ok_or_else(|| AppError::missing_field("Duration"))?,
        )?;
        let price_cents = check_price(self.price_cents.ok_or_else(|| AppError::missing_field("Price"))?)?;
        Ok(Service {
            id: Uuid::new_v4(),
            business_id,
            name,
            description: optional_text("Description", self.description.as_deref(), MAX_TEXT_LENGTH)?,
            duration_minutes,
            price_cents,
            is_active: true,
        })
    }
}

impl UpdateServiceRequest {
    fn validate(self) -> AppResult<ServiceUpdate> {
        Ok(ServiceUpdate {
            name: self
                .name
                .as_deref()
                .map(|name| required_text("Name", name, MAX_NAME_LENGTH))
                .transpose()?,
            description: optional_text("Description", self.description.as_deref(), MAX_TEXT_LENGTH)?,
            duration_minutes: self.duration_minutes.map(check_duration).transpose()?,
            price_cents: self.price_cents.map(check_price).transpose()?,
        })
    }
}

/// Service routes implementation
pub struct ServiceRoutes;

impl ServiceRoutes {
    /// Create all service routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/services/:id",
                patch(Self::handle_update).delete(Self::handle_delete),
            )
            .with_state(resources)
    }

    /// Load a service whose business the requester manages
    async fn managed_service(resources: &ServerResources, requester: &User, raw_id: &str) -> AppResult<Service> {
        let service_id = parse_id(raw_id, "Service")?;
        let service = resources
            .database
            .services()
            .get(service_id)
            .await?
            .filter(|s| s.is_active)
            .ok_or_else(|| AppError::not_found("Service"))?;
        get_managed(&resources.database, requester, service.business_id).await?;
        Ok(service)
    }

    /// Handle PATCH /api/services/:id
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        ApiJson(body): ApiJson<UpdateServiceRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let service = Self::managed_service(&resources, &auth.user, &id).await?;
        let update = body.validate()?;

        let updated = resources
            .database
            .services()
            .update(service.id, &update)
            .await?
            .ok_or_else(|| AppError::not_found("Service"))?;

        let response: ServiceResponse = updated.into();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle DELETE /api/services/:id (soft delete)
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let service = Self::managed_service(&resources, &auth.user, &id).await?;
        resources.database.services().set_active(service.id, false).await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_requires_positive_duration() {
        let request = CreateServiceRequest {
            name: Some("Full groom".into()),
            duration_minutes: Some(0),
            price_cents: Some(4500),
            ..Default::default()
        };
        assert_eq!(request.validate(Uuid::new_v4()).unwrap_err().http_status(), 400);
    }

    #[test]
    fn test_create_builds_active_service() {
        let business_id = Uuid::new_v4();
        let service = CreateServiceRequest {
            name: Some("  Nail trim ".into()),
            duration_minutes: Some(15),
            price_cents: Some(1500),
            ..Default::default()
        }
        .validate(business_id)
        .unwrap();
        assert_eq!(service.name, "Nail trim");
        assert_eq!(service.business_id, business_id);
        assert!(service.is_active);
    }

    #[test]
    fn test_update_rejects_negative_price() {
        let request = UpdateServiceRequest {
            price_cents: Some(-1),
            ..Default::default()
        };
        assert!(request.validate().is_err());
    }
}
