// ABOUTME: Booking route handlers for customers, business owners and admins
// ABOUTME: Creation and status changes delegate to the booking service
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::constants::limits::MAX_PAGE_SIZE;
use crate::database::AppointmentFilter;
use crate::errors::{AppError, AppResult};
use crate::models::AppointmentStatus;
use crate::pagination::{Page, PageParams};
use crate::resources::ServerResources;
use crate::routes::types::AppointmentResponse;
use crate::routes::{authenticate, parse_id, parse_ref, ApiJson, ApiQuery};
use crate::services::booking::{change_status, create_appointment, get_for_participant, NewBooking};

/// Booking request body
#[derive(Debug, Default, Deserialize)]
pub struct CreateAppointmentRequest {
    pub business_id: Option<String>,
    pub pet_id: Option<String>,
    pub service_id: Option<String>,
    /// RFC 3339 start time
    pub scheduled_at: Option<String>,
    pub notes: Option<String>,
}

impl CreateAppointmentRequest {
    fn validate(self) -> AppResult<NewBooking> {
        let business_id = parse_ref(self.business_id.as_deref(), "business_id")?
            .ok_or_else(|| AppError::missing_field("business_id"))?;
        let pet_id =
            parse_ref(self.pet_id.as_deref(), "pet_id")?.ok_or_else(|| AppError::missing_field("pet_id"))?;
        let raw_start = self
            .scheduled_at
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::missing_field("scheduled_at"))?;
        let scheduled_at = DateTime::parse_from_rfc3339(raw_start)
            .map_err(|_| AppError::invalid_input("scheduled_at must be an RFC 3339 timestamp"))?
            .with_timezone(&Utc);

        Ok(NewBooking {
            business_id,
            pet_id,
            service_id: parse_ref(self.service_id.as_deref(), "service_id")?,
            scheduled_at,
            notes: self.notes,
        })
    }
}

/// Status change body
#[derive(Debug, Default, Deserialize)]
pub struct UpdateStatusRequest {
    /// Target status, e.g. `CONFIRMED`
    pub status: Option<String>,
    /// Kept only when cancelling
    pub reason: Option<String>,
}

/// Own-bookings query
#[derive(Debug, Default, Deserialize)]
pub struct ListAppointmentsQuery {
    pub status: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Appointment routes implementation
pub struct AppointmentRoutes;

impl AppointmentRoutes {
    /// Create all appointment routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/appointments",
                get(Self::handle_list).post(Self::handle_create),
            )
            .route("/api/appointments/:id", get(Self::handle_get))
            .route("/api/appointments/:id/status", patch(Self::handle_update_status))
            .with_state(resources)
    }

    /// Handle POST /api/appointments
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        ApiJson(body): ApiJson<CreateAppointmentRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let request = body.validate()?;
        let appointment = create_appointment(&resources, &auth.user, request).await?;

        let response: AppointmentResponse = appointment.into();
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle GET /api/appointments - the caller's own bookings
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        ApiQuery(query): ApiQuery<ListAppointmentsQuery>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let status = query
            .status
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(str::parse::<AppointmentStatus>)
            .transpose()?;
        let filter = AppointmentFilter {
            user_id: Some(auth.user_id),
            business_id: None,
            status,
        };
        let params = PageParams::new(query.page, query.per_page, MAX_PAGE_SIZE);
        let (appointments, total) = resources.database.appointments().list(&filter, params).await?;

        let response = Page::new(appointments, params, total).map(AppointmentResponse::from);
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle GET /api/appointments/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let appointment_id = parse_id(&id, "Appointment")?;
        let view = get_for_participant(&resources, &auth.user, appointment_id).await?;

        let response: AppointmentResponse = view.appointment.into();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle PATCH /api/appointments/:id/status
    async fn handle_update_status(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        ApiJson(body): ApiJson<UpdateStatusRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let appointment_id = parse_id(&id, "Appointment")?;
        let to: AppointmentStatus = body
            .status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::missing_field("status"))?
            .parse()?;

        let appointment = change_status(
            &resources,
            &auth.user,
            appointment_id,
            to,
            body.reason.as_deref(),
        )
        .await?;
        let response: AppointmentResponse = appointment.into();
        Ok((StatusCode::OK, Json(response)).into_response())
    }
}
