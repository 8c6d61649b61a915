// ABOUTME: Business owner dashboard route handlers
// ABOUTME: Lists the caller's businesses with appointment counts per status
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::middleware::require_business_manager;
use crate::models::AppointmentStatus;
use crate::resources::ServerResources;
use crate::routes::authenticate;
use crate::routes::types::BusinessResponse;

/// One owned business with its booking counts
#[derive(Debug, Serialize)]
pub struct DashboardBusiness {
    pub business: BusinessResponse,
    /// Count per status, every status present
    pub appointment_counts: BTreeMap<&'static str, u64>,
}

/// Zero-fill counts for statuses with no appointments
fn counts_by_status(counts: &[(AppointmentStatus, u64)]) -> BTreeMap<&'static str, u64> {
    let mut all: BTreeMap<&'static str, u64> = AppointmentStatus::ALL
        .iter()
        .map(|status| (status.wire_name(), 0))
        .collect();
    for (status, count) in counts {
        all.insert(status.wire_name(), *count);
    }
    all
}

/// Dashboard routes implementation
pub struct DashboardRoutes;

impl DashboardRoutes {
    /// Create all dashboard routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/dashboard/businesses", get(Self::handle_businesses))
            .with_state(resources)
    }

    /// Handle GET /api/dashboard/businesses
    async fn handle_businesses(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let owner = require_business_manager(&auth)?;

        let businesses = resources.database.businesses().list_by_owner(owner.id).await?;
        let appointments = resources.database.appointments();
        let mut response = Vec::with_capacity(businesses.len());
        for business in businesses {
            let counts = appointments.status_counts(business.id).await?;
            response.push(DashboardBusiness {
                appointment_counts: counts_by_status(&counts),
                business: business.into(),
            });
        }
        Ok((StatusCode::OK, Json(response)).into_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_are_zero_filled() {
        let counts = counts_by_status(&[(AppointmentStatus::Pending, 3), (AppointmentStatus::NoShow, 1)]);
        assert_eq!(counts.len(), AppointmentStatus::ALL.len());
        assert_eq!(counts["PENDING"], 3);
        assert_eq!(counts["NO_SHOW"], 1);
        assert_eq!(counts["COMPLETED"], 0);
    }
}
