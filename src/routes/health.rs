// ABOUTME: Health check route handlers for service monitoring and status endpoints
// ABOUTME: Liveness plus a readiness probe that pings the database
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

//! Health check routes for service monitoring
//!
//! `/health` always answers 200 while the process runs and reports database
//! reachability in the body; `/ready` answers 503 until the database responds.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tracing::warn;

use crate::constants::service_names::PAWHUB_SERVER;
use crate::resources::ServerResources;

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create all health check routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/health", get(Self::handle_health))
            .route("/ready", get(Self::handle_ready))
            .with_state(resources)
    }

    async fn handle_health(State(resources): State<Arc<ServerResources>>) -> Response {
        let database = match resources.database.ping().await {
            Ok(()) => "ok",
            Err(e) => {
                warn!("Health check database ping failed: {}", e);
                "unreachable"
            }
        };
        (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "service": PAWHUB_SERVER,
                "version": env!("CARGO_PKG_VERSION"),
                "database": database,
                "timestamp": chrono::Utc::now().to_rfc3339()
            })),
        )
            .into_response()
    }

    async fn handle_ready(State(resources): State<Arc<ServerResources>>) -> Response {
        let (status, label) = match resources.database.ping().await {
            Ok(()) => (StatusCode::OK, "ready"),
            Err(_) => (StatusCode::SERVICE_UNAVAILABLE, "not_ready"),
        };
        (
            status,
            Json(json!({
                "status": label,
                "timestamp": chrono::Utc::now().to_rfc3339()
            })),
        )
            .into_response()
    }
}
