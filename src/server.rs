// ABOUTME: HTTP server assembly for the PawHub API
// ABOUTME: Merges every route group, applies the tower layer stack and serves until a shutdown signal
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

//! # HTTP Server
//!
//! Layers, outermost first: request id assignment, tracing span, request id
//! propagation, CORS, security headers, timeout (408) and body size limit.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderName;
use axum::{middleware, Router};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::errors::{AppError, AppResult};
use crate::middleware::{create_request_span, setup_cors, RequestIdMaker, REQUEST_ID_HEADER};
use crate::resources::ServerResources;
use crate::routes::{
    AdminRoutes, AppointmentRoutes, AuthRoutes, BusinessRoutes, ContentRoutes, DashboardRoutes,
    HealthRoutes, NotificationRoutes, PetRoutes, ReviewRoutes, ServiceRoutes, SitemapRoutes,
};
use crate::security::{apply_security_headers, SecurityConfig};

/// Largest accepted request body
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Build the complete application router
///
/// Integration tests drive this router directly with `tower::ServiceExt`.
#[must_use]
pub fn build_router(resources: Arc<ServerResources>) -> Router {
    let config = resources.config.clone();
    let request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .merge(HealthRoutes::routes(resources.clone()))
        .merge(AuthRoutes::routes(resources.clone()))
        .merge(BusinessRoutes::routes(resources.clone()))
        .merge(ServiceRoutes::routes(resources.clone()))
        .merge(PetRoutes::routes(resources.clone()))
        .merge(AppointmentRoutes::routes(resources.clone()))
        .merge(ReviewRoutes::routes(resources.clone()))
        .merge(NotificationRoutes::routes(resources.clone()))
        .merge(DashboardRoutes::routes(resources.clone()))
        .merge(ContentRoutes::routes(resources.clone()))
        .merge(SitemapRoutes::routes(resources.clone()))
        .merge(AdminRoutes::routes(resources))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id_header.clone(), RequestIdMaker))
                .layer(TraceLayer::new_for_http().make_span_with(create_request_span))
                .layer(PropagateRequestIdLayer::new(request_id_header))
                .layer(setup_cors(&config))
                .layer(middleware::from_fn_with_state(
                    SecurityConfig::for_environment(config.environment),
                    apply_security_headers,
                ))
                .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
                .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES)),
        )
}

/// Bind the configured address and serve until SIGINT or SIGTERM
///
/// # Errors
///
/// Returns an error if the address is invalid, the port cannot be bound,
/// or the server fails while running
pub async fn run(resources: Arc<ServerResources>) -> AppResult<()> {
    let config = resources.config.clone();
    let addr: SocketAddr = format!("{}:{}", config.host, config.http_port)
        .parse()
        .map_err(|e| AppError::config(format!("Invalid listen address: {e}")))?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
    info!("PawHub API listening on http://{addr}");

    axum::serve(listener, build_router(resources))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    info!("PawHub API stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
