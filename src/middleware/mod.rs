// ABOUTME: HTTP middleware for request tracing, authentication, CORS and role guards
// ABOUTME: Provides request ID spans and session authentication for the API routes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

pub mod admin_guard;
pub mod auth;
pub mod cors;
pub mod tracing;

// Authentication middleware
pub use auth::AuthMiddleware;

// Role guards
pub use admin_guard::{require_admin, require_business_manager};

// CORS configuration
pub use cors::setup_cors;

// Request tracing
pub use tracing::{create_request_span, RequestIdMaker};
