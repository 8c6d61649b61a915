// ABOUTME: HTTP security headers and session cookie handling
// ABOUTME: Applies hardening headers to every response and owns the session cookie format
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

//! # Security Headers
//!
//! The API serves JSON and one XML document, so the header set is small:
//! no framing, no MIME sniffing, a strict referrer policy and HSTS once the
//! deployment is behind TLS.

use axum::extract::{Request, State};
use axum::http::{HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;

use crate::config::Environment;

/// Session cookie helpers
pub mod cookies;

/// Security headers configuration
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// X-Frame-Options header value
    pub frame_options: &'static str,
    /// X-Content-Type-Options header value
    pub content_type_options: &'static str,
    /// Referrer-Policy header value
    pub referrer_policy: &'static str,
    /// Content-Security-Policy header value
    pub csp: &'static str,
    /// Strict-Transport-Security header value (for HTTPS)
    pub hsts: Option<&'static str>,
}

impl SecurityConfig {
    /// Create security configuration for an environment
    #[must_use]
    pub const fn for_environment(environment: Environment) -> Self {
        if environment.is_production() {
            Self::production()
        } else {
            Self::development()
        }
    }

    /// Development configuration, no HSTS since local servers run plain HTTP
    #[must_use]
    pub const fn development() -> Self {
        Self {
            frame_options: "DENY",
            content_type_options: "nosniff",
            referrer_policy: "strict-origin-when-cross-origin",
            csp: "default-src 'none'; frame-ancestors 'none'",
            hsts: None,
        }
    }

    /// Production configuration
    #[must_use]
    pub const fn production() -> Self {
        Self {
            hsts: Some("max-age=31536000; includeSubDomains"),
            ..Self::development()
        }
    }

    /// Header pairs to set on every response
    #[must_use]
    pub fn to_headers(&self) -> Vec<(HeaderName, HeaderValue)> {
        let mut headers = vec![
            (
                HeaderName::from_static("x-frame-options"),
                HeaderValue::from_static(self.frame_options),
            ),
            (
                HeaderName::from_static("x-content-type-options"),
                HeaderValue::from_static(self.content_type_options),
            ),
            (
                HeaderName::from_static("referrer-policy"),
                HeaderValue::from_static(self.referrer_policy),
            ),
            (
                HeaderName::from_static("content-security-policy"),
                HeaderValue::from_static(self.csp),
            ),
        ];
        if let Some(hsts) = self.hsts {
            headers.push((
                HeaderName::from_static("strict-transport-security"),
                HeaderValue::from_static(hsts),
            ));
        }
        headers
    }
}

/// Axum middleware adding the configured headers unless a handler set them
pub async fn apply_security_headers(
    State(config): State<SecurityConfig>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    for (name, value) in config.to_headers() {
        headers.entry(name).or_insert(value);
    }
    response
}
