// ABOUTME: Owner reply route for reviews on their business
// ABOUTME: Review creation and listing live under the business routes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::resources::ServerResources;
use crate::routes::types::ReviewResponse;
use crate::routes::{authenticate, parse_id, ApiJson};
use crate::services::reviews::reply_to_review;

/// Reply body
#[derive(Debug, Default, Deserialize)]
pub struct ReplyRequest {
    pub reply: Option<String>,
}

/// Review routes implementation
pub struct ReviewRoutes;

impl ReviewRoutes {
    /// Create all review routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/reviews/:id/reply", post(Self::handle_reply))
            .with_state(resources)
    }

    /// Handle POST /api/reviews/:id/reply
    async fn handle_reply(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        ApiJson(body): ApiJson<ReplyRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let review_id = parse_id(&id, "Review")?;
        let review = reply_to_review(
            &resources,
            &auth.user,
            review_id,
            body.reply.as_deref().unwrap_or_default(),
        )
        .await?;

        let response: ReviewResponse = review.into();
        Ok((StatusCode::OK, Json(response)).into_response())
    }
}
