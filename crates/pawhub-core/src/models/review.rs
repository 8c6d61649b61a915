// ABOUTME: Customer review model and aggregated review statistics
// ABOUTME: One review per customer per business
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A customer's review of a business
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    /// Unique identifier
    pub id: Uuid,
    /// Reviewed business
    pub business_id: Uuid,
    /// Reviewing customer
    pub user_id: Uuid,
    /// Star rating, 1..=5
    pub rating: u8,
    /// Optional text
    pub comment: Option<String>,
    /// Business owner's public reply
    pub owner_reply: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Aggregated ratings for one business
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewStats {
    /// Mean rating, 0 when there are no reviews
    pub avg_rating: f64,
    /// Number of reviews
    pub review_count: u32,
}
