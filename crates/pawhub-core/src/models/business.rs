// ABOUTME: Business listing and service catalog models
// ABOUTME: PlanTier gates bookings and weighs into the featured score
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

/// Subscription plan of a business
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    /// Listing only, no online booking
    #[default]
    Free,
    /// Entry paid plan
    Basic,
    /// Mid paid plan
    Premium,
    /// Top paid plan
    Enterprise,
}

impl PlanTier {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Basic => "basic",
            Self::Premium => "premium",
            Self::Enterprise => "enterprise",
        }
    }

    /// Weight used by the featured-score formula
    #[must_use]
    pub const fn weight(&self) -> u8 {
        match self {
            Self::Free => 1,
            Self::Basic => 2,
            Self::Premium => 3,
            Self::Enterprise => 4,
        }
    }

    /// Only paid plans accept online bookings
    #[must_use]
    pub const fn is_paid(&self) -> bool {
        !matches!(self, Self::Free)
    }
}

impl Display for PlanTier {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanTier {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "free" => Ok(Self::Free),
            "basic" => Ok(Self::Basic),
            "premium" => Ok(Self::Premium),
            "enterprise" => Ok(Self::Enterprise),
            _ => Err(AppError::invalid_input(format!("Invalid plan tier: {s}"))),
        }
    }
}

/// A grooming business listed on the marketplace
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Business {
    /// Unique identifier
    pub id: Uuid,
    /// Owning user
    pub owner_id: Uuid,
    /// Display name
    pub name: String,
    /// URL slug, unique across businesses
    pub slug: String,
    /// Long description
    pub description: Option<String>,
    /// Contact phone
    pub phone: Option<String>,
    /// Contact email
    pub email: Option<String>,
    /// Street address
    pub address: Option<String>,
    /// Category the business is listed under
    pub category_id: Option<Uuid>,
    /// City node
    pub city_id: Option<Uuid>,
    /// District node
    pub district_id: Option<Uuid>,
    /// Neighborhood node
    pub neighborhood_id: Option<Uuid>,
    /// Subscription plan
    pub plan: PlanTier,
    /// Verified by an admin
    pub is_verified: bool,
    /// Soft-delete flag
    pub is_active: bool,
    /// Average review rating (0 when no reviews)
    pub avg_rating: f64,
    /// Number of reviews
    pub review_count: u32,
    /// Derived sort weight, see `ranking::featured_score`
    pub featured_score: f64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// A bookable service offered by a business
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    /// Unique identifier
    pub id: Uuid,
    /// Business offering the service
    pub business_id: Uuid,
    /// Service name ("Full groom", "Nail trim")
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Expected duration
    pub duration_minutes: u32,
    /// Price in minor currency units
    pub price_cents: i64,
    /// Soft-delete flag
    pub is_active: bool,
}
