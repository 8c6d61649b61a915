// ABOUTME: Pet profile model owned by a pet owner
// ABOUTME: Size drives grooming duration hints shown to businesses
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

/// Coarse body size of a pet
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PetSize {
    /// Up to ~10kg
    Small,
    /// ~10-25kg
    #[default]
    Medium,
    /// ~25-45kg
    Large,
    /// Above ~45kg
    Giant,
}

impl PetSize {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
            Self::Giant => "giant",
        }
    }
}

impl FromStr for PetSize {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "small" => Ok(Self::Small),
            "medium" => Ok(Self::Medium),
            "large" => Ok(Self::Large),
            "giant" => Ok(Self::Giant),
            _ => Err(AppError::invalid_input(format!("Invalid pet size: {s}"))),
        }
    }
}

/// A pet registered by its owner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pet {
    /// Unique identifier
    pub id: Uuid,
    /// Owning user
    pub owner_id: Uuid,
    /// Pet name
    pub name: String,
    /// Species ("dog", "cat")
    pub species: String,
    /// Breed, free text
    pub breed: Option<String>,
    /// Body size
    pub size: PetSize,
    /// Birth date if known
    pub birth_date: Option<NaiveDate>,
    /// Notes for groomers (temperament, allergies)
    pub notes: Option<String>,
    /// Soft-delete flag
    pub is_active: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}
