// ABOUTME: Appointment model and its status enum
// ABOUTME: Allowed status edges live in the lifecycle module, not here
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

/// Status of a booking request
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    /// Requested by the customer, awaiting the business
    Pending,
    /// Accepted by the business
    Confirmed,
    /// Pet is being groomed
    InProgress,
    /// Finished
    Completed,
    /// Called off by the customer or an admin
    Cancelled,
    /// Customer did not show up
    NoShow,
}

impl AppointmentStatus {
    /// All statuses, in lifecycle order
    pub const ALL: [Self; 6] = [
        Self::Pending,
        Self::Confirmed,
        Self::InProgress,
        Self::Completed,
        Self::Cancelled,
        Self::NoShow,
    ];

    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::NoShow => "no_show",
        }
    }

    /// Upper-case form used in JSON, matching the serde representation
    #[must_use]
    pub const fn wire_name(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
            Self::NoShow => "NO_SHOW",
        }
    }

    /// No transition leaves a terminal status
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::NoShow)
    }

    /// Live appointments hold their time slot
    #[must_use]
    pub const fn is_live(&self) -> bool {
        !self.is_terminal()
    }
}

impl Display for AppointmentStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            "no_show" => Ok(Self::NoShow),
            _ => Err(AppError::invalid_input(format!(
                "Invalid appointment status: {s}"
            ))),
        }
    }
}

/// A booking of one pet at one business
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    /// Unique identifier
    pub id: Uuid,
    /// Business the pet is booked at
    pub business_id: Uuid,
    /// Pet being groomed
    pub pet_id: Uuid,
    /// Customer who booked
    pub user_id: Uuid,
    /// Requested service, if any
    pub service_id: Option<Uuid>,
    /// Start time
    pub scheduled_at: DateTime<Utc>,
    /// Current status
    pub status: AppointmentStatus,
    /// Customer notes for the groomer
    pub notes: Option<String>,
    /// Reason given when cancelled
    pub cancellation_reason: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip_through_db_string() {
        for status in AppointmentStatus::ALL {
            assert_eq!(status.as_str().parse::<AppointmentStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_status_parses_uppercase_wire_form() {
        assert_eq!(
            "NO_SHOW".parse::<AppointmentStatus>().unwrap(),
            AppointmentStatus::NoShow
        );
        let json = serde_json::to_string(&AppointmentStatus::InProgress).unwrap();
        assert_eq!(json, "\"IN_PROGRESS\"");
        assert_eq!(json.trim_matches('"'), AppointmentStatus::InProgress.wire_name());
    }

    #[test]
    fn test_terminal_statuses() {
        let terminal: Vec<_> = AppointmentStatus::ALL
            .into_iter()
            .filter(AppointmentStatus::is_terminal)
            .collect();
        assert_eq!(
            terminal,
            vec![
                AppointmentStatus::Completed,
                AppointmentStatus::Cancelled,
                AppointmentStatus::NoShow
            ]
        );
    }
}
