// ABOUTME: In-app notification and outbound email outbox models
// ABOUTME: Emails are rendered up front and queued for a Mailer to deliver
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

/// An in-app notification row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Unique identifier
    pub id: Uuid,
    /// Recipient
    pub user_id: Uuid,
    /// Machine-readable kind, see `constants::notification_kinds`
    pub kind: String,
    /// Short title
    pub title: String,
    /// Body text
    pub message: String,
    /// Deep link into the app
    pub link: Option<String>,
    /// Whether the user has seen it
    pub is_read: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Delivery state of an outbox email
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmailStatus {
    /// Waiting for delivery
    Queued,
    /// Handed to the mailer
    Sent,
    /// Mailer refused it
    Failed,
}

impl EmailStatus {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Sent => "sent",
            Self::Failed => "failed",
        }
    }
}

impl FromStr for EmailStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(Self::Queued),
            "sent" => Ok(Self::Sent),
            "failed" => Ok(Self::Failed),
            _ => Err(AppError::invalid_input(format!("Invalid email status: {s}"))),
        }
    }
}

/// A rendered email waiting in (or processed from) the outbox
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxEmail {
    /// Unique identifier
    pub id: Uuid,
    /// Recipient address
    pub to_email: String,
    /// Subject line
    pub subject: String,
    /// Rendered HTML body
    pub html_body: String,
    /// Template name used to render the body
    pub template: String,
    /// Delivery state
    pub status: EmailStatus,
    /// Queue timestamp
    pub created_at: DateTime<Utc>,
    /// Delivery timestamp
    pub sent_at: Option<DateTime<Utc>>,
}
