// ABOUTME: User account model shared by pet owners, business owners and admins
// ABOUTME: Role decides which dashboards and admin surfaces the user can reach
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::permissions::UserRole;

/// Represents a registered marketplace user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub id: Uuid,
    /// Email address, unique across the platform
    pub email: String,
    /// Display name
    pub display_name: Option<String>,
    /// Contact phone shared with businesses on booking
    pub phone: Option<String>,
    /// Hashed password for authentication
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Permission role
    pub role: UserRole,
    /// Deactivated users cannot log in
    pub is_active: bool,
    /// When the user account was created
    pub created_at: DateTime<Utc>,
    /// Last time user accessed the system
    pub last_active: DateTime<Utc>,
    /// Bumped on logout; session tokens minted under an older value are void
    #[serde(default, skip_serializing)]
    pub session_version: i64,
}

impl User {
    /// Create a new active user
    #[must_use]
    pub fn new(
        email: String,
        password_hash: String,
        display_name: Option<String>,
        role: UserRole,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            display_name,
            phone: None,
            password_hash,
            role,
            is_active: true,
            created_at: now,
            last_active: now,
            session_version: 0,
        }
    }

    /// Name to greet the user with in notifications and emails
    #[must_use]
    pub fn greeting_name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.email)
    }
}
