// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Booking rules, ranking weights, limits and service identifiers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

//! Constants module
//!
//! Constants are grouped into small domain modules rather than one flat list.

/// Booking lifecycle rules
pub mod booking {
    /// Customers cannot cancel once fewer than this many hours remain
    pub const CANCELLATION_WINDOW_HOURS: i64 = 2;
    /// Customers with this many no-shows at a business are blocked there
    pub const MAX_NO_SHOWS_PER_BUSINESS: i64 = 3;
    /// Longest free-text note accepted on a booking
    pub const MAX_NOTES_LENGTH: usize = 1000;
}

/// Featured-score ranking weights
pub mod ranking {
    /// Multiplier applied to the plan weight (1..=4)
    pub const PLAN_WEIGHT_FACTOR: f64 = 40.0;
    /// Multiplier applied to the average rating (0..=5)
    pub const RATING_FACTOR: f64 = 30.0;
    /// Multiplier applied to the capped review count
    pub const REVIEW_COUNT_FACTOR: f64 = 0.2;
    /// Review counts above this no longer raise the score
    pub const REVIEW_COUNT_CAP: u32 = 100;
    /// Highest rating a review can carry
    pub const MAX_RATING: u8 = 5;
    /// Lowest rating a review can carry
    pub const MIN_RATING: u8 = 1;
}

/// Pagination and input limits
pub mod limits {
    /// Default page size for listings
    pub const DEFAULT_PAGE_SIZE: u32 = 20;
    /// Largest page size a client may request
    pub const MAX_PAGE_SIZE: u32 = 50;
    /// Largest page size for admin tables
    pub const MAX_ADMIN_PAGE_SIZE: u32 = 100;
    /// Recent reviews embedded in a business detail response
    pub const DETAIL_RECENT_REVIEWS: u32 = 10;
    /// Max length for short names (business, pet, category)
    pub const MAX_NAME_LENGTH: usize = 120;
    /// Max length for long text (descriptions, page content)
    pub const MAX_TEXT_LENGTH: usize = 20_000;
    /// Max length for a review comment
    pub const MAX_REVIEW_LENGTH: usize = 2000;
    /// Minimum password length
    pub const MIN_PASSWORD_LENGTH: usize = 8;
    /// Longest password bcrypt reads in full: 72 bytes including its NUL terminator
    pub const MAX_PASSWORD_BYTES: usize = 71;
    /// Default session length in hours
    pub const DEFAULT_SESSION_HOURS: i64 = 24;
    /// Longest service duration in minutes
    pub const MAX_SERVICE_MINUTES: u32 = 8 * 60;
}

/// Network ports
pub mod ports {
    /// Default HTTP port
    pub const DEFAULT_HTTP_PORT: u16 = 8081;
}

/// Service identifiers used in logs and tokens
pub mod service_names {
    /// Server service name
    pub const PAWHUB_SERVER: &str = "pawhub-server";
    /// JWT audience
    pub const SESSION_AUDIENCE: &str = "pawhub-web";
}

/// Cookie names
pub mod cookies {
    /// Session cookie carrying the signed token
    pub const SESSION: &str = "pawhub_session";
}

/// Notification kinds stored in `notifications.kind`
pub mod notification_kinds {
    /// Business received a booking request
    pub const BOOKING_REQUESTED: &str = "booking_requested";
    /// Business confirmed the booking
    pub const BOOKING_CONFIRMED: &str = "booking_confirmed";
    /// Booking was cancelled
    pub const BOOKING_CANCELLED: &str = "booking_cancelled";
    /// Grooming finished
    pub const BOOKING_COMPLETED: &str = "booking_completed";
    /// Business received a review
    pub const REVIEW_RECEIVED: &str = "review_received";
}
