// ABOUTME: CMS content models: static pages and business categories
// ABOUTME: Both are addressed publicly by slug
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A CMS page such as "about" or "terms"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Unique identifier
    pub id: Uuid,
    /// URL slug, unique
    pub slug: String,
    /// Page heading
    pub title: String,
    /// Body (HTML or markdown, rendered by the frontend)
    pub content: String,
    /// SEO title override
    pub seo_title: Option<String>,
    /// SEO meta description
    pub seo_description: Option<String>,
    /// Only published pages are public
    pub is_published: bool,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Listing category ("Mobile grooming", "Cat grooming")
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// URL slug, unique
    pub slug: String,
    /// Optional description
    pub description: Option<String>,
    /// Ordering in menus
    pub sort_order: i64,
    /// Hidden from public listings when false
    pub is_active: bool,
}
