// ABOUTME: SEO location hierarchy models: city, district, neighborhood
// ABOUTME: Each node carries its own landing-page copy managed from the admin CMS
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Top-level location node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct City {
    /// Unique identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// URL slug, unique among cities
    pub slug: String,
    /// SEO title override
    pub seo_title: Option<String>,
    /// SEO meta description
    pub seo_description: Option<String>,
    /// Landing-page copy
    pub content: Option<String>,
    /// Hidden from public pages when false
    pub is_active: bool,
    /// Ordering within the parent
    pub sort_order: i64,
}

/// Second-level node under a city
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct District {
    /// Unique identifier
    pub id: Uuid,
    /// Parent city
    pub city_id: Uuid,
    /// Display name
    pub name: String,
    /// URL slug, unique within the city
    pub slug: String,
    /// SEO title override
    pub seo_title: Option<String>,
    /// SEO meta description
    pub seo_description: Option<String>,
    /// Landing-page copy
    pub content: Option<String>,
    /// Hidden from public pages when false
    pub is_active: bool,
    /// Ordering within the parent
    pub sort_order: i64,
}

/// Third-level node under a district
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Neighborhood {
    /// Unique identifier
    pub id: Uuid,
    /// Parent district
    pub district_id: Uuid,
    /// Display name
    pub name: String,
    /// URL slug, unique within the district
    pub slug: String,
    /// SEO title override
    pub seo_title: Option<String>,
    /// SEO meta description
    pub seo_description: Option<String>,
    /// Landing-page copy
    pub content: Option<String>,
    /// Hidden from public pages when false
    pub is_active: bool,
    /// Ordering within the parent
    pub sort_order: i64,
}
