// ABOUTME: Request and query types for admin routes
// ABOUTME: Each body has a validate() that returns 400 with a single readable message
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

//! Admin request types
//!
//! Bodies deserialize leniently (every field optional) so that missing or
//! blank fields are reported by `validate()` rather than by the JSON layer.

use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::constants::limits::{MAX_NAME_LENGTH, MAX_TEXT_LENGTH};
use crate::database::{CategoryUpdate, LocationInput, LocationPatch, PageUpdate, UserUpdate};
use crate::errors::{AppError, AppResult};
use crate::models::{Category, Page};
use crate::permissions::UserRole;
use crate::routes::parse_ref;
use crate::services::businesses::{BusinessPatch, ListingRefs};
use crate::services::validation::{optional_text, required_text, slug_or_derive, validate_slug};

const MAX_SEO_TITLE_LENGTH: usize = 200;
const MAX_SEO_DESCRIPTION_LENGTH: usize = 500;

fn parse_optional<T: std::str::FromStr<Err = AppError>>(raw: Option<&str>) -> AppResult<Option<T>> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_lowercase().parse())
        .transpose()
}

fn optional_slug(raw: Option<&str>) -> AppResult<Option<String>> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            let slug = s.to_lowercase();
            validate_slug(&slug)?;
            Ok(slug)
        })
        .transpose()
}

// ================================================================================
// Users
// ================================================================================

/// `GET /api/admin/users` filters
#[derive(Debug, Default, Deserialize)]
pub struct ListUsersQuery {
    pub role: Option<String>,
    pub active: Option<bool>,
    /// Substring of email or display name
    pub q: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ListUsersQuery {
    /// Parsed role filter
    pub fn role(&self) -> AppResult<Option<UserRole>> {
        parse_optional(self.role.as_deref())
    }
}

/// `PATCH /api/admin/users/:id`
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub role: Option<String>,
    pub display_name: Option<String>,
}

impl UpdateUserRequest {
    /// Validate into a user update
    pub fn validate(&self) -> AppResult<UserUpdate> {
        let update = UserUpdate {
            display_name: optional_text("Display name", self.display_name.as_deref(), MAX_NAME_LENGTH)?,
            phone: None,
            role: parse_optional(self.role.as_deref())?,
        };
        if update.display_name.is_none() && update.role.is_none() {
            return Err(AppError::invalid_input("Provide a role or a display name"));
        }
        Ok(update)
    }
}

// ================================================================================
// Businesses
// ================================================================================

/// `GET /api/admin/businesses` filters
#[derive(Debug, Default, Deserialize)]
pub struct ListBusinessesQuery {
    pub plan: Option<String>,
    pub city_id: Option<String>,
    pub active: Option<bool>,
    pub verified: Option<bool>,
    /// Substring of name or slug
    pub q: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// `PATCH /api/admin/businesses/:id`
#[derive(Debug, Default, Deserialize)]
pub struct UpdateBusinessRequest {
    pub plan: Option<String>,
    pub is_verified: Option<bool>,
    pub category_id: Option<String>,
    pub city_id: Option<String>,
    pub district_id: Option<String>,
    pub neighborhood_id: Option<String>,
}

impl UpdateBusinessRequest {
    /// Validate into a business patch
    pub fn validate(&self) -> AppResult<BusinessPatch> {
        let refs = ListingRefs {
            category_id: parse_ref(self.category_id.as_deref(), "category_id")?,
            city_id: parse_ref(self.city_id.as_deref(), "city_id")?,
            district_id: parse_ref(self.district_id.as_deref(), "district_id")?,
            neighborhood_id: parse_ref(self.neighborhood_id.as_deref(), "neighborhood_id")?,
        };
        let has_refs = refs.category_id.is_some()
            || refs.city_id.is_some()
            || refs.district_id.is_some()
            || refs.neighborhood_id.is_some();
        let patch = BusinessPatch {
            plan: parse_optional(self.plan.as_deref())?,
            is_verified: self.is_verified,
            refs: has_refs.then_some(refs),
        };
        if patch.plan.is_none() && patch.is_verified.is_none() && patch.refs.is_none() {
            return Err(AppError::invalid_input(
                "Provide a plan, verification flag, category or location",
            ));
        }
        Ok(patch)
    }
}

// ================================================================================
// Categories
// ================================================================================

/// Category create and edit body
#[derive(Debug, Default, Deserialize)]
pub struct CategoryRequest {
    pub name: Option<String>,
    /// Derived from the name when absent
    pub slug: Option<String>,
    pub description: Option<String>,
    pub sort_order: Option<i64>,
}

impl CategoryRequest {
    /// Validate into a new active category
    pub fn validate_new(&self) -> AppResult<Category> {
        let name = required_text("Name", self.name.as_deref().unwrap_or_default(), MAX_NAME_LENGTH)?;
        Ok(Category {
            id: Uuid::new_v4(),
            slug: slug_or_derive(self.slug.as_deref(), &name)?,
            name,
            description: optional_text("Description", self.description.as_deref(), MAX_TEXT_LENGTH)?,
            sort_order: self.sort_order.unwrap_or(0),
            is_active: true,
        })
    }

    /// Validate into a partial update
    pub fn validate_update(&self) -> AppResult<CategoryUpdate> {
        Ok(CategoryUpdate {
            name: self
                .name
                .as_deref()
                .map(|name| required_text("Name", name, MAX_NAME_LENGTH))
                .transpose()?,
            slug: optional_slug(self.slug.as_deref())?,
            description: optional_text("Description", self.description.as_deref(), MAX_TEXT_LENGTH)?,
            sort_order: self.sort_order,
        })
    }
}

// ================================================================================
// Locations
// ================================================================================

/// Location list filters
#[derive(Debug, Default, Deserialize)]
pub struct ListLocationsQuery {
    /// City id for districts, district id for neighborhoods
    pub parent_id: Option<String>,
    /// Defaults to true for admins
    pub include_inactive: Option<bool>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// City, district or neighborhood create and edit body
#[derive(Debug, Default, Deserialize)]
pub struct LocationRequest {
    /// Required when creating districts and neighborhoods
    pub parent_id: Option<String>,
    pub name: Option<String>,
    /// Derived from the name when absent
    pub slug: Option<String>,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub content: Option<String>,
    pub sort_order: Option<i64>,
}

impl LocationRequest {
    /// Validate into a new node and its parent id
    pub fn validate_new(&self) -> AppResult<(Option<Uuid>, LocationInput)> {
        let name = required_text("Name", self.name.as_deref().unwrap_or_default(), MAX_NAME_LENGTH)?;
        let input = LocationInput {
            slug: slug_or_derive(self.slug.as_deref(), &name)?,
            name,
            seo_title: optional_text("SEO title", self.seo_title.as_deref(), MAX_SEO_TITLE_LENGTH)?,
            seo_description: optional_text(
                "SEO description",
                self.seo_description.as_deref(),
                MAX_SEO_DESCRIPTION_LENGTH,
            )?,
            content: optional_text("Content", self.content.as_deref(), MAX_TEXT_LENGTH)?,
            sort_order: self.sort_order.unwrap_or(0),
        };
        Ok((parse_ref(self.parent_id.as_deref(), "parent_id")?, input))
    }

    /// Validate into a partial update; the parent cannot change
    pub fn validate_update(&self) -> AppResult<LocationPatch> {
        if self.parent_id.is_some() {
            return Err(AppError::invalid_input("A location cannot be moved to another parent"));
        }
        Ok(LocationPatch {
            name: self
                .name
                .as_deref()
                .map(|name| required_text("Name", name, MAX_NAME_LENGTH))
                .transpose()?,
            slug: optional_slug(self.slug.as_deref())?,
            seo_title: optional_text("SEO title", self.seo_title.as_deref(), MAX_SEO_TITLE_LENGTH)?,
            seo_description: optional_text(
                "SEO description",
                self.seo_description.as_deref(),
                MAX_SEO_DESCRIPTION_LENGTH,
            )?,
            content: optional_text("Content", self.content.as_deref(), MAX_TEXT_LENGTH)?,
            sort_order: self.sort_order,
        })
    }
}

// ================================================================================
// Pages
// ================================================================================

/// Page create and edit body
#[derive(Debug, Default, Deserialize)]
pub struct PageRequest {
    /// Derived from the title when absent
    pub slug: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    /// Create only; defaults to unpublished
    pub is_published: Option<bool>,
}

impl PageRequest {
    /// Validate into a new page
    pub fn validate_new(&self) -> AppResult<Page> {
        let title = required_text("Title", self.title.as_deref().unwrap_or_default(), MAX_NAME_LENGTH)?;
        Ok(Page {
            id: Uuid::new_v4(),
            slug: slug_or_derive(self.slug.as_deref(), &title)?,
            title,
            content: self.content.clone().unwrap_or_default(),
            seo_title: optional_text("SEO title", self.seo_title.as_deref(), MAX_SEO_TITLE_LENGTH)?,
            seo_description: optional_text(
                "SEO description",
                self.seo_description.as_deref(),
                MAX_SEO_DESCRIPTION_LENGTH,
            )?,
            is_published: self.is_published.unwrap_or(false),
            updated_at: Utc::now(),
        })
    }

    /// Validate into a partial update
    pub fn validate_update(&self) -> AppResult<PageUpdate> {
        if let Some(content) = &self.content {
            if content.chars().count() > MAX_TEXT_LENGTH {
                return Err(AppError::invalid_input(format!(
                    "Content must be at most {MAX_TEXT_LENGTH} characters"
                )));
            }
        }
        Ok(PageUpdate {
            slug: optional_slug(self.slug.as_deref())?,
            title: self
                .title
                .as_deref()
                .map(|title| required_text("Title", title, MAX_NAME_LENGTH))
                .transpose()?,
            content: self.content.clone(),
            seo_title: optional_text("SEO title", self.seo_title.as_deref(), MAX_SEO_TITLE_LENGTH)?,
            seo_description: optional_text(
                "SEO description",
                self.seo_description.as_deref(),
                MAX_SEO_DESCRIPTION_LENGTH,
            )?,
        })
    }
}

// ================================================================================
// Reviews and outbox
// ================================================================================

/// `GET /api/admin/reviews` filters
#[derive(Debug, Default, Deserialize)]
pub struct ListReviewsQuery {
    pub business_id: Option<String>,
    pub rating: Option<u8>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// `GET /api/admin/email-outbox` filters
#[derive(Debug, Default, Deserialize)]
pub struct ListOutboxQuery {
    /// `queued`, `sent` or `failed`
    pub status: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// `POST /api/admin/email-outbox/flush`
#[derive(Debug, Default, Deserialize)]
pub struct FlushOutboxQuery {
    /// Most emails to hand to the mailer, default 50
    pub limit: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PlanTier;

    #[test]
    fn test_category_slug_is_derived_from_name() {
        let category = CategoryRequest {
            name: Some("Cat Grooming".into()),
            ..Default::default()
        }
        .validate_new()
        .unwrap();
        assert_eq!(category.slug, "cat-grooming");
        assert!(category.is_active);
    }

    #[test]
    fn test_category_rejects_bad_explicit_slug() {
        let request = CategoryRequest {
            name: Some("Dogs".into()),
            slug: Some("Dogs & Cats!".into()),
            ..Default::default()
        };
        assert_eq!(request.validate_new().unwrap_err().http_status(), 400);
    }

    #[test]
    fn test_empty_user_patch_is_rejected() {
        assert!(UpdateUserRequest::default().validate().is_err());
        let update = UpdateUserRequest {
            role: Some("BUSINESS_OWNER".into()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(update.role, Some(UserRole::BusinessOwner));
    }

    #[test]
    fn test_business_patch_parses_plan() {
        let patch = UpdateBusinessRequest {
            plan: Some("Premium".into()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(patch.plan, Some(PlanTier::Premium));
        assert!(patch.refs.is_none());

        let bad = UpdateBusinessRequest {
            plan: Some("platinum".into()),
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_location_cannot_change_parent() {
        let request = LocationRequest {
            parent_id: Some(Uuid::new_v4().to_string()),
            ..Default::default()
        };
        assert!(request.validate_update().is_err());
    }

    #[test]
    fn test_page_defaults_to_unpublished() {
        let page = PageRequest {
            title: Some("About Us".into()),
            content: Some("Hello".into()),
            ..Default::default()
        }
        .validate_new()
        .unwrap();
        assert_eq!(page.slug, "about-us");
        assert!(!page.is_published);
    }
}
