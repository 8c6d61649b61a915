// ABOUTME: Business listing creation, edits and ownership checks
// ABOUTME: Generates unique slugs and validates category and location references
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

use chrono::Utc;
use uuid::Uuid;

use crate::constants::limits::{MAX_NAME_LENGTH, MAX_TEXT_LENGTH};
use crate::database::{BusinessManager, BusinessUpdate, Database, LocationLevel};
use crate::errors::{AppError, AppResult};
use crate::models::{Business, PlanTier, ReviewStats, User};
use crate::ranking::score_for;
use crate::services::reviews::rerank_in;
use crate::services::validation::{normalize_email, optional_text, required_text, slugify, validate_slug};

/// Numbered slug suffixes tried before falling back to a random one
const MAX_SLUG_SUFFIX: u32 = 50;

/// Category and location references carried by a business
#[derive(Debug, Clone, Copy, Default)]
pub struct ListingRefs {
    /// Category
    pub category_id: Option<Uuid>,
    /// City node
    pub city_id: Option<Uuid>,
    /// District node, must belong to the city
    pub district_id: Option<Uuid>,
    /// Neighborhood node, must belong to the district
    pub neighborhood_id: Option<Uuid>,
}

/// Validated admin moderation edit
#[derive(Debug, Clone, Copy, Default)]
pub struct BusinessPatch {
    /// New subscription plan; triggers a re-rank
    pub plan: Option<PlanTier>,
    /// Verified badge
    pub is_verified: Option<bool>,
    /// Category and location references
    pub refs: Option<ListingRefs>,
}

/// Owner-supplied listing details
#[derive(Debug, Clone, Default)]
pub struct ListingDetails {
    /// Display name
    pub name: Option<String>,
    /// Long description
    pub description: Option<String>,
    /// Contact phone
    pub phone: Option<String>,
    /// Contact email
    pub email: Option<String>,
    /// Street address
    pub address: Option<String>,
}

/// Pick a slug for a business name, appending `-2`, `-3`, ... on collision
///
/// # Errors
///
/// Returns 400 if the name yields no usable slug, or a database error
pub async fn unique_business_slug(database: &Database, name: &str) -> AppResult<String> {
    let base = slugify(name);
    validate_slug(&base)
        .map_err(|_| AppError::invalid_input("Business name must contain letters or digits"))?;

    let businesses = database.businesses();
    if !businesses.slug_exists(&base).await? {
        return Ok(base);
    }
    for suffix in 2..=MAX_SLUG_SUFFIX {
        let candidate = format!("{base}-{suffix}");
        if !businesses.slug_exists(&candidate).await? {
            return Ok(candidate);
        }
    }
    let random = Uuid::new_v4().simple().to_string();
    Ok(format!("{base}-{}", &random[..8]))
}

/// Check that references exist and nest correctly
///
/// # Errors
///
/// Returns 400 naming the first bad reference, or a database error
pub async fn validate_refs(database: &Database, refs: &ListingRefs) -> AppResult<()> {
    if let Some(category_id) = refs.category_id {
        if database.content().get_category(category_id).await?.is_none() {
            return Err(AppError::invalid_input("Category does not exist"));
        }
    }

    let locations = database.locations();
    if let Some(city_id) = refs.city_id {
        if locations.get(LocationLevel::City, city_id).await?.is_none() {
            return Err(AppError::invalid_input("City does not exist"));
        }
    }
    if let Some(district_id) = refs.district_id {
        let district = locations
            .get(LocationLevel::District, district_id)
            .await?
            .ok_or_else(|| AppError::invalid_input("District does not exist"))?;
        if refs.city_id.is_some_and(|city_id| district.parent_id != Some(city_id)) {
            return Err(AppError::invalid_input("District is not in the given city"));
        }
    }
    if let Some(neighborhood_id) = refs.neighborhood_id {
        let neighborhood = locations
            .get(LocationLevel::Neighborhood, neighborhood_id)
            .await?
            .ok_or_else(|| AppError::invalid_input("Neighborhood does not exist"))?;
        if refs
            .district_id
            .is_some_and(|district_id| neighborhood.parent_id != Some(district_id))
        {
            return Err(AppError::invalid_input(
                "Neighborhood is not in the given district",
            ));
        }
    }
    Ok(())
}

fn clean_details(details: &ListingDetails) -> AppResult<ListingDetails> {
    Ok(ListingDetails {
        name: details
            .name
            .as_deref()
            .map(|name| required_text("Name", name, MAX_NAME_LENGTH))
            .transpose()?,
        description: optional_text("Description", details.description.as_deref(), MAX_TEXT_LENGTH)?,
        phone: optional_text("Phone", details.phone.as_deref(), 40)?,
        email: details
            .email
            .as_deref()
            .filter(|email| !email.trim().is_empty())
            .map(normalize_email)
            .transpose()?,
        address: optional_text("Address", details.address.as_deref(), 400)?,
    })
}

/// Create a listing on the FREE plan, unverified
///
/// # Errors
///
/// Returns 400 for invalid details or references, or a database error
pub async fn create_business(
    database: &Database,
    owner: &User,
    details: &ListingDetails,
    refs: ListingRefs,
) -> AppResult<Business> {
    let details = clean_details(details)?;
    let name = details.name.ok_or_else(|| AppError::missing_field("Name"))?;
    validate_refs(database, &refs).await?;

    let now = Utc::now();
    let plan = PlanTier::Free;
    let stats = ReviewStats::default();
    let business = Business {
        id: Uuid::new_v4(),
        owner_id: owner.id,
        slug: unique_business_slug(database, &name).await?,
        name,
        description: details.description,
        phone: details.phone,
        email: details.email,
        address: details.address,
        category_id: refs.category_id,
        city_id: refs.city_id,
        district_id: refs.district_id,
        neighborhood_id: refs.neighborhood_id,
        plan,
        is_verified: false,
        is_active: true,
        avg_rating: stats.avg_rating,
        review_count: stats.review_count,
        featured_score: score_for(plan, &stats),
        created_at: now,
        updated_at: now,
    };
    database.businesses().create(&business).await?;
    Ok(business)
}

/// Apply an owner or admin edit
///
/// # Errors
///
/// Returns 404 if the business vanished, 400 for invalid input, or a database error
pub async fn update_business(
    database: &Database,
    business_id: Uuid,
    details: &ListingDetails,
    refs: ListingRefs,
) -> AppResult<Business> {
    let details = clean_details(details)?;
    validate_refs(database, &refs).await?;

    let update = BusinessUpdate {
        name: details.name,
        description: details.description,
        phone: details.phone,
        email: details.email,
        address: details.address,
        category_id: refs.category_id,
        city_id: refs.city_id,
        district_id: refs.district_id,
        neighborhood_id: refs.neighborhood_id,
    };
    database
        .businesses()
        .update_details(business_id, &update)
        .await?
        .ok_or_else(|| AppError::not_found("Business"))
}

/// Apply an admin moderation edit as one all-or-nothing write
///
/// References are checked before the transaction opens. A plan change
/// re-ranks the business inside the same transaction.
///
/// # Errors
///
/// Returns 404 if the business does not exist, 400 for invalid references,
/// or a database error; nothing is written on error
pub async fn moderate_business(database: &Database, business_id: Uuid, patch: BusinessPatch) -> AppResult<Business> {
    let update = match patch.refs {
        Some(refs) => {
            validate_refs(database, &refs).await?;
            Some(BusinessUpdate {
                name: None,
                description: None,
                phone: None,
                email: None,
                address: None,
                category_id: refs.category_id,
                city_id: refs.city_id,
                district_id: refs.district_id,
                neighborhood_id: refs.neighborhood_id,
            })
        }
        None => None,
    };

    let mut tx = database.begin().await?;
    if BusinessManager::get_in(tx.executor()?, business_id).await?.is_none() {
        return Err(AppError::not_found("Business"));
    }
    if let Some(update) = &update {
        BusinessManager::update_details_in(tx.executor()?, business_id, update).await?;
    }
    if let Some(is_verified) = patch.is_verified {
        BusinessManager::set_verified_in(tx.executor()?, business_id, is_verified).await?;
    }
    let business = match patch.plan {
        Some(plan) => {
            BusinessManager::set_plan_in(tx.executor()?, business_id, plan).await?;
            rerank_in(tx.executor()?, business_id, "plan_changed").await?
        }
        None => BusinessManager::get_in(tx.executor()?, business_id)
            .await?
            .ok_or_else(|| AppError::not_found("Business"))?,
    };
    tx.commit().await?;
    Ok(business)
}

/// Load a business the requester may manage
///
/// # Errors
///
/// Returns 404 if it does not exist, 403 unless the requester owns it or is an admin
pub async fn get_managed(database: &Database, requester: &User, business_id: Uuid) -> AppResult<Business> {
    let business = database
        .businesses()
        .get(business_id)
        .await?
        .ok_or_else(|| AppError::not_found("Business"))?;
    if business.owner_id != requester.id && !requester.role.is_admin() {
        return Err(AppError::permission_denied(
            "Only the business owner can manage this business",
        )
        .with_user_id(requester.id));
    }
    Ok(business)
}
