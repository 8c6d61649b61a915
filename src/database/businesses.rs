// ABOUTME: Business listing storage with public search, admin listing and ranking updates
// ABOUTME: featured_score is only ever written by the ranking path, never from request input
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::{pool::PoolConnection, sqlite::SqliteRow, QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};
use uuid::Uuid;

use super::{
    count_to_u64, format_timestamp, is_unique_violation, like_pattern, parse_optional_uuid,
    parse_timestamp, parse_uuid,
};
use crate::errors::{AppError, AppResult};
use crate::models::{Business, PlanTier, ReviewStats};
use crate::pagination::PageParams;

const BUSINESS_COLUMNS: &str = r"
    b.id, b.owner_id, b.name, b.slug, b.description, b.phone, b.email, b.address,
    b.category_id, b.city_id, b.district_id, b.neighborhood_id, b.plan, b.is_verified,
    b.is_active, b.avg_rating, b.review_count, b.featured_score, b.created_at, b.updated_at
";

const SEARCH_JOINS: &str = r"
    FROM businesses b
    LEFT JOIN categories cat ON cat.id = b.category_id
    LEFT JOIN cities ci ON ci.id = b.city_id
    LEFT JOIN districts di ON di.id = b.district_id
    LEFT JOIN neighborhoods ne ON ne.id = b.neighborhood_id
    WHERE b.is_active = 1
";

/// Sort order for public listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusinessSort {
    /// Featured score, the default
    #[default]
    Featured,
    /// Average rating
    Rating,
    /// Review count
    Reviews,
    /// Most recently listed
    Newest,
    /// Alphabetical
    Name,
}

impl BusinessSort {
    const fn order_by(self) -> &'static str {
        match self {
            Self::Featured => " ORDER BY b.featured_score DESC, b.avg_rating DESC, b.name ASC, b.id ASC",
            Self::Rating => " ORDER BY b.avg_rating DESC, b.review_count DESC, b.id ASC",
            Self::Reviews => " ORDER BY b.review_count DESC, b.avg_rating DESC, b.id ASC",
            Self::Newest => " ORDER BY b.created_at DESC, b.id ASC",
            Self::Name => " ORDER BY b.name COLLATE NOCASE ASC, b.id ASC",
        }
    }
}

impl FromStr for BusinessSort {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "featured" => Ok(Self::Featured),
            "rating" => Ok(Self::Rating),
            "reviews" => Ok(Self::Reviews),
            "newest" => Ok(Self::Newest),
            "name" => Ok(Self::Name),
            _ => Err(AppError::invalid_input(format!(
                "Invalid sort '{s}'; expected featured, rating, reviews, newest or name"
            ))),
        }
    }
}

/// Public catalog search; slugs address categories and location nodes
#[derive(Debug, Clone, Default)]
pub struct BusinessSearch {
    /// Category slug
    pub category: Option<String>,
    /// City slug
    pub city: Option<String>,
    /// District slug
    pub district: Option<String>,
    /// Neighborhood slug
    pub neighborhood: Option<String>,
    /// Case-insensitive substring of name or description
    pub q: Option<String>,
    /// Minimum average rating
    pub min_rating: Option<f64>,
    /// Only verified (or only unverified) businesses
    pub verified: Option<bool>,
    /// Sort order
    pub sort: BusinessSort,
}

/// Admin table filter
#[derive(Debug, Clone, Default)]
pub struct AdminBusinessFilter {
    /// Plan tier
    pub plan: Option<PlanTier>,
    /// City id
    pub city_id: Option<Uuid>,
    /// Active flag
    pub is_active: Option<bool>,
    /// Verified flag
    pub is_verified: Option<bool>,
    /// Substring of name or slug
    pub q: Option<String>,
}

/// Descriptive fields editable by the owner; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct BusinessUpdate {
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
    /// Category
    pub category_id: Option<Uuid>,
    /// City node
    pub city_id: Option<Uuid>,
    /// District node
    pub district_id: Option<Uuid>,
    /// Neighborhood node
    pub neighborhood_id: Option<Uuid>,
}

/// Business listing manager
pub struct BusinessManager {
    pool: SqlitePool,
}

impl BusinessManager {
    /// Create a new manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new business
    ///
    /// # Errors
    ///
    /// Returns 409 if the slug is taken, or a database error
    pub async fn create(&self, business: &Business) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO businesses (
                id, owner_id, name, slug, description, phone, email, address,
                category_id, city_id, district_id, neighborhood_id, plan, is_verified,
                is_active, avg_rating, review_count, featured_score, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)
            ",
        )
        .bind(business.id.to_string())
        .bind(business.owner_id.to_string())
        .bind(&business.name)
        .bind(&business.slug)
        .bind(&business.description)
        .bind(&business.phone)
        .bind(&business.email)
        .bind(&business.address)
        .bind(business.category_id.map(|id| id.to_string()))
        .bind(business.city_id.map(|id| id.to_string()))
        .bind(business.district_id.map(|id| id.to_string()))
        .bind(business.neighborhood_id.map(|id| id.to_string()))
        .bind(business.plan.as_str())
        .bind(business.is_verified)
        .bind(business.is_active)
        .bind(business.avg_rating)
        .bind(i64::from(business.review_count))
        .bind(business.featured_score)
        .bind(format_timestamp(business.created_at))
        .bind(format_timestamp(business.updated_at))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::already_exists(format!("Business slug '{}' is already taken", business.slug))
            } else {
                AppError::database(format!("Failed to create business: {e}"))
            }
        })?;
        Ok(())
    }

    /// Whether any business (active or not) uses this slug
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn slug_exists(&self, slug: &str) -> AppResult<bool> {
        let row = sqlx::query("SELECT 1 FROM businesses WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to check business slug: {e}")))?;
        Ok(row.is_some())
    }

    /// Get a business by id regardless of its active flag
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get(&self, business_id: Uuid) -> AppResult<Option<Business>> {
        let row = sqlx::query(&format!("SELECT {BUSINESS_COLUMNS} FROM businesses b WHERE b.id = $1"))
            .bind(business_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get business: {e}")))?;

        row.map(|r| row_to_business(&r)).transpose()
    }

    /// Get a business by slug regardless of its active flag
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_by_slug(&self, slug: &str) -> AppResult<Option<Business>> {
        let row = sqlx::query(&format!("SELECT {BUSINESS_COLUMNS} FROM businesses b WHERE b.slug = $1"))
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get business by slug: {e}")))?;

        row.map(|r| row_to_business(&r)).transpose()
    }

    /// Public catalog search over active businesses
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn search(
        &self,
        search: &BusinessSearch,
        params: PageParams,
    ) -> AppResult<(Vec<Business>, u64)> {
        let mut count_query = QueryBuilder::<Sqlite>::new(format!("SELECT COUNT(*) AS count {SEARCH_JOINS}"));
        push_search_filter(&mut count_query, search);
        let total: i64 = count_query
            .build()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count businesses: {e}")))?
            .get("count");

        let mut query = QueryBuilder::<Sqlite>::new(format!("SELECT {BUSINESS_COLUMNS} {SEARCH_JOINS}"));
        push_search_filter(&mut query, search);
        query
            .push(search.sort.order_by())
            .push(" LIMIT ")
            .push_bind(params.limit())
            .push(" OFFSET ")
            .push_bind(params.offset());

        let rows = query
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to search businesses: {e}")))?;

        let businesses = rows.iter().map(row_to_business).collect::<AppResult<Vec<_>>>()?;
        Ok((businesses, count_to_u64(total)))
    }

    /// Admin listing over all businesses, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn admin_list(
        &self,
        filter: &AdminBusinessFilter,
        params: PageParams,
    ) -> AppResult<(Vec<Business>, u64)> {
        let mut count_query =
            QueryBuilder::<Sqlite>::new("SELECT COUNT(*) AS count FROM businesses b WHERE 1 = 1");
        push_admin_filter(&mut count_query, filter);
        let total: i64 = count_query
            .build()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count businesses: {e}")))?
            .get("count");

        let mut query =
            QueryBuilder::<Sqlite>::new(format!("SELECT {BUSINESS_COLUMNS} FROM businesses b WHERE 1 = 1"));
        push_admin_filter(&mut query, filter);
        query
            .push(" ORDER BY b.created_at DESC, b.id ASC LIMIT ")
            .push_bind(params.limit())
            .push(" OFFSET ")
            .push_bind(params.offset());

        let rows = query
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list businesses: {e}")))?;

        let businesses = rows.iter().map(row_to_business).collect::<AppResult<Vec<_>>>()?;
        Ok((businesses, count_to_u64(total)))
    }

    /// All businesses owned by a user
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<Business>> {
        let rows = sqlx::query(&format!(
            "SELECT {BUSINESS_COLUMNS} FROM businesses b WHERE b.owner_id = $1 ORDER BY b.created_at ASC"
        ))
        .bind(owner_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list owner businesses: {e}")))?;

        rows.iter().map(row_to_business).collect()
    }

    /// Slugs and modification times of active businesses
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_active_slugs(&self) -> AppResult<Vec<(String, DateTime<Utc>)>> {
        let rows = sqlx::query(
            "SELECT slug, updated_at FROM businesses WHERE is_active = 1 ORDER BY featured_score DESC, slug ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list business slugs: {e}")))?;

        rows.iter()
            .map(|row| {
                let updated_at: String = row.get("updated_at");
                Ok((row.get("slug"), parse_timestamp(&updated_at)?))
            })
            .collect()
    }

    /// Update descriptive fields
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn update_details(
        &self,
        business_id: Uuid,
        update: &BusinessUpdate,
    ) -> AppResult<Option<Business>> {
        let mut conn = self.acquire().await?;
        let updated = Self::update_details_in(&mut conn, business_id, update).await?;
        drop(conn);

        if !updated {
            return Ok(None);
        }
        self.get(business_id).await
    }

    /// Apply a partial edit inside a transaction; returns false if no row matched
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn update_details_in(
        conn: &mut SqliteConnection,
        business_id: Uuid,
        update: &BusinessUpdate,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE businesses SET
                name = COALESCE($1, name),
                description = COALESCE($2, description),
                phone = COALESCE($3, phone),
                email = COALESCE($4, email),
                address = COALESCE($5, address),
                category_id = COALESCE($6, category_id),
                city_id = COALESCE($7, city_id),
                district_id = COALESCE($8, district_id),
                neighborhood_id = COALESCE($9, neighborhood_id),
                updated_at = $10
            WHERE id = $11
            ",
        )
        .bind(&update.name)
        .bind(&update.description)
        .bind(&update.phone)
        .bind(&update.email)
        .bind(&update.address)
        .bind(update.category_id.map(|id| id.to_string()))
        .bind(update.city_id.map(|id| id.to_string()))
        .bind(update.district_id.map(|id| id.to_string()))
        .bind(update.neighborhood_id.map(|id| id.to_string()))
        .bind(format_timestamp(Utc::now()))
        .bind(business_id.to_string())
        .execute(conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to update business: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Set the verified badge
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn set_verified(&self, business_id: Uuid, is_verified: bool) -> AppResult<bool> {
        self.set_flag("is_verified", business_id, is_verified).await
    }

    /// Soft-delete or restore a business
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn set_active(&self, business_id: Uuid, is_active: bool) -> AppResult<bool> {
        self.set_flag("is_active", business_id, is_active).await
    }

    /// Set the verified badge inside a transaction
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn set_verified_in(
        conn: &mut SqliteConnection,
        business_id: Uuid,
        is_verified: bool,
    ) -> AppResult<bool> {
        Self::set_flag_in(conn, "is_verified", business_id, is_verified).await
    }

    async fn set_flag(&self, column: &'static str, business_id: Uuid, value: bool) -> AppResult<bool> {
        let mut conn = self.acquire().await?;
        Self::set_flag_in(&mut conn, column, business_id, value).await
    }

    async fn set_flag_in(
        conn: &mut SqliteConnection,
        column: &'static str,
        business_id: Uuid,
        value: bool,
    ) -> AppResult<bool> {
        let result = sqlx::query(&format!(
            "UPDATE businesses SET {column} = $1, updated_at = $2 WHERE id = $3"
        ))
        .bind(value)
        .bind(format_timestamp(Utc::now()))
        .bind(business_id.to_string())
        .execute(conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to update business {column}: {e}")))?;
        Ok(result.rows_affected() > 0)
    }

    async fn acquire(&self) -> AppResult<PoolConnection<Sqlite>> {
        self.pool
            .acquire()
            .await
            .map_err(|e| AppError::database(format!("Failed to acquire connection: {e}")))
    }

    /// Read a business inside a transaction
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_in(conn: &mut SqliteConnection, business_id: Uuid) -> AppResult<Option<Business>> {
        let row = sqlx::query(&format!("SELECT {BUSINESS_COLUMNS} FROM businesses b WHERE b.id = $1"))
            .bind(business_id.to_string())
            .fetch_optional(conn)
            .await
            .map_err(|e| AppError::database(format!("Failed to get business: {e}")))?;

        row.map(|r| row_to_business(&r)).transpose()
    }

    /// Change the plan tier inside a transaction
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn set_plan_in(
        conn: &mut SqliteConnection,
        business_id: Uuid,
        plan: PlanTier,
    ) -> AppResult<bool> {
        let result = sqlx::query("UPDATE businesses SET plan = $1, updated_at = $2 WHERE id = $3")
            .bind(plan.as_str())
            .bind(format_timestamp(Utc::now()))
            .bind(business_id.to_string())
            .execute(conn)
            .await
            .map_err(|e| AppError::database(format!("Failed to set business plan: {e}")))?;
        Ok(result.rows_affected() > 0)
    }

    /// Store recomputed review stats and featured score
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn update_ranking_in(
        conn: &mut SqliteConnection,
        business_id: Uuid,
        stats: &ReviewStats,
        featured_score: f64,
    ) -> AppResult<()> {
        sqlx::query(
            r"
            UPDATE businesses
            SET avg_rating = $1, review_count = $2, featured_score = $3, updated_at = $4
            WHERE id = $5
            ",
        )
        .bind(stats.avg_rating)
        .bind(i64::from(stats.review_count))
        .bind(featured_score)
        .bind(format_timestamp(Utc::now()))
        .bind(business_id.to_string())
        .execute(conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to update business ranking: {e}")))?;
        Ok(())
    }
}

fn push_search_filter(query: &mut QueryBuilder<'_, Sqlite>, search: &BusinessSearch) {
    let slug_filters = [
        ("cat.slug", &search.category),
        ("ci.slug", &search.city),
        ("di.slug", &search.district),
        ("ne.slug", &search.neighborhood),
    ];
    for (column, value) in slug_filters {
        if let Some(slug) = value.as_deref().filter(|s| !s.is_empty()) {
            query.push(format!(" AND {column} = ")).push_bind(slug.to_owned());
        }
    }
    if let Some(q) = search.q.as_deref().filter(|q| !q.trim().is_empty()) {
        let pattern = like_pattern(q);
        query
            .push(" AND (b.name LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR b.description LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }
    if let Some(min_rating) = search.min_rating {
        query.push(" AND b.avg_rating >= ").push_bind(min_rating);
    }
    if let Some(verified) = search.verified {
        query.push(" AND b.is_verified = ").push_bind(verified);
    }
}

fn push_admin_filter(query: &mut QueryBuilder<'_, Sqlite>, filter: &AdminBusinessFilter) {
    if let Some(plan) = filter.plan {
        query.push(" AND b.plan = ").push_bind(plan.as_str());
    }
    if let Some(city_id) = filter.city_id {
        query.push(" AND b.city_id = ").push_bind(city_id.to_string());
    }
    if let Some(is_active) = filter.is_active {
        query.push(" AND b.is_active = ").push_bind(is_active);
    }
    if let Some(is_verified) = filter.is_verified {
        query.push(" AND b.is_verified = ").push_bind(is_verified);
    }
    if let Some(q) = filter.q.as_deref().filter(|q| !q.trim().is_empty()) {
        let pattern = like_pattern(q);
        query
            .push(" AND (b.name LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR b.slug LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }
}

fn row_to_business(row: &SqliteRow) -> AppResult<Business> {
    let id: String = row.get("id");
    let owner_id: String = row.get("owner_id");
    let plan: String = row.get("plan");
    let review_count: i64 = row.get("review_count");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(Business {
        id: parse_uuid(&id)?,
        owner_id: parse_uuid(&owner_id)?,
        name: row.get("name"),
        slug: row.get("slug"),
        description: row.get("description"),
        phone: row.get("phone"),
        email: row.get("email"),
        address: row.get("address"),
        category_id: parse_optional_uuid(row.get("category_id"))?,
        city_id: parse_optional_uuid(row.get("city_id"))?,
        district_id: parse_optional_uuid(row.get("district_id"))?,
        neighborhood_id: parse_optional_uuid(row.get("neighborhood_id"))?,
        plan: PlanTier::from_str(&plan)?,
        is_verified: row.get("is_verified"),
        is_active: row.get("is_active"),
        avg_rating: row.get("avg_rating"),
        review_count: u32::try_from(review_count).unwrap_or(0),
        featured_score: row.get("featured_score"),
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}
