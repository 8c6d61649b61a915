// ABOUTME: CMS storage for static pages and business categories
// ABOUTME: Both are soft-deleted: pages are unpublished, categories deactivated
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

use super::{format_timestamp, is_unique_violation, parse_timestamp, parse_uuid};
use crate::errors::{AppError, AppResult};
use crate::models::{Category, Page};

const PAGE_COLUMNS: &str =
    "id, slug, title, content, seo_title, seo_description, is_published, updated_at";
const CATEGORY_COLUMNS: &str = "id, name, slug, description, sort_order, is_active";

/// Partial page update; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct PageUpdate {
    /// URL slug
    pub slug: Option<String>,
    /// Title
    pub title: Option<String>,
    /// Body
    pub content: Option<String>,
    /// SEO title override
    pub seo_title: Option<String>,
    /// SEO meta description
    pub seo_description: Option<String>,
}

/// Partial category update; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct CategoryUpdate {
    /// Display name
    pub name: Option<String>,
    /// URL slug
    pub slug: Option<String>,
    /// Description
    pub description: Option<String>,
    /// Position in menus
    pub sort_order: Option<i64>,
}

/// Pages and categories manager
pub struct ContentManager {
    pool: SqlitePool,
}

impl ContentManager {
    /// Create a new manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ================================================================================
    // Pages
    // ================================================================================

    /// Insert a page
    ///
    /// # Errors
    ///
    /// Returns 409 if the slug is taken, or a database error
    pub async fn create_page(&self, page: &Page) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO pages (id, slug, title, content, seo_title, seo_description, is_published, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(page.id.to_string())
        .bind(&page.slug)
        .bind(&page.title)
        .bind(&page.content)
        .bind(&page.seo_title)
        .bind(&page.seo_description)
        .bind(page.is_published)
        .bind(format_timestamp(page.updated_at))
        .execute(&self.pool)
        .await
        .map_err(|e| slug_error(&e, "Page", &page.slug, "create page"))?;
        Ok(())
    }

    /// Get a page by id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_page(&self, page_id: Uuid) -> AppResult<Option<Page>> {
        let row = sqlx::query(&format!("SELECT {PAGE_COLUMNS} FROM pages WHERE id = $1"))
            .bind(page_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get page: {e}")))?;

        row.map(|r| row_to_page(&r)).transpose()
    }

    /// Get a published page by slug
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_published_page(&self, slug: &str) -> AppResult<Option<Page>> {
        let row = sqlx::query(&format!(
            "SELECT {PAGE_COLUMNS} FROM pages WHERE slug = $1 AND is_published = 1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get page: {e}")))?;

        row.map(|r| row_to_page(&r)).transpose()
    }

    /// Pages by slug
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_pages(&self, include_unpublished: bool) -> AppResult<Vec<Page>> {
        let filter = if include_unpublished { "" } else { "WHERE is_published = 1" };
        let rows = sqlx::query(&format!("SELECT {PAGE_COLUMNS} FROM pages {filter} ORDER BY slug ASC"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list pages: {e}")))?;

        rows.iter().map(row_to_page).collect()
    }

    /// Apply a partial page update
    ///
    /// # Errors
    ///
    /// Returns 409 on a slug collision, or a database error
    pub async fn update_page(&self, page_id: Uuid, update: &PageUpdate) -> AppResult<Option<Page>> {
        let result = sqlx::query(
            r"
            UPDATE pages SET
                slug = COALESCE($1, slug),
                title = COALESCE($2, title),
                content = COALESCE($3, content),
                seo_title = COALESCE($4, seo_title),
                seo_description = COALESCE($5, seo_description),
                updated_at = $6
            WHERE id = $7
            ",
        )
        .bind(&update.slug)
        .bind(&update.title)
        .bind(&update.content)
        .bind(&update.seo_title)
        .bind(&update.seo_description)
        .bind(format_timestamp(Utc::now()))
        .bind(page_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| slug_error(&e, "Page", update.slug.as_deref().unwrap_or_default(), "update page"))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_page(page_id).await
    }

    /// Publish or unpublish a page
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn set_page_published(&self, page_id: Uuid, is_published: bool) -> AppResult<bool> {
        let result = sqlx::query("UPDATE pages SET is_published = $1, updated_at = $2 WHERE id = $3")
            .bind(is_published)
            .bind(format_timestamp(Utc::now()))
            .bind(page_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to publish page: {e}")))?;
        Ok(result.rows_affected() > 0)
    }

    /// Slugs and modification times of published pages
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_published_slugs(&self) -> AppResult<Vec<(String, DateTime<Utc>)>> {
        Ok(self
            .list_pages(false)
            .await?
            .into_iter()
            .map(|page| (page.slug, page.updated_at))
            .collect())
    }

    // ================================================================================
    // Categories
    // ================================================================================

    /// Insert a category
    ///
    /// # Errors
    ///
    /// Returns 409 if the slug is taken, or a database error
    pub async fn create_category(&self, category: &Category) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO categories (id, name, slug, description, sort_order, is_active)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(category.id.to_string())
        .bind(&category.name)
        .bind(&category.slug)
        .bind(&category.description)
        .bind(category.sort_order)
        .bind(category.is_active)
        .execute(&self.pool)
        .await
        .map_err(|e| slug_error(&e, "Category", &category.slug, "create category"))?;
        Ok(())
    }

    /// Get a category by id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_category(&self, category_id: Uuid) -> AppResult<Option<Category>> {
        let row = sqlx::query(&format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1"))
            .bind(category_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get category: {e}")))?;

        row.map(|r| row_to_category(&r)).transpose()
    }

    /// Categories in menu order
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_categories(&self, include_inactive: bool) -> AppResult<Vec<Category>> {
        let filter = if include_inactive { "" } else { "WHERE is_active = 1" };
        let rows = sqlx::query(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories {filter} ORDER BY sort_order ASC, name ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list categories: {e}")))?;

        rows.iter().map(row_to_category).collect()
    }

    /// Apply a partial category update
    ///
    /// # Errors
    ///
    /// Returns 409 on a slug collision, or a database error
    pub async fn update_category(
        &self,
        category_id: Uuid,
        update: &CategoryUpdate,
    ) -> AppResult<Option<Category>> {
        let result = sqlx::query(
            r"
            UPDATE categories SET
                name = COALESCE($1, name),
                slug = COALESCE($2, slug),
                description = COALESCE($3, description),
                sort_order = COALESCE($4, sort_order)
            WHERE id = $5
            ",
        )
        .bind(&update.name)
        .bind(&update.slug)
        .bind(&update.description)
        .bind(update.sort_order)
        .bind(category_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            slug_error(&e, "Category", update.slug.as_deref().unwrap_or_default(), "update category")
        })?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_category(category_id).await
    }

    /// Show or hide a category
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn set_category_active(&self, category_id: Uuid, is_active: bool) -> AppResult<bool> {
        let result = sqlx::query("UPDATE categories SET is_active = $1 WHERE id = $2")
            .bind(is_active)
            .bind(category_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to update category: {e}")))?;
        Ok(result.rows_affected() > 0)
    }
}

fn slug_error(error: &sqlx::Error, kind: &str, slug: &str, action: &str) -> AppError {
    if is_unique_violation(error) {
        AppError::already_exists(format!("{kind} slug '{slug}' is already taken"))
    } else {
        AppError::database(format!("Failed to {action}: {error}"))
    }
}

fn row_to_page(row: &SqliteRow) -> AppResult<Page> {
    let id: String = row.get("id");
    let updated_at: String = row.get("updated_at");

    Ok(Page {
        id: parse_uuid(&id)?,
        slug: row.get("slug"),
        title: row.get("title"),
        content: row.get("content"),
        seo_title: row.get("seo_title"),
        seo_description: row.get("seo_description"),
        is_published: row.get("is_published"),
        updated_at: parse_timestamp(&updated_at)?,
    })
}

fn row_to_category(row: &SqliteRow) -> AppResult<Category> {
    let id: String = row.get("id");

    Ok(Category {
        id: parse_uuid(&id)?,
        name: row.get("name"),
        slug: row.get("slug"),
        description: row.get("description"),
        sort_order: row.get("sort_order"),
        is_active: row.get("is_active"),
    })
}
