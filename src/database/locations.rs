// ABOUTME: Storage for the SEO location hierarchy: city, district, neighborhood
// ABOUTME: The three levels share one row shape, so one manager serves all of them
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

use super::{is_unique_violation, parse_optional_uuid, parse_uuid};
use crate::errors::{AppError, AppResult};
use crate::models::{City, District, Neighborhood};

/// Level of a node in the hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationLevel {
    /// Top level
    City,
    /// Child of a city
    District,
    /// Child of a district
    Neighborhood,
}

impl LocationLevel {
    const fn table(self) -> &'static str {
        match self {
            Self::City => "cities",
            Self::District => "districts",
            Self::Neighborhood => "neighborhoods",
        }
    }

    /// Parent id column, `None` for cities
    const fn parent_column(self) -> Option<&'static str> {
        match self {
            Self::City => None,
            Self::District => Some("city_id"),
            Self::Neighborhood => Some("district_id"),
        }
    }

    /// Level of the parent node
    #[must_use]
    pub const fn parent(self) -> Option<Self> {
        match self {
            Self::City => None,
            Self::District => Some(Self::City),
            Self::Neighborhood => Some(Self::District),
        }
    }

    /// Singular display name
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::City => "City",
            Self::District => "District",
            Self::Neighborhood => "Neighborhood",
        }
    }

    fn select_columns(self) -> String {
        let parent = self.parent_column().map_or("NULL", |c| c);
        format!(
            "id, {parent} AS parent_id, name, slug, seo_title, seo_description, content, is_active, sort_order"
        )
    }
}

/// One node of any level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationNode {
    /// Node id
    pub id: Uuid,
    /// Parent node id; `None` for cities
    pub parent_id: Option<Uuid>,
    /// Display name
    pub name: String,
    /// URL slug, unique within the parent
    pub slug: String,
    /// SEO title override
    pub seo_title: Option<String>,
    /// SEO meta description
    pub seo_description: Option<String>,
    /// Landing page copy
    pub content: Option<String>,
    /// Visible publicly
    pub is_active: bool,
    /// Position among siblings
    pub sort_order: i64,
}

impl LocationNode {
    /// View as a city
    #[must_use]
    pub fn into_city(self) -> City {
        City {
            id: self.id,
            name: self.name,
            slug: self.slug,
            seo_title: self.seo_title,
            seo_description: self.seo_description,
            content: self.content,
            is_active: self.is_active,
            sort_order: self.sort_order,
        }
    }

    /// View as a district
    #[must_use]
    pub fn into_district(self) -> District {
        District {
            id: self.id,
            city_id: self.parent_id.unwrap_or_default(),
            name: self.name,
            slug: self.slug,
            seo_title: self.seo_title,
            seo_description: self.seo_description,
            content: self.content,
            is_active: self.is_active,
            sort_order: self.sort_order,
        }
    }

    /// View as a neighborhood
    #[must_use]
    pub fn into_neighborhood(self) -> Neighborhood {
        Neighborhood {
            id: self.id,
            district_id: self.parent_id.unwrap_or_default(),
            name: self.name,
            slug: self.slug,
            seo_title: self.seo_title,
            seo_description: self.seo_description,
            content: self.content,
            is_active: self.is_active,
            sort_order: self.sort_order,
        }
    }
}

/// Fields for a new node
#[derive(Debug, Clone, Default)]
pub struct LocationInput {
    /// Display name
    pub name: String,
    /// URL slug
    pub slug: String,
    /// SEO title override
    pub seo_title: Option<String>,
    /// SEO meta description
    pub seo_description: Option<String>,
    /// Landing page copy
    pub content: Option<String>,
    /// Position among siblings
    pub sort_order: i64,
}

/// Partial update; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct LocationPatch {
    /// Display name
    pub name: Option<String>,
    /// URL slug
    pub slug: Option<String>,
    /// SEO title override
    pub seo_title: Option<String>,
    /// SEO meta description
    pub seo_description: Option<String>,
    /// Landing page copy
    pub content: Option<String>,
    /// Position among siblings
    pub sort_order: Option<i64>,
}

/// Location hierarchy manager
pub struct LocationManager {
    pool: SqlitePool,
}

impl LocationManager {
    /// Create a new manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a node under `parent_id` (ignored for cities)
    ///
    /// # Errors
    ///
    /// Returns 404 if a required parent is missing, 409 if the slug is taken
    /// within the parent, or a database error
    pub async fn create(
        &self,
        level: LocationLevel,
        parent_id: Option<Uuid>,
        input: &LocationInput,
    ) -> AppResult<LocationNode> {
        let parent_id = match level.parent() {
            Some(parent_level) => {
                let parent_id = parent_id.ok_or_else(|| {
                    AppError::missing_field(&format!("{}_id", parent_level.label().to_lowercase()))
                })?;
                if self.get(parent_level, parent_id).await?.is_none() {
                    return Err(AppError::not_found(parent_level.label()));
                }
                Some(parent_id)
            }
            None => None,
        };

        let id = Uuid::new_v4();
        let (columns, placeholders) = match level.parent_column() {
            Some(parent) => (format!("{parent}, "), "$8, "),
            None => (String::new(), ""),
        };
        let sql = format!(
            r"
            INSERT INTO {table} ({columns}id, name, slug, seo_title, seo_description, content, sort_order, is_active)
            VALUES ({placeholders}$1, $2, $3, $4, $5, $6, $7, 1)
            ",
            table = level.table(),
        );

        let mut query = sqlx::query(&sql)
            .bind(id.to_string())
            .bind(&input.name)
            .bind(&input.slug)
            .bind(&input.seo_title)
            .bind(&input.seo_description)
            .bind(&input.content)
            .bind(input.sort_order);
        if let Some(parent_id) = parent_id {
            query = query.bind(parent_id.to_string());
        }

        query.execute(&self.pool).await.map_err(|e| {
            if is_unique_violation(&e) {
                AppError::already_exists(format!(
                    "{} slug '{}' is already taken",
                    level.label(),
                    input.slug
                ))
            } else {
                AppError::database(format!("Failed to create {}: {e}", level.table()))
            }
        })?;

        Ok(LocationNode {
            id,
            parent_id,
            name: input.name.clone(),
            slug: input.slug.clone(),
            seo_title: input.seo_title.clone(),
            seo_description: input.seo_description.clone(),
            content: input.content.clone(),
            is_active: true,
            sort_order: input.sort_order,
        })
    }

    /// Get a node by id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get(&self, level: LocationLevel, id: Uuid) -> AppResult<Option<LocationNode>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM {} WHERE id = $1",
            level.select_columns(),
            level.table()
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get {}: {e}", level.table())))?;

        row.map(|r| row_to_node(&r)).transpose()
    }

    /// Get an active node by slug within its parent
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_active_by_slug(
        &self,
        level: LocationLevel,
        parent_id: Option<Uuid>,
        slug: &str,
    ) -> AppResult<Option<LocationNode>> {
        let parent_filter = match level.parent_column() {
            Some(column) => format!("AND {column} = $2"),
            None => String::new(),
        };
        let sql = format!(
            "SELECT {} FROM {} WHERE slug = $1 AND is_active = 1 {parent_filter}",
            level.select_columns(),
            level.table()
        );

        let mut query = sqlx::query(&sql).bind(slug);
        if level.parent_column().is_some() {
            query = query.bind(parent_id.map(|id| id.to_string()));
        }

        let row = query
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get {}: {e}", level.table())))?;

        row.map(|r| row_to_node(&r)).transpose()
    }

    /// Children of `parent_id` (all cities when `level` is city), in display order
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list(
        &self,
        level: LocationLevel,
        parent_id: Option<Uuid>,
        include_inactive: bool,
    ) -> AppResult<Vec<LocationNode>> {
        let mut conditions = Vec::new();
        let parent_column = level.parent_column().filter(|_| parent_id.is_some());
        if let Some(column) = parent_column {
            conditions.push(format!("{column} = $1"));
        }
        if !include_inactive {
            conditions.push("is_active = 1".to_owned());
        }
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        let sql = format!(
            "SELECT {} FROM {} {where_clause} ORDER BY sort_order ASC, name ASC",
            level.select_columns(),
            level.table()
        );

        let mut query = sqlx::query(&sql);
        if parent_column.is_some() {
            query = query.bind(parent_id.map(|id| id.to_string()));
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list {}: {e}", level.table())))?;

        rows.iter().map(row_to_node).collect()
    }

    /// Apply a partial update
    ///
    /// # Errors
    ///
    /// Returns 409 if the new slug collides within the parent, or a database error
    pub async fn update(
        &self,
        level: LocationLevel,
        id: Uuid,
        patch: &LocationPatch,
    ) -> AppResult<Option<LocationNode>> {
        let result = sqlx::query(&format!(
            r"
            UPDATE {} SET
                name = COALESCE($1, name),
                slug = COALESCE($2, slug),
                seo_title = COALESCE($3, seo_title),
                seo_description = COALESCE($4, seo_description),
                content = COALESCE($5, content),
                sort_order = COALESCE($6, sort_order)
            WHERE id = $7
            ",
            level.table()
        ))
        .bind(&patch.name)
        .bind(&patch.slug)
        .bind(&patch.seo_title)
        .bind(&patch.seo_description)
        .bind(&patch.content)
        .bind(patch.sort_order)
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::already_exists(format!("{} slug is already taken", level.label()))
            } else {
                AppError::database(format!("Failed to update {}: {e}", level.table()))
            }
        })?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(level, id).await
    }

    /// Show or hide a node
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn set_active(&self, level: LocationLevel, id: Uuid, is_active: bool) -> AppResult<bool> {
        let result = sqlx::query(&format!("UPDATE {} SET is_active = $1 WHERE id = $2", level.table()))
            .bind(is_active)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to update {}: {e}", level.table())))?;
        Ok(result.rows_affected() > 0)
    }
}

fn row_to_node(row: &SqliteRow) -> AppResult<LocationNode> {
    let id: String = row.get("id");

    Ok(LocationNode {
        id: parse_uuid(&id)?,
        parent_id: parse_optional_uuid(row.get("parent_id"))?,
        name: row.get("name"),
        slug: row.get("slug"),
        seo_title: row.get("seo_title"),
        seo_description: row.get("seo_description"),
        content: row.get("content"),
        is_active: row.get("is_active"),
        sort_order: row.get("sort_order"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use crate::database::Database;

    fn input(name: &str, slug: &str) -> LocationInput {
        LocationInput {
            name: name.to_owned(),
            slug: slug.to_owned(),
            ..LocationInput::default()
        }
    }

    #[tokio::test]
    async fn test_slug_unique_within_parent_only() {
        let locations = Database::new(&DatabaseConfig::in_memory()).await.unwrap().locations();
        let istanbul = locations
            .create(LocationLevel::City, None, &input("Istanbul", "istanbul"))
            .await
            .unwrap();
        let ankara = locations
            .create(LocationLevel::City, None, &input("Ankara", "ankara"))
            .await
            .unwrap();

        locations
            .create(LocationLevel::District, Some(istanbul.id), &input("Merkez", "merkez"))
            .await
            .unwrap();
        locations
            .create(LocationLevel::District, Some(ankara.id), &input("Merkez", "merkez"))
            .await
            .unwrap();

        let err = locations
            .create(LocationLevel::District, Some(istanbul.id), &input("Merkez 2", "merkez"))
            .await
            .unwrap_err();
        assert_eq!(err.http_status(), 409);

        let found = locations
            .get_active_by_slug(LocationLevel::District, Some(ankara.id), "merkez")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.parent_id, Some(ankara.id));
    }

    #[tokio::test]
    async fn test_child_requires_existing_parent() {
        let locations = Database::new(&DatabaseConfig::in_memory()).await.unwrap().locations();
        let err = locations
            .create(LocationLevel::Neighborhood, Some(Uuid::new_v4()), &input("Moda", "moda"))
            .await
            .unwrap_err();
        assert_eq!(err.http_status(), 404);

        let err = locations
            .create(LocationLevel::District, None, &input("Kadikoy", "kadikoy"))
            .await
            .unwrap_err();
        assert_eq!(err.http_status(), 400);
    }

    #[tokio::test]
    async fn test_inactive_nodes_hidden_from_public_list() {
        let locations = Database::new(&DatabaseConfig::in_memory()).await.unwrap().locations();
        let city = locations
            .create(LocationLevel::City, None, &input("Izmir", "izmir"))
            .await
            .unwrap();
        locations.set_active(LocationLevel::City, city.id, false).await.unwrap();

        assert!(locations.list(LocationLevel::City, None, false).await.unwrap().is_empty());
        assert_eq!(locations.list(LocationLevel::City, None, true).await.unwrap().len(), 1);
    }
}
