// ABOUTME: Storage for the grooming services a business offers
// ABOUTME: Deleting a service only deactivates it so past appointments keep their reference
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

use super::parse_uuid;
use crate::errors::{AppError, AppResult};
use crate::models::Service;

const SERVICE_COLUMNS: &str = "id, business_id, name, description, duration_minutes, price_cents, is_active";

/// Partial update; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct ServiceUpdate {
    /// Display name
    pub name: Option<String>,
    /// Description
    pub description: Option<String>,
    /// Duration in minutes
    pub duration_minutes: Option<u32>,
    /// Price in cents
    pub price_cents: Option<i64>,
}

/// Service catalog manager
pub struct ServiceManager {
    pool: SqlitePool,
}

impl ServiceManager {
    /// Create a new manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a service
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn create(&self, service: &Service) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO services (id, business_id, name, description, duration_minutes, price_cents, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(service.id.to_string())
        .bind(service.business_id.to_string())
        .bind(&service.name)
        .bind(&service.description)
        .bind(i64::from(service.duration_minutes))
        .bind(service.price_cents)
        .bind(service.is_active)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create service: {e}")))?;
        Ok(())
    }

    /// Get a service by id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get(&self, service_id: Uuid) -> AppResult<Option<Service>> {
        let row = sqlx::query(&format!("SELECT {SERVICE_COLUMNS} FROM services WHERE id = $1"))
            .bind(service_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get service: {e}")))?;

        row.map(|r| row_to_service(&r)).transpose()
    }

    /// Services of a business, cheapest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_for_business(
        &self,
        business_id: Uuid,
        include_inactive: bool,
    ) -> AppResult<Vec<Service>> {
        let active_filter = if include_inactive { "" } else { "AND is_active = 1" };
        let rows = sqlx::query(&format!(
            "SELECT {SERVICE_COLUMNS} FROM services WHERE business_id = $1 {active_filter} ORDER BY price_cents ASC, name ASC"
        ))
        .bind(business_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list services: {e}")))?;

        rows.iter().map(row_to_service).collect()
    }

    /// Apply a partial update
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn update(&self, service_id: Uuid, update: &ServiceUpdate) -> AppResult<Option<Service>> {
        let result = sqlx::query(
            r"
            UPDATE services SET
                name = COALESCE($1, name),
                description = COALESCE($2, description),
                duration_minutes = COALESCE($3, duration_minutes),
                price_cents = COALESCE($4, price_cents)
            WHERE id = $5
            ",
        )
        .bind(&update.name)
        .bind(&update.description)
        .bind(update.duration_minutes.map(i64::from))
        .bind(update.price_cents)
        .bind(service_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update service: {e}")))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(service_id).await
    }

    /// Soft-delete or restore a service
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn set_active(&self, service_id: Uuid, is_active: bool) -> AppResult<bool> {
        let result = sqlx::query("UPDATE services SET is_active = $1 WHERE id = $2")
            .bind(is_active)
            .bind(service_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to set service active: {e}")))?;
        Ok(result.rows_affected() > 0)
    }
}

fn row_to_service(row: &SqliteRow) -> AppResult<Service> {
    let id: String = row.get("id");
    let business_id: String = row.get("business_id");
    let duration_minutes: i64 = row.get("duration_minutes");

    Ok(Service {
        id: parse_uuid(&id)?,
        business_id: parse_uuid(&business_id)?,
        name: row.get("name"),
        description: row.get("description"),
        duration_minutes: u32::try_from(duration_minutes).unwrap_or(0),
        price_cents: row.get("price_cents"),
        is_active: row.get("is_active"),
    })
}
