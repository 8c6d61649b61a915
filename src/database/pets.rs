// ABOUTME: Pet profile storage scoped to the owning user
// ABOUTME: Deleting a pet deactivates it; inactive pets cannot be booked
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

use std::str::FromStr;

use chrono::NaiveDate;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

use super::{format_timestamp, parse_timestamp, parse_uuid};
use crate::errors::{AppError, AppResult};
use crate::models::{Pet, PetSize};

const PET_COLUMNS: &str =
    "id, owner_id, name, species, breed, size, birth_date, notes, is_active, created_at";

/// Partial update; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct PetUpdate {
    /// Name
    pub name: Option<String>,
    /// Species
    pub species: Option<String>,
    /// Breed
    pub breed: Option<String>,
    /// Size class
    pub size: Option<PetSize>,
    /// Birth date
    pub birth_date: Option<NaiveDate>,
    /// Care notes for the groomer
    pub notes: Option<String>,
}

/// Pet manager
pub struct PetManager {
    pool: SqlitePool,
}

impl PetManager {
    /// Create a new manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a pet
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn create(&self, pet: &Pet) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO pets (id, owner_id, name, species, breed, size, birth_date, notes, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ",
        )
        .bind(pet.id.to_string())
        .bind(pet.owner_id.to_string())
        .bind(&pet.name)
        .bind(&pet.species)
        .bind(&pet.breed)
        .bind(pet.size.as_str())
        .bind(pet.birth_date.map(|d| d.to_string()))
        .bind(&pet.notes)
        .bind(pet.is_active)
        .bind(format_timestamp(pet.created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create pet: {e}")))?;
        Ok(())
    }

    /// Get a pet by id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get(&self, pet_id: Uuid) -> AppResult<Option<Pet>> {
        let row = sqlx::query(&format!("SELECT {PET_COLUMNS} FROM pets WHERE id = $1"))
            .bind(pet_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get pet: {e}")))?;

        row.map(|r| row_to_pet(&r)).transpose()
    }

    /// Get a pet only if `owner_id` owns it and it is active
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_active_for_owner(&self, pet_id: Uuid, owner_id: Uuid) -> AppResult<Option<Pet>> {
        let row = sqlx::query(&format!(
            "SELECT {PET_COLUMNS} FROM pets WHERE id = $1 AND owner_id = $2 AND is_active = 1"
        ))
        .bind(pet_id.to_string())
        .bind(owner_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get pet: {e}")))?;

        row.map(|r| row_to_pet(&r)).transpose()
    }

    /// Active pets of an owner, by name
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_for_owner(&self, owner_id: Uuid) -> AppResult<Vec<Pet>> {
        let rows = sqlx::query(&format!(
            "SELECT {PET_COLUMNS} FROM pets WHERE owner_id = $1 AND is_active = 1 ORDER BY name COLLATE NOCASE ASC"
        ))
        .bind(owner_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list pets: {e}")))?;

        rows.iter().map(row_to_pet).collect()
    }

    /// Apply a partial update to an owner's active pet
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn update(&self, pet_id: Uuid, owner_id: Uuid, update: &PetUpdate) -> AppResult<Option<Pet>> {
        let result = sqlx::query(
            r"
            UPDATE pets SET
                name = COALESCE($1, name),
                species = COALESCE($2, species),
                breed = COALESCE($3, breed),
                size = COALESCE($4, size),
                birth_date = COALESCE($5, birth_date),
                notes = COALESCE($6, notes)
            WHERE id = $7 AND owner_id = $8 AND is_active = 1
            ",
        )
        .bind(&update.name)
        .bind(&update.species)
        .bind(&update.breed)
        .bind(update.size.map(|s| s.as_str()))
        .bind(update.birth_date.map(|d| d.to_string()))
        .bind(&update.notes)
        .bind(pet_id.to_string())
        .bind(owner_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update pet: {e}")))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(pet_id).await
    }

    /// Soft-delete an owner's pet
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn deactivate(&self, pet_id: Uuid, owner_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE pets SET is_active = 0 WHERE id = $1 AND owner_id = $2 AND is_active = 1",
        )
        .bind(pet_id.to_string())
        .bind(owner_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to delete pet: {e}")))?;
        Ok(result.rows_affected() > 0)
    }
}

fn row_to_pet(row: &SqliteRow) -> AppResult<Pet> {
    let id: String = row.get("id");
    let owner_id: String = row.get("owner_id");
    let size: String = row.get("size");
    let birth_date: Option<String> = row.get("birth_date");
    let created_at: String = row.get("created_at");

    Ok(Pet {
        id: parse_uuid(&id)?,
        owner_id: parse_uuid(&owner_id)?,
        name: row.get("name"),
        species: row.get("species"),
        breed: row.get("breed"),
        size: PetSize::from_str(&size)?,
        birth_date: birth_date
            .as_deref()
            .map(NaiveDate::from_str)
            .transpose()
            .map_err(|e| AppError::internal(format!("Invalid birth date: {e}")))?,
        notes: row.get("notes"),
        is_active: row.get("is_active"),
        created_at: parse_timestamp(&created_at)?,
    })
}
