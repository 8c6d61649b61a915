// ABOUTME: Pet profile route handlers for pet owners
// ABOUTME: Pets are private to their owner; deletes are soft
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::constants::booking::MAX_NOTES_LENGTH;
use crate::constants::limits::MAX_NAME_LENGTH;
use crate::database::PetUpdate;
use crate::errors::{AppError, AppResult};
use crate::models::{Pet, PetSize};
use crate::resources::ServerResources;
use crate::routes::types::PetResponse;
use crate::routes::{authenticate, parse_id, ApiJson};
use crate::services::validation::{optional_text, required_text};

/// Pet create and edit body
#[derive(Debug, Default, Deserialize)]
pub struct PetRequest {
    pub name: Option<String>,
    /// Defaults to `dog` on create
    pub species: Option<String>,
    pub breed: Option<String>,
    /// `small`, `medium`, `large` or `giant`
    pub size: Option<String>,
    /// `YYYY-MM-DD`
    pub birth_date: Option<String>,
    pub notes: Option<String>,
}

fn parse_size(raw: Option<&str>) -> AppResult<Option<PetSize>> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_lowercase().parse())
        .transpose()
}

fn parse_birth_date(raw: Option<&str>) -> AppResult<Option<NaiveDate>> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::invalid_input("birth_date must be YYYY-MM-DD"))?;
    if date > Utc::now().date_naive() {
        return Err(AppError::invalid_input("birth_date cannot be in the future"));
    }
    Ok(Some(date))
}

impl PetRequest {
    fn into_new_pet(self, owner_id: Uuid) -> AppResult<Pet> {
        let species = match self.species.as_deref().map(str::trim) {
            None | Some("") => "dog".to_owned(),
            Some(species) => required_text("Species", species, MAX_NAME_LENGTH)?.to_lowercase(),
        };
        Ok(Pet {
            id: Uuid::new_v4(),
            owner_id,
            name: required_text("Name", self.name.as_deref().unwrap_or_default(), MAX_NAME_LENGTH)?,
            species,
            breed: optional_text("Breed", self.breed.as_deref(), MAX_NAME_LENGTH)?,
            size: parse_size(self.size.as_deref())?.unwrap_or_default(),
            birth_date: parse_birth_date(self.birth_date.as_deref())?,
            notes: optional_text("Notes", self.notes.as_deref(), MAX_NOTES_LENGTH)?,
            is_active: true,
            created_at: Utc::now(),
        })
    }

    fn into_update(self) -> AppResult<PetUpdate> {
        Ok(PetUpdate {
            name: self
                .name
                .as_deref()
                .map(|name| required_text("Name", name, MAX_NAME_LENGTH))
                .transpose()?,
            species: optional_text("Species", self.species.as_deref(), MAX_NAME_LENGTH)?
                .map(|s| s.to_lowercase()),
            breed: optional_text("Breed", self.breed.as_deref(), MAX_NAME_LENGTH)?,
            size: parse_size(self.size.as_deref())?,
            birth_date: parse_birth_date(self.birth_date.as_deref())?,
            notes: optional_text("Notes", self.notes.as_deref(), MAX_NOTES_LENGTH)?,
        })
    }
}

/// Pet routes implementation
pub struct PetRoutes;

impl PetRoutes {
    /// Create all pet routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/pets", get(Self::handle_list).post(Self::handle_create))
            .route(
                "/api/pets/:id",
                get(Self::handle_get)
                    .patch(Self::handle_update)
                    .delete(Self::handle_delete),
            )
            .with_state(resources)
    }

    /// Handle GET /api/pets
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let pets = resources.database.pets().list_for_owner(auth.user_id).await?;

        let response: Vec<PetResponse> = pets.into_iter().map(Into::into).collect();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle POST /api/pets
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        ApiJson(body): ApiJson<PetRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let pet = body.into_new_pet(auth.user_id)?;
        resources.database.pets().create(&pet).await?;

        let response: PetResponse = pet.into();
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle GET /api/pets/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let pet_id = parse_id(&id, "Pet")?;
        let pet = resources
            .database
            .pets()
            .get_active_for_owner(pet_id, auth.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Pet"))?;

        let response: PetResponse = pet.into();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle PATCH /api/pets/:id
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        ApiJson(body): ApiJson<PetRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let pet_id = parse_id(&id, "Pet")?;
        let update = body.into_update()?;
        let pet = resources
            .database
            .pets()
            .update(pet_id, auth.user_id, &update)
            .await?
            .ok_or_else(|| AppError::not_found("Pet"))?;

        let response: PetResponse = pet.into();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle DELETE /api/pets/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let pet_id = parse_id(&id, "Pet")?;
        if !resources.database.pets().deactivate(pet_id, auth.user_id).await? {
            return Err(AppError::not_found("Pet"));
        }
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
