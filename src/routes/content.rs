// ABOUTME: Public categories, SEO location tree and CMS page routes
// ABOUTME: Only active categories and locations and only published pages are visible
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

//! Content routes
//!
//! The location tree is city, then district, then neighborhood. Slugs are
//! unique only within their parent, so deeper lookups walk down from the city.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use uuid::Uuid;

use crate::database::{LocationLevel, LocationNode};
use crate::errors::{AppError, AppResult};
use crate::resources::ServerResources;
use crate::routes::types::{CategoryResponse, LocationResponse, PageResponse};

/// Node of the public location tree
#[derive(Debug, Serialize)]
pub struct LocationTreeNode {
    #[serde(flatten)]
    pub node: LocationResponse,
    /// Active children in display order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<LocationTreeNode>,
}

/// City landing page
#[derive(Debug, Serialize)]
pub struct CityResponse {
    pub city: LocationResponse,
    pub districts: Vec<LocationResponse>,
}

/// District landing page
#[derive(Debug, Serialize)]
pub struct DistrictResponse {
    pub city: LocationResponse,
    pub district: LocationResponse,
    pub neighborhoods: Vec<LocationResponse>,
}

/// Group nodes under their parent id, keeping the list order
fn group_by_parent(nodes: Vec<LocationNode>) -> HashMap<Uuid, Vec<LocationNode>> {
    let mut grouped: HashMap<Uuid, Vec<LocationNode>> = HashMap::new();
    for node in nodes {
        if let Some(parent_id) = node.parent_id {
            grouped.entry(parent_id).or_default().push(node);
        }
    }
    grouped
}

/// Assemble the three levels into a tree
fn build_tree(
    cities: Vec<LocationNode>,
    districts: Vec<LocationNode>,
    neighborhoods: Vec<LocationNode>,
) -> Vec<LocationTreeNode> {
    let mut districts_by_city = group_by_parent(districts);
    let mut neighborhoods_by_district = group_by_parent(neighborhoods);

    cities
        .into_iter()
        .map(|city| {
            let children = districts_by_city
                .remove(&city.id)
                .unwrap_or_default()
                .into_iter()
                .map(|district| {
                    let leaves = neighborhoods_by_district
                        .remove(&district.id)
                        .unwrap_or_default()
                        .into_iter()
                        .map(|n| LocationTreeNode {
                            node: n.into(),
                            children: Vec::new(),
                        })
                        .collect();
                    LocationTreeNode {
                        node: district.into(),
                        children: leaves,
                    }
                })
                .collect();
            LocationTreeNode {
                node: city.into(),
                children,
            }
        })
        .collect()
}

/// Content routes implementation
pub struct ContentRoutes;

impl ContentRoutes {
    /// Create all public content routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/categories", get(Self::handle_categories))
            .route("/api/locations", get(Self::handle_location_tree))
            .route("/api/locations/:city", get(Self::handle_city))
            .route("/api/locations/:city/:district", get(Self::handle_district))
            .route("/api/pages/:slug", get(Self::handle_page))
            .with_state(resources)
    }

    async fn find_city(resources: &ServerResources, slug: &str) -> AppResult<LocationNode> {
        resources
            .database
            .locations()
            .get_active_by_slug(LocationLevel::City, None, slug)
            .await?
            .ok_or_else(|| AppError::not_found("City"))
    }

    /// Handle GET /api/categories
    async fn handle_categories(State(resources): State<Arc<ServerResources>>) -> Result<Response, AppError> {
        let categories = resources.database.content().list_categories(false).await?;
        let response: Vec<CategoryResponse> = categories.into_iter().map(Into::into).collect();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle GET /api/locations
    async fn handle_location_tree(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        let locations = resources.database.locations();
        let cities = locations.list(LocationLevel::City, None, false).await?;
        let districts = locations.list(LocationLevel::District, None, false).await?;
        let neighborhoods = locations.list(LocationLevel::Neighborhood, None, false).await?;

        let response = build_tree(cities, districts, neighborhoods);
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle GET /api/locations/:city
    async fn handle_city(
        State(resources): State<Arc<ServerResources>>,
        Path(city_slug): Path<String>,
    ) -> Result<Response, AppError> {
        let city = Self::find_city(&resources, &city_slug).await?;
        let districts = resources
            .database
            .locations()
            .list(LocationLevel::District, Some(city.id), false)
            .await?;

        let response = CityResponse {
            city: city.into(),
            districts: districts.into_iter().map(Into::into).collect(),
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle GET /api/locations/:city/:district
    async fn handle_district(
        State(resources): State<Arc<ServerResources>>,
        Path((city_slug, district_slug)): Path<(String, String)>,
    ) -> Result<Response, AppError> {
        let city = Self::find_city(&resources, &city_slug).await?;
        let locations = resources.database.locations();
        let district = locations
            .get_active_by_slug(LocationLevel::District, Some(city.id), &district_slug)
            .await?
            .ok_or_else(|| AppError::not_found("District"))?;
        let neighborhoods = locations
            .list(LocationLevel::Neighborhood, Some(district.id), false)
            .await?;

        let response = DistrictResponse {
            city: city.into(),
            district: district.into(),
            neighborhoods: neighborhoods.into_iter().map(Into::into).collect(),
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle GET /api/pages/:slug
    async fn handle_page(
        State(resources): State<Arc<ServerResources>>,
        Path(slug): Path<String>,
    ) -> Result<Response, AppError> {
        let page = resources
            .database
            .content()
            .get_published_page(&slug)
            .await?
            .ok_or_else(|| AppError::not_found("Page"))?;

        let response: PageResponse = page.into();
        Ok((StatusCode::OK, Json(response)).into_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str, parent_id: Option<Uuid>) -> LocationNode {
        LocationNode {
            id: Uuid::new_v4(),
            parent_id,
            name: name.into(),
            slug: name.to_lowercase(),
            seo_title: None,
            seo_description: None,
            content: None,
            is_active: true,
            sort_order: 0,
        }
    }

    #[test]
    fn test_build_tree_nests_levels() {
        let istanbul = node("Istanbul", None);
        let ankara = node("Ankara", None);
        let kadikoy = node("Kadikoy", Some(istanbul.id));
        let moda = node("Moda", Some(kadikoy.id));
        let orphan = node("Orphan", Some(Uuid::new_v4()));

        let tree = build_tree(
            vec![istanbul, ankara],
            vec![kadikoy],
            vec![moda, orphan],
        );

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].children.len(), 1);
        assert_eq!(tree[0].children[0].node.name, "Kadikoy");
        assert_eq!(tree[0].children[0].children[0].node.name, "Moda");
        assert!(tree[1].children.is_empty());
    }
}
