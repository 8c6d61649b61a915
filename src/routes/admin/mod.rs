// ABOUTME: Admin API route handlers for marketplace moderation and content management
// ABOUTME: Every route sits behind a layer that requires an authenticated admin
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

//! Admin routes
//!
//! Covers users, businesses, categories, the location tree, CMS pages,
//! review moderation and the email outbox. Handlers are thin wrappers over
//! the database managers and the service layer.

mod businesses;
mod catalog;
mod locations;
mod outbox;
mod pages;
mod reviews;
mod types;
mod users;

pub use types::{
    CategoryRequest, FlushOutboxQuery, ListBusinessesQuery, ListLocationsQuery,
    ListOutboxQuery, ListReviewsQuery, ListUsersQuery, LocationRequest, PageRequest,
    UpdateBusinessRequest, UpdateUserRequest,
};

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post},
    Router,
};

use crate::database::LocationLevel;
use crate::errors::AppResult;
use crate::middleware::require_admin;
use crate::pagination::{Page, PageParams};
use crate::resources::ServerResources;
use crate::routes::authenticate;

/// Authenticate the caller and require the admin role
///
/// The verified `AuthResult` is placed in request extensions for handlers.
async fn admin_auth_middleware(
    State(resources): State<Arc<ServerResources>>,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let auth = authenticate(request.headers(), &resources).await?;
    require_admin(&auth)?;
    request.extensions_mut().insert(auth);
    Ok(next.run(request).await)
}

/// Page through a list that was loaded whole
pub(super) fn paginate<T>(items: Vec<T>, params: PageParams) -> Page<T> {
    let total = items.len() as u64;
    let start = usize::try_from(params.offset()).unwrap_or(usize::MAX);
    let items = items
        .into_iter()
        .skip(start)
        .take(params.per_page as usize)
        .collect();
    Page::new(items, params, total)
}

/// Admin routes implementation
pub struct AdminRoutes;

impl AdminRoutes {
    /// Create all admin routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .merge(Self::user_routes())
            .merge(Self::business_routes())
            .merge(Self::catalog_routes())
            .merge(locations::routes(LocationLevel::City, "cities"))
            .merge(locations::routes(LocationLevel::District, "districts"))
            .merge(locations::routes(LocationLevel::Neighborhood, "neighborhoods"))
            .merge(Self::page_routes())
            .merge(Self::moderation_routes())
            .route_layer(middleware::from_fn_with_state(
                resources.clone(),
                admin_auth_middleware,
            ))
            .with_state(resources)
    }

    fn user_routes() -> Router<Arc<ServerResources>> {
        Router::new()
            .route("/api/admin/users", get(users::handle_list_users))
            .route(
                "/api/admin/users/:id",
                get(users::handle_get_user).patch(users::handle_update_user),
            )
            .route("/api/admin/users/:id/toggle", post(users::handle_toggle_user))
    }

    fn business_routes() -> Router<Arc<ServerResources>> {
        Router::new()
            .route("/api/admin/businesses", get(businesses::handle_list_businesses))
            .route(
                "/api/admin/businesses/:id",
                get(businesses::handle_get_business).patch(businesses::handle_update_business),
            )
            .route(
                "/api/admin/businesses/:id/toggle",
                post(businesses::handle_toggle_business),
            )
    }

    fn catalog_routes() -> Router<Arc<ServerResources>> {
        Router::new()
            .route(
                "/api/admin/categories",
                get(catalog::handle_list_categories).post(catalog::handle_create_category),
            )
            .route(
                "/api/admin/categories/:id",
                get(catalog::handle_get_category).patch(catalog::handle_update_category),
            )
            .route(
                "/api/admin/categories/:id/toggle",
                post(catalog::handle_toggle_category),
            )
    }

    fn page_routes() -> Router<Arc<ServerResources>> {
        Router::new()
            .route(
                "/api/admin/pages",
                get(pages::handle_list_pages).post(pages::handle_create_page),
            )
            .route(
                "/api/admin/pages/:id",
                get(pages::handle_get_page).patch(pages::handle_update_page),
            )
            .route("/api/admin/pages/:id/publish", post(pages::handle_toggle_published))
    }

    fn moderation_routes() -> Router<Arc<ServerResources>> {
        Router::new()
            .route("/api/admin/reviews", get(reviews::handle_list_reviews))
            .route("/api/admin/reviews/:id", delete(reviews::handle_delete_review))
            .route("/api/admin/email-outbox", get(outbox::handle_list_outbox))
            .route("/api/admin/email-outbox/flush", post(outbox::handle_flush_outbox))
    }
}
