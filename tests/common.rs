// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides in-memory resources, user sessions and bookable businesses
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `pawhub_server`

use std::sync::{Arc, Once};

use axum::Router;
use chrono::{DateTime, Duration, Utc};
use pawhub_server::{
    config::ServerConfig,
    database::Database,
    models::{Business, Pet, PetSize, PlanTier, Service, User},
    notifications::Mailer,
    permissions::UserRole,
    resources::ServerResources,
    server::build_router,
    services::{
        businesses::{create_business, ListingDetails, ListingRefs},
        reviews::change_plan,
    },
};
use uuid::Uuid;

/// Password for every test account
pub const TEST_PASSWORD: &str = "correct-horse-battery";

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

async fn migrated_database(config: &ServerConfig) -> Database {
    init_test_logging();
    let database = Database::new(&config.database).await.unwrap();
    database.migrate().await.unwrap();
    database
}

/// Resources over a fresh in-memory database
pub async fn create_test_resources() -> Arc<ServerResources> {
    let config = ServerConfig::for_testing();
    let database = migrated_database(&config).await;
    Arc::new(ServerResources::new(database, Arc::new(config)))
}

/// Resources with a specific mailer
pub async fn create_test_resources_with_mailer(
    mailer: Arc<dyn Mailer>,
    deliver_immediately: bool,
) -> Arc<ServerResources> {
    let mut config = ServerConfig::for_testing();
    config.mail.deliver_immediately = deliver_immediately;
    let database = migrated_database(&config).await;
    Arc::new(ServerResources::with_mailer(database, Arc::new(config), mailer))
}

/// The full application router
pub fn create_test_app(resources: &Arc<ServerResources>) -> Router {
    build_router(resources.clone())
}

/// Create a user and a session token for it
pub async fn create_user(resources: &ServerResources, role: UserRole, email: &str) -> (User, String) {
    let password_hash = resources.auth_manager.hash_password(TEST_PASSWORD).await.unwrap();
    let user = User::new(
        email.to_owned(),
        password_hash,
        Some(email.split('@').next().unwrap_or("user").to_owned()),
        role,
    );
    resources.database.users().create(&user).await.unwrap();
    let token = resources.auth_manager.generate_token(&user).unwrap();
    (user, token)
}

/// Create a listing owned by `owner` on `plan` with one active service
pub async fn create_business_on_plan(
    resources: &ServerResources,
    owner: &User,
    name: &str,
    plan: PlanTier,
) -> (Business, Service) {
    let details = ListingDetails {
        name: Some(name.to_owned()),
        description: Some(format!("{name} grooming salon")),
        ..ListingDetails::default()
    };
    let mut business = create_business(&resources.database, owner, &details, ListingRefs::default())
        .await
        .unwrap();
    if plan != PlanTier::Free {
        business = change_plan(resources, business.id, plan).await.unwrap();
    }

    let service = Service {
        id: Uuid::new_v4(),
        business_id: business.id,
        name: "Full groom".to_owned(),
        description: None,
        duration_minutes: 60,
        price_cents: 50_000,
        is_active: true,
    };
    resources.database.services().create(&service).await.unwrap();
    (business, service)
}

/// Create an active pet for `owner`
pub async fn create_pet(resources: &ServerResources, owner: &User, name: &str) -> Pet {
    let pet = Pet {
        id: Uuid::new_v4(),
        owner_id: owner.id,
        name: name.to_owned(),
        species: "dog".to_owned(),
        breed: None,
        size: PetSize::Medium,
        birth_date: None,
        notes: None,
        is_active: true,
        created_at: Utc::now(),
    };
    resources.database.pets().create(&pet).await.unwrap();
    pet
}

/// A start time `hours` from now, truncated to whole seconds
pub fn hours_from_now(hours: i64) -> DateTime<Utc> {
    let at = Utc::now() + Duration::hours(hours);
    DateTime::from_timestamp(at.timestamp(), 0).unwrap()
}
