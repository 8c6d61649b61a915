// ABOUTME: Demo data seeder for local PawHub development
// ABOUTME: Creates an admin, demo users, categories, a location tree and bookable businesses
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

//! Demo data seeder for PawHub.
//!
//! Usage:
//! ```bash
//! # Seed the database from DATABASE_URL
//! cargo run --bin seed-demo-data
//!
//! # Seed a specific file
//! cargo run --bin seed-demo-data -- --database-url sqlite:./data/pawhub.db
//! ```
//!
//! Seeding is skipped when the admin account already exists.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use pawhub_server::{
    config::{DatabaseUrl, ServerConfig},
    database::{Database, LocationInput, LocationLevel},
    logging,
    models::{Category, Page, Pet, PetSize, PlanTier, Service, User},
    permissions::UserRole,
    resources::ServerResources,
    services::{
        businesses::{create_business, ListingDetails, ListingRefs},
        reviews::change_plan,
        validation::slugify,
    },
};
use tracing::info;
use uuid::Uuid;

/// Password for every demo account: `DemoUser123!`
const DEMO_USER_PASSWORD: &str = "DemoUser123!";

#[derive(Parser)]
#[command(
    name = "seed-demo-data",
    about = "PawHub Demo Data Seeder",
    long_about = "Populate the database with demo users, categories, locations and businesses"
)]
struct SeedArgs {
    /// Admin email
    #[arg(long, default_value = "admin@pawhub.local")]
    admin_email: String,

    /// Database URL override
    #[arg(long)]
    database_url: Option<String>,
}

struct DemoUser {
    email: &'static str,
    display_name: &'static str,
    role: UserRole,
}

const DEMO_USERS: &[DemoUser] = &[
    DemoUser {
        email: "groomer.ayse@pawhub.local",
        display_name: "Ayse Kaya",
        role: UserRole::BusinessOwner,
    },
    DemoUser {
        email: "groomer.mert@pawhub.local",
        display_name: "Mert Demir",
        role: UserRole::BusinessOwner,
    },
    DemoUser {
        email: "owner.elif@pawhub.local",
        display_name: "Elif Sahin",
        role: UserRole::PetOwner,
    },
];

const CATEGORIES: &[(&str, &str)] = &[
    ("Dog Grooming", "Full grooms, baths and haircuts for dogs"),
    ("Cat Grooming", "Gentle grooming for cats of every coat"),
    ("Mobile Grooming", "Groomers who come to your door"),
];

/// City, then districts, then neighborhoods per district
const LOCATIONS: &[(&str, &[(&str, &[&str])])] = &[
    (
        "Istanbul",
        &[
            ("Kadikoy", &["Moda", "Fenerbahce"]),
            ("Besiktas", &["Bebek", "Levent"]),
        ],
    ),
    ("Ankara", &[("Cankaya", &["Kizilay", "Bahcelievler"])]),
];

struct DemoBusiness {
    owner: usize,
    name: &'static str,
    description: &'static str,
    category: &'static str,
    city: &'static str,
    district: &'static str,
    plan: PlanTier,
    services: &'static [(&'static str, u32, i64)],
}

const BUSINESSES: &[DemoBusiness] = &[
    DemoBusiness {
        owner: 0,
        name: "Moda Pati Kuafor",
        description: "Seaside grooming salon with breed-specific cuts.",
        category: "Dog Grooming",
        city: "Istanbul",
        district: "Kadikoy",
        plan: PlanTier::Premium,
        services: &[("Full groom", 90, 75_000), ("Bath and brush", 45, 40_000), ("Nail trim", 15, 15_000)],
    },
    DemoBusiness {
        owner: 0,
        name: "Bebek Cat Spa",
        description: "Quiet, cat-only grooming rooms.",
        category: "Cat Grooming",
        city: "Istanbul",
        district: "Besiktas",
        plan: PlanTier::Basic,
        services: &[("Lion cut", 60, 60_000), ("De-shedding", 45, 45_000)],
    },
    DemoBusiness {
        owner: 1,
        name: "Pati Van",
        description: "Mobile grooming van covering central Ankara.",
        category: "Mobile Grooming",
        city: "Ankara",
        district: "Cankaya",
        plan: PlanTier::Free,
        services: &[("Mobile full groom", 120, 90_000)],
    },
];

#[tokio::main]
async fn main() -> Result<()> {
    let args = SeedArgs::parse();
    logging::init_from_env()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(url) = &args.database_url {
        config.database.url = DatabaseUrl::parse_url(url)?;
    }
    info!("Seeding {}", config.database.url);

    let database = Database::new(&config.database).await?;
    database.migrate().await?;

    if database.users().get_by_email(&args.admin_email).await?.is_some() {
        info!("Admin {} already exists, nothing to seed", args.admin_email);
        return Ok(());
    }

    let resources = ServerResources::new(database, Arc::new(config));
    let users = seed_users(&resources, &args.admin_email).await?;
    let categories = seed_categories(&resources).await?;
    let locations = seed_locations(&resources).await?;
    let business_count = seed_businesses(&resources, &users, &categories, &locations).await?;
    seed_pages(&resources).await?;

    info!(
        users = users.len() + 1,
        categories = categories.len(),
        businesses = business_count,
        "Demo data seeded"
    );
    print_credentials(&args.admin_email);
    Ok(())
}

async fn seed_users(resources: &ServerResources, admin_email: &str) -> Result<Vec<User>> {
    let password_hash = resources.auth_manager.hash_password(DEMO_USER_PASSWORD).await?;
    let database = &resources.database;

    let admin = User::new(
        admin_email.to_owned(),
        password_hash.clone(),
        Some("PawHub Admin".to_owned()),
        UserRole::Admin,
    );
    database.users().create(&admin).await?;

    let mut users = Vec::with_capacity(DEMO_USERS.len());
    for demo in DEMO_USERS {
        let user = User::new(
            demo.email.to_owned(),
            password_hash.clone(),
            Some(demo.display_name.to_owned()),
            demo.role,
        );
        database.users().create(&user).await?;
        users.push(user);
    }

    if let Some(pet_owner) = users.iter().find(|u| u.role == UserRole::PetOwner) {
        let pet = Pet {
            id: Uuid::new_v4(),
            owner_id: pet_owner.id,
            name: "Pamuk".to_owned(),
            species: "dog".to_owned(),
            breed: Some("Maltese".to_owned()),
            size: PetSize::Small,
            birth_date: None,
            notes: Some("Nervous around dryers".to_owned()),
            is_active: true,
            created_at: Utc::now(),
        };
        database.pets().create(&pet).await?;
    }
    Ok(users)
}

async fn seed_categories(resources: &ServerResources) -> Result<HashMap<&'static str, Uuid>> {
    let mut ids = HashMap::new();
    for (sort_order, (name, description)) in (0_i64..).zip(CATEGORIES) {
        let category = Category {
            id: Uuid::new_v4(),
            name: (*name).to_owned(),
            slug: slugify(name),
            description: Some((*description).to_owned()),
            sort_order,
            is_active: true,
        };
        resources.database.content().create_category(&category).await?;
        ids.insert(*name, category.id);
    }
    Ok(ids)
}

fn location_input(name: &str, sort_order: i64) -> LocationInput {
    LocationInput {
        name: name.to_owned(),
        slug: slugify(name),
        seo_title: Some(format!("Pet groomers in {name}")),
        seo_description: None,
        content: None,
        sort_order,
    }
}

/// Returns `(city, district)` name pairs mapped to their node ids
async fn seed_locations(
    resources: &ServerResources,
) -> Result<HashMap<(&'static str, &'static str), (Uuid, Uuid)>> {
    let locations = resources.database.locations();
    let mut ids = HashMap::new();
    for (city_order, (city_name, districts)) in (0_i64..).zip(LOCATIONS) {
        let city = locations
            .create(LocationLevel::City, None, &location_input(city_name, city_order))
            .await?;
        for (district_order, (district_name, neighborhoods)) in (0_i64..).zip(districts.iter()) {
            let district = locations
                .create(
                    LocationLevel::District,
                    Some(city.id),
                    &location_input(district_name, district_order),
                )
                .await?;
            for (order, neighborhood) in (0_i64..).zip(neighborhoods.iter()) {
                locations
                    .create(
                        LocationLevel::Neighborhood,
                        Some(district.id),
                        &location_input(neighborhood, order),
                    )
                    .await?;
            }
            ids.insert((*city_name, *district_name), (city.id, district.id));
        }
    }
    Ok(ids)
}

async fn seed_businesses(
    resources: &ServerResources,
    users: &[User],
    categories: &HashMap<&'static str, Uuid>,
    locations: &HashMap<(&'static str, &'static str), (Uuid, Uuid)>,
) -> Result<usize> {
    let database = &resources.database;
    for demo in BUSINESSES {
        let owner = users.get(demo.owner).context("demo business owner missing")?;
        let (city_id, district_id) = locations
            .get(&(demo.city, demo.district))
            .copied()
            .context("demo business location missing")?;
        let details = ListingDetails {
            name: Some(demo.name.to_owned()),
            description: Some(demo.description.to_owned()),
            phone: Some("+90 555 000 0000".to_owned()),
            email: None,
            address: Some(format!("{}, {}", demo.district, demo.city)),
        };
        let refs = ListingRefs {
            category_id: categories.get(demo.category).copied(),
            city_id: Some(city_id),
            district_id: Some(district_id),
            neighborhood_id: None,
        };
        let business = create_business(database, owner, &details, refs).await?;
        database.businesses().set_verified(business.id, true).await?;
        if demo.plan != PlanTier::Free {
            change_plan(resources, business.id, demo.plan).await?;
        }

        for (name, duration_minutes, price_cents) in demo.services {
            let service = Service {
                id: Uuid::new_v4(),
                business_id: business.id,
                name: (*name).to_owned(),
                description: None,
                duration_minutes: *duration_minutes,
                price_cents: *price_cents,
                is_active: true,
            };
            database.services().create(&service).await?;
        }
        info!(business.slug = %business.slug, plan = demo.plan.as_str(), "Seeded business");
    }
    Ok(BUSINESSES.len())
}

async fn seed_pages(resources: &ServerResources) -> Result<()> {
    let page = Page {
        id: Uuid::new_v4(),
        slug: "about".to_owned(),
        title: "About PawHub".to_owned(),
        content: "PawHub connects pet owners with trusted local groomers.".to_owned(),
        seo_title: Some("About PawHub".to_owned()),
        seo_description: None,
        is_published: true,
        updated_at: Utc::now(),
    };
    resources.database.content().create_page(&page).await?;
    Ok(())
}

fn print_credentials(admin_email: &str) {
    info!("Demo accounts (password: {DEMO_USER_PASSWORD}):");
    info!("  admin       {admin_email}");
    for demo in DEMO_USERS {
        info!("  {:<11} {}", demo.role.as_str(), demo.email);
    }
}
