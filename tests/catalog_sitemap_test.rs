// ABOUTME: Integration tests for the public catalog, owner listing tools, pets and the sitemap
// ABOUTME: Seeds a small location tree through the admin API and browses it anonymously
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

#![allow(clippy::unwrap_used, clippy::expect_used, missing_docs)]

mod common;
mod helpers;

use axum::http::StatusCode;
use common::{create_business_on_plan, create_pet, create_test_app, create_test_resources, create_user, hours_from_now};
use helpers::axum_test::AxumTestRequest;
use pawhub_server::{models::PlanTier, permissions::UserRole};
use serde_json::{json, Value};

async fn post_json(app: &axum::Router, token: &str, path: &str, body: Value) -> Value {
    AxumTestRequest::post(path)
        .bearer(token)
        .json(&body)
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED)
        .json()
}

#[tokio::test]
async fn test_health_and_ready() {
    let resources = create_test_resources().await;
    let app = create_test_app(&resources);

    let health: Value = AxumTestRequest::get("/health")
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["database"], "ok");

    AxumTestRequest::get("/ready").send(app).await.assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_responses_carry_request_id_and_security_headers() {
    let resources = create_test_resources().await;

    let response = AxumTestRequest::get("/health")
        .header("x-request-id", "req-123")
        .send(create_test_app(&resources))
        .await;
    assert_eq!(response.header("x-request-id").as_deref(), Some("req-123"));
    assert_eq!(response.header("x-content-type-options").as_deref(), Some("nosniff"));
}

#[tokio::test]
async fn test_location_tree_search_and_landing_pages() {
    let resources = create_test_resources().await;
    let (_, admin) = create_user(&resources, UserRole::Admin, "admin@example.com").await;
    let (_, owner_token) = create_user(&resources, UserRole::BusinessOwner, "groomer@example.com").await;
    let app = create_test_app(&resources);

    let city = post_json(&app, &admin, "/api/admin/cities", json!({ "name": "Istanbul" })).await;
    let district = post_json(
        &app,
        &admin,
        "/api/admin/districts",
        json!({ "name": "Kadikoy", "parent_id": city["id"] }),
    )
    .await;
    post_json(
        &app,
        &admin,
        "/api/admin/neighborhoods",
        json!({ "name": "Moda", "parent_id": district["id"] }),
    )
    .await;
    let category = post_json(&app, &admin, "/api/admin/categories", json!({ "name": "Dog Grooming" })).await;

    let listing = post_json(
        &app,
        &owner_token,
        "/api/businesses",
        json!({
            "name": "Moda Pati",
            "description": "Seaside salon",
            "category_id": category["id"],
            "city_id": city["id"],
            "district_id": district["id"],
        }),
    )
    .await;
    assert_eq!(listing["slug"], "moda-pati");
    assert_eq!(listing["plan"], "free");
    post_json(&app, &owner_token, "/api/businesses", json!({ "name": "Elsewhere Spa" })).await;

    let tree: Value = AxumTestRequest::get("/api/locations")
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(tree[0]["slug"], "istanbul");
    assert_eq!(tree[0]["children"][0]["slug"], "kadikoy");
    assert_eq!(tree[0]["children"][0]["children"][0]["slug"], "moda");

    let landing: Value = AxumTestRequest::get("/api/locations/istanbul/kadikoy")
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(landing["district"]["name"], "Kadikoy");
    assert_eq!(landing["neighborhoods"].as_array().unwrap().len(), 1);

    let unknown = AxumTestRequest::get("/api/locations/atlantis").send(app.clone()).await;
    assert_eq!(unknown.status(), 404);

    let by_city: Value = AxumTestRequest::get("/api/businesses?city=istanbul&category=dog-grooming")
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(by_city["total"], 1);
    assert_eq!(by_city["items"][0]["name"], "Moda Pati");

    let all: Value = AxumTestRequest::get("/api/businesses?per_page=1")
        .send(app.clone())
        .await
        .json();
    assert_eq!(all["total"], 2);
    assert_eq!(all["total_pages"], 2);
    assert_eq!(all["items"].as_array().unwrap().len(), 1);

    let bad_sort = AxumTestRequest::get("/api/businesses?sort=cheapest").send(app).await;
    assert_eq!(bad_sort.status(), 400);
}

#[tokio::test]
async fn test_pet_owner_cannot_create_listing() {
    let resources = create_test_resources().await;
    let (_, pets_token) = create_user(&resources, UserRole::PetOwner, "pets@example.com").await;

    let response = AxumTestRequest::post("/api/businesses")
        .bearer(&pets_token)
        .json(&json!({ "name": "Not Mine" }))
        .send(create_test_app(&resources))
        .await;
    assert_eq!(response.status(), 403);
}

#[tokio::test]
async fn test_owner_manages_listing_and_services() {
    let resources = create_test_resources().await;
    let (owner, owner_token) = create_user(&resources, UserRole::BusinessOwner, "groomer@example.com").await;
    let (_, rival_token) = create_user(&resources, UserRole::BusinessOwner, "rival@example.com").await;
    let (business, _) = create_business_on_plan(&resources, &owner, "Tidy Tails", PlanTier::Basic).await;
    let app = create_test_app(&resources);

    let updated: Value = AxumTestRequest::patch(&format!("/api/businesses/{}", business.id))
        .bearer(&owner_token)
        .json(&json!({ "phone": "+90 555 000 1111" }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(updated["phone"], "+90 555 000 1111");
    assert_eq!(updated["name"], "Tidy Tails");

    let rival = AxumTestRequest::patch(&format!("/api/businesses/{}", business.id))
        .bearer(&rival_token)
        .json(&json!({ "name": "Stolen" }))
        .send(app.clone())
        .await;
    assert_eq!(rival.status(), 403);

    let service = post_json(
        &app,
        &owner_token,
        &format!("/api/businesses/{}/services", business.id),
        json!({ "name": "Puppy bath", "duration_minutes": 30, "price_cents": 25_000 }),
    )
    .await;
    let service_id = service["id"].as_str().unwrap();

    let edited: Value = AxumTestRequest::patch(&format!("/api/services/{service_id}"))
        .bearer(&owner_token)
        .json(&json!({ "price_cents": 30_000 }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(edited["price_cents"], 30_000);

    AxumTestRequest::delete(&format!("/api/services/{service_id}"))
        .bearer(&owner_token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let detail: Value = AxumTestRequest::get(&format!("/api/businesses/{}", business.slug))
        .send(app)
        .await
        .json();
    let names: Vec<&str> = detail["services"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Full groom"]);
}

#[tokio::test]
async fn test_dashboard_counts_every_status() {
    let resources = create_test_resources().await;
    let (owner, owner_token) = create_user(&resources, UserRole::BusinessOwner, "groomer@example.com").await;
    let (customer, customer_token) = create_user(&resources, UserRole::PetOwner, "pets@example.com").await;
    let (business, _) = create_business_on_plan(&resources, &owner, "Counted", PlanTier::Premium).await;
    let pet = create_pet(&resources, &customer, "Pip").await;
    let app = create_test_app(&resources);

    for hours in [24, 48] {
        post_json(
            &app,
            &customer_token,
            "/api/appointments",
            json!({
                "business_id": business.id.to_string(),
                "pet_id": pet.id.to_string(),
                "scheduled_at": hours_from_now(hours).to_rfc3339(),
            }),
        )
        .await;
    }

    let dashboard: Value = AxumTestRequest::get("/api/dashboard/businesses")
        .bearer(&owner_token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    let counts = &dashboard[0]["appointment_counts"];
    assert_eq!(counts["PENDING"], 2);
    assert_eq!(counts["CONFIRMED"], 0);
    assert_eq!(counts["NO_SHOW"], 0);

    let denied = AxumTestRequest::get("/api/dashboard/businesses")
        .bearer(&customer_token)
        .send(app.clone())
        .await;
    assert_eq!(denied.status(), 403);

    let bookings: Value = AxumTestRequest::get(&format!("/api/businesses/{}/appointments", business.id))
        .bearer(&owner_token)
        .send(app)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(bookings["total"], 2);
}

#[tokio::test]
async fn test_pets_are_private_and_soft_deleted() {
    let resources = create_test_resources().await;
    let (_, alice) = create_user(&resources, UserRole::PetOwner, "alice@example.com").await;
    let (_, bob) = create_user(&resources, UserRole::PetOwner, "bob@example.com").await;
    let app = create_test_app(&resources);

    let pet = post_json(
        &app,
        &alice,
        "/api/pets",
        json!({ "name": "Pamuk", "breed": "Maltese", "size": "SMALL", "birth_date": "2021-04-01" }),
    )
    .await;
    assert_eq!(pet["species"], "dog");
    assert_eq!(pet["size"], "small");
    let path = format!("/api/pets/{}", pet["id"].as_str().unwrap());

    let hidden = AxumTestRequest::get(&path).bearer(&bob).send(app.clone()).await;
    assert_eq!(hidden.status(), 404);

    let future_birthday = AxumTestRequest::patch(&path)
        .bearer(&alice)
        .json(&json!({ "birth_date": "2999-01-01" }))
        .send(app.clone())
        .await;
    assert_eq!(future_birthday.status(), 400);

    AxumTestRequest::delete(&path)
        .bearer(&alice)
        .send(app.clone())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let listed: Value = AxumTestRequest::get("/api/pets").bearer(&alice).send(app).await.json();
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_sitemap_lists_public_urls() {
    let resources = create_test_resources().await;
    let (_, admin) = create_user(&resources, UserRole::Admin, "admin@example.com").await;
    let (owner, _) = create_user(&resources, UserRole::BusinessOwner, "groomer@example.com").await;
    create_business_on_plan(&resources, &owner, "Paws & Claws", PlanTier::Basic).await;
    let app = create_test_app(&resources);

    let city = post_json(&app, &admin, "/api/admin/cities", json!({ "name": "Izmir" })).await;
    post_json(
        &app,
        &admin,
        "/api/admin/districts",
        json!({ "name": "Karsiyaka", "parent_id": city["id"] }),
    )
    .await;
    post_json(
        &app,
        &admin,
        "/api/admin/pages",
        json!({ "title": "Draft", "content": "Not yet" }),
    )
    .await;
    post_json(
        &app,
        &admin,
        "/api/admin/pages",
        json!({ "title": "Terms", "content": "Be kind to pets", "is_published": true }),
    )
    .await;

    let response = AxumTestRequest::get("/sitemap.xml")
        .send(app)
        .await
        .assert_status(StatusCode::OK);
    assert!(response.header("content-type").unwrap().starts_with("application/xml"));

    let xml = response.text();
    assert!(xml.contains("<loc>https://pawhub.test/</loc>"));
    assert!(xml.contains("<loc>https://pawhub.test/businesses/paws-claws</loc>"));
    assert!(xml.contains("<loc>https://pawhub.test/izmir/karsiyaka</loc>"));
    assert!(xml.contains("<loc>https://pawhub.test/pages/terms</loc>"));
    assert!(!xml.contains("/pages/draft"));
}
