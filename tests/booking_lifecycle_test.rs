// ABOUTME: Integration tests for appointment booking and status changes over HTTP
// ABOUTME: Covers plan gating, double booking, participant visibility and the cancellation window
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

#![allow(clippy::unwrap_used, clippy::expect_used, missing_docs)]

mod common;
mod helpers;

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use common::{create_business_on_plan, create_pet, create_test_app, create_test_resources, create_user, hours_from_now};
use helpers::axum_test::AxumTestRequest;
use pawhub_server::{models::PlanTier, permissions::UserRole};
use serde_json::{json, Value};

struct Fixture {
    app: axum::Router,
    customer_token: String,
    owner_token: String,
    business_id: String,
    service_id: String,
    pet_id: String,
}

async fn fixture(plan: PlanTier) -> Fixture {
    let resources = create_test_resources().await;
    let (owner, owner_token) = create_user(&resources, UserRole::BusinessOwner, "groomer@example.com").await;
    let (customer, customer_token) = create_user(&resources, UserRole::PetOwner, "owner@example.com").await;
    let (business, service) = create_business_on_plan(&resources, &owner, "Happy Paws", plan).await;
    let pet = create_pet(&resources, &customer, "Rex").await;

    Fixture {
        app: create_test_app(&resources),
        customer_token,
        owner_token,
        business_id: business.id.to_string(),
        service_id: service.id.to_string(),
        pet_id: pet.id.to_string(),
    }
}

async fn book(f: &Fixture, scheduled_at: DateTime<Utc>) -> helpers::axum_test::AxumTestResponse {
    AxumTestRequest::post("/api/appointments")
        .bearer(&f.customer_token)
        .json(&json!({
            "business_id": f.business_id,
            "pet_id": f.pet_id,
            "service_id": f.service_id,
            "scheduled_at": scheduled_at.to_rfc3339(),
        }))
        .send(f.app.clone())
        .await
}

async fn set_status(f: &Fixture, token: &str, id: &str, status: &str) -> helpers::axum_test::AxumTestResponse {
    AxumTestRequest::patch(&format!("/api/appointments/{id}/status"))
        .bearer(token)
        .json(&json!({ "status": status }))
        .send(f.app.clone())
        .await
}

#[tokio::test]
async fn test_booking_creates_pending_appointment() {
    let f = fixture(PlanTier::Basic).await;

    let body: Value = book(&f, hours_from_now(48)).await.assert_status(StatusCode::CREATED).json();
    assert_eq!(body["status"], "PENDING");
    assert_eq!(body["business_id"], f.business_id.as_str());
    assert_eq!(body["pet_id"], f.pet_id.as_str());
}

#[tokio::test]
async fn test_booking_requires_session() {
    let f = fixture(PlanTier::Basic).await;

    let response = AxumTestRequest::post("/api/appointments")
        .json(&json!({ "business_id": f.business_id, "pet_id": f.pet_id }))
        .send(f.app.clone())
        .await;
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_free_plan_rejects_bookings() {
    let f = fixture(PlanTier::Free).await;

    let response = book(&f, hours_from_now(48)).await;
    assert_eq!(response.status(), 400);
    assert_eq!(response.error_code(), "BOOKING_REJECTED");
}

#[tokio::test]
async fn test_past_start_time_is_rejected() {
    let f = fixture(PlanTier::Basic).await;

    let response = book(&f, hours_from_now(-1)).await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_same_slot_cannot_be_booked_twice() {
    let f = fixture(PlanTier::Premium).await;

    let slot = hours_from_now(72);
    book(&f, slot).await.assert_status(StatusCode::CREATED);
    let response = book(&f, slot).await;
    assert_eq!(response.status(), 409);
    assert_eq!(response.error_code(), "SLOT_UNAVAILABLE");
}

#[tokio::test]
async fn test_other_customers_pet_is_not_found() {
    let resources = create_test_resources().await;
    let (owner, _) = create_user(&resources, UserRole::BusinessOwner, "groomer@example.com").await;
    let (_, intruder_token) = create_user(&resources, UserRole::PetOwner, "intruder@example.com").await;
    let (victim, _) = create_user(&resources, UserRole::PetOwner, "victim@example.com").await;
    let (business, _) = create_business_on_plan(&resources, &owner, "Clip Joint", PlanTier::Basic).await;
    let pet = create_pet(&resources, &victim, "Luna").await;

    let response = AxumTestRequest::post("/api/appointments")
        .bearer(&intruder_token)
        .json(&json!({
            "business_id": business.id.to_string(),
            "pet_id": pet.id.to_string(),
            "scheduled_at": hours_from_now(24).to_rfc3339(),
        }))
        .send(create_test_app(&resources))
        .await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_owner_confirms_then_completes() {
    let f = fixture(PlanTier::Basic).await;
    let created: Value = book(&f, hours_from_now(48)).await.json();
    let id = created["id"].as_str().unwrap().to_owned();

    let confirmed: Value = set_status(&f, &f.owner_token, &id, "CONFIRMED")
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(confirmed["status"], "CONFIRMED");

    set_status(&f, &f.owner_token, &id, "IN_PROGRESS")
        .await
        .assert_status(StatusCode::OK);
    let completed: Value = set_status(&f, &f.owner_token, &id, "COMPLETED")
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(completed["status"], "COMPLETED");

    // Terminal statuses have no outgoing edges
    let response = set_status(&f, &f.owner_token, &id, "CANCELLED").await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_customer_cannot_confirm_own_booking() {
    let f = fixture(PlanTier::Basic).await;
    let created: Value = book(&f, hours_from_now(48)).await.json();
    let id = created["id"].as_str().unwrap();

    let response = set_status(&f, &f.customer_token, id, "CONFIRMED").await;
    assert_eq!(response.status(), 403);
}

#[tokio::test]
async fn test_owner_cannot_cancel() {
    let f = fixture(PlanTier::Basic).await;
    let created: Value = book(&f, hours_from_now(48)).await.json();
    let id = created["id"].as_str().unwrap();

    let response = set_status(&f, &f.owner_token, id, "CANCELLED").await;
    assert_eq!(response.status(), 403);
}

#[tokio::test]
async fn test_cancellation_window_closes_two_hours_before_start() {
    let f = fixture(PlanTier::Basic).await;

    let late: Value = book(&f, hours_from_now(1)).await.assert_status(StatusCode::CREATED).json();
    let response = set_status(&f, &f.customer_token, late["id"].as_str().unwrap(), "CANCELLED").await;
    assert_eq!(response.status(), 400);
    assert_eq!(response.error_code(), "BOOKING_REJECTED");

    let early: Value = book(&f, hours_from_now(24)).await.json();
    let cancelled: Value = AxumTestRequest::patch(&format!(
        "/api/appointments/{}/status",
        early["id"].as_str().unwrap()
    ))
    .bearer(&f.customer_token)
    .json(&json!({ "status": "cancelled", "reason": "Vet visit" }))
    .send(f.app.clone())
    .await
    .assert_status(StatusCode::OK)
    .json();
    assert_eq!(cancelled["status"], "CANCELLED");
    assert_eq!(cancelled["cancellation_reason"], "Vet visit");
}

#[tokio::test]
async fn test_cancelled_slot_can_be_rebooked() {
    let f = fixture(PlanTier::Basic).await;
    let slot = hours_from_now(30);
    let created: Value = book(&f, slot).await.json();
    set_status(&f, &f.customer_token, created["id"].as_str().unwrap(), "CANCELLED")
        .await
        .assert_status(StatusCode::OK);

    book(&f, slot).await.assert_status(StatusCode::CREATED);
}

#[tokio::test]
async fn test_non_participant_sees_not_found() {
    let resources = create_test_resources().await;
    let (owner, _) = create_user(&resources, UserRole::BusinessOwner, "groomer@example.com").await;
    let (customer, customer_token) = create_user(&resources, UserRole::PetOwner, "owner@example.com").await;
    let (_, stranger_token) = create_user(&resources, UserRole::BusinessOwner, "other@example.com").await;
    let (business, _) = create_business_on_plan(&resources, &owner, "Fluff", PlanTier::Basic).await;
    let pet = create_pet(&resources, &customer, "Milo").await;
    let app = create_test_app(&resources);

    let created: Value = AxumTestRequest::post("/api/appointments")
        .bearer(&customer_token)
        .json(&json!({
            "business_id": business.id.to_string(),
            "pet_id": pet.id.to_string(),
            "scheduled_at": hours_from_now(24).to_rfc3339(),
        }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    let id = created["id"].as_str().unwrap();

    let response = AxumTestRequest::get(&format!("/api/appointments/{id}"))
        .bearer(&stranger_token)
        .send(app.clone())
        .await;
    assert_eq!(response.status(), 404);

    let response = AxumTestRequest::patch(&format!("/api/appointments/{id}/status"))
        .bearer(&stranger_token)
        .json(&json!({ "status": "CONFIRMED" }))
        .send(app.clone())
        .await;
    assert_eq!(response.status(), 404);

    let response = AxumTestRequest::get("/api/appointments/not-a-uuid")
        .bearer(&customer_token)
        .send(app)
        .await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_customer_lists_only_own_appointments() {
    let f = fixture(PlanTier::Basic).await;
    book(&f, hours_from_now(24)).await.assert_status(StatusCode::CREATED);
    book(&f, hours_from_now(48)).await.assert_status(StatusCode::CREATED);

    let page: Value = AxumTestRequest::get("/api/appointments?status=pending")
        .bearer(&f.customer_token)
        .send(f.app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(page["total"], 2);
    assert_eq!(page["items"].as_array().unwrap().len(), 2);

    let page: Value = AxumTestRequest::get("/api/appointments")
        .bearer(&f.owner_token)
        .send(f.app.clone())
        .await
        .json();
    assert_eq!(page["total"], 0);
}

#[tokio::test]
async fn test_admin_may_cancel_inside_window() {
    let resources = create_test_resources().await;
    let (owner, _) = create_user(&resources, UserRole::BusinessOwner, "groomer@example.com").await;
    let (customer, customer_token) = create_user(&resources, UserRole::PetOwner, "owner@example.com").await;
    let (_, admin_token) = create_user(&resources, UserRole::Admin, "admin@example.com").await;
    let (business, _) = create_business_on_plan(&resources, &owner, "Late Night", PlanTier::Enterprise).await;
    let pet = create_pet(&resources, &customer, "Nova").await;
    let app = create_test_app(&resources);

    let created: Value = AxumTestRequest::post("/api/appointments")
        .bearer(&customer_token)
        .json(&json!({
            "business_id": business.id.to_string(),
            "pet_id": pet.id.to_string(),
            "scheduled_at": hours_from_now(1).to_rfc3339(),
        }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED)
        .json();

    let cancelled: Value = AxumTestRequest::patch(&format!(
        "/api/appointments/{}/status",
        created["id"].as_str().unwrap()
    ))
    .bearer(&admin_token)
    .json(&json!({ "status": "CANCELLED", "reason": "Salon closed" }))
    .send(app)
    .await
    .assert_status(StatusCode::OK)
    .json();
    assert_eq!(cancelled["status"], "CANCELLED");
}

#[tokio::test]
async fn test_three_no_shows_block_further_bookings() {
    let f = fixture(PlanTier::Premium).await;

    for hours in [24, 25, 26] {
        let created: Value = book(&f, hours_from_now(hours)).await.assert_status(StatusCode::CREATED).json();
        let id = created["id"].as_str().unwrap();
        set_status(&f, &f.owner_token, id, "CONFIRMED")
            .await
            .assert_status(StatusCode::OK);
        set_status(&f, &f.owner_token, id, "NO_SHOW")
            .await
            .assert_status(StatusCode::OK);
    }

    let response = book(&f, hours_from_now(48)).await;
    assert_eq!(response.status(), 403);
}
