// ABOUTME: Integration tests for reviews and the featured-score ranking they drive
// ABOUTME: Checks duplicate and self reviews, owner replies and re-ranking on add and removal
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp, missing_docs)]

mod common;
mod helpers;

use axum::http::StatusCode;
use common::{create_business_on_plan, create_test_app, create_test_resources, create_user};
use helpers::axum_test::AxumTestRequest;
use pawhub_server::{models::PlanTier, permissions::UserRole, ranking::featured_score};
use serde_json::{json, Value};

const EPSILON: f64 = 1e-9;

async fn post_review(app: &axum::Router, token: &str, business_id: &str, rating: i64) -> helpers::axum_test::AxumTestResponse {
    AxumTestRequest::post(&format!("/api/businesses/{business_id}/reviews"))
        .bearer(token)
        .json(&json!({ "rating": rating, "comment": "Lovely staff" }))
        .send(app.clone())
        .await
}

#[tokio::test]
async fn test_review_updates_stats_and_score() {
    let resources = create_test_resources().await;
    let (owner, _) = create_user(&resources, UserRole::BusinessOwner, "groomer@example.com").await;
    let (_, alice) = create_user(&resources, UserRole::PetOwner, "alice@example.com").await;
    let (_, bob) = create_user(&resources, UserRole::PetOwner, "bob@example.com").await;
    let (business, _) = create_business_on_plan(&resources, &owner, "Shiny Coats", PlanTier::Basic).await;
    let app = create_test_app(&resources);
    let id = business.id.to_string();

    let review: Value = post_review(&app, &alice, &id, 4)
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert_eq!(review["rating"], 4);
    post_review(&app, &bob, &id, 2).await.assert_status(StatusCode::CREATED);

    let stored = resources.database.businesses().get(business.id).await.unwrap().unwrap();
    assert_eq!(stored.review_count, 2);
    assert!((stored.avg_rating - 3.0).abs() < EPSILON);
    assert!((stored.featured_score - featured_score(PlanTier::Basic, 3.0, 2)).abs() < EPSILON);

    let detail: Value = AxumTestRequest::get(&format!("/api/businesses/{}", business.slug))
        .send(app)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(detail["business"]["review_count"], 2);
    assert_eq!(detail["recent_reviews"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_second_review_by_same_user_conflicts() {
    let resources = create_test_resources().await;
    let (owner, _) = create_user(&resources, UserRole::BusinessOwner, "groomer@example.com").await;
    let (_, alice) = create_user(&resources, UserRole::PetOwner, "alice@example.com").await;
    let (business, _) = create_business_on_plan(&resources, &owner, "Once Only", PlanTier::Free).await;
    let app = create_test_app(&resources);
    let id = business.id.to_string();

    post_review(&app, &alice, &id, 5).await.assert_status(StatusCode::CREATED);
    let response = post_review(&app, &alice, &id, 1).await;
    assert_eq!(response.status(), 409);

    let stored = resources.database.businesses().get(business.id).await.unwrap().unwrap();
    assert_eq!(stored.review_count, 1);
}

#[tokio::test]
async fn test_owner_cannot_review_own_business() {
    let resources = create_test_resources().await;
    let (owner, owner_token) = create_user(&resources, UserRole::BusinessOwner, "groomer@example.com").await;
    let (business, _) = create_business_on_plan(&resources, &owner, "Self Love", PlanTier::Basic).await;

    let response = post_review(&create_test_app(&resources), &owner_token, &business.id.to_string(), 5).await;
    assert_eq!(response.status(), 403);
}

#[tokio::test]
async fn test_rating_out_of_range_is_rejected() {
    let resources = create_test_resources().await;
    let (owner, _) = create_user(&resources, UserRole::BusinessOwner, "groomer@example.com").await;
    let (_, alice) = create_user(&resources, UserRole::PetOwner, "alice@example.com").await;
    let (business, _) = create_business_on_plan(&resources, &owner, "Stars", PlanTier::Basic).await;
    let app = create_test_app(&resources);
    let id = business.id.to_string();

    assert_eq!(post_review(&app, &alice, &id, 0).await.status(), 400);
    assert_eq!(post_review(&app, &alice, &id, 6).await.status(), 400);
}

#[tokio::test]
async fn test_malformed_review_body_uses_error_envelope() {
    let resources = create_test_resources().await;
    let (owner, _) = create_user(&resources, UserRole::BusinessOwner, "groomer@example.com").await;
    let (_, alice) = create_user(&resources, UserRole::PetOwner, "alice@example.com").await;
    let (business, _) = create_business_on_plan(&resources, &owner, "Typed Paws", PlanTier::Basic).await;
    let app = create_test_app(&resources);
    let uri = format!("/api/businesses/{}/reviews", business.id);

    let body: Value = AxumTestRequest::post(&uri)
        .bearer(&alice)
        .json(&json!({ "rating": "five" }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .json();
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
    assert!(!body["error"]["message"].as_str().unwrap().is_empty());

    let code = AxumTestRequest::post(&uri)
        .bearer(&alice)
        .header("content-type", "application/json")
        .raw_body("{\"rating\": 4")
        .send(app.clone())
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .error_code();
    assert_eq!(code, "INVALID_INPUT");

    let code = AxumTestRequest::post(&uri)
        .bearer(&alice)
        .raw_body(r#"{"rating": 4}"#)
        .send(app.clone())
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .error_code();
    assert_eq!(code, "INVALID_INPUT");

    let stored = resources.database.businesses().get(business.id).await.unwrap().unwrap();
    assert_eq!(stored.review_count, 0);
}

#[tokio::test]
async fn test_malformed_search_query_uses_error_envelope() {
    let resources = create_test_resources().await;
    let app = create_test_app(&resources);

    let code = AxumTestRequest::get("/api/businesses?page=first")
        .send(app)
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .error_code();
    assert_eq!(code, "INVALID_INPUT");
}

#[tokio::test]
async fn test_admin_delete_reranks_business() {
    let resources = create_test_resources().await;
    let (owner, _) = create_user(&resources, UserRole::BusinessOwner, "groomer@example.com").await;
    let (_, alice) = create_user(&resources, UserRole::PetOwner, "alice@example.com").await;
    let (_, bob) = create_user(&resources, UserRole::PetOwner, "bob@example.com").await;
    let (_, admin) = create_user(&resources, UserRole::Admin, "admin@example.com").await;
    let (business, _) = create_business_on_plan(&resources, &owner, "Moderated", PlanTier::Premium).await;
    let app = create_test_app(&resources);
    let id = business.id.to_string();

    post_review(&app, &alice, &id, 5).await.assert_status(StatusCode::CREATED);
    let spam: Value = post_review(&app, &bob, &id, 1).await.json();

    AxumTestRequest::delete(&format!("/api/admin/reviews/{}", spam["id"].as_str().unwrap()))
        .bearer(&admin)
        .send(app.clone())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let stored = resources.database.businesses().get(business.id).await.unwrap().unwrap();
    assert_eq!(stored.review_count, 1);
    assert!((stored.avg_rating - 5.0).abs() < EPSILON);
    assert!((stored.featured_score - featured_score(PlanTier::Premium, 5.0, 1)).abs() < EPSILON);

    let again = AxumTestRequest::delete(&format!("/api/admin/reviews/{}", spam["id"].as_str().unwrap()))
        .bearer(&admin)
        .send(app)
        .await;
    assert_eq!(again.status(), 404);
}

#[tokio::test]
async fn test_only_owner_can_reply() {
    let resources = create_test_resources().await;
    let (owner, owner_token) = create_user(&resources, UserRole::BusinessOwner, "groomer@example.com").await;
    let (_, alice) = create_user(&resources, UserRole::PetOwner, "alice@example.com").await;
    let (business, _) = create_business_on_plan(&resources, &owner, "Replies", PlanTier::Basic).await;
    let app = create_test_app(&resources);

    let review: Value = post_review(&app, &alice, &business.id.to_string(), 3).await.json();
    let review_id = review["id"].as_str().unwrap();

    let response = AxumTestRequest::post(&format!("/api/reviews/{review_id}/reply"))
        .bearer(&alice)
        .json(&json!({ "reply": "I agree with myself" }))
        .send(app.clone())
        .await;
    assert_eq!(response.status(), 403);

    let replied: Value = AxumTestRequest::post(&format!("/api/reviews/{review_id}/reply"))
        .bearer(&owner_token)
        .json(&json!({ "reply": "Thanks, see you next time!" }))
        .send(app)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(replied["owner_reply"], "Thanks, see you next time!");
}

#[tokio::test]
async fn test_search_orders_by_featured_score() {
    let resources = create_test_resources().await;
    let (owner, _) = create_user(&resources, UserRole::BusinessOwner, "groomer@example.com").await;
    create_business_on_plan(&resources, &owner, "Free Trim", PlanTier::Free).await;
    create_business_on_plan(&resources, &owner, "Premium Trim", PlanTier::Premium).await;
    create_business_on_plan(&resources, &owner, "Basic Trim", PlanTier::Basic).await;

    let page: Value = AxumTestRequest::get("/api/businesses?q=trim")
        .send(create_test_app(&resources))
        .await
        .assert_status(StatusCode::OK)
        .json();
    let names: Vec<&str> = page["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Premium Trim", "Basic Trim", "Free Trim"]);
    assert_eq!(page["total"], 3);
}
