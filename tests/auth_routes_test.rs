// ABOUTME: Integration tests for registration, login and session handling
// ABOUTME: Exercises bearer and cookie sessions, role rules on sign-up and logout
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

#![allow(clippy::unwrap_used, clippy::expect_used, missing_docs)]

mod common;
mod helpers;

use axum::http::StatusCode;
use common::{create_test_app, create_test_resources, create_user, TEST_PASSWORD};
use helpers::axum_test::AxumTestRequest;
use pawhub_server::{constants::limits::MAX_PASSWORD_BYTES, permissions::UserRole};
use serde_json::{json, Value};

#[tokio::test]
async fn test_register_returns_session_and_cookie() {
    let resources = create_test_resources().await;
    let app = create_test_app(&resources);

    let response = AxumTestRequest::post("/api/auth/register")
        .json(&json!({
            "email": "New.Groomer@Example.com",
            "password": "long enough password",
            "display_name": "New Groomer",
            "role": "business_owner",
        }))
        .send(app)
        .await
        .assert_status(StatusCode::CREATED);

    let cookie = response.header("set-cookie").unwrap();
    assert!(cookie.starts_with("pawhub_session="));
    assert!(cookie.contains("HttpOnly"));

    let body: Value = response.json();
    assert_eq!(body["user"]["email"], "new.groomer@example.com");
    assert_eq!(body["user"]["role"], "business_owner");
    assert!(body["user"].get("password_hash").is_none());
    assert!(!body["token"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_register_defaults_to_pet_owner() {
    let resources = create_test_resources().await;

    let body: Value = AxumTestRequest::post("/api/auth/register")
        .json(&json!({ "email": "pets@example.com", "password": "long enough password" }))
        .send(create_test_app(&resources))
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert_eq!(body["user"]["role"], "pet_owner");
}

#[tokio::test]
async fn test_register_cannot_choose_admin() {
    let resources = create_test_resources().await;

    let response = AxumTestRequest::post("/api/auth/register")
        .json(&json!({
            "email": "sneaky@example.com",
            "password": "long enough password",
            "role": "admin",
        }))
        .send(create_test_app(&resources))
        .await;
    assert_eq!(response.status(), 403);
}

#[tokio::test]
async fn test_register_duplicate_email_conflicts() {
    let resources = create_test_resources().await;
    create_user(&resources, UserRole::PetOwner, "taken@example.com").await;

    let response = AxumTestRequest::post("/api/auth/register")
        .json(&json!({ "email": "TAKEN@example.com", "password": "long enough password" }))
        .send(create_test_app(&resources))
        .await;
    assert_eq!(response.status(), 409);
    assert_eq!(response.error_code(), "RESOURCE_ALREADY_EXISTS");
}

#[tokio::test]
async fn test_register_validates_input() {
    let resources = create_test_resources().await;
    let app = create_test_app(&resources);

    let response = AxumTestRequest::post("/api/auth/register")
        .json(&json!({ "email": "not-an-email", "password": "long enough password" }))
        .send(app.clone())
        .await;
    assert_eq!(response.status(), 400);

    let response = AxumTestRequest::post("/api/auth/register")
        .json(&json!({ "email": "short@example.com", "password": "short" }))
        .send(app)
        .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_login_with_valid_and_invalid_credentials() {
    let resources = create_test_resources().await;
    create_user(&resources, UserRole::PetOwner, "login@example.com").await;
    let app = create_test_app(&resources);

    let body: Value = AxumTestRequest::post("/api/auth/login")
        .json(&json!({ "email": "login@example.com", "password": TEST_PASSWORD }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(body["user"]["email"], "login@example.com");

    let wrong_password = AxumTestRequest::post("/api/auth/login")
        .json(&json!({ "email": "login@example.com", "password": "nope nope nope" }))
        .send(app.clone())
        .await;
    let unknown_email = AxumTestRequest::post("/api/auth/login")
        .json(&json!({ "email": "ghost@example.com", "password": TEST_PASSWORD }))
        .send(app)
        .await;

    // Both failures look identical to the caller
    assert_eq!(wrong_password.status(), 401);
    assert_eq!(unknown_email.status(), 401);
    assert_eq!(wrong_password.error_code(), unknown_email.error_code());
}

#[tokio::test]
async fn test_password_longer_than_bcrypt_limit() {
    let resources = create_test_resources().await;
    let app = create_test_app(&resources);
    let prefix = "k".repeat(MAX_PASSWORD_BYTES);

    let response = AxumTestRequest::post("/api/auth/register")
        .json(&json!({ "email": "long@example.com", "password": format!("{prefix}REAL-SECRET") }))
        .send(app.clone())
        .await;
    assert_eq!(response.status(), 400);
    assert_eq!(response.error_code(), "INVALID_INPUT");

    AxumTestRequest::post("/api/auth/register")
        .json(&json!({ "email": "long@example.com", "password": prefix.as_str() }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED);

    // Extra bytes after the longest accepted password must not be ignored
    let response = AxumTestRequest::post("/api/auth/login")
        .json(&json!({ "email": "long@example.com", "password": format!("{prefix}anything") }))
        .send(app.clone())
        .await;
    assert_eq!(response.status(), 401);

    AxumTestRequest::post("/api/auth/login")
        .json(&json!({ "email": "long@example.com", "password": prefix.as_str() }))
        .send(app)
        .await
        .assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_me_accepts_bearer_and_cookie() {
    let resources = create_test_resources().await;
    let (user, token) = create_user(&resources, UserRole::BusinessOwner, "me@example.com").await;
    let app = create_test_app(&resources);

    let via_bearer: Value = AxumTestRequest::get("/api/auth/me")
        .bearer(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(via_bearer["id"], user.id.to_string());

    let via_cookie: Value = AxumTestRequest::get("/api/auth/me")
        .session_cookie(&token)
        .send(app)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(via_cookie["email"], "me@example.com");
}

#[tokio::test]
async fn test_me_rejects_missing_and_garbage_tokens() {
    let resources = create_test_resources().await;
    let app = create_test_app(&resources);

    let missing = AxumTestRequest::get("/api/auth/me").send(app.clone()).await;
    assert_eq!(missing.status(), 401);
    assert_eq!(missing.error_code(), "AUTH_REQUIRED");

    let garbage = AxumTestRequest::get("/api/auth/me")
        .bearer("not.a.jwt")
        .send(app)
        .await;
    assert_eq!(garbage.status(), 401);
}

#[tokio::test]
async fn test_update_profile() {
    let resources = create_test_resources().await;
    let (_, token) = create_user(&resources, UserRole::PetOwner, "profile@example.com").await;

    let body: Value = AxumTestRequest::patch("/api/auth/me")
        .bearer(&token)
        .json(&json!({ "display_name": "Renamed", "phone": "+90 555 123 4567" }))
        .send(create_test_app(&resources))
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(body["display_name"], "Renamed");
    assert_eq!(body["role"], "pet_owner");
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let resources = create_test_resources().await;

    let response = AxumTestRequest::post("/api/auth/logout")
        .send(create_test_app(&resources))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    let cookie = response.header("set-cookie").unwrap();
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_logout_revokes_copied_bearer_token() {
    let resources = create_test_resources().await;
    let (_, token) = create_user(&resources, UserRole::PetOwner, "leaving@example.com").await;
    let app = create_test_app(&resources);

    AxumTestRequest::get("/api/auth/me")
        .bearer(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK);

    AxumTestRequest::post("/api/auth/logout")
        .session_cookie(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let response = AxumTestRequest::get("/api/auth/me")
        .bearer(&token)
        .send(app.clone())
        .await;
    assert_eq!(response.status(), 401);
    assert_eq!(response.error_code(), "AUTH_INVALID");

    // Logging out again with the dead token still succeeds
    AxumTestRequest::post("/api/auth/logout")
        .bearer(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let body: Value = AxumTestRequest::post("/api/auth/login")
        .json(&json!({ "email": "leaving@example.com", "password": TEST_PASSWORD }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    let fresh = body["token"].as_str().unwrap();
    AxumTestRequest::get("/api/auth/me")
        .bearer(fresh)
        .send(app)
        .await
        .assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_deactivated_user_cannot_use_session() {
    let resources = create_test_resources().await;
    let (user, token) = create_user(&resources, UserRole::PetOwner, "gone@example.com").await;
    resources.database.users().set_active(user.id, false).await.unwrap();

    let response = AxumTestRequest::get("/api/auth/me")
        .bearer(&token)
        .send(create_test_app(&resources))
        .await;
    assert_eq!(response.status(), 401);
}
