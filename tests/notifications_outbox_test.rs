// ABOUTME: Integration tests for in-app notifications and the email outbox
// ABOUTME: Status changes notify customers, queued mail is flushed through pluggable mailers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

#![allow(clippy::unwrap_used, clippy::expect_used, missing_docs)]

mod common;
mod helpers;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::StatusCode;
use common::{
    create_business_on_plan, create_pet, create_test_app, create_test_resources,
    create_test_resources_with_mailer, create_user, hours_from_now,
};
use helpers::axum_test::AxumTestRequest;
use pawhub_server::{
    errors::{AppError, AppResult},
    models::{EmailStatus, OutboxEmail, PlanTier},
    notifications::Mailer,
    pagination::PageParams,
    permissions::UserRole,
    resources::ServerResources,
};
use serde_json::{json, Value};

/// Remembers the recipients it was asked to deliver to
#[derive(Default)]
struct RecordingMailer {
    recipients: Mutex<Vec<String>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn send(&self, email: &OutboxEmail) -> AppResult<()> {
        self.recipients.lock().unwrap().push(email.to_email.clone());
        Ok(())
    }
}

struct RefusingMailer;

#[async_trait]
impl Mailer for RefusingMailer {
    fn name(&self) -> &'static str {
        "refusing"
    }

    async fn send(&self, _email: &OutboxEmail) -> AppResult<()> {
        Err(AppError::external_service("smtp", "relay unavailable"))
    }
}

struct Booked {
    app: axum::Router,
    customer_token: String,
    owner_token: String,
    admin_token: String,
    appointment_id: String,
}

/// Book one appointment; the owner has been notified of the request
async fn booked(resources: &Arc<ServerResources>) -> Booked {
    let (owner, owner_token) = create_user(resources, UserRole::BusinessOwner, "groomer@example.com").await;
    let (customer, customer_token) = create_user(resources, UserRole::PetOwner, "customer@example.com").await;
    let (_, admin_token) = create_user(resources, UserRole::Admin, "admin@example.com").await;
    let (business, service) = create_business_on_plan(resources, &owner, "Bubbles", PlanTier::Basic).await;
    let pet = create_pet(resources, &customer, "Biscuit").await;
    let app = create_test_app(resources);

    let created: Value = AxumTestRequest::post("/api/appointments")
        .bearer(&customer_token)
        .json(&json!({
            "business_id": business.id.to_string(),
            "pet_id": pet.id.to_string(),
            "service_id": service.id.to_string(),
            "scheduled_at": hours_from_now(48).to_rfc3339(),
        }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED)
        .json();

    Booked {
        app,
        customer_token,
        owner_token,
        admin_token,
        appointment_id: created["id"].as_str().unwrap().to_owned(),
    }
}

async fn confirm(b: &Booked) {
    AxumTestRequest::patch(&format!("/api/appointments/{}/status", b.appointment_id))
        .bearer(&b.owner_token)
        .json(&json!({ "status": "CONFIRMED" }))
        .send(b.app.clone())
        .await
        .assert_status(StatusCode::OK);
}

async fn set_status(b: &Booked, token: &str, body: Value) {
    AxumTestRequest::patch(&format!("/api/appointments/{}/status", b.appointment_id))
        .bearer(token)
        .json(&body)
        .send(b.app.clone())
        .await
        .assert_status(StatusCode::OK);
}

/// Notification kinds the customer has received, oldest first
async fn customer_kinds(b: &Booked) -> Vec<String> {
    let page: Value = AxumTestRequest::get("/api/notifications?per_page=50")
        .bearer(&b.customer_token)
        .send(b.app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    let mut kinds: Vec<String> = page["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["kind"].as_str().unwrap().to_owned())
        .collect();
    kinds.sort();
    kinds
}

fn templates_of(emails: &[OutboxEmail]) -> Vec<String> {
    let mut templates: Vec<String> = emails.iter().map(|e| e.template.clone()).collect();
    templates.sort();
    templates
}

async fn outbox_with(resources: &ServerResources, status: EmailStatus) -> Vec<OutboxEmail> {
    resources
        .database
        .outbox()
        .list(Some(status), PageParams::new(Some(1), Some(50), 50))
        .await
        .unwrap()
        .0
}

#[tokio::test]
async fn test_booking_request_notifies_owner_without_email() {
    let resources = create_test_resources().await;
    let b = booked(&resources).await;

    let unread: Value = AxumTestRequest::get("/api/notifications/unread-count")
        .bearer(&b.owner_token)
        .send(b.app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(unread["unread"], 1);

    assert!(outbox_with(&resources, EmailStatus::Queued).await.is_empty());
}

#[tokio::test]
async fn test_confirmation_notifies_customer_and_queues_email() {
    let resources = create_test_resources().await;
    let b = booked(&resources).await;
    confirm(&b).await;

    let page: Value = AxumTestRequest::get("/api/notifications")
        .bearer(&b.customer_token)
        .send(b.app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(page["total"], 1);
    let note = &page["items"][0];
    assert_eq!(note["is_read"], false);
    assert!(note["link"].as_str().unwrap().contains(&b.appointment_id));

    let queued = outbox_with(&resources, EmailStatus::Queued).await;
    assert_eq!(queued.len(), 1);
    assert_eq!(queued[0].to_email, "customer@example.com");
    assert!(queued[0].html_body.contains("Biscuit"));
}

#[tokio::test]
async fn test_customer_cancellation_notifies_and_queues_one_email() {
    let resources = create_test_resources().await;
    let b = booked(&resources).await;

    set_status(&b, &b.customer_token, json!({ "status": "CANCELLED", "reason": "Vet visit <today>" })).await;

    assert_eq!(customer_kinds(&b).await, vec!["booking_cancelled"]);
    let queued = outbox_with(&resources, EmailStatus::Queued).await;
    assert_eq!(templates_of(&queued), vec!["booking_cancelled"]);
    assert_eq!(queued[0].to_email, "customer@example.com");
    assert!(queued[0].html_body.contains("Vet visit &lt;today&gt;"));
}

#[tokio::test]
async fn test_completion_notifies_once_and_in_progress_stays_silent() {
    let resources = create_test_resources().await;
    let b = booked(&resources).await;
    confirm(&b).await;

    set_status(&b, &b.owner_token, json!({ "status": "IN_PROGRESS" })).await;
    assert_eq!(customer_kinds(&b).await, vec!["booking_confirmed"]);
    assert_eq!(outbox_with(&resources, EmailStatus::Queued).await.len(), 1);

    set_status(&b, &b.owner_token, json!({ "status": "COMPLETED" })).await;
    assert_eq!(
        customer_kinds(&b).await,
        vec!["booking_completed", "booking_confirmed"]
    );
    let queued = outbox_with(&resources, EmailStatus::Queued).await;
    assert_eq!(
        templates_of(&queued),
        vec!["booking_completed", "booking_confirmed"]
    );
}

#[tokio::test]
async fn test_no_show_adds_no_notification_or_email() {
    let resources = create_test_resources().await;
    let b = booked(&resources).await;
    confirm(&b).await;

    set_status(&b, &b.admin_token, json!({ "status": "NO_SHOW" })).await;

    assert_eq!(customer_kinds(&b).await, vec!["booking_confirmed"]);
    let queued = outbox_with(&resources, EmailStatus::Queued).await;
    assert_eq!(templates_of(&queued), vec!["booking_confirmed"]);
}

#[tokio::test]
async fn test_mark_read_and_read_all() {
    let resources = create_test_resources().await;
    let b = booked(&resources).await;
    confirm(&b).await;

    let page: Value = AxumTestRequest::get("/api/notifications?unread_only=true")
        .bearer(&b.customer_token)
        .send(b.app.clone())
        .await
        .json();
    let id = page["items"][0]["id"].as_str().unwrap().to_owned();

    // Someone else's notification looks missing
    let response = AxumTestRequest::post(&format!("/api/notifications/{id}/read"))
        .bearer(&b.owner_token)
        .send(b.app.clone())
        .await;
    assert_eq!(response.status(), 404);

    AxumTestRequest::post(&format!("/api/notifications/{id}/read"))
        .bearer(&b.customer_token)
        .send(b.app.clone())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let marked: Value = AxumTestRequest::post("/api/notifications/read-all")
        .bearer(&b.owner_token)
        .send(b.app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(marked["marked"], 1);

    let unread: Value = AxumTestRequest::get("/api/notifications/unread-count")
        .bearer(&b.customer_token)
        .send(b.app.clone())
        .await
        .json();
    assert_eq!(unread["unread"], 0);
}

#[tokio::test]
async fn test_admin_flush_sends_queued_email() {
    let mailer = Arc::new(RecordingMailer::default());
    let resources = create_test_resources_with_mailer(mailer.clone(), false).await;
    let b = booked(&resources).await;
    confirm(&b).await;

    let summary: Value = AxumTestRequest::post("/api/admin/email-outbox/flush")
        .bearer(&b.admin_token)
        .send(b.app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(summary["attempted"], 1);
    assert_eq!(summary["sent"], 1);
    assert_eq!(summary["failed"], 0);
    assert_eq!(*mailer.recipients.lock().unwrap(), ["customer@example.com"]);

    let sent = outbox_with(&resources, EmailStatus::Sent).await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].sent_at.is_some());

    let listed: Value = AxumTestRequest::get("/api/admin/email-outbox?status=sent")
        .bearer(&b.admin_token)
        .send(b.app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(listed["total"], 1);
}

#[tokio::test]
async fn test_immediate_delivery_failure_keeps_request_successful() {
    let resources = create_test_resources_with_mailer(Arc::new(RefusingMailer), true).await;
    let b = booked(&resources).await;

    // The transition succeeds even though the mailer refuses
    confirm(&b).await;

    let failed = outbox_with(&resources, EmailStatus::Failed).await;
    assert_eq!(failed.len(), 1);
    assert!(failed[0].sent_at.is_none());
    assert!(outbox_with(&resources, EmailStatus::Queued).await.is_empty());
}

#[tokio::test]
async fn test_immediate_delivery_marks_sent() {
    let mailer = Arc::new(RecordingMailer::default());
    let resources = create_test_resources_with_mailer(mailer.clone(), true).await;
    let b = booked(&resources).await;
    confirm(&b).await;

    assert_eq!(mailer.recipients.lock().unwrap().len(), 1);
    assert_eq!(outbox_with(&resources, EmailStatus::Sent).await.len(), 1);
}

#[tokio::test]
async fn test_outbox_is_admin_only() {
    let resources = create_test_resources().await;
    let b = booked(&resources).await;

    let response = AxumTestRequest::get("/api/admin/email-outbox")
        .bearer(&b.customer_token)
        .send(b.app.clone())
        .await;
    assert_eq!(response.status(), 403);
}
