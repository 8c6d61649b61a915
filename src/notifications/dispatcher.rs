// ABOUTME: Writes in-app notifications and queues templated emails for domain events
// ABOUTME: Rows are staged in the caller's transaction; delivery happens only after commit
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use sqlx::SqliteConnection;
use tracing::warn;
use uuid::Uuid;

use super::mailer::Mailer;
use super::templates::{
    booking_request_notification, render_booking_email, review_notification, status_notification,
    BookingContext, EmailTemplate, RenderedNotification,
};
use crate::config::MailConfig;
use crate::database::{Database, NotificationManager, OutboxManager};
use crate::errors::AppResult;
use crate::logging::AppLogger;
use crate::models::{Appointment, Business, EmailStatus, Notification, OutboxEmail, User};

/// Outbox ids queued inside a transaction, to deliver once it commits
#[derive(Debug, Default)]
#[must_use]
pub struct StagedEmails(Vec<Uuid>);

impl StagedEmails {
    /// Number of queued emails
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing was queued
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Outcome of an outbox flush
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct FlushSummary {
    /// Emails handed to the mailer
    pub attempted: usize,
    /// Accepted by the mailer
    pub sent: usize,
    /// Rejected by the mailer
    pub failed: usize,
}

/// Fans domain events out to notifications and the email outbox
pub struct NotificationDispatcher {
    database: Database,
    mailer: Arc<dyn Mailer>,
    mail: MailConfig,
    public_base_url: String,
}

impl NotificationDispatcher {
    /// Create a dispatcher
    #[must_use]
    pub fn new(
        database: Database,
        mailer: Arc<dyn Mailer>,
        mail: MailConfig,
        public_base_url: &str,
    ) -> Self {
        Self {
            database,
            mailer,
            mail,
            public_base_url: public_base_url.trim_end_matches('/').to_owned(),
        }
    }

    /// Absolute URL for an app path
    #[must_use]
    pub fn absolute_url(&self, path: &str) -> String {
        format!("{}{path}", self.public_base_url)
    }

    /// Stage the customer notification and email for a status change
    ///
    /// Statuses without a customer template stage nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if an insert fails; the caller's transaction should
    /// then be dropped so the status change rolls back with it
    pub async fn stage_status_change_in(
        &self,
        conn: &mut SqliteConnection,
        appointment: &Appointment,
        customer: &User,
        business: &Business,
        pet_name: &str,
    ) -> AppResult<StagedEmails> {
        let Some(template) = EmailTemplate::for_status(appointment.status) else {
            return Ok(StagedEmails::default());
        };

        let path = format!("/appointments/{}", appointment.id);
        let link = self.absolute_url(&path);
        let ctx = BookingContext {
            customer_name: customer.greeting_name(),
            business_name: &business.name,
            pet_name,
            scheduled_at: appointment.scheduled_at,
            reason: appointment.cancellation_reason.as_deref(),
            link: &link,
        };

        let note = status_notification(template, &ctx);
        NotificationManager::insert_in(conn, &to_notification(customer.id, note, Some(path))).await?;

        let rendered = render_booking_email(template, &ctx);
        let email = OutboxEmail {
            id: Uuid::new_v4(),
            to_email: customer.email.clone(),
            subject: rendered.subject,
            html_body: rendered.html_body,
            template: template.name().to_owned(),
            status: EmailStatus::Queued,
            created_at: Utc::now(),
            sent_at: None,
        };
        OutboxManager::enqueue_in(conn, &email).await?;
        AppLogger::log_email_event(email.id, template.name(), "queued", true);

        Ok(StagedEmails(vec![email.id]))
    }

    /// Stage the business owner's "new booking request" notification
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn stage_booking_request_in(
        &self,
        conn: &mut SqliteConnection,
        appointment: &Appointment,
        customer: &User,
        business: &Business,
        pet_name: &str,
    ) -> AppResult<()> {
        let path = format!("/dashboard/businesses/{}/appointments", business.id);
        let link = self.absolute_url(&path);
        let ctx = BookingContext {
            customer_name: customer.greeting_name(),
            business_name: &business.name,
            pet_name,
            scheduled_at: appointment.scheduled_at,
            reason: None,
            link: &link,
        };
        let note = booking_request_notification(&ctx);
        NotificationManager::insert_in(conn, &to_notification(business.owner_id, note, Some(path)))
            .await
    }

    /// Stage the business owner's "new review" notification
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn stage_review_in(
        &self,
        conn: &mut SqliteConnection,
        business: &Business,
        rating: u8,
    ) -> AppResult<()> {
        let note = review_notification(&business.name, rating);
        let path = format!("/businesses/{}", business.slug);
        NotificationManager::insert_in(conn, &to_notification(business.owner_id, note, Some(path)))
            .await
    }

    /// Deliver emails staged by a committed transaction
    ///
    /// Does nothing unless immediate delivery is configured; queued emails
    /// otherwise wait for [`Self::flush_queued`]. Delivery failures are
    /// recorded on the outbox row and never fail the request.
    pub async fn deliver(&self, staged: StagedEmails) {
        if !self.mail.deliver_immediately || staged.is_empty() {
            return;
        }
        let outbox = self.database.outbox();
        for email_id in staged.0 {
            match outbox.get(email_id).await {
                Ok(Some(email)) => {
                    self.deliver_one(&email).await;
                }
                Ok(None) => warn!(email.id = %email_id, "Staged email vanished before delivery"),
                Err(e) => warn!(email.id = %email_id, "Failed to load staged email: {}", e),
            }
        }
    }

    /// Hand the oldest queued emails to the mailer
    ///
    /// # Errors
    ///
    /// Returns an error if the outbox cannot be read
    pub async fn flush_queued(&self, limit: i64) -> AppResult<FlushSummary> {
        let queued = self.database.outbox().list_queued(limit).await?;
        let mut summary = FlushSummary::default();
        for email in &queued {
            summary.attempted += 1;
            if self.deliver_one(email).await {
                summary.sent += 1;
            } else {
                summary.failed += 1;
            }
        }
        Ok(summary)
    }

    async fn deliver_one(&self, email: &OutboxEmail) -> bool {
        let outbox = self.database.outbox();
        match self.mailer.send(email).await {
            Ok(()) => {
                AppLogger::log_email_event(email.id, &email.template, "sent", true);
                if let Err(e) = outbox.mark_sent(email.id, Utc::now()).await {
                    warn!(email.id = %email.id, "Failed to record email delivery: {}", e);
                }
                true
            }
            Err(e) => {
                AppLogger::log_email_event(email.id, &email.template, "send_failed", false);
                warn!(email.id = %email.id, mailer = self.mailer.name(), "Email delivery failed: {}", e);
                if let Err(e) = outbox.mark_failed(email.id, &e.message).await {
                    warn!(email.id = %email.id, "Failed to record email failure: {}", e);
                }
                false
            }
        }
    }
}

fn to_notification(user_id: Uuid, note: RenderedNotification, link: Option<String>) -> Notification {
    Notification {
        id: Uuid::new_v4(),
        user_id,
        kind: note.kind.to_owned(),
        title: note.title,
        message: note.message,
        link,
        is_read: false,
        created_at: Utc::now(),
    }
}
