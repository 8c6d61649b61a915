// ABOUTME: In-app notification rows and the outbound email outbox
// ABOUTME: Inserts run inside the caller's transaction; reads and delivery bookkeeping use the pool
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};
use uuid::Uuid;

use super::{count_to_u64, format_timestamp, parse_timestamp, parse_uuid};
use crate::errors::{AppError, AppResult};
use crate::models::{EmailStatus, Notification, OutboxEmail};
use crate::pagination::PageParams;

const NOTIFICATION_COLUMNS: &str = "id, user_id, kind, title, message, link, is_read, created_at";
const OUTBOX_COLUMNS: &str = "id, to_email, subject, html_body, template, status, created_at, sent_at";

/// In-app notification manager
pub struct NotificationManager {
    pool: SqlitePool,
}

impl NotificationManager {
    /// Create a new manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a notification inside a transaction
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn insert_in(conn: &mut SqliteConnection, notification: &Notification) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO notifications (id, user_id, kind, title, message, link, is_read, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(notification.id.to_string())
        .bind(notification.user_id.to_string())
        .bind(&notification.kind)
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(&notification.link)
        .bind(notification.is_read)
        .bind(format_timestamp(notification.created_at))
        .execute(conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to create notification: {e}")))?;
        Ok(())
    }

    /// A user's notifications, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        unread_only: bool,
        params: PageParams,
    ) -> AppResult<(Vec<Notification>, u64)> {
        let unread_filter = if unread_only { "AND is_read = 0" } else { "" };

        let total: i64 = sqlx::query(&format!(
            "SELECT COUNT(*) AS count FROM notifications WHERE user_id = $1 {unread_filter}"
        ))
        .bind(user_id.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to count notifications: {e}")))?
        .get("count");

        let rows = sqlx::query(&format!(
            r"
            SELECT {NOTIFICATION_COLUMNS} FROM notifications
            WHERE user_id = $1 {unread_filter}
            ORDER BY created_at DESC, id ASC
            LIMIT $2 OFFSET $3
            "
        ))
        .bind(user_id.to_string())
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list notifications: {e}")))?;

        let notifications = rows.iter().map(row_to_notification).collect::<AppResult<Vec<_>>>()?;
        Ok((notifications, count_to_u64(total)))
    }

    /// Unread notification count
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn unread_count(&self, user_id: Uuid) -> AppResult<u64> {
        let count: i64 = sqlx::query(
            "SELECT COUNT(*) AS count FROM notifications WHERE user_id = $1 AND is_read = 0",
        )
        .bind(user_id.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to count unread notifications: {e}")))?
        .get("count");
        Ok(count_to_u64(count))
    }

    /// Mark one of the user's notifications read; `false` if it is not theirs
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn mark_read(&self, notification_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("UPDATE notifications SET is_read = 1 WHERE id = $1 AND user_id = $2")
            .bind(notification_id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to mark notification read: {e}")))?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark all of a user's notifications read, returning how many changed
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn mark_all_read(&self, user_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("UPDATE notifications SET is_read = 1 WHERE user_id = $1 AND is_read = 0")
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to mark notifications read: {e}")))?;
        Ok(result.rows_affected())
    }
}

/// Email outbox manager
pub struct OutboxManager {
    pool: SqlitePool,
}

impl OutboxManager {
    /// Create a new manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Queue a rendered email inside a transaction
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn enqueue_in(conn: &mut SqliteConnection, email: &OutboxEmail) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO email_outbox (id, to_email, subject, html_body, template, status, created_at, sent_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(email.id.to_string())
        .bind(&email.to_email)
        .bind(&email.subject)
        .bind(&email.html_body)
        .bind(&email.template)
        .bind(email.status.as_str())
        .bind(format_timestamp(email.created_at))
        .bind(email.sent_at.map(format_timestamp))
        .execute(conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to enqueue email: {e}")))?;
        Ok(())
    }

    /// Get an outbox entry
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get(&self, email_id: Uuid) -> AppResult<Option<OutboxEmail>> {
        let row = sqlx::query(&format!("SELECT {OUTBOX_COLUMNS} FROM email_outbox WHERE id = $1"))
            .bind(email_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get email: {e}")))?;

        row.map(|r| row_to_email(&r)).transpose()
    }

    /// Outbox entries, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list(
        &self,
        status: Option<EmailStatus>,
        params: PageParams,
    ) -> AppResult<(Vec<OutboxEmail>, u64)> {
        let mut count_query =
            QueryBuilder::<Sqlite>::new("SELECT COUNT(*) AS count FROM email_outbox WHERE 1 = 1");
        if let Some(status) = status {
            count_query.push(" AND status = ").push_bind(status.as_str());
        }
        let total: i64 = count_query
            .build()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count emails: {e}")))?
            .get("count");

        let mut query =
            QueryBuilder::<Sqlite>::new(format!("SELECT {OUTBOX_COLUMNS} FROM email_outbox WHERE 1 = 1"));
        if let Some(status) = status {
            query.push(" AND status = ").push_bind(status.as_str());
        }
        query
            .push(" ORDER BY created_at DESC, id ASC LIMIT ")
            .push_bind(params.limit())
            .push(" OFFSET ")
            .push_bind(params.offset());

        let rows = query
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list emails: {e}")))?;

        let emails = rows.iter().map(row_to_email).collect::<AppResult<Vec<_>>>()?;
        Ok((emails, count_to_u64(total)))
    }

    /// Oldest queued emails
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_queued(&self, limit: i64) -> AppResult<Vec<OutboxEmail>> {
        let rows = sqlx::query(&format!(
            "SELECT {OUTBOX_COLUMNS} FROM email_outbox WHERE status = 'queued' ORDER BY created_at ASC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list queued emails: {e}")))?;

        rows.iter().map(row_to_email).collect()
    }

    /// Record a successful delivery
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn mark_sent(&self, email_id: Uuid, sent_at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query("UPDATE email_outbox SET status = 'sent', sent_at = $1, last_error = NULL WHERE id = $2")
            .bind(format_timestamp(sent_at))
            .bind(email_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to mark email sent: {e}")))?;
        Ok(())
    }

    /// Record a failed delivery
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn mark_failed(&self, email_id: Uuid, error: &str) -> AppResult<()> {
        sqlx::query("UPDATE email_outbox SET status = 'failed', last_error = $1 WHERE id = $2")
            .bind(error)
            .bind(email_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to mark email failed: {e}")))?;
        Ok(())
    }
}

fn row_to_notification(row: &SqliteRow) -> AppResult<Notification> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");
    let created_at: String = row.get("created_at");

    Ok(Notification {
        id: parse_uuid(&id)?,
        user_id: parse_uuid(&user_id)?,
        kind: row.get("kind"),
        title: row.get("title"),
        message: row.get("message"),
        link: row.get("link"),
        is_read: row.get("is_read"),
        created_at: parse_timestamp(&created_at)?,
    })
}

fn row_to_email(row: &SqliteRow) -> AppResult<OutboxEmail> {
    let id: String = row.get("id");
    let status: String = row.get("status");
    let created_at: String = row.get("created_at");
    let sent_at: Option<String> = row.get("sent_at");

    Ok(OutboxEmail {
        id: parse_uuid(&id)?,
        to_email: row.get("to_email"),
        subject: row.get("subject"),
        html_body: row.get("html_body"),
        template: row.get("template"),
        status: EmailStatus::from_str(&status)?,
        created_at: parse_timestamp(&created_at)?,
        sent_at: sent_at.as_deref().map(parse_timestamp).transpose()?,
    })
}
