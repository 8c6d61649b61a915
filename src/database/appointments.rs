// ABOUTME: Appointment storage with slot-conflict detection and compare-and-set status updates
// ABOUTME: A partial unique index allows one live appointment per business and start time
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};
use uuid::Uuid;

use super::{
    count_to_u64, format_timestamp, is_unique_violation, parse_optional_uuid, parse_timestamp,
    parse_uuid,
};
use crate::errors::{AppError, AppResult};
use crate::models::{Appointment, AppointmentStatus};
use crate::pagination::PageParams;

const APPOINTMENT_COLUMNS: &str = r"
    id, business_id, pet_id, user_id, service_id, scheduled_at, status, notes,
    cancellation_reason, created_at, updated_at
";

/// List filter; at least one scope is normally set by the caller
#[derive(Debug, Clone, Default)]
pub struct AppointmentFilter {
    /// Customer scope
    pub user_id: Option<Uuid>,
    /// Business scope
    pub business_id: Option<Uuid>,
    /// Only this status
    pub status: Option<AppointmentStatus>,
}

/// Appointment manager
pub struct AppointmentManager {
    pool: SqlitePool,
}

impl AppointmentManager {
    /// Create a new manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new appointment inside a transaction
    ///
    /// # Errors
    ///
    /// Returns 409 `SLOT_UNAVAILABLE` when a live appointment already holds
    /// the business and start time, or a database error
    pub async fn create_in(conn: &mut SqliteConnection, appointment: &Appointment) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO appointments (
                id, business_id, pet_id, user_id, service_id, scheduled_at, status, notes,
                cancellation_reason, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ",
        )
        .bind(appointment.id.to_string())
        .bind(appointment.business_id.to_string())
        .bind(appointment.pet_id.to_string())
        .bind(appointment.user_id.to_string())
        .bind(appointment.service_id.map(|id| id.to_string()))
        .bind(format_timestamp(appointment.scheduled_at))
        .bind(appointment.status.as_str())
        .bind(&appointment.notes)
        .bind(&appointment.cancellation_reason)
        .bind(format_timestamp(appointment.created_at))
        .bind(format_timestamp(appointment.updated_at))
        .execute(conn)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::slot_unavailable("This time slot is already booked")
            } else {
                AppError::database(format!("Failed to create appointment: {e}"))
            }
        })?;
        Ok(())
    }

    /// Get an appointment by id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get(&self, appointment_id: Uuid) -> AppResult<Option<Appointment>> {
        let row = sqlx::query(&format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = $1"))
            .bind(appointment_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get appointment: {e}")))?;

        row.map(|r| row_to_appointment(&r)).transpose()
    }

    /// List appointments, soonest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list(
        &self,
        filter: &AppointmentFilter,
        params: PageParams,
    ) -> AppResult<(Vec<Appointment>, u64)> {
        let mut count_query =
            QueryBuilder::<Sqlite>::new("SELECT COUNT(*) AS count FROM appointments WHERE 1 = 1");
        push_filter(&mut count_query, filter);
        let total: i64 = count_query
            .build()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count appointments: {e}")))?
            .get("count");

        let mut query = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE 1 = 1"
        ));
        push_filter(&mut query, filter);
        query
            .push(" ORDER BY scheduled_at ASC, id ASC LIMIT ")
            .push_bind(params.limit())
            .push(" OFFSET ")
            .push_bind(params.offset());

        let rows = query
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list appointments: {e}")))?;

        let appointments = rows.iter().map(row_to_appointment).collect::<AppResult<Vec<_>>>()?;
        Ok((appointments, count_to_u64(total)))
    }

    /// NO_SHOW records of a customer at one business
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn count_no_shows(&self, user_id: Uuid, business_id: Uuid) -> AppResult<i64> {
        let count: i64 = sqlx::query(
            "SELECT COUNT(*) AS count FROM appointments WHERE user_id = $1 AND business_id = $2 AND status = 'no_show'",
        )
        .bind(user_id.to_string())
        .bind(business_id.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to count no-shows: {e}")))?
        .get("count");
        Ok(count)
    }

    /// Appointment count per status for a business
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn status_counts(&self, business_id: Uuid) -> AppResult<Vec<(AppointmentStatus, u64)>> {
        let rows = sqlx::query(
            "SELECT status, COUNT(*) AS count FROM appointments WHERE business_id = $1 GROUP BY status",
        )
        .bind(business_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to count appointments by status: {e}")))?;

        rows.iter()
            .map(|row| {
                let status: String = row.get("status");
                let count: i64 = row.get("count");
                Ok((AppointmentStatus::from_str(&status)?, count_to_u64(count)))
            })
            .collect()
    }

    /// Move an appointment from `from` to `to` if it is still in `from`
    ///
    /// Returns `false` when another request changed the status first.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn update_status_in(
        conn: &mut SqliteConnection,
        appointment_id: Uuid,
        from: AppointmentStatus,
        to: AppointmentStatus,
        cancellation_reason: Option<&str>,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE appointments
            SET status = $1, cancellation_reason = COALESCE($2, cancellation_reason), updated_at = $3
            WHERE id = $4 AND status = $5
            ",
        )
        .bind(to.as_str())
        .bind(cancellation_reason)
        .bind(format_timestamp(now))
        .bind(appointment_id.to_string())
        .bind(from.as_str())
        .execute(conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to update appointment status: {e}")))?;
        Ok(result.rows_affected() > 0)
    }
}

fn push_filter(query: &mut QueryBuilder<'_, Sqlite>, filter: &AppointmentFilter) {
    if let Some(user_id) = filter.user_id {
        query.push(" AND user_id = ").push_bind(user_id.to_string());
    }
    if let Some(business_id) = filter.business_id {
        query.push(" AND business_id = ").push_bind(business_id.to_string());
    }
    if let Some(status) = filter.status {
        query.push(" AND status = ").push_bind(status.as_str());
    }
}

fn row_to_appointment(row: &SqliteRow) -> AppResult<Appointment> {
    let id: String = row.get("id");
    let business_id: String = row.get("business_id");
    let pet_id: String = row.get("pet_id");
    let user_id: String = row.get("user_id");
    let scheduled_at: String = row.get("scheduled_at");
    let status: String = row.get("status");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(Appointment {
        id: parse_uuid(&id)?,
        business_id: parse_uuid(&business_id)?,
        pet_id: parse_uuid(&pet_id)?,
        user_id: parse_uuid(&user_id)?,
        service_id: parse_optional_uuid(row.get("service_id"))?,
        scheduled_at: parse_timestamp(&scheduled_at)?,
        status: AppointmentStatus::from_str(&status)?,
        notes: row.get("notes"),
        cancellation_reason: row.get("cancellation_reason"),
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}
