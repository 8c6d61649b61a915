// ABOUTME: Customer review storage, one review per customer per business
// ABOUTME: Exposes transaction-scoped helpers so the business ranking is updated atomically
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

use sqlx::{sqlite::SqliteRow, QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};
use uuid::Uuid;

use super::{count_to_u64, format_timestamp, is_unique_violation, parse_timestamp, parse_uuid};
use crate::errors::{AppError, AppResult};
use crate::models::Review;
use crate::pagination::PageParams;

const REVIEW_COLUMNS: &str = "id, business_id, user_id, rating, comment, owner_reply, created_at";

/// Admin list filter
#[derive(Debug, Clone, Default)]
pub struct ReviewFilter {
    /// Only reviews of this business
    pub business_id: Option<Uuid>,
    /// Only this star rating
    pub rating: Option<u8>,
}

/// Review manager
pub struct ReviewManager {
    pool: SqlitePool,
}

impl ReviewManager {
    /// Create a new manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a review inside a transaction
    ///
    /// # Errors
    ///
    /// Returns 409 if the customer already reviewed the business
    pub async fn create_in(conn: &mut SqliteConnection, review: &Review) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO reviews (id, business_id, user_id, rating, comment, owner_reply, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(review.id.to_string())
        .bind(review.business_id.to_string())
        .bind(review.user_id.to_string())
        .bind(i64::from(review.rating))
        .bind(&review.comment)
        .bind(&review.owner_reply)
        .bind(format_timestamp(review.created_at))
        .execute(conn)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::already_exists("You have already reviewed this business")
            } else {
                AppError::database(format!("Failed to create review: {e}"))
            }
        })?;
        Ok(())
    }

    /// Delete a review inside a transaction, returning it if it existed
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn delete_in(conn: &mut SqliteConnection, review_id: Uuid) -> AppResult<Option<Review>> {
        let row = sqlx::query(&format!(
            "DELETE FROM reviews WHERE id = $1 RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(review_id.to_string())
        .fetch_optional(conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to delete review: {e}")))?;

        row.map(|r| row_to_review(&r)).transpose()
    }

    /// All ratings of a business, read inside a transaction
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn ratings_in(conn: &mut SqliteConnection, business_id: Uuid) -> AppResult<Vec<u8>> {
        let rows = sqlx::query("SELECT rating FROM reviews WHERE business_id = $1")
            .bind(business_id.to_string())
            .fetch_all(conn)
            .await
            .map_err(|e| AppError::database(format!("Failed to load ratings: {e}")))?;

        Ok(rows
            .iter()
            .map(|row| u8::try_from(row.get::<i64, _>("rating")).unwrap_or(0))
            .collect())
    }

    /// Get a review by id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get(&self, review_id: Uuid) -> AppResult<Option<Review>> {
        let row = sqlx::query(&format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = $1"))
            .bind(review_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get review: {e}")))?;

        row.map(|r| row_to_review(&r)).transpose()
    }

    /// Reviews matching a filter, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list(&self, filter: &ReviewFilter, params: PageParams) -> AppResult<(Vec<Review>, u64)> {
        let mut count_query =
            QueryBuilder::<Sqlite>::new("SELECT COUNT(*) AS count FROM reviews WHERE 1 = 1");
        push_filter(&mut count_query, filter);
        let total: i64 = count_query
            .build()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count reviews: {e}")))?
            .get("count");

        let mut query =
            QueryBuilder::<Sqlite>::new(format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE 1 = 1"));
        push_filter(&mut query, filter);
        query
            .push(" ORDER BY created_at DESC, id ASC LIMIT ")
            .push_bind(params.limit())
            .push(" OFFSET ")
            .push_bind(params.offset());

        let rows = query
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list reviews: {e}")))?;

        let reviews = rows.iter().map(row_to_review).collect::<AppResult<Vec<_>>>()?;
        Ok((reviews, count_to_u64(total)))
    }

    /// Set or replace the business owner's reply
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn set_reply(&self, review_id: Uuid, reply: &str) -> AppResult<Option<Review>> {
        let result = sqlx::query("UPDATE reviews SET owner_reply = $1 WHERE id = $2")
            .bind(reply)
            .bind(review_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to save review reply: {e}")))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(review_id).await
    }
}

fn push_filter(query: &mut QueryBuilder<'_, Sqlite>, filter: &ReviewFilter) {
    if let Some(business_id) = filter.business_id {
        query.push(" AND business_id = ").push_bind(business_id.to_string());
    }
    if let Some(rating) = filter.rating {
        query.push(" AND rating = ").push_bind(i64::from(rating));
    }
}

fn row_to_review(row: &SqliteRow) -> AppResult<Review> {
    let id: String = row.get("id");
    let business_id: String = row.get("business_id");
    let user_id: String = row.get("user_id");
    let rating: i64 = row.get("rating");
    let created_at: String = row.get("created_at");

    Ok(Review {
        id: parse_uuid(&id)?,
        business_id: parse_uuid(&business_id)?,
        user_id: parse_uuid(&user_id)?,
        rating: u8::try_from(rating)
            .map_err(|e| AppError::internal(format!("Invalid stored rating {rating}: {e}")))?,
        comment: row.get("comment"),
        owner_reply: row.get("owner_reply"),
        created_at: parse_timestamp(&created_at)?,
    })
}
