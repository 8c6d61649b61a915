// ABOUTME: User account storage: registration, lookup, role and activation changes
// ABOUTME: Emails are unique case-insensitively; users are deactivated, never deleted
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

use std::str::FromStr;

use chrono::Utc;
use sqlx::{sqlite::SqliteRow, QueryBuilder, Row, Sqlite, SqlitePool};
use uuid::Uuid;

use super::{count_to_u64, format_timestamp, is_unique_violation, like_pattern, parse_timestamp, parse_uuid};
use crate::errors::{AppError, AppResult};
use crate::models::User;
use crate::pagination::PageParams;
use crate::permissions::UserRole;

const USER_COLUMNS: &str =
    "id, email, display_name, phone, password_hash, role, is_active, created_at, last_active, session_version";

/// Admin list filter
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    /// Only this role
    pub role: Option<UserRole>,
    /// Only active or only inactive users
    pub is_active: Option<bool>,
    /// Substring of email or display name
    pub q: Option<String>,
}

/// Fields a user or admin may change
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    /// New display name
    pub display_name: Option<String>,
    /// New phone number
    pub phone: Option<String>,
    /// New role (admin only)
    pub role: Option<UserRole>,
}

/// User account manager
pub struct UserManager {
    pool: SqlitePool,
}

impl UserManager {
    /// Create a new manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new user
    ///
    /// # Errors
    ///
    /// Returns 409 if the email is taken, or a database error
    pub async fn create(&self, user: &User) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO users (id, email, display_name, phone, password_hash, role, is_active, created_at, last_active, session_version)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ",
        )
        .bind(user.id.to_string())
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(&user.phone)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.is_active)
        .bind(format_timestamp(user.created_at))
        .bind(format_timestamp(user.last_active))
        .bind(user.session_version)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::already_exists("An account with this email already exists")
            } else {
                AppError::database(format!("Failed to create user: {e}"))
            }
        })?;
        Ok(())
    }

    /// Get a user by id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get(&self, user_id: Uuid) -> AppResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get user: {e}")))?;

        row.map(|r| row_to_user(&r)).transpose()
    }

    /// Get a user by email, case-insensitively
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email.trim())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get user by email: {e}")))?;

        row.map(|r| row_to_user(&r)).transpose()
    }

    /// Record activity
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn touch_last_active(&self, user_id: Uuid) -> AppResult<()> {
        sqlx::query("UPDATE users SET last_active = $1 WHERE id = $2")
            .bind(format_timestamp(Utc::now()))
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to update last active: {e}")))?;
        Ok(())
    }

    /// Void every session token issued to the user so far
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn revoke_sessions(&self, user_id: Uuid) -> AppResult<()> {
        sqlx::query("UPDATE users SET session_version = session_version + 1 WHERE id = $1")
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to revoke sessions: {e}")))?;
        Ok(())
    }

    /// List users for the admin table, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list(&self, filter: &UserFilter, params: PageParams) -> AppResult<(Vec<User>, u64)> {
        let mut count_query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) AS count FROM users WHERE 1 = 1");
        push_user_filter(&mut count_query, filter);
        let total: i64 = count_query
            .build()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count users: {e}")))?
            .get("count");

        let mut query = QueryBuilder::<Sqlite>::new(format!("SELECT {USER_COLUMNS} FROM users WHERE 1 = 1"));
        push_user_filter(&mut query, filter);
        query
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(params.limit())
            .push(" OFFSET ")
            .push_bind(params.offset());

        let rows = query
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list users: {e}")))?;

        let users = rows.iter().map(row_to_user).collect::<AppResult<Vec<_>>>()?;
        Ok((users, count_to_u64(total)))
    }

    /// Apply a partial update; `None` fields are left unchanged
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn update(&self, user_id: Uuid, update: &UserUpdate) -> AppResult<Option<User>> {
        let result = sqlx::query(
            r"
            UPDATE users SET
                display_name = COALESCE($1, display_name),
                phone = COALESCE($2, phone),
                role = COALESCE($3, role)
            WHERE id = $4
            ",
        )
        .bind(&update.display_name)
        .bind(&update.phone)
        .bind(update.role.map(|r| r.as_str()))
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update user: {e}")))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(user_id).await
    }

    /// Activate or deactivate an account
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn set_active(&self, user_id: Uuid, is_active: bool) -> AppResult<bool> {
        let result = sqlx::query("UPDATE users SET is_active = $1 WHERE id = $2")
            .bind(is_active)
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to set user active: {e}")))?;
        Ok(result.rows_affected() > 0)
    }

    /// Number of admin accounts; used by the seed tool
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn count_admins(&self) -> AppResult<u64> {
        let count: i64 = sqlx::query("SELECT COUNT(*) AS count FROM users WHERE role = 'admin'")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count admins: {e}")))?
            .get("count");
        Ok(count_to_u64(count))
    }
}

fn push_user_filter(query: &mut QueryBuilder<'_, Sqlite>, filter: &UserFilter) {
    if let Some(role) = filter.role {
        query.push(" AND role = ").push_bind(role.as_str());
    }
    if let Some(is_active) = filter.is_active {
        query.push(" AND is_active = ").push_bind(is_active);
    }
    if let Some(q) = filter.q.as_deref().filter(|q| !q.trim().is_empty()) {
        let pattern = like_pattern(q);
        query
            .push(" AND (email LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR display_name LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }
}

fn row_to_user(row: &SqliteRow) -> AppResult<User> {
    let id: String = row.get("id");
    let role: String = row.get("role");
    let created_at: String = row.get("created_at");
    let last_active: String = row.get("last_active");

    Ok(User {
        id: parse_uuid(&id)?,
        email: row.get("email"),
        display_name: row.get("display_name"),
        phone: row.get("phone"),
        password_hash: row.get("password_hash"),
        role: UserRole::from_str(&role)?,
        is_active: row.get("is_active"),
        created_at: parse_timestamp(&created_at)?,
        last_active: parse_timestamp(&last_active)?,
        session_version: row.get("session_version"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use crate::database::Database;

    async fn manager() -> UserManager {
        Database::new(&DatabaseConfig::in_memory()).await.unwrap().users()
    }

    fn user(email: &str, role: UserRole) -> User {
        User::new(email.to_owned(), "hash".to_owned(), None, role)
    }

    #[tokio::test]
    async fn test_email_is_unique_case_insensitively() {
        let users = manager().await;
        users.create(&user("Ana@Example.com", UserRole::PetOwner)).await.unwrap();

        let err = users
            .create(&user("ana@example.com", UserRole::PetOwner))
            .await
            .unwrap_err();
        assert_eq!(err.http_status(), 409);

        let found = users.get_by_email("ANA@example.com").await.unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn test_list_filters_by_role_and_query() {
        let users = manager().await;
        users.create(&user("owner@shop.test", UserRole::BusinessOwner)).await.unwrap();
        users.create(&user("pet@home.test", UserRole::PetOwner)).await.unwrap();
        users.create(&user("other@shop.test", UserRole::PetOwner)).await.unwrap();

        let filter = UserFilter {
            role: Some(UserRole::PetOwner),
            q: Some("shop".into()),
            ..UserFilter::default()
        };
        let (found, total) = users.list(&filter, PageParams::default()).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(found[0].email, "other@shop.test");
    }

    #[tokio::test]
    async fn test_update_and_deactivate() {
        let users = manager().await;
        let account = user("role@change.test", UserRole::PetOwner);
        users.create(&account).await.unwrap();

        let updated = users
            .update(
                account.id,
                &UserUpdate {
                    role: Some(UserRole::BusinessOwner),
                    ..UserUpdate::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.role, UserRole::BusinessOwner);

        assert!(users.set_active(account.id, false).await.unwrap());
        assert!(!users.get(account.id).await.unwrap().unwrap().is_active);
        assert!(!users.set_active(Uuid::new_v4(), false).await.unwrap());
    }
}
