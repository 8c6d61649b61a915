// ABOUTME: SQLite persistence layer with inline schema migrations
// ABOUTME: Owns the connection pool and hands out per-entity managers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

//! # Database Management
//!
//! One `*Manager` per entity, each a thin wrapper over a cloned `SqlitePool`.
//! Writes that must land together (a status change and its notifications, a
//! review and the re-ranked business) run through [`transactions::TransactionGuard`]
//! and the `*_in` associated functions that take a `&mut SqliteConnection`.
//!
//! Ids are UUID v4 strings and timestamps are RFC 3339 UTC strings with
//! millisecond precision, so string order equals time order.

/// Appointment storage
pub mod appointments;
/// Business listing storage
pub mod businesses;
/// CMS pages and categories
pub mod content;
/// City, district and neighborhood storage
pub mod locations;
/// In-app notifications and the email outbox
pub mod notifications;
/// Pet profiles
pub mod pets;
/// Customer reviews
pub mod reviews;
/// Grooming services offered by a business
pub mod services;
/// RAII transaction guard
pub mod transactions;
/// User accounts
pub mod users;

pub use appointments::{AppointmentFilter, AppointmentManager};
pub use businesses::{
    AdminBusinessFilter, BusinessManager, BusinessSearch, BusinessSort, BusinessUpdate,
};
pub use content::{CategoryUpdate, ContentManager, PageUpdate};
pub use locations::{LocationInput, LocationLevel, LocationManager, LocationNode, LocationPatch};
pub use notifications::{NotificationManager, OutboxManager};
pub use pets::{PetManager, PetUpdate};
pub use reviews::{ReviewFilter, ReviewManager};
pub use services::{ServiceManager, ServiceUpdate};
pub use transactions::TransactionGuard;
pub use users::{UserFilter, UserManager, UserUpdate};

use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::{DatabaseConfig, DatabaseUrl};
use crate::errors::{AppError, AppResult};

/// Seconds to wait for a pooled connection
const ACQUIRE_TIMEOUT_SECS: u64 = 10;

/// Database handle shared by all request handlers
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the database and run migrations
    ///
    /// In-memory databases are pinned to a single connection that never
    /// expires; every new connection to `:memory:` would see an empty schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or a migration fails
    pub async fn new(config: &DatabaseConfig) -> AppResult<Self> {
        if let DatabaseUrl::SQLite { path } = &config.url {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    AppError::config(format!(
                        "Cannot create database directory {}: {e}",
                        parent.display()
                    ))
                })?;
            }
        }

        let options = SqliteConnectOptions::from_str(&config.url.to_connection_string())
            .map_err(|e| AppError::config(format!("Invalid database URL: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool_options = if config.url.is_memory() {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(config.max_connections.max(1))
        };

        let pool = pool_options
            .acquire_timeout(Duration::from_secs(ACQUIRE_TIMEOUT_SECS))
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to connect to database: {e}")))?;

        let db = Self { pool };
        db.migrate().await?;
        info!(database = %config.url, "Database ready");
        Ok(db)
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Cheap reachability probe for `/health`
    ///
    /// # Errors
    ///
    /// Returns an error if the database does not answer
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Database ping failed: {e}")))?;
        Ok(())
    }

    /// Users manager
    #[must_use]
    pub fn users(&self) -> UserManager {
        UserManager::new(self.pool.clone())
    }

    /// Business manager
    #[must_use]
    pub fn businesses(&self) -> BusinessManager {
        BusinessManager::new(self.pool.clone())
    }

    /// Service catalog manager
    #[must_use]
    pub fn services(&self) -> ServiceManager {
        ServiceManager::new(self.pool.clone())
    }

    /// Pet manager
    #[must_use]
    pub fn pets(&self) -> PetManager {
        PetManager::new(self.pool.clone())
    }

    /// Appointment manager
    #[must_use]
    pub fn appointments(&self) -> AppointmentManager {
        AppointmentManager::new(self.pool.clone())
    }

    /// Review manager
    #[must_use]
    pub fn reviews(&self) -> ReviewManager {
        ReviewManager::new(self.pool.clone())
    }

    /// Notification manager
    #[must_use]
    pub fn notifications(&self) -> NotificationManager {
        NotificationManager::new(self.pool.clone())
    }

    /// Email outbox manager
    #[must_use]
    pub fn outbox(&self) -> OutboxManager {
        OutboxManager::new(self.pool.clone())
    }

    /// Location hierarchy manager
    #[must_use]
    pub fn locations(&self) -> LocationManager {
        LocationManager::new(self.pool.clone())
    }

    /// Pages and categories manager
    #[must_use]
    pub fn content(&self) -> ContentManager {
        ContentManager::new(self.pool.clone())
    }

    /// Begin a guarded transaction
    ///
    /// # Errors
    ///
    /// Returns an error if no connection can be acquired
    pub async fn begin(&self) -> AppResult<TransactionGuard<'static>> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;
        Ok(TransactionGuard::new(tx))
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if any DDL statement fails
    pub async fn migrate(&self) -> AppResult<()> {
        self.migrate_users().await?;
        self.migrate_catalog().await?;
        self.migrate_locations().await?;
        self.migrate_bookings().await?;
        self.migrate_reviews().await?;
        self.migrate_notifications().await?;
        self.migrate_content().await?;
        debug!("Database migrations complete");
        Ok(())
    }

    async fn execute_ddl(&self, statements: &[&str]) -> AppResult<()> {
        for statement in statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Migration failed: {e}")))?;
        }
        Ok(())
    }

    async fn migrate_users(&self) -> AppResult<()> {
        self.execute_ddl(&[
            r"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE COLLATE NOCASE,
                display_name TEXT,
                phone TEXT,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL DEFAULT 'pet_owner'
                    CHECK (role IN ('pet_owner', 'business_owner', 'admin')),
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                last_active TEXT NOT NULL,
                session_version INTEGER NOT NULL DEFAULT 0
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_users_role ON users(role)",
        ])
        .await
    }

    async fn migrate_catalog(&self) -> AppResult<()> {
        self.execute_ddl(&[
            r"
            CREATE TABLE IF NOT EXISTS categories (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                slug TEXT NOT NULL UNIQUE,
                description TEXT,
                sort_order INTEGER NOT NULL DEFAULT 0,
                is_active INTEGER NOT NULL DEFAULT 1
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS businesses (
                id TEXT PRIMARY KEY,
                owner_id TEXT NOT NULL REFERENCES users(id),
                name TEXT NOT NULL,
                slug TEXT NOT NULL UNIQUE,
                description TEXT,
                phone TEXT,
                email TEXT,
                address TEXT,
                category_id TEXT REFERENCES categories(id),
                city_id TEXT,
                district_id TEXT,
                neighborhood_id TEXT,
                plan TEXT NOT NULL DEFAULT 'free'
                    CHECK (plan IN ('free', 'basic', 'premium', 'enterprise')),
                is_verified INTEGER NOT NULL DEFAULT 0,
                is_active INTEGER NOT NULL DEFAULT 1,
                avg_rating REAL NOT NULL DEFAULT 0,
                review_count INTEGER NOT NULL DEFAULT 0,
                featured_score REAL NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_businesses_owner ON businesses(owner_id)",
            "CREATE INDEX IF NOT EXISTS idx_businesses_featured ON businesses(is_active, featured_score DESC)",
            "CREATE INDEX IF NOT EXISTS idx_businesses_city ON businesses(city_id)",
            "CREATE INDEX IF NOT EXISTS idx_businesses_category ON businesses(category_id)",
            r"
            CREATE TABLE IF NOT EXISTS services (
                id TEXT PRIMARY KEY,
                business_id TEXT NOT NULL REFERENCES businesses(id),
                name TEXT NOT NULL,
                description TEXT,
                duration_minutes INTEGER NOT NULL,
                price_cents INTEGER NOT NULL CHECK (price_cents >= 0),
                is_active INTEGER NOT NULL DEFAULT 1
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_services_business ON services(business_id)",
            r"
            CREATE TABLE IF NOT EXISTS pets (
                id TEXT PRIMARY KEY,
                owner_id TEXT NOT NULL REFERENCES users(id),
                name TEXT NOT NULL,
                species TEXT NOT NULL,
                breed TEXT,
                size TEXT NOT NULL DEFAULT 'medium'
                    CHECK (size IN ('small', 'medium', 'large', 'giant')),
                birth_date TEXT,
                notes TEXT,
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_pets_owner ON pets(owner_id)",
        ])
        .await
    }

    async fn migrate_locations(&self) -> AppResult<()> {
        self.execute_ddl(&[
            r"
            CREATE TABLE IF NOT EXISTS cities (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                slug TEXT NOT NULL UNIQUE,
                seo_title TEXT,
                seo_description TEXT,
                content TEXT,
                is_active INTEGER NOT NULL DEFAULT 1,
                sort_order INTEGER NOT NULL DEFAULT 0
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS districts (
                id TEXT PRIMARY KEY,
                city_id TEXT NOT NULL REFERENCES cities(id),
                name TEXT NOT NULL,
                slug TEXT NOT NULL,
                seo_title TEXT,
                seo_description TEXT,
                content TEXT,
                is_active INTEGER NOT NULL DEFAULT 1,
                sort_order INTEGER NOT NULL DEFAULT 0,
                UNIQUE(city_id, slug)
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS neighborhoods (
                id TEXT PRIMARY KEY,
                district_id TEXT NOT NULL REFERENCES districts(id),
                name TEXT NOT NULL,
                slug TEXT NOT NULL,
                seo_title TEXT,
                seo_description TEXT,
                content TEXT,
                is_active INTEGER NOT NULL DEFAULT 1,
                sort_order INTEGER NOT NULL DEFAULT 0,
                UNIQUE(district_id, slug)
            )
            ",
        ])
        .await
    }

    async fn migrate_bookings(&self) -> AppResult<()> {
        self.execute_ddl(&[
            r"
            CREATE TABLE IF NOT EXISTS appointments (
                id TEXT PRIMARY KEY,
                business_id TEXT NOT NULL REFERENCES businesses(id),
                pet_id TEXT NOT NULL REFERENCES pets(id),
                user_id TEXT NOT NULL REFERENCES users(id),
                service_id TEXT REFERENCES services(id),
                scheduled_at TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending'
                    CHECK (status IN ('pending', 'confirmed', 'in_progress', 'completed', 'cancelled', 'no_show')),
                notes TEXT,
                cancellation_reason TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_appointments_user ON appointments(user_id, scheduled_at)",
            "CREATE INDEX IF NOT EXISTS idx_appointments_business ON appointments(business_id, scheduled_at)",
            // One live appointment per business and start time
            r"
            CREATE UNIQUE INDEX IF NOT EXISTS idx_appointments_live_slot
                ON appointments(business_id, scheduled_at)
                WHERE status IN ('pending', 'confirmed', 'in_progress')
            ",
        ])
        .await
    }

    async fn migrate_reviews(&self) -> AppResult<()> {
        self.execute_ddl(&[
            r"
            CREATE TABLE IF NOT EXISTS reviews (
                id TEXT PRIMARY KEY,
                business_id TEXT NOT NULL REFERENCES businesses(id),
                user_id TEXT NOT NULL REFERENCES users(id),
                rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
                comment TEXT,
                owner_reply TEXT,
                created_at TEXT NOT NULL,
                UNIQUE(business_id, user_id)
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_reviews_business ON reviews(business_id, created_at DESC)",
        ])
        .await
    }

    async fn migrate_notifications(&self) -> AppResult<()> {
        self.execute_ddl(&[
            r"
            CREATE TABLE IF NOT EXISTS notifications (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id),
                kind TEXT NOT NULL,
                title TEXT NOT NULL,
                message TEXT NOT NULL,
                link TEXT,
                is_read INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_notifications_user ON notifications(user_id, is_read, created_at DESC)",
            r"
            CREATE TABLE IF NOT EXISTS email_outbox (
                id TEXT PRIMARY KEY,
                to_email TEXT NOT NULL,
                subject TEXT NOT NULL,
                html_body TEXT NOT NULL,
                template TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'queued'
                    CHECK (status IN ('queued', 'sent', 'failed')),
                last_error TEXT,
                created_at TEXT NOT NULL,
                sent_at TEXT
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_email_outbox_status ON email_outbox(status, created_at)",
        ])
        .await
    }

    async fn migrate_content(&self) -> AppResult<()> {
        self.execute_ddl(&[r"
            CREATE TABLE IF NOT EXISTS pages (
                id TEXT PRIMARY KEY,
                slug TEXT NOT NULL UNIQUE,
                title TEXT NOT NULL,
                content TEXT NOT NULL DEFAULT '',
                seo_title TEXT,
                seo_description TEXT,
                is_published INTEGER NOT NULL DEFAULT 0,
                updated_at TEXT NOT NULL
            )
            "])
        .await
    }
}

/// Render a timestamp the way every table stores it
#[must_use]
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a stored timestamp
pub(crate) fn parse_timestamp(value: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::internal(format!("Invalid datetime '{value}': {e}")))
}

/// Parse a stored id
pub(crate) fn parse_uuid(value: &str) -> AppResult<Uuid> {
    Uuid::parse_str(value).map_err(|e| AppError::internal(format!("Invalid UUID '{value}': {e}")))
}

/// Parse a nullable stored id
pub(crate) fn parse_optional_uuid(value: Option<String>) -> AppResult<Option<Uuid>> {
    value.as_deref().map(parse_uuid).transpose()
}

/// Convert a non-negative SQL count
pub(crate) fn count_to_u64(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}

/// Escape `%`, `_` and `\` for a `LIKE ... ESCAPE '\'` pattern
pub(crate) fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.trim().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

/// Whether a sqlx error is a UNIQUE constraint violation
pub(crate) fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db) if db.is_unique_violation())
}
