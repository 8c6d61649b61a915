// ABOUTME: Main library entry point for the PawHub grooming marketplace API
// ABOUTME: Wires storage, booking services, notifications and HTTP routes into one server
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

#![recursion_limit = "256"]
#![deny(unsafe_code)]

//! # PawHub Server
//!
//! A marketplace where pet owners find grooming businesses, book services
//! for their pets and review the visit afterwards.
//!
//! ## Features
//!
//! - **Booking lifecycle**: appointments move through a guarded state machine
//!   with a cancellation window and a per-business no-show block
//! - **Featured ranking**: plan, rating and review volume combine into the
//!   default sort order, recomputed whenever its inputs change
//! - **Notifications**: in-app notifications plus an email outbox written in
//!   the same transaction as the change that caused them
//! - **Admin CMS**: users, businesses, categories, the SEO location tree and
//!   static pages
//!
//! ## Architecture
//!
//! - **pawhub-core**: errors, models, lifecycle rules, ranking, pagination
//! - **database**: `SQLite` storage through per-entity managers
//! - **services**: multi-step operations that span managers and transactions
//! - **routes**: thin axum handlers over services and managers
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use pawhub_server::config::ServerConfig;
//! use pawhub_server::database::Database;
//! use pawhub_server::errors::AppResult;
//! use pawhub_server::resources::ServerResources;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = Arc::new(ServerConfig::from_env()?);
//!     let database = Database::new(&config.database).await?;
//!     database.migrate().await?;
//!
//!     let resources = Arc::new(ServerResources::new(database, config));
//!     pawhub_server::server::run(resources).await
//! }
//! ```

/// Session tokens and password hashing
pub mod auth;

/// Configuration loaded from the environment
pub mod config;

/// `SQLite` storage with per-entity managers
pub mod database;

/// Structured logging setup and domain event logging
pub mod logging;

/// HTTP middleware for tracing, authentication, CORS and role guards
pub mod middleware;

/// In-app notifications, email templates and the outbox dispatcher
pub mod notifications;

/// Shared resources handed to every handler
pub mod resources;

/// HTTP route handlers
pub mod routes;

/// Security headers and session cookies
pub mod security;

/// Router assembly and the serve loop
pub mod server;

/// Booking, review and listing operations spanning several managers
pub mod services;

pub use pawhub_core::{constants, errors, lifecycle, models, pagination, permissions, ranking};
