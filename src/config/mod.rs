// ABOUTME: Configuration management module for centralized server settings
// ABOUTME: Environment-only configuration for server, database, auth and mail
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

//! Configuration module
//!
//! All settings come from environment variables; there is no config file.
//!
//! - **environment**: `ServerConfig` and its sections
//! - **database**: `DatabaseUrl` parsing and pool sizing

/// Database configuration
pub mod database;
/// Environment and server configuration
pub mod environment;

pub use database::{DatabaseConfig, DatabaseUrl};
pub use environment::{AuthConfig, Environment, MailConfig, ServerConfig};
