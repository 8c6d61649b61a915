// ABOUTME: Centralized resource container shared by every route handler
// ABOUTME: Builds the auth manager, auth middleware and notification dispatcher once
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

//! # Server Resources
//!
//! Handlers receive `State<Arc<ServerResources>>`. Every expensive or
//! stateful object is created here once and shared, never rebuilt per request.

use std::sync::Arc;

use crate::auth::AuthManager;
use crate::config::ServerConfig;
use crate::database::Database;
use crate::middleware::AuthMiddleware;
use crate::notifications::{LoggingMailer, Mailer, NotificationDispatcher};

/// Centralized resource container for dependency injection
#[derive(Clone)]
pub struct ServerResources {
    /// Database pool and entity managers
    pub database: Database,
    /// Session token and password handling
    pub auth_manager: Arc<AuthManager>,
    /// Request authentication
    pub auth_middleware: Arc<AuthMiddleware>,
    /// Notification and email fan-out
    pub dispatcher: Arc<NotificationDispatcher>,
    /// Server configuration
    pub config: Arc<ServerConfig>,
}

impl ServerResources {
    /// Create resources with the logging mailer
    #[must_use]
    pub fn new(database: Database, config: Arc<ServerConfig>) -> Self {
        let mailer: Arc<dyn Mailer> = Arc::new(LoggingMailer::new(config.mail.from_address.clone()));
        Self::with_mailer(database, config, mailer)
    }

    /// Create resources with a specific mailer
    #[must_use]
    pub fn with_mailer(database: Database, config: Arc<ServerConfig>, mailer: Arc<dyn Mailer>) -> Self {
        let auth_manager = Arc::new(AuthManager::new(&config.auth));
        let auth_middleware = Arc::new(AuthMiddleware::new(auth_manager.clone(), database.clone()));
        let dispatcher = Arc::new(NotificationDispatcher::new(
            database.clone(),
            mailer,
            config.mail.clone(),
            &config.public_base_url,
        ));

        Self {
            database,
            auth_manager,
            auth_middleware,
            dispatcher,
            config,
        }
    }
}
