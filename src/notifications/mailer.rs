// ABOUTME: Pluggable email delivery behind the Mailer trait
// ABOUTME: The shipped LoggingMailer records each message in the logs instead of sending it
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

use async_trait::async_trait;
use tracing::info;

use crate::errors::AppResult;
use crate::models::OutboxEmail;

/// Delivers rendered outbox emails
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Mailer name for logs
    fn name(&self) -> &'static str;

    /// Deliver one email
    ///
    /// # Errors
    ///
    /// Returns an external-service error when delivery fails
    async fn send(&self, email: &OutboxEmail) -> AppResult<()>;
}

/// Mailer that logs messages rather than delivering them
#[derive(Debug, Clone)]
pub struct LoggingMailer {
    from_address: String,
}

impl LoggingMailer {
    /// Create a logging mailer sending "from" the given address
    #[must_use]
    pub const fn new(from_address: String) -> Self {
        Self { from_address }
    }
}

#[async_trait]
impl Mailer for LoggingMailer {
    fn name(&self) -> &'static str {
        "logging"
    }

    async fn send(&self, email: &OutboxEmail) -> AppResult<()> {
        info!(
            email.id = %email.id,
            email.from = %self.from_address,
            email.to = %email.to_email,
            email.subject = %email.subject,
            email.template = %email.template,
            email.bytes = email.html_body.len(),
            "Email delivered to log"
        );
        Ok(())
    }
}
