// ABOUTME: Notification system for in-app messages and the email outbox
// ABOUTME: Templates render content, the dispatcher stages rows, mailers deliver email
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

/// Event fan-out into notifications and the outbox
pub mod dispatcher;

/// Email delivery trait and the logging implementation
pub mod mailer;

/// Message and email templates
pub mod templates;

pub use dispatcher::{FlushSummary, NotificationDispatcher, StagedEmails};
pub use mailer::{LoggingMailer, Mailer};
