// ABOUTME: Core types and rules for the PawHub grooming marketplace
// ABOUTME: Foundation crate with errors, models, booking lifecycle, ranking and pagination
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

#![deny(unsafe_code)]

//! # PawHub Core
//!
//! Foundation crate shared by the server and its tools. Nothing here touches
//! the network or the database, so the booking rules and the ranking formula
//! can be tested in isolation.
//!
//! ## Modules
//!
//! - **errors**: Unified `AppError` / `ErrorCode` with HTTP mapping
//! - **constants**: Booking rules, ranking weights and limits
//! - **models**: Users, businesses, bookings, reviews, notifications, SEO content
//! - **lifecycle**: Appointment state machine and booking guards
//! - **ranking**: Featured-score formula
//! - **pagination**: Offset pagination helpers
//! - **permissions**: User roles

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Core data models
pub mod models;

/// Appointment lifecycle state machine and booking guards
pub mod lifecycle;

/// Featured-score ranking formula
pub mod ranking;

/// Offset pagination
pub mod pagination;

/// Role-based permissions
pub mod permissions;
