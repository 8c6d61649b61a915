// ABOUTME: Domain service layer for business logic extracted from route handlers
// ABOUTME: Booking lifecycle, review ranking, listing management and input validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

//! Domain service layer
//!
//! Route handlers parse and authorize; services hold the rules that combine
//! several managers, transactions and side effects.

/// Appointment creation and status changes
pub mod booking;

/// Business listing creation, edits and ownership
pub mod businesses;

/// Reviews, owner replies, plan changes and featured-score re-ranking
pub mod reviews;

/// Request validation helpers
pub mod validation;
