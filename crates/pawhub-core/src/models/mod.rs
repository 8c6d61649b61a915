// ABOUTME: Core data models for the grooming marketplace
// ABOUTME: Re-exports users, businesses, bookings, reviews, notifications and SEO content types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

//! # Data Models
//!
//! Plain data structures shared by the persistence layer, the services and
//! the HTTP view models. Enums stored in the database expose `as_str()` and
//! `FromStr` so the string form lives in exactly one place.

mod appointment;
mod business;
mod content;
mod location;
mod notification;
mod pet;
mod review;
mod user;

pub use appointment::{Appointment, AppointmentStatus};
pub use business::{Business, PlanTier, Service};
pub use content::{Category, Page};
pub use location::{City, District, Neighborhood};
pub use notification::{EmailStatus, Notification, OutboxEmail};
pub use pet::{Pet, PetSize};
pub use review::{Review, ReviewStats};
pub use user::User;
