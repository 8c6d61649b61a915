// ABOUTME: JSON view models shared by public, owner and admin routes
// ABOUTME: Converts domain models to wire form with string ids and RFC 3339 timestamps
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

use serde::{Deserialize, Serialize};

use crate::database::LocationNode;
use crate::models::{
    Appointment, Business, Category, Notification, OutboxEmail, Page, Pet, Review, Service, User,
};

/// Public view of a user; never carries the password hash
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    /// User id
    pub id: String,
    /// Login email
    pub email: String,
    /// Display name
    pub display_name: Option<String>,
    /// Contact phone
    pub phone: Option<String>,
    /// `pet_owner`, `business_owner` or `admin`
    pub role: String,
    /// Deactivated accounts cannot log in
    pub is_active: bool,
    /// Registration time
    pub created_at: String,
    /// Last login
    pub last_active: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email,
            display_name: user.display_name,
            phone: user.phone,
            role: user.role.as_str().to_owned(),
            is_active: user.is_active,
            created_at: user.created_at.to_rfc3339(),
            last_active: user.last_active.to_rfc3339(),
        }
    }
}

/// Business listing
#[derive(Debug, Serialize, Deserialize)]
pub struct BusinessResponse {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub category_id: Option<String>,
    pub city_id: Option<String>,
    pub district_id: Option<String>,
    pub neighborhood_id: Option<String>,
    pub plan: String,
    pub is_verified: bool,
    pub is_active: bool,
    pub avg_rating: f64,
    pub review_count: u32,
    pub featured_score: f64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Business> for BusinessResponse {
    fn from(business: Business) -> Self {
        Self {
            id: business.id.to_string(),
            owner_id: business.owner_id.to_string(),
            name: business.name,
            slug: business.slug,
            description: business.description,
            phone: business.phone,
            email: business.email,
            address: business.address,
            category_id: business.category_id.map(|id| id.to_string()),
            city_id: business.city_id.map(|id| id.to_string()),
            district_id: business.district_id.map(|id| id.to_string()),
            neighborhood_id: business.neighborhood_id.map(|id| id.to_string()),
            plan: business.plan.as_str().to_owned(),
            is_verified: business.is_verified,
            is_active: business.is_active,
            avg_rating: business.avg_rating,
            review_count: business.review_count,
            featured_score: business.featured_score,
            created_at: business.created_at.to_rfc3339(),
            updated_at: business.updated_at.to_rfc3339(),
        }
    }
}

/// Service on a business menu
#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceResponse {
    pub id: String,
    pub business_id: String,
    pub name: String,
    pub description: Option<String>,
    pub duration_minutes: u32,
    pub price_cents: i64,
    pub is_active: bool,
}

impl From<Service> for ServiceResponse {
    fn from(service: Service) -> Self {
        Self {
            id: service.id.to_string(),
            business_id: service.business_id.to_string(),
            name: service.name,
            description: service.description,
            duration_minutes: service.duration_minutes,
            price_cents: service.price_cents,
            is_active: service.is_active,
        }
    }
}

/// Pet profile
#[derive(Debug, Serialize, Deserialize)]
pub struct PetResponse {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub species: String,
    pub breed: Option<String>,
    pub size: String,
    /// `YYYY-MM-DD`
    pub birth_date: Option<String>,
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_at: String,
}

impl From<Pet> for PetResponse {
    fn from(pet: Pet) -> Self {
        Self {
            id: pet.id.to_string(),
            owner_id: pet.owner_id.to_string(),
            name: pet.name,
            species: pet.species,
            breed: pet.breed,
            size: pet.size.as_str().to_owned(),
            birth_date: pet.birth_date.map(|d| d.to_string()),
            notes: pet.notes,
            is_active: pet.is_active,
            created_at: pet.created_at.to_rfc3339(),
        }
    }
}

/// Booking
#[derive(Debug, Serialize, Deserialize)]
pub struct AppointmentResponse {
    pub id: String,
    pub business_id: String,
    pub pet_id: String,
    pub user_id: String,
    pub service_id: Option<String>,
    pub scheduled_at: String,
    /// Upper-case status, e.g. `PENDING`
    pub status: String,
    pub notes: Option<String>,
    pub cancellation_reason: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Appointment> for AppointmentResponse {
    fn from(appointment: Appointment) -> Self {
        Self {
            id: appointment.id.to_string(),
            business_id: appointment.business_id.to_string(),
            pet_id: appointment.pet_id.to_string(),
            user_id: appointment.user_id.to_string(),
            service_id: appointment.service_id.map(|id| id.to_string()),
            scheduled_at: appointment.scheduled_at.to_rfc3339(),
            status: appointment.status.wire_name().to_owned(),
            notes: appointment.notes,
            cancellation_reason: appointment.cancellation_reason,
            created_at: appointment.created_at.to_rfc3339(),
            updated_at: appointment.updated_at.to_rfc3339(),
        }
    }
}

/// Review with the owner's reply
#[derive(Debug, Serialize, Deserialize)]
pub struct ReviewResponse {
    pub id: String,
    pub business_id: String,
    pub user_id: String,
    pub rating: u8,
    pub comment: Option<String>,
    pub owner_reply: Option<String>,
    pub created_at: String,
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        Self {
            id: review.id.to_string(),
            business_id: review.business_id.to_string(),
            user_id: review.user_id.to_string(),
            rating: review.rating,
            comment: review.comment,
            owner_reply: review.owner_reply,
            created_at: review.created_at.to_rfc3339(),
        }
    }
}

/// In-app notification
#[derive(Debug, Serialize, Deserialize)]
pub struct NotificationResponse {
    pub id: String,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
    pub is_read: bool,
    pub created_at: String,
}

impl From<Notification> for NotificationResponse {
    fn from(notification: Notification) -> Self {
        Self {
            id: notification.id.to_string(),
            kind: notification.kind,
            title: notification.title,
            message: notification.message,
            link: notification.link,
            is_read: notification.is_read,
            created_at: notification.created_at.to_rfc3339(),
        }
    }
}

/// Category
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryResponse {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub sort_order: i64,
    pub is_active: bool,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id.to_string(),
            name: category.name,
            slug: category.slug,
            description: category.description,
            sort_order: category.sort_order,
            is_active: category.is_active,
        }
    }
}

/// City, district or neighborhood
#[derive(Debug, Serialize, Deserialize)]
pub struct LocationResponse {
    pub id: String,
    /// City for districts, district for neighborhoods
    pub parent_id: Option<String>,
    pub name: String,
    pub slug: String,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub content: Option<String>,
    pub is_active: bool,
    pub sort_order: i64,
}

impl From<LocationNode> for LocationResponse {
    fn from(node: LocationNode) -> Self {
        Self {
            id: node.id.to_string(),
            parent_id: node.parent_id.map(|id| id.to_string()),
            name: node.name,
            slug: node.slug,
            seo_title: node.seo_title,
            seo_description: node.seo_description,
            content: node.content,
            is_active: node.is_active,
            sort_order: node.sort_order,
        }
    }
}

/// CMS page
#[derive(Debug, Serialize, Deserialize)]
pub struct PageResponse {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub content: String,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub is_published: bool,
    pub updated_at: String,
}

impl From<Page> for PageResponse {
    fn from(page: Page) -> Self {
        Self {
            id: page.id.to_string(),
            slug: page.slug,
            title: page.title,
            content: page.content,
            seo_title: page.seo_title,
            seo_description: page.seo_description,
            is_published: page.is_published,
            updated_at: page.updated_at.to_rfc3339(),
        }
    }
}

/// Outbox row as shown to operators
#[derive(Debug, Serialize, Deserialize)]
pub struct OutboxEmailResponse {
    pub id: String,
    pub to_email: String,
    pub subject: String,
    pub html_body: String,
    pub template: String,
    /// `queued`, `sent` or `failed`
    pub status: String,
    pub created_at: String,
    pub sent_at: Option<String>,
}

impl From<OutboxEmail> for OutboxEmailResponse {
    fn from(email: OutboxEmail) -> Self {
        Self {
            id: email.id.to_string(),
            to_email: email.to_email,
            subject: email.subject,
            html_body: email.html_body,
            template: email.template,
            status: email.status.as_str().to_owned(),
            created_at: email.created_at.to_rfc3339(),
            sent_at: email.sent_at.map(|t| t.to_rfc3339()),
        }
    }
}
