// ABOUTME: Appointment creation and status changes composed from lifecycle rules and storage
// ABOUTME: Each write and its notifications commit in one transaction; email goes out after commit
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

//! Booking service
//!
//! All reads happen before the transaction opens. In-memory databases run
//! on a single pooled connection, so a pool query issued while a transaction
//! holds that connection would wait forever.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::constants::booking::MAX_NOTES_LENGTH;
use crate::database::AppointmentManager;
use crate::errors::{AppError, AppResult};
use crate::lifecycle::{
    notifies_customer, validate_booking, validate_transition, Actor, BookingError, BookingRequest,
};
use crate::logging::AppLogger;
use crate::models::{Appointment, AppointmentStatus, Business, User};
use crate::notifications::StagedEmails;
use crate::resources::ServerResources;
use crate::services::validation::optional_text;

/// Validated booking request from a customer
#[derive(Debug, Clone)]
pub struct NewBooking {
    /// Business to book
    pub business_id: Uuid,
    /// Customer's pet
    pub pet_id: Uuid,
    /// Requested service
    pub service_id: Option<Uuid>,
    /// Requested start
    pub scheduled_at: DateTime<Utc>,
    /// Notes for the groomer
    pub notes: Option<String>,
}

/// Create a PENDING appointment and notify the business owner
///
/// # Errors
///
/// Returns, in order of checking:
/// - 404 if the business is missing or inactive
/// - 400 if the business is on the FREE plan
/// - 400 if the service is not an active service of the business
/// - 404 if the pet is not one of the customer's active pets
/// - 400 for a start time not in the future
/// - 403 when the customer has too many no-shows at the business
/// - 409 when a live appointment already holds the slot
pub async fn create_appointment(
    resources: &ServerResources,
    customer: &User,
    request: NewBooking,
) -> AppResult<Appointment> {
    let database = &resources.database;
    let notes = optional_text("Notes", request.notes.as_deref(), MAX_NOTES_LENGTH)?;

    let business = database
        .businesses()
        .get(request.business_id)
        .await?
        .filter(|b| b.is_active)
        .ok_or_else(|| AppError::not_found("Business"))?;

    // FREE listings refuse bookings whatever else the request carries
    if !business.plan.is_paid() {
        return Err(BookingError::PlanNotBookable {
            plan: business.plan,
        }
        .into());
    }

    if let Some(service_id) = request.service_id {
        let offered = database
            .services()
            .get(service_id)
            .await?
            .is_some_and(|s| s.business_id == business.id && s.is_active);
        if !offered {
            return Err(AppError::invalid_input(
                "Service is not offered by this business",
            ));
        }
    }

    let pet = database
        .pets()
        .get_active_for_owner(request.pet_id, customer.id)
        .await?
        .ok_or_else(|| AppError::not_found("Pet"))?;

    let now = Utc::now();
    let prior_no_shows = database
        .appointments()
        .count_no_shows(customer.id, business.id)
        .await?;
    validate_booking(&BookingRequest {
        plan: business.plan,
        scheduled_at: request.scheduled_at,
        now,
        prior_no_shows,
    })
    .map_err(|e| AppError::from(e).with_user_id(customer.id))?;

    let appointment = Appointment {
        id: Uuid::new_v4(),
        business_id: business.id,
        pet_id: pet.id,
        user_id: customer.id,
        service_id: request.service_id,
        scheduled_at: request.scheduled_at,
        status: AppointmentStatus::Pending,
        notes,
        cancellation_reason: None,
        created_at: now,
        updated_at: now,
    };

    let mut tx = database.begin().await?;
    AppointmentManager::create_in(tx.executor()?, &appointment).await?;
    resources
        .dispatcher
        .stage_booking_request_in(tx.executor()?, &appointment, customer, &business, &pet.name)
        .await?;
    tx.commit().await?;

    AppLogger::log_booking_event(
        appointment.id,
        business.id,
        customer.id,
        "created",
        appointment.status.as_str(),
    );
    Ok(appointment)
}

/// An appointment with its business
pub struct ParticipantView {
    /// The appointment
    pub appointment: Appointment,
    /// Its business
    pub business: Business,
}

/// Load an appointment visible to the requester
///
/// Customers see their own bookings, owners the bookings at their
/// businesses, admins everything. Everyone else gets 404.
///
/// # Errors
///
/// Returns 404 if missing or not visible, or a database error
pub async fn get_for_participant(
    resources: &ServerResources,
    requester: &User,
    appointment_id: Uuid,
) -> AppResult<ParticipantView> {
    let database = &resources.database;
    let appointment = database
        .appointments()
        .get(appointment_id)
        .await?
        .ok_or_else(|| AppError::not_found("Appointment"))?;
    let business = database
        .businesses()
        .get(appointment.business_id)
        .await?
        .ok_or_else(|| AppError::not_found("Business"))?;

    let visible = requester.role.is_admin()
        || appointment.user_id == requester.id
        || business.owner_id == requester.id;
    if !visible {
        return Err(AppError::not_found("Appointment"));
    }
    Ok(ParticipantView {
        appointment,
        business,
    })
}

/// Move an appointment to a new status
///
/// The actor is resolved from the requester's relation to the appointment,
/// the lifecycle validates the edge and the guards, and the update is a
/// compare-and-set on the current status. Customer notification and email
/// are staged in the same transaction.
///
/// # Errors
///
/// Returns 404 for unknown or invisible appointments, 400 for edges outside
/// the lifecycle or a closed cancellation window, 403 when the actor may not
/// set the status, or a database error
pub async fn change_status(
    resources: &ServerResources,
    requester: &User,
    appointment_id: Uuid,
    to: AppointmentStatus,
    reason: Option<&str>,
) -> AppResult<Appointment> {
    let database = &resources.database;
    let ParticipantView {
        appointment,
        business,
    } = get_for_participant(resources, requester, appointment_id).await?;

    let actor = Actor::resolve(
        requester.role.is_admin(),
        appointment.user_id == requester.id,
        business.owner_id == requester.id,
        to,
    )
    .ok_or_else(|| AppError::not_found("Appointment"))?;

    let now = Utc::now();
    validate_transition(actor, appointment.status, to, appointment.scheduled_at, now)
        .map_err(|e| AppError::from(e).with_resource_id(appointment.id.to_string()))?;

    let reason = if to == AppointmentStatus::Cancelled {
        optional_text("Reason", reason, MAX_NOTES_LENGTH)?
    } else {
        None
    };

    // Recipient details are loaded up front; see the module note
    let recipient = if notifies_customer(to) {
        let customer = database
            .users()
            .get(appointment.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Customer"))?;
        let pet_name = database
            .pets()
            .get(appointment.pet_id)
            .await?
            .map_or_else(|| "your pet".to_owned(), |pet| pet.name);
        Some((customer, pet_name))
    } else {
        None
    };

    let from = appointment.status;
    let updated = Appointment {
        status: to,
        cancellation_reason: reason.or(appointment.cancellation_reason),
        updated_at: now,
        ..appointment
    };

    let mut tx = database.begin().await?;
    let changed = AppointmentManager::update_status_in(
        tx.executor()?,
        updated.id,
        from,
        to,
        updated.cancellation_reason.as_deref(),
        now,
    )
    .await?;
    if !changed {
        return Err(AppError::invalid_transition(
            "Appointment was modified by another request; reload and try again",
        ));
    }

    let staged = match &recipient {
        Some((customer, pet_name)) => {
            resources
                .dispatcher
                .stage_status_change_in(tx.executor()?, &updated, customer, &business, pet_name)
                .await?
        }
        None => StagedEmails::default(),
    };
    tx.commit().await?;

    AppLogger::log_booking_event(updated.id, business.id, requester.id, "status_changed", to.as_str());
    resources.dispatcher.deliver(staged).await;
    Ok(updated)
}
