// ABOUTME: Appointment lifecycle state machine and booking guards
// ABOUTME: Pure rules with no I/O so every edge and guard can be unit tested
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

//! # Appointment Lifecycle
//!
//! ```text
//! PENDING ──► CONFIRMED ──► IN_PROGRESS ──► COMPLETED
//!    │            │
//!    │            ├──► NO_SHOW
//!    ▼            ▼
//! CANCELLED ◄─────┘
//! ```
//!
//! `COMPLETED`, `CANCELLED` and `NO_SHOW` are terminal. Who may request a
//! transition depends on the [`Actor`]: customers and admins cancel,
//! business owners and admins drive everything else.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::constants::booking::{CANCELLATION_WINDOW_HOURS, MAX_NO_SHOWS_PER_BUSINESS};
use crate::errors::AppError;
use crate::models::{AppointmentStatus, PlanTier};

/// Role a requester plays relative to one appointment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    /// The user who booked the appointment
    Customer,
    /// Owner of the business the appointment is at
    BusinessOwner,
    /// Platform admin
    Admin,
}

impl Actor {
    /// Resolve the actor for a requested transition
    ///
    /// Admin wins. A user who is both customer and owner (an owner booking
    /// their own shop) acts as customer when cancelling and as owner
    /// otherwise. Returns `None` for unrelated users.
    #[must_use]
    pub const fn resolve(
        is_admin: bool,
        is_customer: bool,
        is_business_owner: bool,
        target: AppointmentStatus,
    ) -> Option<Self> {
        if is_admin {
            return Some(Self::Admin);
        }
        match (is_customer, is_business_owner) {
            (true, true) => {
                if matches!(target, AppointmentStatus::Cancelled) {
                    Some(Self::Customer)
                } else {
                    Some(Self::BusinessOwner)
                }
            }
            (true, false) => Some(Self::Customer),
            (false, true) => Some(Self::BusinessOwner),
            (false, false) => None,
        }
    }

    /// Human-readable name used in error messages
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::BusinessOwner => "business owner",
            Self::Admin => "admin",
        }
    }
}

/// Why a status change was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    /// The edge does not exist in the state machine
    #[error("cannot move appointment from {from} to {to}")]
    InvalidTransition {
        /// Current status
        from: AppointmentStatus,
        /// Requested status
        to: AppointmentStatus,
    },
    /// The edge exists but this actor may not take it
    #[error("a {} cannot set status {to}", .actor.as_str())]
    NotPermitted {
        /// Requesting actor
        actor: Actor,
        /// Requested status
        to: AppointmentStatus,
    },
    /// Too close to the start time to cancel
    #[error("appointments cannot be cancelled less than {window_hours} hours before the start time")]
    CancellationWindowClosed {
        /// Window length in hours
        window_hours: i64,
    },
}

impl From<LifecycleError> for AppError {
    fn from(error: LifecycleError) -> Self {
        let message = error.to_string();
        match error {
            LifecycleError::InvalidTransition { .. } => Self::invalid_transition(message),
            LifecycleError::NotPermitted { .. } => Self::permission_denied(message),
            LifecycleError::CancellationWindowClosed { .. } => Self::booking_rejected(message),
        }
    }
}

/// Statuses reachable in one step from `from`
#[must_use]
pub const fn allowed_targets(from: AppointmentStatus) -> &'static [AppointmentStatus] {
    use AppointmentStatus::{Cancelled, Completed, Confirmed, InProgress, NoShow, Pending};
    match from {
        Pending => &[Confirmed, Cancelled],
        Confirmed => &[InProgress, Cancelled, NoShow],
        InProgress => &[Completed],
        Completed | Cancelled | NoShow => &[],
    }
}

/// Whether `from -> to` is an edge of the state machine
#[must_use]
pub fn can_transition(from: AppointmentStatus, to: AppointmentStatus) -> bool {
    allowed_targets(from).contains(&to)
}

/// Whether `actor` may request a move into `to`
#[must_use]
pub const fn actor_may_set(actor: Actor, to: AppointmentStatus) -> bool {
    match (actor, to) {
        (Actor::Admin, _) => true,
        (Actor::Customer, AppointmentStatus::Cancelled) => true,
        (Actor::Customer, _) => false,
        (Actor::BusinessOwner, AppointmentStatus::Cancelled) => false,
        (Actor::BusinessOwner, _) => true,
    }
}

/// Cancellation must happen at least the window ahead of the start time
///
/// # Errors
///
/// Returns `CancellationWindowClosed` for non-admins inside the window,
/// including appointments whose start time has passed.
pub fn check_cancellation_window(
    actor: Actor,
    scheduled_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<(), LifecycleError> {
    if actor == Actor::Admin {
        return Ok(());
    }
    if scheduled_at - now < Duration::hours(CANCELLATION_WINDOW_HOURS) {
        return Err(LifecycleError::CancellationWindowClosed {
            window_hours: CANCELLATION_WINDOW_HOURS,
        });
    }
    Ok(())
}

/// Validate a full transition request
///
/// # Errors
///
/// Returns the first failing check: unknown edge, actor not allowed, or
/// cancellation window closed.
pub fn validate_transition(
    actor: Actor,
    from: AppointmentStatus,
    to: AppointmentStatus,
    scheduled_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<(), LifecycleError> {
    if !can_transition(from, to) {
        return Err(LifecycleError::InvalidTransition { from, to });
    }
    if !actor_may_set(actor, to) {
        return Err(LifecycleError::NotPermitted { actor, to });
    }
    if to == AppointmentStatus::Cancelled {
        check_cancellation_window(actor, scheduled_at, now)?;
    }
    Ok(())
}

/// Transitions into these statuses notify the customer
#[must_use]
pub const fn notifies_customer(to: AppointmentStatus) -> bool {
    matches!(
        to,
        AppointmentStatus::Confirmed | AppointmentStatus::Cancelled | AppointmentStatus::Completed
    )
}

/// Why a new booking was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingError {
    /// Requested time is now or in the past
    #[error("appointments must be scheduled in the future")]
    NotInFuture,
    /// Business is on the free plan
    #[error("this business does not accept online bookings on its current plan")]
    PlanNotBookable {
        /// Business plan
        plan: PlanTier,
    },
    /// Customer has too many no-shows at this business
    #[error("booking blocked after {count} missed appointments at this business")]
    TooManyNoShows {
        /// Recorded no-shows
        count: i64,
    },
}

impl From<BookingError> for AppError {
    fn from(error: BookingError) -> Self {
        let message = error.to_string();
        match error {
            BookingError::NotInFuture | BookingError::PlanNotBookable { .. } => {
                Self::booking_rejected(message)
            }
            BookingError::TooManyNoShows { .. } => Self::permission_denied(message),
        }
    }
}

/// Facts needed to decide whether a booking may be created
#[derive(Debug, Clone, Copy)]
pub struct BookingRequest {
    /// Business plan
    pub plan: PlanTier,
    /// Requested start time
    pub scheduled_at: DateTime<Utc>,
    /// Current time
    pub now: DateTime<Utc>,
    /// No-shows this customer already has at the business
    pub prior_no_shows: i64,
}

/// Apply the creation guards in order: plan, date, no-show history
///
/// # Errors
///
/// Returns the first failing `BookingError`.
pub fn validate_booking(request: &BookingRequest) -> Result<(), BookingError> {
    if !request.plan.is_paid() {
        return Err(BookingError::PlanNotBookable { plan: request.plan });
    }
    if request.scheduled_at <= request.now {
        return Err(BookingError::NotInFuture);
    }
    if request.prior_no_shows >= MAX_NO_SHOWS_PER_BUSINESS {
        return Err(BookingError::TooManyNoShows {
            count: request.prior_no_shows,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;
    use AppointmentStatus::{Cancelled, Completed, Confirmed, InProgress, NoShow, Pending};

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-10T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_only_listed_edges_are_allowed() {
        let edges = [
            (Pending, Confirmed),
            (Pending, Cancelled),
            (Confirmed, InProgress),
            (Confirmed, Cancelled),
            (Confirmed, NoShow),
            (InProgress, Completed),
        ];
        for from in AppointmentStatus::ALL {
            for to in AppointmentStatus::ALL {
                assert_eq!(
                    can_transition(from, to),
                    edges.contains(&(from, to)),
                    "{from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn test_terminal_states_have_no_exits() {
        for status in [Completed, Cancelled, NoShow] {
            assert!(allowed_targets(status).is_empty());
        }
    }

    #[test]
    fn test_customer_can_only_cancel() {
        let later = now() + Duration::days(2);
        assert!(validate_transition(Actor::Customer, Pending, Cancelled, later, now()).is_ok());
        assert_eq!(
            validate_transition(Actor::Customer, Pending, Confirmed, later, now()),
            Err(LifecycleError::NotPermitted {
                actor: Actor::Customer,
                to: Confirmed
            })
        );
    }

    #[test]
    fn test_business_owner_cannot_cancel() {
        let later = now() + Duration::days(2);
        let err = validate_transition(Actor::BusinessOwner, Confirmed, Cancelled, later, now())
            .unwrap_err();
        assert!(matches!(err, LifecycleError::NotPermitted { .. }));
        assert!(
            validate_transition(Actor::BusinessOwner, Confirmed, NoShow, later, now()).is_ok()
        );
    }

    #[test]
    fn test_cancellation_window_applies_to_non_admins() {
        let soon = now() + Duration::minutes(119);
        assert_eq!(
            validate_transition(Actor::Customer, Confirmed, Cancelled, soon, now()),
            Err(LifecycleError::CancellationWindowClosed { window_hours: 2 })
        );
        assert!(validate_transition(Actor::Admin, Confirmed, Cancelled, soon, now()).is_ok());

        let exactly_two_hours = now() + Duration::hours(2);
        assert!(
            validate_transition(Actor::Customer, Pending, Cancelled, exactly_two_hours, now())
                .is_ok()
        );
    }

    #[test]
    fn test_past_appointment_cannot_be_cancelled_by_customer() {
        let past = now() - Duration::hours(1);
        assert!(check_cancellation_window(Actor::Customer, past, now()).is_err());
    }

    #[test]
    fn test_invalid_edge_reported_before_permissions() {
        let later = now() + Duration::days(1);
        let err = validate_transition(Actor::Customer, Completed, Cancelled, later, now())
            .unwrap_err();
        assert_eq!(
            err,
            LifecycleError::InvalidTransition {
                from: Completed,
                to: Cancelled
            }
        );
        assert_eq!(AppError::from(err).code, ErrorCode::InvalidTransition);
    }

    #[test]
    fn test_actor_resolution() {
        assert_eq!(
            Actor::resolve(true, false, false, Confirmed),
            Some(Actor::Admin)
        );
        assert_eq!(
            Actor::resolve(false, true, true, Cancelled),
            Some(Actor::Customer)
        );
        assert_eq!(
            Actor::resolve(false, true, true, Confirmed),
            Some(Actor::BusinessOwner)
        );
        assert_eq!(Actor::resolve(false, false, false, Cancelled), None);
    }

    #[test]
    fn test_notifying_transitions() {
        let notifying: Vec<_> = AppointmentStatus::ALL
            .into_iter()
            .filter(|s| notifies_customer(*s))
            .collect();
        assert_eq!(notifying, vec![Confirmed, Completed, Cancelled]);
    }

    #[test]
    fn test_booking_guards() {
        let base = BookingRequest {
            plan: PlanTier::Premium,
            scheduled_at: now() + Duration::days(1),
            now: now(),
            prior_no_shows: 0,
        };
        assert!(validate_booking(&base).is_ok());

        let free = BookingRequest {
            plan: PlanTier::Free,
            ..base
        };
        assert_eq!(
            validate_booking(&free),
            Err(BookingError::PlanNotBookable {
                plan: PlanTier::Free
            })
        );
        assert_eq!(
            AppError::from(validate_booking(&free).unwrap_err()).http_status(),
            400
        );

        let past = BookingRequest {
            scheduled_at: now(),
            ..base
        };
        assert_eq!(validate_booking(&past), Err(BookingError::NotInFuture));

        let two_no_shows = BookingRequest {
            prior_no_shows: 2,
            ..base
        };
        assert!(validate_booking(&two_no_shows).is_ok());

        let three_no_shows = BookingRequest {
            prior_no_shows: 3,
            ..base
        };
        assert_eq!(
            validate_booking(&three_no_shows),
            Err(BookingError::TooManyNoShows { count: 3 })
        );
    }

    #[test]
    fn test_free_plan_rejected_even_with_bad_date_and_history() {
        let request = BookingRequest {
            plan: PlanTier::Free,
            scheduled_at: now() - Duration::days(1),
            now: now(),
            prior_no_shows: 10,
        };
        assert!(matches!(
            validate_booking(&request),
            Err(BookingError::PlanNotBookable { .. })
        ));
    }
}
