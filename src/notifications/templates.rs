// ABOUTME: Email and in-app message templates for booking and review events
// ABOUTME: Every interpolated value is HTML-escaped before it reaches an email body
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

use chrono::{DateTime, Utc};
use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::constants::notification_kinds;
use crate::models::AppointmentStatus;

/// Email templates the dispatcher can render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailTemplate {
    /// Business accepted the booking
    BookingConfirmed,
    /// Booking was called off
    BookingCancelled,
    /// Grooming finished, invite a review
    BookingCompleted,
}

impl EmailTemplate {
    /// Template for a customer-facing status change, if that status sends mail
    #[must_use]
    pub const fn for_status(status: AppointmentStatus) -> Option<Self> {
        match status {
            AppointmentStatus::Confirmed => Some(Self::BookingConfirmed),
            AppointmentStatus::Cancelled => Some(Self::BookingCancelled),
            AppointmentStatus::Completed => Some(Self::BookingCompleted),
            _ => None,
        }
    }

    /// Name stored in the outbox
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::BookingConfirmed => "booking_confirmed",
            Self::BookingCancelled => "booking_cancelled",
            Self::BookingCompleted => "booking_completed",
        }
    }

    /// Notification kind paired with this template
    #[must_use]
    pub const fn notification_kind(&self) -> &'static str {
        match self {
            Self::BookingConfirmed => notification_kinds::BOOKING_CONFIRMED,
            Self::BookingCancelled => notification_kinds::BOOKING_CANCELLED,
            Self::BookingCompleted => notification_kinds::BOOKING_COMPLETED,
        }
    }
}

/// Values available to booking templates
#[derive(Debug, Clone)]
pub struct BookingContext<'a> {
    /// Customer's greeting name
    pub customer_name: &'a str,
    /// Business display name
    pub business_name: &'a str,
    /// Pet name
    pub pet_name: &'a str,
    /// Appointment start
    pub scheduled_at: DateTime<Utc>,
    /// Cancellation reason, if any
    pub reason: Option<&'a str>,
    /// Absolute link to the appointment or business page
    pub link: &'a str,
}

/// A rendered email ready for the outbox
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    /// Subject line, plain text
    pub subject: String,
    /// HTML body
    pub html_body: String,
}

/// A rendered in-app notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedNotification {
    /// Notification kind
    pub kind: &'static str,
    /// Short title
    pub title: String,
    /// Body text
    pub message: String,
}

fn format_when(at: DateTime<Utc>) -> String {
    at.format("%d %b %Y, %H:%M UTC").to_string()
}

/// Render the customer email for a booking template
#[must_use]
pub fn render_booking_email(template: EmailTemplate, ctx: &BookingContext<'_>) -> RenderedEmail {
    let when = format_when(ctx.scheduled_at);
    let customer = encode_text(ctx.customer_name);
    let business = encode_text(ctx.business_name);
    let pet = encode_text(ctx.pet_name);
    let link = encode_double_quoted_attribute(ctx.link);

    let (subject, lead, call_to_action) = match template {
        EmailTemplate::BookingConfirmed => (
            format!("Your appointment at {} is confirmed", ctx.business_name),
            format!("{business} confirmed {pet}'s grooming appointment on {when}."),
            "View appointment",
        ),
        EmailTemplate::BookingCancelled => {
            let reason = ctx
                .reason
                .filter(|r| !r.trim().is_empty())
                .map(|r| format!(" Reason: {}.", encode_text(r.trim())))
                .unwrap_or_default();
            (
                format!("Your appointment at {} was cancelled", ctx.business_name),
                format!("{pet}'s appointment at {business} on {when} was cancelled.{reason}"),
                "Book another time",
            )
        }
        EmailTemplate::BookingCompleted => (
            format!("Thanks for visiting {}", ctx.business_name),
            format!("We hope {pet} enjoyed the visit to {business}. Tell other pet owners how it went."),
            "Leave a review",
        ),
    };

    let html_body = format!(
        "<!DOCTYPE html>\n<html><body style=\"font-family: sans-serif\">\
         <p>Hi {customer},</p>\
         <p>{lead}</p>\
         <p><a href=\"{link}\">{call_to_action}</a></p>\
         <p>PawHub</p>\
         </body></html>"
    );

    RenderedEmail { subject, html_body }
}

/// In-app notification for the customer after a status change
#[must_use]
pub fn status_notification(template: EmailTemplate, ctx: &BookingContext<'_>) -> RenderedNotification {
    let when = format_when(ctx.scheduled_at);
    let (title, message) = match template {
        EmailTemplate::BookingConfirmed => (
            "Appointment confirmed".to_owned(),
            format!("{} confirmed {}'s appointment on {when}.", ctx.business_name, ctx.pet_name),
        ),
        EmailTemplate::BookingCancelled => (
            "Appointment cancelled".to_owned(),
            format!(
                "{}'s appointment at {} on {when} was cancelled.",
                ctx.pet_name, ctx.business_name
            ),
        ),
        EmailTemplate::BookingCompleted => (
            "Appointment completed".to_owned(),
            format!("How was {}'s visit to {}? Leave a review.", ctx.pet_name, ctx.business_name),
        ),
    };
    RenderedNotification {
        kind: template.notification_kind(),
        title,
        message,
    }
}

/// In-app notification for the business owner when a booking arrives
#[must_use]
pub fn booking_request_notification(ctx: &BookingContext<'_>) -> RenderedNotification {
    RenderedNotification {
        kind: notification_kinds::BOOKING_REQUESTED,
        title: "New booking request".to_owned(),
        message: format!(
            "{} requested an appointment for {} at {} on {}.",
            ctx.customer_name,
            ctx.pet_name,
            ctx.business_name,
            format_when(ctx.scheduled_at)
        ),
    }
}

/// In-app notification for the business owner when a review is posted
#[must_use]
pub fn review_notification(business_name: &str, rating: u8) -> RenderedNotification {
    RenderedNotification {
        kind: notification_kinds::REVIEW_RECEIVED,
        title: "New review".to_owned(),
        message: format!("{business_name} received a {rating}-star review."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx<'a>(business_name: &'a str, reason: Option<&'a str>) -> BookingContext<'a> {
        BookingContext {
            customer_name: "Ada",
            business_name,
            pet_name: "Rex",
            scheduled_at: DateTime::parse_from_rfc3339("2026-05-01T10:30:00Z")
                .unwrap()
                .with_timezone(&Utc),
            reason,
            link: "https://pawhub.test/appointments/1",
        }
    }

    #[test]
    fn test_template_selection_by_status() {
        assert_eq!(
            EmailTemplate::for_status(AppointmentStatus::Confirmed),
            Some(EmailTemplate::BookingConfirmed)
        );
        assert_eq!(EmailTemplate::for_status(AppointmentStatus::InProgress), None);
        assert_eq!(EmailTemplate::for_status(AppointmentStatus::NoShow), None);
    }

    #[test]
    fn test_confirmed_email_mentions_time_and_link() {
        let email = render_booking_email(EmailTemplate::BookingConfirmed, &ctx("Happy Paws", None));
        assert_eq!(email.subject, "Your appointment at Happy Paws is confirmed");
        assert!(email.html_body.contains("01 May 2026, 10:30 UTC"));
        assert!(email.html_body.contains("href=\"https://pawhub.test/appointments/1\""));
    }

    #[test]
    fn test_values_are_escaped_in_html() {
        let email = render_booking_email(
            EmailTemplate::BookingCancelled,
            &ctx("<script>alert(1)</script>", Some("<b>sick</b>")),
        );
        assert!(!email.html_body.contains("<script>"));
        assert!(email.html_body.contains("&lt;script&gt;"));
        assert!(email.html_body.contains("Reason: &lt;b&gt;sick&lt;/b&gt;."));
    }

    #[test]
    fn test_blank_reason_is_omitted() {
        let email = render_booking_email(EmailTemplate::BookingCancelled, &ctx("Shop", Some("  ")));
        assert!(!email.html_body.contains("Reason:"));
    }

    #[test]
    fn test_notification_kinds_match_templates() {
        let note = status_notification(EmailTemplate::BookingCompleted, &ctx("Shop", None));
        assert_eq!(note.kind, notification_kinds::BOOKING_COMPLETED);
        assert_eq!(
            booking_request_notification(&ctx("Shop", None)).kind,
            notification_kinds::BOOKING_REQUESTED
        );
    }
}
