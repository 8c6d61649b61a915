// ABOUTME: Shared request validation helpers for names, text, emails, passwords and slugs
// ABOUTME: Each helper returns a single human-readable 400 error on failure
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

use crate::constants::limits::{MAX_PASSWORD_BYTES, MIN_PASSWORD_LENGTH};
use crate::errors::{AppError, AppResult};

/// Slugs longer than this are rejected
pub const MAX_SLUG_LENGTH: usize = 80;

/// Trim a required text field, rejecting blanks and overlong values
///
/// # Errors
///
/// Returns 400 if the value is blank or longer than `max_len` characters
pub fn required_text(field: &str, value: &str, max_len: usize) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::missing_field(field));
    }
    check_length(field, trimmed, max_len)?;
    Ok(trimmed.to_owned())
}

/// Trim an optional text field; blank values become `None`
///
/// # Errors
///
/// Returns 400 if the value is longer than `max_len` characters
pub fn optional_text(field: &str, value: Option<&str>, max_len: usize) -> AppResult<Option<String>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(trimmed) => {
            check_length(field, trimmed, max_len)?;
            Ok(Some(trimmed.to_owned()))
        }
    }
}

fn check_length(field: &str, value: &str, max_len: usize) -> AppResult<()> {
    if value.chars().count() > max_len {
        return Err(AppError::invalid_input(format!(
            "{field} must be {max_len} characters or less"
        )));
    }
    Ok(())
}

/// Normalize and sanity-check an email address
///
/// # Errors
///
/// Returns 400 unless the address has a local part and a dotted domain
pub fn normalize_email(email: &str) -> AppResult<String> {
    let email = email.trim().to_lowercase();
    let valid = email.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty()
            && domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.')
            && !domain.contains('@')
    });
    if !valid || email.chars().any(char::is_whitespace) {
        return Err(AppError::invalid_input("Email address is invalid"));
    }
    Ok(email)
}

/// Enforce the password length bounds
///
/// The upper bound is in bytes: bcrypt only reads the first 72, NUL included.
///
/// # Errors
///
/// Returns 400 for short or over-long passwords
pub fn validate_password(password: &str) -> AppResult<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::invalid_input(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(AppError::invalid_input(format!(
            "Password must be at most {MAX_PASSWORD_BYTES} bytes"
        )));
    }
    Ok(())
}

/// Validate a slug against naming rules
///
/// Slugs must:
/// - Be 1-80 characters long
/// - Contain only lowercase letters, numbers and hyphens
/// - Not start or end with a hyphen
///
/// # Errors
///
/// Returns 400 describing the first violated rule
pub fn validate_slug(slug: &str) -> AppResult<()> {
    if slug.is_empty() {
        return Err(AppError::invalid_input("Slug cannot be empty"));
    }
    if slug.len() > MAX_SLUG_LENGTH {
        return Err(AppError::invalid_input(format!(
            "Slug must be {MAX_SLUG_LENGTH} characters or less"
        )));
    }
    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(AppError::invalid_input(
            "Slug can only contain lowercase letters, numbers, and hyphens",
        ));
    }
    if slug.starts_with('-') || slug.ends_with('-') {
        return Err(AppError::invalid_input(
            "Slug cannot start or end with a hyphen",
        ));
    }
    Ok(())
}

/// Derive a slug from a display name
///
/// Common Turkish and Western European letters are folded to ASCII; any
/// other run of non-alphanumerics becomes one hyphen.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for c in name.chars().flat_map(char::to_lowercase) {
        let folded = match c {
            'ç' => 'c',
            'ğ' => 'g',
            'ı' | 'î' | 'ï' | 'í' | 'ì' => 'i',
            'ö' | 'ô' | 'ó' | 'ò' => 'o',
            'ş' => 's',
            'ü' | 'û' | 'ú' | 'ù' => 'u',
            'â' | 'à' | 'á' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'ñ' => 'n',
            other => other,
        };
        if folded.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(folded);
        } else {
            pending_hyphen = true;
        }
    }

    slug.truncate(MAX_SLUG_LENGTH);
    slug.trim_end_matches('-').to_owned()
}

/// Use the given slug or derive one from the name, then validate it
///
/// # Errors
///
/// Returns 400 if the resulting slug is invalid
pub fn slug_or_derive(slug: Option<&str>, name: &str) -> AppResult<String> {
    let slug = match slug.map(str::trim) {
        Some(explicit) if !explicit.is_empty() => explicit.to_lowercase(),
        _ => slugify(name),
    };
    validate_slug(&slug)?;
    Ok(slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_folds_and_collapses() {
        assert_eq!(slugify("Happy Paws Grooming"), "happy-paws-grooming");
        assert_eq!(slugify("  Şişli -- Pet Kuaför! "), "sisli-pet-kuafor");
        assert_eq!(slugify("Çankaya"), "cankaya");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_validate_slug_rules() {
        assert!(validate_slug("kadikoy-moda").is_ok());
        assert!(validate_slug("").is_err());
        assert!(validate_slug("Upper").is_err());
        assert!(validate_slug("-edge").is_err());
        assert!(validate_slug(&"a".repeat(MAX_SLUG_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_slug_or_derive_prefers_explicit() {
        assert_eq!(slug_or_derive(Some("Custom-Slug"), "Name").unwrap(), "custom-slug");
        assert_eq!(slug_or_derive(Some("  "), "Bath Time").unwrap(), "bath-time");
        assert!(slug_or_derive(None, "???").is_err());
    }

    #[test]
    fn test_text_helpers() {
        assert_eq!(required_text("Name", "  Rex ", 10).unwrap(), "Rex");
        assert!(required_text("Name", "   ", 10).is_err());
        assert!(required_text("Name", "abcdefghijk", 10).is_err());
        assert_eq!(optional_text("Notes", Some("  "), 10).unwrap(), None);
        assert_eq!(optional_text("Notes", None, 10).unwrap(), None);
    }

    #[test]
    fn test_email_and_password() {
        assert_eq!(normalize_email(" Ada@Example.COM ").unwrap(), "ada@example.com");
        assert!(normalize_email("no-at-sign").is_err());
        assert!(normalize_email("a@nodot").is_err());
        assert!(validate_password("short").is_err());
        assert!(validate_password("long enough").is_ok());
        assert!(validate_password(&"p".repeat(MAX_PASSWORD_BYTES)).is_ok());
        assert!(validate_password(&"p".repeat(MAX_PASSWORD_BYTES + 1)).is_err());
        // 30 characters but 75 bytes
        assert!(validate_password(&"é€".repeat(15)).is_err());
    }
}
