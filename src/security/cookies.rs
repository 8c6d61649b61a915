// ABOUTME: Session cookie parsing and Set-Cookie construction
// ABOUTME: The session token travels in an HttpOnly SameSite=Lax cookie
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

use axum::http::{header, HeaderMap, HeaderValue};

use crate::constants::cookies::SESSION;
use crate::errors::{AppError, AppResult};

/// Read a cookie value from the request headers
#[must_use]
pub fn get_cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value installing a session token
///
/// # Errors
///
/// Returns an error if the token contains bytes not allowed in a header
pub fn session_cookie(token: &str, max_age_hours: i64, secure: bool) -> AppResult<HeaderValue> {
    let max_age_secs = max_age_hours.max(0) * 3600;
    let secure = if secure { "; Secure" } else { "" };
    HeaderValue::from_str(&format!(
        "{SESSION}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}{secure}"
    ))
    .map_err(|e| AppError::internal(format!("Invalid session cookie: {e}")))
}

/// `Set-Cookie` value expiring the session cookie
#[must_use]
pub fn clear_session_cookie(secure: bool) -> HeaderValue {
    if secure {
        HeaderValue::from_static("pawhub_session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0; Secure")
    } else {
        HeaderValue::from_static("pawhub_session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_cookie_value_finds_named_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; pawhub_session=abc.def.ghi; lang=en"),
        );
        assert_eq!(
            get_cookie_value(&headers, SESSION).as_deref(),
            Some("abc.def.ghi")
        );
        assert!(get_cookie_value(&headers, "missing").is_none());
    }

    #[test]
    fn test_empty_cookie_is_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("pawhub_session="));
        assert!(get_cookie_value(&headers, SESSION).is_none());
    }

    #[test]
    fn test_session_cookie_attributes() {
        let value = session_cookie("tok", 24, true).unwrap();
        let value = value.to_str().unwrap();
        assert!(value.starts_with("pawhub_session=tok;"));
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("SameSite=Lax"));
        assert!(value.contains("Max-Age=86400"));
        assert!(value.ends_with("Secure"));

        let cleared = clear_session_cookie(false);
        assert!(cleared.to_str().unwrap().contains("Max-Age=0"));
    }
}
