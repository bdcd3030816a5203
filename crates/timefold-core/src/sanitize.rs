//! Text cleanup and credential validation.
//!
//! Free-text fields (titles, bodies, names, themes) pass through
//! [`sanitize_text`] before any write. Credential validators return
//! `(bool, reason)` pairs; the reason text is safe to surface to callers.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::{MAX_PASSWORD_BYTES, MAX_USERNAME_LENGTH, MIN_PASSWORD_LENGTH, MIN_USERNAME_LENGTH};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9_-]*$").unwrap());

/// Strip NUL and control characters (newlines and tabs survive), trim
/// surrounding whitespace, and truncate to `max_length` characters on a
/// char boundary.
pub fn sanitize_text(text: &str, max_length: Option<usize>) -> String {
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect();
    let trimmed = cleaned.trim();

    match max_length {
        Some(max) => trimmed.chars().take(max).collect(),
        None => trimmed.to_string(),
    }
}

pub fn validate_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Username rules: 3..=100 chars, alphanumeric plus `_` and `-`, must start
/// with a letter or digit.
pub fn validate_username(username: &str) -> (bool, String) {
    if username.chars().count() < MIN_USERNAME_LENGTH {
        return (
            false,
            format!("Username must be at least {MIN_USERNAME_LENGTH} characters"),
        );
    }
    if username.chars().count() > MAX_USERNAME_LENGTH {
        return (
            false,
            format!("Username cannot exceed {MAX_USERNAME_LENGTH} characters"),
        );
    }
    if !USERNAME_RE.is_match(username) {
        return (
            false,
            "Username must start with a letter or number and contain only letters, numbers, \
             underscore, or hyphen"
                .to_string(),
        );
    }
    (true, "OK".to_string())
}

/// Password rules: at least 8 characters, at most 72 bytes (hash input cap),
/// at least one uppercase, one lowercase and one digit.
pub fn validate_password(password: &str) -> (bool, String) {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return (
            false,
            format!("Password must be at least {MIN_PASSWORD_LENGTH} characters"),
        );
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return (
            false,
            format!("Password cannot exceed {MAX_PASSWORD_BYTES} bytes"),
        );
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return (
            false,
            "Password must contain at least one uppercase letter".to_string(),
        );
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return (
            false,
            "Password must contain at least one lowercase letter".to_string(),
        );
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return (
            false,
            "Password must contain at least one number".to_string(),
        );
    }
    (true, "OK".to_string())
}
