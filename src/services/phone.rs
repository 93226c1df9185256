// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Phone number normalization to E.164.

use regex::Regex;

/// E.164 allows at most 15 digits; anything under 8 is not a subscriber number.
const MIN_DIGITS: usize = 8;
const MAX_DIGITS: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PhoneError {
    #[error("phone number contains invalid characters")]
    InvalidCharacters,

    #[error("phone number must have between {MIN_DIGITS} and {MAX_DIGITS} digits")]
    InvalidLength,

    #[error("phone number has an invalid country code")]
    InvalidCountryCode,
}

/// Validates a phone number and returns its canonical form.
pub trait PhoneFormatter: Send + Sync {
    fn format_if_valid(&self, raw: &str) -> Result<String, PhoneError>;
}

/// Formats numbers as `+<country code><subscriber number>`.
///
/// Accepted inputs:
/// - `+254 712 345 678` / `00254712345678`: international
/// - `0712 345 678`: national with trunk prefix, `default_country_code` applied
/// - `254712345678`: digits already including the country code
///
/// Spaces, dashes, dots and parentheses are ignored.
pub struct E164Formatter {
    default_country_code: String,
    allowed: Regex,
}

impl E164Formatter {
    pub fn new(default_country_code: &str) -> Self {
        Self {
            default_country_code: default_country_code.trim_start_matches('+').to_string(),
            allowed: Regex::new(r"^\+?[0-9\s\-.()]+$").expect("static regex is valid"),
        }
    }
}

impl PhoneFormatter for E164Formatter {
    fn format_if_valid(&self, raw: &str) -> Result<String, PhoneError> {
        let raw = raw.trim();
        if !self.allowed.is_match(raw) {
            return Err(PhoneError::InvalidCharacters);
        }

        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();

        let international = if raw.starts_with('+') {
            digits
        } else if let Some(rest) = digits.strip_prefix("00") {
            rest.to_string()
        } else if let Some(rest) = digits.strip_prefix('0') {
            format!("{}{}", self.default_country_code, rest)
        } else {
            digits
        };

        if international.starts_with('0') {
            return Err(PhoneError::InvalidCountryCode);
        }
        if !(MIN_DIGITS..=MAX_DIGITS).contains(&international.len()) {
            return Err(PhoneError::InvalidLength);
        }

        Ok(format!("+{}", international))
    }
}
