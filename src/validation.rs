//! Client-side rules a draft must satisfy before it is sent.
//!
//! DESIGN
//! ======
//! Every rule runs and every failure is collected, so one submit attempt
//! reports all problems at once. The backend stays the source of truth for
//! email format and uniqueness; only presence is checked here.

#[cfg(test)]
#[path = "validation_test.rs"]
mod validation_test;

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::net::types::UserDraft;

/// Exactly ten ASCII digits.
static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{10}$").unwrap());

/// Five capital letters, four digits, one capital letter.
static PAN_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z]{5}[0-9]{4}[A-Z]$").unwrap());

/// A single failed rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Issue {
    MissingRequired,
    InvalidPhone,
    InvalidPan,
}

impl Issue {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::MissingRequired => "Please fill in all required fields",
            Self::InvalidPhone => "Phone number must be 10 digits",
            Self::InvalidPan => "PAN must match format: ABCDE1234F",
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[must_use]
pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_PATTERN.is_match(phone)
}

#[must_use]
pub fn is_valid_pan(pan: &str) -> bool {
    PAN_PATTERN.is_match(pan)
}

/// Check a draft against every rule, in reporting order.
///
/// # Errors
///
/// Returns every failed rule when at least one fails.
pub fn validate(draft: &UserDraft) -> Result<(), Vec<Issue>> {
    let mut issues = Vec::new();

    let missing = [&draft.first_name, &draft.last_name, &draft.email]
        .iter()
        .any(|value| value.trim().is_empty());
    if missing {
        issues.push(Issue::MissingRequired);
    }
    if !is_valid_phone(&draft.phone) {
        issues.push(Issue::InvalidPhone);
    }
    if !is_valid_pan(&draft.pan) {
        issues.push(Issue::InvalidPan);
    }

    if issues.is_empty() { Ok(()) } else { Err(issues) }
}
