//! Demo credential gate checked before a login intent is dispatched.
//!
//! # Invariants
//! - Only the hard-coded demo pair is accepted.
//! - Email shape and password presence are validated before matching.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Email accepted by the demo credential check.
pub const DEMO_EMAIL: &str = "intern@demo.com";
/// Password accepted by the demo credential check.
pub const DEMO_PASSWORD: &str = "intern123";

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Reasons a login attempt is refused before dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    InvalidEmail(String),
    EmptyPassword,
    /// Well-formed input that does not match the demo account.
    Mismatch,
}

impl Display for CredentialError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEmail(value) => write!(f, "invalid email address: `{value}`"),
            Self::EmptyPassword => write!(f, "password is required"),
            Self::Mismatch => write!(f, "invalid email or password"),
        }
    }
}

impl Error for CredentialError {}

/// Validates a login form submission against the demo account.
pub fn check_credentials(email: &str, password: &str) -> Result<(), CredentialError> {
    let email = email.trim();
    if !EMAIL_RE.is_match(email) {
        return Err(CredentialError::InvalidEmail(email.to_string()));
    }
    if password.is_empty() {
        return Err(CredentialError::EmptyPassword);
    }
    if email != DEMO_EMAIL || password != DEMO_PASSWORD {
        return Err(CredentialError::Mismatch);
    }
    Ok(())
}
