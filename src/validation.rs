//! Form-boundary validation for user input.
//!
//! Runs before any create/update is dispatched; a form that fails here never
//! reaches the network.

use crate::api::UserData;
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// Problem with a single form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FieldError {
  #[error("Name is required")]
  NameRequired,
  #[error("Email is required")]
  EmailRequired,
  #[error("Invalid email address")]
  InvalidEmail,
}

/// Field-level errors from a failed validation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
  pub name: Option<FieldError>,
  pub email: Option<FieldError>,
}

impl FieldErrors {
  pub fn is_empty(&self) -> bool {
    self.name.is_none() && self.email.is_none()
  }
}

/// Raw form values as typed by the user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserForm {
  pub name: String,
  pub email: String,
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
  EMAIL_RE.get_or_init(|| {
    // local@domain.tld, no whitespace, no second '@'
    let pattern = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
    Regex::new(pattern).unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
  })
}

pub fn is_valid_email(email: &str) -> bool {
  email_regex().is_match(email)
}

impl UserForm {
  /// Validate and produce the trimmed payload.
  pub fn validate(&self) -> Result<UserData, FieldErrors> {
    let name = self.name.trim();
    let email = self.email.trim();

    let errors = FieldErrors {
      name: name.is_empty().then_some(FieldError::NameRequired),
      email: if email.is_empty() {
        Some(FieldError::EmailRequired)
      } else if !is_valid_email(email) {
        Some(FieldError::InvalidEmail)
      } else {
        None
      },
    };

    if !errors.is_empty() {
      return Err(errors);
    }

    Ok(UserData {
      name: name.to_string(),
      email: email.to_string(),
    })
  }
}
