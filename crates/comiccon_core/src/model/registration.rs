//! Registration record and form input model.
//!
//! # Responsibility
//! - Define the persisted record shape (camelCase JSON field names).
//! - Validate raw form input into trimmed, accepted fields.
//!
//! # Invariants
//! - `id` is unique across the collection lifetime and never reused.
//! - `created_at` is set once at creation and never changes.
//! - Validation reports every failing field, not only the first.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

const MIN_NAME_CHARS: usize = 2;

/// Record identifier, epoch milliseconds at creation time.
pub type RegistrationId = i64;

/// One persisted registration entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub id: RegistrationId,
    pub attendee_name: String,
    pub email: String,
    /// Session key, see `catalog::Session`.
    pub session_title: String,
    /// Time-slot key, see `catalog::TimeSlot`. Empty when not chosen.
    #[serde(default)]
    pub time_slot: String,
    #[serde(default)]
    pub fandom_category: String,
    #[serde(default)]
    pub cosplay_notes: String,
    pub created_at: DateTime<Utc>,
}

impl Registration {
    /// Builds a record from accepted fields with caller-provided identity.
    pub fn from_validated(
        id: RegistrationId,
        fields: ValidatedRegistration,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            attendee_name: fields.attendee_name,
            email: fields.email,
            session_title: fields.session_title,
            time_slot: fields.time_slot,
            fandom_category: fields.fandom_category,
            cosplay_notes: fields.cosplay_notes,
            created_at,
        }
    }

    /// Whether this record occupies the given non-empty session/slot pair.
    pub fn occupies(&self, session_title: &str, time_slot: &str) -> bool {
        !session_title.is_empty()
            && !time_slot.is_empty()
            && self.session_title == session_title
            && self.time_slot == time_slot
    }
}

/// Raw registration form values, exactly as entered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationInput {
    pub attendee_name: String,
    pub email: String,
    pub session_title: String,
    pub time_slot: String,
    pub fandom_category: String,
    pub cosplay_notes: String,
}

impl RegistrationInput {
    /// Validates all form fields and returns trimmed values.
    ///
    /// # Errors
    /// - Returns every failing field (name, email, session) together.
    pub fn validate(&self) -> Result<ValidatedRegistration, ValidationErrors> {
        let attendee_name = self.attendee_name.trim();
        let email = self.email.trim();
        let session_title = self.session_title.trim();

        let mut errors = ValidationErrors::default();
        if attendee_name.chars().count() < MIN_NAME_CHARS {
            errors.push(Field::AttendeeName, "Please enter your name (2+ chars)");
        }
        if email.is_empty() {
            errors.push(Field::Email, "Please enter your email");
        } else if !is_valid_email(email) {
            errors.push(Field::Email, "Please enter a valid email");
        }
        if session_title.is_empty() {
            errors.push(Field::SessionTitle, "Please select a session");
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ValidatedRegistration {
            attendee_name: attendee_name.to_string(),
            email: email.to_string(),
            session_title: session_title.to_string(),
            time_slot: self.time_slot.trim().to_string(),
            fandom_category: self.fandom_category.trim().to_string(),
            cosplay_notes: self.cosplay_notes.trim().to_string(),
        })
    }
}

/// Form fields after successful validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRegistration {
    pub attendee_name: String,
    pub email: String,
    pub session_title: String,
    pub time_slot: String,
    pub fandom_category: String,
    pub cosplay_notes: String,
}

/// Basic `local@domain.tld` shape check.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Form field that can fail validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Field {
    AttendeeName,
    Email,
    SessionTitle,
}

impl Field {
    /// Field name as used in persisted JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AttendeeName => "attendeeName",
            Self::Email => "email",
            Self::SessionTitle => "sessionTitle",
        }
    }
}

/// One field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: &'static str,
}

/// Set of field-level validation failures, in form order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    fn push(&mut self, field: Field, message: &'static str) {
        self.errors.push(FieldError { field, message });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// Returns the message reported for `field`, if it failed.
    pub fn message_for(&self, field: Field) -> Option<&'static str> {
        self.errors
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.message)
    }

    pub fn has(&self, field: Field) -> bool {
        self.message_for(field).is_some()
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for error in &self.errors {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", error.field.as_str(), error.message)?;
            first = false;
        }
        Ok(())
    }
}

impl Error for ValidationErrors {}

#[cfg(test)]
mod tests {
    use super::is_valid_email;

    #[test]
    fn email_shape_accepts_minimal_address() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("al.lee+con@example.com"));
    }

    #[test]
    fn email_shape_rejects_missing_parts_and_whitespace() {
        assert!(!is_valid_email("al@example"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("al lee@example.com"));
        assert!(!is_valid_email("al@@example.com"));
    }
}
