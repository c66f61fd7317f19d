//! Registration use-case service.
//!
//! # Responsibility
//! - Validate form input and reject session/time-slot conflicts.
//! - Build new records with fresh ids and hand them to the store.
//!
//! # Invariants
//! - A rejected submission (invalid or conflicting) never touches the store.
//! - New ids are strictly greater than every id already known to the store,
//!   except a corrupt last id that would overflow.
//! - Records are removed by replacing the whole collection.

use crate::model::registration::{
    Registration, RegistrationId, RegistrationInput, ValidatedRegistration, ValidationErrors,
};
use crate::repo::registration_repo::RegistrationStore;
use crate::repo::{RepoError, RepoResult};
use crate::service::schedule_service::remove;
use chrono::{DateTime, Utc};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// User-facing message for a session/time-slot conflict.
pub const CONFLICT_MESSAGE: &str = "Time slot conflict: another attendee registered that session/time. Choose a different time or session.";

/// Error returned when a registration cannot be created.
#[derive(Debug)]
pub enum RegisterError {
    /// One or more form fields failed validation.
    Invalid(ValidationErrors),
    /// Another record already holds this session and time slot.
    Conflict {
        session_title: String,
        time_slot: String,
    },
    /// A stored record already holds the largest representable id.
    IdSpaceExhausted,
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for RegisterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(errors) => write!(f, "invalid registration: {errors}"),
            Self::Conflict { .. } => f.write_str(CONFLICT_MESSAGE),
            Self::IdSpaceExhausted => f.write_str("no registration id left above stored ids"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RegisterError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(errors) => Some(errors),
            Self::Conflict { .. } | Self::IdSpaceExhausted => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<ValidationErrors> for RegisterError {
    fn from(value: ValidationErrors) -> Self {
        Self::Invalid(value)
    }
}

impl From<RepoError> for RegisterError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Validates raw form input. See `RegistrationInput::validate`.
pub fn validate(input: &RegistrationInput) -> Result<ValidatedRegistration, ValidationErrors> {
    input.validate()
}

/// Returns whether `existing` already holds the session/time-slot pair.
///
/// Always `false` when either value is empty.
pub fn check_conflict(session_title: &str, time_slot: &str, existing: &[Registration]) -> bool {
    existing
        .iter()
        .any(|registration| registration.occupies(session_title, time_slot))
}

/// Returns a fresh id: the current epoch millisecond, bumped past every
/// known id so that two registrations in the same millisecond never collide.
///
/// A last id that cannot be bumped without overflow is treated as corrupt
/// and ignored. Returns `None` only when a stored record already holds
/// `i64::MAX`.
pub fn next_registration_id(
    now_ms: i64,
    existing: &[Registration],
    last_id: Option<RegistrationId>,
) -> Option<RegistrationId> {
    let bump_past = |highest: Option<RegistrationId>| match highest {
        Some(highest) if highest >= now_ms => highest.checked_add(1),
        _ => Some(now_ms),
    };

    let highest_stored = existing.iter().map(|registration| registration.id).max();
    bump_past(highest_stored.max(last_id)).or_else(|| {
        warn!("event=registration_id module=service status=recovered reason=last_id_overflow");
        bump_past(highest_stored)
    })
}

/// Validates input, checks for conflicts and builds a new record stamped now.
///
/// The returned record is not persisted.
pub fn register(
    input: &RegistrationInput,
    existing: &[Registration],
) -> Result<Registration, RegisterError> {
    register_at(input, existing, None, Utc::now())
}

/// Deterministic form of [`register`] with an explicit clock and last id.
pub fn register_at(
    input: &RegistrationInput,
    existing: &[Registration],
    last_id: Option<RegistrationId>,
    now: DateTime<Utc>,
) -> Result<Registration, RegisterError> {
    let fields = validate(input)?;

    if check_conflict(&fields.session_title, &fields.time_slot, existing) {
        return Err(RegisterError::Conflict {
            session_title: fields.session_title,
            time_slot: fields.time_slot,
        });
    }

    let id = next_registration_id(now.timestamp_millis(), existing, last_id)
        .ok_or(RegisterError::IdSpaceExhausted)?;
    Ok(Registration::from_validated(id, fields, now))
}

/// Registration service facade over a store implementation.
pub struct RegistrationService<S: RegistrationStore> {
    store: S,
}

impl<S: RegistrationStore> RegistrationService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validates, checks conflicts against the persisted collection and
    /// appends the new record.
    ///
    /// # Errors
    /// - `Invalid` / `Conflict` leave the store unchanged.
    pub fn submit(&self, input: &RegistrationInput) -> Result<Registration, RegisterError> {
        self.submit_at(input, Utc::now())
    }

    /// [`submit`](Self::submit) with an explicit clock.
    pub fn submit_at(
        &self,
        input: &RegistrationInput,
        now: DateTime<Utc>,
    ) -> Result<Registration, RegisterError> {
        let existing = self.store.load()?;
        let last_id = self.store.last_id()?;

        let registration = match register_at(input, &existing, last_id, now) {
            Ok(registration) => registration,
            Err(err) => {
                let status = match &err {
                    RegisterError::Invalid(errors) => format!("invalid fields={}", errors.len()),
                    RegisterError::Conflict { .. } => "conflict".to_string(),
                    RegisterError::IdSpaceExhausted | RegisterError::Repo(_) => {
                        "error".to_string()
                    }
                };
                info!("event=registration_submit module=service status={status}");
                return Err(err);
            }
        };

        self.store.append(&registration)?;
        info!(
            "event=registration_submit module=service status=ok id={}",
            registration.id
        );
        Ok(registration)
    }

    /// Returns the persisted collection in persisted order.
    pub fn list(&self) -> RepoResult<Vec<Registration>> {
        self.store.load()
    }

    /// Removes the first stored record equal to `target`, keeping the order
    /// of the rest.
    ///
    /// Matches on the whole record, so entries sharing an id stay distinct.
    /// Returns `false` when no such record exists; the store is then untouched.
    pub fn remove_record(&self, target: &Registration) -> RepoResult<bool> {
        let registrations = self.store.load()?;
        let Some(index) = registrations.iter().position(|r| r == target) else {
            return Ok(false);
        };

        self.store.save(&remove(&registrations, index))?;
        info!(
            "event=registration_remove module=service status=ok id={} position={}",
            target.id, index
        );
        Ok(true)
    }

    /// Persists an empty collection.
    pub fn clear_all(&self) -> RepoResult<()> {
        self.store.clear()?;
        info!("event=registrations_clear module=service status=ok");
        Ok(())
    }
}
