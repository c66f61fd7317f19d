//! Registration domain model.
//!
//! # Responsibility
//! - Define the persisted registration record and raw form input.
//! - Own field-level validation and the fixed session/time-slot catalog.
//!
//! # Invariants
//! - Every record is identified by a unique, never reused `RegistrationId`.
//! - Records are never updated in place; collections are replaced whole.

pub mod catalog;
pub mod registration;
