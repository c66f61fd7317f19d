//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into registration use-cases.
//! - Provide pure sort/filter/export views for the schedule.

pub mod registration_service;
pub mod schedule_service;
