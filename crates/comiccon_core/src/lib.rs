//! Core registration logic for the conference schedule.
//! This crate is the single source of truth for registration invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{resolve_db_path, StorageKeys, EXPORT_FILE_NAME};
pub use logging::{
    default_log_level, init_file_logging, init_logging, logging_status, LogTarget, LoggingError,
};
pub use model::catalog::{humanize, Session, TimeSlot};
pub use model::registration::{
    Field, FieldError, Registration, RegistrationId, RegistrationInput, ValidatedRegistration,
    ValidationErrors,
};
pub use repo::kv_repo::{KeyValueStore, SqliteKeyValueStore};
pub use repo::registration_repo::{KvRegistrationStore, RegistrationStore};
pub use repo::{RepoError, RepoResult};
pub use service::registration_service::{
    check_conflict, register, register_at, validate, RegisterError, RegistrationService,
    CONFLICT_MESSAGE,
};
pub use service::schedule_service::{
    clear, export_json, filter_by_fandom, remove, render_rows, render_table, sort_by_time,
    ScheduleRow, ScheduleView, ViewError,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
