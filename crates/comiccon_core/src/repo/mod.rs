//! Persistence layer for registrations.
//!
//! # Responsibility
//! - Define a key-value contract with browser local-storage semantics.
//! - Layer the registration collection (load/append/replace/clear) on top.
//!
//! # Invariants
//! - Collection writes replace the whole persisted value in one write.
//! - Malformed persisted values are recovered as empty, never surfaced.
//! - Only transport failures and encoding failures become `RepoError`.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod kv_repo;
pub mod registration_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for key-value and registration persistence.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Serialize(serde_json::Error),
    /// Connection schema does not match this binary; open it via `db::open_db`.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialize(err) => write!(f, "failed to encode registrations: {err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialize(err) => Some(err),
            Self::UninitializedConnection { .. } => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}
