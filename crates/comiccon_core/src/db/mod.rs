//! Connection setup for the `kv_items` table that holds every persisted
//! registration value.
//!
//! One database file per installation. It holds a single table of string
//! keys and string values, written whole on each save. [`open_db`] and
//! [`open_db_in_memory`] are the only ways in. Both leave the table
//! migrated to [`migrations::latest_version`].
//!
//! A file whose `user_version` is ahead of this build is refused rather
//! than read, since its value layout is unknown.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while opening or migrating the registration database.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The file was written by a newer build.
    SchemaTooNew { found: u32, supported: u32 },
}

impl DbError {
    /// Stable code used in `event=db_open` log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Sqlite(_) => "db_sqlite_failed",
            Self::SchemaTooNew { .. } => "db_schema_too_new",
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "registration database is at schema {found}, this build reads up to {supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
