//! Storage keys, file names and database path resolution.
//!
//! # Invariants
//! - Default keys match the keys used by existing persisted data, so a
//!   store created by one build is readable by the next.

use std::path::PathBuf;

/// Key holding the JSON array of registrations.
pub const DEFAULT_REGISTRATIONS_KEY: &str = "comiccon_registrations_v1";
/// Key holding the id of the last created registration.
pub const DEFAULT_LAST_ID_KEY: &str = "comiccon_lastId";
/// File name used for JSON exports.
pub const EXPORT_FILE_NAME: &str = "comiccon_registrations.json";
/// Environment variable overriding the database location.
pub const DB_PATH_ENV: &str = "COMICCON_DB_PATH";
/// Database file name used under the temp directory when nothing is configured.
pub const DEFAULT_DB_FILE_NAME: &str = "comiccon.sqlite3";

/// Key names used by the registration store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub registrations: String,
    pub last_id: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            registrations: DEFAULT_REGISTRATIONS_KEY.to_string(),
            last_id: DEFAULT_LAST_ID_KEY.to_string(),
        }
    }
}

/// Resolves the database path.
///
/// Precedence: explicit non-blank path, then `COMICCON_DB_PATH`, then
/// `<temp dir>/comiccon.sqlite3`.
pub fn resolve_db_path(explicit: Option<&str>) -> PathBuf {
    let from_env = std::env::var(DB_PATH_ENV).ok();
    resolve_db_path_from(explicit, from_env.as_deref())
}

fn resolve_db_path_from(explicit: Option<&str>, from_env: Option<&str>) -> PathBuf {
    [explicit, from_env]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::{resolve_db_path_from, StorageKeys, DEFAULT_DB_FILE_NAME};
    use std::path::PathBuf;

    #[test]
    fn explicit_path_wins_over_env() {
        let path = resolve_db_path_from(Some("/data/con.db"), Some("/env/con.db"));
        assert_eq!(path, PathBuf::from("/data/con.db"));
    }

    #[test]
    fn blank_values_fall_through_to_temp_dir() {
        let path = resolve_db_path_from(Some("  "), Some(""));
        assert_eq!(path, std::env::temp_dir().join(DEFAULT_DB_FILE_NAME));

        let path = resolve_db_path_from(None, Some(" /env/con.db "));
        assert_eq!(path, PathBuf::from("/env/con.db"));
    }

    #[test]
    fn default_keys_match_persisted_layout() {
        let keys = StorageKeys::default();
        assert_eq!(keys.registrations, "comiccon_registrations_v1");
        assert_eq!(keys.last_id, "comiccon_lastId");
    }
}
