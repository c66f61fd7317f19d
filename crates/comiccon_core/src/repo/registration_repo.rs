//! Registration collection store over a key-value backend.
//!
//! # Responsibility
//! - Load and replace the JSON-encoded registration collection.
//! - Track the id of the last created registration under its own key.
//!
//! # Invariants
//! - `load` never fails on malformed data; it logs and returns empty.
//! - `append` writes the collection and the last id atomically.
//! - Collection order is exactly the persisted order.

use crate::config::StorageKeys;
use crate::model::registration::{Registration, RegistrationId};
use crate::repo::kv_repo::KeyValueStore;
use crate::repo::RepoResult;
use log::{debug, info, warn};

/// Persistence contract for the registration collection.
pub trait RegistrationStore {
    /// Returns the persisted collection, empty when absent or corrupt.
    fn load(&self) -> RepoResult<Vec<Registration>>;
    /// Replaces the whole persisted collection.
    fn save(&self, registrations: &[Registration]) -> RepoResult<()>;
    /// Appends one record and records it as the last created id.
    fn append(&self, registration: &Registration) -> RepoResult<()>;
    /// Returns the last created id, if one was recorded and is readable.
    fn last_id(&self) -> RepoResult<Option<RegistrationId>>;

    /// Replaces the persisted collection with an empty one.
    fn clear(&self) -> RepoResult<()> {
        self.save(&[])
    }
}

/// `RegistrationStore` storing JSON values in a `KeyValueStore`.
pub struct KvRegistrationStore<K: KeyValueStore> {
    kv: K,
    keys: StorageKeys,
}

impl<K: KeyValueStore> KvRegistrationStore<K> {
    /// Creates a store using the default storage keys.
    pub fn new(kv: K) -> Self {
        Self::with_keys(kv, StorageKeys::default())
    }

    pub fn with_keys(kv: K, keys: StorageKeys) -> Self {
        Self { kv, keys }
    }

    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }
}

impl<K: KeyValueStore> RegistrationStore for KvRegistrationStore<K> {
    fn load(&self) -> RepoResult<Vec<Registration>> {
        let Some(raw) = self.kv.get_item(&self.keys.registrations)? else {
            debug!(
                "event=registrations_load module=repo status=empty reason=absent key={}",
                self.keys.registrations
            );
            return Ok(Vec::new());
        };

        Ok(decode_registrations(&raw, &self.keys.registrations))
    }

    fn save(&self, registrations: &[Registration]) -> RepoResult<()> {
        let encoded = serde_json::to_string(registrations)?;
        self.kv.set_item(&self.keys.registrations, &encoded)?;
        info!(
            "event=registrations_save module=repo status=ok count={}",
            registrations.len()
        );
        Ok(())
    }

    fn append(&self, registration: &Registration) -> RepoResult<()> {
        let mut registrations = self.load()?;
        registrations.push(registration.clone());

        let encoded = serde_json::to_string(&registrations)?;
        let last_id = registration.id.to_string();
        self.kv.set_items(&[
            (self.keys.registrations.as_str(), encoded.as_str()),
            (self.keys.last_id.as_str(), last_id.as_str()),
        ])?;
        info!(
            "event=registration_append module=repo status=ok id={} count={}",
            registration.id,
            registrations.len()
        );
        Ok(())
    }

    fn last_id(&self) -> RepoResult<Option<RegistrationId>> {
        let Some(raw) = self.kv.get_item(&self.keys.last_id)? else {
            return Ok(None);
        };

        match raw.trim().parse::<RegistrationId>() {
            Ok(id) => Ok(Some(id)),
            Err(_) => {
                warn!(
                    "event=last_id_load module=repo status=recovered reason=unparsable key={}",
                    self.keys.last_id
                );
                Ok(None)
            }
        }
    }
}

fn decode_registrations(raw: &str, key: &str) -> Vec<Registration> {
    // `null` is what an explicitly emptied value looks like; treat it as absent.
    match serde_json::from_str::<Option<Vec<Registration>>>(raw) {
        Ok(registrations) => registrations.unwrap_or_default(),
        Err(err) => {
            // Only position/category: the payload may contain attendee data.
            warn!(
                "event=registrations_load module=repo status=recovered reason=malformed_json key={} category={:?} line={} column={}",
                key,
                err.classify(),
                err.line(),
                err.column()
            );
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::decode_registrations;

    #[test]
    fn decode_treats_null_and_garbage_as_empty() {
        assert!(decode_registrations("null", "k").is_empty());
        assert!(decode_registrations("{not json", "k").is_empty());
        assert!(decode_registrations("{\"id\":1}", "k").is_empty());
        assert!(decode_registrations("[]", "k").is_empty());
    }

    #[test]
    fn decode_fills_missing_optional_fields() {
        let raw = r#"[{
            "id": 7,
            "attendeeName": "Al Lee",
            "email": "al@example.com",
            "sessionTitle": "anime-evolution",
            "createdAt": "2024-07-25T17:00:00.000Z"
        }]"#;
        let decoded = decode_registrations(raw, "k");
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].id, 7);
        assert_eq!(decoded[0].time_slot, "");
        assert_eq!(decoded[0].fandom_category, "");
        assert_eq!(decoded[0].cosplay_notes, "");
    }
}
