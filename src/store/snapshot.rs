//! SnapshotStore: typed access to the funnel's persisted keys.
//!
//! Every read tolerates absent, `"undefined"`/`"null"`-stringified, and
//! malformed values: they come back as a cache miss (and the bad value is
//! removed), never as an error. Write failures are logged and swallowed.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::attribution::{LandingAttribution, Variant};
use crate::questionnaire::AnswerSet;
use crate::submission::contact::split_full_name;

use super::traits::KeyValueStore;

/// Storage keys.
pub mod keys {
    /// Serialized `AnswerSet`.
    pub const QUESTIONNAIRE: &str = "questionnaireData";
    /// Serialized `InitialContact` captured on an earlier funnel page.
    pub const INITIAL_CONTACT: &str = "initialFormData";
    /// Resolved landing variant tag.
    pub const LANDING_VARIANT: &str = "sba_landing_variant";
    /// Resolved landing path.
    pub const LANDING_PATH: &str = "sba_landing_path";
}

/// Snapshots at or above this size are not written.
pub const MAX_SNAPSHOT_BYTES: usize = 5 * 1024 * 1024;

/// Contact details captured before the questionnaire (e.g. an opt-in form).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InitialContact {
    pub full_name: String,
    pub email: String,
    pub phone: String,
}

impl InitialContact {
    /// Split `fullName` on the first space into (first, rest).
    pub fn split_name(&self) -> (String, String) {
        split_full_name(&self.full_name)
    }
}

/// Outcome of reading a persisted value.
#[derive(Debug, Clone, PartialEq)]
pub enum Restored<T> {
    /// Nothing stored under the key.
    Missing,
    /// A valid value.
    Loaded(T),
    /// A corrupt value was found and removed.
    Discarded,
    /// The backend could not be read at all.
    Unavailable,
}

impl<T> Restored<T> {
    pub fn loaded(self) -> Option<T> {
        match self {
            Self::Loaded(v) => Some(v),
            _ => None,
        }
    }
}

/// Typed facade over a `KeyValueStore`.
#[derive(Clone)]
pub struct SnapshotStore {
    store: Arc<dyn KeyValueStore>,
}

impl SnapshotStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn load_answers(&self) -> Restored<AnswerSet> {
        self.load_object(keys::QUESTIONNAIRE)
    }

    /// Persist the answer set. Oversized snapshots are skipped.
    pub fn save_answers(&self, answers: &AnswerSet) {
        match serde_json::to_string(answers) {
            Ok(json) if json.len() >= MAX_SNAPSHOT_BYTES => {
                warn!(bytes = json.len(), "Answer snapshot too large to persist");
            }
            Ok(json) => self.write(keys::QUESTIONNAIRE, &json),
            Err(e) => warn!("Failed to serialize answer snapshot: {}", e),
        }
    }

    pub fn clear_answers(&self) {
        self.delete(keys::QUESTIONNAIRE);
    }

    pub fn load_initial_contact(&self) -> Restored<InitialContact> {
        self.load_object(keys::INITIAL_CONTACT)
    }

    pub fn save_initial_contact(&self, contact: &InitialContact) {
        match serde_json::to_string(contact) {
            Ok(json) => self.write(keys::INITIAL_CONTACT, &json),
            Err(e) => warn!("Failed to serialize initial contact: {}", e),
        }
    }

    pub fn clear_initial_contact(&self) {
        self.delete(keys::INITIAL_CONTACT);
    }

    /// Persisted landing attribution; both keys must be present and the tag known.
    pub fn load_landing(&self) -> Option<LandingAttribution> {
        read_landing(self.store.as_ref())
    }

    pub fn save_landing(&self, landing: &LandingAttribution) {
        self.write(keys::LANDING_VARIANT, landing.variant.as_str());
        self.write(keys::LANDING_PATH, &landing.path);
    }

    fn load_object<T: DeserializeOwned>(&self, key: &str) -> Restored<T> {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Restored::Missing,
            Err(e) => {
                warn!(key, "Failed to read persisted value: {}", e);
                return Restored::Unavailable;
            }
        };

        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == "undefined" || trimmed == "null" {
            debug!(key, "Discarding placeholder persisted value");
            self.delete(key);
            return Restored::Discarded;
        }

        let parsed = serde_json::from_str::<serde_json::Value>(trimmed)
            .map_err(|e| e.to_string())
            .and_then(|value| {
                if value.is_object() {
                    serde_json::from_value::<T>(value).map_err(|e| e.to_string())
                } else {
                    Err("not a JSON object".to_string())
                }
            });

        match parsed {
            Ok(value) => Restored::Loaded(value),
            Err(reason) => {
                warn!(key, reason = %reason, "Discarding corrupt persisted value");
                self.delete(key);
                Restored::Discarded
            }
        }
    }

    fn write(&self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value) {
            warn!(key, "Failed to persist value: {}", e);
        }
    }

    fn delete(&self, key: &str) {
        if let Err(e) = self.store.remove(key) {
            warn!(key, "Failed to remove persisted value: {}", e);
        }
    }
}

/// Read a `(variant, path)` pair from any store using the landing keys.
pub(crate) fn read_landing(store: &dyn KeyValueStore) -> Option<LandingAttribution> {
    let variant = store.get(keys::LANDING_VARIANT).ok().flatten()?;
    let path = store.get(keys::LANDING_PATH).ok().flatten()?;
    if path.is_empty() {
        return None;
    }
    let variant = Variant::parse(&variant)?;
    Some(LandingAttribution { variant, path })
}
