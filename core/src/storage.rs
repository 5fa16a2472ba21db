use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::*;

/// Gives a persisted type its fixed key in a key-value store.
pub trait StorageKey {
    const KEY: &'static str;
}

/// Minimal string key-value backend, e.g. browser local storage or a file.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_owned(), value);
    }
}

/// What survives between sessions: the ledger and the mute flag. Round data is never stored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    #[serde(default)]
    pub is_muted: bool,
    #[serde(flatten)]
    pub ledger: Ledger,
}

impl StorageKey for PersistedState {
    const KEY: &'static str = "mines-game-storage";
}

impl PersistedState {
    pub fn new(settings: &EngineSettings) -> Self {
        Self {
            is_muted: false,
            ledger: Ledger::new(settings.starting_balance),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|err| GameError::Storage(err.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|err| GameError::Storage(err.to_string()))
    }

    /// Reads the stored snapshot, falling back to fresh defaults when absent or unreadable.
    pub fn load(store: &impl KeyValueStore, settings: &EngineSettings) -> Self {
        let Some(json) = store.get(Self::KEY) else {
            log::debug!("No stored snapshot under {}, starting fresh", Self::KEY);
            return Self::new(settings);
        };
        match Self::from_json(&json) {
            Ok(state) => state,
            Err(err) => {
                log::warn!("Ignoring unreadable snapshot under {}: {}", Self::KEY, err);
                Self::new(settings)
            }
        }
    }

    pub fn save(&self, store: &mut impl KeyValueStore) -> Result<()> {
        store.set(Self::KEY, self.to_json()?);
        Ok(())
    }
}
