//! Save/load of player progress
//!
//! Features:
//! - Versioned flat JSON save (progress fields + `version` + `lastSaved`)
//! - Migration of older saves, field by field
//! - Corruption detection and recovery to a fresh state

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::DEFAULT_STICKS;
use crate::error::{GameError, GameResult};
use crate::platform::{Storage, now_ms};
use crate::progression::ProgressState;

/// Current save schema
pub const SAVE_VERSION: u32 = 3;

/// Storage key of the save
pub const SAVE_KEY: &str = "anordnen_save";

/// Diamond multiplier granted per prestige level by pre-v3 saves
const LEGACY_DIAMOND_BONUS: f64 = 0.25;

/// What is written to storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveData {
    #[serde(flatten)]
    pub progress: ProgressState,
    pub version: u32,
    /// Unix time in ms of the last write
    pub last_saved: Option<f64>,
}

impl SaveData {
    pub fn new(progress: ProgressState) -> Self {
        Self {
            progress,
            version: SAVE_VERSION,
            last_saved: None,
        }
    }
}

/// Bring a parsed save of any version up to [`SAVE_VERSION`].
///
/// Missing fields take their initial value, including `version` itself.
pub fn migrate(value: Value) -> GameResult<SaveData> {
    let Value::Object(map) = value else {
        return Err(GameError::Storage("save is not a JSON object".into()));
    };

    let version = match map.get("version") {
        None | Some(Value::Null) => SAVE_VERSION,
        Some(v) => v.as_u64().unwrap_or(0) as u32,
    };
    let last_saved = map.get("lastSaved").and_then(Value::as_f64);
    let mut progress: ProgressState = serde_json::from_value(Value::Object(map))?;

    if version < 2 {
        // v1 started with stick 1 only; later versions own the default seven
        if progress.owned_sticks == [1] {
            progress.owned_sticks = DEFAULT_STICKS.to_vec();
        } else {
            progress.owned_sticks.extend(DEFAULT_STICKS);
        }
        log::info!("Migrated save v{} -> v2", version);
    }
    if version < 3 {
        progress.diamond_multiplier = 1.0 + progress.prestige_level as f64 * LEGACY_DIAMOND_BONUS;
        log::info!("Migrated save -> v3 (diamond multiplier {:.2})", progress.diamond_multiplier);
    }

    progress.normalize();

    Ok(SaveData {
        progress,
        version: SAVE_VERSION,
        last_saved,
    })
}

/// Progress store over any key/value backend
pub struct GameStore {
    storage: Box<dyn Storage>,
    key: String,
}

impl GameStore {
    pub fn new(storage: Box<dyn Storage>) -> Self {
        Self::with_key(storage, SAVE_KEY)
    }

    pub fn with_key(storage: Box<dyn Storage>, key: &str) -> Self {
        Self {
            storage,
            key: key.to_string(),
        }
    }

    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    /// Read the save. Missing or unreadable saves yield the initial state.
    pub fn load(&self) -> ProgressState {
        let raw = match self.storage.get_item(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                log::info!("No save found, starting fresh");
                return ProgressState::new();
            }
            Err(e) => {
                log::error!("Failed to read save: {}", e);
                return ProgressState::new();
            }
        };

        let migrated = serde_json::from_str::<Value>(&raw).map_err(GameError::from).and_then(migrate);
        match migrated {
            Ok(save) => {
                // Persist any migration straight away
                if let Err(e) = self.save(&save.progress) {
                    log::error!("Failed to write migrated save: {}", e);
                }
                log::info!("Loaded save: level {}, {} diamonds", save.progress.level, save.progress.diamonds);
                save.progress
            }
            Err(e) => {
                log::warn!("Corrupt save ({}), starting fresh", e);
                ProgressState::new()
            }
        }
    }

    pub fn save(&self, progress: &ProgressState) -> GameResult<()> {
        let save = SaveData {
            progress: progress.clone(),
            version: SAVE_VERSION,
            last_saved: Some(now_ms()),
        };
        let json = serde_json::to_string(&save)?;
        self.storage.set_item(&self.key, &json)
    }

    /// Throw everything away and save the initial state
    pub fn full_reset(&self) -> GameResult<ProgressState> {
        let fresh = ProgressState::new();
        self.save(&fresh)?;
        log::info!("Progress fully reset");
        Ok(fresh)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::platform::MemoryStorage;

    fn store() -> (GameStore, MemoryStorage) {
        let storage = MemoryStorage::new();
        (GameStore::new(Box::new(storage.clone())), storage)
    }

    #[test]
    fn test_missing_save_is_initial_state() {
        let (store, storage) = store();
        assert_eq!(store.load(), ProgressState::new());
        assert!(storage.is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let (store, storage) = store();
        let mut progress = ProgressState::new();
        progress.level = 4;
        progress.diamonds = 77;
        progress.add_owned(6);
        store.save(&progress).unwrap();

        let raw = storage.get_item(SAVE_KEY).unwrap().unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["version"], 3);
        assert!(value["lastSaved"].is_f64());
        assert_eq!(value["ownedSticks"], json!([2, 3, 5, 6, 7, 10, 11, 13]));

        assert_eq!(store.load(), progress);
    }

    #[test]
    fn test_corrupt_save_falls_back() {
        let (store, storage) = store();
        storage.set_item(SAVE_KEY, "{ not json").unwrap();
        assert_eq!(store.load(), ProgressState::new());

        storage.set_item(SAVE_KEY, "[1, 2]").unwrap();
        assert_eq!(store.load(), ProgressState::new());

        storage.set_item(SAVE_KEY, r#"{ "level": "high" }"#).unwrap();
        assert_eq!(store.load(), ProgressState::new());
    }

    #[test]
    fn test_v1_save_with_only_stick_one_gets_defaults() {
        let save = migrate(json!({ "version": 1, "ownedSticks": [1], "diamonds": 12 })).unwrap();
        assert_eq!(save.version, 3);
        assert_eq!(save.progress.owned_sticks, DEFAULT_STICKS);
        assert_eq!(save.progress.diamonds, 12);
        assert_eq!(save.progress.diamond_multiplier, 1.0);
    }

    #[test]
    fn test_v1_save_merges_defaults() {
        let save = migrate(json!({ "version": 1, "ownedSticks": [1, 4, 3], "prestigeLevel": 2 })).unwrap();
        assert_eq!(save.progress.owned_sticks, vec![1, 2, 3, 4, 5, 7, 10, 11, 13]);
        assert_eq!(save.progress.diamond_multiplier, 1.5);
    }

    #[test]
    fn test_v2_save_gets_diamond_multiplier() {
        let save = migrate(json!({
            "version": 2,
            "ownedSticks": [2, 3, 5, 7, 10, 11, 13],
            "prestigeLevel": 1,
            "xpMultiplier": 1.25,
            "diamondMultiplier": 9.0
        }))
        .unwrap();
        assert_eq!(save.progress.diamond_multiplier, 1.25);
        assert_eq!(save.progress.xp_multiplier, 1.25);
    }

    #[test]
    fn test_missing_fields_take_initial_values() {
        let save = migrate(json!({ "version": 3, "level": 9, "lastSaved": 1234.0 })).unwrap();
        assert_eq!(save.progress.level, 9);
        assert_eq!(save.progress.owned_sticks, DEFAULT_STICKS);
        assert_eq!(save.progress.xp_multiplier, 1.0);
        assert_eq!(save.last_saved, Some(1234.0));
    }

    #[test]
    fn test_load_writes_migrated_save_back() {
        let (store, storage) = store();
        storage.set_item(SAVE_KEY, r#"{ "version": 1, "ownedSticks": [1] }"#).unwrap();
        let progress = store.load();
        assert_eq!(progress.owned_sticks, DEFAULT_STICKS);

        let raw = storage.get_item(SAVE_KEY).unwrap().unwrap();
        assert!(raw.contains("\"version\":3"));
    }

    #[test]
    fn test_full_reset() {
        let (store, _storage) = store();
        let mut progress = ProgressState::new();
        progress.diamonds = 500;
        store.save(&progress).unwrap();

        assert_eq!(store.full_reset().unwrap(), ProgressState::new());
        assert_eq!(store.load(), ProgressState::new());
    }
}
