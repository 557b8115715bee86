//! Player settings and preferences
//!
//! Persisted separately from the progress save in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::error::GameResult;
use crate::platform::Storage;

/// Longest accepted player name, in characters
pub const MAX_NAME_LEN: usize = 20;

/// Player settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Name shown on the leaderboard
    pub player_name: String,
    /// Music volume (0 - 100)
    pub music_volume: u8,
    /// Sound effects volume (0 - 100)
    pub sfx_volume: u8,
    pub muted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            player_name: String::new(),
            music_volume: 50,
            sfx_volume: 50,
            muted: false,
        }
    }
}

impl Settings {
    /// LocalStorage key
    pub const STORAGE_KEY: &'static str = "anordnen_settings";

    pub fn set_player_name(&mut self, name: &str) {
        self.player_name = name.trim().chars().take(MAX_NAME_LEN).collect();
    }

    pub fn set_music_volume(&mut self, volume: u8) {
        self.music_volume = volume.min(100);
    }

    pub fn set_sfx_volume(&mut self, volume: u8) {
        self.sfx_volume = volume.min(100);
    }

    /// Effective music gain (0.0 - 1.0, respects mute)
    pub fn music_gain(&self) -> f32 {
        if self.muted { 0.0 } else { self.music_volume.min(100) as f32 / 100.0 }
    }

    /// Effective sound effect gain (0.0 - 1.0, respects mute)
    pub fn sfx_gain(&self) -> f32 {
        if self.muted { 0.0 } else { self.sfx_volume.min(100) as f32 / 100.0 }
    }

    /// Read settings from a store, falling back to defaults
    pub fn load_from(storage: &dyn Storage) -> Self {
        match storage.get_item(Self::STORAGE_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<Settings>(&json) {
                Ok(mut settings) => {
                    settings.music_volume = settings.music_volume.min(100);
                    settings.sfx_volume = settings.sfx_volume.min(100);
                    log::info!("Loaded settings");
                    return settings;
                }
                Err(e) => log::warn!("Ignoring unreadable settings: {}", e),
            },
            Ok(None) => {}
            Err(e) => log::warn!("Failed to read settings: {}", e),
        }

        log::info!("Using default settings");
        Self::default()
    }

    pub fn save_to(&self, storage: &dyn Storage) -> GameResult<()> {
        let json = serde_json::to_string(self)?;
        storage.set_item(Self::STORAGE_KEY, &json)?;
        log::info!("Settings saved");
        Ok(())
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        match crate::platform::LocalStorage::open() {
            Ok(storage) => Self::load_from(&storage),
            Err(_) => Self::default(),
        }
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let result = crate::platform::LocalStorage::open().and_then(|storage| self.save_to(&storage));
        if let Err(e) = result {
            log::error!("Failed to save settings: {}", e);
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
