//! Player preferences
//!
//! Persisted as JSON through the key/value store, separately from best scores.

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::persistence::{KeyValueStore, SETTINGS_KEY};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Preferred player count for the variants that offer a choice
    pub players: u8,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    pub muted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            players: 1,
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,
            muted: false,
        }
    }
}

impl Settings {
    /// Effective sound effect gain
    pub fn sfx_gain(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
        }
    }

    /// Effective music gain
    pub fn music_gain(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * self.music_volume).clamp(0.0, 1.0)
        }
    }

    /// Clamp values a hand-edited store might carry
    fn sanitized(mut self) -> Self {
        self.players = self.players.clamp(1, 2);
        for v in [&mut self.master_volume, &mut self.sfx_volume, &mut self.music_volume] {
            *v = if v.is_finite() { v.clamp(0.0, 1.0) } else { 1.0 };
        }
        self
    }

    /// Load settings; anything unreadable yields the defaults
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match store.get(SETTINGS_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<Settings>(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings");
                    settings.sanitized()
                }
                Err(err) => {
                    log::warn!("Ignoring stored settings: {}", err);
                    Self::default()
                }
            },
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(err) => {
                log::warn!("Settings unavailable: {}", err);
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), StoreError> {
        let json = serde_json::to_string(self).map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        store.set(SETTINGS_KEY, &json)?;
        log::info!("Settings saved");
        Ok(())
    }
}
