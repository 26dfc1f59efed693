//! Player preferences
//!
//! Persisted separately from stats in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::sim::GameMode;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Haptic feedback on landings and pickups
    pub vibration: bool,
    /// Steer by tilting the device instead of buttons
    pub tilt_enabled: bool,
    /// The device refused orientation access; tilt stays off until the user
    /// asks again
    pub tilt_denied: bool,
    /// Mode preselected in the menu
    pub last_mode: GameMode,

    // === Accessibility ===
    /// Reduced motion (no platform wobble)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            vibration: true,
            tilt_enabled: false,
            tilt_denied: false,
            last_mode: GameMode::Classic,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Apply the outcome of an orientation permission prompt.
    /// Returns whether tilt control is now active.
    pub fn resolve_tilt_permission(&mut self, granted: bool) -> bool {
        self.tilt_enabled = granted;
        self.tilt_denied = !granted;
        if !granted {
            log::info!("Tilt permission denied, using button controls");
        }
        self.tilt_enabled
    }

    pub fn disable_tilt(&mut self) {
        self.tilt_enabled = false;
    }

    pub fn toggle_vibration(&mut self) -> bool {
        self.vibration = !self.vibration;
        self.vibration
    }

    /// Effective platform wobble (respects reduced_motion)
    pub fn effective_wobble(&self) -> bool {
        !self.reduced_motion
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "perky_jump_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_denied_tilt_degrades_to_buttons() {
        let mut settings = Settings::default();
        assert!(!settings.resolve_tilt_permission(false));
        assert!(settings.tilt_denied);
        assert!(!settings.tilt_enabled);

        assert!(settings.resolve_tilt_permission(true));
        assert!(!settings.tilt_denied);
    }

    #[test]
    fn test_toggle_vibration() {
        let mut settings = Settings::default();
        assert!(!settings.toggle_vibration());
        assert!(settings.toggle_vibration());
    }

    #[test]
    fn test_old_saves_fill_missing_fields() {
        let settings: Settings = serde_json::from_str(r#"{ "vibration": false }"#).unwrap();
        assert!(!settings.vibration);
        assert_eq!(settings.last_mode, GameMode::Classic);
        assert!(settings.effective_wobble());
    }
}
