//! Haptic feedback
//!
//! Gameplay events map to short vibration pulses. Requests are
//! fire-and-forget; devices without a vibration motor simply ignore them.

use crate::sim::{EndReason, GameEvent};

/// Vibration patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HapticPulse {
    /// Player bounced off a platform
    Land,
    /// Bean picked up
    Bean,
    /// Round lost
    GameOver,
}

impl HapticPulse {
    /// Pattern in milliseconds (alternating on/off)
    pub fn pattern(&self) -> &'static [u32] {
        match self {
            HapticPulse::Land => &[50],
            HapticPulse::Bean => &[30],
            HapticPulse::GameOver => &[100, 50, 100],
        }
    }

    /// Pulse to play for a simulation event, if any
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::Landed { .. } => Some(HapticPulse::Land),
            GameEvent::BeanCollected { .. } => Some(HapticPulse::Bean),
            GameEvent::RoundEnded {
                reason: EndReason::Fell | EndReason::EnemyHit,
            } => Some(HapticPulse::GameOver),
            GameEvent::RoundEnded {
                reason: EndReason::TimeUp,
            }
            | GameEvent::PlatformBreaking { .. }
            | GameEvent::NewHeight { .. } => None,
        }
    }
}

/// Something that can vibrate
pub trait Haptics {
    fn pulse(&mut self, pulse: HapticPulse);
}

/// Discards every request (native builds, tests)
#[derive(Debug, Default)]
pub struct NullHaptics;

impl Haptics for NullHaptics {
    fn pulse(&mut self, _pulse: HapticPulse) {}
}

/// Records requests in order
#[derive(Debug, Default)]
pub struct RecordingHaptics {
    pub pulses: Vec<HapticPulse>,
}

impl Haptics for RecordingHaptics {
    fn pulse(&mut self, pulse: HapticPulse) {
        self.pulses.push(pulse);
    }
}

/// `navigator.vibrate` backed haptics
#[cfg(target_arch = "wasm32")]
pub struct WebHaptics {
    navigator: Option<web_sys::Navigator>,
}

#[cfg(target_arch = "wasm32")]
impl Default for WebHaptics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_arch = "wasm32")]
impl WebHaptics {
    pub fn new() -> Self {
        let navigator = web_sys::window().map(|w| w.navigator());
        if navigator.is_none() {
            log::warn!("No navigator - haptics disabled");
        }
        Self { navigator }
    }
}

#[cfg(target_arch = "wasm32")]
impl Haptics for WebHaptics {
    fn pulse(&mut self, pulse: HapticPulse) {
        if let Some(navigator) = &self.navigator {
            let pattern = js_sys::Array::new();
            for ms in pulse.pattern() {
                pattern.push(&wasm_bindgen::JsValue::from(*ms));
            }
            // Unsupported browsers return false; nothing to do about it
            let _ = navigator.vibrate_with_pattern(&pattern);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::PlatformKind;

    #[test]
    fn test_event_mapping() {
        assert_eq!(
            HapticPulse::for_event(&GameEvent::Landed {
                kind: PlatformKind::Bouncy
            }),
            Some(HapticPulse::Land)
        );
        assert_eq!(
            HapticPulse::for_event(&GameEvent::BeanCollected { total: 3 }),
            Some(HapticPulse::Bean)
        );
        assert_eq!(
            HapticPulse::for_event(&GameEvent::NewHeight { meters: 12 }),
            None
        );
        assert_eq!(
            HapticPulse::for_event(&GameEvent::RoundEnded {
                reason: EndReason::TimeUp
            }),
            None
        );
    }

    #[test]
    fn test_pattern_durations() {
        assert_eq!(HapticPulse::Land.pattern(), &[50]);
        assert_eq!(HapticPulse::Bean.pattern(), &[30]);
    }
}
