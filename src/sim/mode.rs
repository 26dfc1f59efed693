//! Game modes and the policy each one applies to a round

use serde::{Deserialize, Serialize};

use crate::consts::TIMED_MODE_SECONDS;

/// Mode selected from the menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    #[default]
    Classic,
    /// Fixed time budget, round ends when the countdown expires
    Timed,
    /// Classic rules on a dark background
    Night,
    /// Faster physics and enemies from the very first platform
    Extreme,
}

impl GameMode {
    pub const ALL: [GameMode; 4] = [
        GameMode::Classic,
        GameMode::Timed,
        GameMode::Night,
        GameMode::Extreme,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Classic => "classic",
            GameMode::Timed => "timed",
            GameMode::Night => "night",
            GameMode::Extreme => "extreme",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "classic" => Some(GameMode::Classic),
            "timed" | "time" => Some(GameMode::Timed),
            "night" => Some(GameMode::Night),
            "extreme" | "hard" => Some(GameMode::Extreme),
            _ => None,
        }
    }

    pub fn profile(&self) -> ModeProfile {
        match self {
            GameMode::Classic => ModeProfile::default(),
            GameMode::Timed => ModeProfile {
                time_limit_secs: Some(TIMED_MODE_SECONDS),
                ..Default::default()
            },
            GameMode::Night => ModeProfile {
                background: Background::Night,
                ..Default::default()
            },
            GameMode::Extreme => ModeProfile {
                speed_multiplier: 1.25,
                enemies: EnemyPolicy {
                    enabled: true,
                    min_height: 0,
                    chance_scale: 2.0,
                },
                ..Default::default()
            },
        }
    }
}

/// Background painted behind the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Background {
    /// Seasonal daytime palette
    #[default]
    Day,
    Night,
}

/// When and how often enemies appear
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyPolicy {
    pub enabled: bool,
    /// Height score (meters) before the first enemy may spawn
    pub min_height: u32,
    /// Multiplier applied to the per-tier spawn chance
    pub chance_scale: f32,
}

impl Default for EnemyPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            min_height: 200,
            chance_scale: 1.0,
        }
    }
}

/// Everything a mode changes about a round
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModeProfile {
    /// Time-scales the physics: speed and jump by `m`, gravity by `m²`
    pub speed_multiplier: f32,
    pub background: Background,
    pub enemies: EnemyPolicy,
    pub time_limit_secs: Option<u32>,
}

impl Default for ModeProfile {
    fn default() -> Self {
        Self {
            speed_multiplier: 1.0,
            background: Background::Day,
            enemies: EnemyPolicy::default(),
            time_limit_secs: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_tags() {
        for mode in GameMode::ALL {
            assert_eq!(GameMode::from_str(mode.as_str()), Some(mode));
        }
        assert_eq!(GameMode::from_str(" Extreme "), Some(GameMode::Extreme));
        assert_eq!(GameMode::from_str("zen"), None);
    }

    #[test]
    fn test_only_timed_has_a_clock() {
        for mode in GameMode::ALL {
            let limit = mode.profile().time_limit_secs;
            assert_eq!(limit.is_some(), mode == GameMode::Timed);
        }
        assert_eq!(GameMode::Timed.profile().time_limit_secs, Some(60));
    }

    #[test]
    fn test_extreme_is_faster_and_hostile_from_the_start() {
        let profile = GameMode::Extreme.profile();
        assert!(profile.speed_multiplier > 1.0);
        assert_eq!(profile.enemies.min_height, 0);
        assert!(profile.enemies.chance_scale > GameMode::Classic.profile().enemies.chance_scale);
    }

    #[test]
    fn test_night_changes_only_the_background() {
        let night = GameMode::Night.profile();
        let classic = GameMode::Classic.profile();
        assert_eq!(night.background, Background::Night);
        assert_eq!(night.speed_multiplier, classic.speed_multiplier);
        assert_eq!(night.enemies, classic.enemies);
    }
}
