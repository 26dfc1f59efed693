//! Data-driven game balance
//!
//! Every physics and generation constant used by the simulation lives in
//! [`Tuning`]. Values are per fixed tick (see [`crate::consts::SIM_HZ`]).
//! Hosts may override the defaults with a JSON document; missing fields keep
//! their default.

use serde::{Deserialize, Serialize};

use crate::consts::{VIEWPORT_HEIGHT, VIEWPORT_WIDTH};
use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Viewport ===
    pub viewport_width: f32,
    pub viewport_height: f32,

    // === Player ===
    pub player_width: f32,
    pub player_height: f32,
    /// Player spawns this far above the bottom of the viewport
    pub player_start_offset: f32,
    /// Downward acceleration per tick
    pub gravity: f32,
    /// Vertical velocity set on landing (negative is up)
    pub jump_impulse: f32,
    /// Horizontal speed at round start
    pub base_speed: f32,
    /// Horizontal speed cap for the difficulty ramp
    pub max_speed: f32,
    /// Speed added every difficulty interval
    pub speed_increment: f32,
    pub difficulty_interval_ticks: u32,
    /// Fraction of the remaining velocity gap closed each tick
    pub horizontal_damping: f32,

    // === Tilt control ===
    /// Tilt (degrees) that maps to full speed
    pub tilt_sensitivity: f32,
    /// Normalised tilt below this magnitude is ignored
    pub tilt_dead_zone: f32,
    /// Extra speed available through tilt steering
    pub tilt_boost: f32,

    // === Platforms ===
    pub platform_width: f32,
    pub platform_height: f32,
    /// Starting platform sits this far above the bottom of the viewport
    pub start_platform_offset: f32,
    pub min_gap_y: f32,
    pub max_gap_y: f32,
    /// Maximum horizontal shift from the previous platform (either side)
    pub max_offset_x: f32,
    pub bounce_multiplier: f32,
    pub bounce_immunity_ticks: u32,
    pub fragile_break_ticks: u32,
    /// Ticks of the bouncy platform wobble animation
    pub bounce_anim_ticks: u32,
    /// Keep generating until the frontier is this far above the camera top
    pub generation_lookahead: f32,

    // === Beans ===
    pub bean_chance: f32,
    /// Bean hovers this far above its platform
    pub bean_lift: f32,
    pub bean_pickup_radius: f32,

    // === Enemies ===
    pub enemy_width: f32,
    pub enemy_height: f32,
    /// Enemy hovers this far above its platform
    pub enemy_lift: f32,
    /// Patrol distance either side of the spawn point
    pub patrol_half_range: f32,

    // === Camera ===
    /// Player is kept this fraction of the viewport below the camera top
    pub camera_lead: f32,
    pub camera_easing: f32,
    /// Player may drop this far below the viewport before the round ends
    pub fall_margin: f32,
    /// Entities this far below the viewport are discarded
    pub cull_margin: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            viewport_width: VIEWPORT_WIDTH,
            viewport_height: VIEWPORT_HEIGHT,

            player_width: 30.0,
            player_height: 30.0,
            player_start_offset: 100.0,
            gravity: 0.45,
            jump_impulse: -13.0,
            base_speed: 6.0,
            max_speed: 10.0,
            speed_increment: 0.1,
            difficulty_interval_ticks: 300, // 5 s
            horizontal_damping: 0.2,

            tilt_sensitivity: 20.0,
            tilt_dead_zone: 0.05,
            tilt_boost: 2.0,

            platform_width: 85.0,
            platform_height: 15.0,
            start_platform_offset: 50.0,
            min_gap_y: 80.0,
            max_gap_y: 130.0,
            max_offset_x: 100.0,
            bounce_multiplier: 1.6,
            bounce_immunity_ticks: 12,
            fragile_break_ticks: 20,
            bounce_anim_ticks: 20,
            generation_lookahead: VIEWPORT_HEIGHT,

            bean_chance: 0.4,
            bean_lift: 20.0,
            bean_pickup_radius: 25.0,

            enemy_width: 30.0,
            enemy_height: 30.0,
            enemy_lift: 60.0,
            patrol_half_range: 60.0,

            camera_lead: 0.4,
            camera_easing: 0.1,
            fall_margin: 20.0,
            cull_margin: 50.0,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON override and validate it
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Every float field by name
    fn float_fields(&self) -> [(&'static str, f32); 33] {
        [
            ("viewport_width", self.viewport_width),
            ("viewport_height", self.viewport_height),
            ("player_width", self.player_width),
            ("player_height", self.player_height),
            ("player_start_offset", self.player_start_offset),
            ("gravity", self.gravity),
            ("jump_impulse", self.jump_impulse),
            ("base_speed", self.base_speed),
            ("max_speed", self.max_speed),
            ("speed_increment", self.speed_increment),
            ("horizontal_damping", self.horizontal_damping),
            ("tilt_sensitivity", self.tilt_sensitivity),
            ("tilt_dead_zone", self.tilt_dead_zone),
            ("tilt_boost", self.tilt_boost),
            ("platform_width", self.platform_width),
            ("platform_height", self.platform_height),
            ("start_platform_offset", self.start_platform_offset),
            ("min_gap_y", self.min_gap_y),
            ("max_gap_y", self.max_gap_y),
            ("max_offset_x", self.max_offset_x),
            ("bounce_multiplier", self.bounce_multiplier),
            ("generation_lookahead", self.generation_lookahead),
            ("bean_chance", self.bean_chance),
            ("bean_lift", self.bean_lift),
            ("bean_pickup_radius", self.bean_pickup_radius),
            ("enemy_width", self.enemy_width),
            ("enemy_height", self.enemy_height),
            ("enemy_lift", self.enemy_lift),
            ("patrol_half_range", self.patrol_half_range),
            ("camera_lead", self.camera_lead),
            ("camera_easing", self.camera_easing),
            ("fall_margin", self.fall_margin),
            ("cull_margin", self.cull_margin),
        ]
    }

    /// Reject configurations the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(&(name, value)) = self.float_fields().iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::NotFinite { name, value });
        }
        if self.viewport_width <= 0.0 || self.viewport_height <= 0.0 {
            return Err(ConfigError::Viewport {
                width: self.viewport_width,
                height: self.viewport_height,
            });
        }
        for (what, size) in [
            ("player", self.player_width),
            ("platform", self.platform_width),
            ("enemy", self.enemy_width),
        ] {
            if size <= 0.0 || size >= self.viewport_width {
                return Err(ConfigError::TooWide {
                    what,
                    size,
                    viewport: self.viewport_width,
                });
            }
        }
        for (name, value) in [
            ("gravity", self.gravity),
            ("min_gap_y", self.min_gap_y),
            ("player_height", self.player_height),
            ("platform_height", self.platform_height),
            ("enemy_height", self.enemy_height),
            ("tilt_sensitivity", self.tilt_sensitivity),
            ("bounce_multiplier", self.bounce_multiplier),
        ] {
            if value <= 0.0 {
                return Err(ConfigError::NotPositive { name, value });
            }
        }
        for (name, value) in [
            ("max_offset_x", self.max_offset_x),
            ("base_speed", self.base_speed),
            ("speed_increment", self.speed_increment),
            ("tilt_dead_zone", self.tilt_dead_zone),
            ("tilt_boost", self.tilt_boost),
            ("generation_lookahead", self.generation_lookahead),
            ("bean_lift", self.bean_lift),
            ("bean_pickup_radius", self.bean_pickup_radius),
            ("enemy_lift", self.enemy_lift),
            ("patrol_half_range", self.patrol_half_range),
            ("fall_margin", self.fall_margin),
            ("cull_margin", self.cull_margin),
        ] {
            if value < 0.0 {
                return Err(ConfigError::Negative { name, value });
            }
        }
        if self.min_gap_y > self.max_gap_y {
            return Err(ConfigError::Range {
                name: "platform gap",
                min: self.min_gap_y,
                max: self.max_gap_y,
            });
        }
        if self.base_speed > self.max_speed {
            return Err(ConfigError::Range {
                name: "player speed",
                min: self.base_speed,
                max: self.max_speed,
            });
        }
        for (name, value) in [
            ("bean_chance", self.bean_chance),
            ("horizontal_damping", self.horizontal_damping),
            ("camera_easing", self.camera_easing),
            ("camera_lead", self.camera_lead),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Probability { name, value });
            }
        }
        if self.jump_impulse >= 0.0 {
            return Err(ConfigError::JumpImpulse(self.jump_impulse));
        }

        let apex = self.jump_apex();
        if self.max_gap_y > apex {
            log::warn!(
                "max platform gap {} exceeds jump apex {:.1}; some platforms will be unreachable",
                self.max_gap_y,
                apex
            );
        }
        Ok(())
    }

    /// Height gained by a normal jump before gravity stops it
    pub fn jump_apex(&self) -> f32 {
        self.jump_impulse * self.jump_impulse / (2.0 * self.gravity)
    }

    /// Where the player spawns at round start
    pub fn player_start(&self) -> (f32, f32) {
        (
            self.viewport_width / 2.0 - self.player_width / 2.0,
            self.viewport_height - self.player_start_offset,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let tuning = Tuning::default();
        assert!(tuning.validate().is_ok());
        assert_eq!(tuning.player_start(), (185.0, 700.0));
        assert!(tuning.jump_apex() > tuning.max_gap_y);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "gravity": 0.5, "bean_chance": 0.25 }"#).unwrap();
        assert_eq!(tuning.gravity, 0.5);
        assert_eq!(tuning.bean_chance, 0.25);
        assert_eq!(tuning.platform_width, 85.0);
    }

    #[test]
    fn test_rejects_inverted_gap() {
        let err = Tuning::from_json(r#"{ "min_gap_y": 200, "max_gap_y": 100 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Range { name: "platform gap", .. }));
    }

    #[test]
    fn test_rejects_platform_wider_than_viewport() {
        let tuning = Tuning {
            platform_width: 500.0,
            ..Default::default()
        };
        assert!(matches!(
            tuning.validate(),
            Err(ConfigError::TooWide { what: "platform", .. })
        ));
    }

    #[test]
    fn test_rejects_downward_jump() {
        let tuning = Tuning {
            jump_impulse: 4.0,
            ..Default::default()
        };
        assert!(matches!(tuning.validate(), Err(ConfigError::JumpImpulse(_))));
    }

    #[test]
    fn test_rejects_non_positive_gap() {
        // Gaps at or below zero would generate platforms below the frontier forever
        let err = Tuning::from_json(r#"{ "min_gap_y": -10, "max_gap_y": -5 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::NotPositive { name: "min_gap_y", .. }));
        let err = Tuning::from_json(r#"{ "min_gap_y": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::NotPositive { name: "min_gap_y", .. }));
    }

    #[test]
    fn test_rejects_negative_horizontal_offset() {
        let err = Tuning::from_json(r#"{ "max_offset_x": -5 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Negative { name: "max_offset_x", .. }));
    }

    #[test]
    fn test_rejects_non_positive_gravity() {
        let err = Tuning::from_json(r#"{ "gravity": -0.45 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::NotPositive { name: "gravity", .. }));
        let err = Tuning::from_json(r#"{ "gravity": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::NotPositive { name: "gravity", .. }));
    }

    #[test]
    fn test_rejects_negative_radii_and_lifts() {
        for field in ["bean_pickup_radius", "bean_lift", "enemy_lift", "patrol_half_range"] {
            let err = Tuning::from_json(&format!(r#"{{ "{field}": -1 }}"#)).unwrap_err();
            assert!(
                matches!(err, ConfigError::Negative { name, .. } if name == field),
                "{field} accepted a negative value"
            );
        }
    }

    #[test]
    fn test_rejects_non_finite_values() {
        let tuning = Tuning {
            gravity: f32::NAN,
            ..Default::default()
        };
        assert!(matches!(
            tuning.validate(),
            Err(ConfigError::NotFinite { name: "gravity", .. })
        ));
        let tuning = Tuning {
            max_gap_y: f32::INFINITY,
            ..Default::default()
        };
        assert!(matches!(
            tuning.validate(),
            Err(ConfigError::NotFinite { name: "max_gap_y", .. })
        ));
    }

    #[test]
    fn test_validated_tunings_build_rounds() {
        use crate::sim::{GameMode, GameState};

        let json = r#"{ "max_offset_x": 0, "min_gap_y": 1, "max_gap_y": 1 }"#;
        let tuning = Tuning::from_json(json).unwrap();
        let state = GameState::new(1, GameMode::Extreme, tuning);
        assert!(state.frontier().top() <= state.camera.y - state.tuning.generation_lookahead);
    }

    #[test]
    fn test_rejects_garbage_json() {
        assert!(matches!(
            Tuning::from_json("not json"),
            Err(ConfigError::Json(_))
        ));
    }
}
