//! Perky Jump - an endless coffee-bean jumper
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, generation)
//! - `session`: Round lifecycle, countdown timer, end-of-round bookkeeping
//! - `backend`: Stats, leaderboard and skin store collaborators
//! - `view`: Camera-relative draw list for the host renderer
//! - `platform`: Browser bindings (wasm32 only)
//! - `tuning`: Data-driven game balance

pub mod backend;
pub mod error;
pub mod haptics;
pub mod leaderboard;
pub mod platform;
pub mod session;
pub mod settings;
pub mod sim;
pub mod store;
pub mod theme;
pub mod tuning;
pub mod view;

pub use error::{BackendError, ConfigError};
pub use leaderboard::Leaderboard;
pub use session::{FrameControl, Session};
pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Simulation rate; all per-tick physics constants assume this
    pub const SIM_HZ: u32 = 60;
    /// Fixed simulation timestep in milliseconds
    pub const SIM_DT_MS: f64 = 1000.0 / SIM_HZ as f64;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Default viewport (portrait phone)
    pub const VIEWPORT_WIDTH: f32 = 400.0;
    pub const VIEWPORT_HEIGHT: f32 = 800.0;

    /// World units per displayed meter of height
    pub const UNITS_PER_METER: f32 = 10.0;

    /// Timed mode budget in seconds
    pub const TIMED_MODE_SECONDS: u32 = 60;
}

/// Wrap a horizontal position around the viewport edges.
///
/// A body whose right edge passes the right border reappears flush with the
/// left border, and one whose left edge passes zero reappears flush with the
/// right border.
#[inline]
pub fn wrap_horizontal(x: f32, width: f32, viewport_width: f32) -> f32 {
    if x + width > viewport_width {
        0.0
    } else if x < 0.0 {
        viewport_width - width
    } else {
        x
    }
}

/// Convert a world-space height gain into whole meters (never negative)
#[inline]
pub fn meters_from_units(units: f32) -> u32 {
    (units / consts::UNITS_PER_METER).floor().max(0.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_right_edge_lands_at_zero() {
        assert_eq!(wrap_horizontal(371.0, 30.0, 400.0), 0.0);
        assert_eq!(wrap_horizontal(370.0, 30.0, 400.0), 370.0);
    }

    #[test]
    fn test_wrap_left_edge_lands_flush_right() {
        assert_eq!(wrap_horizontal(-0.5, 30.0, 400.0), 370.0);
        assert_eq!(wrap_horizontal(0.0, 30.0, 400.0), 0.0);
    }

    #[test]
    fn test_meters_from_units() {
        assert_eq!(meters_from_units(-50.0), 0);
        assert_eq!(meters_from_units(9.9), 0);
        assert_eq!(meters_from_units(10.0), 1);
        assert_eq!(meters_from_units(5012.0), 501);
    }
}
