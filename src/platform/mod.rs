//! Platform abstraction layer
//!
//! Maps raw browser input to [`TickInput`]. The bindings themselves
//! (canvas, Telegram launch data, drawing) live in [`web`] and only exist on
//! wasm32.

#[cfg(target_arch = "wasm32")]
pub mod web;

use crate::sim::TickInput;

/// Horizontal steering direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

/// Keyboard code to direction (arrows and A/D)
pub fn key_direction(code: &str) -> Option<Direction> {
    match code {
        "ArrowLeft" | "KeyA" => Some(Direction::Left),
        "ArrowRight" | "KeyD" => Some(Direction::Right),
        _ => None,
    }
}

/// Touches on the left half of the screen steer left
pub fn touch_direction(client_x: f64, window_width: f64) -> Direction {
    if client_x < window_width / 2.0 {
        Direction::Left
    } else {
        Direction::Right
    }
}

/// Held buttons and the latest tilt reading, sampled once per frame
#[derive(Debug, Clone, Copy, Default)]
pub struct InputState {
    left: bool,
    right: bool,
    tilt: Option<f32>,
}

impl InputState {
    pub fn set(&mut self, direction: Direction, pressed: bool) {
        match direction {
            Direction::Left => self.left = pressed,
            Direction::Right => self.right = pressed,
        }
    }

    /// Latest device gamma in degrees; `None` turns tilt steering off
    pub fn set_tilt(&mut self, gamma: Option<f32>) {
        self.tilt = gamma;
    }

    /// Forget held buttons (round start, focus loss)
    pub fn release_all(&mut self) {
        self.left = false;
        self.right = false;
    }

    pub fn sample(&self) -> TickInput {
        TickInput {
            left: self.left,
            right: self.right,
            tilt: self.tilt,
        }
    }
}
