//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (creation order)
//! - No rendering, timers or I/O

pub mod collision;
pub mod generation;
pub mod mode;
pub mod state;
pub mod tick;

pub use collision::{Aabb, find_landing, lands_on, within_pickup};
pub use generation::{SPAWN_TIERS, SpawnTier, fill_ahead, generate_next_platform, tier_for_height};
pub use mode::{Background, EnemyPolicy, GameMode, ModeProfile};
pub use state::{
    Bean, Camera, EndReason, Enemy, EnemyKind, GameEvent, GamePhase, GameState, Platform,
    PlatformKind, Player,
};
pub use tick::{TickInput, tick};
