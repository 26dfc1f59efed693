//! Game state and core simulation types
//!
//! Everything a round needs to advance lives in [`GameState`], which is
//! passed explicitly to [`super::tick`]. It is serializable so a round can be
//! snapshotted and replayed deterministically.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::generation;
use super::mode::{GameMode, ModeProfile};
use crate::meters_from_units;
use crate::tuning::Tuning;

/// Current phase of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// No round started yet (or player returned to the menu)
    #[default]
    Menu,
    /// Active gameplay
    Playing,
    /// Round ended
    GameOver,
}

/// Why a round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// Dropped below the bottom of the screen
    Fell,
    /// Touched an enemy
    EnemyHit,
    /// Timed mode countdown ran out
    TimeUp,
}

/// Side effects produced by a tick, drained by the session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Player bounced off a platform
    Landed { kind: PlatformKind },
    /// A fragile platform was touched and will disappear
    PlatformBreaking { id: u32 },
    /// A bean was picked up; `total` is the round count after pickup
    BeanCollected { total: u32 },
    /// Height score increased
    NewHeight { meters: u32 },
    /// Round is over (emitted exactly once per round)
    RoundEnded { reason: EndReason },
}

/// The jumping player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner
    pub pos: Vec2,
    pub vel: Vec2,
    pub width: f32,
    pub height: f32,
    /// Current horizontal speed (ramps up over the round)
    pub speed: f32,
    /// Speed cap for the ramp
    pub max_speed: f32,
    /// Vertical velocity applied on landing
    pub jump_impulse: f32,
    /// Downward acceleration per tick
    pub gravity: f32,
    /// Ticks left during which platform collisions are ignored after a bounce
    pub bounce_immunity: u32,
}

impl Player {
    pub fn new(tuning: &Tuning, profile: &ModeProfile) -> Self {
        let m = profile.speed_multiplier;
        let (x, y) = tuning.player_start();
        Self {
            pos: Vec2::new(x, y),
            vel: Vec2::ZERO,
            width: tuning.player_width,
            height: tuning.player_height,
            speed: tuning.base_speed * m,
            max_speed: tuning.max_speed * m,
            jump_impulse: tuning.jump_impulse * m,
            gravity: tuning.gravity * m * m,
            bounce_immunity: 0,
        }
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.height
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::new(self.width, self.height) / 2.0
    }
}

/// Platform variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlatformKind {
    #[default]
    Normal,
    /// Launches the player higher
    Bouncy,
    /// Holds exactly one landing, then crumbles
    Fragile,
}

impl PlatformKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformKind::Normal => "normal",
            PlatformKind::Bouncy => "bouncy",
            PlatformKind::Fragile => "fragile",
        }
    }
}

/// A platform entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Platform {
    pub id: u32,
    /// Top-left corner
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    pub kind: PlatformKind,
    /// Ticks until a touched fragile platform is removed
    #[serde(default)]
    pub breaking: Option<u32>,
    /// Ticks left of the bounce wobble (render only)
    #[serde(default)]
    pub bounce_anim: u32,
}

impl Platform {
    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.height
    }

    /// Whether the player can still land here
    pub fn is_solid(&self) -> bool {
        self.breaking.is_none()
    }

    /// Fade factor for rendering a crumbling platform
    pub fn opacity(&self, break_ticks: u32) -> f32 {
        match self.breaking {
            Some(left) if break_ticks > 0 => left as f32 / break_ticks as f32,
            Some(_) => 0.0,
            None => 1.0,
        }
    }
}

/// A collectible coffee bean
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bean {
    pub id: u32,
    /// Centre of the bean
    pub pos: Vec2,
    pub collected: bool,
}

/// Enemy movement profile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Hovers in place
    Static,
    /// Walks back and forth between `min_x` and `max_x` (left edge bounds)
    Patrolling { vx: f32, min_x: f32, max_x: f32 },
}

/// A hazard; touching it ends the round
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    /// Top-left corner
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    pub kind: EnemyKind,
}

impl Enemy {
    /// Advance patrol movement, reflecting at the range bounds
    pub fn patrol(&mut self) {
        if let EnemyKind::Patrolling {
            ref mut vx,
            min_x,
            max_x,
        } = self.kind
        {
            self.pos.x += *vx;
            if self.pos.x <= min_x {
                self.pos.x = min_x;
                *vx = vx.abs();
            } else if self.pos.x >= max_x {
                self.pos.x = max_x;
                *vx = -vx.abs();
            }
        }
    }
}

/// Vertical camera; `y` is the world coordinate of the top of the screen
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Camera {
    pub y: f32,
}

impl Camera {
    /// Ease toward the player, but only upward
    pub fn follow(&mut self, player_y: f32, tuning: &Tuning) {
        let target = player_y - tuning.viewport_height * tuning.camera_lead;
        if target < self.y {
            self.y += (target - self.y) * tuning.camera_easing;
        }
    }

    /// World y of the bottom of the screen
    #[inline]
    pub fn bottom(&self, viewport_height: f32) -> f32 {
        self.y + viewport_height
    }
}

/// Complete round state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Round seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub mode: GameMode,
    pub profile: ModeProfile,
    pub tuning: Tuning,
    pub phase: GamePhase,
    pub player: Player,
    /// Creation order; the last entry is the frontier
    pub platforms: Vec<Platform>,
    pub beans: Vec<Bean>,
    pub enemies: Vec<Enemy>,
    pub camera: Camera,
    /// Player y at spawn; height is measured from here
    pub start_y: f32,
    /// Height score in meters (never decreases within a round)
    pub height: u32,
    pub beans_collected: u32,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Seconds left in timed mode
    pub time_left: Option<u32>,
    pub end_reason: Option<EndReason>,
    /// Events since the last drain
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Start a new round: spawn the player, the starting platform and enough
    /// platforms to fill the screen and the lookahead above it.
    pub fn new(seed: u64, mode: GameMode, tuning: Tuning) -> Self {
        let profile = mode.profile();
        let player = Player::new(&tuning, &profile);
        let start_y = player.pos.y;

        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            mode,
            profile,
            phase: GamePhase::Playing,
            player,
            platforms: Vec::new(),
            beans: Vec::new(),
            enemies: Vec::new(),
            camera: Camera::default(),
            start_y,
            height: 0,
            beans_collected: 0,
            time_ticks: 0,
            time_left: profile.time_limit_secs,
            end_reason: None,
            events: Vec::new(),
            next_id: 1,
            tuning,
        };

        let start = Platform {
            id: state.next_entity_id(),
            pos: Vec2::new(
                state.tuning.viewport_width / 2.0 - state.tuning.platform_width / 2.0,
                state.tuning.viewport_height - state.tuning.start_platform_offset,
            ),
            width: state.tuning.platform_width,
            height: state.tuning.platform_height,
            kind: PlatformKind::Normal,
            breaking: None,
            bounce_anim: 0,
        };
        state.platforms.push(start);
        generation::fill_ahead(&mut state);

        log::debug!(
            "Round started: mode={} seed={} platforms={}",
            mode.as_str(),
            seed,
            state.platforms.len()
        );
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// The topmost, most recently generated platform
    pub fn frontier(&self) -> &Platform {
        // The frontier is never culled, so the list is never empty.
        &self.platforms[self.platforms.len() - 1]
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    /// Raise the height score if the player climbed past it
    pub fn record_height(&mut self) {
        let meters = meters_from_units(self.start_y - self.player.pos.y);
        if meters > self.height {
            self.height = meters;
            self.events.push(GameEvent::NewHeight { meters });
        }
    }

    /// End the round. Returns false if it had already ended.
    pub fn end_round(&mut self, reason: EndReason) -> bool {
        if self.phase != GamePhase::Playing {
            return false;
        }
        self.phase = GamePhase::GameOver;
        self.end_reason = Some(reason);
        self.events.push(GameEvent::RoundEnded { reason });
        log::info!(
            "Round over ({:?}): {} m, {} beans, {} ticks",
            reason,
            self.height,
            self.beans_collected,
            self.time_ticks
        );
        true
    }

    /// Advance the timed-mode countdown by one second.
    /// Returns true if this second ended the round.
    pub fn countdown_second(&mut self) -> bool {
        if !self.is_playing() {
            return false;
        }
        match self.time_left {
            Some(ref mut left) => {
                *left = left.saturating_sub(1);
                if *left == 0 {
                    self.end_round(EndReason::TimeUp)
                } else {
                    false
                }
            }
            None => false,
        }
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classic() -> GameState {
        GameState::new(7, GameMode::Classic, Tuning::default())
    }

    #[test]
    fn test_new_round_layout() {
        let state = classic();
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.player.pos, Vec2::new(185.0, 700.0));
        assert_eq!(state.player.vel, Vec2::ZERO);
        assert_eq!(state.height, 0);

        let start = &state.platforms[0];
        assert_eq!(start.kind, PlatformKind::Normal);
        assert_eq!(start.pos, Vec2::new(157.5, 750.0));

        // Frontier is generated at least one lookahead above the screen top
        assert!(state.frontier().top() <= state.camera.y - state.tuning.generation_lookahead);
        // Creation order is preserved
        assert!(state.platforms.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[test]
    fn test_speed_multiplier_time_scales_physics() {
        let tuning = Tuning::default();
        let extreme = GameMode::Extreme.profile();
        let player = Player::new(&tuning, &extreme);
        let m = extreme.speed_multiplier;
        assert!((player.jump_impulse - tuning.jump_impulse * m).abs() < 1e-6);
        assert!((player.gravity - tuning.gravity * m * m).abs() < 1e-6);
        // Apex height stays the same
        let apex = player.jump_impulse.powi(2) / (2.0 * player.gravity);
        assert!((apex - tuning.jump_apex()).abs() < 1e-3);
    }

    #[test]
    fn test_end_round_is_idempotent() {
        let mut state = classic();
        assert!(state.end_round(EndReason::Fell));
        assert!(!state.end_round(EndReason::EnemyHit));
        assert_eq!(state.end_reason, Some(EndReason::Fell));
        let ended = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::RoundEnded { .. }))
            .count();
        assert_eq!(ended, 1);
    }

    #[test]
    fn test_countdown_ends_timed_round_on_last_second() {
        let mut state = GameState::new(1, GameMode::Timed, Tuning::default());
        assert_eq!(state.time_left, Some(60));
        for _ in 0..59 {
            assert!(!state.countdown_second());
        }
        assert!(state.is_playing());
        assert!(state.countdown_second());
        assert_eq!(state.end_reason, Some(EndReason::TimeUp));
        // Further seconds do nothing
        assert!(!state.countdown_second());
    }

    #[test]
    fn test_countdown_is_noop_without_clock() {
        let mut state = classic();
        assert!(!state.countdown_second());
        assert_eq!(state.time_left, None);
    }

    #[test]
    fn test_camera_never_moves_down() {
        let tuning = Tuning::default();
        let mut camera = Camera { y: -100.0 };
        camera.follow(1000.0, &tuning);
        assert_eq!(camera.y, -100.0);
        camera.follow(-500.0, &tuning);
        assert!(camera.y < -100.0);
    }

    #[test]
    fn test_patrol_reflects_at_bounds() {
        let mut enemy = Enemy {
            id: 1,
            pos: Vec2::new(99.0, 0.0),
            width: 30.0,
            height: 30.0,
            kind: EnemyKind::Patrolling {
                vx: 2.0,
                min_x: 40.0,
                max_x: 100.0,
            },
        };
        enemy.patrol();
        assert_eq!(enemy.pos.x, 100.0);
        assert!(matches!(enemy.kind, EnemyKind::Patrolling { vx, .. } if vx < 0.0));
        enemy.patrol();
        assert_eq!(enemy.pos.x, 98.0);
    }

    #[test]
    fn test_fragile_opacity_fades() {
        let mut platform = Platform {
            id: 1,
            pos: Vec2::ZERO,
            width: 85.0,
            height: 15.0,
            kind: PlatformKind::Fragile,
            breaking: None,
            bounce_anim: 0,
        };
        assert_eq!(platform.opacity(20), 1.0);
        platform.breaking = Some(10);
        assert_eq!(platform.opacity(20), 0.5);
        assert!(!platform.is_solid());
    }

    #[test]
    fn test_state_snapshot_round_trips() {
        let state = classic();
        let json = serde_json::to_string(&state).unwrap();
        let restored: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.platforms.len(), state.platforms.len());
        assert_eq!(restored.seed, state.seed);
    }
}
