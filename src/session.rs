//! Round lifecycle
//!
//! [`Session`] owns the current round and everything around it that is not
//! simulation: the fixed-step accumulator, the timed-mode countdown, haptic
//! feedback and the once-per-round bookkeeping when a round ends. It never
//! performs I/O itself; finished rounds are queued and handed to a
//! [`StatsBackend`] by the host.

use serde::{Deserialize, Serialize};

use crate::backend::{PlayerIdentity, PlayerStats, RoundSubmission, StatsBackend};
use crate::consts::{MAX_SUBSTEPS, SIM_DT_MS};
use crate::error::ConfigError;
use crate::haptics::{HapticPulse, Haptics, NullHaptics};
use crate::settings::Settings;
use crate::sim::{EndReason, GameEvent, GameMode, GamePhase, GameState, TickInput, tick};
use crate::store;
use crate::theme::Theme;
use crate::tuning::Tuning;
use crate::view::SceneView;

/// Longest frame gap fed to the accumulator (ms); longer pauses are dropped
const MAX_FRAME_MS: f64 = 100.0;

/// How long a bonus stays redeemable, in seconds
pub const REWARD_VALID_SECS: u32 = 600;

/// Whether the host should keep scheduling frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameControl {
    Continue,
    Stop,
}

/// In-store bonus earned by collecting many beans in one round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reward {
    Discount { percent: u8 },
    BrandedMug,
}

impl Reward {
    pub fn for_beans(beans: u32) -> Option<Self> {
        match beans {
            5000.. => Some(Reward::BrandedMug),
            200.. => Some(Reward::Discount { percent: 5 }),
            100.. => Some(Reward::Discount { percent: 2 }),
            _ => None,
        }
    }

    pub fn title(&self) -> String {
        match self {
            Reward::Discount { percent } => format!("🎁 {percent}% discount!"),
            Reward::BrandedMug => "🎁 Branded mug!".to_string(),
        }
    }
}

/// Summary of a finished round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub mode: GameMode,
    pub reason: EndReason,
    pub height: u32,
    pub beans: u32,
    /// Seconds used, timed mode only
    pub seconds_played: Option<u32>,
    pub new_best: bool,
    pub reward: Option<Reward>,
}

/// Who is playing and their totals
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub identity: PlayerIdentity,
    pub stats: PlayerStats,
}

/// One player's rounds, played one at a time
pub struct Session<H: Haptics = NullHaptics> {
    tuning: Tuning,
    settings: Settings,
    profile: PlayerProfile,
    haptics: H,
    state: Option<GameState>,
    accumulator_ms: f64,
    /// Bumped whenever a running countdown must be abandoned
    timer_token: u64,
    /// Set once the end-of-round bookkeeping for the current round has run
    round_closed: bool,
    pending: Option<RoundSubmission>,
    last_outcome: Option<RoundOutcome>,
}

impl Session<NullHaptics> {
    pub fn new(
        tuning: Tuning,
        settings: Settings,
        profile: PlayerProfile,
    ) -> Result<Self, ConfigError> {
        Self::with_haptics(tuning, settings, profile, NullHaptics)
    }
}

impl<H: Haptics> Session<H> {
    pub fn with_haptics(
        tuning: Tuning,
        settings: Settings,
        profile: PlayerProfile,
        haptics: H,
    ) -> Result<Self, ConfigError> {
        tuning.validate()?;
        Ok(Self {
            tuning,
            settings,
            profile,
            haptics,
            state: None,
            accumulator_ms: 0.0,
            timer_token: 0,
            round_closed: false,
            pending: None,
            last_outcome: None,
        })
    }

    /// Begin a new round, abandoning any previous one.
    /// Returns the countdown token when the mode is timed.
    pub fn start(&mut self, mode: GameMode, seed: u64) -> Option<u64> {
        self.timer_token += 1;
        self.accumulator_ms = 0.0;
        self.round_closed = false;
        self.last_outcome = None;
        self.settings.last_mode = mode;

        let state = GameState::new(seed, mode, self.tuning.clone());
        let timed = state.time_left.is_some();
        self.state = Some(state);
        log::info!("Starting {} round (seed {})", mode.as_str(), seed);

        timed.then_some(self.timer_token)
    }

    /// Leave the current round without recording it
    pub fn return_to_menu(&mut self) {
        self.timer_token += 1;
        self.state = None;
        self.accumulator_ms = 0.0;
    }

    /// Advance by the wall-clock time since the previous frame
    pub fn frame(&mut self, elapsed_ms: f64, input: TickInput) -> FrameControl {
        let Some(state) = self.state.as_mut() else {
            return FrameControl::Stop;
        };
        if !state.is_playing() {
            return FrameControl::Stop;
        }

        self.accumulator_ms += elapsed_ms.clamp(0.0, MAX_FRAME_MS);

        let mut substeps = 0;
        while self.accumulator_ms >= SIM_DT_MS && substeps < MAX_SUBSTEPS {
            tick(state, &input);
            self.accumulator_ms -= SIM_DT_MS;
            substeps += 1;
            if !state.is_playing() {
                break;
            }
        }
        // Behind at the cap: drop the backlog
        if substeps == MAX_SUBSTEPS {
            self.accumulator_ms = self.accumulator_ms.min(SIM_DT_MS);
        }

        self.dispatch_events();
        if self.is_playing() {
            FrameControl::Continue
        } else {
            FrameControl::Stop
        }
    }

    /// One second of the timed-mode countdown elapsed.
    /// Returns true if this ended the round.
    pub fn on_timer_second(&mut self, token: u64) -> bool {
        if token != self.timer_token {
            log::debug!("Ignoring stale countdown tick (token {token})");
            return false;
        }
        let ended = self
            .state
            .as_mut()
            .is_some_and(|state| state.countdown_second());
        self.dispatch_events();
        ended
    }

    fn dispatch_events(&mut self) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        let mut ended = false;
        for event in state.drain_events() {
            let pulse = HapticPulse::for_event(&event).filter(|_| self.settings.vibration);
            if let Some(pulse) = pulse {
                self.haptics.pulse(pulse);
            }
            if let GameEvent::RoundEnded { .. } = event {
                ended = true;
            }
        }
        if ended {
            self.close_round();
        }
    }

    /// End-of-round bookkeeping; runs at most once per round
    fn close_round(&mut self) {
        if self.round_closed {
            return;
        }
        let Some(state) = self.state.as_ref() else {
            return;
        };
        let Some(reason) = state.end_reason else {
            return;
        };
        self.round_closed = true;
        self.timer_token += 1;

        let stats = &mut self.profile.stats;
        let new_best = state.height > stats.best_height;
        stats.record_round(state.height, state.beans_collected);

        let outcome = RoundOutcome {
            mode: state.mode,
            reason,
            height: state.height,
            beans: state.beans_collected,
            seconds_played: state
                .profile
                .time_limit_secs
                .zip(state.time_left)
                .map(|(limit, left)| limit - left),
            new_best,
            reward: Reward::for_beans(state.beans_collected),
        };
        if let Some(reward) = outcome.reward {
            log::info!("Bonus unlocked: {}", reward.title());
        }

        let identity = &self.profile.identity;
        self.pending = match identity.id {
            Some(user_id) => Some(RoundSubmission {
                user_id,
                username: Some(identity.username.clone()),
                first_name: identity.first_name.clone(),
                score: outcome.height,
                collected_beans: outcome.beans,
            }),
            None => {
                log::debug!("Anonymous player, round not submitted");
                None
            }
        };
        self.last_outcome = Some(outcome);
    }

    /// Send the queued round result, if any. Delivery is attempted once;
    /// failures are logged and the result dropped. Returns whether it was
    /// delivered.
    pub fn submit_pending(&mut self, backend: &mut dyn StatsBackend) -> bool {
        let Some(submission) = self.pending.take() else {
            return false;
        };
        match backend.submit_round(&submission) {
            Ok(stats) => {
                self.apply_remote_stats(stats);
                true
            }
            Err(e) => {
                log::warn!("Failed to save stats: {}", e);
                false
            }
        }
    }

    /// Hand the queued round result to an asynchronous sender
    pub fn take_pending(&mut self) -> Option<RoundSubmission> {
        self.pending.take()
    }

    /// Replace local totals with the server's view
    pub fn apply_remote_stats(&mut self, stats: PlayerStats) {
        log::debug!("Stats synced: {} games played", stats.games_played);
        self.profile.stats = stats;
    }

    /// Refresh totals from the backend at start-up
    pub fn sync_stats(&mut self, backend: &mut dyn StatsBackend) {
        let Some(user_id) = self.profile.identity.id else {
            return;
        };
        match backend.fetch_stats(user_id) {
            Ok(stats) => self.apply_remote_stats(stats),
            Err(e) => log::warn!("Failed to fetch stats: {}", e),
        }
    }

    /// Draw list for the current round
    pub fn view(&self, theme: &Theme) -> Option<SceneView> {
        let state = self.state.as_ref()?;
        Some(SceneView::capture(
            state,
            theme,
            store::glyph_for(&self.profile.stats.current_skin),
            self.settings.effective_wobble(),
        ))
    }

    // === Accessors ===

    pub fn state(&self) -> Option<&GameState> {
        self.state.as_ref()
    }

    pub fn phase(&self) -> GamePhase {
        self.state.as_ref().map_or(GamePhase::Menu, |s| s.phase)
    }

    pub fn is_playing(&self) -> bool {
        self.phase() == GamePhase::Playing
    }

    pub fn mode(&self) -> Option<GameMode> {
        self.state.as_ref().map(|s| s.mode)
    }

    /// Height score in meters
    pub fn height(&self) -> u32 {
        self.state.as_ref().map_or(0, |s| s.height)
    }

    pub fn beans(&self) -> u32 {
        self.state.as_ref().map_or(0, |s| s.beans_collected)
    }

    pub fn time_left(&self) -> Option<u32> {
        self.state.as_ref().and_then(|s| s.time_left)
    }

    pub fn last_outcome(&self) -> Option<&RoundOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn has_pending_submission(&self) -> bool {
        self.pending.is_some()
    }

    pub fn profile(&self) -> &PlayerProfile {
        &self.profile
    }

    pub fn profile_mut(&mut self) -> &mut PlayerProfile {
        &mut self.profile
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn haptics(&self) -> &H {
        &self.haptics
    }
}
