//! Fixed timestep simulation tick
//!
//! Advances a round by one frame. Physics constants are per tick, so the
//! host must call [`tick`] at [`crate::consts::SIM_HZ`].

use super::collision::{find_landing, within_pickup};
use super::generation;
use super::state::{EndReason, GameEvent, GameState, PlatformKind};
use crate::wrap_horizontal;

/// Input state sampled for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickInput {
    /// Left held (key, touch on the left half, or on-screen button)
    pub left: bool,
    /// Right held
    pub right: bool,
    /// Device tilt in degrees (gamma); `None` when tilt control is off
    pub tilt: Option<f32>,
}

/// Advance the round by one fixed timestep. No-op once the round is over.
pub fn tick(state: &mut GameState, input: &TickInput) {
    if !state.is_playing() {
        return;
    }
    state.time_ticks += 1;

    ramp_difficulty(state);
    steer(state, input);

    // Vertical physics
    let prev_bottom = state.player.bottom();
    state.player.vel.y += state.player.gravity;
    state.player.pos.y += state.player.vel.y;

    resolve_landing(state, prev_bottom);
    advance_platform_timers(state);
    collect_beans(state);

    if update_enemies(state) {
        state.end_round(EndReason::EnemyHit);
        return;
    }

    state.camera.follow(state.player.pos.y, &state.tuning);
    state.record_height();

    generation::fill_ahead(state);
    cull_offscreen(state);

    let floor = state.camera.bottom(state.tuning.viewport_height) + state.tuning.fall_margin;
    if state.player.pos.y > floor {
        state.end_round(EndReason::Fell);
    }
}

/// Every difficulty interval the player gets a little faster
fn ramp_difficulty(state: &mut GameState) {
    let interval = u64::from(state.tuning.difficulty_interval_ticks);
    if interval == 0 || !state.time_ticks.is_multiple_of(interval) {
        return;
    }
    let player = &mut state.player;
    if player.speed < player.max_speed {
        let step = state.tuning.speed_increment * state.profile.speed_multiplier;
        player.speed = (player.speed + step).min(player.max_speed);
        log::trace!("Speed ramped to {:.2}", player.speed);
    }
}

/// Ease horizontal velocity toward the input target, then wrap
fn steer(state: &mut GameState, input: &TickInput) {
    let tuning = &state.tuning;
    let player = &mut state.player;

    let tilt = input
        .tilt
        .map(|degrees| (degrees / tuning.tilt_sensitivity).clamp(-1.0, 1.0))
        .filter(|t| t.abs() > tuning.tilt_dead_zone);

    let target = if let Some(t) = tilt {
        t * (player.speed + tuning.tilt_boost * state.profile.speed_multiplier)
    } else if input.left {
        -player.speed
    } else if input.right {
        player.speed
    } else {
        0.0
    };

    player.vel.x += (target - player.vel.x) * tuning.horizontal_damping;
    player.pos.x += player.vel.x;
    player.pos.x = wrap_horizontal(player.pos.x, player.width, tuning.viewport_width);
}

/// Bounce off the first platform the player fell onto this tick
fn resolve_landing(state: &mut GameState, prev_bottom: f32) {
    if state.player.bounce_immunity > 0 {
        state.player.bounce_immunity -= 1;
        return;
    }

    let Some(index) = find_landing(&state.player, prev_bottom, &state.platforms) else {
        return;
    };

    let platform = &mut state.platforms[index];
    let player = &mut state.player;
    player.pos.y = platform.top() - player.height;
    player.vel.y = player.jump_impulse;

    match platform.kind {
        PlatformKind::Normal => {}
        PlatformKind::Bouncy => {
            player.vel.y = player.jump_impulse * state.tuning.bounce_multiplier;
            player.bounce_immunity = state.tuning.bounce_immunity_ticks;
            platform.bounce_anim = state.tuning.bounce_anim_ticks;
        }
        PlatformKind::Fragile => {
            platform.breaking = Some(state.tuning.fragile_break_ticks);
            state.events.push(GameEvent::PlatformBreaking { id: platform.id });
        }
    }
    state.events.push(GameEvent::Landed {
        kind: platform.kind,
    });
}

/// Count down crumbling and wobble timers; drop fully crumbled platforms
fn advance_platform_timers(state: &mut GameState) {
    for platform in &mut state.platforms {
        if let Some(ref mut left) = platform.breaking {
            *left = left.saturating_sub(1);
        }
        platform.bounce_anim = platform.bounce_anim.saturating_sub(1);
    }

    let frontier_id = state.frontier().id;
    state
        .platforms
        .retain(|p| p.id == frontier_id || p.breaking != Some(0));
}

fn collect_beans(state: &mut GameState) {
    let radius = state.tuning.bean_pickup_radius;
    for bean in &mut state.beans {
        if within_pickup(&state.player, bean.pos, radius) {
            bean.collected = true;
            state.beans_collected += 1;
            state.events.push(GameEvent::BeanCollected {
                total: state.beans_collected,
            });
        }
    }
    state.beans.retain(|bean| !bean.collected);
}

/// Move patrolling enemies. Returns true if any enemy touches the player.
fn update_enemies(state: &mut GameState) -> bool {
    let player_box = state.player.aabb();
    let mut hit = false;
    for enemy in &mut state.enemies {
        enemy.patrol();
        if enemy.aabb().overlaps(&player_box) {
            log::debug!("Player hit enemy {}", enemy.id);
            hit = true;
        }
    }
    hit
}

/// Drop everything that scrolled below the screen. The frontier is kept so
/// generation can always continue.
fn cull_offscreen(state: &mut GameState) {
    let limit = state.camera.bottom(state.tuning.viewport_height) + state.tuning.cull_margin;
    let frontier_id = state.frontier().id;
    state
        .platforms
        .retain(|p| p.id == frontier_id || p.top() <= limit);
    state.beans.retain(|b| b.pos.y <= limit);
    state.enemies.retain(|e| e.pos.y <= limit);
}
