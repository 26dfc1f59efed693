//! Procedural level generation
//!
//! Platforms are generated one at a time above the frontier (the most
//! recently created platform). Odds for special platforms and enemies come
//! from a tier table keyed by the current height score; since height never
//! decreases within a round, neither do the odds.

use glam::Vec2;
use rand::Rng;

use super::state::{Bean, Enemy, EnemyKind, GameState, Platform, PlatformKind};

/// Generation odds for one height band
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnTier {
    /// Height score (meters) at which this tier starts
    pub min_height: u32,
    pub bouncy_chance: f32,
    pub fragile_chance: f32,
    /// Chance per generated platform of an enemy (before mode scaling)
    pub enemy_chance: f32,
    /// Fraction of enemies that patrol instead of hovering
    pub patrol_share: f32,
    /// Patrol speed in units per tick (before the speed multiplier)
    pub patrol_speed: f32,
}

/// Tier table, ascending by `min_height`
pub const SPAWN_TIERS: [SpawnTier; 3] = [
    SpawnTier {
        min_height: 0,
        bouncy_chance: 0.10,
        fragile_chance: 0.05,
        enemy_chance: 0.06,
        patrol_share: 0.0,
        patrol_speed: 0.0,
    },
    SpawnTier {
        min_height: 500,
        bouncy_chance: 0.15,
        fragile_chance: 0.12,
        enemy_chance: 0.10,
        patrol_share: 0.5,
        patrol_speed: 1.5,
    },
    SpawnTier {
        min_height: 1500,
        bouncy_chance: 0.20,
        fragile_chance: 0.20,
        enemy_chance: 0.15,
        patrol_share: 0.75,
        patrol_speed: 2.5,
    },
];

/// Tier in effect at the given height
pub fn tier_for_height(height: u32) -> &'static SpawnTier {
    SPAWN_TIERS
        .iter()
        .rev()
        .find(|tier| height >= tier.min_height)
        .unwrap_or(&SPAWN_TIERS[0])
}

/// Weighted platform variant from a uniform roll in [0, 1)
pub fn choose_kind(roll: f32, tier: &SpawnTier) -> PlatformKind {
    if roll < tier.bouncy_chance {
        PlatformKind::Bouncy
    } else if roll < tier.bouncy_chance + tier.fragile_chance {
        PlatformKind::Fragile
    } else {
        PlatformKind::Normal
    }
}

/// Generate platforms until the frontier is a full lookahead above the
/// top of the screen
pub fn fill_ahead(state: &mut GameState) {
    let limit = state.camera.y - state.tuning.generation_lookahead;
    while state.frontier().top() > limit {
        generate_next_platform(state);
    }
}

/// Generate a single platform above the frontier, with an optional bean
/// and enemy
pub fn generate_next_platform(state: &mut GameState) {
    let viewport_width = state.tuning.viewport_width;
    let platform_width = state.tuning.platform_width;
    let platform_height = state.tuning.platform_height;
    let (min_gap, max_gap) = (state.tuning.min_gap_y, state.tuning.max_gap_y);
    let max_offset = state.tuning.max_offset_x;

    let frontier = state.frontier().pos;
    let gap = state.rng.random_range(min_gap..=max_gap);
    let offset = state.rng.random_range(-max_offset..=max_offset);
    let x = (frontier.x + offset).clamp(0.0, viewport_width - platform_width);
    let y = frontier.y - gap;

    let tier = tier_for_height(state.height);
    let kind = choose_kind(state.rng.random::<f32>(), tier);

    let id = state.next_entity_id();
    state.platforms.push(Platform {
        id,
        pos: Vec2::new(x, y),
        width: platform_width,
        height: platform_height,
        kind,
        breaking: None,
        bounce_anim: 0,
    });

    if kind == PlatformKind::Normal
        && state.rng.random_bool(f64::from(state.tuning.bean_chance))
    {
        let id = state.next_entity_id();
        state.beans.push(Bean {
            id,
            pos: Vec2::new(x + platform_width / 2.0, y - state.tuning.bean_lift),
            collected: false,
        });
    }

    maybe_spawn_enemy(state, y, tier);
}

/// Possibly place an enemy above a freshly generated platform at `platform_y`
fn maybe_spawn_enemy(state: &mut GameState, platform_y: f32, tier: &SpawnTier) {
    let policy = state.profile.enemies;
    if !policy.enabled || state.height < policy.min_height {
        return;
    }
    // Keep the first half screen above the spawn point clear
    if platform_y > state.start_y - state.tuning.viewport_height * 0.5 {
        return;
    }

    let chance = (tier.enemy_chance * policy.chance_scale).clamp(0.0, 1.0);
    if state.rng.random::<f32>() >= chance {
        return;
    }

    let width = state.tuning.enemy_width;
    let height = state.tuning.enemy_height;
    let max_x = state.tuning.viewport_width - width;
    let x = state.rng.random_range(0.0..=max_x);
    let y = platform_y - state.tuning.enemy_lift;

    let kind = if tier.patrol_speed > 0.0 && state.rng.random::<f32>() < tier.patrol_share {
        let half = state.tuning.patrol_half_range;
        let speed = tier.patrol_speed * state.profile.speed_multiplier;
        let vx = if state.rng.random_bool(0.5) { speed } else { -speed };
        EnemyKind::Patrolling {
            vx,
            min_x: (x - half).max(0.0),
            max_x: (x + half).min(max_x),
        }
    } else {
        EnemyKind::Static
    };

    let id = state.next_entity_id();
    log::debug!("Enemy {} spawned at y={:.0} ({:?})", id, y, kind);
    state.enemies.push(Enemy {
        id,
        pos: Vec2::new(x, y),
        width,
        height,
        kind,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::mode::GameMode;
    use crate::tuning::Tuning;

    #[test]
    fn test_tier_thresholds() {
        assert_eq!(tier_for_height(0).min_height, 0);
        assert_eq!(tier_for_height(499).min_height, 0);
        assert_eq!(tier_for_height(500).min_height, 500);
        assert_eq!(tier_for_height(1499).min_height, 500);
        assert_eq!(tier_for_height(1500).min_height, 1500);
        assert_eq!(tier_for_height(u32::MAX).min_height, 1500);
    }

    #[test]
    fn test_special_odds_strictly_increase_across_thresholds() {
        for pair in SPAWN_TIERS.windows(2) {
            assert!(pair[1].min_height > pair[0].min_height);
            assert!(pair[1].bouncy_chance > pair[0].bouncy_chance);
            assert!(pair[1].fragile_chance > pair[0].fragile_chance);
            assert!(pair[1].enemy_chance >= pair[0].enemy_chance);
        }
    }

    #[test]
    fn test_choose_kind_weights() {
        let tier = &SPAWN_TIERS[0];
        assert_eq!(choose_kind(0.0, tier), PlatformKind::Bouncy);
        assert_eq!(choose_kind(0.09, tier), PlatformKind::Bouncy);
        assert_eq!(choose_kind(0.12, tier), PlatformKind::Fragile);
        assert_eq!(choose_kind(0.16, tier), PlatformKind::Normal);
        assert_eq!(choose_kind(0.99, tier), PlatformKind::Normal);
    }

    #[test]
    fn test_generated_platforms_respect_gap_and_bounds() {
        let tuning = Tuning::default();
        let mut state = GameState::new(42, GameMode::Classic, tuning.clone());
        for _ in 0..200 {
            generate_next_platform(&mut state);
        }
        for pair in state.platforms.windows(2) {
            let gap = pair[0].pos.y - pair[1].pos.y;
            // World coordinates reach tens of thousands; allow for f32 rounding
            assert!(gap >= tuning.min_gap_y - 0.05 && gap <= tuning.max_gap_y + 0.05);
            assert!(pair[1].pos.x >= 0.0);
            assert!(pair[1].pos.x <= tuning.viewport_width - tuning.platform_width);
            assert!((pair[1].pos.x - pair[0].pos.x).abs() <= tuning.max_offset_x + 0.05);
        }
    }

    #[test]
    fn test_beans_only_above_normal_platforms() {
        let mut state = GameState::new(3, GameMode::Classic, Tuning::default());
        for _ in 0..300 {
            generate_next_platform(&mut state);
        }
        assert!(!state.beans.is_empty());
        for bean in &state.beans {
            let below = bean.pos.y + state.tuning.bean_lift;
            let owner = state
                .platforms
                .iter()
                .find(|p| (p.pos.y - below).abs() < 0.5)
                .expect("bean without platform");
            assert_eq!(owner.kind, PlatformKind::Normal);
        }
    }

    #[test]
    fn test_no_enemies_below_policy_height() {
        let mut state = GameState::new(11, GameMode::Classic, Tuning::default());
        for _ in 0..300 {
            generate_next_platform(&mut state);
        }
        // Height never advanced, classic policy starts at 200 m
        assert!(state.enemies.is_empty());
    }

    #[test]
    fn test_extreme_spawns_enemies_early() {
        let mut state = GameState::new(11, GameMode::Extreme, Tuning::default());
        for _ in 0..300 {
            generate_next_platform(&mut state);
        }
        assert!(!state.enemies.is_empty());
        let safe_line = state.start_y - state.tuning.viewport_height * 0.5;
        for enemy in &state.enemies {
            assert!(enemy.pos.y + state.tuning.enemy_lift <= safe_line);
            // First tier only hovers
            assert_eq!(enemy.kind, EnemyKind::Static);
        }
    }

    #[test]
    fn test_high_tier_spawns_patrols_within_viewport() {
        let mut state = GameState::new(5, GameMode::Classic, Tuning::default());
        state.height = 2000;
        for _ in 0..400 {
            generate_next_platform(&mut state);
        }
        let patrols: Vec<_> = state
            .enemies
            .iter()
            .filter_map(|e| match e.kind {
                EnemyKind::Patrolling { min_x, max_x, .. } => Some((min_x, max_x)),
                EnemyKind::Static => None,
            })
            .collect();
        assert!(!patrols.is_empty());
        let max_x = state.tuning.viewport_width - state.tuning.enemy_width;
        for (lo, hi) in patrols {
            assert!(lo >= 0.0 && hi <= max_x && lo <= hi);
        }
    }

    #[test]
    fn test_special_platforms_follow_height_tier() {
        fn special_share(height: u32) -> f32 {
            let mut state = GameState::new(21, GameMode::Classic, Tuning::default());
            state.height = height;
            let before = state.platforms.len();
            for _ in 0..2000 {
                generate_next_platform(&mut state);
            }
            let special = state.platforms[before..]
                .iter()
                .filter(|p| p.kind != PlatformKind::Normal)
                .count();
            special as f32 / 2000.0
        }

        let low = special_share(0);
        let high = special_share(2000);
        // First tier is 15 % special, the top tier 40 %
        assert!((0.10..0.20).contains(&low), "low tier share {low}");
        assert!((0.33..0.47).contains(&high), "high tier share {high}");
    }

    #[test]
    fn test_generation_is_deterministic_per_seed() {
        let a = GameState::new(99, GameMode::Classic, Tuning::default());
        let b = GameState::new(99, GameMode::Classic, Tuning::default());
        let pa: Vec<_> = a.platforms.iter().map(|p| (p.pos, p.kind)).collect();
        let pb: Vec<_> = b.platforms.iter().map(|p| (p.pos, p.kind)).collect();
        assert_eq!(pa, pb);
    }
}
