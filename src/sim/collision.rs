//! Collision tests between the player and world entities
//!
//! Everything is an axis-aligned rectangle except beans, which are picked up
//! by distance from the player's centre.

use glam::Vec2;

use super::state::{Enemy, Platform, Player};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_rect(pos: Vec2, width: f32, height: f32) -> Self {
        Self {
            min: pos,
            max: pos + Vec2::new(width, height),
        }
    }

    /// Strict overlap; touching edges do not count
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }
}

impl Player {
    pub fn aabb(&self) -> Aabb {
        Aabb::from_rect(self.pos, self.width, self.height)
    }
}

impl Enemy {
    pub fn aabb(&self) -> Aabb {
        Aabb::from_rect(self.pos, self.width, self.height)
    }
}

/// Whether the player's feet crossed the platform's top band this tick.
///
/// `prev_bottom` is the player's lower edge before vertical integration.
/// Only a falling player can land; the band test is swept so a fast fall
/// cannot tunnel through a thin platform.
pub fn lands_on(player: &Player, prev_bottom: f32, platform: &Platform) -> bool {
    player.vel.y > 0.0
        && platform.is_solid()
        && player.pos.x < platform.pos.x + platform.width
        && player.pos.x + player.width > platform.pos.x
        && prev_bottom <= platform.bottom()
        && player.bottom() >= platform.top()
}

/// Index of the first platform (in creation order) the player lands on
pub fn find_landing(player: &Player, prev_bottom: f32, platforms: &[Platform]) -> Option<usize> {
    platforms
        .iter()
        .position(|platform| lands_on(player, prev_bottom, platform))
}

/// Whether a bean centred at `bean` is within reach of the player's centre
#[inline]
pub fn within_pickup(player: &Player, bean: Vec2, radius: f32) -> bool {
    player.center().distance_squared(bean) < radius * radius
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::mode::ModeProfile;
    use crate::sim::state::PlatformKind;
    use crate::tuning::Tuning;

    fn player_at(x: f32, y: f32, vy: f32) -> Player {
        let mut player = Player::new(&Tuning::default(), &ModeProfile::default());
        player.pos = Vec2::new(x, y);
        player.vel = Vec2::new(0.0, vy);
        player
    }

    fn platform_at(x: f32, y: f32) -> Platform {
        Platform {
            id: 1,
            pos: Vec2::new(x, y),
            width: 85.0,
            height: 15.0,
            kind: PlatformKind::Normal,
            breaking: None,
            bounce_anim: 0,
        }
    }

    #[test]
    fn test_falling_player_lands() {
        // Feet went from 678 to 682 across a platform top at 680
        let player = player_at(170.0, 652.0, 4.0);
        assert!(lands_on(&player, 678.0, &platform_at(160.0, 680.0)));
    }

    #[test]
    fn test_rising_player_passes_through() {
        let player = player_at(170.0, 652.0, -4.0);
        assert!(!lands_on(&player, 686.0, &platform_at(160.0, 680.0)));
        let player = player_at(170.0, 652.0, 0.0);
        assert!(!lands_on(&player, 682.0, &platform_at(160.0, 680.0)));
    }

    #[test]
    fn test_fast_fall_does_not_tunnel() {
        // Feet jumped from 670 to 720 in one tick, past a 15-unit platform
        let player = player_at(170.0, 690.0, 50.0);
        assert!(lands_on(&player, 670.0, &platform_at(160.0, 680.0)));
    }

    #[test]
    fn test_player_already_below_platform_does_not_land() {
        let player = player_at(170.0, 680.0, 3.0);
        assert!(!lands_on(&player, 707.0, &platform_at(160.0, 680.0)));
    }

    #[test]
    fn test_horizontal_miss() {
        let player = player_at(250.0, 652.0, 4.0);
        assert!(!lands_on(&player, 678.0, &platform_at(160.0, 680.0)));
        // Touching edges only
        let player = player_at(130.0, 652.0, 4.0);
        assert!(!lands_on(&player, 678.0, &platform_at(160.0, 680.0)));
    }

    #[test]
    fn test_breaking_platform_is_not_solid() {
        let player = player_at(170.0, 652.0, 4.0);
        let mut platform = platform_at(160.0, 680.0);
        platform.breaking = Some(5);
        assert!(!lands_on(&player, 678.0, &platform));
    }

    #[test]
    fn test_first_match_in_creation_order_wins() {
        // Feet swept 660 -> 700, crossing both overlapping platforms
        let player = player_at(170.0, 670.0, 30.0);
        let platforms = [
            platform_at(0.0, 0.0),
            platform_at(160.0, 690.0),
            platform_at(150.0, 675.0),
        ];
        assert_eq!(find_landing(&player, 660.0, &platforms), Some(1));
    }

    #[test]
    fn test_pickup_radius() {
        let player = player_at(100.0, 100.0, 0.0);
        // Centre is (115, 115)
        assert!(within_pickup(&player, Vec2::new(115.0, 90.5), 25.0));
        assert!(!within_pickup(&player, Vec2::new(115.0, 90.0), 25.0));
    }

    #[test]
    fn test_aabb_overlap() {
        let a = Aabb::from_rect(Vec2::ZERO, 10.0, 10.0);
        assert!(a.overlaps(&Aabb::from_rect(Vec2::new(9.0, 9.0), 10.0, 10.0)));
        assert!(!a.overlaps(&Aabb::from_rect(Vec2::new(10.0, 0.0), 10.0, 10.0)));
    }
}
