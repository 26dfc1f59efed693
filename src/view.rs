//! Camera-relative draw list
//!
//! A [`SceneView`] is a flat description of one frame in screen coordinates.
//! The browser layer paints it onto a 2D canvas; other hosts can take the
//! JSON form and draw it themselves.

use serde::Serialize;

use crate::sim::{GameState, PlatformKind};
use crate::theme::{BEAN_COLOR, BOUNCY_COLOR, ENEMY_COLOR, FRAGILE_COLOR, Theme};

/// Player glyph font size in pixels
pub const PLAYER_GLYPH_SIZE: f32 = 30.0;
/// Bean ellipse radii
pub const BEAN_RADII: (f32, f32) = (8.0, 10.0);
/// Peak displacement of a wobbling bouncy platform
pub const BOUNCE_AMPLITUDE: f32 = 5.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RectShape {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub color: &'static str,
    pub opacity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BeanShape {
    /// Centre
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlyphShape {
    /// Left edge
    pub x: f32,
    /// Text baseline
    pub y: f32,
    pub glyph: &'static str,
    pub size: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hud {
    pub height_m: u32,
    pub beans: u32,
    pub time_left: Option<u32>,
    pub mode: &'static str,
}

/// Everything needed to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneView {
    pub width: f32,
    pub height: f32,
    pub sky_top: &'static str,
    pub sky_bottom: &'static str,
    pub platforms: Vec<RectShape>,
    pub beans: Vec<BeanShape>,
    pub enemies: Vec<RectShape>,
    pub player: GlyphShape,
    pub hud: Hud,
}

impl SceneView {
    /// Snapshot the visible part of a round. `wobble` enables the bouncy
    /// platform animation (off under reduced motion).
    pub fn capture(
        state: &GameState,
        theme: &Theme,
        skin_glyph: &'static str,
        wobble: bool,
    ) -> Self {
        let tuning = &state.tuning;
        let cam = state.camera.y;
        let (vw, vh) = (tuning.viewport_width, tuning.viewport_height);
        let visible = |y: f32, h: f32| y + h >= 0.0 && y <= vh;

        let platforms = state
            .platforms
            .iter()
            .filter_map(|p| {
                let offset = if wobble {
                    bounce_offset(p.bounce_anim, tuning.bounce_anim_ticks)
                } else {
                    0.0
                };
                let y = p.pos.y - cam + offset;
                visible(y, p.height).then(|| RectShape {
                    x: p.pos.x,
                    y,
                    w: p.width,
                    h: p.height,
                    color: match p.kind {
                        PlatformKind::Normal => theme.platform,
                        PlatformKind::Bouncy => BOUNCY_COLOR,
                        PlatformKind::Fragile => FRAGILE_COLOR,
                    },
                    opacity: p.opacity(tuning.fragile_break_ticks),
                })
            })
            .collect();

        let beans = state
            .beans
            .iter()
            .filter(|b| !b.collected)
            .map(|b| BeanShape {
                x: b.pos.x,
                y: b.pos.y - cam,
            })
            .filter(|b| visible(b.y - BEAN_RADII.1, BEAN_RADII.1 * 2.0))
            .collect();

        let enemies = state
            .enemies
            .iter()
            .map(|e| RectShape {
                x: e.pos.x,
                y: e.pos.y - cam,
                w: e.width,
                h: e.height,
                color: ENEMY_COLOR,
                opacity: 1.0,
            })
            .filter(|e| visible(e.y, e.h))
            .collect();

        let player = &state.player;
        Self {
            width: vw,
            height: vh,
            sky_top: theme.sky_top,
            sky_bottom: theme.sky_bottom,
            platforms,
            beans,
            enemies,
            player: GlyphShape {
                x: player.pos.x,
                y: player.bottom() - cam - 5.0,
                glyph: skin_glyph,
                size: PLAYER_GLYPH_SIZE,
            },
            hud: Hud {
                height_m: state.height,
                beans: state.beans_collected,
                time_left: state.time_left,
                mode: state.mode.as_str(),
            },
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Vertical wobble for a platform with `remaining` animation ticks left
pub fn bounce_offset(remaining: u32, total: u32) -> f32 {
    if remaining == 0 || remaining > total {
        return 0.0;
    }
    let frame = (total - remaining + 1) as f32;
    (frame * 0.5).sin() * BOUNCE_AMPLITUDE
}
