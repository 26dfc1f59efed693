//! Seasonal colour palettes

use serde::{Deserialize, Serialize};

use crate::sim::Background;

/// Palette family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
    Halloween,
    Valentines,
    Night,
}

/// Colours used to draw a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Theme {
    pub season: Season,
    /// Vertical gradient, top then bottom
    pub sky_top: &'static str,
    pub sky_bottom: &'static str,
    /// Colour of normal platforms
    pub platform: &'static str,
}

pub const BOUNCY_COLOR: &str = "#32CD32";
pub const FRAGILE_COLOR: &str = "#FF4500";
pub const BEAN_COLOR: &str = "#6F4E37";
pub const ENEMY_COLOR: &str = "#8B0000";

impl Theme {
    pub const fn for_season(season: Season) -> Self {
        let (sky_top, sky_bottom, platform) = match season {
            Season::Spring => ("#87CEEB", "#98FB98", "#8B4513"),
            Season::Summer => ("#42C2FF", "#FFD700", "#D2691E"),
            Season::Autumn => ("#F39C12", "#E74C3C", "#A0522D"),
            Season::Winter => ("#FFFFFF", "#B0E0E6", "#A9A9A9"),
            Season::Halloween => ("#1A1A1A", "#4A00E0", "#FF7F50"),
            Season::Valentines => ("#FFC0CB", "#FF69B4", "#DB7093"),
            Season::Night => ("#0B1026", "#2C3E50", "#708090"),
        };
        Self {
            season,
            sky_top,
            sky_bottom,
            platform,
        }
    }

    /// Palette for a calendar date (`month` is 1-based)
    pub fn for_date(month: u32, day: u32) -> Self {
        let season = match (month, day) {
            (10, 24..=31) => Season::Halloween,
            (2, 7..=14) => Season::Valentines,
            (3..=5, _) => Season::Spring,
            (6..=8, _) => Season::Summer,
            (9..=11, _) => Season::Autumn,
            _ => Season::Winter,
        };
        Self::for_season(season)
    }

    /// Seasonal palette unless the mode asks for a night sky
    pub fn resolve(month: u32, day: u32, background: Background) -> Self {
        match background {
            Background::Night => Self::for_season(Season::Night),
            Background::Day => Self::for_date(month, day),
        }
    }

    /// Today's palette from the browser clock
    #[cfg(target_arch = "wasm32")]
    pub fn today(background: Background) -> Self {
        let now = js_sys::Date::new_0();
        Self::resolve(now.get_month() + 1, now.get_date(), background)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::for_season(Season::Spring)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_holidays_win_over_seasons() {
        assert_eq!(Theme::for_date(10, 24).season, Season::Halloween);
        assert_eq!(Theme::for_date(10, 31).season, Season::Halloween);
        assert_eq!(Theme::for_date(10, 23).season, Season::Autumn);
        assert_eq!(Theme::for_date(2, 7).season, Season::Valentines);
        assert_eq!(Theme::for_date(2, 15).season, Season::Winter);
    }

    #[test]
    fn test_seasons() {
        assert_eq!(Theme::for_date(3, 1).season, Season::Spring);
        assert_eq!(Theme::for_date(7, 15).season, Season::Summer);
        assert_eq!(Theme::for_date(11, 30).season, Season::Autumn);
        assert_eq!(Theme::for_date(12, 25).season, Season::Winter);
        assert_eq!(Theme::for_date(1, 1).season, Season::Winter);
    }

    #[test]
    fn test_night_overrides_calendar() {
        let theme = Theme::resolve(10, 31, Background::Night);
        assert_eq!(theme.season, Season::Night);
        assert_eq!(Theme::resolve(7, 1, Background::Day).platform, "#D2691E");
    }
}
