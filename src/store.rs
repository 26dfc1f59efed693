//! Skin catalogue and purchase rules
//!
//! Skins are paid for with lifetime beans. Buying a skin also equips it;
//! equipping an owned skin is free.

use serde::{Deserialize, Serialize};

use crate::backend::PlayerStats;
use crate::error::BackendError;

/// Skin every player owns
pub const DEFAULT_SKIN: &str = "default";

/// A cosmetic player glyph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Skin {
    pub id: &'static str,
    pub name: &'static str,
    pub glyph: &'static str,
    pub price: u32,
}

pub const SKINS: [Skin; 5] = [
    Skin {
        id: DEFAULT_SKIN,
        name: "Classic",
        glyph: "🤖",
        price: 0,
    },
    Skin {
        id: "ninja",
        name: "Ninja",
        glyph: "🥷",
        price: 250,
    },
    Skin {
        id: "wizard",
        name: "Wizard",
        glyph: "🧙",
        price: 300,
    },
    Skin {
        id: "alien",
        name: "Alien",
        glyph: "👽",
        price: 350,
    },
    Skin {
        id: "superhero",
        name: "Superhero",
        glyph: "🦸",
        price: 500,
    },
];

pub fn find_skin(id: &str) -> Option<&'static Skin> {
    SKINS.iter().find(|s| s.id == id)
}

/// Glyph for a skin id, falling back to the default skin
pub fn glyph_for(id: &str) -> &'static str {
    find_skin(id).unwrap_or(&SKINS[0]).glyph
}

/// A catalogue row as shown in the customise screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkinListing {
    pub id: String,
    pub name: String,
    pub price: u32,
    pub owned: bool,
    pub active: bool,
    /// Not owned and not affordable
    pub locked: bool,
}

impl SkinListing {
    /// Button caption in the customise screen
    pub fn label(&self) -> String {
        if self.active {
            format!("{} ✓", self.name)
        } else if self.owned {
            self.name.clone()
        } else if self.locked {
            format!("{} 🔒 {}", self.name, self.price)
        } else {
            format!("{} ({} beans)", self.name, self.price)
        }
    }
}

/// What a successful selection did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkinAction {
    /// Already owned, now equipped
    Activated,
    /// Bought and equipped
    Purchased { price: u32 },
}

/// Catalogue annotated with the player's ownership
pub fn listings(stats: &PlayerStats) -> Vec<SkinListing> {
    SKINS
        .iter()
        .map(|skin| {
            let owned = stats.owns(skin.id);
            SkinListing {
                id: skin.id.to_string(),
                name: skin.name.to_string(),
                price: skin.price,
                owned,
                active: stats.current_skin == skin.id,
                locked: !owned && stats.total_beans < skin.price,
            }
        })
        .collect()
}

/// Buy (if needed) and equip a skin
pub fn select_skin(stats: &mut PlayerStats, id: &str) -> Result<SkinAction, BackendError> {
    let skin = find_skin(id).ok_or_else(|| BackendError::UnknownSkin(id.to_string()))?;

    if stats.owns(skin.id) {
        stats.current_skin = skin.id.to_string();
        return Ok(SkinAction::Activated);
    }

    if stats.total_beans < skin.price {
        return Err(BackendError::InsufficientBeans {
            price: skin.price,
            available: stats.total_beans,
        });
    }

    stats.total_beans -= skin.price;
    stats.purchased_skins.push(skin.id.to_string());
    stats.current_skin = skin.id.to_string();
    log::info!("Purchased skin '{}' for {} beans", skin.id, skin.price);
    Ok(SkinAction::Purchased { price: skin.price })
}
