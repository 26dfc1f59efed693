//! Stats, leaderboard and skin store collaborators
//!
//! Wire types match the game server's JSON endpoints:
//! - `POST /save_stats` with a [`RoundSubmission`]
//! - `GET /stats/{user_id}` returning [`PlayerStats`]
//! - `GET /leaderboard` returning a [`Leaderboard`]
//! - `POST /save_skins` with a [`SkinSelection`]
//!
//! [`StatsBackend`] is the synchronous seam used by native builds and tests;
//! the browser build talks to the same endpoints asynchronously through
//! [`http::HttpBackend`].

#[cfg(target_arch = "wasm32")]
pub mod http;
pub mod memory;

pub use memory::MemoryBackend;

use serde::{Deserialize, Serialize};

use crate::error::BackendError;
use crate::leaderboard::Leaderboard;
use crate::store::{DEFAULT_SKIN, SkinAction, SkinListing};

/// Who is playing, as reported by the Telegram launch parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerIdentity {
    /// Telegram user id; absent when opened outside Telegram
    pub id: Option<i64>,
    pub username: String,
    pub first_name: Option<String>,
}

impl Default for PlayerIdentity {
    fn default() -> Self {
        Self {
            id: None,
            username: "Player".to_string(),
            first_name: None,
        }
    }
}

/// Cumulative per-player numbers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerStats {
    #[serde(rename = "high_score")]
    pub best_height: u32,
    /// Lifetime beans, also the store currency
    pub total_beans: u32,
    pub games_played: u32,
    /// Most beans collected in a single round
    #[serde(rename = "best_coffee")]
    pub best_beans: u32,
    #[serde(with = "json_list")]
    pub purchased_skins: Vec<String>,
    pub current_skin: String,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            best_height: 0,
            total_beans: 0,
            games_played: 0,
            best_beans: 0,
            purchased_skins: vec![DEFAULT_SKIN.to_string()],
            current_skin: DEFAULT_SKIN.to_string(),
        }
    }
}

impl PlayerStats {
    pub fn owns(&self, skin: &str) -> bool {
        skin == DEFAULT_SKIN || self.purchased_skins.iter().any(|s| s == skin)
    }

    /// Fold one finished round into the totals
    pub fn record_round(&mut self, height: u32, beans: u32) {
        self.games_played = self.games_played.saturating_add(1);
        self.total_beans = self.total_beans.saturating_add(beans);
        self.best_height = self.best_height.max(height);
        self.best_beans = self.best_beans.max(beans);
    }
}

/// Result of one round, sent once when the round ends
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSubmission {
    pub user_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    /// Height reached, in meters
    pub score: u32,
    pub collected_beans: u32,
}

/// Skin ownership update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkinSelection {
    pub user_id: i64,
    #[serde(with = "json_list")]
    pub purchased_skins: Vec<String>,
    pub current_skin: String,
}

/// Server-side collaborator for stats, leaderboard and skins
pub trait StatsBackend {
    /// Persist a finished round; returns the updated totals
    fn submit_round(&mut self, submission: &RoundSubmission) -> Result<PlayerStats, BackendError>;

    fn fetch_stats(&mut self, user_id: i64) -> Result<PlayerStats, BackendError>;

    /// Top players by best height
    fn fetch_leaderboard(&mut self) -> Result<Leaderboard, BackendError>;

    fn list_skins(&mut self, user_id: i64) -> Result<Vec<SkinListing>, BackendError>;

    /// Buy (if needed) and equip a skin
    fn select_skin(&mut self, user_id: i64, skin_id: &str) -> Result<SkinAction, BackendError>;
}

/// The server stores skin lists as a JSON-encoded string; accept either that
/// or a plain array, always write the encoded form.
mod json_list {
    use serde::de::{self, Deserializer};
    use serde::ser::{self, Serializer};
    use serde::{Deserialize, Serialize};

    pub fn serialize<S: Serializer>(list: &[String], serializer: S) -> Result<S::Ok, S::Error> {
        let encoded = serde_json::to_string(list).map_err(ser::Error::custom)?;
        encoded.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<String>, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Encoded(String),
            Plain(Vec<String>),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Encoded(s) => serde_json::from_str(&s).map_err(de::Error::custom),
            Repr::Plain(list) => Ok(list),
        }
    }
}
