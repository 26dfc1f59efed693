//! In-process backend with the game server's semantics
//!
//! Keeps one row per player plus a per-round history. Used by the native
//! binary and by tests; the browser build talks to the real server instead.

use std::collections::BTreeMap;

use super::{PlayerStats, RoundSubmission, StatsBackend};
use crate::error::BackendError;
use crate::leaderboard::{Leaderboard, LeaderboardEntry};
use crate::store::{self, SkinAction, SkinListing};

#[derive(Debug, Clone)]
struct PlayerRecord {
    username: Option<String>,
    first_name: Option<String>,
    stats: PlayerStats,
}

impl PlayerRecord {
    /// First name, then username, then a generated label
    fn display_name(&self, user_id: i64) -> String {
        self.first_name
            .clone()
            .or_else(|| self.username.clone())
            .unwrap_or_else(|| format!("Player {user_id}"))
    }
}

/// One submitted round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameRecord {
    pub user_id: i64,
    pub score: u32,
    pub beans: u32,
}

#[derive(Debug, Default)]
pub struct MemoryBackend {
    players: BTreeMap<i64, PlayerRecord>,
    games: Vec<GameRecord>,
    /// Number of upcoming calls that fail with a network error
    pub fail_next: u32,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or refresh a player row (bot `/start`)
    pub fn register_player(
        &mut self,
        user_id: i64,
        username: Option<String>,
        first_name: Option<String>,
    ) {
        let record = self.players.entry(user_id).or_insert_with(|| PlayerRecord {
            username: None,
            first_name: None,
            stats: PlayerStats::default(),
        });
        if username.is_some() {
            record.username = username;
        }
        if first_name.is_some() {
            record.first_name = first_name;
        }
    }

    /// Rounds submitted by a player, oldest first
    pub fn games_for(&self, user_id: i64) -> Vec<GameRecord> {
        self.games.iter().filter(|g| g.user_id == user_id).copied().collect()
    }

    fn check_network(&mut self) -> Result<(), BackendError> {
        if self.fail_next > 0 {
            self.fail_next -= 1;
            return Err(BackendError::Network("simulated outage".to_string()));
        }
        Ok(())
    }

    fn record_mut(&mut self, user_id: i64) -> Result<&mut PlayerRecord, BackendError> {
        self.players
            .get_mut(&user_id)
            .ok_or(BackendError::UnknownPlayer(user_id))
    }
}

impl StatsBackend for MemoryBackend {
    fn submit_round(&mut self, submission: &RoundSubmission) -> Result<PlayerStats, BackendError> {
        self.check_network()?;
        self.register_player(
            submission.user_id,
            submission.username.clone(),
            submission.first_name.clone(),
        );
        self.games.push(GameRecord {
            user_id: submission.user_id,
            score: submission.score,
            beans: submission.collected_beans,
        });

        let record = self.record_mut(submission.user_id)?;
        record
            .stats
            .record_round(submission.score, submission.collected_beans);
        log::debug!(
            "Stored round for {}: {} m, {} beans",
            submission.user_id,
            submission.score,
            submission.collected_beans
        );
        Ok(record.stats.clone())
    }

    fn fetch_stats(&mut self, user_id: i64) -> Result<PlayerStats, BackendError> {
        self.check_network()?;
        Ok(self.record_mut(user_id)?.stats.clone())
    }

    fn fetch_leaderboard(&mut self) -> Result<Leaderboard, BackendError> {
        self.check_network()?;
        Ok(Leaderboard::from_entries(
            self.players
                .iter()
                .filter(|(_, r)| r.stats.games_played > 0)
                .map(|(id, r)| LeaderboardEntry {
                    name: r.display_name(*id),
                    best_height: r.stats.best_height,
                }),
        ))
    }

    fn list_skins(&mut self, user_id: i64) -> Result<Vec<SkinListing>, BackendError> {
        self.check_network()?;
        Ok(store::listings(&self.record_mut(user_id)?.stats))
    }

    fn select_skin(&mut self, user_id: i64, skin_id: &str) -> Result<SkinAction, BackendError> {
        self.check_network()?;
        store::select_skin(&mut self.record_mut(user_id)?.stats, skin_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round(user_id: i64, score: u32, beans: u32) -> RoundSubmission {
        RoundSubmission {
            user_id,
            username: None,
            first_name: None,
            score,
            collected_beans: beans,
        }
    }

    #[test]
    fn test_submit_accumulates() {
        let mut backend = MemoryBackend::new();
        backend.submit_round(&round(1, 50, 4)).unwrap();
        let stats = backend.submit_round(&round(1, 30, 9)).unwrap();
        assert_eq!(stats.games_played, 2);
        assert_eq!(stats.total_beans, 13);
        assert_eq!(stats.best_height, 50);
        assert_eq!(stats.best_beans, 9);
        assert_eq!(backend.games_for(1).len(), 2);
        assert_eq!(backend.fetch_stats(1).unwrap(), stats);
    }

    #[test]
    fn test_unknown_player() {
        let mut backend = MemoryBackend::new();
        assert!(matches!(
            backend.fetch_stats(99),
            Err(BackendError::UnknownPlayer(99))
        ));
    }

    #[test]
    fn test_leaderboard_skips_idle_players_and_names_fallback() {
        let mut backend = MemoryBackend::new();
        backend.register_player(7, Some("idle".into()), None);
        backend.submit_round(&round(3, 200, 0)).unwrap();
        let mut named = round(4, 350, 0);
        named.username = Some("kat".into());
        named.first_name = Some("Kat".into());
        backend.submit_round(&named).unwrap();

        let board = backend.fetch_leaderboard().unwrap();
        assert_eq!(board.entries.len(), 2);
        assert_eq!(board.entries[0].name, "Kat");
        assert_eq!(board.entries[1].name, "Player 3");
    }

    #[test]
    fn test_simulated_outage_fails_then_recovers() {
        let mut backend = MemoryBackend::new();
        backend.fail_next = 1;
        assert!(matches!(
            backend.submit_round(&round(1, 10, 1)),
            Err(BackendError::Network(_))
        ));
        assert!(backend.games_for(1).is_empty());
        assert!(backend.submit_round(&round(1, 10, 1)).is_ok());
    }

    #[test]
    fn test_skin_purchase_through_backend() {
        let mut backend = MemoryBackend::new();
        backend.submit_round(&round(2, 10, 260)).unwrap();
        assert_eq!(
            backend.select_skin(2, "ninja").unwrap(),
            SkinAction::Purchased { price: 250 }
        );
        let stats = backend.fetch_stats(2).unwrap();
        assert_eq!(stats.total_beans, 10);
        let skins = backend.list_skins(2).unwrap();
        assert!(skins.iter().any(|s| s.id == "ninja" && s.owned && s.active));
    }
}
