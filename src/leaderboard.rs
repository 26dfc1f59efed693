//! Height leaderboard
//!
//! Entries are kept sorted by best height, highest first, and trimmed to
//! the top [`MAX_ENTRIES`].

use serde::{Deserialize, Serialize};

/// Maximum number of entries shown
pub const MAX_ENTRIES: usize = 10;

/// A single leaderboard entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Display name
    #[serde(rename = "username")]
    pub name: String,
    /// Best height in meters
    #[serde(rename = "high_score")]
    pub best_height: u32,
}

/// Height leaderboard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaderboard {
    #[serde(rename = "leaderboard")]
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    /// Build from unordered entries: highest first, ties in input order
    pub fn from_entries(entries: impl IntoIterator<Item = LeaderboardEntry>) -> Self {
        let mut entries: Vec<_> = entries.into_iter().collect();
        entries.sort_by(|a, b| b.best_height.cmp(&a.best_height));
        entries.truncate(MAX_ENTRIES);
        Self { entries }
    }

    /// Display lines: medal or rank, name, height
    pub fn display_lines(&self) -> Vec<String> {
        if self.entries.is_empty() {
            return vec!["Leaderboard is empty. Be the first!".to_string()];
        }
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| format!("{} {} - {} m", rank_label(i + 1), e.name, e.best_height))
            .collect()
    }
}

/// Medal for the podium, "n." for everyone else
pub fn rank_label(rank: usize) -> String {
    match rank {
        1 => "🥇".to_string(),
        2 => "🥈".to_string(),
        3 => "🥉".to_string(),
        n => format!("{}.", n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, best_height: u32) -> LeaderboardEntry {
        LeaderboardEntry {
            name: name.to_string(),
            best_height,
        }
    }

    #[test]
    fn test_sorted_descending_and_trimmed() {
        let board = Leaderboard::from_entries((1..=15).map(|i| entry(&format!("p{i}"), i * 10)));
        assert_eq!(board.entries.len(), MAX_ENTRIES);
        assert_eq!(board.entries[0], entry("p15", 150));
        assert!(
            board
                .entries
                .windows(2)
                .all(|w| w[0].best_height >= w[1].best_height)
        );
        assert_eq!(board.entries.last().map(|e| e.best_height), Some(60));
    }

    #[test]
    fn test_ties_keep_input_order() {
        let board = Leaderboard::from_entries([
            entry("alice", 300),
            entry("carol", 0),
            entry("bob", 300),
            entry("dave", 450),
        ]);
        let names: Vec<_> = board.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["dave", "alice", "bob", "carol"]);
    }

    #[test]
    fn test_display_lines() {
        assert_eq!(
            Leaderboard::default().display_lines(),
            vec!["Leaderboard is empty. Be the first!".to_string()]
        );
        let board = Leaderboard::from_entries((1..=4).map(|i| entry(&format!("p{i}"), i)));
        let lines = board.display_lines();
        assert_eq!(lines[0], "🥇 p4 - 4 m");
        assert_eq!(lines[3], "4. p1 - 1 m");
    }

    #[test]
    fn test_wire_format() {
        let json = r#"{"leaderboard":[{"username":"kat","high_score":420}]}"#;
        let board: Leaderboard = serde_json::from_str(json).unwrap();
        assert_eq!(board.entries, vec![entry("kat", 420)]);
    }
}
