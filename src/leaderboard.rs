//! Leaderboard and cloud sync decisions
//!
//! The remote backend is external. This module ranks what it returns
//! (top 50 by lifetime XP) and decides which side of a sync wins.

use serde::{Deserialize, Serialize};

use crate::error::GameResult;
use crate::platform::Storage;
use crate::progression::ProgressState;

/// Maximum number of leaderboard entries to keep
pub const MAX_ENTRIES: usize = 50;

/// A single leaderboard row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub name: String,
    #[serde(rename = "totalXP")]
    pub total_xp: u64,
    pub level: u32,
    pub prestige_level: u32,
    pub owned_sticks_count: usize,
}

impl Default for LeaderboardEntry {
    fn default() -> Self {
        Self {
            name: String::new(),
            total_xp: 0,
            level: 1,
            prestige_level: 0,
            owned_sticks_count: 0,
        }
    }
}

impl LeaderboardEntry {
    /// Public summary of a player's progress
    pub fn for_player(name: &str, progress: &ProgressState) -> Self {
        Self {
            name: name.to_string(),
            total_xp: progress.total_xp,
            level: progress.level,
            prestige_level: progress.prestige_level,
            owned_sticks_count: progress.owned_sticks.len(),
        }
    }
}

/// Ranked entries, highest lifetime XP first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    /// Cache key for the last fetched board
    pub const STORAGE_KEY: &'static str = "anordnen_leaderboard";

    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Rank an unordered batch, as fetched from the backend
    pub fn from_entries(mut entries: Vec<LeaderboardEntry>) -> Self {
        // Stable: equal XP keeps fetch order
        entries.sort_by(|a, b| b.total_xp.cmp(&a.total_xp));
        entries.truncate(MAX_ENTRIES);
        Self { entries }
    }

    /// Insert or update a player's row. Returns the 1-indexed rank, or None
    /// if the entry does not make the cut.
    pub fn submit(&mut self, entry: LeaderboardEntry) -> Option<usize> {
        if let Some(i) = self.entries.iter().position(|e| e.name == entry.name) {
            self.entries.remove(i);
        }

        let pos = self
            .entries
            .iter()
            .position(|e| entry.total_xp > e.total_xp)
            .unwrap_or(self.entries.len());
        if pos >= MAX_ENTRIES {
            return None;
        }
        self.entries.insert(pos, entry);
        self.entries.truncate(MAX_ENTRIES);
        Some(pos + 1)
    }

    /// 1-indexed rank of a player
    pub fn rank_of(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name).map(|i| i + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn top(&self) -> Option<&LeaderboardEntry> {
        self.entries.first()
    }

    pub fn load_from(storage: &dyn Storage) -> Self {
        match storage.get_item(Self::STORAGE_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<Leaderboard>(&json) {
                Ok(board) => {
                    log::info!("Loaded {} leaderboard entries", board.entries.len());
                    return Self::from_entries(board.entries);
                }
                Err(e) => log::warn!("Ignoring cached leaderboard: {}", e),
            },
            Ok(None) => {}
            Err(e) => log::warn!("Failed to read leaderboard: {}", e),
        }
        Self::new()
    }

    pub fn save_to(&self, storage: &dyn Storage) -> GameResult<()> {
        let json = serde_json::to_string(self)?;
        storage.set_item(Self::STORAGE_KEY, &json)
    }
}

/// Which side of a cloud sync is authoritative
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncDecision {
    /// Remote has more lifetime XP: replace local state
    UseRemote,
    /// Local has more lifetime XP, or there is no remote state: upload
    PushLocal,
    InSync,
}

/// Greater lifetime XP wins
pub fn decide_sync(local: &ProgressState, remote: Option<&ProgressState>) -> SyncDecision {
    let decision = match remote {
        None => SyncDecision::PushLocal,
        Some(remote) if remote.total_xp > local.total_xp => SyncDecision::UseRemote,
        Some(remote) if local.total_xp > remote.total_xp => SyncDecision::PushLocal,
        Some(_) => SyncDecision::InSync,
    };
    log::info!("Cloud sync: {:?}", decision);
    decision
}
