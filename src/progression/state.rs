//! Player progression state
//!
//! Flat and serializable: this is exactly what gets saved locally and
//! pushed to the cloud.

use serde::{Deserialize, Serialize};

use crate::catalog::{ALL_STICKS, DEFAULT_STICKS, StickId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProgressState {
    /// Player level, starts at 1
    pub level: u32,
    /// XP into the current level, always below the level's requirement
    #[serde(rename = "currentXP")]
    pub current_xp: u64,
    /// Lifetime XP (kept across prestige)
    #[serde(rename = "totalXP")]
    pub total_xp: u64,
    /// Currency balance
    pub diamonds: u64,
    /// Owned sticks, ascending
    pub owned_sticks: Vec<StickId>,
    pub prestige_level: u32,
    #[serde(rename = "xpMultiplier")]
    pub xp_multiplier: f64,
    pub diamond_multiplier: f64,
    pub total_sorts: u64,
    pub total_diamonds_earned: u64,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self {
            level: 1,
            current_xp: 0,
            total_xp: 0,
            diamonds: 0,
            owned_sticks: DEFAULT_STICKS.to_vec(),
            prestige_level: 0,
            xp_multiplier: 1.0,
            diamond_multiplier: 1.0,
            total_sorts: 0,
            total_diamonds_earned: 0,
        }
    }
}

impl ProgressState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn owns(&self, id: StickId) -> bool {
        self.owned_sticks.contains(&id)
    }

    /// Repair state from outside the game (old saves, cloud snapshots).
    ///
    /// Owned sticks become catalog ids only, always including the default
    /// set, ascending and unique. Level is at least 1.
    pub fn normalize(&mut self) {
        self.owned_sticks.retain(|id| ALL_STICKS.contains(id));
        self.owned_sticks.extend(DEFAULT_STICKS);
        self.owned_sticks.sort_unstable();
        self.owned_sticks.dedup();
        self.level = self.level.max(1);
    }

    /// Add to the owned set, keeping it sorted
    pub(crate) fn add_owned(&mut self, id: StickId) {
        if let Err(pos) = self.owned_sticks.binary_search(&id) {
            self.owned_sticks.insert(pos, id);
        }
    }

    /// Multipliers of zero or below (hand-edited saves) count as 1
    pub(crate) fn effective_xp_multiplier(&self) -> f64 {
        if self.xp_multiplier > 0.0 { self.xp_multiplier } else { 1.0 }
    }

    pub(crate) fn effective_diamond_multiplier(&self) -> f64 {
        if self.diamond_multiplier > 0.0 { self.diamond_multiplier } else { 1.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = ProgressState::new();
        assert_eq!(state.level, 1);
        assert_eq!(state.owned_sticks, DEFAULT_STICKS.to_vec());
        assert_eq!(state.xp_multiplier, 1.0);
    }

    #[test]
    fn test_add_owned_keeps_order_and_uniqueness() {
        let mut state = ProgressState::new();
        state.add_owned(4);
        state.add_owned(1);
        state.add_owned(4);
        assert_eq!(state.owned_sticks, vec![1, 2, 3, 4, 5, 7, 10, 11, 13]);
    }

    #[test]
    fn test_normalize_repairs_owned_sticks() {
        let mut state = ProgressState::new();
        state.owned_sticks = vec![14, 3, 99, 3];
        state.level = 0;
        state.normalize();
        assert_eq!(state.owned_sticks, vec![2, 3, 5, 7, 10, 11, 13, 14]);
        assert_eq!(state.level, 1);

        let mut fresh = ProgressState::new();
        fresh.normalize();
        assert_eq!(fresh, ProgressState::new());
    }

    #[test]
    fn test_serializes_with_save_field_names() {
        let json = serde_json::to_value(ProgressState::new()).unwrap();
        for key in [
            "level",
            "currentXP",
            "totalXP",
            "diamonds",
            "ownedSticks",
            "prestigeLevel",
            "xpMultiplier",
            "diamondMultiplier",
            "totalSorts",
            "totalDiamondsEarned",
        ] {
            assert!(json.get(key).is_some(), "missing {}", key);
        }
    }
}
