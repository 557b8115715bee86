//! Data-driven game balance
//!
//! All numbers that shape rewards, prices, layout and animation timing.
//! Defaults match the shipped game; a JSON override may replace any subset.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::StickId;
use crate::error::GameResult;

/// Reward formula inputs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RewardTuning {
    /// XP per stick per completed sort
    pub base_xp_per_sort: u64,
    /// Flat diamonds per completed sort
    pub base_diamonds_per_sort: u64,
    /// XP needed for level 1
    pub xp_curve_base: f64,
    /// Growth factor of the XP requirement per level
    pub xp_curve_growth: f64,
    /// Extra XP per sort for each owned stick
    pub stick_xp_bonus: BTreeMap<StickId, u64>,
    /// Extra diamonds per sort for each owned stick
    pub stick_diamond_bonus: BTreeMap<StickId, u64>,
}

impl Default for RewardTuning {
    fn default() -> Self {
        Self {
            base_xp_per_sort: 10,
            base_diamonds_per_sort: 2,
            xp_curve_base: 100.0,
            xp_curve_growth: 1.15,
            stick_xp_bonus: BTreeMap::from([(1, 5), (4, 10), (6, 20), (8, 35), (9, 55), (12, 80), (14, 120)]),
            stick_diamond_bonus: BTreeMap::from([
                (1, 2),
                (4, 4),
                (6, 8),
                (8, 12),
                (9, 16),
                (12, 20),
                (14, 40),
            ]),
        }
    }
}

/// Stick row layout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutTuning {
    pub canvas_width: f32,
    pub canvas_height: f32,
    /// Vertical position of every stick's top edge
    pub base_y: f32,
    /// Horizontal space between visible stick content
    pub spacing: f32,
    /// Horizontal space reserved outside the row (both sides together)
    pub side_margin: f32,
    /// Scale used when the row fits the canvas
    pub base_scale: f32,
    /// Extra room opened up where a dragged stick would land
    pub insertion_gap: f32,
}

impl Default for LayoutTuning {
    fn default() -> Self {
        Self {
            canvas_width: 1200.0,
            canvas_height: 700.0,
            base_y: 100.0,
            spacing: 20.0,
            side_margin: 100.0,
            base_scale: 0.25,
            insertion_gap: 80.0,
        }
    }
}

/// Pixel hit-testing
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HitboxTuning {
    /// A pixel is solid when its alpha is strictly above this
    pub alpha_threshold: u8,
    /// Grows the content box on every side
    pub padding: u32,
}

impl Default for HitboxTuning {
    fn default() -> Self {
        Self {
            alpha_threshold: 10,
            padding: 5,
        }
    }
}

/// Drag and animation timing
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MotionTuning {
    /// Pointer travel (px) before a press becomes a drag
    pub drag_threshold: f32,
    /// Slide tween duration (seconds)
    pub slide_duration: f32,
    /// How long the success message stays up before reshuffling (seconds)
    pub success_message_duration: f32,
}

impl Default for MotionTuning {
    fn default() -> Self {
        Self {
            drag_threshold: 5.0,
            slide_duration: 0.2,
            success_message_duration: 1.5,
        }
    }
}

/// Complete balance sheet
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Tuning {
    pub rewards: RewardTuning,
    pub layout: LayoutTuning,
    pub hitbox: HitboxTuning,
    pub motion: MotionTuning,
    /// Shop price per purchasable stick
    pub prices: BTreeMap<StickId, u64>,
    /// XP multiplier gained per prestige level
    pub prestige_xp_bonus: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            rewards: RewardTuning::default(),
            layout: LayoutTuning::default(),
            hitbox: HitboxTuning::default(),
            motion: MotionTuning::default(),
            prices: BTreeMap::from([(1, 25), (4, 50), (6, 100), (8, 200), (9, 400), (12, 600), (14, 1000)]),
            prestige_xp_bonus: 0.25,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON override; missing fields keep defaults
    pub fn from_json(json: &str) -> GameResult<Self> {
        let tuning = serde_json::from_str(json)?;
        Ok(tuning)
    }

    pub fn price(&self, id: StickId) -> Option<u64> {
        self.prices.get(&id).copied()
    }

    pub fn xp_bonus(&self, id: StickId) -> u64 {
        self.rewards.stick_xp_bonus.get(&id).copied().unwrap_or(0)
    }

    pub fn diamond_bonus(&self, id: StickId) -> u64 {
        self.rewards.stick_diamond_bonus.get(&id).copied().unwrap_or(0)
    }

    /// XP multiplier for a prestige level
    pub fn xp_multiplier_for(&self, prestige_level: u32) -> f64 {
        1.0 + prestige_level as f64 * self.prestige_xp_bonus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PURCHASABLE_STICKS;

    #[test]
    fn test_every_purchasable_stick_has_a_price() {
        let tuning = Tuning::default();
        for id in PURCHASABLE_STICKS {
            assert!(tuning.price(id).is_some(), "stick {} has no price", id);
        }
        assert_eq!(tuning.price(2), None);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "prices": { "1": 10 }, "motion": { "dragThreshold": 8.0 } }"#)
            .unwrap();
        assert_eq!(tuning.price(1), Some(10));
        assert_eq!(tuning.price(4), None);
        assert_eq!(tuning.motion.drag_threshold, 8.0);
        assert_eq!(tuning.motion.slide_duration, 0.2);
        assert_eq!(tuning.layout.canvas_width, 1200.0);
    }

    #[test]
    fn test_bonus_lookup_defaults_to_zero() {
        let tuning = Tuning::default();
        assert_eq!(tuning.xp_bonus(14), 120);
        assert_eq!(tuning.xp_bonus(2), 0);
        assert_eq!(tuning.diamond_bonus(2), 0);
    }

    #[test]
    fn test_xp_multiplier_per_prestige() {
        let tuning = Tuning::default();
        assert_eq!(tuning.xp_multiplier_for(0), 1.0);
        assert_eq!(tuning.xp_multiplier_for(1), 1.25);
        assert_eq!(tuning.xp_multiplier_for(4), 2.0);
    }
}
