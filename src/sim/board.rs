//! Stick arrangement and row layout
//!
//! The board owns every stick record and the left-to-right order of the
//! owned sticks. Layout keeps positions consistent with that order, except
//! for a stick currently held by the drag controller.

use std::collections::BTreeMap;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::stick::Stick;
use crate::catalog::{DEFAULT_STICKS, StickId};
use crate::error::{GameError, GameResult};
use crate::hitbox::HitboxCache;
use crate::platform::AssetProvider;
use crate::tuning::LayoutTuning;

/// Ordered row of owned sticks
#[derive(Debug)]
pub struct Board {
    layout: LayoutTuning,
    /// Loaded owned sticks, ascending
    owned: Vec<StickId>,
    /// Current visual order
    arrangement: Vec<StickId>,
    sticks: BTreeMap<StickId, Stick>,
    scale: f32,
    /// Stick count the scale was last computed for
    scaled_for: Option<usize>,
    rng: Pcg32,
}

impl Board {
    pub fn new(layout: LayoutTuning, seed: u64) -> Self {
        let scale = layout.base_scale;
        Self {
            layout,
            owned: Vec::new(),
            arrangement: Vec::new(),
            sticks: BTreeMap::new(),
            scale,
            scaled_for: None,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Rebuild the board for an owned set and deal a fresh shuffle.
    ///
    /// Sticks without an image are skipped. Skipped and degenerate sticks
    /// are reported back; neither aborts the load.
    pub fn initialize(
        &mut self,
        owned: &[StickId],
        assets: &dyn AssetProvider,
        hitboxes: &mut HitboxCache,
    ) -> Vec<GameError> {
        let mut ids = owned.to_vec();
        ids.sort_unstable();
        ids.dedup();

        self.sticks.clear();
        self.owned.clear();

        let mut issues = Vec::new();
        for id in ids {
            match self.load_stick(id, assets, hitboxes) {
                Ok(()) => {
                    self.owned.push(id);
                    if self.sticks[&id].hitbox.is_degenerate() {
                        log::warn!("Stick {} has no opaque pixels and cannot be picked up", id);
                        issues.push(GameError::DegenerateHitbox(id));
                    }
                }
                Err(e) => {
                    log::warn!("Skipping stick: {}", e);
                    issues.push(e);
                }
            }
        }

        self.calculate_scale();
        self.shuffle();
        issues
    }

    fn load_stick(
        &mut self,
        id: StickId,
        assets: &dyn AssetProvider,
        hitboxes: &mut HitboxCache,
    ) -> GameResult<()> {
        let image = assets.stick_image(id).ok_or(GameError::AssetMissing(id))?;
        let hitbox = hitboxes.calculate(image, id);
        self.sticks.insert(id, Stick::new(id, hitbox, self.scale));
        Ok(())
    }

    /// Recompute the shared scale, only when the stick count changed
    fn calculate_scale(&mut self) {
        let count = self.owned.len();
        if self.scaled_for == Some(count) {
            return;
        }
        self.scaled_for = Some(count);

        let base = self.layout.base_scale;
        let content: f32 = self
            .owned
            .iter()
            .filter_map(|id| self.sticks.get(id))
            .map(|s| s.hitbox.content_bounds.width)
            .sum();
        let spacing = count.saturating_sub(1) as f32 * self.layout.spacing;
        let max_width = self.layout.canvas_width - self.layout.side_margin;

        self.scale = if content * base + spacing > max_width && content > 0.0 && max_width > spacing {
            // Shrink content so content + fixed spacing fills the usable width exactly
            (max_width - spacing) / content
        } else {
            base
        };

        for stick in self.sticks.values_mut() {
            stick.scale = self.scale;
        }

        log::debug!("Scale {:.3} for {} sticks", self.scale, count);
    }

    /// Random order that is never already sorted (for two or more sticks)
    pub fn shuffle(&mut self) {
        self.arrangement = self.owned.clone();

        for i in (1..self.arrangement.len()).rev() {
            let j = self.rng.random_range(0..=i);
            self.arrangement.swap(i, j);
        }

        // A sorted deal would be an instant win, swap the first two instead
        if self.arrangement.len() > 1 && self.is_sorted() {
            self.arrangement.swap(0, 1);
        }

        self.update_positions();
    }

    /// Ascending by id, left to right
    pub fn is_sorted(&self) -> bool {
        self.arrangement.windows(2).all(|w| w[0] <= w[1])
    }

    fn scaled_widths(&self, order: &[StickId]) -> Vec<f32> {
        order
            .iter()
            .map(|id| self.sticks.get(id).map_or(0.0, |s| s.content_width(self.scale)))
            .collect()
    }

    fn row_start(&self, widths: &[f32], extra: f32) -> f32 {
        let total = widths.iter().sum::<f32>()
            + widths.len().saturating_sub(1) as f32 * self.layout.spacing
            + extra;
        (self.layout.canvas_width - total) / 2.0
    }

    /// Lay the row out centered; held sticks keep their position but still take up their slot
    pub fn update_positions(&mut self) {
        let widths = self.scaled_widths(&self.arrangement);
        let mut x = self.row_start(&widths, 0.0);
        let base_y = self.layout.base_y;
        let spacing = self.layout.spacing;

        for (id, width) in self.arrangement.iter().zip(&widths) {
            if let Some(stick) = self.sticks.get_mut(id) {
                if !stick.dragging {
                    let content_offset = stick.hitbox.content_bounds.x * stick.scale;
                    stick.target = Vec2::new(x - content_offset, base_y);
                    stick.pos = stick.target;
                }
            }
            x += width + spacing;
        }
    }

    /// Targets for the row without `exclude`, with an extra gap opened before `index`.
    ///
    /// Only targets change; the caller animates sticks toward them.
    pub fn update_positions_with_gap(&mut self, index: usize, exclude: StickId) {
        let order: Vec<StickId> = self.arrangement.iter().copied().filter(|&id| id != exclude).collect();
        let widths = self.scaled_widths(&order);
        let gap = self.layout.insertion_gap;
        let mut x = self.row_start(&widths, gap);
        let base_y = self.layout.base_y;
        let spacing = self.layout.spacing;

        for (i, (id, width)) in order.iter().zip(&widths).enumerate() {
            if i == index {
                x += gap;
            }
            if let Some(stick) = self.sticks.get_mut(id) {
                let content_offset = stick.hitbox.content_bounds.x * stick.scale;
                stick.target = Vec2::new(x - content_offset, base_y);
            }
            x += width + spacing;
        }
        // index >= len: the gap sits after the last stick, already counted in the row width
    }

    /// Slot a stick at canvas x would drop into, ignoring `exclude`
    pub fn insertion_index(&self, x: f32, exclude: StickId) -> usize {
        let order: Vec<&Stick> = self
            .arrangement
            .iter()
            .filter(|&&id| id != exclude)
            .filter_map(|id| self.sticks.get(id))
            .collect();

        order
            .iter()
            .position(|stick| x < stick.content_center_x(stick.target.x))
            .unwrap_or(order.len())
    }

    /// Remove `id` (if present) and insert it at `index`, clamped
    pub fn insert_stick_at(&mut self, id: StickId, index: usize) {
        if let Some(current) = self.index_of(id) {
            self.arrangement.remove(current);
        }
        let index = index.min(self.arrangement.len());
        self.arrangement.insert(index, id);
        self.update_positions();
    }

    /// Move `id` so it lands before the stick currently at `new_index`
    pub fn move_stick(&mut self, id: StickId, new_index: usize) {
        let Some(current) = self.index_of(id) else { return };
        if current == new_index {
            return;
        }
        self.arrangement.remove(current);
        let insert_at = if new_index > current { new_index - 1 } else { new_index };
        let insert_at = insert_at.min(self.arrangement.len());
        self.arrangement.insert(insert_at, id);
        self.update_positions();
    }

    /// Topmost stick under a canvas point
    pub fn find_stick_at(&self, p: Vec2) -> Option<StickId> {
        self.arrangement
            .iter()
            .rev()
            .copied()
            .find(|id| self.sticks.get(id).is_some_and(|s| s.contains_point(p)))
    }

    /// Own one more stick. The caller re-initializes or relays out afterwards.
    pub fn add_stick(
        &mut self,
        id: StickId,
        assets: &dyn AssetProvider,
        hitboxes: &mut HitboxCache,
    ) -> GameResult<()> {
        if self.owned.contains(&id) {
            return Ok(());
        }
        self.load_stick(id, assets, hitboxes)?;
        self.owned.push(id);
        self.owned.sort_unstable();
        self.calculate_scale();
        Ok(())
    }

    /// Back to the default sticks in sorted order (prestige)
    pub fn reset(&mut self) {
        self.sticks.retain(|id, _| DEFAULT_STICKS.contains(id));
        self.owned = DEFAULT_STICKS
            .iter()
            .copied()
            .filter(|id| self.sticks.contains_key(id))
            .collect();
        self.arrangement = self.owned.clone();
        for stick in self.sticks.values_mut() {
            stick.dragging = false;
        }

        self.scaled_for = None;
        self.calculate_scale();
        self.update_positions();
    }

    pub fn index_of(&self, id: StickId) -> Option<usize> {
        self.arrangement.iter().position(|&a| a == id)
    }

    pub fn arrangement(&self) -> &[StickId] {
        &self.arrangement
    }

    pub fn owned(&self) -> &[StickId] {
        &self.owned
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn stick(&self, id: StickId) -> Option<&Stick> {
        self.sticks.get(&id)
    }

    pub fn stick_mut(&mut self, id: StickId) -> Option<&mut Stick> {
        self.sticks.get_mut(&id)
    }

    /// Sticks in visual order
    pub fn sticks_in_order(&self) -> impl Iterator<Item = &Stick> {
        self.arrangement.iter().filter_map(|id| self.sticks.get(id))
    }

    pub fn layout(&self) -> &LayoutTuning {
        &self.layout
    }

    /// Overwrite the order directly (tests and restored sessions)
    pub fn set_arrangement(&mut self, order: &[StickId]) {
        self.arrangement = order.iter().copied().filter(|id| self.sticks.contains_key(id)).collect();
        self.update_positions();
    }
}
