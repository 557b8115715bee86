//! Position tweens for sliding sticks
//!
//! At most one tween per stick; starting a new one replaces the old.

use std::collections::BTreeMap;

use glam::Vec2;

use super::board::Board;
use crate::catalog::StickId;

/// Quadratic ease-out (fast start, soft landing)
#[inline]
pub fn ease_out_quad(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t) * (1.0 - t)
}

#[derive(Debug, Clone, Copy)]
pub struct Tween {
    pub from: Vec2,
    pub to: Vec2,
    pub elapsed: f32,
    pub duration: f32,
}

impl Tween {
    pub fn new(from: Vec2, to: Vec2, duration: f32) -> Self {
        Self {
            from,
            to,
            elapsed: 0.0,
            duration,
        }
    }

    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).min(1.0)
        }
    }

    pub fn sample(&self) -> Vec2 {
        if self.is_finished() {
            return self.to;
        }
        self.from.lerp(self.to, ease_out_quad(self.progress()))
    }

    pub fn is_finished(&self) -> bool {
        self.progress() >= 1.0
    }
}

/// Active tweens keyed by stick
#[derive(Debug, Default)]
pub struct Tweens {
    active: BTreeMap<StickId, Tween>,
}

impl Tweens {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slide `id` from `from` to `to`, superseding any tween already running on it
    pub fn start(&mut self, id: StickId, from: Vec2, to: Vec2, duration: f32) {
        self.active.insert(id, Tween::new(from, to, duration));
    }

    pub fn cancel(&mut self, id: StickId) {
        self.active.remove(&id);
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }

    pub fn is_animating(&self, id: StickId) -> bool {
        self.active.contains_key(&id)
    }

    pub fn get(&self, id: StickId) -> Option<&Tween> {
        self.active.get(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Advance every tween and write positions into the board
    pub fn tick(&mut self, board: &mut Board, dt: f32) {
        self.active.retain(|&id, tween| {
            let Some(stick) = board.stick_mut(id) else {
                return false;
            };
            tween.elapsed += dt;
            stick.pos = tween.sample();
            !tween.is_finished()
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::board::tests::board_with;

    #[test]
    fn test_ease_out_quad() {
        assert_eq!(ease_out_quad(0.0), 0.0);
        assert_eq!(ease_out_quad(1.0), 1.0);
        assert_eq!(ease_out_quad(0.5), 0.75);
        assert_eq!(ease_out_quad(2.0), 1.0);
    }

    #[test]
    fn test_tween_reaches_target() {
        let mut board = board_with(&[2, 3], 1);
        let target = board.stick(2).unwrap().target;
        let from = target + Vec2::new(100.0, 0.0);

        let mut tweens = Tweens::new();
        tweens.start(2, from, target, 0.2);
        tweens.tick(&mut board, 0.1);
        let mid = board.stick(2).unwrap().pos;
        assert!(mid.x < from.x && mid.x > target.x);
        assert!(tweens.is_animating(2));

        tweens.tick(&mut board, 0.15);
        assert_eq!(board.stick(2).unwrap().pos, target);
        assert!(tweens.is_empty());
    }

    #[test]
    fn test_new_tween_supersedes_old() {
        let mut tweens = Tweens::new();
        tweens.start(4, Vec2::ZERO, Vec2::new(10.0, 0.0), 1.0);
        tweens.start(4, Vec2::ZERO, Vec2::new(-10.0, 0.0), 1.0);
        assert_eq!(tweens.get(4).unwrap().to, Vec2::new(-10.0, 0.0));

        tweens.cancel(4);
        assert!(!tweens.is_animating(4));
    }

    #[test]
    fn test_tween_for_missing_stick_is_dropped() {
        let mut board = board_with(&[2, 3], 1);
        let mut tweens = Tweens::new();
        tweens.start(9, Vec2::ZERO, Vec2::ONE, 1.0);
        tweens.tick(&mut board, 0.1);
        assert!(tweens.is_empty());
    }
}
