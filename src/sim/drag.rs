//! Pointer-driven drag and drop
//!
//! One drag session at a time:
//! - `Idle`: nothing held
//! - `Armed`: pressed on a stick, not yet moved past the threshold
//! - `Dragging`: stick follows the pointer, the row opens a gap where it would land
//!
//! A real drop reinserts the stick, slides everything home and, once the
//! slide has settled, reports a completed sort if the row is in order.

use glam::Vec2;

use super::board::Board;
use super::tween::Tweens;
use crate::catalog::StickId;
use crate::tuning::MotionTuning;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragState {
    Idle,
    Armed {
        id: StickId,
        press: Vec2,
        grab_offset: Vec2,
    },
    Dragging {
        id: StickId,
        grab_offset: Vec2,
        /// Last computed landing slot, `None` until the first move
        index: Option<usize>,
    },
}

/// Notifications from a drag session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragEvent {
    PickedUp(StickId),
    Dropped(StickId),
    /// Row ended up sorted after a drop settled
    SortComplete,
}

#[derive(Debug)]
pub struct DragController {
    motion: MotionTuning,
    state: DragState,
    tweens: Tweens,
    /// Seconds left until the last drop has settled
    settle: Option<f32>,
}

impl DragController {
    pub fn new(motion: MotionTuning) -> Self {
        Self {
            motion,
            state: DragState::Idle,
            tweens: Tweens::new(),
            settle: None,
        }
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    /// Stick currently armed or dragged
    pub fn held(&self) -> Option<StickId> {
        match self.state {
            DragState::Idle => None,
            DragState::Armed { id, .. } | DragState::Dragging { id, .. } => Some(id),
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// A drop is still sliding into place
    pub fn is_settling(&self) -> bool {
        self.settle.is_some()
    }

    pub fn tweens(&self) -> &Tweens {
        &self.tweens
    }

    pub fn pointer_down(&mut self, board: &Board, p: Vec2) -> Option<DragEvent> {
        if self.state != DragState::Idle || self.is_settling() {
            return None;
        }

        let id = board.find_stick_at(p)?;
        let stick = board.stick(id)?;
        let grab_offset = p - stick.pos;
        self.tweens.cancel(id);
        self.state = DragState::Armed {
            id,
            press: p,
            grab_offset,
        };
        Some(DragEvent::PickedUp(id))
    }

    pub fn pointer_move(&mut self, board: &mut Board, p: Vec2) {
        let (id, grab_offset, index) = match self.state {
            DragState::Idle => return,
            DragState::Armed { id, press, grab_offset } => {
                if p.distance(press) <= self.motion.drag_threshold {
                    return;
                }
                if let Some(stick) = board.stick_mut(id) {
                    stick.dragging = true;
                }
                (id, grab_offset, None)
            }
            DragState::Dragging { id, grab_offset, index } => (id, grab_offset, index),
        };

        let Some(stick) = board.stick_mut(id) else {
            self.state = DragState::Idle;
            return;
        };
        stick.pos = p - grab_offset;
        let center_x = stick.content_center_x(stick.pos.x);

        let new_index = board.insertion_index(center_x, id);
        if index != Some(new_index) {
            self.make_room(board, id, new_index);
        }

        self.state = DragState::Dragging {
            id,
            grab_offset,
            index: Some(new_index),
        };
    }

    /// Open a gap at `index` and slide the other sticks toward it
    fn make_room(&mut self, board: &mut Board, held: StickId, index: usize) {
        board.update_positions_with_gap(index, held);

        let duration = self.motion.slide_duration;
        let moves: Vec<(StickId, Vec2, Vec2)> = board
            .sticks_in_order()
            .filter(|s| s.id != held)
            .map(|s| (s.id, s.pos, s.target))
            .collect();
        for (id, from, to) in moves {
            self.tweens.start(id, from, to, duration);
        }
    }

    /// Pointer released, cancelled or left the canvas
    pub fn pointer_up(&mut self, board: &mut Board) -> Option<DragEvent> {
        match std::mem::replace(&mut self.state, DragState::Idle) {
            DragState::Idle => None,
            DragState::Armed { .. } => {
                // A click, not a drag: nothing moves
                board.update_positions();
                None
            }
            DragState::Dragging { id, index, .. } => {
                if let Some(stick) = board.stick_mut(id) {
                    stick.dragging = false;
                }
                let index = index.or_else(|| board.index_of(id)).unwrap_or(0);

                let from: Vec<(StickId, Vec2)> = board.sticks_in_order().map(|s| (s.id, s.pos)).collect();
                board.insert_stick_at(id, index);

                // Layout snapped everything; start from where it was on screen instead
                let duration = self.motion.slide_duration;
                for (sid, pos) in from {
                    if let Some(stick) = board.stick_mut(sid) {
                        let target = stick.target;
                        stick.pos = pos;
                        self.tweens.start(sid, pos, target, duration);
                    }
                }

                self.settle = Some(duration);
                Some(DragEvent::Dropped(id))
            }
        }
    }

    /// Advance slides; reports a finished sort once the drop has settled
    pub fn tick(&mut self, board: &mut Board, dt: f32) -> Option<DragEvent> {
        self.tweens.tick(board, dt);

        let remaining = self.settle? - dt;
        if remaining > 0.0 {
            self.settle = Some(remaining);
            return None;
        }

        self.settle = None;
        board.is_sorted().then_some(DragEvent::SortComplete)
    }

    /// Drop any session and animation without touching the order
    pub fn reset(&mut self, board: &mut Board) {
        if let Some(id) = self.held() {
            if let Some(stick) = board.stick_mut(id) {
                stick.dragging = false;
            }
        }
        self.state = DragState::Idle;
        self.tweens.clear();
        self.settle = None;
    }
}
