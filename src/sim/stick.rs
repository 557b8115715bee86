//! A single draggable stick

use std::rc::Rc;

use glam::Vec2;

use crate::catalog::StickId;
use crate::hitbox::{Hitbox, is_point_in_hitbox};

/// A stick on the board
#[derive(Debug, Clone)]
pub struct Stick {
    pub id: StickId,
    pub hitbox: Rc<Hitbox>,
    /// Top-left of the image on the canvas
    pub pos: Vec2,
    /// Where layout wants the stick to be
    pub target: Vec2,
    /// Uniform scale shared by every stick on the board
    pub scale: f32,
    /// Held by the drag controller; layout leaves its position alone
    pub dragging: bool,
}

impl Stick {
    pub fn new(id: StickId, hitbox: Rc<Hitbox>, scale: f32) -> Self {
        Self {
            id,
            hitbox,
            pos: Vec2::ZERO,
            target: Vec2::ZERO,
            scale,
            dragging: false,
        }
    }

    /// Width of the visible content at `scale`
    #[inline]
    pub fn content_width(&self, scale: f32) -> f32 {
        self.hitbox.content_bounds.width * scale
    }

    /// Canvas x of the visible content's center if the image sat at `x`
    #[inline]
    pub fn content_center_x(&self, x: f32) -> f32 {
        x + self.hitbox.content_bounds.center_x() * self.scale
    }

    /// Image size on the canvas
    pub fn display_size(&self) -> Vec2 {
        Vec2::new(self.hitbox.image_width as f32, self.hitbox.image_height as f32) * self.scale
    }

    /// Does a canvas-space point land on opaque stick pixels?
    pub fn contains_point(&self, global: Vec2) -> bool {
        is_point_on_stick(global, self)
    }
}

/// Transform a canvas point into the stick's unscaled image frame and hit-test it
pub fn is_point_on_stick(global: Vec2, stick: &Stick) -> bool {
    if stick.scale <= 0.0 {
        return false;
    }
    let local = (global - stick.pos) / stick.scale;
    is_point_in_hitbox(local, &stick.hitbox, true)
}
