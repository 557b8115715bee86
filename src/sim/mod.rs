//! Stick board simulation
//!
//! All arrangement logic lives here. This module must stay deterministic:
//! - Seeded RNG only
//! - Time advances only through `tick(dt)`
//! - No rendering or platform dependencies

pub mod board;
pub mod drag;
pub mod stick;
pub mod tween;

pub use board::Board;
pub use drag::{DragController, DragEvent, DragState};
pub use stick::{Stick, is_point_on_stick};
pub use tween::{Tween, Tweens, ease_out_quad};
