//! Peripheral UI animations
//!
//! Frame-ticked state machines with no DOM access; the browser entry point
//! reads their frame and scale each tick.

pub mod level_bar;
pub mod portal;

pub use level_bar::{LEVEL_BAR_FRAMES, LevelBar, LevelShown, level_bar_frame};
pub use portal::{PORTAL_FRAME_COUNT, PortalAnimation, PortalPhase, PortalSignal};
