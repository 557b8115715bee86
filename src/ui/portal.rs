//! Portal animation
//!
//! Plays the portal frames forward, grows and spins the last frame until it
//! covers the screen, then plays the frames backwards over the new world.
//! The prestige reset happens at the end of the grow phase, hidden behind
//! the portal.

/// Frames in the portal strip
pub const PORTAL_FRAME_COUNT: usize = 16;

const FRAME_STEP: f32 = 0.1;
/// Scale gained per second while growing (0.04 per frame at 60 Hz)
const GROW_RATE: f32 = 2.4;
/// Radians per second while growing
const SPIN_RATE: f32 = 1.2;
const GROW_LIMIT: f32 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortalPhase {
    Forward,
    Grow,
    Reverse,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortalSignal {
    /// The portal fills the screen; apply the prestige reset now
    GrowComplete,
    /// Animation over, hand control back to the board
    Complete,
}

#[derive(Debug, Clone)]
pub struct PortalAnimation {
    phase: PortalPhase,
    frame: usize,
    clock: f32,
    scale: f32,
    rotation: f32,
}

impl Default for PortalAnimation {
    fn default() -> Self {
        Self::new()
    }
}

impl PortalAnimation {
    pub fn new() -> Self {
        Self {
            phase: PortalPhase::Forward,
            frame: 0,
            clock: 0.0,
            scale: 1.0,
            rotation: 0.0,
        }
    }

    pub fn phase(&self) -> PortalPhase {
        self.phase
    }

    /// Index into the portal frame strip
    pub fn frame(&self) -> usize {
        self.frame
    }

    /// Size relative to the viewport width
    pub fn scale(&self) -> f32 {
        if self.phase == PortalPhase::Grow { self.scale } else { 1.0 }
    }

    pub fn rotation(&self) -> f32 {
        if self.phase == PortalPhase::Grow { self.rotation } else { 0.0 }
    }

    /// Darkening of the background while growing, 0 (sky blue) to 1 (black)
    pub fn fade(&self) -> f32 {
        match self.phase {
            PortalPhase::Grow => ((self.scale - 1.0) / 2.5).min(1.0),
            _ => 0.0,
        }
    }

    pub fn is_done(&self) -> bool {
        self.phase == PortalPhase::Done
    }

    /// Advance the animation. At most one signal per call, each exactly once.
    pub fn tick(&mut self, dt: f32) -> Option<PortalSignal> {
        match self.phase {
            PortalPhase::Forward => {
                self.clock += dt;
                while self.clock >= FRAME_STEP && self.phase == PortalPhase::Forward {
                    self.clock -= FRAME_STEP;
                    self.frame += 1;
                    if self.frame >= PORTAL_FRAME_COUNT {
                        self.frame = PORTAL_FRAME_COUNT - 1;
                        self.phase = PortalPhase::Grow;
                        log::debug!("Portal: growing");
                    }
                }
                None
            }
            PortalPhase::Grow => {
                self.scale += GROW_RATE * dt;
                self.rotation += SPIN_RATE * dt;
                if self.scale < GROW_LIMIT {
                    return None;
                }
                self.phase = PortalPhase::Reverse;
                self.frame = PORTAL_FRAME_COUNT - 1;
                self.clock = 0.0;
                Some(PortalSignal::GrowComplete)
            }
            PortalPhase::Reverse => {
                self.clock += dt;
                while self.clock >= FRAME_STEP {
                    self.clock -= FRAME_STEP;
                    self.frame = self.frame.saturating_sub(1);
                    if self.frame == 0 {
                        self.phase = PortalPhase::Done;
                        return Some(PortalSignal::Complete);
                    }
                }
                None
            }
            PortalPhase::Done => None,
        }
    }
}
