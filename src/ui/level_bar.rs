//! Level bar animation
//!
//! The bar is a strip of 10 frames. After a sort it steps one frame per
//! 100 ms toward the new progress. On a level-up it first fills to 10,
//! holds, drops back to 1, pauses, then climbs to the new progress.

/// Frames in the level bar strip
pub const LEVEL_BAR_FRAMES: u8 = 10;

const FRAME_STEP: f32 = 0.1;
const FULL_HOLD: f32 = 0.3;
const EMPTY_PAUSE: f32 = 0.2;

/// Frame (1..=10) for a progress fraction. Nine boxes, so frame 10 means full.
pub fn level_bar_frame(progress: f64) -> u8 {
    let frame = (progress * 9.0).floor() as i64 + 1;
    frame.clamp(1, LEVEL_BAR_FRAMES as i64) as u8
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Idle,
    Stepping {
        target: u8,
        /// Level-up: after reaching `target` (10), restart toward this frame
        then: Option<u8>,
    },
    HoldFull {
        remaining: f32,
        end: u8,
    },
    Pause {
        remaining: f32,
        end: u8,
    },
}

/// Emitted when the bar visibly completes a level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelShown(pub u32);

#[derive(Debug, Clone)]
pub struct LevelBar {
    frame: u8,
    phase: Phase,
    clock: f32,
    pending_level: Option<u32>,
    shown: Option<LevelShown>,
}

impl Default for LevelBar {
    fn default() -> Self {
        Self::new(1)
    }
}

impl LevelBar {
    pub fn new(frame: u8) -> Self {
        Self {
            frame: frame.clamp(1, LEVEL_BAR_FRAMES),
            phase: Phase::Idle,
            clock: 0.0,
            pending_level: None,
            shown: None,
        }
    }

    pub fn frame(&self) -> u8 {
        self.frame
    }

    pub fn is_animating(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// Jump to a frame without animating. Ignored mid-animation.
    pub fn snap(&mut self, frame: u8) {
        if !self.is_animating() {
            self.frame = frame.clamp(1, LEVEL_BAR_FRAMES);
        }
    }

    /// Start animating from `start` to `end`. Ignored if already running.
    pub fn animate(&mut self, start: u8, end: u8, leveled_up: Option<u32>) {
        if self.is_animating() {
            return;
        }
        self.frame = start.clamp(1, LEVEL_BAR_FRAMES);
        let end = end.clamp(1, LEVEL_BAR_FRAMES);
        self.clock = 0.0;
        self.pending_level = leveled_up;
        self.phase = match leveled_up {
            Some(_) => Phase::Stepping {
                target: LEVEL_BAR_FRAMES,
                then: Some(end),
            },
            None => Phase::Stepping { target: end, then: None },
        };
        self.settle_if_arrived();
    }

    pub fn tick(&mut self, dt: f32) -> Option<LevelShown> {
        let mut budget = dt;

        while budget > 0.0 {
            match self.phase {
                Phase::Idle => break,
                Phase::Stepping { target, .. } => {
                    let needed = FRAME_STEP - self.clock;
                    if budget < needed {
                        self.clock += budget;
                        break;
                    }
                    budget -= needed;
                    self.clock = 0.0;
                    if self.frame < target {
                        self.frame += 1;
                    } else {
                        self.frame -= 1;
                    }
                    self.settle_if_arrived();
                }
                Phase::HoldFull { remaining, end } => {
                    if budget < remaining {
                        self.phase = Phase::HoldFull {
                            remaining: remaining - budget,
                            end,
                        };
                        break;
                    }
                    budget -= remaining;
                    self.frame = 1;
                    self.phase = Phase::Pause {
                        remaining: EMPTY_PAUSE,
                        end,
                    };
                }
                Phase::Pause { remaining, end } => {
                    if budget < remaining {
                        self.phase = Phase::Pause {
                            remaining: remaining - budget,
                            end,
                        };
                        break;
                    }
                    budget -= remaining;
                    self.clock = 0.0;
                    self.phase = Phase::Stepping { target: end, then: None };
                    self.settle_if_arrived();
                }
            }
        }

        self.shown.take()
    }

    fn settle_if_arrived(&mut self) {
        let Phase::Stepping { target, then } = self.phase else {
            return;
        };
        if self.frame != target {
            return;
        }
        match then {
            Some(end) => {
                self.phase = Phase::HoldFull {
                    remaining: FULL_HOLD,
                    end,
                };
                self.shown = self.pending_level.take().map(LevelShown);
            }
            None => self.phase = Phase::Idle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_bar_frame() {
        assert_eq!(level_bar_frame(0.0), 1);
        assert_eq!(level_bar_frame(0.11), 1);
        assert_eq!(level_bar_frame(0.12), 2);
        assert_eq!(level_bar_frame(0.5), 5);
        assert_eq!(level_bar_frame(0.99), 9);
        assert_eq!(level_bar_frame(1.0), 10);
        assert_eq!(level_bar_frame(-1.0), 1);
        assert_eq!(level_bar_frame(3.0), 10);
    }

    #[test]
    fn test_steps_one_frame_per_100ms() {
        let mut bar = LevelBar::new(1);
        bar.animate(2, 5, None);
        assert_eq!(bar.frame(), 2);

        bar.tick(0.05);
        assert_eq!(bar.frame(), 2);
        bar.tick(0.06);
        assert_eq!(bar.frame(), 3);
        bar.tick(0.2);
        assert_eq!(bar.frame(), 5);
        assert!(!bar.is_animating());
    }

    #[test]
    fn test_same_frame_finishes_immediately() {
        let mut bar = LevelBar::new(4);
        bar.animate(4, 4, None);
        assert!(!bar.is_animating());
    }

    #[test]
    fn test_level_up_fills_resets_and_climbs() {
        let mut bar = LevelBar::new(8);
        bar.animate(8, 3, Some(5));

        // 8 -> 10 in two steps
        assert_eq!(bar.tick(0.1), None);
        assert_eq!(bar.tick(0.1), Some(LevelShown(5)));
        assert_eq!(bar.frame(), 10);

        // Hold full, then empty
        bar.tick(0.25);
        assert_eq!(bar.frame(), 10);
        bar.tick(0.1);
        assert_eq!(bar.frame(), 1);

        // Pause, then climb to 3
        bar.tick(0.15);
        assert_eq!(bar.frame(), 1);
        bar.tick(0.1);
        assert!(bar.is_animating());
        bar.tick(1.0);
        assert_eq!(bar.frame(), 3);
        assert!(!bar.is_animating());
    }

    #[test]
    fn test_level_up_from_full_bar_still_reports() {
        let mut bar = LevelBar::new(10);
        bar.animate(10, 2, Some(4));
        assert_eq!(bar.tick(0.01), Some(LevelShown(4)));
        assert_eq!(bar.tick(0.01), None);
    }

    #[test]
    fn test_animate_ignored_while_running_and_snap_too() {
        let mut bar = LevelBar::new(1);
        bar.animate(1, 6, None);
        bar.animate(1, 2, None);
        bar.snap(9);
        bar.tick(1.0);
        assert_eq!(bar.frame(), 6);

        bar.snap(9);
        assert_eq!(bar.frame(), 9);
    }
}
