//! Portal and prestige reset
//!
//! Prestige throws away the current run (sticks, diamonds, XP into the
//! level) for a permanent XP multiplier. Level and lifetime XP survive.

use super::shop::all_purchased;
use super::state::ProgressState;
use crate::error::{GameError, GameResult};
use crate::tuning::Tuning;

/// Result of a successful prestige
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrestigeOutcome {
    pub prestige_level: u32,
    pub xp_multiplier: f64,
}

/// Current and next XP multiplier, shown before the portal opens
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrestigeBonus {
    pub current: f64,
    pub next: f64,
}

/// The portal opens once every shop stick is owned
pub fn is_portal_available(state: &ProgressState) -> bool {
    all_purchased(state)
}

pub fn activate_portal(state: &mut ProgressState, tuning: &Tuning) -> GameResult<PrestigeOutcome> {
    if !is_portal_available(state) {
        return Err(GameError::NotAvailable);
    }

    let prestige_level = state.prestige_level + 1;
    let xp_multiplier = tuning.xp_multiplier_for(prestige_level);
    *state = ProgressState {
        level: state.level,
        total_xp: state.total_xp,
        prestige_level,
        xp_multiplier,
        ..ProgressState::default()
    };

    log::info!("Prestige {} reached, XP multiplier now {:.2}", prestige_level, xp_multiplier);
    Ok(PrestigeOutcome {
        prestige_level,
        xp_multiplier,
    })
}

pub fn next_prestige_bonus(state: &ProgressState, tuning: &Tuning) -> PrestigeBonus {
    PrestigeBonus {
        current: state.xp_multiplier,
        next: tuning.xp_multiplier_for(state.prestige_level + 1),
    }
}
