//! Sort rewards and level-up rollover

use super::state::ProgressState;
use crate::tuning::{RewardTuning, Tuning};

/// Guards exact decimal products (100 x 1.15 = 115) against binary rounding before flooring
const CURVE_EPSILON: f64 = 1e-9;

/// XP required to finish `level`: floor(base x growth^(level - 1))
pub fn xp_for_level(level: u32, tuning: &RewardTuning) -> u64 {
    let exponent = level.saturating_sub(1) as i32;
    (tuning.xp_curve_base * tuning.xp_curve_growth.powi(exponent) + CURVE_EPSILON).floor() as u64
}

/// Preview of what one completed sort pays
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rewards {
    pub xp: u64,
    pub diamonds: u64,
    pub xp_multiplier: f64,
    pub diamond_multiplier: f64,
    pub base_xp: u64,
    pub xp_bonus: u64,
    pub base_diamonds: u64,
    pub diamond_bonus: u64,
}

/// Outcome of applying a completed sort
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortReward {
    pub xp_earned: u64,
    pub diamonds_earned: u64,
    pub leveled_up: bool,
    pub new_level: u32,
    pub new_xp: u64,
}

/// Rewards for sorting `stick_count` sticks. Pure: the state is only read.
pub fn calculate_rewards(state: &ProgressState, stick_count: usize, tuning: &Tuning) -> Rewards {
    let base_xp = tuning.rewards.base_xp_per_sort * stick_count as u64;
    let xp_bonus: u64 = state.owned_sticks.iter().map(|&id| tuning.xp_bonus(id)).sum();
    let xp_multiplier = state.effective_xp_multiplier();
    let xp = ((base_xp + xp_bonus) as f64 * xp_multiplier).floor() as u64;

    let base_diamonds = tuning.rewards.base_diamonds_per_sort;
    let diamond_bonus: u64 = state.owned_sticks.iter().map(|&id| tuning.diamond_bonus(id)).sum();
    let diamond_multiplier = state.effective_diamond_multiplier();
    let diamonds = ((base_diamonds + diamond_bonus) as f64 * diamond_multiplier).floor() as u64;

    Rewards {
        xp,
        diamonds,
        xp_multiplier,
        diamond_multiplier,
        base_xp,
        xp_bonus,
        base_diamonds,
        diamond_bonus,
    }
}

/// Add XP to a level, carrying overflow into as many levels as it covers
pub fn roll_over(mut level: u32, mut xp: u64, tuning: &RewardTuning) -> (u32, u64) {
    let mut needed = xp_for_level(level, tuning);
    while needed > 0 && xp >= needed {
        xp -= needed;
        level += 1;
        needed = xp_for_level(level, tuning);
    }
    (level, xp)
}

/// Pay out one completed sort. Every counter changes together or not at all.
pub fn apply_sort(state: &mut ProgressState, stick_count: usize, tuning: &Tuning) -> SortReward {
    let rewards = calculate_rewards(state, stick_count, tuning);
    let (new_level, new_xp) = roll_over(state.level, state.current_xp + rewards.xp, &tuning.rewards);
    let leveled_up = new_level > state.level;

    state.level = new_level;
    state.current_xp = new_xp;
    state.total_xp += rewards.xp;
    state.diamonds += rewards.diamonds;
    state.total_sorts += 1;
    state.total_diamonds_earned += rewards.diamonds;

    SortReward {
        xp_earned: rewards.xp,
        diamonds_earned: rewards.diamonds,
        leveled_up,
        new_level,
        new_xp,
    }
}

/// Fraction of the current level already earned, in [0, 1)
pub fn xp_progress(state: &ProgressState, tuning: &RewardTuning) -> f64 {
    let needed = xp_for_level(state.level, tuning);
    if needed == 0 {
        return 0.0;
    }
    (state.current_xp as f64 / needed as f64).clamp(0.0, 1.0)
}

/// XP still missing to reach the next level
pub fn xp_to_next_level(state: &ProgressState, tuning: &RewardTuning) -> u64 {
    xp_for_level(state.level, tuning).saturating_sub(state.current_xp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DEFAULT_STICKS;

    fn plain_tuning() -> Tuning {
        let mut tuning = Tuning::default();
        tuning.rewards.stick_xp_bonus.clear();
        tuning.rewards.stick_diamond_bonus.clear();
        tuning
    }

    #[test]
    fn test_xp_curve() {
        let rewards = RewardTuning::default();
        assert_eq!(xp_for_level(1, &rewards), 100);
        assert_eq!(xp_for_level(2, &rewards), 115);
        assert_eq!(xp_for_level(3, &rewards), 132);
        assert_eq!(xp_for_level(0, &rewards), 100);
    }

    #[test]
    fn test_calculate_rewards_is_pure() {
        let tuning = plain_tuning();
        let state = ProgressState::new();
        let before = state.clone();

        let first = calculate_rewards(&state, 7, &tuning);
        let second = calculate_rewards(&state, 7, &tuning);
        assert_eq!(first, second);
        assert_eq!(state, before);
        assert_eq!(first.xp, 70);
        assert_eq!(first.diamonds, 2);
    }

    #[test]
    fn test_multipliers_floor() {
        let tuning = plain_tuning();
        let mut state = ProgressState::new();
        state.xp_multiplier = 1.25;
        state.diamond_multiplier = 1.25;

        let rewards = calculate_rewards(&state, 7, &tuning);
        assert_eq!(rewards.xp, 87);
        assert_eq!(rewards.diamonds, 2);
    }

    #[test]
    fn test_owned_stick_bonuses_add_before_multiplier() {
        let mut tuning = plain_tuning();
        tuning.rewards.stick_xp_bonus.insert(1, 5);
        tuning.rewards.stick_diamond_bonus.insert(1, 3);
        let mut state = ProgressState::new();
        state.add_owned(1);

        let rewards = calculate_rewards(&state, 8, &tuning);
        assert_eq!(rewards.base_xp, 80);
        assert_eq!(rewards.xp_bonus, 5);
        assert_eq!(rewards.xp, 85);
        assert_eq!(rewards.diamonds, 5);
    }

    #[test]
    fn test_level_rollover_spans_multiple_levels() {
        let tuning = plain_tuning();
        let (level, xp) = roll_over(1, 250, &tuning.rewards);
        assert_eq!((level, xp), (3, 35));
    }

    #[test]
    fn test_apply_sort_crosses_two_levels_at_once() {
        let tuning = plain_tuning();
        let mut state = ProgressState::new();

        // 25 sticks x 10 XP = 250: clears 100 and 115, leaves 35
        let reward = apply_sort(&mut state, 25, &tuning);
        assert_eq!(reward.xp_earned, 250);
        assert!(reward.leveled_up);
        assert_eq!((reward.new_level, reward.new_xp), (3, 35));
        assert_eq!((state.level, state.current_xp), (3, 35));
        assert_eq!(state.total_xp, 250);
    }

    #[test]
    fn test_apply_sort_updates_every_counter() {
        let tuning = plain_tuning();
        let mut state = ProgressState::new();
        state.current_xp = 95;
        state.total_xp = 95;
        assert_eq!(state.owned_sticks, DEFAULT_STICKS);

        let reward = apply_sort(&mut state, 7, &tuning);
        assert!(reward.leveled_up);
        assert_eq!(reward.xp_earned, 70);
        assert_eq!(reward.new_level, 2);
        assert_eq!(reward.new_xp, 65);
        assert_eq!(state.level, 2);
        assert_eq!(state.current_xp, 65);
        assert_eq!(state.total_xp, 165);
        assert_eq!(state.diamonds, 2);
        assert_eq!(state.total_sorts, 1);
        assert_eq!(state.total_diamonds_earned, 2);

        // 65 + 70 = 135 clears level 2 (115) as well
        let reward = apply_sort(&mut state, 7, &tuning);
        assert!(reward.leveled_up);
        assert_eq!(state.level, 3);
        assert_eq!(state.current_xp, 20);
        assert_eq!(state.total_sorts, 2);
    }

    #[test]
    fn test_progress_helpers() {
        let rewards = RewardTuning::default();
        let mut state = ProgressState::new();
        state.current_xp = 25;
        assert_eq!(xp_progress(&state, &rewards), 0.25);
        assert_eq!(xp_to_next_level(&state, &rewards), 75);
    }
}
