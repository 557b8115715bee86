//! Player progression: rewards, levels, shop and prestige
//!
//! Pure state transitions over [`ProgressState`]. Nothing in here touches
//! the board, storage or audio; the game controller wires those up.

pub mod prestige;
pub mod rewards;
pub mod shop;
pub mod state;

pub use prestige::{PrestigeBonus, PrestigeOutcome, activate_portal, is_portal_available, next_prestige_bonus};
pub use rewards::{Rewards, SortReward, apply_sort, calculate_rewards, xp_for_level, xp_progress, xp_to_next_level};
pub use shop::{ShopItem, all_purchased, next_purchasable, purchase, shop_items};
pub use state::ProgressState;
