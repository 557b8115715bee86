//! Stick shop
//!
//! Static prices, one seller per purchasable stick. A purchase either
//! deducts the price and adds the stick, or changes nothing.

use super::state::ProgressState;
use crate::catalog::{PURCHASABLE_STICKS, StickId, seller_for};
use crate::error::{GameError, GameResult};
use crate::tuning::Tuning;

/// One row of the shop as the UI shows it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopItem {
    pub stick_id: StickId,
    pub seller: &'static str,
    pub price: u64,
    pub owned: bool,
    pub affordable: bool,
}

/// Every purchasable stick in shop order
pub fn shop_items(state: &ProgressState, tuning: &Tuning) -> Vec<ShopItem> {
    PURCHASABLE_STICKS
        .iter()
        .filter_map(|&id| {
            let price = tuning.price(id)?;
            let owned = state.owns(id);
            Some(ShopItem {
                stick_id: id,
                seller: seller_for(id).map(|s| s.name).unwrap_or(""),
                price,
                owned,
                affordable: !owned && state.diamonds >= price,
            })
        })
        .collect()
}

/// Buy a stick. Returns the price paid.
pub fn purchase(state: &mut ProgressState, id: StickId, tuning: &Tuning) -> GameResult<u64> {
    if state.owns(id) {
        return Err(GameError::AlreadyOwned(id));
    }
    let price = tuning.price(id).ok_or(GameError::UnknownStick(id))?;
    if state.diamonds < price {
        return Err(GameError::InsufficientFunds {
            price,
            balance: state.diamonds,
        });
    }

    state.diamonds -= price;
    state.add_owned(id);
    log::info!("Bought stick {} for {} diamonds", id, price);
    Ok(price)
}

/// Has the player bought everything the shop sells?
pub fn all_purchased(state: &ProgressState) -> bool {
    PURCHASABLE_STICKS.iter().all(|&id| state.owns(id))
}

/// First stick in catalog order not owned yet
pub fn next_purchasable(state: &ProgressState, tuning: &Tuning) -> Option<(StickId, u64)> {
    PURCHASABLE_STICKS
        .iter()
        .filter(|&&id| !state.owns(id))
        .find_map(|&id| tuning.price(id).map(|price| (id, price)))
}
