//! Fixed stick catalog
//!
//! Fourteen sticks exist. Seven are always owned, the other seven are
//! sold by named sellers in the shop.

/// Stick identity (1..=14). Sorting is ascending by this value.
pub type StickId = u8;

/// Size of the catalog
pub const CATALOG_SIZE: usize = 14;

/// Every stick id in the game
pub const ALL_STICKS: [StickId; CATALOG_SIZE] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14];

/// Sticks every player owns from the start (and after prestige)
pub const DEFAULT_STICKS: [StickId; 7] = [2, 3, 5, 7, 10, 11, 13];

/// Sticks sold in the shop
pub const PURCHASABLE_STICKS: [StickId; 7] = [1, 4, 6, 8, 9, 12, 14];

/// A shop seller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seller {
    pub name: &'static str,
    pub stick_id: StickId,
    /// Portrait key before the purchase
    pub portrait_before: &'static str,
    /// Portrait key after the purchase
    pub portrait_after: &'static str,
}

const SELLERS: [Seller; 7] = [
    Seller { name: "Kevin", stick_id: 1, portrait_before: "kevin1", portrait_after: "kevin2" },
    Seller { name: "Mützi", stick_id: 4, portrait_before: "muetzi1", portrait_after: "muetzi2" },
    Seller { name: "Schlorpfian", stick_id: 6, portrait_before: "schlorpf1", portrait_after: "schlorpf2" },
    Seller { name: "Beppo", stick_id: 8, portrait_before: "beppo1", portrait_after: "beppo2" },
    Seller {
        name: "Doppelzopfine",
        stick_id: 9,
        portrait_before: "doppelzopfine1",
        portrait_after: "doppelzopfine2",
    },
    Seller { name: "Berft", stick_id: 12, portrait_before: "berft1", portrait_after: "berft2" },
    Seller { name: "Handbert", stick_id: 14, portrait_before: "handbert1", portrait_after: "handbert2" },
];

/// Seller of a purchasable stick
pub fn seller_for(id: StickId) -> Option<&'static Seller> {
    SELLERS.iter().find(|s| s.stick_id == id)
}

/// All sellers in shop order
pub fn sellers() -> &'static [Seller] {
    &SELLERS
}

#[inline]
pub fn is_default(id: StickId) -> bool {
    DEFAULT_STICKS.contains(&id)
}

#[inline]
pub fn is_purchasable(id: StickId) -> bool {
    PURCHASABLE_STICKS.contains(&id)
}

/// Looping background track
pub const MUSIC_ASSET_KEY: &str = "/assets/audio/hintergrund1.mp3";

/// Asset key for a stick image
pub fn stick_asset_key(id: StickId) -> String {
    format!("/assets/images/sticks/stab-{}.png", id)
}

/// Asset key for a level bar frame (1..=10)
pub fn level_bar_asset_key(frame: u8) -> String {
    format!("/assets/images/levelbar-{}.png", frame)
}

/// Asset key for a portal frame (0-based index)
pub fn portal_asset_key(index: usize) -> String {
    format!("/assets/images/portal/portal-{}.png", index + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_and_purchasable_partition_catalog() {
        for id in ALL_STICKS {
            assert!(is_default(id) ^ is_purchasable(id), "stick {} in exactly one set", id);
        }
    }

    #[test]
    fn test_every_purchasable_stick_has_a_seller() {
        for id in PURCHASABLE_STICKS {
            assert_eq!(seller_for(id).map(|s| s.stick_id), Some(id));
        }
        assert!(seller_for(2).is_none());
    }

    #[test]
    fn test_asset_keys() {
        assert_eq!(stick_asset_key(7), "/assets/images/sticks/stab-7.png");
        assert_eq!(level_bar_asset_key(10), "/assets/images/levelbar-10.png");
        assert_eq!(portal_asset_key(0), "/assets/images/portal/portal-1.png");
    }
}
