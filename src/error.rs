//! Error types for the game core
//!
//! Every failure here is local and recoverable. Callers decide how to
//! surface a rejected purchase or a skipped piece; nothing is retried.

use thiserror::Error;

use crate::catalog::StickId;

#[derive(Debug, Error)]
pub enum GameError {
    /// Shop: the piece is already in the owned set
    #[error("stick {0} is already owned")]
    AlreadyOwned(StickId),

    /// Shop: balance is below the price
    #[error("not enough diamonds: need {price}, have {balance}")]
    InsufficientFunds { price: u64, balance: u64 },

    /// Prestige gate: not every purchasable stick is owned yet
    #[error("portal is not available yet")]
    NotAvailable,

    /// No image could be found for this piece, it is skipped on load
    #[error("no image available for stick {0}")]
    AssetMissing(StickId),

    /// Image has no solid pixels; the piece loads but can never be hit
    #[error("image for stick {0} has no opaque pixels")]
    DegenerateHitbox(StickId),

    /// Piece has no entry in the price table
    #[error("stick {0} is not sold in the shop")]
    UnknownStick(StickId),

    /// Pixel buffer does not match the declared dimensions
    #[error("image is {width}x{height} but has {len} bytes of RGBA data")]
    InvalidImage { width: u32, height: u32, len: usize },

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage error: {0}")]
    Storage(String),
}

pub type GameResult<T> = Result<T, GameError>;
