//! Stick Sort - drag sticks into order, level up, open the portal
//!
//! Core modules:
//! - `hitbox`: Pixel-accurate hit shapes from stick images
//! - `sim`: Board layout, shuffling and drag and drop
//! - `progression`: Rewards, levels, shop and prestige
//! - `persistence`: Versioned save with migration
//! - `platform`: Browser/native platform abstraction
//! - `ui`: Level bar and portal animations
//! - `game`: Controller tying it all together
//! - `tuning`: Data-driven game balance

pub mod audio;
pub mod catalog;
pub mod error;
pub mod game;
pub mod hitbox;
pub mod leaderboard;
pub mod persistence;
pub mod platform;
pub mod progression;
pub mod settings;
pub mod sim;
pub mod tuning;
pub mod ui;

pub use catalog::StickId;
pub use error::{GameError, GameResult};
pub use game::{Game, GameEvent, GamePhase};
pub use leaderboard::{Leaderboard, SyncDecision};
pub use progression::ProgressState;
pub use settings::Settings;
pub use tuning::Tuning;
