//! Riftbound Core - rarity primitives and the procedural formula library
//!
//! This crate provides the numeric foundation of the game:
//! - `Rarity` tiers and their constant balance tables
//! - `Dice`, a seeded deterministic RNG for reproducible game logic
//! - The formula library translating `(rarity, difficulty/level)` into
//!   balanced stats, rewards, prices, shrine odds, and trap risk
//!
//! Every formula is pure with respect to its explicit inputs. The only
//! randomness allowed is an explicit `&mut Dice` parameter, which keeps
//! balance reproducible and testable.

mod dice;
mod error;
pub mod formulas;
mod identity;
mod rarity;
mod stats;

pub use dice::Dice;
pub use error::{Error, Result};
pub use formulas::{CostKind, EffectKind};
pub use identity::EntityId;
pub use rarity::Rarity;
pub use stats::StatBlock;
