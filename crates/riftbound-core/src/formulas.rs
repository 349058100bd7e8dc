//! Procedural balance formula library
//!
//! Stateless calculators that turn `(rarity, difficulty/level)` into
//! concrete gameplay numbers. Creative content (names, flavor text) comes
//! from elsewhere; this module owns the mechanical side so the two never
//! tangle.
//!
//! Difficulty is expected in `0..=10` with 5 as the neutral midpoint.
//! The scaling functions do not clamp; keeping difficulty in range is the
//! caller's responsibility (portal code derives it via [`difficulty`],
//! which is always in bounds).

use crate::dice::Dice;
use crate::error::Error;
use crate::rarity::Rarity;
use crate::stats::StatBlock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Neutral difficulty midpoint
pub const DEFAULT_DIFFICULTY: u32 = 5;

/// What a consumable modifies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectKind {
    Health,
    Attack,
    Defense,
}

impl EffectKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EffectKind::Health => "health",
            EffectKind::Attack => "attack",
            EffectKind::Defense => "defense",
        }
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EffectKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "health" => Ok(EffectKind::Health),
            "attack" => Ok(EffectKind::Attack),
            "defense" => Ok(EffectKind::Defense),
            other => Err(Error::UnknownEffect(other.to_string())),
        }
    }
}

/// Which resource a shrine offering costs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CostKind {
    Health,
    Gold,
}

impl FromStr for CostKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "health" => Ok(CostKind::Health),
            "gold" => Ok(CostKind::Gold),
            other => Err(Error::UnknownCostKind(other.to_string())),
        }
    }
}

fn scale_difficulty(base: f64, difficulty: u32) -> i64 {
    (base * (1.0 + (difficulty as f64 - 5.0) * 0.1)).floor() as i64
}

fn scale_level(base: f64, level: u32) -> f64 {
    base * (1.0 + level as f64 * 0.05)
}

/// Enemy health for a rarity at a difficulty
pub fn health(rarity: Rarity, difficulty: u32) -> i64 {
    scale_difficulty(rarity.base_health(), difficulty)
}

/// Enemy attack for a rarity at a difficulty
pub fn attack(rarity: Rarity, difficulty: u32) -> i64 {
    scale_difficulty(rarity.base_attack(), difficulty)
}

/// Enemy defense for a rarity at a difficulty
pub fn defense(rarity: Rarity, difficulty: u32) -> i64 {
    scale_difficulty(rarity.base_defense(), difficulty)
}

/// Gold reward for defeating an enemy of this rarity
pub fn gold(rarity: Rarity, level: u32) -> i64 {
    scale_level(rarity.base_gold(), level).floor() as i64
}

/// Experience reward for defeating an enemy of this rarity
pub fn exp(rarity: Rarity, level: u32) -> i64 {
    scale_level(rarity.base_exp(), level).floor() as i64
}

/// Intrinsic value of an item from its rarity and stat line
pub fn item_value(rarity: Rarity, stats: StatBlock) -> i64 {
    (rarity.base_value()
        + stats.attack as f64 * 2.0
        + stats.defense as f64 * 2.0
        + stats.health as f64 * 0.5)
        .floor() as i64
}

/// Shop price for an item of a given value and rarity
pub fn price(item_value: i64, rarity: Rarity) -> i64 {
    (item_value as f64 * rarity.price_multiplier()).floor() as i64
}

/// Shop stock for a rarity tier
pub fn stock(rarity: Rarity) -> u32 {
    rarity.stock()
}

/// Shrine offering cost in the given resource
pub fn offering_cost(rarity: Rarity, cost: CostKind) -> i64 {
    match cost {
        CostKind::Health => rarity.shrine_health_cost(),
        CostKind::Gold => rarity.shrine_gold_cost(),
    }
}

/// Chance a shrine offering is answered with a boon
pub fn boon_chance(rarity: Rarity) -> f64 {
    rarity.boon_chance()
}

/// Boon magnitude, a linear multiple of what was offered
pub fn boon_reward(offering_cost: i64) -> i64 {
    offering_cost * 2
}

/// Bane magnitude, a linear multiple of what was offered
pub fn bane_penalty(offering_cost: i64) -> i64 {
    offering_cost
}

/// Chance a trap of this rarity catches the player
pub fn trap_fail_chance(rarity: Rarity) -> f64 {
    rarity.trap_fail_chance()
}

/// Damage a triggered trap deals
pub fn trap_damage(rarity: Rarity) -> i64 {
    rarity.trap_damage()
}

/// Weapon stat line: full attack scaling plus 30% of the defense base
pub fn weapon_stats(rarity: Rarity, level: u32) -> StatBlock {
    StatBlock {
        health: 0,
        attack: scale_level(rarity.base_attack(), level).floor() as i64,
        defense: scale_level(rarity.base_defense() * 0.3, level).floor() as i64,
    }
}

/// Armor stat line: full defense scaling plus 30% of the attack base
pub fn armor_stats(rarity: Rarity, level: u32) -> StatBlock {
    StatBlock {
        health: 0,
        attack: scale_level(rarity.base_attack() * 0.3, level).floor() as i64,
        defense: scale_level(rarity.base_defense(), level).floor() as i64,
    }
}

/// Accessory stat line: balanced 60% split of both plus a health bonus
pub fn accessory_stats(rarity: Rarity, level: u32) -> StatBlock {
    StatBlock {
        health: scale_level(rarity.base_health() * 0.2, level).floor() as i64,
        attack: scale_level(rarity.base_attack() * 0.6, level).floor() as i64,
        defense: scale_level(rarity.base_defense() * 0.6, level).floor() as i64,
    }
}

/// Magnitude of a consumable's effect for its rarity
pub fn consumable_effect(rarity: Rarity, effect: EffectKind) -> i64 {
    match effect {
        EffectKind::Health => match rarity {
            Rarity::Common => 20,
            Rarity::Uncommon => 40,
            Rarity::Rare => 80,
            Rarity::Epic => 150,
            Rarity::Legendary => 300,
        },
        EffectKind::Attack => match rarity {
            Rarity::Common => 3,
            Rarity::Uncommon => 6,
            Rarity::Rare => 10,
            Rarity::Epic => 16,
            Rarity::Legendary => 25,
        },
        EffectKind::Defense => match rarity {
            Rarity::Common => 2,
            Rarity::Uncommon => 4,
            Rarity::Rare => 8,
            Rarity::Epic => 12,
            Rarity::Legendary => 20,
        },
    }
}

/// Room difficulty from depth and portal stability, always in `5..=10`
///
/// `5 + min(room/15, 1) * 3 + ((100 - stability) / 100) * 2`, floored.
pub fn difficulty(room_number: u32, stability: u8) -> u32 {
    let depth = (room_number as f64 / 15.0).min(1.0) * 3.0;
    let instability = (100.0 - stability.min(100) as f64) / 100.0 * 2.0;
    (5.0 + depth + instability).floor() as u32
}

/// Pick a rarity tier, with higher tiers boosted by the difficulty modifier
///
/// Starts from the base weights, boosts legendary/epic/rare by
/// `1 + 0.10d / 1 + 0.15d / 1 + 0.20d` and shrinks common and uncommon by
/// `1 - 0.05d` (clamped at zero), then renormalizes and rolls the CDF.
pub fn select_rarity(dice: &mut Dice, difficulty_modifier: f64) -> Rarity {
    let d = difficulty_modifier;
    let weights: Vec<f64> = Rarity::ALL
        .iter()
        .map(|rarity| {
            let boost = match rarity {
                Rarity::Common | Rarity::Uncommon => 1.0 - 0.05 * d,
                Rarity::Rare => 1.0 + 0.20 * d,
                Rarity::Epic => 1.0 + 0.15 * d,
                Rarity::Legendary => 1.0 + 0.10 * d,
            };
            (rarity.base_weight() * boost).max(0.0)
        })
        .collect();

    match dice.weighted_index(&weights) {
        Some(idx) => Rarity::ALL[idx],
        // Only reachable if every weight collapsed to zero
        None => Rarity::Common,
    }
}

/// Damage roll: `max(1, attack - defense)` with uniform variance applied
pub fn damage(dice: &mut Dice, attacker: &StatBlock, defender: &StatBlock, variance: f64) -> i64 {
    let base = (attacker.attack - defender.defense).max(1) as f64;
    let factor = dice.range_f64(1.0 - variance, 1.0 + variance);
    ((base * factor).floor() as i64).max(1)
}

/// Single success roll against a chance
pub fn roll_success(dice: &mut Dice, chance: f64) -> bool {
    dice.chance(chance)
}
