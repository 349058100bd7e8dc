//! Rarity tiers and their constant balance tables
//!
//! All numeric scaling in the game starts from these five ordered tiers.
//! The tables here are the single source of truth for base values; the
//! formula library layers difficulty/level scaling on top.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of five ordered balance tiers
///
/// The derived `Ord` follows declaration order, so
/// `Common < Uncommon < Rare < Epic < Legendary`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    #[default]
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    /// All tiers in ascending order
    pub const ALL: [Rarity; 5] = [
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::Epic,
        Rarity::Legendary,
    ];

    /// Base selection weight before any difficulty boost
    pub fn base_weight(self) -> f64 {
        match self {
            Rarity::Common => 0.50,
            Rarity::Uncommon => 0.25,
            Rarity::Rare => 0.15,
            Rarity::Epic => 0.08,
            Rarity::Legendary => 0.02,
        }
    }

    /// Base enemy health at difficulty 5
    pub fn base_health(self) -> f64 {
        match self {
            Rarity::Common => 20.0,
            Rarity::Uncommon => 35.0,
            Rarity::Rare => 60.0,
            Rarity::Epic => 100.0,
            Rarity::Legendary => 160.0,
        }
    }

    /// Base enemy attack at difficulty 5
    pub fn base_attack(self) -> f64 {
        match self {
            Rarity::Common => 5.0,
            Rarity::Uncommon => 9.0,
            Rarity::Rare => 14.0,
            Rarity::Epic => 22.0,
            Rarity::Legendary => 35.0,
        }
    }

    /// Base enemy defense at difficulty 5
    pub fn base_defense(self) -> f64 {
        match self {
            Rarity::Common => 3.0,
            Rarity::Uncommon => 6.0,
            Rarity::Rare => 10.0,
            Rarity::Epic => 16.0,
            Rarity::Legendary => 26.0,
        }
    }

    /// Base gold reward at level 0
    pub fn base_gold(self) -> f64 {
        match self {
            Rarity::Common => 10.0,
            Rarity::Uncommon => 25.0,
            Rarity::Rare => 60.0,
            Rarity::Epic => 150.0,
            Rarity::Legendary => 400.0,
        }
    }

    /// Base experience reward at level 0
    pub fn base_exp(self) -> f64 {
        match self {
            Rarity::Common => 15.0,
            Rarity::Uncommon => 35.0,
            Rarity::Rare => 80.0,
            Rarity::Epic => 180.0,
            Rarity::Legendary => 450.0,
        }
    }

    /// Base item value before stat contributions
    pub fn base_value(self) -> f64 {
        match self {
            Rarity::Common => 10.0,
            Rarity::Uncommon => 25.0,
            Rarity::Rare => 60.0,
            Rarity::Epic => 150.0,
            Rarity::Legendary => 400.0,
        }
    }

    /// Shop price multiplier over item value
    pub fn price_multiplier(self) -> f64 {
        match self {
            Rarity::Common => 1.0,
            Rarity::Uncommon => 1.5,
            Rarity::Rare => 2.5,
            Rarity::Epic => 4.0,
            Rarity::Legendary => 8.0,
        }
    }

    /// Shop stock per restock (rarer means less; epic and legendary both 1)
    pub fn stock(self) -> u32 {
        match self {
            Rarity::Common => 5,
            Rarity::Uncommon => 4,
            Rarity::Rare => 3,
            Rarity::Epic => 1,
            Rarity::Legendary => 1,
        }
    }

    /// Shrine offering cost paid in health
    pub fn shrine_health_cost(self) -> i64 {
        match self {
            Rarity::Common => 10,
            Rarity::Uncommon => 15,
            Rarity::Rare => 25,
            Rarity::Epic => 40,
            Rarity::Legendary => 60,
        }
    }

    /// Shrine offering cost paid in gold
    pub fn shrine_gold_cost(self) -> i64 {
        match self {
            Rarity::Common => 25,
            Rarity::Uncommon => 75,
            Rarity::Rare => 200,
            Rarity::Epic => 500,
            Rarity::Legendary => 1200,
        }
    }

    /// Chance a shrine offering yields a boon rather than a bane
    pub fn boon_chance(self) -> f64 {
        match self {
            Rarity::Common => 0.50,
            Rarity::Uncommon => 0.60,
            Rarity::Rare => 0.70,
            Rarity::Epic => 0.80,
            Rarity::Legendary => 0.90,
        }
    }

    /// Chance a trap of this rarity triggers on the player
    pub fn trap_fail_chance(self) -> f64 {
        match self {
            Rarity::Common => 0.15,
            Rarity::Uncommon => 0.25,
            Rarity::Rare => 0.35,
            Rarity::Epic => 0.45,
            Rarity::Legendary => 0.55,
        }
    }

    /// Damage dealt by a triggered trap
    pub fn trap_damage(self) -> i64 {
        match self {
            Rarity::Common => 5,
            Rarity::Uncommon => 10,
            Rarity::Rare => 18,
            Rarity::Epic => 30,
            Rarity::Legendary => 50,
        }
    }

    /// Lowercase tier name, matching the serde encoding
    pub fn as_str(self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Uncommon => "uncommon",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Rarity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "common" => Ok(Rarity::Common),
            "uncommon" => Ok(Rarity::Uncommon),
            "rare" => Ok(Rarity::Rare),
            "epic" => Ok(Rarity::Epic),
            "legendary" => Ok(Rarity::Legendary),
            other => Err(Error::UnknownRarity(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_are_ordered() {
        assert!(Rarity::Common < Rarity::Uncommon);
        assert!(Rarity::Uncommon < Rarity::Rare);
        assert!(Rarity::Rare < Rarity::Epic);
        assert!(Rarity::Epic < Rarity::Legendary);
    }

    #[test]
    fn base_weights_sum_to_one() {
        let total: f64 = Rarity::ALL.iter().map(|r| r.base_weight()).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn tables_are_monotone() {
        for pair in Rarity::ALL.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            assert!(lo.base_health() < hi.base_health());
            assert!(lo.base_attack() < hi.base_attack());
            assert!(lo.base_defense() < hi.base_defense());
            assert!(lo.base_gold() < hi.base_gold());
            assert!(lo.base_exp() < hi.base_exp());
            assert!(lo.price_multiplier() < hi.price_multiplier());
            assert!(lo.boon_chance() < hi.boon_chance());
            assert!(lo.trap_fail_chance() < hi.trap_fail_chance());
            assert!(lo.trap_damage() < hi.trap_damage());
            assert!(lo.stock() >= hi.stock());
        }
    }

    #[test]
    fn serde_uses_lowercase_names() {
        assert_eq!(ron::to_string(&Rarity::Epic).unwrap(), "epic");
        assert_eq!(ron::from_str::<Rarity>("legendary").unwrap(), Rarity::Legendary);
    }

    #[test]
    fn parse_round_trip() {
        for rarity in Rarity::ALL {
            assert_eq!(rarity.as_str().parse::<Rarity>().unwrap(), rarity);
        }
        assert!("mythic".parse::<Rarity>().is_err());
    }
}
