//! Stat block shared by entities, gear, and temporary modifiers

use serde::{Deserialize, Serialize};
use std::ops::Add;

/// A plain bundle of combat stats
///
/// Missing stats are simply zero, which is what the value and damage
/// formulas expect for partial gear (a weapon with no health bonus, etc).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StatBlock {
    #[serde(default)]
    pub health: i64,
    #[serde(default)]
    pub attack: i64,
    #[serde(default)]
    pub defense: i64,
}

impl StatBlock {
    /// Create a stat block with all three stats
    pub fn new(health: i64, attack: i64, defense: i64) -> Self {
        Self {
            health,
            attack,
            defense,
        }
    }

    /// True when every stat is zero
    pub fn is_empty(&self) -> bool {
        self.health == 0 && self.attack == 0 && self.defense == 0
    }
}

impl Add for StatBlock {
    type Output = StatBlock;

    fn add(self, rhs: StatBlock) -> StatBlock {
        StatBlock {
            health: self.health + rhs.health,
            attack: self.attack + rhs.attack,
            defense: self.defense + rhs.defense,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_empty() {
        assert!(StatBlock::default().is_empty());
        assert!(!StatBlock::new(1, 0, 0).is_empty());
    }

    #[test]
    fn add_is_componentwise() {
        let sum = StatBlock::new(1, 2, 3) + StatBlock::new(10, 20, 30);
        assert_eq!(sum, StatBlock::new(11, 22, 33));
    }
}
