//! Resource-guarded transactions: shop purchases, shrine offerings, traps
//!
//! Every transaction checks the player's resources before touching any
//! state; an insufficient balance aborts with nothing mutated.

use crate::error::{PortalError, Result};
use crate::state::Player;
use riftbound_core::{formulas, CostKind, Dice, Rarity};

/// What a shrine answered with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShrineOutcome {
    /// Blessed: the reward magnitude, in the offered resource
    Boon { amount: i64 },
    /// Cursed: the extra penalty taken on top of the offering
    Bane { amount: i64 },
}

/// What stepping on a trap did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrapOutcome {
    Avoided,
    Hit { damage: i64 },
}

/// Buy one unit of stock at the given price
///
/// Fails before any mutation when gold or stock runs short.
pub fn purchase(player: &mut Player, price: i64, stock: &mut u32) -> Result<()> {
    if *stock == 0 {
        return Err(PortalError::OutOfStock);
    }
    if player.gold < price {
        return Err(PortalError::Insufficient {
            resource: "gold",
            needed: price,
            available: player.gold,
        });
    }
    player.gold -= price;
    *stock -= 1;
    Ok(())
}

/// Make a shrine offering and roll for the boon
///
/// The offering cost is deducted up front; a boon refunds a multiple of
/// it, a bane takes an extra penalty (health floors at zero).
pub fn shrine_offering(
    dice: &mut Dice,
    player: &mut Player,
    rarity: Rarity,
    cost_kind: CostKind,
) -> Result<ShrineOutcome> {
    let cost = formulas::offering_cost(rarity, cost_kind);
    let available = match cost_kind {
        CostKind::Health => player.health,
        CostKind::Gold => player.gold,
    };
    if available < cost {
        return Err(PortalError::Insufficient {
            resource: match cost_kind {
                CostKind::Health => "health",
                CostKind::Gold => "gold",
            },
            needed: cost,
            available,
        });
    }

    pay(player, cost_kind, cost);
    if formulas::roll_success(dice, formulas::boon_chance(rarity)) {
        let amount = formulas::boon_reward(cost);
        grant(player, cost_kind, amount);
        Ok(ShrineOutcome::Boon { amount })
    } else {
        let amount = formulas::bane_penalty(cost);
        pay(player, cost_kind, amount);
        Ok(ShrineOutcome::Bane { amount })
    }
}

/// Resolve a trap of the given rarity against the player
pub fn spring_trap(dice: &mut Dice, player: &mut Player, rarity: Rarity) -> TrapOutcome {
    if !formulas::roll_success(dice, formulas::trap_fail_chance(rarity)) {
        return TrapOutcome::Avoided;
    }
    let damage = formulas::trap_damage(rarity);
    player.health = (player.health - damage).max(0);
    TrapOutcome::Hit { damage }
}

fn pay(player: &mut Player, kind: CostKind, amount: i64) {
    match kind {
        CostKind::Health => player.health = (player.health - amount).max(0),
        CostKind::Gold => player.gold = (player.gold - amount).max(0),
    }
}

fn grant(player: &mut Player, kind: CostKind, amount: i64) {
    match kind {
        CostKind::Health => player.health += amount,
        CostKind::Gold => player.gold += amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(gold: i64, health: i64) -> Player {
        Player {
            gold,
            health,
            ..Player::default()
        }
    }

    #[test]
    fn purchase_checks_before_mutating() {
        let mut buyer = player(10, 100);
        let mut stock = 2;

        let err = purchase(&mut buyer, 25, &mut stock).unwrap_err();
        assert!(matches!(err, PortalError::Insufficient { resource: "gold", .. }));
        assert_eq!(buyer.gold, 10);
        assert_eq!(stock, 2);

        purchase(&mut buyer, 10, &mut stock).unwrap();
        assert_eq!(buyer.gold, 0);
        assert_eq!(stock, 1);

        stock = 0;
        let err = purchase(&mut buyer, 0, &mut stock).unwrap_err();
        assert!(matches!(err, PortalError::OutOfStock));
    }

    #[test]
    fn shrine_refuses_a_pauper() {
        let mut dice = Dice::new(4);
        let mut pauper = player(5, 100);
        let err = shrine_offering(&mut dice, &mut pauper, Rarity::Rare, CostKind::Gold).unwrap_err();
        assert!(matches!(err, PortalError::Insufficient { resource: "gold", .. }));
        assert_eq!(pauper.gold, 5);
    }

    #[test]
    fn shrine_outcome_moves_the_offered_resource() {
        let mut dice = Dice::new(21);
        let mut pilgrim = player(10_000, 100);
        let before = pilgrim.gold;
        let cost = formulas::offering_cost(Rarity::Common, CostKind::Gold);

        match shrine_offering(&mut dice, &mut pilgrim, Rarity::Common, CostKind::Gold).unwrap() {
            ShrineOutcome::Boon { amount } => {
                assert_eq!(amount, formulas::boon_reward(cost));
                assert_eq!(pilgrim.gold, before - cost + amount);
            }
            ShrineOutcome::Bane { amount } => {
                assert_eq!(amount, formulas::bane_penalty(cost));
                assert_eq!(pilgrim.gold, before - cost - amount);
            }
        }
    }

    #[test]
    fn trap_damage_floors_health_at_zero() {
        let mut dice = Dice::new(30);
        let mut victim = player(0, 1);
        // Spring until one connects; the roll is part of the contract
        loop {
            match spring_trap(&mut dice, &mut victim, Rarity::Legendary) {
                TrapOutcome::Avoided => {
                    victim.health = 1;
                }
                TrapOutcome::Hit { damage } => {
                    assert_eq!(damage, formulas::trap_damage(Rarity::Legendary));
                    assert_eq!(victim.health, 0);
                    break;
                }
            }
        }
    }
}
