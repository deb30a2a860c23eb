//! Battle session state and the attack-exchange math.
//!
//! The session is an explicit tagged union: either no fight is running, or
//! exactly one monster is engaged. Both sides' damage for a round is computed
//! from pre-attack snapshots and applied simultaneously, so a hero that dies
//! in a round can still take the monster down with it; the monster-defeated
//! check deliberately wins that tie.

use crate::monster::MonsterInstance;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Chance of a critical miss, and separately of a critical hit.
pub const CRITICAL_CHANCE: f64 = 0.05;
/// Critical hits deal `floor(power * 1.5)`.
pub const CRITICAL_MULTIPLIER: f64 = 1.5;
/// A partial block removes a uniform fraction in `[BLOCK_MIN, BLOCK_MAX)`.
pub const BLOCK_MIN: f64 = 0.1;
pub const BLOCK_MAX: f64 = 0.5;

/// Per-player battle state. At most one fight per player at a time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum BattleSession {
    /// No fight in progress.
    #[default]
    Idle,
    /// A monster is engaged; its hp is tracked here round to round.
    Engaged { monster: MonsterInstance },
}

impl BattleSession {
    pub fn is_engaged(&self) -> bool {
        matches!(self, BattleSession::Engaged { .. })
    }
}

/// How one side's attack landed this round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttackRoll {
    /// 5% chance: the blow barely connects.
    CriticalMiss,
    /// The defender dodged into a partial block; `reduction` is the fraction
    /// of the damage absorbed, uniform in `[0.1, 0.5)`.
    PartialBlock { reduction: f64 },
    /// 5% chance (after the dodge check): the blow lands hard.
    CriticalHit,
    /// A plain hit for full power.
    Normal,
}

/// Roll how an attack lands against a defender with the given immunity.
///
/// Check order matters and mirrors the game's balance: critical miss first,
/// then the defender's dodge (`immu / 100`), then critical hit. A negative
/// immunity simply never dodges.
pub fn roll_attack<R: Rng>(defender_immu: i32, rng: &mut R) -> AttackRoll {
    if rng.gen::<f64>() < CRITICAL_CHANCE {
        return AttackRoll::CriticalMiss;
    }
    let dodge_chance = defender_immu as f64 / 100.0;
    if rng.gen::<f64>() < dodge_chance {
        return AttackRoll::PartialBlock {
            reduction: rng.gen_range(BLOCK_MIN..BLOCK_MAX),
        };
    }
    if rng.gen::<f64>() < CRITICAL_CHANCE {
        return AttackRoll::CriticalHit;
    }
    AttackRoll::Normal
}

/// Damage dealt by an attacker with `power` given how the attack landed.
pub fn damage(power: i32, roll: AttackRoll) -> i32 {
    match roll {
        AttackRoll::CriticalMiss => power.div_euclid(2),
        AttackRoll::PartialBlock { reduction } => {
            power - (power as f64 * reduction).floor() as i32
        }
        AttackRoll::CriticalHit => (power as f64 * CRITICAL_MULTIPLIER).floor() as i32,
        AttackRoll::Normal => power,
    }
}

/// One simultaneous attack exchange.
///
/// `hero_damage` is dealt *by* the hero to the monster; `monster_damage` is
/// dealt by the monster to the hero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Exchange {
    pub hero_roll: AttackRoll,
    pub monster_roll: AttackRoll,
    pub hero_damage: i32,
    pub monster_damage: i32,
}

/// Compute both sides' damage from pre-attack power snapshots.
pub fn resolve_exchange(
    hero_power: i32,
    monster_power: i32,
    hero_roll: AttackRoll,
    monster_roll: AttackRoll,
) -> Exchange {
    Exchange {
        hero_roll,
        monster_roll,
        hero_damage: damage(hero_power, hero_roll),
        monster_damage: damage(monster_power, monster_roll),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_damage_normal_is_full_power() {
        assert_eq!(damage(9, AttackRoll::Normal), 9);
    }

    #[test]
    fn test_damage_critical_miss_halves_with_floor() {
        assert_eq!(damage(9, AttackRoll::CriticalMiss), 4);
        assert_eq!(damage(8, AttackRoll::CriticalMiss), 4);
        assert_eq!(damage(0, AttackRoll::CriticalMiss), 0);
    }

    #[test]
    fn test_damage_critical_hit_floors() {
        // 9 * 1.5 = 13.5 -> 13
        assert_eq!(damage(9, AttackRoll::CriticalHit), 13);
        assert_eq!(damage(10, AttackRoll::CriticalHit), 15);
    }

    #[test]
    fn test_damage_partial_block() {
        // 9 - floor(9 * 0.5) = 9 - 4 = 5
        assert_eq!(damage(9, AttackRoll::PartialBlock { reduction: 0.5 }), 5);
        // 10 - floor(10 * 0.1) = 9
        assert_eq!(damage(10, AttackRoll::PartialBlock { reduction: 0.1 }), 9);
    }

    #[test]
    fn test_damage_never_below_critical_miss_floor() {
        for power in 0..100 {
            let floor = damage(power, AttackRoll::CriticalMiss);
            for roll in [
                AttackRoll::Normal,
                AttackRoll::CriticalHit,
                AttackRoll::PartialBlock { reduction: 0.49 },
            ] {
                assert!(damage(power, roll) >= floor, "power {power}");
            }
        }
    }

    #[test]
    fn test_exchange_is_simultaneous() {
        // Hero: hp 10, power 9. Monster: hp 8, power 12. Rolls forced to
        // normal. Both would die; the caller's precedence rules decide.
        let exchange = resolve_exchange(9, 12, AttackRoll::Normal, AttackRoll::Normal);

        assert_eq!(exchange.hero_damage, 9);
        assert_eq!(exchange.monster_damage, 12);
        assert_eq!(8 - exchange.hero_damage, -1); // monster dies
        assert_eq!(10 - exchange.monster_damage, -2); // hero dies too
    }

    #[test]
    fn test_zero_immu_never_blocks() {
        let mut rng = StdRng::seed_from_u64(21);
        for _ in 0..500 {
            let roll = roll_attack(0, &mut rng);
            assert!(!matches!(roll, AttackRoll::PartialBlock { .. }));
        }
    }

    #[test]
    fn test_negative_immu_never_blocks() {
        let mut rng = StdRng::seed_from_u64(22);
        for _ in 0..500 {
            let roll = roll_attack(-40, &mut rng);
            assert!(!matches!(roll, AttackRoll::PartialBlock { .. }));
        }
    }

    #[test]
    fn test_overwhelming_immu_blocks_unless_attacker_fumbles() {
        let mut rng = StdRng::seed_from_u64(23);
        for _ in 0..500 {
            let roll = roll_attack(200, &mut rng);
            assert!(matches!(
                roll,
                AttackRoll::PartialBlock { .. } | AttackRoll::CriticalMiss
            ));
        }
    }

    #[test]
    fn test_block_reduction_in_range() {
        let mut rng = StdRng::seed_from_u64(24);
        let mut seen_block = false;
        for _ in 0..1_000 {
            if let AttackRoll::PartialBlock { reduction } = roll_attack(50, &mut rng) {
                assert!((BLOCK_MIN..BLOCK_MAX).contains(&reduction));
                seen_block = true;
            }
        }
        assert!(seen_block, "50% dodge should block at least once in 1000");
    }

    #[test]
    fn test_session_default_is_idle() {
        assert_eq!(BattleSession::default(), BattleSession::Idle);
        assert!(!BattleSession::Idle.is_engaged());
    }
}
