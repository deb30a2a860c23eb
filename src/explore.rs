//! Exploration rolls: mutation, growth, or a monster encounter.
//!
//! Every explore action rolls a single die in `[0, 20]`. The weighting is
//! deliberately asymmetric: 3 faces lose stats, 4 gain stats, and the
//! remaining 14 start a fight.

use crate::hero::Attribute;
use crate::monster::MonsterInstance;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// The exploration die is inclusive on both ends: `[0, EXPLORE_DIE_MAX]`.
pub const EXPLORE_DIE_MAX: u8 = 20;

/// What a given die face does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExploreEvent {
    /// Faces 0-2: one attribute takes a penalty.
    Mutation,
    /// Faces 3-6: one attribute gets a bonus.
    Growth,
    /// Faces 7-20: a monster appears.
    Encounter,
}

/// Map a die face to its event. `dice` must be in `[0, 20]`.
pub fn classify_dice(dice: u8) -> ExploreEvent {
    debug_assert!(dice <= EXPLORE_DIE_MAX);
    match dice {
        0..=2 => ExploreEvent::Mutation,
        3..=6 => ExploreEvent::Growth,
        _ => ExploreEvent::Encounter,
    }
}

/// Roll the exploration die.
pub fn roll_dice<R: Rng>(rng: &mut R) -> u8 {
    rng.gen_range(0..=EXPLORE_DIE_MAX)
}

/// Roll the base magnitude shared by mutations and growths: uniform `[1, 3]`.
pub fn roll_magnitude<R: Rng>(rng: &mut R) -> i32 {
    rng.gen_range(1..=3)
}

/// Compute the mutation penalty for an attribute.
///
/// Immunity loses harder the more of it the hero has (`current / 3` extra,
/// floor division), and hp penalties are five times the base roll. The
/// result is subtracted with no floor; power and immu may go negative.
pub fn mutation_penalty(attribute: Attribute, current: i32, base: i32) -> i32 {
    match attribute {
        Attribute::Immu => current.div_euclid(3) + base,
        Attribute::Hp => base * 5,
        Attribute::Power => base,
    }
}

/// Compute the growth bonus for an attribute. Hp grows ten times the base.
pub fn growth_bonus(attribute: Attribute, base: i32) -> i32 {
    match attribute {
        Attribute::Hp => base * 10,
        Attribute::Power | Attribute::Immu => base,
    }
}

/// Result of one explore action, as reported to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum ExploreOutcome {
    /// An attribute took a penalty.
    Mutation {
        attribute: Attribute,
        amount: i32,
        new_value: i32,
    },
    /// An attribute got a bonus.
    Growth {
        attribute: Attribute,
        amount: i32,
        new_value: i32,
    },
    /// A monster appeared and the battle session is now engaged.
    Encounter { monster: MonsterInstance },
}
