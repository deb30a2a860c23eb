//! Experience gain and the level-up cascade.

use crate::hero::Hero;
use serde::{Deserialize, Serialize};

/// Upper bound on level-ups applied by a single experience gain.
///
/// The cascade terminates on its own because the threshold grows with each
/// level, but a corrupt store or an absurd reward value should not be able to
/// spin this loop forever.
pub const MAX_LEVEL_UPS_PER_GAIN: usize = 1_000;

/// One level gained, with the stats after the gain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelUp {
    pub level: u32,
    pub power: i32,
    pub hp: i32,
}

/// Add experience to a hero and cascade level-ups.
///
/// While `experience >= level * 100`, the threshold is subtracted, the level
/// rises by one, power by one, and hp by five. Returns one event per level
/// gained, in order, so the caller can announce each.
///
/// The caller is responsible for persisting the hero together with whatever
/// triggered the gain; this function only mutates the in-memory record.
pub fn apply_experience(hero: &mut Hero, amount: i64) -> Vec<LevelUp> {
    hero.experience += amount;

    let mut level_ups = Vec::new();
    while level_ups.len() < MAX_LEVEL_UPS_PER_GAIN {
        let threshold = hero.level as i64 * 100;
        if hero.experience < threshold {
            break;
        }
        hero.experience -= threshold;
        hero.level += 1;
        hero.power += 1;
        hero.hp += 5;
        level_ups.push(LevelUp {
            level: hero.level,
            power: hero.power,
            hp: hero.hp,
        });
    }
    level_ups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hero::{BaseStats, PlayerId};

    fn hero() -> Hero {
        Hero::new(
            PlayerId(1),
            "Speck",
            BaseStats {
                power: 3,
                hp: 20,
                immu: 1,
            },
        )
    }

    #[test]
    fn test_zero_amount_is_a_no_op() {
        let mut h = hero();
        let before = h.clone();

        let level_ups = apply_experience(&mut h, 0);

        assert!(level_ups.is_empty());
        assert_eq!(h, before);
    }

    #[test]
    fn test_gain_below_threshold_only_adds_experience() {
        let mut h = hero();

        let level_ups = apply_experience(&mut h, 99);

        assert!(level_ups.is_empty());
        assert_eq!(h.level, 1);
        assert_eq!(h.experience, 99);
    }

    #[test]
    fn test_single_level_up() {
        let mut h = hero();

        let level_ups = apply_experience(&mut h, 250);

        // 250 crosses the level-1 threshold (100) once; the level-2
        // threshold (200) is out of reach of the 150 that remain.
        assert_eq!(level_ups.len(), 1);
        assert_eq!(h.level, 2);
        assert_eq!(h.experience, 150);
        assert_eq!(h.power, 4);
        assert_eq!(h.hp, 25);
    }

    #[test]
    fn test_cascade_across_two_thresholds() {
        let mut h = hero();

        let level_ups = apply_experience(&mut h, 350);

        // 350 - 100 (level 1) - 200 (level 2) = 50 left at level 3.
        assert_eq!(level_ups.len(), 2);
        assert_eq!(h.level, 3);
        assert_eq!(h.experience, 50);
        assert_eq!(h.power, 3 + 2);
        assert_eq!(h.hp, 20 + 10);

        assert_eq!(
            level_ups[0],
            LevelUp {
                level: 2,
                power: 4,
                hp: 25
            }
        );
        assert_eq!(
            level_ups[1],
            LevelUp {
                level: 3,
                power: 5,
                hp: 30
            }
        );
    }

    #[test]
    fn test_events_match_final_stats() {
        let mut h = hero();
        let level_ups = apply_experience(&mut h, 10_000);

        let last = level_ups.last().expect("should level up at least once");
        assert_eq!(last.level, h.level);
        assert_eq!(last.power, h.power);
        assert_eq!(last.hp, h.hp);
    }

    #[test]
    fn test_iteration_cap_bounds_the_cascade() {
        let mut h = hero();

        let level_ups = apply_experience(&mut h, i64::MAX / 4);

        assert_eq!(level_ups.len(), MAX_LEVEL_UPS_PER_GAIN);
        assert_eq!(h.level as usize, 1 + MAX_LEVEL_UPS_PER_GAIN);
    }
}
