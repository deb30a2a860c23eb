//! Built-in micro-world species catalog.
//!
//! Ships a playable default so the engine works without an external template
//! store. Ids are contiguous from 1, which is what the uniform-random
//! template pick in the engine assumes.

use crate::monster::MonsterTemplate;
use lazy_static::lazy_static;

lazy_static! {
    static ref DEFAULT_CATALOG: Vec<MonsterTemplate> = build_catalog();
}

/// Clone the default species catalog.
pub fn default_catalog() -> Vec<MonsterTemplate> {
    DEFAULT_CATALOG.clone()
}

fn species(
    id: u32,
    name: &str,
    power_base: i32,
    hp_base: i32,
    immu_base: i32,
    level_modifier: f64,
    description: &str,
    experience_reward: i64,
    hp_reward: i32,
    immu_reward: i32,
) -> MonsterTemplate {
    MonsterTemplate {
        id,
        name: name.to_string(),
        power_base,
        hp_base,
        immu_base,
        level_modifier,
        description: description.to_string(),
        image_url: None,
        experience_reward,
        hp_reward,
        immu_reward,
    }
}

fn build_catalog() -> Vec<MonsterTemplate> {
    vec![
        species(
            1,
            "Stray Phage",
            3,
            12,
            0,
            0.8,
            "A drifting virus particle hunting for a host to hijack.",
            40,
            2,
            0,
        ),
        species(
            2,
            "Rogue Amoeba",
            4,
            20,
            1,
            1.0,
            "A shapeless engulfer that digests anything slower than itself.",
            60,
            4,
            1,
        ),
        species(
            3,
            "Gram Bacillus",
            5,
            25,
            2,
            1.2,
            "A rod-shaped bacterium with a thick, stubborn cell wall.",
            80,
            5,
            1,
        ),
        species(
            4,
            "Ciliate Hunter",
            7,
            30,
            2,
            1.4,
            "Covered in beating cilia, it outswims nearly everything.",
            110,
            6,
            1,
        ),
        species(
            5,
            "Mold Colony",
            6,
            45,
            3,
            1.5,
            "A spreading mat of hyphae. Slow, but there is a lot of it.",
            130,
            8,
            1,
        ),
        species(
            6,
            "Prion Cluster",
            10,
            18,
            4,
            1.6,
            "Misfolded proteins that corrupt whatever they touch.",
            150,
            5,
            2,
        ),
        species(
            7,
            "Spore Titan",
            12,
            60,
            5,
            1.8,
            "A dormant giant woken by warmth. It does not go back to sleep.",
            200,
            10,
            2,
        ),
        species(
            8,
            "Tardigrade",
            14,
            80,
            6,
            2.0,
            "The micro-world's apex survivor. Practically unkillable.",
            260,
            12,
            3,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_contiguous_from_one() {
        let catalog = default_catalog();
        for (index, template) in catalog.iter().enumerate() {
            assert_eq!(template.id, index as u32 + 1);
        }
    }

    #[test]
    fn test_names_are_unique() {
        let catalog = default_catalog();
        let mut names: Vec<_> = catalog.iter().map(|t| t.name.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), catalog.len());
    }

    #[test]
    fn test_rewards_are_positive() {
        for template in default_catalog() {
            assert!(template.experience_reward > 0, "{}", template.name);
            assert!(template.hp_reward >= 0, "{}", template.name);
            assert!(template.immu_reward >= 0, "{}", template.name);
        }
    }
}
