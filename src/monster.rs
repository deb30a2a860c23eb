//! Monster templates and the per-encounter instances scaled from them.
//!
//! A template is static catalog data; an instance is what the hero actually
//! fights, derived from a template and the hero's level at encounter start.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Monsters never dodge more than 10% of the time, however high the
/// player's level climbs.
pub const MONSTER_IMMU_CAP: i32 = 10;

/// Static catalog entry for a monster species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonsterTemplate {
    /// Catalog id. The default catalog uses contiguous ids starting at 1.
    pub id: u32,
    pub name: String,
    pub power_base: i32,
    pub hp_base: i32,
    pub immu_base: i32,
    /// How steeply the species scales with player level.
    pub level_modifier: f64,
    pub description: String,
    pub image_url: Option<String>,
    pub experience_reward: i64,
    pub hp_reward: i32,
    pub immu_reward: i32,
}

/// A template scaled to one player's level for one encounter.
///
/// Instances are ephemeral: they live in the battle session and are dropped
/// when the battle resolves. The template name is kept so victory rewards can
/// be looked up when the monster falls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonsterInstance {
    pub template_id: u32,
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
    pub power: i32,
    pub hp: i32,
    pub immu: i32,
}

impl MonsterInstance {
    /// Scale a template to the given player level.
    ///
    /// Each stat grows by `(level - 1) * rate * level_modifier`, truncated
    /// toward zero (never rounded). Immunity is capped at
    /// [`MONSTER_IMMU_CAP`].
    pub fn scaled(template: &MonsterTemplate, player_level: u32) -> Self {
        let steps = player_level.saturating_sub(1) as f64;
        let grow = |rate: f64| (steps * rate * template.level_modifier) as i32;

        Self {
            template_id: template.id,
            name: template.name.clone(),
            description: template.description.clone(),
            image_url: template.image_url.clone(),
            power: template.power_base + grow(0.8),
            hp: template.hp_base + grow(2.5),
            immu: (template.immu_base + grow(0.15)).min(MONSTER_IMMU_CAP),
        }
    }
}

impl fmt::Display for MonsterInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:\n  power: {}\n  hp: {}\n  immu: {}\n{}",
            self.name, self.power, self.hp, self.immu, self.description
        )
    }
}
