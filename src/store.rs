//! Ports to the excluded collaborators: hero storage, the template catalog,
//! and the notification sink, plus in-memory reference implementations.
//!
//! The engine only ever talks to these traits. A transport layer plugs in its
//! own implementations (a relational store, a chat client); tests and the
//! default setup use the in-memory ones below.

use crate::battle::AttackRoll;
use crate::hero::{Hero, PlayerId};
use crate::monster::{MonsterInstance, MonsterTemplate};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

/// Errors from the storage backends.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("unsupported roster version: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Read-only access to the monster template catalog.
///
/// The catalog never changes during a battle, so implementations do not need
/// interior mutability.
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// Number of templates in the catalog.
    async fn count(&self) -> Result<u32, StoreError>;

    /// Look up a template by id. Ids are expected to be contiguous from 1 so
    /// the engine can pick one uniformly at random.
    async fn template_by_id(&self, id: u32) -> Result<Option<MonsterTemplate>, StoreError>;

    /// Look up a template by species name (used for victory rewards).
    async fn template_by_name(&self, name: &str) -> Result<Option<MonsterTemplate>, StoreError>;
}

/// Persistent hero records.
///
/// Invariant maintained by the engine: at most one active hero per player.
/// `update_hero` must persist the whole record in one write so a battle
/// outcome (rewards plus experience, or death plus deactivation) is never
/// half-applied.
#[async_trait]
pub trait HeroStore: Send + Sync {
    /// The player's currently active hero, if any.
    async fn active_hero(&self, player: PlayerId) -> Result<Option<Hero>, StoreError>;

    /// Insert a newly created hero.
    async fn insert_hero(&self, hero: Hero) -> Result<(), StoreError>;

    /// Replace the stored record with this one, matched by hero id.
    async fn update_hero(&self, hero: &Hero) -> Result<(), StoreError>;

    /// Deactivate whichever hero is active for the player. Idempotent.
    async fn deactivate_hero(&self, player: PlayerId) -> Result<(), StoreError>;

    /// Active heroes ordered by rating (`level * 1000 + experience`), best
    /// first, at most `limit` entries.
    async fn top_by_rating(&self, limit: usize) -> Result<Vec<Hero>, StoreError>;
}

/// Fire-and-forget outbound messages.
///
/// Delivery is not required for game-state correctness; the engine never
/// fails an action because a notification could not be sent.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, player: PlayerId, message: Notification);
}

/// Everything the engine announces to a player.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// The hero reached a new level.
    LevelUp { level: u32, power: i32, hp: i32 },
    /// A monster appeared during exploration.
    Encounter { monster: MonsterInstance },
    /// Narration for one attack round.
    Exchange {
        hero_roll: AttackRoll,
        monster_roll: AttackRoll,
        hero_damage: i32,
        monster_damage: i32,
    },
    /// The monster fell and rewards were applied. Level-ups earned from the
    /// experience reward are announced separately, one [`Notification::LevelUp`]
    /// per level.
    Victory {
        monster: String,
        experience_reward: i64,
        hp_reward: i32,
        immu_reward: i32,
    },
    /// The hero died; a new one must be created.
    Defeat { hero: String },
    /// The hero ran from the fight.
    Fled { immu: i32 },
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notification::LevelUp { level, power, hp } => write!(
                f,
                "Your organism reached level {level}! Power is now {power}, health {hp}."
            ),
            Notification::Encounter { monster } => {
                write!(f, "A wild {} blocks your path!\n{monster}", monster.name)
            }
            Notification::Exchange {
                hero_roll,
                monster_roll,
                hero_damage,
                monster_damage,
            } => {
                write!(
                    f,
                    "You dealt {hero_damage} damage{}. The enemy dealt {monster_damage} damage{}.",
                    roll_note(*hero_roll),
                    roll_note(*monster_roll)
                )
            }
            Notification::Victory {
                monster,
                experience_reward,
                hp_reward,
                immu_reward,
            } => write!(
                f,
                "{monster} is defeated! Immunity +{immu_reward}, health +{hp_reward}, \
                 experience +{experience_reward}."
            ),
            Notification::Defeat { hero } => {
                write!(f, "{hero} has perished. Time to grow a new organism.")
            }
            Notification::Fled { immu } => write!(
                f,
                "You escaped the encounter but lost 1 immunity (now {immu})."
            ),
        }
    }
}

fn roll_note(roll: AttackRoll) -> &'static str {
    match roll {
        AttackRoll::CriticalMiss => " (critical miss!)",
        AttackRoll::PartialBlock { .. } => " (partially blocked)",
        AttackRoll::CriticalHit => " (critical hit!)",
        AttackRoll::Normal => "",
    }
}

/// A sink that drops every notification.
pub struct NullSink;

#[async_trait]
impl NotificationSink for NullSink {
    async fn notify(&self, _player: PlayerId, _message: Notification) {}
}

// ============================================================================
// In-memory implementations
// ============================================================================

/// In-memory hero store, keyed by player with full generation history.
#[derive(Default)]
pub struct MemoryHeroStore {
    heroes: Mutex<HashMap<PlayerId, Vec<Hero>>>,
}

impl MemoryHeroStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<PlayerId, Vec<Hero>>> {
        self.heroes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl HeroStore for MemoryHeroStore {
    async fn active_hero(&self, player: PlayerId) -> Result<Option<Hero>, StoreError> {
        let heroes = self.lock();
        Ok(heroes
            .get(&player)
            .and_then(|generations| generations.iter().rev().find(|h| h.is_active).cloned()))
    }

    async fn insert_hero(&self, hero: Hero) -> Result<(), StoreError> {
        let mut heroes = self.lock();
        heroes.entry(hero.player).or_default().push(hero);
        Ok(())
    }

    async fn update_hero(&self, hero: &Hero) -> Result<(), StoreError> {
        let mut heroes = self.lock();
        let slot = heroes
            .get_mut(&hero.player)
            .and_then(|generations| generations.iter_mut().find(|h| h.id == hero.id))
            .ok_or_else(|| StoreError::Backend(format!("unknown hero {}", hero.id)))?;
        *slot = hero.clone();
        Ok(())
    }

    async fn deactivate_hero(&self, player: PlayerId) -> Result<(), StoreError> {
        let mut heroes = self.lock();
        if let Some(generations) = heroes.get_mut(&player) {
            for hero in generations.iter_mut() {
                hero.is_active = false;
            }
        }
        Ok(())
    }

    async fn top_by_rating(&self, limit: usize) -> Result<Vec<Hero>, StoreError> {
        let heroes = self.lock();
        let mut active: Vec<Hero> = heroes
            .values()
            .flatten()
            .filter(|h| h.is_active)
            .cloned()
            .collect();
        active.sort_by(|a, b| b.rating().cmp(&a.rating()));
        active.truncate(limit);
        Ok(active)
    }
}

/// In-memory, read-only template catalog.
pub struct MemoryTemplateStore {
    templates: Vec<MonsterTemplate>,
}

impl MemoryTemplateStore {
    pub fn new(templates: Vec<MonsterTemplate>) -> Self {
        Self { templates }
    }

    /// Catalog pre-loaded with the built-in species.
    pub fn with_default_catalog() -> Self {
        Self::new(crate::catalog::default_catalog())
    }
}

#[async_trait]
impl TemplateStore for MemoryTemplateStore {
    async fn count(&self) -> Result<u32, StoreError> {
        Ok(self.templates.len() as u32)
    }

    async fn template_by_id(&self, id: u32) -> Result<Option<MonsterTemplate>, StoreError> {
        Ok(self.templates.iter().find(|t| t.id == id).cloned())
    }

    async fn template_by_name(&self, name: &str) -> Result<Option<MonsterTemplate>, StoreError> {
        Ok(self.templates.iter().find(|t| t.name == name).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hero::BaseStats;

    fn hero(player: i64, name: &str) -> Hero {
        Hero::new(
            PlayerId(player),
            name,
            BaseStats {
                power: 3,
                hp: 20,
                immu: 1,
            },
        )
    }

    #[tokio::test]
    async fn test_active_hero_roundtrip() {
        let store = MemoryHeroStore::new();
        assert!(store.active_hero(PlayerId(1)).await.unwrap().is_none());

        store.insert_hero(hero(1, "Speck")).await.unwrap();
        let active = store.active_hero(PlayerId(1)).await.unwrap().unwrap();
        assert_eq!(active.name, "Speck");
    }

    #[tokio::test]
    async fn test_deactivate_is_idempotent() {
        let store = MemoryHeroStore::new();
        store.deactivate_hero(PlayerId(1)).await.unwrap();

        store.insert_hero(hero(1, "Speck")).await.unwrap();
        store.deactivate_hero(PlayerId(1)).await.unwrap();
        store.deactivate_hero(PlayerId(1)).await.unwrap();

        assert!(store.active_hero(PlayerId(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_unknown_hero_fails() {
        let store = MemoryHeroStore::new();
        let ghost = hero(1, "Ghost");
        let err = store.update_hero(&ghost).await.unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));
    }

    #[tokio::test]
    async fn test_top_by_rating_orders_and_limits() {
        let store = MemoryHeroStore::new();
        let mut a = hero(1, "A");
        a.level = 5;
        let mut b = hero(2, "B");
        b.level = 9;
        let mut c = hero(3, "C");
        c.level = 9;
        c.experience = 40;

        for h in [a, b, c] {
            store.insert_hero(h).await.unwrap();
        }

        let top = store.top_by_rating(2).await.unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].name, "C");
        assert_eq!(top[1].name, "B");
    }

    #[tokio::test]
    async fn test_top_by_rating_skips_inactive() {
        let store = MemoryHeroStore::new();
        store.insert_hero(hero(1, "Old")).await.unwrap();
        store.deactivate_hero(PlayerId(1)).await.unwrap();
        store.insert_hero(hero(1, "New")).await.unwrap();

        let top = store.top_by_rating(10).await.unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].name, "New");
    }

    #[tokio::test]
    async fn test_template_lookup() {
        let store = MemoryTemplateStore::with_default_catalog();
        let count = store.count().await.unwrap();
        assert!(count > 0);

        let first = store.template_by_id(1).await.unwrap().unwrap();
        let by_name = store
            .template_by_name(&first.name)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first, by_name);

        assert!(store.template_by_id(count + 1).await.unwrap().is_none());
        assert!(store.template_by_name("Nonexistent").await.unwrap().is_none());
    }
}
