//! GameEngine - the primary public API for the bio-game.
//!
//! The engine wires the exploration resolver, battle math, progression
//! ledger, and hero lifecycle over the injected stores. Every action for one
//! player runs under that player's session lock, so a double-tapped "attack"
//! can never resolve the same battle twice; different players never contend.

use crate::battle::{self, BattleSession, Exchange};
use crate::explore::{self, ExploreEvent, ExploreOutcome};
use crate::hero::{Attribute, BaseStats, Hero, PlayerId};
use crate::monster::MonsterInstance;
use crate::progression::{self, LevelUp};
use crate::store::{
    HeroStore, MemoryHeroStore, MemoryTemplateStore, Notification, NotificationSink, NullSink,
    StoreError, TemplateStore,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use thiserror::Error;
use tokio::sync::Mutex as AsyncMutex;

/// Errors from engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no active hero for player {0}")]
    NoActiveHero(PlayerId),

    #[error("a battle is already in progress; finish it first")]
    BattleInProgress,

    #[error("no battle in progress")]
    NotInBattle,

    #[error("monster template not found: {0}")]
    TemplateNotFound(String),

    #[error("the monster catalog is empty")]
    EmptyCatalog,

    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

/// Coarse classification of an [`EngineError`] for the transport layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A referenced entity is missing; nothing was mutated.
    NotFound,
    /// A precondition was unmet; rejected before any mutation.
    InvalidState,
    /// A store write failed; no partial effect was applied, retry is safe.
    Persistence,
    /// Anything else; logged and reported generically.
    Unexpected,
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::TemplateNotFound(_) | EngineError::EmptyCatalog => ErrorKind::NotFound,
            EngineError::NoActiveHero(_)
            | EngineError::BattleInProgress
            | EngineError::NotInBattle => ErrorKind::InvalidState,
            EngineError::Store(StoreError::Backend(_)) => ErrorKind::Unexpected,
            EngineError::Store(_) => ErrorKind::Persistence,
        }
    }
}

/// Rewards granted for a victory, echoed back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VictoryRewards {
    pub experience: i64,
    pub hp: i32,
    pub immu: i32,
}

/// How an attack round ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RoundOutcome {
    /// Both sides still stand; the battle continues.
    Continue { hero: Hero, monster: MonsterInstance },
    /// The monster fell. This wins ties: a hero at hp <= 0 in the same
    /// exchange still claims the victory and stays active.
    Victory {
        hero: Hero,
        rewards: VictoryRewards,
        level_ups: Vec<LevelUp>,
    },
    /// The hero died and was deactivated; the player must create a new one.
    Defeat { hero: Hero },
}

/// Result of one attack action.
#[derive(Debug, Clone, PartialEq)]
pub struct AttackOutcome {
    pub exchange: Exchange,
    pub round: RoundOutcome,
}

/// Result of fleeing a battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FleeOutcome {
    /// Immunity after the flat -1 escape cost.
    pub immu: i32,
}

/// Per-player mutable state guarded by the player's session lock.
#[derive(Default)]
struct PlayerSession {
    battle: BattleSession,
}

/// The bio-game engine.
///
/// Cheap to share behind an `Arc`; all methods take `&self`.
pub struct GameEngine {
    heroes: Arc<dyn HeroStore>,
    templates: Arc<dyn TemplateStore>,
    notifier: Arc<dyn NotificationSink>,
    sessions: StdMutex<HashMap<PlayerId, Arc<AsyncMutex<PlayerSession>>>>,
    rng: StdMutex<StdRng>,
}

impl GameEngine {
    /// Create an engine over the given stores, seeded from entropy.
    pub fn new(
        heroes: Arc<dyn HeroStore>,
        templates: Arc<dyn TemplateStore>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            heroes,
            templates,
            notifier,
            sessions: StdMutex::new(HashMap::new()),
            rng: StdMutex::new(StdRng::from_entropy()),
        }
    }

    /// Replace the engine RNG with a seeded one for reproducible runs.
    pub fn with_rng_seed(self, seed: u64) -> Self {
        Self {
            rng: StdMutex::new(StdRng::seed_from_u64(seed)),
            ..self
        }
    }

    /// Fully in-memory engine: default species catalog, no notifications.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryHeroStore::new()),
            Arc::new(MemoryTemplateStore::with_default_catalog()),
            Arc::new(NullSink),
        )
    }

    /// Get (or create) the player's session handle.
    fn session_handle(&self, player: PlayerId) -> Arc<AsyncMutex<PlayerSession>> {
        let mut sessions = self
            .sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(sessions.entry(player).or_default())
    }

    /// Draw from the engine RNG. The guard never outlives the closure, so it
    /// is never held across an await point.
    fn with_rng<T>(&self, draw: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        draw(&mut rng)
    }

    async fn require_active_hero(&self, player: PlayerId) -> Result<Hero, EngineError> {
        self.heroes
            .active_hero(player)
            .await?
            .ok_or(EngineError::NoActiveHero(player))
    }

    /// Whether the player currently has a battle in progress.
    pub async fn in_battle(&self, player: PlayerId) -> bool {
        let handle = self.session_handle(player);
        let session = handle.lock().await;
        session.battle.is_engaged()
    }

    /// The player's active hero, if any.
    pub async fn active_hero(&self, player: PlayerId) -> Result<Option<Hero>, EngineError> {
        Ok(self.heroes.active_hero(player).await?)
    }

    /// The leaderboard: active heroes by rating, best first.
    pub async fn top_heroes(&self, limit: usize) -> Result<Vec<Hero>, EngineError> {
        Ok(self.heroes.top_by_rating(limit).await?)
    }

    /// Create a new hero for the player, retiring any current one.
    ///
    /// Base stats are rolled fresh (power [2,6], hp [10,50], immu [0,3]);
    /// the new hero starts at level 1 with no experience. Any stale battle
    /// session is cleared.
    pub async fn create_hero(
        &self,
        player: PlayerId,
        name: impl Into<String>,
    ) -> Result<Hero, EngineError> {
        let name = name.into();
        let handle = self.session_handle(player);
        let mut session = handle.lock().await;

        self.heroes.deactivate_hero(player).await?;
        let base = self.with_rng(BaseStats::roll);
        let hero = Hero::new(player, name, base);
        self.heroes.insert_hero(hero.clone()).await?;
        session.battle = BattleSession::Idle;

        tracing::info!(player = %player, hero = %hero.name, "hero created");
        Ok(hero)
    }

    /// Explore: roll for a mutation, a growth, or a monster encounter.
    ///
    /// Requires an active hero and no battle in progress.
    pub async fn explore(&self, player: PlayerId) -> Result<ExploreOutcome, EngineError> {
        let handle = self.session_handle(player);
        let mut session = handle.lock().await;

        let mut hero = self.require_active_hero(player).await?;
        if session.battle.is_engaged() {
            return Err(EngineError::BattleInProgress);
        }

        let dice = self.with_rng(explore::roll_dice);
        match explore::classify_dice(dice) {
            ExploreEvent::Mutation => {
                let (attribute, base) =
                    self.with_rng(|rng| (Attribute::random(rng), explore::roll_magnitude(rng)));
                let penalty = explore::mutation_penalty(attribute, hero.attribute(attribute), base);
                hero.adjust(attribute, -penalty);
                self.heroes.update_hero(&hero).await?;

                tracing::debug!(player = %player, %attribute, penalty, "mutation");
                Ok(ExploreOutcome::Mutation {
                    attribute,
                    amount: penalty,
                    new_value: hero.attribute(attribute),
                })
            }
            ExploreEvent::Growth => {
                let (attribute, base) =
                    self.with_rng(|rng| (Attribute::random(rng), explore::roll_magnitude(rng)));
                let bonus = explore::growth_bonus(attribute, base);
                hero.adjust(attribute, bonus);
                self.heroes.update_hero(&hero).await?;

                tracing::debug!(player = %player, %attribute, bonus, "growth");
                Ok(ExploreOutcome::Growth {
                    attribute,
                    amount: bonus,
                    new_value: hero.attribute(attribute),
                })
            }
            ExploreEvent::Encounter => {
                let count = self.templates.count().await?;
                if count == 0 {
                    return Err(EngineError::EmptyCatalog);
                }
                let id = self.with_rng(|rng| rng.gen_range(1..=count));
                let template = self
                    .templates
                    .template_by_id(id)
                    .await?
                    .ok_or_else(|| EngineError::TemplateNotFound(format!("id {id}")))?;

                let monster = MonsterInstance::scaled(&template, hero.level);
                session.battle = BattleSession::Engaged {
                    monster: monster.clone(),
                };

                tracing::debug!(player = %player, monster = %monster.name, "encounter started");
                self.notifier
                    .notify(player, Notification::Encounter { monster: monster.clone() })
                    .await;
                Ok(ExploreOutcome::Encounter { monster })
            }
        }
    }

    /// Start a battle against a specific monster, bypassing the exploration
    /// roll. Used for scripted scenarios and by the test harness.
    pub async fn begin_encounter(
        &self,
        player: PlayerId,
        monster: MonsterInstance,
    ) -> Result<(), EngineError> {
        let handle = self.session_handle(player);
        let mut session = handle.lock().await;

        self.require_active_hero(player).await?;
        if session.battle.is_engaged() {
            return Err(EngineError::BattleInProgress);
        }
        session.battle = BattleSession::Engaged { monster };
        Ok(())
    }

    /// Resolve one attack round against the engaged monster.
    ///
    /// Both sides' damage comes from pre-attack snapshots and lands
    /// simultaneously. If both drop to zero in the same exchange, the
    /// monster-defeated branch wins and the hero survives as the victor.
    pub async fn attack(&self, player: PlayerId) -> Result<AttackOutcome, EngineError> {
        let handle = self.session_handle(player);
        let mut session = handle.lock().await;

        let mut hero = self.require_active_hero(player).await?;
        let mut monster = match &session.battle {
            BattleSession::Engaged { monster } => monster.clone(),
            BattleSession::Idle => return Err(EngineError::NotInBattle),
        };

        let (hero_roll, monster_roll) = self.with_rng(|rng| {
            (
                battle::roll_attack(monster.immu, rng),
                battle::roll_attack(hero.immu, rng),
            )
        });
        let exchange = battle::resolve_exchange(hero.power, monster.power, hero_roll, monster_roll);

        hero.hp -= exchange.monster_damage;
        monster.hp -= exchange.hero_damage;

        self.notifier
            .notify(
                player,
                Notification::Exchange {
                    hero_roll: exchange.hero_roll,
                    monster_roll: exchange.monster_roll,
                    hero_damage: exchange.hero_damage,
                    monster_damage: exchange.monster_damage,
                },
            )
            .await;

        // Monster-defeated check takes precedence over hero-defeated.
        let round = if monster.hp <= 0 {
            let template = self
                .templates
                .template_by_name(&monster.name)
                .await?
                .ok_or_else(|| EngineError::TemplateNotFound(monster.name.clone()))?;

            let rewards = VictoryRewards {
                experience: template.experience_reward,
                hp: template.hp_reward,
                immu: template.immu_reward,
            };
            hero.immu += rewards.immu;
            hero.hp += rewards.hp;
            let level_ups = progression::apply_experience(&mut hero, rewards.experience);

            // Single write: rewards and experience land together or not at
            // all. The session only clears after the write succeeds, so a
            // failed attempt leaves the battle retryable.
            self.heroes.update_hero(&hero).await?;
            session.battle = BattleSession::Idle;

            tracing::debug!(player = %player, monster = %monster.name, "battle won");
            self.notifier
                .notify(
                    player,
                    Notification::Victory {
                        monster: monster.name.clone(),
                        experience_reward: rewards.experience,
                        hp_reward: rewards.hp,
                        immu_reward: rewards.immu,
                    },
                )
                .await;
            for level_up in &level_ups {
                self.notifier
                    .notify(
                        player,
                        Notification::LevelUp {
                            level: level_up.level,
                            power: level_up.power,
                            hp: level_up.hp,
                        },
                    )
                    .await;
            }

            RoundOutcome::Victory {
                hero,
                rewards,
                level_ups,
            }
        } else if hero.hp <= 0 {
            hero.is_active = false;
            self.heroes.update_hero(&hero).await?;
            session.battle = BattleSession::Idle;

            tracing::debug!(player = %player, hero = %hero.name, "hero died");
            self.notifier
                .notify(
                    player,
                    Notification::Defeat {
                        hero: hero.name.clone(),
                    },
                )
                .await;

            RoundOutcome::Defeat { hero }
        } else {
            self.heroes.update_hero(&hero).await?;
            session.battle = BattleSession::Engaged {
                monster: monster.clone(),
            };

            RoundOutcome::Continue { hero, monster }
        };

        Ok(AttackOutcome { exchange, round })
    }

    /// Flee the engaged battle. Always succeeds; costs 1 immunity flat.
    pub async fn flee(&self, player: PlayerId) -> Result<FleeOutcome, EngineError> {
        let handle = self.session_handle(player);
        let mut session = handle.lock().await;

        let mut hero = self.require_active_hero(player).await?;
        if !session.battle.is_engaged() {
            return Err(EngineError::NotInBattle);
        }

        hero.immu -= 1;
        self.heroes.update_hero(&hero).await?;
        session.battle = BattleSession::Idle;

        tracing::debug!(player = %player, immu = hero.immu, "fled battle");
        self.notifier
            .notify(player, Notification::Fled { immu: hero.immu })
            .await;
        Ok(FleeOutcome { immu: hero.immu })
    }
}
