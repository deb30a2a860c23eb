//! Testing utilities for the bio-game engine.
//!
//! Provides a [`RecordingSink`] that captures every notification and a
//! [`TestHarness`] that wires a fully in-memory engine with a seeded RNG, so
//! integration tests can script whole battles deterministically.

use crate::engine::{GameEngine, RoundOutcome};
use crate::explore::ExploreOutcome;
use crate::hero::{Hero, PlayerId};
use crate::monster::MonsterInstance;
use crate::store::{
    HeroStore, MemoryHeroStore, MemoryTemplateStore, Notification, NotificationSink,
};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};

/// A notification sink that records everything it is given.
#[derive(Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<(PlayerId, Notification)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded notifications, in arrival order.
    pub fn messages(&self) -> Vec<(PlayerId, Notification)> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Notifications recorded for one player.
    pub fn messages_for(&self, player: PlayerId) -> Vec<Notification> {
        self.messages()
            .into_iter()
            .filter(|(p, _)| *p == player)
            .map(|(_, n)| n)
            .collect()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn notify(&self, player: PlayerId, message: Notification) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((player, message));
    }
}

/// An in-memory engine plus direct store access for test setup.
pub struct TestHarness {
    pub engine: GameEngine,
    pub heroes: Arc<MemoryHeroStore>,
    pub sink: Arc<RecordingSink>,
    pub player: PlayerId,
}

impl TestHarness {
    /// Harness with a fixed default seed.
    pub fn new() -> Self {
        Self::with_seed(42)
    }

    /// Harness with an explicit RNG seed for reproducible scenarios.
    pub fn with_seed(seed: u64) -> Self {
        let heroes = Arc::new(MemoryHeroStore::new());
        let sink = Arc::new(RecordingSink::new());
        let engine = GameEngine::new(
            heroes.clone(),
            Arc::new(MemoryTemplateStore::with_default_catalog()),
            sink.clone(),
        )
        .with_rng_seed(seed);

        Self {
            engine,
            heroes,
            sink,
            player: PlayerId(1),
        }
    }

    /// Create a hero for the default player.
    pub async fn spawn_hero(&self, name: &str) -> Hero {
        self.engine
            .create_hero(self.player, name)
            .await
            .expect("hero creation should succeed")
    }

    /// The default player's active hero.
    pub async fn hero(&self) -> Hero {
        self.engine
            .active_hero(self.player)
            .await
            .expect("hero store should be reachable")
            .expect("an active hero should exist")
    }

    /// Overwrite the active hero's combat stats for a scripted scenario.
    pub async fn set_hero_stats(&self, power: i32, hp: i32, immu: i32) {
        let mut hero = self.hero().await;
        hero.power = power;
        hero.hp = hp;
        hero.immu = immu;
        self.heroes
            .update_hero(&hero)
            .await
            .expect("stat override should persist");
    }

    /// Put the default player into a battle against a specific monster.
    pub async fn force_encounter(&self, monster: MonsterInstance) {
        self.engine
            .begin_encounter(self.player, monster)
            .await
            .expect("encounter should start");
    }

    /// A scripted monster whose name matches a real catalog species, so
    /// victory rewards resolve. Stats are whatever the test needs.
    pub fn scripted_monster(name: &str, power: i32, hp: i32, immu: i32) -> MonsterInstance {
        MonsterInstance {
            template_id: 0,
            name: name.to_string(),
            description: String::new(),
            image_url: None,
            power,
            hp,
            immu,
        }
    }

    /// Explore until a monster shows up, fleeing is never needed because
    /// exploration stops at the first encounter. Panics after `max_tries`.
    pub async fn explore_until_encounter(&self, max_tries: usize) -> MonsterInstance {
        for _ in 0..max_tries {
            match self
                .engine
                .explore(self.player)
                .await
                .expect("explore should succeed")
            {
                ExploreOutcome::Encounter { monster } => return monster,
                ExploreOutcome::Mutation { .. } | ExploreOutcome::Growth { .. } => continue,
            }
        }
        panic!("no encounter within {max_tries} explorations");
    }

    /// Attack every round until the battle resolves. Panics after
    /// `max_rounds` rounds without a resolution.
    pub async fn attack_until_resolved(&self, max_rounds: usize) -> RoundOutcome {
        for _ in 0..max_rounds {
            let outcome = self
                .engine
                .attack(self.player)
                .await
                .expect("attack should resolve");
            match outcome.round {
                RoundOutcome::Continue { .. } => continue,
                resolved => return resolved,
            }
        }
        panic!("battle did not resolve within {max_rounds} rounds");
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Assertion helpers
// ============================================================================

/// Assert a hero is still active.
#[track_caller]
pub fn assert_active(hero: &Hero) {
    assert!(hero.is_active, "expected {} to be active", hero.name);
}

/// Assert a hero has been deactivated.
#[track_caller]
pub fn assert_retired(hero: &Hero) {
    assert!(!hero.is_active, "expected {} to be retired", hero.name);
}

/// Assert a hero's leaderboard rating.
#[track_caller]
pub fn assert_rating(hero: &Hero, expected: i64) {
    assert_eq!(
        hero.rating(),
        expected,
        "expected {} to rate {expected}, got {}",
        hero.name,
        hero.rating()
    );
}
