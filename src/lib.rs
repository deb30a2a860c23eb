//! Bio-game engine: exploration, turn-based battles, and hero progression.
//!
//! This crate provides:
//! - The complete bio-evolution game mechanics (explore rolls, attack
//!   exchanges, level-up cascades, hero lifecycle)
//! - Port traits for the hero store, monster catalog, and notifications
//! - A JSON-file hero store and a built-in species catalog
//! - A deterministic test harness
//!
//! # Quick Start
//!
//! ```ignore
//! use biogame_core::{ExploreOutcome, GameEngine, PlayerId};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = GameEngine::in_memory();
//!     let player = PlayerId(1);
//!
//!     let hero = engine.create_hero(player, "Speck").await?;
//!     println!("{} awakens with {} hp", hero.name, hero.hp);
//!
//!     match engine.explore(player).await? {
//!         ExploreOutcome::Encounter { monster } => {
//!             println!("{monster}");
//!             let outcome = engine.attack(player).await?;
//!             println!("dealt {} damage", outcome.exchange.hero_damage);
//!         }
//!         other => println!("{other:?}"),
//!     }
//!     Ok(())
//! }
//! ```

pub mod battle;
pub mod catalog;
pub mod engine;
pub mod explore;
pub mod hero;
pub mod monster;
pub mod persist;
pub mod progression;
pub mod store;
pub mod testing;

// Primary public API
pub use battle::{AttackRoll, BattleSession, Exchange};
pub use engine::{
    AttackOutcome, EngineError, ErrorKind, FleeOutcome, GameEngine, RoundOutcome, VictoryRewards,
};
pub use explore::ExploreOutcome;
pub use hero::{Attribute, BaseStats, Hero, HeroId, PlayerId};
pub use monster::{MonsterInstance, MonsterTemplate};
pub use persist::JsonHeroStore;
pub use progression::LevelUp;
pub use store::{
    HeroStore, MemoryHeroStore, MemoryTemplateStore, Notification, NotificationSink, NullSink,
    StoreError, TemplateStore,
};
pub use testing::{RecordingSink, TestHarness};
