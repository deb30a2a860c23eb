//! The engine running over the JSON-file hero store.

use biogame_core::store::{MemoryTemplateStore, NullSink};
use biogame_core::{GameEngine, HeroStore, JsonHeroStore, PlayerId, RoundOutcome};
use std::sync::Arc;
use tempfile::TempDir;

async fn engine_at(path: &std::path::Path, seed: u64) -> (GameEngine, Arc<JsonHeroStore>) {
    let heroes = Arc::new(JsonHeroStore::open(path).await.expect("open roster"));
    let engine = GameEngine::new(
        heroes.clone(),
        Arc::new(MemoryTemplateStore::with_default_catalog()),
        Arc::new(NullSink),
    )
    .with_rng_seed(seed);
    (engine, heroes)
}

#[tokio::test]
async fn test_progress_survives_a_restart() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("roster.json");
    let player = PlayerId(7);

    {
        let (engine, heroes) = engine_at(&path, 1).await;
        let mut hero = engine.create_hero(player, "Speck").await.expect("create");
        hero.power = 80;
        hero.hp = 5_000;
        heroes.update_hero(&hero).await.expect("update");

        engine
            .begin_encounter(
                player,
                biogame_core::testing::TestHarness::scripted_monster("Ciliate Hunter", 1, 1, 0),
            )
            .await
            .expect("encounter");
        let outcome = engine.attack(player).await.expect("attack");
        assert!(matches!(outcome.round, RoundOutcome::Victory { .. }));
    }

    // A fresh process over the same file sees the rewarded hero. Battle
    // sessions are in-memory only, so the restart comes up idle.
    let (engine, _) = engine_at(&path, 2).await;
    let hero = engine
        .active_hero(player)
        .await
        .expect("store")
        .expect("hero survived the restart");
    assert_eq!(hero.name, "Speck");
    assert!(hero.experience > 0 || hero.level > 1);
    assert!(!engine.in_battle(player).await);
}

#[tokio::test]
async fn test_retired_generations_accumulate_in_the_file() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("roster.json");
    let player = PlayerId(7);

    {
        let (engine, _) = engine_at(&path, 1).await;
        engine.create_hero(player, "First").await.expect("create");
        engine.create_hero(player, "Second").await.expect("create");
    }

    let content = std::fs::read_to_string(&path).expect("roster file");
    assert!(content.contains("First"));
    assert!(content.contains("Second"));

    let (engine, _) = engine_at(&path, 2).await;
    let active = engine
        .active_hero(player)
        .await
        .expect("store")
        .expect("active hero");
    assert_eq!(active.name, "Second");
}
