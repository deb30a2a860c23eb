//! JSON-file hero persistence.
//!
//! Stores the full hero roster (active and retired generations) in a single
//! versioned JSON file. Writes go to a temporary file first and are renamed
//! into place, so a crash mid-write never leaves a corrupt or half-applied
//! roster behind.

use crate::hero::{Hero, PlayerId};
use crate::store::{HeroStore, StoreError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;

/// Current roster file version.
const ROSTER_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct RosterFile {
    version: u32,
    heroes: Vec<Hero>,
}

/// A [`HeroStore`] backed by one JSON file.
///
/// The in-memory roster is the source of truth for reads; every mutation is
/// flushed to disk before it is committed to memory, so a failed write leaves
/// both the file and the store unchanged and the caller can safely retry.
#[derive(Debug)]
pub struct JsonHeroStore {
    path: PathBuf,
    roster: Mutex<Vec<Hero>>,
}

impl JsonHeroStore {
    /// Open (or create) a roster file.
    ///
    /// A missing file starts an empty roster; an existing one must match
    /// [`ROSTER_VERSION`].
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let roster = match fs::read_to_string(&path).await {
            Ok(content) => {
                let file: RosterFile = serde_json::from_str(&content)?;
                if file.version != ROSTER_VERSION {
                    return Err(StoreError::VersionMismatch {
                        expected: ROSTER_VERSION,
                        found: file.version,
                    });
                }
                file.heroes
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "starting a fresh roster");
                Vec::new()
            }
            Err(err) => return Err(err.into()),
        };

        Ok(Self {
            path,
            roster: Mutex::new(roster),
        })
    }

    /// Write the given roster to disk atomically (temp file + rename).
    async fn flush(&self, heroes: &[Hero]) -> Result<(), StoreError> {
        let file = RosterFile {
            version: ROSTER_VERSION,
            heroes: heroes.to_vec(),
        };
        let content = serde_json::to_string_pretty(&file)?;

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, content).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl HeroStore for JsonHeroStore {
    async fn active_hero(&self, player: PlayerId) -> Result<Option<Hero>, StoreError> {
        let roster = self.roster.lock().await;
        Ok(roster
            .iter()
            .rev()
            .find(|h| h.player == player && h.is_active)
            .cloned())
    }

    async fn insert_hero(&self, hero: Hero) -> Result<(), StoreError> {
        let mut roster = self.roster.lock().await;
        let mut next = roster.clone();
        next.push(hero);
        self.flush(&next).await?;
        *roster = next;
        Ok(())
    }

    async fn update_hero(&self, hero: &Hero) -> Result<(), StoreError> {
        let mut roster = self.roster.lock().await;
        let mut next = roster.clone();
        let slot = next
            .iter_mut()
            .find(|h| h.id == hero.id)
            .ok_or_else(|| StoreError::Backend(format!("unknown hero {}", hero.id)))?;
        *slot = hero.clone();
        self.flush(&next).await?;
        *roster = next;
        Ok(())
    }

    async fn deactivate_hero(&self, player: PlayerId) -> Result<(), StoreError> {
        let mut roster = self.roster.lock().await;
        if !roster.iter().any(|h| h.player == player && h.is_active) {
            return Ok(());
        }
        let mut next = roster.clone();
        for hero in next.iter_mut().filter(|h| h.player == player) {
            hero.is_active = false;
        }
        self.flush(&next).await?;
        *roster = next;
        Ok(())
    }

    async fn top_by_rating(&self, limit: usize) -> Result<Vec<Hero>, StoreError> {
        let roster = self.roster.lock().await;
        let mut active: Vec<Hero> = roster.iter().filter(|h| h.is_active).cloned().collect();
        active.sort_by(|a, b| b.rating().cmp(&a.rating()));
        active.truncate(limit);
        Ok(active)
    }
}
