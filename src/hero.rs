//! Heroes and the attributes the game mutates.
//!
//! A hero is a player's persistent organism. Each player has at most one
//! *active* hero at a time; dead or replaced heroes are kept around (with
//! `is_active = false`) so the leaderboard can still see them.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of the player who owns a hero.
///
/// This is the external messaging platform's user id; the engine only ever
/// uses it as an opaque key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub i64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a hero generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HeroId(pub Uuid);

impl HeroId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for HeroId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HeroId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The three attributes exploration and battle outcomes act on.
///
/// Mutations and growths pick one of these uniformly at random; keeping the
/// set as an enum means every attribute update is an exhaustively checked
/// match rather than a string-keyed column name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attribute {
    Power,
    Hp,
    Immu,
}

impl Attribute {
    pub const ALL: [Attribute; 3] = [Attribute::Power, Attribute::Hp, Attribute::Immu];

    /// Pick an attribute uniformly at random.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Attribute::Power => "power",
            Attribute::Hp => "hp",
            Attribute::Immu => "immu",
        };
        write!(f, "{name}")
    }
}

/// Base stats rolled when a new hero is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStats {
    pub power: i32,
    pub hp: i32,
    pub immu: i32,
}

impl BaseStats {
    /// Roll fresh base stats: power in [2, 6], hp in [10, 50], immu in [0, 3].
    pub fn roll<R: Rng>(rng: &mut R) -> Self {
        Self {
            power: rng.gen_range(2..=6),
            hp: rng.gen_range(10..=50),
            immu: rng.gen_range(0..=3),
        }
    }
}

/// A player's organism.
///
/// `hp` may go non-positive: in battle that signals death, but a mutation can
/// also push it below zero without killing the hero. `power` and `immu` have
/// no lower bound either.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hero {
    pub id: HeroId,
    pub player: PlayerId,
    pub name: String,
    pub power: i32,
    pub hp: i32,
    pub immu: i32,
    pub level: u32,
    pub experience: i64,
    pub is_active: bool,
}

impl Hero {
    /// Create a fresh level-1 hero with the given base stats.
    pub fn new(player: PlayerId, name: impl Into<String>, base: BaseStats) -> Self {
        Self {
            id: HeroId::new(),
            player,
            name: name.into(),
            power: base.power,
            hp: base.hp,
            immu: base.immu,
            level: 1,
            experience: 0,
            is_active: true,
        }
    }

    /// Leaderboard rating: `level * 1000 + experience`.
    pub fn rating(&self) -> i64 {
        self.level as i64 * 1000 + self.experience
    }

    /// Read one attribute.
    pub fn attribute(&self, attribute: Attribute) -> i32 {
        match attribute {
            Attribute::Power => self.power,
            Attribute::Hp => self.hp,
            Attribute::Immu => self.immu,
        }
    }

    /// Shift one attribute by a signed delta. No floor is enforced.
    pub fn adjust(&mut self, attribute: Attribute, delta: i32) {
        match attribute {
            Attribute::Power => self.power += delta,
            Attribute::Hp => self.hp += delta,
            Attribute::Immu => self.immu += delta,
        }
    }
}
