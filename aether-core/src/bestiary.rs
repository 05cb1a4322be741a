//! Enemy generation.
//!
//! Regular and boss rooms draw names from separate pools; stats follow from
//! the enemy level.

use crate::dice::{self, RandomSource};
use crate::items::generate_loot;
use crate::world::{Enemy, RoomType};

/// Levels added to the dimension level for a boss encounter.
pub const BOSS_LEVEL_BONUS: u32 = 2;

/// Names for enemies found in combat rooms.
pub const COMBAT_NAMES: &[&str] = &["Shadow Stalker", "Void Warden", "Aether Beast"];

/// Names for dimension guardians.
pub const BOSS_NAMES: &[&str] = &["Dimension Lord", "Shadow King", "Void Titan"];

/// Glyphs an enemy can be drawn with.
pub const SPRITES: &[&str] = &["👹", "👻", "🐉", "🗿", "⚡", "🔥"];

/// Which name pool to draw from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyKind {
    Regular,
    Boss,
}

impl EnemyKind {
    /// The kind of enemy a room spawns, if any.
    pub fn for_room(room_type: RoomType) -> Option<Self> {
        match room_type {
            RoomType::Combat => Some(EnemyKind::Regular),
            RoomType::Boss => Some(EnemyKind::Boss),
            _ => None,
        }
    }

    pub fn names(&self) -> &'static [&'static str] {
        match self {
            EnemyKind::Regular => COMBAT_NAMES,
            EnemyKind::Boss => BOSS_NAMES,
        }
    }

    /// Enemy level for a dimension of the given level.
    pub fn level_in(&self, dimension_level: u32) -> u32 {
        match self {
            EnemyKind::Regular => dimension_level,
            EnemyKind::Boss => dimension_level.saturating_add(BOSS_LEVEL_BONUS),
        }
    }
}

/// Generate an enemy named from `names`, with level-derived stats and a loot roll.
///
/// Draw order: name, loot gate (and loot entry when it passes), sprite.
pub fn generate_enemy(names: &[&str], level: u32, rng: &mut dyn RandomSource) -> Enemy {
    let name = dice::pick(rng, names).copied().unwrap_or("Nameless Shade");
    let mut enemy = Enemy::new(name, level);
    enemy.loot = generate_loot(rng);
    if let Some(sprite) = dice::pick(rng, SPRITES) {
        enemy.sprite = sprite.to_string();
    }
    enemy
}

/// Generate the enemy guarding a room of `kind` in a dimension of `dimension_level`.
pub fn spawn(kind: EnemyKind, dimension_level: u32, rng: &mut dyn RandomSource) -> Enemy {
    generate_enemy(kind.names(), kind.level_in(dimension_level), rng)
}
