//! Loot and treasure tables.
//!
//! Enemies drop from the common loot table; treasure rooms always award
//! one entry of the higher-value treasure table.

use crate::dice::{self, RandomSource};
use crate::world::{Item, Rarity};

/// Probability that a freshly generated enemy carries loot.
pub const LOOT_CHANCE: f64 = 0.7;

/// Aether essence granted alongside every treasure.
pub const TREASURE_AETHER_BONUS: u32 = 10;

lazy_static::lazy_static! {
    /// Drops carried by regular enemies.
    pub static ref LOOT_TABLE: Vec<Item> = vec![
        Item::new("Aether Crystal", "💎", Rarity::Common, 1),
        Item::new("Shadow Shard", "🔘", Rarity::Common, 1),
        Item::new("Dimensional Dust", "✨", Rarity::Uncommon, 2),
        Item::new("Void Essence", "🌑", Rarity::Rare, 3),
    ];

    /// Rewards found in treasure rooms.
    pub static ref TREASURE_TABLE: Vec<Item> = vec![
        Item::new("Dimension Crystal", "💎", Rarity::Rare, 4),
        Item::new("Aether Relic", "🏺", Rarity::Epic, 6),
        Item::new("Void Heart", "🌌", Rarity::Legendary, 8),
    ];
}

/// Roll for an enemy drop: `LOOT_CHANCE` of one uniform loot table entry.
pub fn generate_loot(rng: &mut dyn RandomSource) -> Option<Item> {
    if !rng.chance(LOOT_CHANCE) {
        return None;
    }
    dice::pick(rng, LOOT_TABLE.as_slice()).cloned()
}

/// Draw a treasure room reward. Always produces an item.
pub fn generate_treasure(rng: &mut dyn RandomSource) -> Item {
    let index = rng.pick_index(TREASURE_TABLE.len());
    TREASURE_TABLE[index].clone()
}

/// Find a table item by name (case-insensitive).
pub fn find_item(name: &str) -> Option<Item> {
    let name_lower = name.to_lowercase();
    LOOT_TABLE
        .iter()
        .chain(TREASURE_TABLE.iter())
        .find(|item| item.name.to_lowercase() == name_lower)
        .cloned()
}

/// Sum of existence points across a collection of items.
pub fn total_existence_points<'a>(items: impl IntoIterator<Item = &'a Item>) -> u32 {
    items.into_iter().map(|item| item.existence_points).sum()
}
