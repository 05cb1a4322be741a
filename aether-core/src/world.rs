//! Aethermoor game state types.
//!
//! Contains the player, enemies, items, rooms, dimensions and the root
//! `GameState` aggregate. Field names serialize in the camelCase shape of
//! the save document.

use crate::progression;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Save document version written by this engine.
pub const GAME_VERSION: &str = "1.0.0";

// ============================================================================
// Classes and Stats
// ============================================================================

/// The three playable classes.
///
/// Deserializes from any string; unrecognised names become `Voidwalker`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PlayerClass {
    Voidwalker,
    Aethermancer,
    Forgemaster,
}

impl PlayerClass {
    /// Parse a class name, falling back to `Voidwalker` for anything unknown.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "aethermancer" => PlayerClass::Aethermancer,
            "forgemaster" => PlayerClass::Forgemaster,
            "voidwalker" => PlayerClass::Voidwalker,
            other => {
                tracing::debug!(class = other, "unknown class, using voidwalker");
                PlayerClass::Voidwalker
            }
        }
    }

    /// The lowercase identifier used in save documents.
    pub fn id(&self) -> &'static str {
        match self {
            PlayerClass::Voidwalker => "voidwalker",
            PlayerClass::Aethermancer => "aethermancer",
            PlayerClass::Forgemaster => "forgemaster",
        }
    }

    pub fn all() -> [PlayerClass; 3] {
        [
            PlayerClass::Voidwalker,
            PlayerClass::Aethermancer,
            PlayerClass::Forgemaster,
        ]
    }
}

impl From<String> for PlayerClass {
    fn from(name: String) -> Self {
        PlayerClass::from_name(&name)
    }
}

impl From<PlayerClass> for String {
    fn from(class: PlayerClass) -> Self {
        class.id().to_string()
    }
}

impl fmt::Display for PlayerClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A single upgradeable stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stat {
    Agility,
    Strength,
    Intelligence,
}

impl Stat {
    pub fn name(&self) -> &'static str {
        match self {
            Stat::Agility => "agility",
            Stat::Strength => "strength",
            Stat::Intelligence => "intelligence",
        }
    }
}

impl FromStr for Stat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "agility" => Ok(Stat::Agility),
            "strength" => Ok(Stat::Strength),
            "intelligence" => Ok(Stat::Intelligence),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Agility, strength and intelligence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatBlock {
    pub agility: u32,
    pub strength: u32,
    pub intelligence: u32,
}

impl StatBlock {
    pub const fn new(agility: u32, strength: u32, intelligence: u32) -> Self {
        Self {
            agility,
            strength,
            intelligence,
        }
    }

    pub fn get(&self, stat: Stat) -> u32 {
        match stat {
            Stat::Agility => self.agility,
            Stat::Strength => self.strength,
            Stat::Intelligence => self.intelligence,
        }
    }

    pub fn get_mut(&mut self, stat: Stat) -> &mut u32 {
        match stat {
            Stat::Agility => &mut self.agility,
            Stat::Strength => &mut self.strength,
            Stat::Intelligence => &mut self.intelligence,
        }
    }
}

// ============================================================================
// Items
// ============================================================================

/// Item rarity tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub fn name(&self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Uncommon => "uncommon",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A collectible item. Never mutated after generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub name: String,
    pub icon: String,
    pub rarity: Rarity,
    pub existence_points: u32,
}

impl Item {
    pub fn new(
        name: impl Into<String>,
        icon: impl Into<String>,
        rarity: Rarity,
        existence_points: u32,
    ) -> Self {
        Self {
            name: name.into(),
            icon: icon.into(),
            rarity,
            existence_points,
        }
    }
}

/// Equipment slots. Carried in the save document but not read by any rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    pub weapon: Option<Item>,
    pub armor: Option<Item>,
    pub accessory: Option<Item>,
}

/// Currency-like counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resources {
    pub aether_essence: u32,
    pub dimensional_fragments: u32,
}

// ============================================================================
// Player
// ============================================================================

/// The player character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub name: String,
    pub class: PlayerClass,
    pub level: u32,
    pub xp: u32,
    pub xp_to_next: u32,
    pub stats: StatBlock,
    pub equipment: Equipment,
    pub inventory: Vec<Item>,
    pub resources: Resources,
    pub skill_points: u32,
    pub mementos: Vec<String>,
    #[serde(rename = "currentHP")]
    pub current_hp: u32,
}

impl Player {
    pub fn new(name: impl Into<String>, class: PlayerClass) -> Self {
        let stats = progression::create_stats(class);
        Self {
            name: name.into(),
            class,
            level: 1,
            xp: 0,
            xp_to_next: progression::INITIAL_XP_TO_NEXT,
            stats,
            equipment: Equipment::default(),
            inventory: Vec::new(),
            resources: Resources::default(),
            skill_points: progression::STARTING_SKILL_POINTS,
            mementos: Vec::new(),
            current_hp: progression::max_hp(1, stats.strength),
        }
    }

    pub fn max_hp(&self) -> u32 {
        progression::max_hp(self.level, self.stats.strength)
    }

    /// Heal up to max HP. Returns the amount actually restored.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let old = self.current_hp;
        self.current_hp = self.current_hp.saturating_add(amount).min(self.max_hp());
        self.current_hp.saturating_sub(old)
    }

    pub fn restore_full(&mut self) {
        self.current_hp = self.max_hp();
    }

    /// Apply damage, flooring at zero. Returns true when HP reached zero.
    pub fn take_damage(&mut self, amount: u32) -> bool {
        self.current_hp = self.current_hp.saturating_sub(amount);
        self.current_hp == 0
    }

    pub fn is_defeated(&self) -> bool {
        self.current_hp == 0
    }

    pub fn class_icon(&self) -> &'static str {
        self.class.icon()
    }
}

impl Default for Player {
    fn default() -> Self {
        Player::new("", PlayerClass::Voidwalker)
    }
}

// ============================================================================
// Enemy
// ============================================================================

/// A combat opponent. Lives only for the duration of one combat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enemy {
    pub name: String,
    pub level: u32,
    #[serde(rename = "maxHP")]
    pub max_hp: u32,
    #[serde(rename = "currentHP")]
    pub current_hp: u32,
    pub attack: u32,
    /// Computed from level but not subtracted anywhere in the damage math.
    pub defense: u32,
    pub xp_reward: u32,
    pub loot: Option<Item>,
    pub sprite: String,
}

impl Enemy {
    /// Build an enemy with level-derived stats and no loot.
    pub fn new(name: impl Into<String>, level: u32) -> Self {
        let scaled =
            |base: u32, per_level: u32| base.saturating_add(level.saturating_mul(per_level));
        let max_hp = scaled(50, 20);
        Self {
            name: name.into(),
            level,
            max_hp,
            current_hp: max_hp,
            attack: scaled(10, 5),
            defense: scaled(5, 2),
            xp_reward: scaled(25, 15),
            loot: None,
            sprite: "👹".to_string(),
        }
    }

    /// Apply damage, flooring at zero. Returns true when the enemy is defeated.
    pub fn take_damage(&mut self, amount: u32) -> bool {
        self.current_hp = self.current_hp.saturating_sub(amount);
        self.current_hp == 0
    }
}

// ============================================================================
// Rooms and Dimensions
// ============================================================================

/// Encounter type of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomType {
    Safe,
    Treasure,
    Combat,
    Special,
    Boss,
}

impl RoomType {
    pub fn is_hostile(&self) -> bool {
        matches!(self, RoomType::Combat | RoomType::Boss)
    }
}

/// A node in a dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: usize,
    pub name: String,
    pub icon: String,
    #[serde(rename = "type")]
    pub room_type: RoomType,
}

/// A procedurally generated linear dungeon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimension {
    pub name: String,
    pub level: u32,
    pub stability: u32,
    pub rooms: Vec<Room>,
    pub current_room: usize,
    pub explored: BTreeSet<usize>,
}

impl Dimension {
    pub fn room(&self, id: usize) -> Option<&Room> {
        self.rooms.get(id)
    }

    pub fn current(&self) -> Option<&Room> {
        self.rooms.get(self.current_room)
    }

    pub fn is_explored(&self, id: usize) -> bool {
        self.explored.contains(&id)
    }

    pub fn at_last_room(&self) -> bool {
        self.current_room + 1 >= self.rooms.len()
    }
}

impl Default for Dimension {
    fn default() -> Self {
        Self {
            name: String::new(),
            level: 1,
            stability: crate::dimension::MAX_STABILITY,
            rooms: Vec::new(),
            current_room: 0,
            explored: BTreeSet::from([0]),
        }
    }
}

// ============================================================================
// Settings and Root State
// ============================================================================

/// Player-facing settings, persisted with the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(deserialize_with = "clamped_volume")]
    pub music_volume: u8,
    #[serde(deserialize_with = "clamped_volume")]
    pub sfx_volume: u8,
    pub auto_save: bool,
}

/// Highest volume setting.
pub const MAX_VOLUME: u8 = 100;

/// Read any JSON number as a volume in `0..=100`.
fn clamped_volume<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let volume = f64::deserialize(deserializer)?;
    Ok(volume.clamp(0.0, f64::from(MAX_VOLUME)) as u8)
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            music_volume: 50,
            sfx_volume: 75,
            auto_save: true,
        }
    }
}

/// The root aggregate. Exactly one is live per session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub version: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub player: Option<Player>,
    pub current_dimension: Option<Dimension>,
    pub settings: Settings,
}

impl GameState {
    pub fn new() -> Self {
        Self {
            version: GAME_VERSION.to_string(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            player: None,
            current_dimension: None,
            settings: Settings::default(),
        }
    }

    pub fn touch(&mut self) {
        self.timestamp = chrono::Utc::now().timestamp_millis();
    }

    /// Clamp loaded values back inside their invariants.
    pub fn normalize(&mut self) {
        if let Some(player) = self.player.as_mut() {
            player.level = player.level.max(1);
            player.xp_to_next = player.xp_to_next.max(1);
            player.current_hp = player.current_hp.min(player.max_hp());
        }
        if let Some(dimension) = self.current_dimension.as_mut() {
            dimension.stability = dimension.stability.min(crate::dimension::MAX_STABILITY);
            if dimension.current_room >= dimension.rooms.len() {
                dimension.current_room = dimension.rooms.len().saturating_sub(1);
            }
            let room_count = dimension.rooms.len();
            dimension.explored.retain(|id| *id < room_count.max(1));
            dimension.explored.insert(dimension.current_room);
        }
        self.settings.music_volume = self.settings.music_volume.min(MAX_VOLUME);
        self.settings.sfx_volume = self.settings.sfx_volume.min(MAX_VOLUME);
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_class_defaults_to_voidwalker() {
        assert_eq!(PlayerClass::from_name("necromancer"), PlayerClass::Voidwalker);
        assert_eq!(PlayerClass::from_name("Forgemaster"), PlayerClass::Forgemaster);

        let class: PlayerClass = serde_json::from_str("\"bard\"").unwrap();
        assert_eq!(class, PlayerClass::Voidwalker);
        assert_eq!(serde_json::to_string(&PlayerClass::Aethermancer).unwrap(), "\"aethermancer\"");
    }

    #[test]
    fn test_new_player() {
        let player = Player::new("Nyx", PlayerClass::Voidwalker);
        assert_eq!(player.level, 1);
        assert_eq!(player.xp_to_next, 100);
        assert_eq!(player.skill_points, 3);
        assert_eq!(player.stats, StatBlock::new(15, 8, 12));
        assert_eq!(player.max_hp(), 150);
        assert_eq!(player.current_hp, 150);
    }

    #[test]
    fn test_player_damage_and_heal_are_bounded() {
        let mut player = Player::new("Nyx", PlayerClass::Forgemaster);
        let max = player.max_hp();

        assert!(!player.take_damage(40));
        assert_eq!(player.heal(1000), 40);
        assert_eq!(player.current_hp, max);

        assert!(player.take_damage(max + 50));
        assert_eq!(player.current_hp, 0);
        assert!(player.is_defeated());
    }

    #[test]
    fn test_enemy_stats_scale_with_level() {
        let enemy = Enemy::new("Void Warden", 3);
        assert_eq!(enemy.max_hp, 110);
        assert_eq!(enemy.current_hp, 110);
        assert_eq!(enemy.attack, 25);
        assert_eq!(enemy.defense, 11);
        assert_eq!(enemy.xp_reward, 70);
    }

    #[test]
    fn test_player_json_shape() {
        let player = Player::new("Nyx", PlayerClass::Aethermancer);
        let value = serde_json::to_value(&player).unwrap();

        assert_eq!(value["class"], "aethermancer");
        assert_eq!(value["xpToNext"], 100);
        assert_eq!(value["currentHP"], 150);
        assert_eq!(value["resources"]["aetherEssence"], 0);
        assert!(value["equipment"]["weapon"].is_null());
    }

    #[test]
    fn test_normalize_clamps_hp_and_room() {
        let mut state = GameState::new();
        let mut player = Player::new("Nyx", PlayerClass::Voidwalker);
        player.current_hp = 9999;
        state.player = Some(player);
        state.current_dimension = Some(Dimension {
            current_room: 40,
            rooms: vec![Room {
                id: 0,
                name: "Entrance Hall".to_string(),
                icon: "🚪".to_string(),
                room_type: RoomType::Safe,
            }],
            ..Dimension::default()
        });

        state.normalize();

        assert_eq!(state.player.as_ref().unwrap().current_hp, 150);
        assert_eq!(state.current_dimension.as_ref().unwrap().current_room, 0);
    }
}
