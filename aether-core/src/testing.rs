//! Testing utilities for Aethermoor.
//!
//! This module provides tools for integration testing:
//! - `ScriptedRandom` for replaying exact random draws
//! - `TestHarness` for scripted game scenarios
//! - Assertion helpers for verifying game state

use crate::combat::CombatState;
use crate::dice::{RandomSource, SeededRandom};
use crate::dimension::{self, INTERIOR_ROOMS};
use crate::persist::{MemoryStore, SaveStore};
use crate::session::{GameConfig, GameSession, Response, Screen};
use crate::world::{Enemy, GameState, Player, PlayerClass, Room, RoomType};
use std::sync::Arc;
use std::time::Duration;

/// A random source that replays a fixed list of `[0, 1)` values, cycling
/// when it runs out.
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    values: Vec<f64>,
    index: usize,
}

impl ScriptedRandom {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, index: 0 }
    }

    /// Number of values drawn so far.
    pub fn draws(&self) -> usize {
        self.index
    }
}

impl RandomSource for ScriptedRandom {
    fn next_f64(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.index % self.values.len()];
        self.index += 1;
        value
    }
}

/// Test harness for running game scenarios.
///
/// Wraps a session with an in-memory store and a seeded random source.
pub struct TestHarness {
    pub session: GameSession,
    pub store: Arc<MemoryStore>,
}

impl TestHarness {
    /// A session on the main menu with no character and no enemy turn delay.
    pub fn new() -> Self {
        Self::with_config(GameConfig::new().with_enemy_turn_delay(Duration::ZERO))
    }

    /// A session on the main menu with a custom config.
    pub fn with_config(config: GameConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let session = GameSession::with_rng(config, store.clone(), SeededRandom::new(0));
        Self { session, store }
    }

    /// A session already in the starting dimension with a level 1 character.
    pub fn with_player(class: PlayerClass) -> Self {
        Self::new().spawn_player(class)
    }

    /// Put a level 1 character named "Test Hero" into the starting dimension.
    pub fn spawn_player(mut self, class: PlayerClass) -> Self {
        let config = self.session.config().clone();

        let mut state = GameState::new();
        state.player = Some(Player::new("Test Hero", class));
        state.current_dimension = Some(dimension::generate_dimension(
            config.starting_dimension,
            config.starting_level,
            &mut SeededRandom::new(0),
        ));
        self.session.install_state(state);
        self
    }

    /// Replace the random source with a script.
    pub fn with_draws(mut self, values: Vec<f64>) -> Self {
        self.session.set_rng(ScriptedRandom::new(values));
        self
    }

    /// Rebuild the current dimension with the given interior room types,
    /// keeping the entrance and the boss room. The player returns to room 0.
    pub fn set_interior(&mut self, interior: &[RoomType]) -> &mut Self {
        if let Some(dimension) = self.session.state_mut().current_dimension.as_mut() {
            let last = interior.len() + 1;
            let mut rooms = vec![dimension.rooms[0].clone()];
            for (offset, room_type) in interior.iter().enumerate() {
                let template = INTERIOR_ROOMS
                    .iter()
                    .find(|t| t.room_type == *room_type)
                    .unwrap_or(&INTERIOR_ROOMS[0]);
                rooms.push(Room {
                    id: offset + 1,
                    name: template.name.to_string(),
                    icon: template.icon.to_string(),
                    room_type: template.room_type,
                });
            }
            let mut boss = dimension.rooms[dimension.rooms.len() - 1].clone();
            boss.id = last;
            rooms.push(boss);

            dimension.rooms = rooms;
            dimension.current_room = 0;
            dimension.explored = [0].into_iter().collect();
        }
        self
    }

    /// Start a fight against a specific enemy.
    pub fn start_fight(&mut self, enemy: Enemy) -> Response {
        let mut response = Response::default();
        self.session.enter_combat(enemy, &mut response);
        response
    }

    /// Mutable access to the player.
    pub fn player_mut(&mut self) -> &mut Player {
        self.session
            .state_mut()
            .player
            .get_or_insert_with(Player::default)
    }

    /// Get current player HP as (current, max).
    pub fn player_hp(&self) -> (u32, u32) {
        self.session
            .player()
            .map(|p| (p.current_hp, p.max_hp()))
            .unwrap_or((0, 0))
    }

    /// Get current enemy HP as (current, max).
    pub fn enemy_hp(&self) -> Option<(u32, u32)> {
        self.session.enemy().map(|e| (e.current_hp, e.max_hp))
    }

    pub fn combat(&self) -> Option<&CombatState> {
        self.session.combat()
    }

    pub fn in_combat(&self) -> bool {
        self.session.in_combat()
    }

    /// Whether anything is stored under the session's save key.
    pub async fn has_save(&self) -> bool {
        let key = &self.session.config().save_key;
        matches!(self.store.get(key).await, Ok(Some(_)))
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Assertion Helpers
// ============================================================================

/// Assert player HP is at expected values.
#[track_caller]
pub fn assert_hp(harness: &TestHarness, current: u32, max: u32) {
    let (actual_current, actual_max) = harness.player_hp();
    assert_eq!(
        (actual_current, actual_max),
        (current, max),
        "Expected HP {current}/{max}, got {actual_current}/{actual_max}"
    );
}

/// Assert player is in combat.
#[track_caller]
pub fn assert_in_combat(harness: &TestHarness) {
    assert!(harness.in_combat(), "Expected to be in combat");
}

/// Assert player is NOT in combat.
#[track_caller]
pub fn assert_not_in_combat(harness: &TestHarness) {
    assert!(!harness.in_combat(), "Expected to NOT be in combat");
}

/// Assert the current screen.
#[track_caller]
pub fn assert_screen(harness: &TestHarness, screen: Screen) {
    assert_eq!(harness.session.screen(), screen, "Unexpected screen");
}

/// Assert the player's level.
#[track_caller]
pub fn assert_level(harness: &TestHarness, level: u32) {
    let actual = harness.session.player().map(|p| p.level);
    assert_eq!(actual, Some(level), "Expected level {level}, got {actual:?}");
}
