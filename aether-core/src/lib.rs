//! Rules engine for Aethermoor Chronicles.
//!
//! This crate provides:
//! - Character creation, stats and leveling
//! - Procedurally generated dimensions of typed rooms
//! - Turn-based combat through an Intent/Effect rules system
//! - A screen/modal state machine driving the game
//! - Save/load, export and import of the full game state
//!
//! # Quick Start
//!
//! ```ignore
//! use aether_core::{CharacterBuilder, DirectoryStore, GameConfig, GameSession, PlayerClass};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(DirectoryStore::new("saves"));
//!     let mut session = GameSession::new(GameConfig::new(), store);
//!
//!     session.new_game();
//!     session
//!         .create_character(CharacterBuilder::new().name("Nyx").class(PlayerClass::Voidwalker))
//!         .await?;
//!
//!     let response = session.explore()?;
//!     for line in response.notifications.iter().chain(&response.log) {
//!         println!("{line}");
//!     }
//!
//!     session.save_game().await?;
//!     Ok(())
//! }
//! ```

pub mod autosave;
pub mod bestiary;
pub mod character_builder;
pub mod class_data;
pub mod combat;
pub mod dice;
pub mod dimension;
pub mod items;
pub mod persist;
pub mod progression;
pub mod rules;
pub mod session;
pub mod testing;
pub mod world;

// Primary public API
pub use autosave::spawn_autosave;
pub use character_builder::{BuilderError, CharacterBuilder};
pub use combat::{CombatOutcome, CombatPhase, CombatState};
pub use dice::{RandomSource, SeededRandom, ThreadRandom};
pub use persist::{DirectoryStore, MemoryStore, PersistError, SaveStore};
pub use rules::{CombatAbility, Effect};
pub use session::{
    GameConfig, GameSession, GameView, Modal, Response, Screen, SessionError, ValidationError,
};
pub use testing::{ScriptedRandom, TestHarness};
pub use world::{GameState, Player, PlayerClass, Stat};
