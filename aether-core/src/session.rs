//! GameSession - the primary public API for Aethermoor gameplay.
//!
//! The session owns the live `GameState`, the running combat (if any), the
//! screen/modal state machine and the collaborators: a random source and a
//! save store. Every command validates against the current mode, resolves
//! through the rules engine and returns a `Response` describing what
//! happened. A refused command leaves the state untouched.

use crate::bestiary::{self, EnemyKind};
use crate::character_builder::{BuilderError, CharacterBuilder};
use crate::combat::{CombatOutcome, CombatPhase, CombatState};
use crate::dice::{RandomSource, ThreadRandom};
use crate::dimension::{self, NavigationError, STARTING_DIMENSION};
use crate::persist::{self, PersistError, SaveExport, SaveStore, SAVE_KEY};
use crate::progression::{self, ProgressionError};
use crate::rules::{apply_effects, CombatAbility, Effect, Intent, Resolution, RulesEngine};
use crate::world::{
    Dimension, Enemy, GameState, Player, Room, RoomType, Settings, Stat, MAX_VOLUME,
};
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Delay between the player's action and the enemy's reply.
pub const DEFAULT_ENEMY_TURN_DELAY: Duration = Duration::from_millis(1000);

/// Interval between automatic saves.
pub const DEFAULT_AUTOSAVE_INTERVAL: Duration = Duration::from_secs(30);

/// A command that is not allowed in the current mode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0}")]
    Character(#[from] BuilderError),

    #[error("{0}")]
    Navigation(#[from] NavigationError),

    #[error("{0}")]
    Progression(#[from] ProgressionError),

    #[error("No game in progress")]
    NoActiveGame,

    #[error("Not possible during combat!")]
    InCombat,

    #[error("You are not in combat")]
    NotInCombat,

    #[error("Wait for the enemy to act")]
    AwaitingEnemyTurn,

    #[error("The enemy has no turn pending")]
    NoEnemyTurnPending,

    #[error("Unknown stat: {0}")]
    UnknownStat(String),
}

/// Errors from GameSession operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Persistence error: {0}")]
    Persist(#[from] PersistError),
}

/// Configuration for creating a new game session.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Store key the game is saved under.
    pub save_key: String,

    /// Pause between the player's action and the enemy's turn in `take_turn`.
    pub enemy_turn_delay: Duration,

    /// Tick interval of the auto-save task.
    pub autosave_interval: Duration,

    /// Name of the first dimension a new character enters.
    pub starting_dimension: String,

    /// Level of the first dimension.
    pub starting_level: u32,
}

impl GameConfig {
    pub fn new() -> Self {
        Self {
            save_key: SAVE_KEY.to_string(),
            enemy_turn_delay: DEFAULT_ENEMY_TURN_DELAY,
            autosave_interval: DEFAULT_AUTOSAVE_INTERVAL,
            starting_dimension: STARTING_DIMENSION.to_string(),
            starting_level: 1,
        }
    }

    /// Set the store key.
    pub fn with_save_key(mut self, key: impl Into<String>) -> Self {
        self.save_key = key.into();
        self
    }

    /// Set the enemy turn delay. Zero disables the pause.
    pub fn with_enemy_turn_delay(mut self, delay: Duration) -> Self {
        self.enemy_turn_delay = delay;
        self
    }

    /// Set the auto-save interval.
    pub fn with_autosave_interval(mut self, interval: Duration) -> Self {
        self.autosave_interval = interval;
        self
    }

    /// Set the first dimension's name.
    pub fn with_starting_dimension(mut self, name: impl Into<String>) -> Self {
        self.starting_dimension = name.into();
        self
    }

    /// Set the first dimension's level (at least 1).
    pub fn with_starting_level(mut self, level: u32) -> Self {
        self.starting_level = level.max(1);
        self
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Screens and modals
// ============================================================================

/// Views inside the game screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameView {
    Exploration,
    Combat,
    Inventory,
}

/// Top-level screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    MainMenu,
    CharacterCreation,
    Game(GameView),
}

/// Overlays shown on top of a screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modal {
    Settings,
    LevelUp,
}

/// Signalled when a victory raised the player's level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelUp {
    pub levels_gained: u32,
    pub new_level: u32,
    pub skill_points: u32,
}

/// What a command did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
    /// Short player-facing messages.
    pub notifications: Vec<String>,

    /// Effects that were applied to the game state.
    pub effects: Vec<Effect>,

    /// Combat log lines produced by this command.
    pub log: Vec<String>,

    /// The room entered, for movement commands.
    pub room: Option<Room>,

    /// Combat phase after the command. A finished fight reports its
    /// terminal phase here; the session itself is back to `Idle`.
    pub combat_phase: CombatPhase,

    /// Set when the command raised the player's level.
    pub level_up: Option<LevelUp>,

    /// True when the enemy's turn must run before the next action.
    pub awaiting_enemy_turn: bool,
}

impl Response {
    fn notify(&mut self, message: impl Into<String>) {
        self.notifications.push(message.into());
    }

    fn absorb_combat(&mut self, resolution: Resolution) {
        self.log.extend(resolution.log);
        self.effects.extend(resolution.effects);
    }

    fn absorb_event(&mut self, resolution: Resolution) {
        self.notifications.extend(resolution.log);
        self.effects.extend(resolution.effects);
    }

    fn merge(&mut self, other: Response) {
        self.notifications.extend(other.notifications);
        self.effects.extend(other.effects);
        self.log.extend(other.log);
        self.room = other.room.or(self.room.take());
        self.combat_phase = other.combat_phase;
        self.level_up = other.level_up.or(self.level_up);
        self.awaiting_enemy_turn = other.awaiting_enemy_turn;
    }
}

// ============================================================================
// Session
// ============================================================================

/// An Aethermoor game session.
///
/// Owns exactly one live `GameState`. Share it with the auto-save task as
/// `Arc<tokio::sync::Mutex<GameSession>>`.
pub struct GameSession {
    config: GameConfig,
    state: GameState,
    combat: Option<CombatState>,
    screen: Screen,
    modal: Option<Modal>,
    pending_level_up: Option<LevelUp>,
    rules: RulesEngine,
    rng: Box<dyn RandomSource + Send>,
    store: Arc<dyn SaveStore>,
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("combat", &self.combat)
            .field("screen", &self.screen)
            .field("modal", &self.modal)
            .finish_non_exhaustive()
    }
}

impl GameSession {
    /// Create a session on the main menu using OS randomness.
    pub fn new(config: GameConfig, store: Arc<dyn SaveStore>) -> Self {
        Self::with_rng(config, store, ThreadRandom)
    }

    /// Create a session with an explicit random source.
    pub fn with_rng(
        config: GameConfig,
        store: Arc<dyn SaveStore>,
        rng: impl RandomSource + Send + 'static,
    ) -> Self {
        Self {
            config,
            state: GameState::new(),
            combat: None,
            screen: Screen::MainMenu,
            modal: None,
            pending_level_up: None,
            rules: RulesEngine::new(),
            rng: Box::new(rng),
            store,
        }
    }

    // ------------------------------------------------------------------
    // Navigation between screens
    // ------------------------------------------------------------------

    /// Main menu "New Game": open character creation.
    pub fn new_game(&mut self) {
        self.screen = Screen::CharacterCreation;
    }

    /// Return to the main menu. Refused while a fight is running.
    pub fn back_to_menu(&mut self) -> Result<(), ValidationError> {
        self.ensure_not_in_combat()?;
        self.screen = Screen::MainMenu;
        self.modal = None;
        Ok(())
    }

    /// Switch between the views of the game screen.
    pub fn switch_view(&mut self, view: GameView) -> Result<(), ValidationError> {
        self.ensure_active_game()?;
        if view == GameView::Combat && self.combat.is_none() {
            return Err(ValidationError::NotInCombat);
        }
        self.screen = Screen::Game(view);
        Ok(())
    }

    pub fn open_settings(&mut self) {
        self.modal = Some(Modal::Settings);
    }

    pub fn close_settings(&mut self) {
        if self.modal == Some(Modal::Settings) {
            self.modal = None;
        }
    }

    // ------------------------------------------------------------------
    // Character creation
    // ------------------------------------------------------------------

    /// Create the character, enter the starting dimension and save.
    pub async fn create_character(
        &mut self,
        builder: CharacterBuilder,
    ) -> Result<Response, SessionError> {
        let player = builder.build().map_err(ValidationError::from)?;
        let dimension = dimension::generate_dimension(
            self.config.starting_dimension.clone(),
            self.config.starting_level,
            self.rng.as_mut(),
        );

        tracing::info!(
            player = %player.name,
            class = player.class.id(),
            dimension = %dimension.name,
            "character created"
        );

        let mut response = Response::default();
        response.notify(format!(
            "{} {} enters {}",
            player.class_icon(),
            player.name,
            dimension.name
        ));
        response.room = dimension.current().cloned();

        self.state.player = Some(player);
        self.state.current_dimension = Some(dimension);
        self.combat = None;
        self.pending_level_up = None;
        self.modal = None;
        self.screen = Screen::Game(GameView::Exploration);

        self.save_quietly().await;
        Ok(response)
    }

    // ------------------------------------------------------------------
    // Exploration
    // ------------------------------------------------------------------

    /// Step one room forward and trigger that room's encounter.
    pub fn explore(&mut self) -> Result<Response, ValidationError> {
        self.ensure_active_game()?;
        self.ensure_not_in_combat()?;

        let dimension = self
            .state
            .current_dimension
            .as_mut()
            .ok_or(ValidationError::NoActiveGame)?;

        let mut response = Response::default();
        match dimension::explore(dimension) {
            Some(room) => {
                tracing::debug!(room = room.id, stability = dimension.stability, "explored");
                self.dispatch_room(&room, &mut response);
                response.room = Some(room);
            }
            None => response.notify("You have reached the end of this dimension!"),
        }
        Ok(response)
    }

    /// Move to an adjacent room. Hostile and treasure rooms trigger their encounter.
    pub fn enter_room(&mut self, room_id: usize) -> Result<Response, ValidationError> {
        self.ensure_active_game()?;
        self.ensure_not_in_combat()?;

        let dimension = self
            .state
            .current_dimension
            .as_mut()
            .ok_or(ValidationError::NoActiveGame)?;
        let room = dimension::enter_room(dimension, room_id)?;
        tracing::debug!(room = room.id, "entered room");

        let mut response = Response::default();
        // Special events only fire when exploring forward
        if room.room_type != RoomType::Special {
            self.dispatch_room(&room, &mut response);
        }
        response.room = Some(room);
        Ok(response)
    }

    /// Recover 30% of max HP. Not allowed during combat.
    pub fn rest(&mut self) -> Result<Response, ValidationError> {
        self.ensure_active_game()?;
        self.ensure_not_in_combat()?;
        Ok(self.resolve_event(Intent::Rest))
    }

    /// Leave for a fresh dimension one level deeper.
    pub fn dimension_shift(&mut self) -> Result<Response, ValidationError> {
        self.ensure_active_game()?;
        self.ensure_not_in_combat()?;

        let current = self
            .state
            .current_dimension
            .as_ref()
            .ok_or(ValidationError::NoActiveGame)?;
        let next = dimension::shift(current, self.rng.as_mut());

        tracing::info!(dimension = %next.name, level = next.level, "dimension shift");

        let mut response = Response::default();
        response.notify(format!("You enter a new dimension: {}", next.name));
        response.room = next.current().cloned();
        self.state.current_dimension = Some(next);
        Ok(response)
    }

    fn dispatch_room(&mut self, room: &Room, response: &mut Response) {
        match room.room_type {
            hostile if hostile.is_hostile() => {
                if let Some(kind) = EnemyKind::for_room(hostile) {
                    self.start_combat(kind, response);
                }
            }
            RoomType::Treasure => response.merge(self.resolve_event(Intent::OpenTreasure)),
            RoomType::Special => response.merge(self.resolve_event(Intent::TriggerSpecialEvent)),
            _ => {}
        }
    }

    fn resolve_event(&mut self, intent: Intent) -> Response {
        let mut response = Response::default();
        let Some(player) = self.state.player.as_mut() else {
            return response;
        };

        let resolution = self.rules.resolve(player, None, intent, self.rng.as_mut());
        apply_effects(player, None, &resolution.effects);
        response.absorb_event(resolution);
        response
    }

    // ------------------------------------------------------------------
    // Combat
    // ------------------------------------------------------------------

    fn start_combat(&mut self, kind: EnemyKind, response: &mut Response) {
        let level = self
            .state
            .current_dimension
            .as_ref()
            .map(|d| d.level)
            .unwrap_or(1);
        let enemy = bestiary::spawn(kind, level, self.rng.as_mut());
        tracing::debug!(?kind, "spawned enemy");
        self.enter_combat(enemy, response);
    }

    pub(crate) fn enter_combat(&mut self, enemy: Enemy, response: &mut Response) {
        tracing::info!(enemy = %enemy.name, level = enemy.level, "combat started");

        let combat = CombatState::new(enemy);
        response.log.extend(combat.log.iter().cloned());
        response.combat_phase = CombatPhase::InCombat;
        self.combat = Some(combat);
        self.screen = Screen::Game(GameView::Combat);
    }

    /// The player's half of a combat round.
    ///
    /// A killing blow ends the fight immediately and the enemy does not act.
    /// Otherwise the enemy's turn becomes pending; run it with `enemy_turn`.
    pub fn use_ability(&mut self, ability: CombatAbility) -> Result<Response, ValidationError> {
        self.ensure_active_game()?;
        match &self.combat {
            None => return Err(ValidationError::NotInCombat),
            Some(combat) if combat.awaiting_enemy_turn => {
                return Err(ValidationError::AwaitingEnemyTurn)
            }
            Some(_) => {}
        }

        let (Some(player), Some(mut combat)) = (self.state.player.as_mut(), self.combat.take())
        else {
            return Err(ValidationError::NoActiveGame);
        };

        let mut response = Response::default();
        let resolution = self.rules.resolve(
            player,
            Some(&combat.enemy),
            Intent::UseAbility(ability),
            self.rng.as_mut(),
        );
        tracing::debug!(%ability, round = combat.round, "player turn");
        apply_effects(player, Some(&mut combat), &resolution.effects);
        combat.add_log(resolution.log.iter().cloned());
        response.absorb_combat(resolution);

        if combat.outcome == Some(CombatOutcome::Victory) {
            let reward = self.rules.resolve(
                player,
                Some(&combat.enemy),
                Intent::ClaimVictory,
                self.rng.as_mut(),
            );
            let levels_gained = reward.levels_gained();
            apply_effects(player, Some(&mut combat), &reward.effects);
            combat.add_log(reward.log.iter().cloned());
            response.absorb_combat(reward);

            if levels_gained > 0 {
                let level_up = LevelUp {
                    levels_gained,
                    new_level: player.level,
                    skill_points: player.skill_points,
                };
                response.level_up = Some(level_up);
                self.pending_level_up = Some(level_up);
                self.modal = Some(Modal::LevelUp);
            }
        }

        match combat.outcome {
            Some(outcome) => self.end_combat(combat, outcome, &mut response),
            None => {
                combat.awaiting_enemy_turn = true;
                response.combat_phase = combat.phase();
                response.awaiting_enemy_turn = true;
                self.combat = Some(combat);
            }
        }
        Ok(response)
    }

    /// Parse an ability name and use it. Unknown names act as defend.
    pub fn use_ability_named(&mut self, ability: &str) -> Result<Response, ValidationError> {
        self.use_ability(CombatAbility::from_name(ability))
    }

    /// The enemy's half of a combat round.
    pub fn enemy_turn(&mut self) -> Result<Response, ValidationError> {
        match &self.combat {
            Some(combat) if combat.awaiting_enemy_turn => {}
            Some(_) => return Err(ValidationError::NoEnemyTurnPending),
            None => return Err(ValidationError::NotInCombat),
        }
        let (Some(player), Some(mut combat)) = (self.state.player.as_mut(), self.combat.take())
        else {
            return Err(ValidationError::NoActiveGame);
        };

        let mut response = Response::default();
        let resolution =
            self.rules
                .resolve(player, Some(&combat.enemy), Intent::EnemyAttack, self.rng.as_mut());
        tracing::debug!(enemy = %combat.enemy.name, round = combat.round, "enemy turn");
        apply_effects(player, Some(&mut combat), &resolution.effects);
        combat.add_log(resolution.log.iter().cloned());
        response.absorb_combat(resolution);

        if combat.outcome == Some(CombatOutcome::Defeat) {
            let respawn = self.rules.resolve(
                player,
                Some(&combat.enemy),
                Intent::SufferDefeat,
                self.rng.as_mut(),
            );
            apply_effects(player, None, &respawn.effects);
            response.absorb_event(respawn);
        }

        match combat.outcome {
            Some(outcome) => self.end_combat(combat, outcome, &mut response),
            None => {
                combat.awaiting_enemy_turn = false;
                combat.round += 1;
                response.combat_phase = combat.phase();
                self.combat = Some(combat);
            }
        }
        Ok(response)
    }

    /// A full round: the player's action, the configured pause, then the
    /// enemy's turn if the fight is still on.
    pub async fn take_turn(&mut self, ability: CombatAbility) -> Result<Response, ValidationError> {
        let mut response = self.use_ability(ability)?;
        if response.awaiting_enemy_turn {
            if !self.config.enemy_turn_delay.is_zero() {
                tokio::time::sleep(self.config.enemy_turn_delay).await;
            }
            let enemy = self.enemy_turn()?;
            response.merge(enemy);
        }
        Ok(response)
    }

    fn end_combat(&mut self, combat: CombatState, outcome: CombatOutcome, response: &mut Response) {
        tracing::info!(
            enemy = %combat.enemy.name,
            ?outcome,
            rounds = combat.round,
            "combat ended"
        );
        response.combat_phase = outcome.into();
        response.awaiting_enemy_turn = false;
        self.combat = None;
        self.screen = Screen::Game(GameView::Exploration);
    }

    // ------------------------------------------------------------------
    // Progression
    // ------------------------------------------------------------------

    /// Spend one skill point on `stat`.
    pub fn upgrade_stat(&mut self, stat: Stat) -> Result<Response, ValidationError> {
        let player = self
            .state
            .player
            .as_mut()
            .ok_or(ValidationError::NoActiveGame)?;
        let value = progression::upgrade_stat(player, stat)?;
        tracing::debug!(%stat, value, skill_points = player.skill_points, "stat upgraded");

        if let Some(level_up) = self.pending_level_up.as_mut() {
            level_up.skill_points = player.skill_points;
        }

        let mut response = Response::default();
        response.notify(format!("{stat} increased to {value}"));
        Ok(response)
    }

    /// Parse a stat name and upgrade it.
    pub fn upgrade_stat_named(&mut self, stat: &str) -> Result<Response, ValidationError> {
        let stat = stat.parse::<Stat>().map_err(ValidationError::UnknownStat)?;
        self.upgrade_stat(stat)
    }

    /// Close the level-up modal and save.
    pub async fn confirm_level_up(&mut self) -> Response {
        if self.modal == Some(Modal::LevelUp) {
            self.modal = None;
        }
        self.pending_level_up = None;
        self.save_quietly().await;
        Response::default()
    }

    // ------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------

    /// Set the music volume, clamped to `0..=100`.
    pub fn set_music_volume(&mut self, volume: u32) {
        self.state.settings.music_volume = clamp_volume(volume);
    }

    /// Set the effects volume, clamped to `0..=100`.
    pub fn set_sfx_volume(&mut self, volume: u32) {
        self.state.settings.sfx_volume = clamp_volume(volume);
    }

    pub fn set_auto_save(&mut self, enabled: bool) {
        self.state.settings.auto_save = enabled;
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Serialize the full state to the save store.
    pub async fn save_game(&mut self) -> Result<Response, SessionError> {
        self.state.touch();
        let blob = persist::serialize(&self.state)?;
        self.store.set(&self.config.save_key, &blob).await?;
        tracing::info!(key = %self.config.save_key, bytes = blob.len(), "game saved");

        let mut response = Response::default();
        response.notify("Game saved!");
        Ok(response)
    }

    async fn save_quietly(&mut self) {
        if let Err(e) = self.save_game().await {
            tracing::error!(error = %e, "failed to save game");
        }
    }

    /// Load the saved game, replacing the live state.
    ///
    /// A missing save is not an error. A save that cannot be decoded leaves
    /// the live state untouched and returns the error.
    pub async fn load_game(&mut self) -> Result<Response, SessionError> {
        let mut response = Response::default();
        let Some(blob) = self.store.get(&self.config.save_key).await? else {
            response.notify("No save found!");
            return Ok(response);
        };

        let (state, report) = persist::deserialize_with_report(&blob).map_err(|e| {
            tracing::warn!(error = %e, "failed to load save");
            e
        })?;
        if !report.is_clean() {
            response.notify(format!(
                "Ignored {} unrecognised field(s)",
                report.unknown_fields.len()
            ));
        }

        self.install_state(state);
        tracing::info!(key = %self.config.save_key, "game loaded");
        response.notify("Game loaded!");
        Ok(response)
    }

    /// Render the state as a downloadable file dated `date`.
    pub fn export_save_on(&self, date: NaiveDate) -> Result<SaveExport, SessionError> {
        Ok(persist::export(&self.state, date)?)
    }

    /// Render the state as a downloadable file dated today (UTC).
    pub fn export_save(&self) -> Result<SaveExport, SessionError> {
        self.export_save_on(chrono::Utc::now().date_naive())
    }

    /// Replace the live state with an imported file.
    pub fn import_save(&mut self, contents: &str) -> Result<Response, SessionError> {
        let (state, report) = persist::import(contents).map_err(|e| {
            tracing::warn!(error = %e, "invalid save file");
            e
        })?;

        let mut response = Response::default();
        if !report.is_clean() {
            response.notify(format!(
                "Ignored {} unrecognised field(s)",
                report.unknown_fields.len()
            ));
        }
        self.install_state(state);
        tracing::info!("save imported");
        response.notify("Save imported!");
        Ok(response)
    }

    /// Save if auto-save is on and a character exists. Returns whether it saved.
    pub async fn autosave_tick(&mut self) -> Result<bool, SessionError> {
        if !self.state.settings.auto_save || self.state.player.is_none() {
            return Ok(false);
        }
        self.save_game().await?;
        Ok(true)
    }

    pub(crate) fn install_state(&mut self, state: GameState) {
        self.state = state;
        self.combat = None;
        self.pending_level_up = None;
        self.modal = None;
        self.screen = if self.state.player.is_some() && self.state.current_dimension.is_some() {
            Screen::Game(GameView::Exploration)
        } else {
            Screen::MainMenu
        };
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn player(&self) -> Option<&Player> {
        self.state.player.as_ref()
    }

    pub fn dimension(&self) -> Option<&Dimension> {
        self.state.current_dimension.as_ref()
    }

    pub fn combat(&self) -> Option<&CombatState> {
        self.combat.as_ref()
    }

    pub fn enemy(&self) -> Option<&Enemy> {
        self.combat.as_ref().map(|c| &c.enemy)
    }

    /// `InCombat` while a fight runs, `Idle` otherwise.
    pub fn combat_phase(&self) -> CombatPhase {
        self.combat
            .as_ref()
            .map(CombatState::phase)
            .unwrap_or(CombatPhase::Idle)
    }

    pub fn combat_log(&self) -> &[String] {
        self.combat.as_ref().map(|c| c.log.as_slice()).unwrap_or(&[])
    }

    pub fn in_combat(&self) -> bool {
        self.combat.is_some()
    }

    pub fn is_awaiting_enemy_turn(&self) -> bool {
        self.combat
            .as_ref()
            .is_some_and(|c| c.awaiting_enemy_turn)
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn modal(&self) -> Option<Modal> {
        self.modal
    }

    pub fn pending_level_up(&self) -> Option<LevelUp> {
        self.pending_level_up
    }

    pub fn settings(&self) -> &Settings {
        &self.state.settings
    }

    pub(crate) fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub(crate) fn set_rng(&mut self, rng: impl RandomSource + Send + 'static) {
        self.rng = Box::new(rng);
    }

    fn ensure_active_game(&self) -> Result<(), ValidationError> {
        if self.state.player.is_none() || self.state.current_dimension.is_none() {
            return Err(ValidationError::NoActiveGame);
        }
        Ok(())
    }

    fn ensure_not_in_combat(&self) -> Result<(), ValidationError> {
        if self.combat.is_some() {
            return Err(ValidationError::InCombat);
        }
        Ok(())
    }
}

fn clamp_volume(volume: u32) -> u8 {
    u8::try_from(volume).unwrap_or(u8::MAX).min(MAX_VOLUME)
}
