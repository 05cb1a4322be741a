//! Combat encounter state.
//!
//! A `CombatState` exists only while a fight is running. The phase moves
//! `Idle → InCombat → {Victory | Defeat | Fled} → Idle`; the terminal phases
//! are recorded as the encounter's outcome and the session drops the state
//! once rewards or penalties are applied.

use crate::world::Enemy;
use serde::{Deserialize, Serialize};

/// Where the combat state machine currently is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatPhase {
    #[default]
    Idle,
    InCombat,
    Victory,
    Defeat,
    Fled,
}

/// How an encounter ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatOutcome {
    Victory,
    Defeat,
    Fled,
}

impl From<CombatOutcome> for CombatPhase {
    fn from(outcome: CombatOutcome) -> Self {
        match outcome {
            CombatOutcome::Victory => CombatPhase::Victory,
            CombatOutcome::Defeat => CombatPhase::Defeat,
            CombatOutcome::Fled => CombatPhase::Fled,
        }
    }
}

/// A running fight against a single enemy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatState {
    pub enemy: Enemy,
    pub round: u32,
    pub log: Vec<String>,
    pub outcome: Option<CombatOutcome>,
    /// Set after a player action that did not end the fight; cleared by the
    /// enemy's turn. No player action is accepted while it is set.
    pub awaiting_enemy_turn: bool,
}

impl CombatState {
    pub fn new(enemy: Enemy) -> Self {
        let log = vec![format!("{} appears!", enemy.name)];
        Self {
            enemy,
            round: 1,
            log,
            outcome: None,
            awaiting_enemy_turn: false,
        }
    }

    pub fn phase(&self) -> CombatPhase {
        self.outcome.map(CombatPhase::from).unwrap_or(CombatPhase::InCombat)
    }

    /// Record an outcome. The first outcome wins.
    pub fn conclude(&mut self, outcome: CombatOutcome) {
        if self.outcome.is_none() {
            self.outcome = Some(outcome);
            self.awaiting_enemy_turn = false;
        }
    }

    pub fn add_log(&mut self, lines: impl IntoIterator<Item = String>) {
        self.log.extend(lines);
    }

    /// Enemy HP as a fraction of max, for health bars.
    pub fn enemy_hp_ratio(&self) -> f32 {
        if self.enemy.max_hp == 0 {
            return 0.0;
        }
        self.enemy.current_hp as f32 / self.enemy.max_hp as f32
    }
}
