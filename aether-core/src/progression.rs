//! Leveling and stat progression.
//!
//! HP formula, the XP curve and skill point spending.

use crate::world::{Player, PlayerClass, Stat, StatBlock};
use thiserror::Error;

/// XP required to go from level 1 to level 2.
pub const INITIAL_XP_TO_NEXT: u32 = 100;

/// Skill points granted per level gained.
pub const SKILL_POINTS_PER_LEVEL: u32 = 3;

/// Unspent skill points on a freshly created character.
pub const STARTING_SKILL_POINTS: u32 = 3;

/// Errors from spending skill points.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgressionError {
    #[error("No skill points left to spend")]
    NoSkillPoints,
}

/// Base stats for a class.
pub fn create_stats(class: PlayerClass) -> StatBlock {
    class.data().base_stats
}

/// `100 + strength * 5 + level * 10`.
pub fn max_hp(level: u32, strength: u32) -> u32 {
    100u32
        .saturating_add(strength.saturating_mul(5))
        .saturating_add(level.saturating_mul(10))
}

/// The next XP threshold: `floor(current * 1.2)` in integer arithmetic.
///
/// Always grows by at least one so the leveling loop terminates.
pub fn next_xp_threshold(current: u32) -> u32 {
    (current.saturating_mul(6) / 5).max(current.saturating_add(1))
}

/// Outcome of a prospective XP grant, without mutating the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XpOutcome {
    pub level: u32,
    pub xp: u32,
    pub xp_to_next: u32,
    pub levels_gained: u32,
}

/// Compute where an XP grant would leave the player.
pub fn preview_xp(player: &Player, amount: u32) -> XpOutcome {
    let mut outcome = XpOutcome {
        level: player.level,
        xp: player.xp.saturating_add(amount),
        xp_to_next: player.xp_to_next.max(1),
        levels_gained: 0,
    };

    while outcome.xp >= outcome.xp_to_next {
        outcome.xp -= outcome.xp_to_next;
        outcome.level = outcome.level.saturating_add(1);
        outcome.levels_gained += 1;
        outcome.xp_to_next = next_xp_threshold(outcome.xp_to_next).max(1);
    }

    outcome
}

/// Grant XP, leveling up as many times as the total allows.
///
/// Each level adds skill points; any level gained fully heals the player.
/// Returns the number of levels gained.
pub fn apply_xp(player: &mut Player, amount: u32) -> u32 {
    let outcome = preview_xp(player, amount);

    player.xp = outcome.xp;
    player.level = outcome.level;
    player.xp_to_next = outcome.xp_to_next;

    if outcome.levels_gained > 0 {
        player.skill_points = player
            .skill_points
            .saturating_add(outcome.levels_gained.saturating_mul(SKILL_POINTS_PER_LEVEL));
        player.restore_full();
        tracing::info!(
            player = %player.name,
            level = player.level,
            levels_gained = outcome.levels_gained,
            "level up"
        );
    }

    outcome.levels_gained
}

/// Spend one skill point on a stat. Returns the stat's new value.
///
/// Current HP is left alone; a strength increase only raises the ceiling.
pub fn upgrade_stat(player: &mut Player, stat: Stat) -> Result<u32, ProgressionError> {
    if player.skill_points == 0 {
        return Err(ProgressionError::NoSkillPoints);
    }

    player.skill_points -= 1;
    let value = player.stats.get_mut(stat);
    *value = value.saturating_add(1);
    Ok(*value)
}
