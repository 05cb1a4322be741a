//! Aethermoor rules engine with an Intent/Effect pipeline.
//!
//! 1. The session turns a player command into an `Intent`
//! 2. `RulesEngine` resolves the intent against the current state
//! 3. The resolution lists `Effect`s describing the state changes
//! 4. `apply_effects` applies them to the player and the running combat
//!
//! Resolution only reads state and draws randomness, so every rule can be
//! tested by inspecting effects before anything is mutated.

use crate::combat::{CombatOutcome, CombatState};
use crate::dice::RandomSource;
use crate::items;
use crate::progression;
use crate::world::{Enemy, Item, Player};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Base damage of a plain attack, before strength.
pub const ATTACK_BASE: u32 = 15;

/// Base damage of the special ability, before intelligence and the multiplier.
pub const SPECIAL_BASE: u32 = 20;

/// Probability that an escape attempt succeeds.
pub const ESCAPE_CHANCE: f64 = 0.7;

/// Share of max HP restored by resting, in percent.
pub const REST_HEAL_PERCENT: u32 = 30;

/// Player combat actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CombatAbility {
    Attack,
    Special,
    Defend,
    Escape,
}

impl CombatAbility {
    /// Parse an ability name. Unknown names act as `Defend`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "attack" => CombatAbility::Attack,
            "special" => CombatAbility::Special,
            "escape" => CombatAbility::Escape,
            "defend" => CombatAbility::Defend,
            other => {
                tracing::debug!(ability = other, "unknown ability, treating as defend");
                CombatAbility::Defend
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CombatAbility::Attack => "attack",
            CombatAbility::Special => "special",
            CombatAbility::Defend => "defend",
            CombatAbility::Escape => "escape",
        }
    }
}

impl fmt::Display for CombatAbility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Special room events, drawn with equal weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpecialEvent {
    /// Full heal.
    AetherPool,
    /// Bonus resources.
    DimensionalPortal,
    /// A memento is recorded on the player.
    MementoFragment,
}

impl SpecialEvent {
    pub const ALL: [SpecialEvent; 3] = [
        SpecialEvent::AetherPool,
        SpecialEvent::DimensionalPortal,
        SpecialEvent::MementoFragment,
    ];

    pub fn description(&self) -> &'static str {
        match self {
            SpecialEvent::AetherPool => "You find an aether pool and regenerate completely!",
            SpecialEvent::DimensionalPortal => "A dimensional portal grants you extra resources!",
            SpecialEvent::MementoFragment => "You discover an ancient memento fragment!",
        }
    }
}

/// What a command wants to happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    /// The player's half of a combat round.
    UseAbility(CombatAbility),
    /// The enemy's half of a combat round.
    EnemyAttack,
    /// Rewards after the enemy reached 0 HP.
    ClaimVictory,
    /// Soft respawn after the player reached 0 HP.
    SufferDefeat,
    /// Recover part of max HP outside combat.
    Rest,
    /// Treasure room reward.
    OpenTreasure,
    /// Special room event.
    TriggerSpecialEvent,
}

/// The result of resolving an intent.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub effects: Vec<Effect>,
    /// Human-readable lines for the combat log or notifications.
    pub log: Vec<String>,
}

impl Resolution {
    pub fn new(line: impl Into<String>) -> Self {
        Self {
            effects: Vec::new(),
            log: vec![line.into()],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }

    pub fn with_line(mut self, line: impl Into<String>) -> Self {
        self.log.push(line.into());
        self
    }

    pub fn levels_gained(&self) -> u32 {
        self.effects
            .iter()
            .map(|effect| match effect {
                Effect::ExperienceGained { levels_gained, .. } => *levels_gained,
                _ => 0,
            })
            .sum()
    }
}

/// Concrete state changes produced by the rules engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    /// The enemy took damage.
    EnemyDamaged {
        amount: u32,
        remaining_hp: u32,
        defeated: bool,
    },

    /// The player took damage.
    PlayerDamaged {
        amount: u32,
        remaining_hp: u32,
        defeated: bool,
    },

    /// The player braced. No mechanical effect.
    Defended,

    /// An escape was attempted.
    EscapeAttempted { success: bool },

    /// XP was granted.
    ExperienceGained {
        amount: u32,
        new_level: u32,
        levels_gained: u32,
    },

    /// An item was added to the inventory.
    ItemAcquired { item: Item },

    /// Resource counters increased.
    ResourcesGained {
        aether_essence: u32,
        dimensional_fragments: u32,
    },

    /// HP was restored.
    HpRestored { amount: u32, new_current: u32 },

    /// HP was reset after a defeat.
    Respawned { hp: u32 },

    /// A memento was recorded.
    MementoFound { name: String },
}

/// The rules engine resolves intents into effects.
#[derive(Debug, Default, Clone, Copy)]
pub struct RulesEngine;

impl RulesEngine {
    pub fn new() -> Self {
        Self
    }

    /// Resolve an intent and produce effects.
    pub fn resolve(
        &self,
        player: &Player,
        enemy: Option<&Enemy>,
        intent: Intent,
        rng: &mut dyn RandomSource,
    ) -> Resolution {
        match (intent, enemy) {
            (Intent::UseAbility(ability), Some(enemy)) => {
                self.resolve_ability(player, enemy, ability, rng)
            }
            (Intent::EnemyAttack, Some(enemy)) => self.resolve_enemy_attack(player, enemy),
            (Intent::ClaimVictory, Some(enemy)) => self.resolve_victory(player, enemy, rng),
            (Intent::UseAbility(_) | Intent::EnemyAttack | Intent::ClaimVictory, None) => {
                Resolution::new("There is nothing to fight here.")
            }
            (Intent::SufferDefeat, _) => self.resolve_defeat(player),
            (Intent::Rest, _) => self.resolve_rest(player),
            (Intent::OpenTreasure, _) => self.resolve_treasure(rng),
            (Intent::TriggerSpecialEvent, _) => self.resolve_special_event(player, rng),
        }
    }

    /// Damage a player ability deals. Zero for non-damaging abilities.
    pub fn ability_damage(&self, player: &Player, ability: CombatAbility) -> u32 {
        match ability {
            CombatAbility::Attack => ATTACK_BASE.saturating_add(player.stats.strength),
            CombatAbility::Special => {
                let base = u64::from(SPECIAL_BASE.saturating_add(player.stats.intelligence));
                u32::try_from(base * 3 / 2).unwrap_or(u32::MAX)
            }
            CombatAbility::Defend | CombatAbility::Escape => 0,
        }
    }

    /// Damage an enemy deals to the player: `max(1, attack - floor(str / 3))`.
    ///
    /// Enemy defense plays no part in either direction.
    pub fn enemy_damage(&self, player: &Player, enemy: &Enemy) -> u32 {
        enemy
            .attack
            .saturating_sub(player.stats.strength / 3)
            .max(1)
    }

    fn resolve_ability(
        &self,
        player: &Player,
        enemy: &Enemy,
        ability: CombatAbility,
        rng: &mut dyn RandomSource,
    ) -> Resolution {
        let resolution = match ability {
            CombatAbility::Attack => {
                let damage = self.ability_damage(player, ability);
                Resolution::new(format!("You attack for {damage} damage!"))
                    .with_effect(damage_enemy(enemy, damage))
            }
            CombatAbility::Special => {
                let damage = self.ability_damage(player, ability);
                Resolution::new(format!("You unleash your special ability for {damage} damage!"))
                    .with_effect(damage_enemy(enemy, damage))
            }
            CombatAbility::Defend => {
                Resolution::new("You take a defensive stance!").with_effect(Effect::Defended)
            }
            CombatAbility::Escape => {
                let success = rng.chance(ESCAPE_CHANCE);
                let line = if success {
                    "Escape successful!"
                } else {
                    "Escape failed!"
                };
                Resolution::new(line).with_effect(Effect::EscapeAttempted { success })
            }
        };

        let defeated = resolution
            .effects
            .iter()
            .any(|e| matches!(e, Effect::EnemyDamaged { defeated: true, .. }));
        if defeated {
            resolution.with_line(format!("{} is defeated!", enemy.name))
        } else {
            resolution
        }
    }

    fn resolve_enemy_attack(&self, player: &Player, enemy: &Enemy) -> Resolution {
        let damage = self.enemy_damage(player, enemy);
        let remaining_hp = player.current_hp.saturating_sub(damage);
        let defeated = remaining_hp == 0;

        let resolution = Resolution::new(format!("{} attacks for {damage} damage!", enemy.name))
            .with_effect(Effect::PlayerDamaged {
                amount: damage,
                remaining_hp,
                defeated,
            });

        if defeated {
            resolution.with_line("You have been defeated!")
        } else {
            resolution
        }
    }

    fn resolve_victory(
        &self,
        player: &Player,
        enemy: &Enemy,
        rng: &mut dyn RandomSource,
    ) -> Resolution {
        let amount = enemy.xp_reward;
        let outcome = progression::preview_xp(player, amount);

        let mut resolution = Resolution::new(format!("Victory! You gain {amount} XP!"))
            .with_effect(Effect::ExperienceGained {
                amount,
                new_level: outcome.level,
                levels_gained: outcome.levels_gained,
            });

        if let Some(loot) = &enemy.loot {
            resolution = resolution
                .with_line(format!("You find: {}!", loot.name))
                .with_effect(Effect::ItemAcquired { item: loot.clone() });
        }

        let aether_essence = rng.range_inclusive(1, 5);
        let dimensional_fragments = rng.range_inclusive(0, 2);
        resolution.with_effect(Effect::ResourcesGained {
            aether_essence,
            dimensional_fragments,
        })
    }

    fn resolve_defeat(&self, player: &Player) -> Resolution {
        let hp = player.max_hp() / 2;
        Resolution::new("You awaken at the dimension station...")
            .with_effect(Effect::Respawned { hp })
    }

    fn resolve_rest(&self, player: &Player) -> Resolution {
        let max = player.max_hp();
        let amount = (u64::from(max) * u64::from(REST_HEAL_PERCENT) / 100) as u32;
        let amount = amount.min(max.saturating_sub(player.current_hp));
        Resolution::new("You rest and recover some health.").with_effect(Effect::HpRestored {
            amount,
            new_current: player.current_hp.saturating_add(amount),
        })
    }

    fn resolve_treasure(&self, rng: &mut dyn RandomSource) -> Resolution {
        let item = items::generate_treasure(rng);
        Resolution::new(format!("You found a treasure: {}!", item.name))
            .with_effect(Effect::ItemAcquired { item })
            .with_effect(Effect::ResourcesGained {
                aether_essence: items::TREASURE_AETHER_BONUS,
                dimensional_fragments: 0,
            })
    }

    fn resolve_special_event(&self, player: &Player, rng: &mut dyn RandomSource) -> Resolution {
        let event = SpecialEvent::ALL[rng.pick_index(SpecialEvent::ALL.len())];
        let resolution = Resolution::new(event.description());

        match event {
            SpecialEvent::AetherPool => {
                let max = player.max_hp();
                resolution.with_effect(Effect::HpRestored {
                    amount: max.saturating_sub(player.current_hp),
                    new_current: max,
                })
            }
            SpecialEvent::DimensionalPortal => resolution.with_effect(Effect::ResourcesGained {
                aether_essence: 15,
                dimensional_fragments: 5,
            }),
            SpecialEvent::MementoFragment => resolution.with_effect(Effect::MementoFound {
                name: format!("Memento Fragment #{}", player.mementos.len() + 1),
            }),
        }
    }
}

fn damage_enemy(enemy: &Enemy, amount: u32) -> Effect {
    let remaining_hp = enemy.current_hp.saturating_sub(amount);
    Effect::EnemyDamaged {
        amount,
        remaining_hp,
        defeated: remaining_hp == 0,
    }
}

/// Apply a list of effects.
pub fn apply_effects(
    player: &mut Player,
    mut combat: Option<&mut CombatState>,
    effects: &[Effect],
) {
    for effect in effects {
        apply_effect(player, combat.as_deref_mut(), effect);
    }
}

/// Apply a single effect to the player and the running combat, if any.
pub fn apply_effect(player: &mut Player, combat: Option<&mut CombatState>, effect: &Effect) {
    match effect {
        Effect::EnemyDamaged { amount, .. } => {
            if let Some(combat) = combat {
                if combat.enemy.take_damage(*amount) {
                    combat.conclude(CombatOutcome::Victory);
                }
            }
        }
        Effect::PlayerDamaged { amount, .. } => {
            if player.take_damage(*amount) {
                if let Some(combat) = combat {
                    combat.conclude(CombatOutcome::Defeat);
                }
            }
        }
        Effect::EscapeAttempted { success } => {
            if *success {
                if let Some(combat) = combat {
                    combat.conclude(CombatOutcome::Fled);
                }
            }
        }
        Effect::Defended => {
            // Logged only
        }
        Effect::ExperienceGained { amount, .. } => {
            progression::apply_xp(player, *amount);
        }
        Effect::ItemAcquired { item } => {
            player.inventory.push(item.clone());
        }
        Effect::ResourcesGained {
            aether_essence,
            dimensional_fragments,
        } => {
            let resources = &mut player.resources;
            resources.aether_essence = resources.aether_essence.saturating_add(*aether_essence);
            resources.dimensional_fragments = resources
                .dimensional_fragments
                .saturating_add(*dimensional_fragments);
        }
        Effect::HpRestored { amount, .. } => {
            player.heal(*amount);
        }
        Effect::Respawned { hp } => {
            player.current_hp = (*hp).min(player.max_hp());
        }
        Effect::MementoFound { name } => {
            player.mementos.push(name.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedRandom;
    use crate::world::PlayerClass;

    fn voidwalker() -> Player {
        Player::new("Nyx", PlayerClass::Voidwalker)
    }

    #[test]
    fn test_ability_damage() {
        let engine = RulesEngine::new();
        let player = voidwalker();

        assert_eq!(engine.ability_damage(&player, CombatAbility::Attack), 23);
        // floor((20 + 12) * 1.5)
        assert_eq!(engine.ability_damage(&player, CombatAbility::Special), 48);
        assert_eq!(engine.ability_damage(&player, CombatAbility::Defend), 0);

        let mage = Player::new("Ilse", PlayerClass::Aethermancer);
        // floor(39 * 1.5) = 58
        assert_eq!(engine.ability_damage(&mage, CombatAbility::Special), 58);
    }

    #[test]
    fn test_enemy_damage_has_floor_of_one() {
        let engine = RulesEngine::new();
        let mut player = Player::new("Brakk", PlayerClass::Forgemaster);
        let enemy = Enemy::new("Aether Beast", 3);

        // 25 - floor(19 / 3)
        assert_eq!(engine.enemy_damage(&player, &enemy), 19);

        player.stats.strength = 200;
        assert_eq!(engine.enemy_damage(&player, &enemy), 1);
    }

    #[test]
    fn test_attack_resolution() {
        let engine = RulesEngine::new();
        let player = voidwalker();
        let enemy = Enemy::new("Void Warden", 3);
        let mut rng = ScriptedRandom::new(vec![0.5]);

        let resolution = engine.resolve(
            &player,
            Some(&enemy),
            Intent::UseAbility(CombatAbility::Attack),
            &mut rng,
        );

        assert_eq!(
            resolution.effects,
            vec![Effect::EnemyDamaged {
                amount: 23,
                remaining_hp: 87,
                defeated: false
            }]
        );
        assert!(resolution.log[0].contains("23"));
    }

    #[test]
    fn test_killing_blow_is_flagged() {
        let engine = RulesEngine::new();
        let player = voidwalker();
        let mut enemy = Enemy::new("Void Warden", 3);
        enemy.current_hp = 10;
        let mut rng = ScriptedRandom::new(vec![0.5]);

        let resolution = engine.resolve(
            &player,
            Some(&enemy),
            Intent::UseAbility(CombatAbility::Attack),
            &mut rng,
        );

        assert!(resolution
            .effects
            .iter()
            .any(|e| matches!(e, Effect::EnemyDamaged { remaining_hp: 0, defeated: true, .. })));
        assert!(resolution.log.iter().any(|l| l.contains("defeated")));
    }

    #[test]
    fn test_escape_uses_seventy_percent_gate() {
        let engine = RulesEngine::new();
        let player = voidwalker();
        let enemy = Enemy::new("Void Warden", 1);
        let mut rng = ScriptedRandom::new(vec![0.69, 0.7]);

        let escape = Intent::UseAbility(CombatAbility::Escape);

        let success = engine.resolve(&player, Some(&enemy), escape, &mut rng);
        let failure = engine.resolve(&player, Some(&enemy), escape, &mut rng);

        assert_eq!(success.effects, vec![Effect::EscapeAttempted { success: true }]);
        assert_eq!(failure.effects, vec![Effect::EscapeAttempted { success: false }]);
    }

    #[test]
    fn test_victory_rewards() {
        let engine = RulesEngine::new();
        let player = voidwalker();
        let mut enemy = Enemy::new("Void Warden", 3);
        enemy.loot = items::find_item("Shadow Shard");
        // aether 1 + floor(0.99 * 5) = 5, fragments floor(0.0 * 3) = 0
        let mut rng = ScriptedRandom::new(vec![0.99, 0.0]);

        let resolution = engine.resolve(&player, Some(&enemy), Intent::ClaimVictory, &mut rng);

        assert_eq!(resolution.levels_gained(), 0);
        assert!(resolution.effects.contains(&Effect::ExperienceGained {
            amount: 70,
            new_level: 1,
            levels_gained: 0
        }));
        assert!(resolution
            .effects
            .iter()
            .any(|e| matches!(e, Effect::ItemAcquired { item } if item.name == "Shadow Shard")));
        assert!(resolution.effects.contains(&Effect::ResourcesGained {
            aether_essence: 5,
            dimensional_fragments: 0
        }));
    }

    #[test]
    fn test_apply_victory_levels_up() {
        let engine = RulesEngine::new();
        let mut player = voidwalker();
        player.xp = 90;
        player.current_hp = 3;
        let enemy = Enemy::new("Void Warden", 1);
        let mut rng = ScriptedRandom::new(vec![0.0]);

        let resolution = engine.resolve(&player, Some(&enemy), Intent::ClaimVictory, &mut rng);
        assert_eq!(resolution.levels_gained(), 1);

        apply_effects(&mut player, None, &resolution.effects);
        assert_eq!(player.level, 2);
        assert_eq!(player.xp, 30);
        assert_eq!(player.current_hp, player.max_hp());
        assert_eq!(player.resources.aether_essence, 1);
    }

    #[test]
    fn test_defeat_respawns_at_half_hp() {
        let engine = RulesEngine::new();
        let mut player = voidwalker();
        player.current_hp = 0;
        let mut rng = ScriptedRandom::new(vec![0.0]);

        let resolution = engine.resolve(&player, None, Intent::SufferDefeat, &mut rng);
        apply_effects(&mut player, None, &resolution.effects);

        assert_eq!(player.current_hp, 75);
    }

    #[test]
    fn test_rest_heals_thirty_percent_capped() {
        let engine = RulesEngine::new();
        let mut player = voidwalker();
        let mut rng = ScriptedRandom::new(vec![0.0]);

        player.current_hp = 10;
        let resolution = engine.resolve(&player, None, Intent::Rest, &mut rng);
        apply_effects(&mut player, None, &resolution.effects);
        assert_eq!(player.current_hp, 55);

        player.current_hp = 140;
        let resolution = engine.resolve(&player, None, Intent::Rest, &mut rng);
        apply_effects(&mut player, None, &resolution.effects);
        assert_eq!(player.current_hp, 150);
    }

    #[test]
    fn test_treasure_always_rewards() {
        let engine = RulesEngine::new();
        let mut player = voidwalker();
        let mut rng = ScriptedRandom::new(vec![0.5]);

        let resolution = engine.resolve(&player, None, Intent::OpenTreasure, &mut rng);
        apply_effects(&mut player, None, &resolution.effects);

        assert_eq!(player.inventory.len(), 1);
        assert_eq!(player.inventory[0].name, "Aether Relic");
        assert_eq!(player.resources.aether_essence, 10);
    }

    #[test]
    fn test_special_events() {
        let engine = RulesEngine::new();
        let mut player = voidwalker();
        player.current_hp = 1;

        let mut rng = ScriptedRandom::new(vec![0.0]);
        let pool = engine.resolve(&player, None, Intent::TriggerSpecialEvent, &mut rng);
        apply_effects(&mut player, None, &pool.effects);
        assert_eq!(player.current_hp, 150);

        let mut rng = ScriptedRandom::new(vec![0.5]);
        let portal = engine.resolve(&player, None, Intent::TriggerSpecialEvent, &mut rng);
        apply_effects(&mut player, None, &portal.effects);
        assert_eq!(player.resources.aether_essence, 15);
        assert_eq!(player.resources.dimensional_fragments, 5);

        let mut rng = ScriptedRandom::new(vec![0.9]);
        let memento = engine.resolve(&player, None, Intent::TriggerSpecialEvent, &mut rng);
        apply_effects(&mut player, None, &memento.effects);
        assert_eq!(player.mementos, vec!["Memento Fragment #1".to_string()]);
    }

    #[test]
    fn test_rewards_saturate_at_max() {
        let engine = RulesEngine::new();
        let mut player = voidwalker();
        player.resources.aether_essence = u32::MAX;
        player.resources.dimensional_fragments = u32::MAX - 1;
        player.stats.strength = u32::MAX;
        player.stats.intelligence = u32::MAX;
        let mut rng = ScriptedRandom::new(vec![0.5]);

        let portal = engine.resolve(&player, None, Intent::TriggerSpecialEvent, &mut rng);
        apply_effects(&mut player, None, &portal.effects);
        assert_eq!(player.resources.aether_essence, u32::MAX);
        assert_eq!(player.resources.dimensional_fragments, u32::MAX);

        assert_eq!(engine.ability_damage(&player, CombatAbility::Attack), u32::MAX);
        assert_eq!(engine.ability_damage(&player, CombatAbility::Special), u32::MAX);

        player.current_hp = 0;
        let rest = engine.resolve(&player, None, Intent::Rest, &mut rng);
        apply_effects(&mut player, None, &rest.effects);
        assert!(player.current_hp > 0);
    }

    #[test]
    fn test_apply_concludes_combat() {
        let mut player = voidwalker();
        let mut combat = CombatState::new(Enemy::new("Void Warden", 1));

        apply_effect(
            &mut player,
            Some(&mut combat),
            &Effect::EnemyDamaged {
                amount: 500,
                remaining_hp: 0,
                defeated: true,
            },
        );

        assert_eq!(combat.outcome, Some(CombatOutcome::Victory));
        assert_eq!(combat.enemy.current_hp, 0);
    }

    #[test]
    fn test_unknown_ability_defends() {
        assert_eq!(CombatAbility::from_name("fireball"), CombatAbility::Defend);
        assert_eq!(CombatAbility::from_name(" Attack "), CombatAbility::Attack);
    }

    #[test]
    fn test_no_enemy_means_no_effects() {
        let engine = RulesEngine::new();
        let player = voidwalker();
        let mut rng = ScriptedRandom::new(vec![0.0]);

        let resolution = engine.resolve(&player, None, Intent::EnemyAttack, &mut rng);
        assert!(resolution.effects.is_empty());
    }
}
