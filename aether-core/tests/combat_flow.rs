//! Combat scenarios driven through the session API.

use aether_core::combat::CombatPhase;
use aether_core::rules::{CombatAbility, Effect};
use aether_core::session::{GameView, Modal, Screen, ValidationError};
use aether_core::testing::{
    assert_hp, assert_in_combat, assert_level, assert_not_in_combat, assert_screen, TestHarness,
};
use aether_core::world::{Enemy, PlayerClass, Stat};

// =============================================================================
// Full fights
// =============================================================================

#[tokio::test]
async fn test_voidwalker_defeats_level_three_enemy_on_fifth_attack() {
    // Victory draws: aether 1 + floor(0.5 * 5) = 3, fragments floor(0.5 * 3) = 1
    let mut harness = TestHarness::with_player(PlayerClass::Voidwalker).with_draws(vec![0.5]);
    harness.start_fight(Enemy::new("Void Warden", 3));
    assert_eq!(harness.enemy_hp(), Some((110, 110)));

    for round in 1..=4u32 {
        let response = harness
            .session
            .take_turn(CombatAbility::Attack)
            .await
            .unwrap();

        assert_eq!(response.combat_phase, CombatPhase::InCombat);
        assert!(!response.awaiting_enemy_turn);
        assert_eq!(harness.enemy_hp(), Some((110 - 23 * round, 110)));
        // 25 attack - floor(8 / 3) = 23 per enemy hit
        assert_hp(&harness, 150 - 23 * round, 150);
    }

    let response = harness.session.use_ability(CombatAbility::Attack).unwrap();

    assert_eq!(response.combat_phase, CombatPhase::Victory);
    assert!(response
        .log
        .iter()
        .any(|line| line == "Victory! You gain 70 XP!"));
    assert_not_in_combat(&harness);
    assert_screen(&harness, Screen::Game(GameView::Exploration));

    // The enemy never got its fifth turn
    assert_hp(&harness, 58, 150);
    let player = harness.session.player().unwrap();
    assert_eq!(player.xp, 70);
    assert_eq!(player.level, 1);
    assert_eq!(player.resources.aether_essence, 3);
    assert_eq!(player.resources.dimensional_fragments, 1);
    assert!(response.level_up.is_none());
}

#[tokio::test]
async fn test_defeat_respawns_at_half_hp() {
    let mut harness = TestHarness::with_player(PlayerClass::Voidwalker).with_draws(vec![0.5]);
    harness.player_mut().current_hp = 10;
    harness.start_fight(Enemy::new("Shadow King", 5));

    let response = harness
        .session
        .take_turn(CombatAbility::Defend)
        .await
        .unwrap();

    assert_eq!(response.combat_phase, CombatPhase::Defeat);
    assert!(response
        .notifications
        .iter()
        .any(|n| n == "You awaken at the dimension station..."));
    assert!(response.effects.contains(&Effect::Respawned { hp: 75 }));
    assert_not_in_combat(&harness);
    assert_hp(&harness, 75, 150);
    assert_eq!(harness.session.combat_phase(), CombatPhase::Idle);
}

#[test]
fn test_escape_success_gives_no_rewards() {
    let mut harness = TestHarness::with_player(PlayerClass::Voidwalker).with_draws(vec![0.1]);
    harness.start_fight(Enemy::new("Aether Beast", 1));

    let response = harness.session.use_ability(CombatAbility::Escape).unwrap();

    assert_eq!(response.combat_phase, CombatPhase::Fled);
    assert_not_in_combat(&harness);
    let player = harness.session.player().unwrap();
    assert_eq!(player.xp, 0);
    assert_eq!(player.resources.aether_essence, 0);
}

#[test]
fn test_failed_escape_consumes_the_turn() {
    let mut harness = TestHarness::with_player(PlayerClass::Voidwalker).with_draws(vec![0.9]);
    harness.start_fight(Enemy::new("Aether Beast", 1));

    let response = harness.session.use_ability(CombatAbility::Escape).unwrap();
    assert_eq!(response.log, vec!["Escape failed!".to_string()]);
    assert!(response.awaiting_enemy_turn);

    harness.session.enemy_turn().unwrap();
    // 15 attack - floor(8 / 3)
    assert_hp(&harness, 137, 150);
    assert_eq!(harness.combat().unwrap().round, 2);
}

// =============================================================================
// Turn order
// =============================================================================

#[test]
fn test_commands_refused_while_enemy_turn_pending() {
    let mut harness = TestHarness::with_player(PlayerClass::Forgemaster);
    harness.start_fight(Enemy::new("Aether Beast", 1));

    assert_eq!(
        harness.session.enemy_turn().unwrap_err(),
        ValidationError::NoEnemyTurnPending
    );

    harness.session.use_ability(CombatAbility::Defend).unwrap();

    assert_eq!(
        harness
            .session
            .use_ability(CombatAbility::Attack)
            .unwrap_err(),
        ValidationError::AwaitingEnemyTurn
    );
    assert_eq!(harness.session.explore().unwrap_err(), ValidationError::InCombat);
    assert_eq!(harness.session.rest().unwrap_err(), ValidationError::InCombat);
    assert_eq!(
        harness.session.dimension_shift().unwrap_err(),
        ValidationError::InCombat
    );
    assert_eq!(
        harness.session.back_to_menu().unwrap_err(),
        ValidationError::InCombat
    );
    assert_in_combat(&harness);

    harness.session.enemy_turn().unwrap();
    assert!(!harness.session.is_awaiting_enemy_turn());
    harness.session.use_ability(CombatAbility::Attack).unwrap();
}

#[test]
fn test_unknown_ability_defends() {
    let mut harness = TestHarness::with_player(PlayerClass::Voidwalker);
    harness.start_fight(Enemy::new("Aether Beast", 1));

    let response = harness.session.use_ability_named("fireball").unwrap();

    assert_eq!(response.effects, vec![Effect::Defended]);
    assert_eq!(harness.enemy_hp(), Some((70, 70)));
    assert!(harness.session.is_awaiting_enemy_turn());
}

#[test]
fn test_ability_outside_combat() {
    let mut harness = TestHarness::with_player(PlayerClass::Voidwalker);
    assert_eq!(
        harness
            .session
            .use_ability(CombatAbility::Attack)
            .unwrap_err(),
        ValidationError::NotInCombat
    );
    assert_eq!(
        harness.session.switch_view(GameView::Combat).unwrap_err(),
        ValidationError::NotInCombat
    );
}

#[test]
fn test_combat_log_accumulates() {
    let mut harness = TestHarness::with_player(PlayerClass::Aethermancer);
    harness.start_fight(Enemy::new("Void Warden", 2));

    harness.session.use_ability(CombatAbility::Special).unwrap();
    harness.session.enemy_turn().unwrap();

    assert_eq!(
        harness.session.combat_log(),
        &[
            "Void Warden appears!".to_string(),
            "You unleash your special ability for 58 damage!".to_string(),
            "Void Warden attacks for 18 damage!".to_string(),
        ]
    );
}

// =============================================================================
// Level up
// =============================================================================

#[tokio::test]
async fn test_victory_with_level_up_opens_modal() {
    let mut harness = TestHarness::with_player(PlayerClass::Voidwalker).with_draws(vec![0.0]);
    harness.player_mut().xp = 90;
    harness.player_mut().current_hp = 20;
    let mut enemy = Enemy::new("Shadow Stalker", 1);
    enemy.current_hp = 5;
    harness.start_fight(enemy);

    let response = harness.session.use_ability(CombatAbility::Attack).unwrap();

    let level_up = response.level_up.expect("victory should level up");
    assert_eq!(level_up.levels_gained, 1);
    assert_eq!(level_up.new_level, 2);
    assert_eq!(level_up.skill_points, 6);
    assert_eq!(harness.session.modal(), Some(Modal::LevelUp));
    assert_level(&harness, 2);
    // Level up restores HP to the new max
    assert_hp(&harness, 160, 160);

    harness.session.upgrade_stat(Stat::Strength).unwrap();
    assert_eq!(harness.session.pending_level_up().unwrap().skill_points, 5);
    assert_hp(&harness, 160, 165);

    assert!(!harness.has_save().await);
    harness.session.confirm_level_up().await;
    assert_eq!(harness.session.modal(), None);
    assert!(harness.session.pending_level_up().is_none());
    assert!(harness.has_save().await);
}

#[test]
fn test_upgrade_without_points() {
    let mut harness = TestHarness::with_player(PlayerClass::Voidwalker);
    harness.player_mut().skill_points = 0;

    assert!(matches!(
        harness.session.upgrade_stat(Stat::Agility),
        Err(ValidationError::Progression(_))
    ));
    assert_eq!(harness.session.player().unwrap().stats.agility, 15);
}
