mod common;

use bevy::prelude::*;
use common::*;

use spirit_survivor::boss::{BossPhase, BossSystem, BOSS_ID};
use spirit_survivor::core::{GameState, PlayState, PlayerDiedEvent, RunClock, SessionCounter, UpgradeChosenEvent};
use spirit_survivor::enemies::{Enemy, EnemyRoster, EnemyStats, EnemyTier};
use spirit_survivor::player::Player;
use spirit_survivor::progression::{LevelSystem, PendingChoices, Pickups};
use spirit_survivor::ui::HudSnapshot;
use spirit_survivor::world::Balance;

#[test]
fn run_starts_centred_and_the_clock_ticks() {
    let mut app = start_run(1);
    let player = app.world().resource::<Player>().clone();
    let centre = app.world().resource::<Balance>().world.bounds().center();
    assert_eq!(player.position, centre);
    assert_eq!(player.health, player.max_health);
    assert_eq!(app.world().resource::<SessionCounter>().count, 1);

    step(&mut app, 60);
    let elapsed = app.world().resource::<RunClock>().elapsed;
    assert!(elapsed > 0.9 && elapsed < 1.0, "elapsed {elapsed}");
    assert_eq!(play_state(&app), Some(PlayState::Running));
}

#[test]
fn waves_spawn_within_the_cap() {
    let mut app = start_run(2);
    step(&mut app, 400);
    let roster = app.world().resource::<EnemyRoster>();
    let cap = app.world().resource::<Balance>().spawn.max_active_enemies;
    assert!(roster.active_count() > 0);
    assert!(roster.active_count() <= cap);
}

#[test]
fn talisman_kills_a_nearby_enemy_and_counts_it() {
    let mut app = start_run(3);
    let target = app.world().resource::<Player>().position + Vec2::new(150.0, 0.0);
    let stats = EnemyStats {
        max_health: 10.0,
        speed: 0.0,
        ..EnemyStats::default()
    };
    app.world_mut()
        .resource_mut::<EnemyRoster>()
        .enemies
        .push(Enemy::new("target", "skeleton", EnemyTier::Low, target, &stats));

    step(&mut app, 150);
    let roster = app.world().resource::<EnemyRoster>();
    assert!(roster.enemies.iter().all(|e| e.id != "target"));
    assert!(app.world().resource::<RunClock>().kills >= 1);
}

#[test]
fn pause_freezes_the_simulation() {
    let mut app = start_run(4);
    step(&mut app, 10);
    app.world_mut()
        .resource_mut::<NextState<PlayState>>()
        .set(PlayState::Paused);
    app.update();
    let frozen = app.world().resource::<RunClock>().elapsed;
    step(&mut app, 30);
    assert_eq!(app.world().resource::<RunClock>().elapsed, frozen);
    assert_eq!(game_state(&app), GameState::InGame);
}

#[test]
fn level_up_waits_for_a_choice() {
    let mut app = start_run(5);
    let position = app.world().resource::<Player>().position;
    let xp = app.world().resource::<Balance>().xp.clone();
    app.world_mut()
        .resource_mut::<Pickups>()
        .spawn_gem(position, 10, &xp);

    step(&mut app, 3);
    assert_eq!(play_state(&app), Some(PlayState::ChoosingUpgrade));
    assert_eq!(app.world().resource::<LevelSystem>().level, 2);
    let choices = app.world().resource::<PendingChoices>().choices.clone();
    assert_eq!(choices.len(), 3);
    assert_eq!(app.world().resource::<HudSnapshot>().choices.len(), 3);

    let frozen = app.world().resource::<RunClock>().elapsed;
    step(&mut app, 20);
    assert_eq!(app.world().resource::<RunClock>().elapsed, frozen);

    app.world_mut().send_event(UpgradeChosenEvent {
        choice_id: choices[0].id.clone(),
    });
    step(&mut app, 3);
    assert_eq!(play_state(&app), Some(PlayState::Running));
    assert!(app.world().resource::<PendingChoices>().choices.is_empty());
}

#[test]
fn xp_multiplier_applies_to_collected_gems() {
    let mut app = start_run(8);
    let position = {
        let mut player = app.world_mut().resource_mut::<Player>();
        player.xp_multiplier = 2.0;
        player.position
    };
    let xp = app.world().resource::<Balance>().xp.clone();
    app.world_mut()
        .resource_mut::<Pickups>()
        .spawn_gem(position, 5, &xp);

    step(&mut app, 3);
    assert_eq!(app.world().resource::<LevelSystem>().level, 2);
    assert_eq!(play_state(&app), Some(PlayState::ChoosingUpgrade));
}

#[test]
fn death_ends_the_run() {
    let mut app = start_run(6);
    step(&mut app, 5);
    app.world_mut().resource_mut::<Player>().health = 0.0;
    step(&mut app, 2);
    assert_eq!(game_state(&app), GameState::GameOver);
    assert!(!app.world().resource::<Events<PlayerDiedEvent>>().is_empty());
}

#[test]
fn boss_fight_through_stage_clear() {
    let mut app = start_run(7);
    let spawn_time = {
        let balance = app.world().resource::<Balance>();
        balance.world.victory_time - balance.boss.lead_time
    };
    app.world_mut().resource_mut::<RunClock>().elapsed = spawn_time;
    step(&mut app, 2);

    assert_eq!(app.world().resource::<BossSystem>().phase, BossPhase::InCombat);
    assert!(app.world().resource::<HudSnapshot>().boss_health.is_some());

    // Knock the boss out.
    {
        let mut roster = app.world_mut().resource_mut::<EnemyRoster>();
        let boss = roster.find_mut(BOSS_ID).expect("boss in roster");
        boss.health = 0.0;
    }
    step(&mut app, 2);
    let chest = {
        let boss = app.world().resource::<BossSystem>();
        assert_eq!(boss.phase, BossPhase::Defeated);
        boss.chest.clone().expect("reward chest")
    };
    assert!(app
        .world()
        .resource::<EnemyRoster>()
        .enemies
        .iter()
        .all(|e| e.id != BOSS_ID));

    app.world_mut().resource_mut::<Player>().position = chest.position;
    step(&mut app, 3);
    assert_eq!(game_state(&app), GameState::StageCleared);

    let boss = app.world().resource::<BossSystem>();
    let stats = boss.stage_stats.clone().expect("stage stats");
    assert!(stats.clear_time >= spawn_time);
    assert!(stats.total_xp >= 1000);
    let player = app.world().resource::<Player>();
    assert_eq!(player.health, player.max_health);
}
