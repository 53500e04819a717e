//! Boss plugin - spawns the boss on schedule and runs the fight through to stage clear.

use bevy::prelude::*;

use super::components::BOSS_ID;
use super::systems::{BossPhase, BossSystem};
use crate::artifacts::ArtifactSystem;
use crate::combat::hurt_player;
use crate::core::{
    AnalyticsEvent, BossAppearedEvent, BossDefeatedEvent, FrameSet, GameState, PlayerDamagedEvent, RunClock,
    StageClearedEvent,
};
use crate::enemies::EnemyRoster;
use crate::player::Player;
use crate::progression::{LevelSystem, Pickups};
use crate::world::Balance;

pub struct BossPlugin;

impl Plugin for BossPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<BossSystem>()
            .add_systems(OnEnter(GameState::InGame), reset_boss)
            .add_systems(
                Update,
                (spawn_on_schedule, drive_boss, check_defeat, collect_reward)
                    .chain()
                    .in_set(FrameSet::Boss),
            )
            .add_systems(OnExit(GameState::InGame), cleanup_boss);
    }
}

fn reset_boss(mut boss: ResMut<BossSystem>) {
    *boss = BossSystem::default();
}

/// The boss arrives `lead_time` seconds before the victory time.
fn spawn_on_schedule(
    clock: Res<RunClock>,
    balance: Res<Balance>,
    player: Res<Player>,
    mut boss: ResMut<BossSystem>,
    mut roster: ResMut<EnemyRoster>,
    mut appeared: EventWriter<BossAppearedEvent>,
    mut analytics: EventWriter<AnalyticsEvent>,
) {
    if boss.phase != BossPhase::Inactive || clock.elapsed < balance.world.victory_time - balance.boss.lead_time {
        return;
    }
    let position = BossSystem::spawn_position(player.position, &balance.world, &balance.boss);
    if boss.spawn_boss(position, &balance.tiers.boss, &balance.boss, &mut roster.enemies) {
        appeared.send(BossAppearedEvent {
            boss_id: BOSS_ID.to_string(),
            position,
        });
        analytics.send(
            AnalyticsEvent::new("boss_spawned")
                .with("boss_id", BOSS_ID)
                .with("time", format!("{:.0}", clock.elapsed)),
        );
    }
}

fn drive_boss(
    time: Res<Time>,
    balance: Res<Balance>,
    mut boss: ResMut<BossSystem>,
    mut roster: ResMut<EnemyRoster>,
    mut player: ResMut<Player>,
    mut artifacts: ResMut<ArtifactSystem>,
    mut damage_events: EventWriter<PlayerDamagedEvent>,
) {
    if !boss.is_active() {
        return;
    }
    let hits = boss.update(
        time.delta_secs(),
        &mut roster.enemies,
        &player,
        &balance.boss,
        &balance.knockback,
        &balance.world.bounds(),
        balance.world.out_of_bounds_margin,
    );
    for (damage, source) in hits {
        hurt_player(&mut player, &mut artifacts, damage, source, &mut damage_events);
    }
}

fn check_defeat(
    clock: Res<RunClock>,
    balance: Res<Balance>,
    mut boss: ResMut<BossSystem>,
    mut roster: ResMut<EnemyRoster>,
    mut pickups: ResMut<Pickups>,
    mut defeated: EventWriter<BossDefeatedEvent>,
    mut analytics: EventWriter<AnalyticsEvent>,
) {
    let Some(position) = boss.check_defeat(&mut roster.enemies, &mut pickups, &balance.xp, &balance.boss) else {
        return;
    };
    defeated.send(BossDefeatedEvent {
        boss_id: BOSS_ID.to_string(),
        position,
        elapsed: clock.elapsed,
    });
    analytics.send(
        AnalyticsEvent::new("boss_defeated")
            .with("boss_id", BOSS_ID)
            .with("time", format!("{:.0}", clock.elapsed)),
    );
}

fn collect_reward(
    clock: Res<RunClock>,
    levels: Res<LevelSystem>,
    mut boss: ResMut<BossSystem>,
    mut player: ResMut<Player>,
    mut cleared: EventWriter<StageClearedEvent>,
    mut analytics: EventWriter<AnalyticsEvent>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if boss.poll_reward(player.position) {
        debug!("Reward chest opened");
    }
    let Some(stats) = boss.clear_stage(&mut player, &levels, clock.elapsed, clock.kills) else {
        return;
    };
    analytics.send(
        AnalyticsEvent::new("stage_cleared")
            .with("time", stats.formatted_time())
            .with("level", stats.level)
            .with("kills", stats.kills),
    );
    cleared.send(StageClearedEvent { stats });
    next_state.set(GameState::StageCleared);
}

fn cleanup_boss(mut boss: ResMut<BossSystem>, mut roster: ResMut<EnemyRoster>) {
    boss.cleanup(&mut roster.enemies);
}
