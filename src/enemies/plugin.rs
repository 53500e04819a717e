//! Enemy plugin - registers all enemy systems.

use bevy::prelude::*;

use super::ai;
use super::components::EnemyRoster;
use super::data::{load_enemy_definitions, EnemyRegistry};
use super::named::NamedSpawnSystem;
use super::spawning::SpawnSystem;
use crate::artifacts::ArtifactSystem;
use crate::combat::hurt_player;
use crate::core::{AnalyticsEvent, DamageSource, FrameSet, GameRng, GameState, PlayerDamagedEvent, RunClock};
use crate::player::Player;
use crate::world::Balance;

/// Enemy plugin - handles wave and named spawning, movement and cleanup.
pub struct EnemyPlugin;

impl Plugin for EnemyPlugin {
    fn build(&self, app: &mut App) {
        app
            .init_resource::<EnemyRegistry>()
            .init_resource::<EnemyRoster>()
            .init_resource::<SpawnSystem>()
            .init_resource::<NamedSpawnSystem>()
            .add_systems(OnEnter(GameState::Loading), load_enemy_definitions)
            .add_systems(OnEnter(GameState::InGame), reset_enemies)
            .add_systems(Update, ai::move_enemies.in_set(FrameSet::Advance))
            .add_systems(
                Update,
                (ramp_difficulty, spawn_waves, update_named).chain().in_set(FrameSet::Spawn),
            )
            .add_systems(Update, named_projectile_hits.in_set(FrameSet::Combat))
            .add_systems(Update, (ai::sweep_enemies, sweep_named).in_set(FrameSet::Cleanup));
    }
}

/// Fresh spawners and an empty roster for a new run.
fn reset_enemies(
    balance: Res<Balance>,
    mut roster: ResMut<EnemyRoster>,
    mut spawner: ResMut<SpawnSystem>,
    mut named: ResMut<NamedSpawnSystem>,
) {
    roster.clear();
    *spawner = SpawnSystem::new(balance.spawn.clone(), balance.tiers.clone(), &balance.world);
    *named = NamedSpawnSystem::new(balance.named.clone(), &balance.world);
}

/// Shorten the spawn interval once per `difficulty_increase_interval`.
fn ramp_difficulty(
    time: Res<Time>,
    balance: Res<Balance>,
    mut clock: ResMut<RunClock>,
    mut spawner: ResMut<SpawnSystem>,
) {
    let interval = balance.world.difficulty_increase_interval;
    if interval <= 0.0 {
        return;
    }
    clock.difficulty_timer += time.delta_secs();
    while clock.difficulty_timer >= interval {
        clock.difficulty_timer -= interval;
        spawner.increase_spawn_rate();
    }
}

fn spawn_waves(
    time: Res<Time>,
    clock: Res<RunClock>,
    player: Res<Player>,
    registry: Res<EnemyRegistry>,
    mut spawner: ResMut<SpawnSystem>,
    mut roster: ResMut<EnemyRoster>,
    mut rng: ResMut<GameRng>,
) {
    spawner.update(
        time.delta_secs(),
        &mut roster.enemies,
        clock.elapsed,
        player.position,
        &registry,
        &mut rng.0,
    );
}

fn update_named(
    time: Res<Time>,
    clock: Res<RunClock>,
    player: Res<Player>,
    registry: Res<EnemyRegistry>,
    mut named: ResMut<NamedSpawnSystem>,
    mut roster: ResMut<EnemyRoster>,
    mut rng: ResMut<GameRng>,
    mut analytics: EventWriter<AnalyticsEvent>,
) {
    let spawned = named.update(
        time.delta_secs(),
        &mut roster.enemies,
        clock.elapsed,
        player.position,
        &registry,
        &mut rng.0,
    );
    if spawned > 0 {
        analytics.send(
            AnalyticsEvent::new("named_spawned")
                .with("count", spawned)
                .with("time", format!("{:.0}", clock.elapsed)),
        );
    }
}

fn named_projectile_hits(
    mut named: ResMut<NamedSpawnSystem>,
    mut player: ResMut<Player>,
    mut artifacts: ResMut<ArtifactSystem>,
    mut damage_events: EventWriter<PlayerDamagedEvent>,
) {
    let (position, radius) = (player.position, player.radius);
    for damage in named.hit_player(position, radius) {
        hurt_player(&mut player, &mut artifacts, damage, DamageSource::NamedProjectile, &mut damage_events);
    }
}

fn sweep_named(balance: Res<Balance>, roster: Res<EnemyRoster>, mut named: ResMut<NamedSpawnSystem>) {
    named.sweep(&roster.enemies, &balance.world.bounds(), balance.world.out_of_bounds_margin);
}
