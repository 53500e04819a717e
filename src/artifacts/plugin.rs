//! Artifact plugin - fans combat events out to the held artifacts.

use bevy::prelude::*;

use super::catalog::is_evolution_artifact;
use super::components::ArtifactContext;
use super::systems::ArtifactSystem;
use crate::combat::{finish_kill, validate_evolutions, CombatSystem, EVOLUTION_RECIPES};
use crate::core::{EnemyKilledEvent, FrameSet, GameRng, GameState, LevelUpEvent, RunClock};
use crate::enemies::EnemyRoster;
use crate::player::Player;

pub struct ArtifactPlugin;

impl Plugin for ArtifactPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ArtifactSystem>()
            .add_systems(Startup, check_evolution_recipes)
            .add_systems(
                Update,
                (react_to_kills, react_to_level_ups, update_artifacts)
                    .chain()
                    .in_set(FrameSet::Artifacts),
            )
            .add_systems(OnExit(GameState::InGame), clear_artifacts);
    }
}

fn check_evolution_recipes() {
    let errors = validate_evolutions(&EVOLUTION_RECIPES, is_evolution_artifact);
    for error in &errors {
        warn!("Evolution recipe error: {}", error);
    }
    if errors.is_empty() {
        debug!("{} evolution recipes validated", EVOLUTION_RECIPES.len());
    }
}

fn react_to_kills(
    mut kills: EventReader<EnemyKilledEvent>,
    mut artifacts: ResMut<ArtifactSystem>,
    mut player: ResMut<Player>,
) {
    for kill in kills.read() {
        artifacts.trigger_kill(kill, &mut player);
    }
}

fn react_to_level_ups(
    mut level_ups: EventReader<LevelUpEvent>,
    mut artifacts: ResMut<ArtifactSystem>,
    mut player: ResMut<Player>,
) {
    for event in level_ups.read() {
        artifacts.trigger_level_up(event.new_level, &mut player);
    }
}

/// Per-frame artifact effects. Enemies they kill are finished here like any other kill.
fn update_artifacts(
    time: Res<Time>,
    combat: Res<CombatSystem>,
    mut artifacts: ResMut<ArtifactSystem>,
    mut player: ResMut<Player>,
    mut roster: ResMut<EnemyRoster>,
    mut rng: ResMut<GameRng>,
    mut clock: ResMut<RunClock>,
    mut kill_events: EventWriter<EnemyKilledEvent>,
) {
    if artifacts.is_empty() {
        return;
    }
    let mut casualties = Vec::new();
    let mut ctx = ArtifactContext {
        delta: time.delta_secs(),
        player: &mut player,
        enemies: &mut roster.enemies,
        casualties: &mut casualties,
    };
    artifacts.update(&mut ctx);

    for index in casualties {
        let Some(enemy) = roster.enemies.get_mut(index) else {
            continue;
        };
        if !enemy.active {
            continue;
        }
        kill_events.send(finish_kill(enemy, combat.potion_drop_rate, &mut rng.0));
        clock.kills += 1;
    }
}

fn clear_artifacts(mut artifacts: ResMut<ArtifactSystem>, mut player: ResMut<Player>) {
    artifacts.cleanup(&mut player);
}
