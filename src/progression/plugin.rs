//! Progression plugin - pickups, XP, and the level-up choice flow.

use bevy::prelude::*;

use super::choices::PendingChoices;
use super::level::LevelSystem;
use super::pickups::Pickups;
use crate::artifacts::ArtifactSystem;
use crate::combat::Loadout;
use crate::core::{
    AnalyticsEvent, EnemyKilledEvent, FrameSet, GameRng, GameState, LevelUpEvent, PlayState, UpgradeChosenEvent,
};
use crate::player::Player;
use crate::world::Balance;

pub struct ProgressionPlugin;

impl Plugin for ProgressionPlugin {
    fn build(&self, app: &mut App) {
        app
            .init_resource::<LevelSystem>()
            .init_resource::<Pickups>()
            .init_resource::<PendingChoices>()
            .add_systems(OnEnter(GameState::InGame), reset_progression)
            .add_systems(Update, collect_pickups.in_set(FrameSet::Advance))
            .add_systems(Update, (drop_loot, sweep_pickups).chain().in_set(FrameSet::Cleanup))
            .add_systems(Update, offer_choices.in_set(FrameSet::Ui))
            // Runs while the simulation is frozen on the choice screen
            .add_systems(
                Update,
                apply_upgrade_choice
                    .run_if(in_state(GameState::InGame))
                    .run_if(in_state(PlayState::ChoosingUpgrade)),
            );
    }
}

fn reset_progression(mut levels: ResMut<LevelSystem>, mut pickups: ResMut<Pickups>, mut pending: ResMut<PendingChoices>) {
    *levels = LevelSystem::default();
    pickups.clear();
    pending.clear();
}

/// Move and collect gems and potions, then turn the XP into level-ups.
fn collect_pickups(
    time: Res<Time>,
    balance: Res<Balance>,
    mut player: ResMut<Player>,
    mut pickups: ResMut<Pickups>,
    mut levels: ResMut<LevelSystem>,
    mut pending: ResMut<PendingChoices>,
    mut level_events: EventWriter<LevelUpEvent>,
    mut analytics: EventWriter<AnalyticsEvent>,
) {
    let outcome = pickups.update(time.delta_secs(), &mut player, &balance.xp, &balance.potion);
    if outcome.healed > 0.0 {
        debug!("Potion restored {:.0} HP", outcome.healed);
    }
    for new_level in levels.gain_xp(player.scaled_xp(outcome.xp)) {
        pending.queued += 1;
        level_events.send(LevelUpEvent { new_level });
        analytics.send(AnalyticsEvent::new("level_up").with("level", new_level));
    }
}

/// Queued level-ups freeze the run on the choice screen.
fn offer_choices(
    loadout: Res<Loadout>,
    artifacts: Res<ArtifactSystem>,
    mut pending: ResMut<PendingChoices>,
    mut rng: ResMut<GameRng>,
    mut next_state: ResMut<NextState<PlayState>>,
) {
    if pending.is_showing() || pending.queued == 0 {
        return;
    }
    if pending.deal_next(&loadout, &artifacts, &mut rng.0) {
        next_state.set(PlayState::ChoosingUpgrade);
    }
}

fn apply_upgrade_choice(
    mut chosen: EventReader<UpgradeChosenEvent>,
    mut pending: ResMut<PendingChoices>,
    mut player: ResMut<Player>,
    mut loadout: ResMut<Loadout>,
    mut artifacts: ResMut<ArtifactSystem>,
    mut rng: ResMut<GameRng>,
    mut analytics: EventWriter<AnalyticsEvent>,
    mut next_state: ResMut<NextState<PlayState>>,
) {
    // One pick per frame; later events wait for the next screen.
    let Some(event) = chosen.read().next() else {
        return;
    };
    let Some(choice) = pending.select(&event.choice_id, &mut player, &mut loadout, &mut artifacts) else {
        return;
    };
    info!("Chose {} ({:?})", choice.name, choice.rarity);
    analytics.send(
        AnalyticsEvent::new("level_up_choice")
            .with("choice", &choice.id)
            .with("rarity", format!("{:?}", choice.rarity)),
    );

    if !pending.deal_next(&loadout, &artifacts, &mut rng.0) {
        next_state.set(PlayState::Running);
    }
}

fn drop_loot(balance: Res<Balance>, mut kills: EventReader<EnemyKilledEvent>, mut pickups: ResMut<Pickups>) {
    for kill in kills.read() {
        pickups.drop_for_kill(kill, &balance.xp, &balance.potion);
    }
}

fn sweep_pickups(mut pickups: ResMut<Pickups>) {
    pickups.sweep();
}
