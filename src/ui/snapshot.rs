//! Read-only view of the run for the HUD and overlays.

use bevy::prelude::*;

use crate::artifacts::Rarity;
use crate::boss::BossSystem;
use crate::core::{format_clock, FrameSet, GameState, RunClock};
use crate::player::Player;
use crate::progression::{LevelSystem, PendingChoices};

/// One level-up option as the overlay shows it.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub rarity: Rarity,
}

/// Everything the UI may read. Rebuilt every frame while in a run.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct HudSnapshot {
    pub health: f32,
    pub max_health: f32,
    pub level: u32,
    /// Fraction of the way to the next level.
    pub xp_progress: f32,
    pub kills: u32,
    pub elapsed: f32,
    pub boss_name: Option<String>,
    /// Boss health in `0..=1` while the health bar exists.
    pub boss_health: Option<f32>,
    pub choices: Vec<ChoiceView>,
}

impl HudSnapshot {
    pub fn capture(
        player: &Player,
        clock: &RunClock,
        levels: &LevelSystem,
        boss: &BossSystem,
        pending: &PendingChoices,
    ) -> Self {
        let bar = boss.health_bar.as_ref();
        Self {
            health: player.health,
            max_health: player.max_health,
            level: levels.level,
            xp_progress: levels.progress(),
            kills: clock.kills,
            elapsed: clock.elapsed,
            boss_name: bar.map(|b| b.name.clone()),
            boss_health: bar.map(|b| b.fraction()),
            choices: pending
                .choices
                .iter()
                .map(|c| ChoiceView {
                    id: c.id.clone(),
                    name: c.name.clone(),
                    description: c.description.clone(),
                    rarity: c.rarity,
                })
                .collect(),
        }
    }

    pub fn clock_text(&self) -> String {
        format_clock(self.elapsed)
    }

    pub fn boss_percent(&self) -> Option<u32> {
        self.boss_health.map(|f| (f * 100.0).round() as u32)
    }

    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0.0 {
            0.0
        } else {
            (self.health / self.max_health).clamp(0.0, 1.0)
        }
    }
}

/// The snapshot refresh runs headless too, so it is registered apart from the widgets.
pub fn setup_snapshot_systems(app: &mut App) {
    app.init_resource::<HudSnapshot>().add_systems(
        Update,
        refresh_snapshot
            .after(FrameSet::Ui)
            .run_if(in_state(GameState::InGame)),
    );
}

fn refresh_snapshot(
    player: Res<Player>,
    clock: Res<RunClock>,
    levels: Res<LevelSystem>,
    boss: Res<BossSystem>,
    pending: Res<PendingChoices>,
    mut snapshot: ResMut<HudSnapshot>,
) {
    let fresh = HudSnapshot::capture(&player, &clock, &levels, &boss, &pending);
    if *snapshot != fresh {
        *snapshot = fresh;
    }
}
