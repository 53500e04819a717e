//! Core plugin that sets up game states, events, and the frame order.

use bevy::prelude::*;

use super::events::*;
use super::session::*;
use super::states::*;

/// One simulation frame, in order. Every gameplay system belongs to exactly one set.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameSet {
    Input,
    Player,
    Weapons,
    /// Projectiles, effects, enemies and pickups move.
    Advance,
    Spawn,
    Combat,
    Artifacts,
    Boss,
    /// Inactive entities are dropped here and nowhere else.
    Cleanup,
    Ui,
}

/// Core plugin - must be added first as other plugins depend on it.
///
/// This plugin sets up:
/// - Game states (Loading, MainMenu, InGame, etc.)
/// - Global events (EnemyKilledEvent, PlayerDamagedEvent, etc.)
/// - The chained `FrameSet` order
/// - Run start, pause and the analytics sink
pub struct CorePlugin;

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app
            // Initialize game states
            .init_state::<GameState>()
            .add_sub_state::<PlayState>()

            // Register global events
            .add_event::<EnemyHitEvent>()
            .add_event::<EnemyKilledEvent>()
            .add_event::<PlayerDamagedEvent>()
            .add_event::<PlayerDiedEvent>()
            .add_event::<LevelUpEvent>()
            .add_event::<UpgradeChosenEvent>()
            .add_event::<BossAppearedEvent>()
            .add_event::<BossDefeatedEvent>()
            .add_event::<StageClearedEvent>()
            .add_event::<AnalyticsEvent>()

            // Run bookkeeping
            .init_resource::<GameRng>()
            .init_resource::<SessionSeed>()
            .init_resource::<RunClock>()
            .init_resource::<SessionCounter>()

            // Strict per-frame order
            .configure_sets(
                Update,
                (
                    FrameSet::Input,
                    FrameSet::Player,
                    FrameSet::Weapons,
                    FrameSet::Advance,
                    FrameSet::Spawn,
                    FrameSet::Combat,
                    FrameSet::Artifacts,
                    FrameSet::Boss,
                    FrameSet::Cleanup,
                    FrameSet::Ui,
                )
                    .chain()
                    .run_if(in_state(GameState::InGame))
                    .run_if(in_state(PlayState::Running)),
            )

            // Loading state - data files are read by the world and enemy plugins
            .add_systems(OnEnter(GameState::Loading), transition_to_main_menu)
            .add_systems(OnEnter(GameState::InGame), (start_session, record_session))
            .add_systems(Update, tick_run_clock.in_set(FrameSet::Input))
            .add_systems(
                Update,
                handle_pause_input
                    .run_if(in_state(GameState::InGame))
                    .run_if(resource_exists::<ButtonInput<KeyCode>>),
            )
            .add_systems(Update, log_analytics);
    }
}

/// Data loading runs in the same `OnEnter(Loading)` pass, so the menu can follow immediately.
fn transition_to_main_menu(mut next_state: ResMut<NextState<GameState>>) {
    next_state.set(GameState::MainMenu);
}

/// Reset the clock and reseed the random source for a new run.
pub fn start_session(
    seed: Res<SessionSeed>,
    mut rng: ResMut<GameRng>,
    mut clock: ResMut<RunClock>,
    mut analytics: EventWriter<AnalyticsEvent>,
) {
    *rng = match seed.0 {
        Some(seed) => GameRng::seeded(seed),
        None => GameRng::default(),
    };
    *clock = RunClock::default();
    analytics.send(AnalyticsEvent::new("session_start"));
    info!("Run started");
}

fn tick_run_clock(time: Res<Time>, mut clock: ResMut<RunClock>) {
    clock.elapsed += time.delta_secs();
}

/// Handle Escape key to pause/unpause the game.
fn handle_pause_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    current_state: Res<State<PlayState>>,
    mut next_state: ResMut<NextState<PlayState>>,
) {
    if keyboard.just_pressed(KeyCode::Escape) {
        match current_state.get() {
            PlayState::Running => next_state.set(PlayState::Paused),
            PlayState::Paused => next_state.set(PlayState::Running),
            PlayState::ChoosingUpgrade => {}
        }
    }
}

/// Fire-and-forget sink. The back-end is out of process; here the events are only logged.
fn log_analytics(mut events: EventReader<AnalyticsEvent>) {
    for event in events.read() {
        debug!("analytics: {} {:?}", event.name, event.params);
    }
}
