//! Headless app for driving whole frames.

#![allow(dead_code)]

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;
use std::time::Duration;

use spirit_survivor::core::{GameState, PlayState, SessionCounter, SessionSeed};
use spirit_survivor::SimulationPlugin;

pub const FRAME: Duration = Duration::from_millis(16);

/// Simulation plugins on `MinimalPlugins`, fixed 16 ms frames, fixed seed.
pub fn test_app(seed: u64) -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin))
        .add_plugins(SimulationPlugin)
        .insert_resource(TimeUpdateStrategy::ManualDuration(FRAME))
        .insert_resource(SessionSeed(Some(seed)))
        .insert_resource(SessionCounter::in_memory());
    app
}

/// Load data, pass the menu, and start a run.
pub fn start_run(seed: u64) -> App {
    let mut app = test_app(seed);
    app.update();
    app.update();
    assert_eq!(game_state(&app), GameState::MainMenu);
    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(GameState::InGame);
    app.update();
    assert_eq!(game_state(&app), GameState::InGame);
    app
}

pub fn step(app: &mut App, frames: usize) {
    for _ in 0..frames {
        app.update();
    }
}

pub fn game_state(app: &App) -> GameState {
    *app.world().resource::<State<GameState>>().get()
}

pub fn play_state(app: &App) -> Option<PlayState> {
    app.world()
        .get_resource::<State<PlayState>>()
        .map(|state| *state.get())
}
