//! Game state definitions that control the overall flow of the game.
//!
//! States decide which systems run. The frame loop only advances in
//! `GameState::InGame` while `PlayState::Running`.

use bevy::prelude::*;

/// Main game states - controls overall game flow.
///
/// - Start in `Loading` to read data files
/// - Move to `MainMenu` when loading completes
/// - Entering `InGame` starts a fresh run
/// - `GameOver` when the player dies, `StageCleared` after the boss reward
#[derive(States, Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub enum GameState {
    #[default]
    Loading,
    MainMenu,
    InGame,
    GameOver,
    StageCleared,
}

/// Sub-states for gameplay - only active when GameState::InGame.
///
/// Pausing lives here so leaving the pause menu does not restart the run.
#[derive(SubStates, Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
#[source(GameState = GameState::InGame)]
pub enum PlayState {
    /// The frame loop advances.
    #[default]
    Running,
    /// Frozen, pause menu on screen.
    Paused,
    /// A level-up choice is on screen; the simulation waits for it.
    ChoosingUpgrade,
}
