//! Spirit Survivor - a top-down survivor game on Bevy.
//!
//! The player walks, weapons fire on their own, enemies arrive in waves, and a
//! boss closes the stage at the ten-minute mark.
//!
//! # Architecture
//!
//! The game is organized into plugins, each handling a specific aspect:
//!
//! - **Core**: Game states, global events, frame order, run clock
//! - **Player**: Movement, stats, keyboard input
//! - **Combat**: Auto-fire weapons, hit resolution, player damage
//! - **Enemies**: Wave and named spawning, chase AI
//! - **Progression**: XP gems, potions, levels, level-up choices
//! - **Artifacts**: Passive items reacting to kills, hits and damage
//! - **Boss**: The White Tiger fight and stage clear
//! - **World**: Bounds, geometry, camera, balance data
//! - **Rendering**: Sprite cache and shape drawing
//! - **UI**: HUD snapshot, HUD, menus
//!
//! Simulation state lives in plain structs held by resources. Systems run in
//! the chained [`core::FrameSet`] order, so every frame is deterministic for a
//! given seed.

pub mod artifacts;
pub mod boss;
pub mod combat;
pub mod core;
pub mod enemies;
pub mod player;
pub mod progression;
pub mod rendering;
pub mod ui;
pub mod world;

use bevy::prelude::*;

/// Every gameplay plugin, without windows, rendering or widgets.
///
/// Needs `MinimalPlugins` (or `DefaultPlugins`) and `StatesPlugin` underneath.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Core systems (must be first)
            .add_plugins(core::CorePlugin)

            // Balance data and camera
            .add_plugins(world::WorldPlugin)

            // Player systems
            .add_plugins(player::PlayerPlugin)

            // Combat systems
            .add_plugins(combat::CombatPlugin)

            // Enemy systems
            .add_plugins(enemies::EnemyPlugin)

            // XP, pickups and level-ups
            .add_plugins(progression::ProgressionPlugin)

            // Artifacts
            .add_plugins(artifacts::ArtifactPlugin)

            // Boss fight
            .add_plugins(boss::BossPlugin);

        ui::setup_snapshot_systems(app);
    }
}

/// Main game plugin that adds all sub-plugins.
pub struct SurvivorPlugin;

impl Plugin for SurvivorPlugin {
    fn build(&self, app: &mut App) {
        app
            .add_plugins(SimulationPlugin)

            // Rendering systems
            .add_plugins(rendering::RenderingPlugin)

            // UI systems
            .add_plugins(ui::UiPlugin);
    }
}
