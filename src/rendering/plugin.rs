//! Rendering plugin - a flat top-down view of the simulation.
//!
//! Nothing here writes simulation state. Drawing runs after the frame loop and
//! keeps running while paused or choosing an upgrade.

use bevy::prelude::*;

use super::assets::{clear_asset_cache, init_asset_cache, poll_asset_loads, AssetCache};
use super::draw::{
    despawn_game_view, draw_attacks, draw_bodies, draw_boss, draw_pickups, resize_camera, spawn_game_view,
    sync_camera, SpritePool,
};
use super::visual_config::load_visual_config;
use crate::core::{FrameSet, GameState};

/// Rendering plugin - camera, sprite cache and debug-shape drawing.
pub struct RenderingPlugin;

impl Plugin for RenderingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AssetCache>()
            .init_resource::<SpritePool>()
            .add_systems(Startup, load_visual_config)
            .add_systems(OnEnter(GameState::InGame), (init_asset_cache, spawn_game_view))
            .add_systems(OnExit(GameState::InGame), (clear_asset_cache, despawn_game_view))
            .add_systems(
                Update,
                (
                    resize_camera,
                    poll_asset_loads,
                    sync_camera,
                    (draw_pickups, draw_attacks, draw_bodies, draw_boss),
                )
                    .chain()
                    .after(FrameSet::Ui)
                    .run_if(in_state(GameState::InGame)),
            );
    }
}
