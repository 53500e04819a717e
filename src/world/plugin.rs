//! World plugin - balance loading and the camera.

use bevy::prelude::*;

use crate::core::GameState;

use super::camera::GameCamera;
use super::data::{load_balance, Balance};

/// World plugin - reads the balance file while loading and owns the camera.
pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Balance>()
            .init_resource::<GameCamera>()
            .add_systems(OnEnter(GameState::Loading), load_balance)
            .add_systems(OnExit(GameState::InGame), log_run_end);
    }
}

fn log_run_end(camera: Res<GameCamera>) {
    debug!("Leaving run; camera at ({:.0}, {:.0})", camera.center.x, camera.center.y);
}
