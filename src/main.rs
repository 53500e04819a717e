//! Spirit Survivor - Entry Point
//!
//! Controls:
//! - WASD / arrows: Move
//! - 1 / 2 / 3: Pick a level-up card
//! - Escape: Pause/Unpause

use bevy::prelude::*;

fn main() {
    App::new()
        // Bevy default plugins
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Spirit Survivor".to_string(),
                resolution: (1280.0, 720.0).into(),
                ..default()
            }),
            ..default()
        }))

        // Our game plugin
        .add_plugins(spirit_survivor::SurvivorPlugin)

        .run();
}
