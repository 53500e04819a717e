//! Player plugin - input, movement, and camera follow.

use bevy::prelude::*;

use super::movement;

/// Player plugin - handles player reset, input and movement.
pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        // Set up movement systems
        movement::setup_movement_systems(app);
    }
}
