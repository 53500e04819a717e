//! Combat plugin - auto-fire weapons, hit resolution, and player damage.

use bevy::prelude::*;

use super::systems;

/// Combat plugin - handles all combat systems.
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        systems::setup_combat_systems(app);
    }
}
