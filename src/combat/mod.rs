//! Combat module - weapons, player attacks, and damage resolution.

mod components;
mod plugin;
mod systems;
mod weapons;

pub use components::*;
pub use plugin::CombatPlugin;
pub use systems::{apply_player_damage, finish_kill, hurt_player, CombatOutcome, CombatSystem, HitReport};
pub use weapons::*;
