//! Player module - player state, input, and movement.

mod components;
mod movement;
mod plugin;

pub use components::*;
pub use movement::{move_player, read_keyboard_input, spawn_player};
pub use plugin::PlayerPlugin;
