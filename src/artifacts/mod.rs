//! Artifacts module - passive modifiers that react to combat events.

mod catalog;
mod components;
mod plugin;
mod systems;

pub use catalog::*;
pub use components::*;
pub use plugin::ArtifactPlugin;
pub use systems::*;
