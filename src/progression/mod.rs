//! Progression module - XP gems, potions, levels, and level-up choices.

mod choices;
mod level;
mod pickups;
mod plugin;

pub use choices::*;
pub use level::*;
pub use pickups::*;
pub use plugin::ProgressionPlugin;
