//! UI module - HUD snapshot, HUD widgets and menus.

mod hud;
mod plugin;
mod snapshot;

pub use plugin::UiPlugin;
pub use snapshot::{setup_snapshot_systems, ChoiceView, HudSnapshot};
