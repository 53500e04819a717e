//! Boss module - the White Tiger fight and the stage-clear reward.

mod components;
mod plugin;
mod systems;
mod white_tiger;

pub use components::*;
pub use plugin::BossPlugin;
pub use systems::{BossPhase, BossSystem};
pub use white_tiger::{DashState, WhiteTiger};
