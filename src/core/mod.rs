//! Core game module - states, events, run bookkeeping and the frame order.
//!
//! This module provides the foundation that all other game systems build upon.

mod events;
mod plugin;
mod session;
mod states;

pub use events::*;
pub use plugin::{CorePlugin, FrameSet};
pub use session::*;
pub use states::*;
