//! World module - bounds, geometry, the camera, and balance data.

mod camera;
mod data;
mod error;
mod geometry;
mod plugin;

pub use camera::GameCamera;
pub use data::{load_balance, load_balance_file, load_ron_file, Balance, WorldBalance, BALANCE_PATH};
pub use error::{DataLoadError, ValidationError};
pub use geometry::*;
pub use plugin::WorldPlugin;
