//! Rendering module - camera sync, sprite cache and shape drawing.

mod assets;
mod draw;
mod plugin;
pub mod visual_config;

pub use assets::{AssetCache, FallbackShape, SpriteVisual};
pub use draw::to_render;
pub use plugin::RenderingPlugin;
pub use visual_config::VisualConfig;
