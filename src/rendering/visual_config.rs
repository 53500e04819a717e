//! Palette loaded from an external RON file.
//!
//! Allows tweaking fallback colours without recompilation.

use bevy::prelude::*;
use serde::Deserialize;
use std::path::Path;

use crate::world::{load_ron_file, DataLoadError};

pub const VISUAL_CONFIG_PATH: &str = "assets/data/rendering/visual_config.ron";

type Rgb = (f32, f32, f32);

/// Visual configuration loaded from `assets/data/rendering/visual_config.ron`.
#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VisualConfig {
    pub clear_color: Rgb,
    pub world_border: Rgb,
    pub player: Rgb,
    /// Player tint while invincible.
    pub player_invincible: Rgb,
    pub hit_flash: Rgb,
    pub charmed: Rgb,
    pub projectile: Rgb,
    pub area: Rgb,
    pub melee: Rgb,
    pub named_projectile: Rgb,
    pub boss_bullet: Rgb,
    pub fireball: Rgb,
    pub fire_zone: Rgb,
    pub warning: Rgb,
    pub lightning: Rgb,
    pub xp_gem: Rgb,
    pub potion: Rgb,
    pub chest: Rgb,
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            clear_color: (0.07, 0.08, 0.06),
            world_border: (0.3, 0.3, 0.35),
            player: (0.95, 0.9, 0.7),
            player_invincible: (1.0, 1.0, 1.0),
            hit_flash: (1.0, 1.0, 1.0),
            charmed: (1.0, 0.4, 0.8),
            projectile: (1.0, 0.85, 0.3),
            area: (0.6, 0.8, 1.0),
            melee: (0.9, 0.9, 0.95),
            named_projectile: (0.7, 0.3, 1.0),
            boss_bullet: (0.5, 0.8, 1.0),
            fireball: (1.0, 0.45, 0.1),
            fire_zone: (1.0, 0.3, 0.05),
            warning: (1.0, 0.15, 0.15),
            lightning: (0.8, 0.9, 1.0),
            xp_gem: (0.3, 0.9, 0.5),
            potion: (0.95, 0.2, 0.3),
            chest: (0.85, 0.65, 0.2),
        }
    }
}

/// sRGB colour from a config tuple.
pub fn rgb((r, g, b): Rgb) -> Color {
    Color::srgb(r, g, b)
}

impl VisualConfig {
    /// Load the palette, falling back to defaults on any failure.
    pub fn load() -> Self {
        match load_ron_file(Path::new(VISUAL_CONFIG_PATH)) {
            Ok(config) => {
                info!("Loaded visual config from {}", VISUAL_CONFIG_PATH);
                config
            }
            Err(DataLoadError::FileNotFound(path)) => {
                warn!("Could not find {}. Using defaults.", path);
                Self::default()
            }
            Err(e) => {
                error!("{}. Using defaults.", e);
                Self::default()
            }
        }
    }
}

/// System to load visual config at startup.
pub fn load_visual_config(mut commands: Commands) {
    let config = VisualConfig::load();
    commands.insert_resource(ClearColor(rgb(config.clear_color)));
    commands.insert_resource(config);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_palette_keeps_defaults() {
        let config: VisualConfig = ron::from_str("(player: (0.1, 0.2, 0.3))").expect("parse");
        assert_eq!(config.player, (0.1, 0.2, 0.3));
        assert_eq!(config.potion, VisualConfig::default().potion);
    }
}
