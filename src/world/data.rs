//! Balance data and RON loading.
//!
//! All tunable numbers live in `assets/data/balance.ron`. Every section has a
//! `Default` that mirrors the shipped file, so a missing or partial file still
//! yields a playable configuration.

use bevy::prelude::*;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use super::error::DataLoadError;
use super::geometry::WorldBounds;
use crate::boss::BossBalance;
use crate::combat::{KnockbackBalance, WeaponBalanceTable};
use crate::enemies::{NamedBalance, SpawnBalance, TierStatsTable};
use crate::player::PlayerBalance;
use crate::progression::{PotionBalance, XpBalance};

pub const BALANCE_PATH: &str = "assets/data/balance.ron";

/// World, screen, and pacing constants.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorldBalance {
    pub width: f32,
    pub height: f32,
    pub screen_width: f32,
    pub screen_height: f32,
    pub camera_zoom: f32,
    /// Strips along the world edges where nothing may spawn.
    pub border_left: f32,
    pub border_right: f32,
    pub border_bottom: f32,
    /// Seconds between calls to the spawn-rate ramp.
    pub difficulty_increase_interval: f32,
    /// Run length; the boss arrives `boss.lead_time` seconds earlier.
    pub victory_time: f32,
    /// Player projectiles alive at once.
    pub projectile_cap: usize,
    /// Projectiles die this far outside the world.
    pub out_of_bounds_margin: f32,
}

impl Default for WorldBalance {
    fn default() -> Self {
        Self {
            width: 3200.0,
            height: 2400.0,
            screen_width: 1280.0,
            screen_height: 720.0,
            camera_zoom: 0.6,
            border_left: 160.0,
            border_right: 160.0,
            border_bottom: 160.0,
            difficulty_increase_interval: 10.0,
            victory_time: 600.0,
            projectile_cap: 500,
            out_of_bounds_margin: 100.0,
        }
    }
}

impl WorldBalance {
    pub fn bounds(&self) -> WorldBounds {
        WorldBounds::new(self.width, self.height)
    }

    /// Visible world extent once the camera zoom is applied.
    pub fn view_size(&self) -> Vec2 {
        let zoom = if self.camera_zoom > 0.0 { self.camera_zoom } else { 1.0 };
        Vec2::new(self.screen_width / zoom, self.screen_height / zoom)
    }
}

/// Every tunable section, loaded from one file.
#[derive(Resource, Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Balance {
    pub world: WorldBalance,
    pub spawn: SpawnBalance,
    pub tiers: TierStatsTable,
    pub named: NamedBalance,
    pub player: PlayerBalance,
    pub knockback: KnockbackBalance,
    pub weapons: WeaponBalanceTable,
    pub potion: PotionBalance,
    pub xp: XpBalance,
    pub boss: BossBalance,
}

/// Read and parse one RON file.
pub fn load_ron_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let display = path.display().to_string();
    if !path.exists() {
        return Err(DataLoadError::FileNotFound(display));
    }
    let contents = fs::read_to_string(path).map_err(|e| DataLoadError::ReadError {
        path: display.clone(),
        details: e.to_string(),
    })?;
    ron::from_str(&contents).map_err(|e| DataLoadError::ParseError {
        path: display,
        details: e.to_string(),
    })
}

/// Load and validate the balance file.
pub fn load_balance_file(path: &Path) -> Result<Balance, DataLoadError> {
    let balance: Balance = load_ron_file(path)?;
    let errors = balance.spawn.validate_phases();
    if let Some(first) = errors.first() {
        return Err(DataLoadError::Invalid {
            path: path.display().to_string(),
            details: first.to_string(),
        });
    }
    Ok(balance)
}

/// Replace the balance resource with the file contents, keeping defaults on failure.
pub fn load_balance(mut balance: ResMut<Balance>) {
    match load_balance_file(Path::new(BALANCE_PATH)) {
        Ok(loaded) => {
            info!("Loaded balance data from {}", BALANCE_PATH);
            *balance = loaded;
        }
        Err(DataLoadError::FileNotFound(path)) => {
            warn!("Balance file not found ({}), using built-in defaults", path);
        }
        Err(e) => {
            error!("{}; using built-in defaults", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults_for_missing_sections() {
        let balance: Balance = ron::from_str("(world: (width: 4000.0))").expect("parse");
        assert_eq!(balance.world.width, 4000.0);
        assert_eq!(balance.world.height, 2400.0);
        assert_eq!(balance.spawn.max_active_enemies, SpawnBalance::default().max_active_enemies);
    }

    #[test]
    fn missing_file_is_reported() {
        let result = load_balance_file(Path::new("assets/data/does_not_exist.ron"));
        assert!(matches!(result, Err(DataLoadError::FileNotFound(_))));
    }

    #[test]
    fn shipped_balance_file_parses() {
        let balance = load_balance_file(Path::new(BALANCE_PATH)).expect("shipped balance parses");
        assert_eq!(balance.spawn.tier_phases.len(), 6);
    }

    #[test]
    fn view_size_accounts_for_zoom() {
        let world = WorldBalance::default();
        let view = world.view_size();
        assert!((view.x - 1280.0 / 0.6).abs() < 1e-3);
    }
}
