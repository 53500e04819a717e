//! Enemy type definitions loaded from RON files.

use bevy::prelude::*;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::components::{EnemyCategory, EnemyStats};
use crate::world::load_ron_file;

pub const ENEMY_DATA_DIR: &str = "assets/data/enemies";

/// One enemy type, keyed by the RON file stem.
#[derive(Deserialize, Clone, Debug)]
pub struct EnemyDefinition {
    pub name: String,
    #[serde(default = "default_category")]
    pub category: DefinitionCategory,
    /// Raw spawn weight before renormalization. Field types only.
    #[serde(default)]
    pub spawn_rate: f32,
    /// Game time (seconds) at which the type joins the spawn pool.
    #[serde(default)]
    pub unlock_time: f32,
    #[serde(default = "one")]
    pub health_scale: f32,
    #[serde(default = "one")]
    pub speed_scale: f32,
    #[serde(default = "one")]
    pub damage_scale: f32,
    /// Sprite key for the asset cache.
    #[serde(default)]
    pub sprite: String,
    /// Fallback shape colour (linear RGB).
    #[serde(default = "default_color")]
    pub color: (f32, f32, f32),
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DefinitionCategory {
    Field,
    Named,
}

fn default_category() -> DefinitionCategory {
    DefinitionCategory::Field
}

fn one() -> f32 {
    1.0
}

fn default_color() -> (f32, f32, f32) {
    (0.8, 0.8, 0.8)
}

impl EnemyDefinition {
    fn field(name: &str, spawn_rate: f32, unlock_time: f32, color: (f32, f32, f32)) -> Self {
        Self {
            name: name.to_string(),
            category: DefinitionCategory::Field,
            spawn_rate,
            unlock_time,
            health_scale: 1.0,
            speed_scale: 1.0,
            damage_scale: 1.0,
            sprite: String::new(),
            color,
        }
    }

    fn named(name: &str, color: (f32, f32, f32)) -> Self {
        Self {
            category: DefinitionCategory::Named,
            ..Self::field(name, 0.0, 0.0, color)
        }
    }

    /// Apply this type's multipliers to a tier's base stats.
    pub fn scale_stats(&self, base: &EnemyStats) -> EnemyStats {
        EnemyStats {
            max_health: base.max_health * self.health_scale,
            speed: base.speed * self.speed_scale,
            damage: base.damage * self.damage_scale,
            ..base.clone()
        }
    }

    pub fn category(&self) -> EnemyCategory {
        match self.category {
            DefinitionCategory::Field => EnemyCategory::Field,
            DefinitionCategory::Named => EnemyCategory::Named,
        }
    }
}

/// Resource holding all enemy definitions.
#[derive(Resource, Clone, Debug)]
pub struct EnemyRegistry {
    pub definitions: HashMap<String, EnemyDefinition>,
}

impl Default for EnemyRegistry {
    fn default() -> Self {
        let mut definitions = HashMap::new();
        for (id, def) in [
            ("skeleton", EnemyDefinition::field("Skeleton", 0.26, 0.0, (0.85, 0.85, 0.8))),
            ("dokkaebi", EnemyDefinition::field("Dokkaebi", 0.25, 0.0, (0.3, 0.5, 0.9))),
            ("mask", EnemyDefinition::field("Hahoe Mask", 0.26, 60.0, (0.9, 0.75, 0.4))),
            ("maiden_ghost", EnemyDefinition::field("Maiden Ghost", 0.15, 180.0, (0.85, 0.9, 1.0))),
            ("evil_spirit", EnemyDefinition::field("Evil Spirit", 0.08, 300.0, (0.9, 0.25, 0.2))),
            ("dokkaebi_captain", EnemyDefinition::named("Dokkaebi Captain", (0.2, 0.3, 1.0))),
            ("ghost_general", EnemyDefinition::named("Ghost General", (0.7, 0.8, 1.0))),
            ("fox_elder", EnemyDefinition::named("Fox Elder", (1.0, 0.5, 0.2))),
            ("reaper_commander", EnemyDefinition::named("Reaper Commander", (0.4, 0.1, 0.5))),
        ] {
            definitions.insert(id.to_string(), def);
        }
        Self { definitions }
    }
}

impl EnemyRegistry {
    /// Get an enemy definition by type id.
    pub fn get(&self, enemy_type: &str) -> Option<&EnemyDefinition> {
        self.definitions.get(enemy_type)
    }

    /// Field types unlocked at `game_time`, as `(id, raw rate)` sorted by id so
    /// draws are reproducible for a given seed.
    pub fn eligible_field_types(&self, game_time: f32) -> Vec<(&str, f32)> {
        let mut eligible: Vec<(&str, f32)> = self
            .definitions
            .iter()
            .filter(|(_, def)| {
                def.category == DefinitionCategory::Field
                    && def.unlock_time <= game_time
                    && def.spawn_rate > 0.0
            })
            .map(|(id, def)| (id.as_str(), def.spawn_rate))
            .collect();
        eligible.sort_by(|a, b| a.0.cmp(b.0));
        eligible
    }

    /// Named type ids, sorted.
    pub fn named_types(&self) -> Vec<&str> {
        let mut named: Vec<&str> = self
            .definitions
            .iter()
            .filter(|(_, def)| def.category == DefinitionCategory::Named)
            .map(|(id, _)| id.as_str())
            .collect();
        named.sort_unstable();
        named
    }
}

/// Load enemy definitions from `assets/data/enemies/`, layered over the built-in roster.
pub fn load_enemy_definitions(mut registry: ResMut<EnemyRegistry>) {
    let enemies_dir = Path::new(ENEMY_DATA_DIR);

    if !enemies_dir.exists() {
        warn!("Enemy definitions directory not found: {:?}", enemies_dir);
        return;
    }

    let Ok(entries) = fs::read_dir(enemies_dir) else {
        warn!("Failed to read enemy definitions directory");
        return;
    };

    let mut loaded = 0;
    for entry in entries.flatten() {
        let path = entry.path();

        if path.extension().is_some_and(|ext| ext == "ron") {
            let Some(enemy_type) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
                continue;
            };

            match load_ron_file::<EnemyDefinition>(&path) {
                Ok(definition) => {
                    debug!("Loaded enemy definition: {} ({})", definition.name, enemy_type);
                    registry.definitions.insert(enemy_type, definition);
                    loaded += 1;
                }
                Err(e) => {
                    error!("Skipping enemy definition: {}", e);
                }
            }
        }
    }

    info!("Loaded {} enemy definitions ({} known types)", loaded, registry.definitions.len());
}
