//! Artifact descriptors and the behaviour trait every artifact implements.

use rand::RngCore;

use crate::combat::WeaponCategory;
use crate::core::EnemyKilledEvent;
use crate::enemies::Enemy;
use crate::player::Player;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactCategory {
    Offensive,
    Defensive,
    Utility,
    Debuff,
    Evolution,
}

/// Immutable description of an artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactData {
    pub id: &'static str,
    pub name: &'static str,
    /// 1 (weakest) to 4.
    pub tier: u8,
    pub rarity: Rarity,
    pub category: ArtifactCategory,
    pub description: &'static str,
    /// Weapon categories whose hits this artifact reacts to. Empty means all.
    pub weapon_categories: &'static [WeaponCategory],
}

impl ArtifactData {
    pub fn reacts_to(&self, category: WeaponCategory) -> bool {
        self.weapon_categories.is_empty() || self.weapon_categories.contains(&category)
    }
}

/// What an artifact may touch during its per-frame update.
pub struct ArtifactContext<'a> {
    pub delta: f32,
    pub player: &'a mut Player,
    pub enemies: &'a mut [Enemy],
    /// Indices into `enemies` brought to zero health by artifact effects.
    pub casualties: &'a mut Vec<usize>,
}

/// A passive modifier. Every hook is optional.
pub trait Artifact: Send + Sync {
    fn data(&self) -> &ArtifactData;

    fn activate(&mut self, _player: &mut Player) {}

    /// Undo whatever `activate` and later hooks changed on the player.
    fn deactivate(&mut self, _player: &mut Player) {}

    fn update(&mut self, _ctx: &mut ArtifactContext) {}

    fn on_kill(&mut self, _kill: &EnemyKilledEvent, _player: &mut Player) {}

    /// Called after a player weapon damaged `enemy`, before its death is evaluated.
    fn on_hit(&mut self, _enemy: &mut Enemy, _damage: f32, _category: WeaponCategory, _rng: &mut dyn RngCore) {}

    /// Returns the damage to pass on to the next artifact.
    fn on_take_damage(&mut self, damage: f32, _player: &mut Player) -> f32 {
        damage
    }

    fn on_level_up(&mut self, _level: u32, _player: &mut Player) {}
}
