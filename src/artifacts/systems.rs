//! The bounded artifact collection and its event fan-out.

use bevy::prelude::*;
use rand::RngCore;

use super::components::{Artifact, ArtifactContext};
use crate::combat::WeaponCategory;
use crate::core::EnemyKilledEvent;
use crate::enemies::Enemy;
use crate::player::Player;

pub const MAX_ARTIFACTS: usize = 4;

/// Held artifacts in pickup order. Hooks run in that order.
#[derive(Resource, Default)]
pub struct ArtifactSystem {
    artifacts: Vec<Box<dyn Artifact>>,
}

impl ArtifactSystem {
    /// Activate and keep `artifact`. False when full or already held.
    pub fn add(&mut self, mut artifact: Box<dyn Artifact>, player: &mut Player) -> bool {
        let id = artifact.data().id;
        if self.artifacts.len() >= MAX_ARTIFACTS {
            warn!("Artifact slots full, {} not added", id);
            return false;
        }
        if self.has(id) {
            warn!("Artifact {} already held", id);
            return false;
        }
        artifact.activate(player);
        info!("Artifact acquired: {}", artifact.data().name);
        self.artifacts.push(artifact);
        true
    }

    pub fn remove(&mut self, id: &str, player: &mut Player) -> bool {
        let Some(index) = self.artifacts.iter().position(|a| a.data().id == id) else {
            return false;
        };
        let mut artifact = self.artifacts.remove(index);
        artifact.deactivate(player);
        true
    }

    pub fn has(&self, id: &str) -> bool {
        self.artifacts.iter().any(|a| a.data().id == id)
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.artifacts.iter().map(|a| a.data().id).collect()
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.artifacts.len() >= MAX_ARTIFACTS
    }

    pub fn update(&mut self, ctx: &mut ArtifactContext) {
        for artifact in &mut self.artifacts {
            artifact.update(ctx);
        }
    }

    pub fn trigger_kill(&mut self, kill: &EnemyKilledEvent, player: &mut Player) {
        for artifact in &mut self.artifacts {
            artifact.on_kill(kill, player);
        }
    }

    pub fn trigger_hit(&mut self, enemy: &mut Enemy, damage: f32, category: WeaponCategory, rng: &mut dyn RngCore) {
        for artifact in &mut self.artifacts {
            if artifact.data().reacts_to(category) {
                artifact.on_hit(enemy, damage, category, rng);
            }
        }
    }

    /// Pass incoming damage through every artifact in order.
    pub fn trigger_take_damage(&mut self, damage: f32, player: &mut Player) -> f32 {
        self.artifacts
            .iter_mut()
            .fold(damage, |amount, artifact| artifact.on_take_damage(amount, player))
    }

    pub fn trigger_level_up(&mut self, level: u32, player: &mut Player) {
        for artifact in &mut self.artifacts {
            artifact.on_level_up(level, player);
        }
    }

    /// Deactivate everything and empty the collection.
    pub fn cleanup(&mut self, player: &mut Player) {
        for mut artifact in self.artifacts.drain(..) {
            artifact.deactivate(player);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::{ArtifactCategory, ArtifactData, Rarity};

    struct Dampener {
        data: ArtifactData,
    }

    impl Dampener {
        fn boxed(id: &'static str) -> Box<dyn Artifact> {
            Box::new(Self {
                data: ArtifactData {
                    id,
                    name: id,
                    tier: 1,
                    rarity: Rarity::Common,
                    category: ArtifactCategory::Defensive,
                    description: "",
                    weapon_categories: &[],
                },
            })
        }
    }

    impl Artifact for Dampener {
        fn data(&self) -> &ArtifactData {
            &self.data
        }

        fn on_take_damage(&mut self, damage: f32, _player: &mut Player) -> f32 {
            damage * 0.9
        }
    }

    #[test]
    fn damage_chains_through_every_artifact() {
        let mut player = Player::default();
        let mut system = ArtifactSystem::default();
        for id in ["a", "b", "c"] {
            assert!(system.add(Dampener::boxed(id), &mut player));
        }
        let result = system.trigger_take_damage(100.0, &mut player);
        assert!((result - 72.9).abs() < 1e-3);
    }

    #[test]
    fn capacity_and_duplicates_are_rejected() {
        let mut player = Player::default();
        let mut system = ArtifactSystem::default();
        assert!(system.add(Dampener::boxed("a"), &mut player));
        assert!(!system.add(Dampener::boxed("a"), &mut player));
        for id in ["b", "c", "d"] {
            assert!(system.add(Dampener::boxed(id), &mut player));
        }
        assert!(system.is_full());
        assert!(!system.add(Dampener::boxed("e"), &mut player));
        assert_eq!(system.ids(), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn remove_and_cleanup() {
        let mut player = Player::default();
        let mut system = ArtifactSystem::default();
        system.add(Dampener::boxed("a"), &mut player);
        system.add(Dampener::boxed("b"), &mut player);
        assert!(system.remove("a", &mut player));
        assert!(!system.remove("a", &mut player));
        system.cleanup(&mut player);
        assert!(system.is_empty());
        assert_eq!(system.trigger_take_damage(10.0, &mut player), 10.0);
    }
}
