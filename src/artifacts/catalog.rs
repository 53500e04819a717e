//! Every artifact the game can hand out.

use rand::{Rng, RngCore};
use std::collections::BTreeMap;

use super::components::*;
use crate::combat::WeaponCategory;
use crate::core::EnemyKilledEvent;
use crate::enemies::{Enemy, StatusEffectKind};
use crate::player::Player;
use crate::world::{circle_overlap, distance_squared};

pub const CHUKSAL: ArtifactData = ArtifactData {
    id: "chuksal",
    name: "Chuksal",
    tier: 3,
    rarity: Rarity::Epic,
    category: ArtifactCategory::Offensive,
    description: "+1% damage per kill (max 50%). Taking damage loses every stack.",
    weapon_categories: &[],
};

pub const EXECUTIONER_AXE: ArtifactData = ArtifactData {
    id: "executioner_axe",
    name: "Executioner's Axe",
    tier: 3,
    rarity: Rarity::Epic,
    category: ArtifactCategory::Offensive,
    description: "[Melee] Field enemies at 20% health or less are executed.",
    weapon_categories: &[WeaponCategory::Melee],
};

pub const FOX_TEAR: ArtifactData = ArtifactData {
    id: "fox_tear",
    name: "Fox Tear",
    tier: 2,
    rarity: Rarity::Rare,
    category: ArtifactCategory::Debuff,
    description: "[Projectile] 10% chance to charm a field enemy for 5s (max 10).",
    weapon_categories: &[WeaponCategory::Projectile],
};

pub const TALRYEONG_MASK: ArtifactData = ArtifactData {
    id: "talryeong_mask",
    name: "Talryeong Mask",
    tier: 3,
    rarity: Rarity::Epic,
    category: ArtifactCategory::Offensive,
    description: "Every 50 kills: 5s berserk with 5x damage. 30s cooldown.",
    weapon_categories: &[],
};

const fn evolution(id: &'static str, name: &'static str, description: &'static str) -> ArtifactData {
    ArtifactData {
        id,
        name,
        tier: 2,
        rarity: Rarity::Legendary,
        category: ArtifactCategory::Evolution,
        description,
        weapon_categories: &[],
    }
}

pub static EVOLUTION_ARTIFACTS: [ArtifactData; 6] = [
    evolution("fine_line_mirror", "Fine-Line Mirror", "Evolves the Talisman at level 7."),
    evolution("baekje_incense_burner", "Baekje Incense Burner", "Evolves the Jakdu Blade at level 7."),
    evolution("crown_of_silla", "Crown of Silla", "Evolves Dokkaebi Fire at level 7."),
    evolution("pensive_buddha", "Pensive Bodhisattva", "Evolves the Moktak at level 7."),
    evolution("celestial_horse", "Celestial Horse", "Evolves Fan Wind at level 7."),
    evolution("celadon_crane_vase", "Celadon Crane Vase", "Evolves the Purifying Water at level 7."),
];

/// Ids of the artifacts with behaviour, in catalog order.
pub const PASSIVE_ARTIFACT_IDS: [&str; 4] = [CHUKSAL.id, EXECUTIONER_AXE.id, FOX_TEAR.id, TALRYEONG_MASK.id];

pub fn artifact_data(id: &str) -> Option<&'static ArtifactData> {
    [&CHUKSAL, &EXECUTIONER_AXE, &FOX_TEAR, &TALRYEONG_MASK]
        .into_iter()
        .chain(EVOLUTION_ARTIFACTS.iter())
        .find(|data| data.id == id)
}

/// `Some(true)` for evolution artifacts, `Some(false)` for other known ids.
pub fn is_evolution_artifact(id: &str) -> Option<bool> {
    artifact_data(id).map(|data| data.category == ArtifactCategory::Evolution)
}

pub fn create_artifact(id: &str) -> Option<Box<dyn Artifact>> {
    let artifact: Box<dyn Artifact> = match id {
        "chuksal" => Box::new(Chuksal::default()),
        "executioner_axe" => Box::new(ExecutionerAxe),
        "fox_tear" => Box::new(FoxTear::default()),
        "talryeong_mask" => Box::new(TalryeongMask::default()),
        other => Box::new(EvolutionArtifact {
            data: artifact_data(other).filter(|d| d.category == ArtifactCategory::Evolution)?,
        }),
    };
    Some(artifact)
}

/// Stacking damage bonus that resets when the player is hit.
#[derive(Default)]
pub struct Chuksal {
    stacks: u32,
}

impl Chuksal {
    const MAX_STACKS: u32 = 50;
    const BONUS_PER_STACK: f32 = 0.01;

    pub fn stacks(&self) -> u32 {
        self.stacks
    }

    fn drop_stacks(&mut self, player: &mut Player) {
        player.bonus_damage -= self.stacks as f32 * Self::BONUS_PER_STACK;
        self.stacks = 0;
    }
}

impl Artifact for Chuksal {
    fn data(&self) -> &ArtifactData {
        &CHUKSAL
    }

    fn deactivate(&mut self, player: &mut Player) {
        self.drop_stacks(player);
    }

    fn on_kill(&mut self, _kill: &EnemyKilledEvent, player: &mut Player) {
        if self.stacks < Self::MAX_STACKS {
            self.stacks += 1;
            player.bonus_damage += Self::BONUS_PER_STACK;
        }
    }

    fn on_take_damage(&mut self, damage: f32, player: &mut Player) -> f32 {
        if damage > 0.0 && self.stacks > 0 {
            self.drop_stacks(player);
        }
        damage
    }
}

/// Finishes weakened field enemies hit by melee.
pub struct ExecutionerAxe;

impl ExecutionerAxe {
    const THRESHOLD: f32 = 0.2;
}

impl Artifact for ExecutionerAxe {
    fn data(&self) -> &ArtifactData {
        &EXECUTIONER_AXE
    }

    fn on_hit(&mut self, enemy: &mut Enemy, _damage: f32, _category: WeaponCategory, _rng: &mut dyn RngCore) {
        if enemy.tier.is_field() && enemy.is_alive() && enemy.health_fraction() <= Self::THRESHOLD {
            let remaining = enemy.health;
            enemy.take_damage(remaining);
        }
    }
}

/// Charms field enemies hit by projectiles. Charmed enemies fight for the player.
#[derive(Default)]
pub struct FoxTear {
    /// Charmed enemy id -> seconds since its last strike.
    charmed: BTreeMap<String, f32>,
}

impl FoxTear {
    const CHANCE: f32 = 0.1;
    const DURATION: f32 = 5.0;
    const MAX_CHARMED: usize = 10;
    const ATTACK_INTERVAL: f32 = 1.0;
    const ATTACK_RANGE: f32 = 200.0;

    pub fn charmed_count(&self) -> usize {
        self.charmed.len()
    }

    fn nearest_hostile(enemies: &[Enemy], from: usize) -> Option<usize> {
        let origin = enemies[from].position;
        enemies
            .iter()
            .enumerate()
            .filter(|(i, e)| *i != from && e.active && e.is_alive() && !e.has_status(StatusEffectKind::Charmed))
            .min_by(|a, b| distance_squared(origin, a.1.position).total_cmp(&distance_squared(origin, b.1.position)))
            .map(|(i, _)| i)
    }
}

impl Artifact for FoxTear {
    fn data(&self) -> &ArtifactData {
        &FOX_TEAR
    }

    fn deactivate(&mut self, _player: &mut Player) {
        self.charmed.clear();
    }

    fn on_hit(&mut self, enemy: &mut Enemy, _damage: f32, _category: WeaponCategory, rng: &mut dyn RngCore) {
        if !enemy.tier.is_field()
            || !enemy.is_alive()
            || enemy.has_status(StatusEffectKind::Charmed)
            || self.charmed.len() >= Self::MAX_CHARMED
        {
            return;
        }
        if rng.gen::<f32>() < Self::CHANCE {
            enemy.add_status(StatusEffectKind::Charmed, Self::DURATION, FOX_TEAR.id);
            self.charmed.insert(enemy.id.clone(), 0.0);
        }
    }

    fn update(&mut self, ctx: &mut ArtifactContext) {
        let enemies = &mut *ctx.enemies;
        self.charmed.retain(|id, _| {
            enemies
                .iter()
                .any(|e| &e.id == id && e.active && e.is_alive() && e.has_status(StatusEffectKind::Charmed))
        });

        for (id, since_strike) in self.charmed.iter_mut() {
            *since_strike += ctx.delta;
            let Some(index) = enemies.iter().position(|e| &e.id == id) else {
                continue;
            };
            let Some(target) = Self::nearest_hostile(enemies, index) else {
                enemies[index].target = None;
                continue;
            };
            let (position, damage) = (enemies[index].position, enemies[index].damage);
            enemies[index].target = Some(enemies[target].position);

            let victim = &mut enemies[target];
            if *since_strike >= Self::ATTACK_INTERVAL && circle_overlap(position, Self::ATTACK_RANGE, victim.position, victim.radius) {
                *since_strike = 0.0;
                victim.take_damage(damage);
                if !victim.is_alive() && !ctx.casualties.contains(&target) {
                    ctx.casualties.push(target);
                }
            }
        }
    }
}

/// Kill-count berserk.
#[derive(Default)]
pub struct TalryeongMask {
    kills: u32,
    berserk_timer: f32,
    cooldown_timer: f32,
}

impl TalryeongMask {
    const KILLS_REQUIRED: u32 = 50;
    const BERSERK_DURATION: f32 = 5.0;
    const BERSERK_MULTIPLIER: f32 = 5.0;
    const COOLDOWN: f32 = 30.0;

    pub fn is_berserk(&self) -> bool {
        self.berserk_timer > 0.0
    }

    fn end_berserk(&mut self, player: &mut Player) {
        self.berserk_timer = 0.0;
        player.frenzy_multiplier = 1.0;
    }
}

impl Artifact for TalryeongMask {
    fn data(&self) -> &ArtifactData {
        &TALRYEONG_MASK
    }

    fn deactivate(&mut self, player: &mut Player) {
        if self.is_berserk() {
            self.end_berserk(player);
        }
    }

    fn on_kill(&mut self, _kill: &EnemyKilledEvent, player: &mut Player) {
        if self.is_berserk() || self.cooldown_timer > 0.0 {
            return;
        }
        self.kills += 1;
        if self.kills >= Self::KILLS_REQUIRED {
            self.kills = 0;
            self.berserk_timer = Self::BERSERK_DURATION;
            player.frenzy_multiplier = Self::BERSERK_MULTIPLIER;
            bevy::log::info!("Talryeong Mask: berserk");
        }
    }

    fn update(&mut self, ctx: &mut ArtifactContext) {
        if self.cooldown_timer > 0.0 {
            self.cooldown_timer = (self.cooldown_timer - ctx.delta).max(0.0);
        }
        if self.is_berserk() {
            self.berserk_timer -= ctx.delta;
            if self.berserk_timer <= 0.0 {
                self.end_berserk(ctx.player);
                self.cooldown_timer = Self::COOLDOWN;
            }
        }
    }
}

/// Data-only artifact consumed by weapon evolution.
pub struct EvolutionArtifact {
    data: &'static ArtifactData,
}

impl Artifact for EvolutionArtifact {
    fn data(&self) -> &ArtifactData {
        self.data
    }
}
