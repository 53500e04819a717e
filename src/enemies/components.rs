//! Enemy simulation data.

use bevy::prelude::*;
use serde::Deserialize;

use crate::combat::KnockbackBalance;
use crate::world::{direction, normalize, CircleBody};

/// How long an enemy flashes after taking damage.
pub const HIT_FLASH_DURATION: f32 = 0.1;

/// Strength bracket. Field enemies are `Low`, `Medium` and `High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum EnemyTier {
    Low,
    Medium,
    High,
    Named,
    Boss,
}

/// Broad grouping used by artifacts and spawners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnemyCategory {
    Field,
    Named,
    Boss,
}

impl EnemyTier {
    pub fn category(self) -> EnemyCategory {
        match self {
            EnemyTier::Low | EnemyTier::Medium | EnemyTier::High => EnemyCategory::Field,
            EnemyTier::Named => EnemyCategory::Named,
            EnemyTier::Boss => EnemyCategory::Boss,
        }
    }

    pub fn is_field(self) -> bool {
        self.category() == EnemyCategory::Field
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusEffectKind {
    /// Fights for the player and deals no contact damage.
    Charmed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusEffect {
    pub kind: StatusEffectKind,
    pub remaining: f32,
    /// Id of whatever applied it.
    pub source: String,
}

/// Base numbers for one tier.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnemyStats {
    pub max_health: f32,
    pub speed: f32,
    pub damage: f32,
    pub radius: f32,
    pub xp_drop: u32,
    /// Multiplier on incoming knockback (1.0 = full, 0.2 = mostly immune).
    pub knockback_resistance: f32,
}

impl Default for EnemyStats {
    fn default() -> Self {
        Self {
            max_health: 30.0,
            speed: 100.0,
            damage: 10.0,
            radius: 30.0,
            xp_drop: 5,
            knockback_resistance: 1.0,
        }
    }
}

/// Per-tier base stats for field enemies and the boss.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TierStatsTable {
    pub low: EnemyStats,
    pub medium: EnemyStats,
    pub high: EnemyStats,
    pub boss: EnemyStats,
}

impl Default for TierStatsTable {
    fn default() -> Self {
        Self {
            low: EnemyStats::default(),
            medium: EnemyStats {
                max_health: 60.0,
                speed: 90.0,
                damage: 15.0,
                radius: 34.0,
                xp_drop: 12,
                knockback_resistance: 0.8,
            },
            high: EnemyStats {
                max_health: 100.0,
                speed: 80.0,
                damage: 20.0,
                radius: 40.0,
                xp_drop: 25,
                knockback_resistance: 0.6,
            },
            boss: EnemyStats {
                max_health: 75000.0,
                speed: 90.0,
                damage: 60.0,
                radius: 180.0,
                xp_drop: 1000,
                knockback_resistance: 0.2,
            },
        }
    }
}

impl TierStatsTable {
    /// Stats for a field tier. Named enemies use their own table.
    pub fn for_tier(&self, tier: EnemyTier) -> &EnemyStats {
        match tier {
            EnemyTier::Low | EnemyTier::Named => &self.low,
            EnemyTier::Medium => &self.medium,
            EnemyTier::High => &self.high,
            EnemyTier::Boss => &self.boss,
        }
    }
}

/// One simulated enemy.
///
/// Damage only lowers `health`. Whoever lands the killing blow is
/// responsible for clearing `active`; the cleanup pass then drops it.
#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: String,
    /// Type id from the enemy registry (`skeleton`, `dokkaebi_captain`, ...).
    pub kind: String,
    pub tier: EnemyTier,
    pub position: Vec2,
    pub radius: f32,
    pub active: bool,
    pub health: f32,
    pub max_health: f32,
    pub speed: f32,
    pub damage: f32,
    pub xp_drop: u32,
    pub knockback_resistance: f32,
    /// Remaining knockback velocity.
    pub knockback: Vec2,
    pub status_effects: Vec<StatusEffect>,
    /// Seconds of hit flash left.
    pub flash_timer: f32,
    /// Where the enemy is walking; usually the player.
    pub target: Option<Vec2>,
}

impl Enemy {
    pub fn new(id: impl Into<String>, kind: impl Into<String>, tier: EnemyTier, position: Vec2, stats: &EnemyStats) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            tier,
            position,
            radius: stats.radius,
            active: true,
            health: stats.max_health,
            max_health: stats.max_health,
            speed: stats.speed,
            damage: stats.damage,
            xp_drop: stats.xp_drop,
            knockback_resistance: stats.knockback_resistance,
            knockback: Vec2::ZERO,
            status_effects: Vec::new(),
            flash_timer: 0.0,
            target: None,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    /// Lower health (never below zero) and start the hit flash.
    /// Returns the damage actually absorbed.
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        let actual = amount.max(0.0).min(self.health);
        self.health -= actual;
        self.flash_timer = HIT_FLASH_DURATION;
        actual
    }

    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0.0 {
            0.0
        } else {
            self.health / self.max_health
        }
    }

    /// Push the enemy along `direction`, scaled by its resistance.
    pub fn apply_knockback(&mut self, direction: Vec2, force: f32) {
        let dir = normalize(direction);
        self.knockback = dir * force * self.knockback_resistance;
    }

    pub fn is_knocked_back(&self) -> bool {
        self.knockback != Vec2::ZERO
    }

    /// Slide along the knockback velocity with friction.
    /// Returns true while knockback is still in effect.
    pub fn update_knockback(&mut self, delta: f32, balance: &KnockbackBalance) -> bool {
        if !self.is_knocked_back() {
            return false;
        }
        self.position += self.knockback * delta;
        self.knockback *= (1.0 - balance.friction * delta).max(0.0);
        if self.knockback.length_squared() < balance.min_velocity * balance.min_velocity {
            self.knockback = Vec2::ZERO;
        }
        true
    }

    /// Walk toward the current target.
    pub fn chase(&mut self, delta: f32) {
        if let Some(target) = self.target {
            self.position += direction(self.position, target) * self.speed * delta;
        }
    }

    pub fn has_status(&self, kind: StatusEffectKind) -> bool {
        self.status_effects.iter().any(|effect| effect.kind == kind)
    }

    /// Add an effect, refreshing the duration if it is already present.
    pub fn add_status(&mut self, kind: StatusEffectKind, duration: f32, source: &str) {
        if let Some(existing) = self.status_effects.iter_mut().find(|e| e.kind == kind) {
            existing.remaining = existing.remaining.max(duration);
            return;
        }
        self.status_effects.push(StatusEffect {
            kind,
            remaining: duration,
            source: source.to_string(),
        });
    }

    pub fn remove_status(&mut self, kind: StatusEffectKind) {
        self.status_effects.retain(|effect| effect.kind != kind);
    }

    /// Count down timed effects and the hit flash.
    pub fn tick_timers(&mut self, delta: f32) {
        for effect in &mut self.status_effects {
            effect.remaining -= delta;
        }
        self.status_effects.retain(|effect| effect.remaining > 0.0);
        self.flash_timer = (self.flash_timer - delta).max(0.0);
    }

    pub fn is_flashing(&self) -> bool {
        self.flash_timer > 0.0
    }
}

impl CircleBody for Enemy {
    fn center(&self) -> Vec2 {
        self.position
    }

    fn radius(&self) -> f32 {
        self.radius
    }
}

/// Every field and named enemy in the current run, in spawn order.
#[derive(Resource, Default, Debug)]
pub struct EnemyRoster {
    pub enemies: Vec<Enemy>,
}

impl EnemyRoster {
    /// Enemies that still count toward the population cap.
    pub fn active_count(&self) -> usize {
        self.enemies.iter().filter(|e| e.active).count()
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|e| e.id == id)
    }

    /// Drop every inactive enemy. Returns how many were removed.
    pub fn sweep(&mut self) -> usize {
        let before = self.enemies.len();
        self.enemies.retain(|e| e.active);
        before - self.enemies.len()
    }

    pub fn clear(&mut self) {
        self.enemies.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skeleton() -> Enemy {
        Enemy::new("enemy_0", "skeleton", EnemyTier::Low, Vec2::new(100.0, 100.0), &EnemyStats::default())
    }

    #[test]
    fn damage_clamps_health_and_leaves_active_alone() {
        let mut enemy = skeleton();
        let absorbed = enemy.take_damage(45.0);
        assert_eq!(absorbed, 30.0);
        assert_eq!(enemy.health, 0.0);
        assert!(!enemy.is_alive());
        assert!(enemy.active);
        assert!(enemy.is_flashing());
    }

    #[test]
    fn hit_flash_fades_with_time() {
        let mut enemy = skeleton();
        enemy.take_damage(1.0);
        enemy.tick_timers(0.05);
        assert!(enemy.is_flashing());
        enemy.tick_timers(0.06);
        assert!(!enemy.is_flashing());
    }

    #[test]
    fn knockback_decays_to_rest() {
        let balance = KnockbackBalance::default();
        let mut enemy = skeleton();
        enemy.apply_knockback(Vec2::new(3.0, 0.0), 150.0);
        assert_eq!(enemy.knockback, Vec2::new(150.0, 0.0));

        let start = enemy.position;
        let mut frames = 0;
        while enemy.update_knockback(1.0 / 60.0, &balance) {
            frames += 1;
            assert!(frames < 1000, "knockback never settled");
        }
        assert!(enemy.position.x > start.x);
        assert_eq!(enemy.position.y, start.y);
    }

    #[test]
    fn resistance_scales_knockback() {
        let mut enemy = skeleton();
        enemy.knockback_resistance = 0.2;
        enemy.apply_knockback(Vec2::new(0.0, -1.0), 100.0);
        assert!((enemy.knockback.y + 20.0).abs() < 1e-4);
    }

    #[test]
    fn status_effects_expire() {
        let mut enemy = skeleton();
        enemy.add_status(StatusEffectKind::Charmed, 1.0, "fox_tear");
        enemy.add_status(StatusEffectKind::Charmed, 0.5, "fox_tear");
        assert_eq!(enemy.status_effects.len(), 1);
        enemy.tick_timers(0.6);
        assert!(enemy.has_status(StatusEffectKind::Charmed));
        enemy.tick_timers(0.5);
        assert!(!enemy.has_status(StatusEffectKind::Charmed));
    }

    #[test]
    fn sweep_removes_only_inactive() {
        let mut roster = EnemyRoster::default();
        roster.enemies.push(skeleton());
        let mut dead = skeleton();
        dead.id = "enemy_1".into();
        dead.active = false;
        roster.enemies.push(dead);
        assert_eq!(roster.active_count(), 1);
        assert_eq!(roster.sweep(), 1);
        assert_eq!(roster.enemies[0].id, "enemy_0");
    }
}
