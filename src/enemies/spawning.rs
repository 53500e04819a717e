//! Regular wave spawning.
//!
//! A wave is a handful of small groups, each entering from a different edge of
//! the view. Tier odds and the unlocked enemy types both depend on elapsed game
//! time, and the wave never pushes the roster past the population cap.

use bevy::prelude::*;
use rand::Rng;
use serde::Deserialize;
use std::f32::consts::TAU;

use super::components::{Enemy, EnemyTier, TierStatsTable};
use super::data::EnemyRegistry;
use crate::world::{ValidationError, WorldBalance};

/// Tier odds from `start` seconds until the next phase begins.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TierPhase {
    pub start: f32,
    pub low: f32,
    pub medium: f32,
    pub high: f32,
}

impl TierPhase {
    const fn new(start: f32, low: f32, medium: f32, high: f32) -> Self {
        Self { start, low, medium, high }
    }

    pub fn sum(&self) -> f32 {
        self.low + self.medium + self.high
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpawnBalance {
    pub initial_interval: f32,
    pub min_interval: f32,
    /// Subtracted from the interval on each difficulty step.
    pub interval_reduction: f32,
    /// Distance beyond the view edge where groups appear.
    pub spawn_margin: f32,
    pub min_group_size: u32,
    pub max_group_size: u32,
    pub min_groups: u32,
    pub max_groups: u32,
    pub cluster_radius: f32,
    /// Seconds of game time per extra group.
    pub group_increase_interval: f32,
    pub max_active_enemies: usize,
    /// Extra clearance added on top of the world border strips.
    pub edge_padding: f32,
    pub tier_phases: Vec<TierPhase>,
}

impl Default for SpawnBalance {
    fn default() -> Self {
        Self {
            initial_interval: 3.0,
            min_interval: 1.0,
            interval_reduction: 0.15,
            spawn_margin: 100.0,
            min_group_size: 1,
            max_group_size: 2,
            min_groups: 1,
            max_groups: 2,
            cluster_radius: 200.0,
            group_increase_interval: 60.0,
            max_active_enemies: 200,
            edge_padding: 50.0,
            tier_phases: vec![
                TierPhase::new(0.0, 1.0, 0.0, 0.0),
                TierPhase::new(60.0, 0.9, 0.1, 0.0),
                TierPhase::new(120.0, 0.8, 0.2, 0.0),
                TierPhase::new(210.0, 0.7, 0.27, 0.03),
                TierPhase::new(300.0, 0.6, 0.35, 0.05),
                TierPhase::new(480.0, 0.5, 0.4, 0.1),
            ],
        }
    }
}

impl SpawnBalance {
    /// Phases must start at zero, strictly increase, and each sum to one.
    pub fn validate_phases(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let mut expected_start = 0.0;
        for (i, phase) in self.tier_phases.iter().enumerate() {
            let out_of_order = if i == 0 {
                phase.start != expected_start
            } else {
                phase.start <= expected_start
            };
            if out_of_order {
                errors.push(ValidationError::PhaseGap(phase.start));
            }
            expected_start = phase.start;
            if (phase.sum() - 1.0).abs() > 1e-4 {
                errors.push(ValidationError::TierSum {
                    start: phase.start,
                    sum: phase.sum(),
                });
            }
        }
        if self.tier_phases.is_empty() {
            errors.push(ValidationError::PhaseGap(0.0));
        }
        errors
    }

    /// The phase in effect at `game_time`.
    pub fn phase_at(&self, game_time: f32) -> Option<&TierPhase> {
        self.tier_phases.iter().rev().find(|phase| phase.start <= game_time)
    }
}

/// Compass side a group enters from. The world's y axis points down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    North,
    East,
    South,
    West,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::North, Side::East, Side::South, Side::West];
}

/// Pick one entry using weights renormalized to sum to one.
pub fn pick_weighted<'a>(candidates: &[(&'a str, f32)], roll: f32) -> Option<&'a str> {
    let total: f32 = candidates.iter().map(|(_, rate)| rate).sum();
    if total <= 0.0 {
        return None;
    }
    let mut cumulative = 0.0;
    for (id, rate) in candidates {
        cumulative += rate / total;
        if roll < cumulative {
            return Some(*id);
        }
    }
    // Rounding can leave the cumulative sum a hair under one.
    candidates.last().map(|(id, _)| *id)
}

/// Wave spawner state for one run.
#[derive(Resource, Debug, Clone)]
pub struct SpawnSystem {
    pub balance: SpawnBalance,
    pub tiers: TierStatsTable,
    pub spawn_timer: f32,
    pub spawn_interval: f32,
    /// Monotonic source of enemy ids.
    pub enemy_counter: u64,
    world: WorldBalance,
}

impl Default for SpawnSystem {
    fn default() -> Self {
        Self::new(SpawnBalance::default(), TierStatsTable::default(), &WorldBalance::default())
    }
}

impl SpawnSystem {
    pub fn new(balance: SpawnBalance, tiers: TierStatsTable, world: &WorldBalance) -> Self {
        Self {
            spawn_interval: balance.initial_interval,
            balance,
            tiers,
            spawn_timer: 0.0,
            enemy_counter: 0,
            world: world.clone(),
        }
    }

    /// Advance the timer and spawn a wave when it elapses.
    /// Returns the number of enemies created.
    pub fn update(
        &mut self,
        delta: f32,
        enemies: &mut Vec<Enemy>,
        game_time: f32,
        player_pos: Vec2,
        registry: &EnemyRegistry,
        rng: &mut impl Rng,
    ) -> usize {
        self.spawn_timer += delta;
        if self.spawn_timer < self.spawn_interval {
            return 0;
        }
        self.spawn_timer = 0.0;
        self.spawn_wave(enemies, game_time, player_pos, registry, rng)
    }

    /// Shorten the spawn interval by one step, never below the floor.
    pub fn increase_spawn_rate(&mut self) {
        self.spawn_interval = (self.spawn_interval - self.balance.interval_reduction).max(self.balance.min_interval);
        debug!("Spawn interval now {:.2}s", self.spawn_interval);
    }

    pub fn group_count(&self, game_time: f32) -> u32 {
        let bonus = if self.balance.group_increase_interval > 0.0 {
            (game_time / self.balance.group_increase_interval).floor().max(0.0) as u32
        } else {
            0
        };
        (self.balance.min_groups + bonus).clamp(self.balance.min_groups, self.balance.max_groups.max(self.balance.min_groups))
    }

    pub fn select_tier(&self, game_time: f32, rng: &mut impl Rng) -> EnemyTier {
        let Some(phase) = self.balance.phase_at(game_time) else {
            return EnemyTier::Low;
        };
        let roll: f32 = rng.gen();
        if roll < phase.low {
            EnemyTier::Low
        } else if roll < phase.low + phase.medium {
            EnemyTier::Medium
        } else {
            EnemyTier::High
        }
    }

    /// Spawn one wave immediately. Returns the number of enemies created.
    pub fn spawn_wave(
        &mut self,
        enemies: &mut Vec<Enemy>,
        game_time: f32,
        player_pos: Vec2,
        registry: &EnemyRegistry,
        rng: &mut impl Rng,
    ) -> usize {
        let active = enemies.iter().filter(|e| e.active).count();
        let cap = self.balance.max_active_enemies;
        if active >= cap {
            debug!("Enemy cap reached ({}/{}), skipping wave", active, cap);
            return 0;
        }

        let eligible = registry.eligible_field_types(game_time);
        if eligible.is_empty() {
            warn!("No enemy types unlocked at {:.0}s, skipping wave", game_time);
            return 0;
        }

        let mut budget = cap - active;
        let group_count = self.group_count(game_time);
        let mut used_sides: Vec<Side> = Vec::with_capacity(4);
        let mut spawned = 0;

        for _ in 0..group_count {
            if budget == 0 {
                break;
            }
            let min_size = self.balance.min_group_size.max(1);
            let max_size = self.balance.max_group_size.max(min_size);
            let group_size = (rng.gen_range(min_size..=max_size) as usize).min(budget);

            let side = self.pick_side(&used_sides, rng);
            used_sides.push(side);
            let center = self.off_screen_center(player_pos, side, rng);

            for _ in 0..group_size {
                let position = self.clustered_position(center, rng);
                let tier = self.select_tier(game_time, rng);
                let roll: f32 = rng.gen();
                let Some(kind) = pick_weighted(&eligible, roll) else {
                    continue;
                };
                let base = self.tiers.for_tier(tier);
                let stats = registry.get(kind).map_or_else(|| base.clone(), |def| def.scale_stats(base));
                let id = format!("enemy_{}", self.enemy_counter);
                self.enemy_counter += 1;

                let mut enemy = Enemy::new(id, kind, tier, position, &stats);
                enemy.target = Some(player_pos);
                enemies.push(enemy);
                spawned += 1;
            }
            budget -= group_size;
        }

        debug!("Wave spawned: {} groups, {} enemies", group_count, spawned);
        spawned
    }

    /// Best-effort distinct side: retry up to ten times, then accept a repeat.
    fn pick_side(&self, used: &[Side], rng: &mut impl Rng) -> Side {
        let mut side = Side::ALL[rng.gen_range(0..4)];
        let mut attempts = 1;
        while used.contains(&side) && used.len() < Side::ALL.len() && attempts < 10 {
            side = Side::ALL[rng.gen_range(0..4)];
            attempts += 1;
        }
        side
    }

    /// Region spawns may land in: inside the world, outside the border strips.
    pub fn spawn_region(&self) -> (Vec2, Vec2) {
        let pad = self.balance.edge_padding;
        let min = Vec2::new(self.world.border_left + pad, pad);
        let max = Vec2::new(
            self.world.width - self.world.border_right - pad,
            self.world.height - self.world.border_bottom - pad,
        );
        (min, max.max(min))
    }

    fn clamp_to_region(&self, point: Vec2) -> Vec2 {
        let (min, max) = self.spawn_region();
        point.clamp(min, max)
    }

    fn off_screen_center(&self, player_pos: Vec2, side: Side, rng: &mut impl Rng) -> Vec2 {
        let view = self.world.view_size();
        let half = view / 2.0;
        let margin = self.balance.spawn_margin;
        let spread: f32 = rng.gen::<f32>() - 0.5;

        let center = match side {
            Side::North => Vec2::new(player_pos.x + spread * view.x, player_pos.y - half.y - margin),
            Side::East => Vec2::new(player_pos.x + half.x + margin, player_pos.y + spread * view.y),
            Side::South => Vec2::new(player_pos.x + spread * view.x, player_pos.y + half.y + margin),
            Side::West => Vec2::new(player_pos.x - half.x - margin, player_pos.y + spread * view.y),
        };
        self.clamp_to_region(center)
    }

    fn clustered_position(&self, center: Vec2, rng: &mut impl Rng) -> Vec2 {
        let angle = rng.gen::<f32>() * TAU;
        let distance = rng.gen::<f32>() * self.balance.cluster_radius;
        self.clamp_to_region(center + Vec2::new(angle.cos(), angle.sin()) * distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enemies::EnemyStats;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn filler(count: usize) -> Vec<Enemy> {
        (0..count)
            .map(|i| Enemy::new(format!("filler_{i}"), "skeleton", EnemyTier::Low, Vec2::splat(500.0), &EnemyStats::default()))
            .collect()
    }

    #[test]
    fn every_phase_sums_to_one() {
        let balance = SpawnBalance::default();
        assert_eq!(balance.tier_phases.len(), 6);
        for phase in &balance.tier_phases {
            assert!((phase.sum() - 1.0).abs() < 1e-5, "phase at {} sums to {}", phase.start, phase.sum());
        }
        assert!(balance.validate_phases().is_empty());
    }

    #[test]
    fn validation_catches_bad_tables() {
        let mut balance = SpawnBalance::default();
        balance.tier_phases[2].start = 30.0;
        balance.tier_phases[3].high = 0.5;
        let errors = balance.validate_phases();
        assert!(errors.contains(&ValidationError::PhaseGap(30.0)));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::TierSum { .. })));
    }

    #[test]
    fn renormalization_gives_even_odds() {
        let candidates = [("a", 0.3), ("b", 0.3)];
        let mut rng = StdRng::seed_from_u64(7);
        let trials = 10_000;
        let a_count = (0..trials)
            .filter(|_| pick_weighted(&candidates, rng.gen()) == Some("a"))
            .count();
        let frequency = a_count as f32 / trials as f32;
        assert!((frequency - 0.5).abs() < 0.03, "frequency was {frequency}");
    }

    #[test]
    fn pick_weighted_with_no_weight_returns_none() {
        assert_eq!(pick_weighted(&[("a", 0.0)], 0.5), None);
        assert_eq!(pick_weighted(&[], 0.5), None);
    }

    #[test]
    fn full_roster_skips_the_wave() {
        let mut spawner = SpawnSystem::default();
        spawner.balance.max_active_enemies = 10;
        let mut enemies = filler(10);
        let mut rng = StdRng::seed_from_u64(1);
        let spawned = spawner.spawn_wave(&mut enemies, 30.0, Vec2::splat(1600.0), &EnemyRegistry::default(), &mut rng);
        assert_eq!(spawned, 0);
        assert_eq!(enemies.len(), 10);
    }

    #[test]
    fn wave_is_clamped_to_remaining_capacity() {
        for seed in 0..50 {
            let mut spawner = SpawnSystem::default();
            spawner.balance.max_active_enemies = 10;
            spawner.balance.min_group_size = 1;
            spawner.balance.max_group_size = 4;
            let mut enemies = filler(8);
            let mut rng = StdRng::seed_from_u64(seed);
            // Two groups at two minutes, each at least one strong.
            let spawned = spawner.spawn_wave(&mut enemies, 120.0, Vec2::splat(1600.0), &EnemyRegistry::default(), &mut rng);
            assert_eq!(spawned, 2, "seed {seed}");
            assert_eq!(enemies.len(), 10);
        }
    }

    #[test]
    fn inactive_enemies_do_not_count_toward_cap() {
        let mut spawner = SpawnSystem::default();
        spawner.balance.max_active_enemies = 3;
        let mut enemies = filler(3);
        enemies[0].active = false;
        let mut rng = StdRng::seed_from_u64(3);
        let spawned = spawner.spawn_wave(&mut enemies, 0.0, Vec2::splat(1600.0), &EnemyRegistry::default(), &mut rng);
        assert_eq!(spawned, 1);
    }

    #[test]
    fn timer_triggers_one_wave_per_interval() {
        let mut spawner = SpawnSystem::default();
        let registry = EnemyRegistry::default();
        let mut enemies = Vec::new();
        let mut rng = StdRng::seed_from_u64(11);
        assert_eq!(spawner.update(2.9, &mut enemies, 2.9, Vec2::splat(1600.0), &registry, &mut rng), 0);
        assert!(spawner.update(0.2, &mut enemies, 3.1, Vec2::splat(1600.0), &registry, &mut rng) > 0);
        assert_eq!(spawner.spawn_timer, 0.0);
    }

    #[test]
    fn ids_are_unique_and_monotonic() {
        let mut spawner = SpawnSystem::default();
        let registry = EnemyRegistry::default();
        let mut enemies = Vec::new();
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..5 {
            spawner.spawn_wave(&mut enemies, 200.0, Vec2::splat(1600.0), &registry, &mut rng);
        }
        let mut ids: Vec<&str> = enemies.iter().map(|e| e.id.as_str()).collect();
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total);
        assert_eq!(spawner.enemy_counter as usize, total);
    }

    #[test]
    fn spawns_stay_inside_the_allowed_region() {
        let mut spawner = SpawnSystem::default();
        let registry = EnemyRegistry::default();
        let (min, max) = spawner.spawn_region();
        let mut rng = StdRng::seed_from_u64(9);
        let mut enemies = Vec::new();
        // Player hugging the top-left corner pushes raw centres out of the world.
        for _ in 0..20 {
            spawner.spawn_wave(&mut enemies, 600.0, Vec2::new(10.0, 10.0), &registry, &mut rng);
        }
        assert!(!enemies.is_empty());
        for enemy in &enemies {
            assert!(enemy.position.x >= min.x && enemy.position.x <= max.x);
            assert!(enemy.position.y >= min.y && enemy.position.y <= max.y);
        }
    }

    #[test]
    fn ramp_never_drops_below_floor() {
        let mut spawner = SpawnSystem::default();
        for _ in 0..100 {
            spawner.increase_spawn_rate();
        }
        assert_eq!(spawner.spawn_interval, spawner.balance.min_interval);
    }

    #[test]
    fn early_game_only_spawns_low_tier() {
        let spawner = SpawnSystem::default();
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..200 {
            assert_eq!(spawner.select_tier(10.0, &mut rng), EnemyTier::Low);
        }
    }

    #[test]
    fn group_count_grows_then_clamps() {
        let spawner = SpawnSystem::default();
        assert_eq!(spawner.group_count(0.0), 1);
        assert_eq!(spawner.group_count(60.0), 2);
        assert_eq!(spawner.group_count(600.0), 2);
    }

    #[test]
    fn groups_in_one_wave_mostly_enter_from_distinct_sides() {
        let spawner = SpawnSystem::default();
        let mut rng = StdRng::seed_from_u64(13);
        let waves = 1_000;

        // With one side taken, ten retries practically always find a free one.
        for _ in 0..waves {
            let first = spawner.pick_side(&[], &mut rng);
            let second = spawner.pick_side(&[first], &mut rng);
            assert_ne!(first, second);
        }

        // Only one side left: (3/4)^10 of draws give up and repeat.
        let used = [Side::North, Side::East, Side::South];
        let fresh = (0..waves)
            .filter(|_| spawner.pick_side(&used, &mut rng) == Side::West)
            .count();
        assert!(fresh > 900, "only {fresh} of {waves} picks found the free side");

        // Every side taken: still answers without spinning.
        let side = spawner.pick_side(&Side::ALL, &mut rng);
        assert!(Side::ALL.contains(&side));
    }
}
