//! Named monsters: checkpoint spawns with their own projectile attacks.

use bevy::prelude::*;
use rand::Rng;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::f32::consts::TAU;

use super::components::{Enemy, EnemyStats, EnemyTier};
use super::data::EnemyRegistry;
use super::spawning::Side;
use crate::world::{circle_overlap, direction, distance, CircleBody, WorldBalance, WorldBounds};

/// Stats for named monsters spawned from `start` seconds on.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NamedPhase {
    pub start: f32,
    pub stats: EnemyStats,
    pub attack_cooldown: f32,
    pub burst_cooldown: f32,
    pub radial_cooldown: f32,
    pub projectile_damage: f32,
}

impl Default for NamedPhase {
    fn default() -> Self {
        Self {
            start: 0.0,
            stats: EnemyStats {
                max_health: 1500.0,
                speed: 80.0,
                damage: 25.0,
                radius: 50.0,
                xp_drop: 150,
                knockback_resistance: 0.3,
            },
            attack_cooldown: 2.0,
            burst_cooldown: 6.0,
            radial_cooldown: 10.0,
            projectile_damage: 15.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NamedBalance {
    /// Game times (seconds) at which a batch spawns, each at most once.
    pub checkpoints: Vec<f32>,
    pub per_checkpoint: usize,
    pub spawn_margin: f32,
    /// Spawns are clamped this far inside the world edge.
    pub edge_padding: f32,
    pub phases: Vec<NamedPhase>,
    pub basic_range: f32,
    pub burst_range: f32,
    pub radial_range: f32,
    pub burst_count: u32,
    pub burst_interval: f32,
    /// Aim jitter for burst shots, radians either side.
    pub burst_jitter: f32,
    pub radial_count: u32,
    pub projectile_speed: f32,
    pub projectile_radius: f32,
    pub projectile_lifetime: f32,
}

impl Default for NamedBalance {
    fn default() -> Self {
        let low = NamedPhase::default();
        let medium = NamedPhase {
            start: 300.0,
            stats: EnemyStats {
                max_health: 2500.0,
                damage: 30.0,
                xp_drop: 250,
                ..low.stats.clone()
            },
            attack_cooldown: 1.8,
            burst_cooldown: 5.0,
            radial_cooldown: 9.0,
            projectile_damage: 20.0,
        };
        let high = NamedPhase {
            start: 500.0,
            stats: EnemyStats {
                max_health: 4000.0,
                damage: 40.0,
                xp_drop: 400,
                ..low.stats.clone()
            },
            attack_cooldown: 1.5,
            burst_cooldown: 4.0,
            radial_cooldown: 8.0,
            projectile_damage: 25.0,
        };
        Self {
            checkpoints: vec![180.0, 360.0, 540.0],
            per_checkpoint: 2,
            spawn_margin: 600.0,
            edge_padding: 100.0,
            phases: vec![low, medium, high],
            basic_range: 450.0,
            burst_range: 400.0,
            radial_range: 500.0,
            burst_count: 5,
            burst_interval: 0.15,
            burst_jitter: 0.085,
            radial_count: 12,
            projectile_speed: 300.0,
            projectile_radius: 15.0,
            projectile_lifetime: 6.0,
        }
    }
}

impl NamedBalance {
    /// Latest phase already started, or the first one before any has.
    pub fn phase_index(&self, game_time: f32) -> Option<usize> {
        if self.phases.is_empty() {
            return None;
        }
        Some(self.phases.iter().rposition(|p| game_time >= p.start).unwrap_or(0))
    }
}

/// A shot fired by a named monster. Only hurts the player.
#[derive(Debug, Clone)]
pub struct NamedProjectile {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub damage: f32,
    pub active: bool,
    pub elapsed: f32,
    pub lifetime: f32,
}

impl NamedProjectile {
    pub fn advance(&mut self, delta: f32) {
        if !self.active {
            return;
        }
        self.position += self.velocity * delta;
        self.elapsed += delta;
        if self.elapsed >= self.lifetime {
            self.active = false;
        }
    }
}

impl CircleBody for NamedProjectile {
    fn center(&self) -> Vec2 {
        self.position
    }

    fn radius(&self) -> f32 {
        self.radius
    }
}

/// Per-monster attack timers.
#[derive(Debug, Clone, Default)]
struct AttackState {
    phase: usize,
    attack_timer: f32,
    burst_timer: f32,
    radial_timer: f32,
    /// Shots left in the running burst.
    burst_remaining: u32,
    /// Time until the next burst shot.
    burst_delay: f32,
}

/// A shot a monster asked for this frame.
struct FireRequest {
    origin: Vec2,
    direction: Vec2,
    damage: f32,
}

/// Checkpoint spawner and owner of every named-monster projectile.
#[derive(Resource, Debug, Clone)]
pub struct NamedSpawnSystem {
    pub balance: NamedBalance,
    pub spawned_phases: HashSet<usize>,
    pub projectiles: Vec<NamedProjectile>,
    attack_states: HashMap<String, AttackState>,
    counter: u64,
    world: WorldBalance,
}

impl Default for NamedSpawnSystem {
    fn default() -> Self {
        Self::new(NamedBalance::default(), &WorldBalance::default())
    }
}

impl NamedSpawnSystem {
    pub fn new(balance: NamedBalance, world: &WorldBalance) -> Self {
        Self {
            balance,
            spawned_phases: HashSet::new(),
            projectiles: Vec::new(),
            attack_states: HashMap::new(),
            counter: 0,
            world: world.clone(),
        }
    }

    /// Spawn due checkpoints, run attack patterns, move projectiles.
    /// Returns the number of named monsters spawned.
    pub fn update(
        &mut self,
        delta: f32,
        enemies: &mut Vec<Enemy>,
        game_time: f32,
        player_pos: Vec2,
        registry: &EnemyRegistry,
        rng: &mut impl Rng,
    ) -> usize {
        let spawned = self.check_checkpoints(enemies, game_time, player_pos, registry, rng);

        let mut requests = Vec::new();
        for enemy in enemies.iter().filter(|e| e.active && e.is_alive() && e.tier == EnemyTier::Named) {
            let Some(state) = self.attack_states.get_mut(&enemy.id) else {
                continue;
            };
            if let Some(phase) = self.balance.phases.get(state.phase) {
                drive_attacks(&self.balance, phase, state, enemy.position, player_pos, delta, rng, &mut requests);
            }
        }
        for request in requests {
            self.projectiles.push(NamedProjectile {
                position: request.origin,
                velocity: request.direction * self.balance.projectile_speed,
                radius: self.balance.projectile_radius,
                damage: request.damage,
                active: true,
                elapsed: 0.0,
                lifetime: self.balance.projectile_lifetime,
            });
        }

        for projectile in &mut self.projectiles {
            projectile.advance(delta);
        }
        spawned
    }

    fn check_checkpoints(
        &mut self,
        enemies: &mut Vec<Enemy>,
        game_time: f32,
        player_pos: Vec2,
        registry: &EnemyRegistry,
        rng: &mut impl Rng,
    ) -> usize {
        let mut spawned = 0;
        for index in 0..self.balance.checkpoints.len() {
            if self.spawned_phases.contains(&index) || game_time < self.balance.checkpoints[index] {
                continue;
            }
            self.spawned_phases.insert(index);
            spawned += self.spawn_batch(enemies, game_time, player_pos, registry, rng);
            info!("Named checkpoint {} reached at {:.0}s", index, game_time);
        }
        spawned
    }

    fn spawn_batch(
        &mut self,
        enemies: &mut Vec<Enemy>,
        game_time: f32,
        player_pos: Vec2,
        registry: &EnemyRegistry,
        rng: &mut impl Rng,
    ) -> usize {
        let kinds = registry.named_types();
        if kinds.is_empty() {
            warn!("No named monster types defined");
            return 0;
        }
        let Some(phase_index) = self.balance.phase_index(game_time) else {
            warn!("No named monster phases defined");
            return 0;
        };
        let phase = &self.balance.phases[phase_index];

        for _ in 0..self.balance.per_checkpoint {
            let kind = kinds[rng.gen_range(0..kinds.len())];
            let stats = registry.get(kind).map_or_else(|| phase.stats.clone(), |def| def.scale_stats(&phase.stats));
            let position = self.spawn_position(player_pos, rng);
            let id = format!("named_{}", self.counter);
            self.counter += 1;

            let mut named = Enemy::new(id.clone(), kind, EnemyTier::Named, position, &stats);
            named.target = Some(player_pos);
            enemies.push(named);
            self.attack_states.insert(
                id,
                AttackState {
                    phase: phase_index,
                    attack_timer: rng.gen::<f32>() * 2.0,
                    burst_timer: rng.gen::<f32>() * 3.0,
                    radial_timer: rng.gen::<f32>() * 4.0,
                    ..default()
                },
            );
        }
        self.balance.per_checkpoint
    }

    /// A point on a random edge of the box `spawn_margin` beyond the view.
    fn spawn_position(&self, player_pos: Vec2, rng: &mut impl Rng) -> Vec2 {
        let half = self.world.view_size() / 2.0 + Vec2::splat(self.balance.spawn_margin);
        let world_max = Vec2::new(self.world.width, self.world.height);
        let min = (player_pos - half).max(Vec2::ZERO);
        let max = (player_pos + half).min(world_max);
        let along: f32 = rng.gen();

        let point = match Side::ALL[rng.gen_range(0..4)] {
            Side::North => Vec2::new(min.x + along * (max.x - min.x), min.y),
            Side::East => Vec2::new(max.x, min.y + along * (max.y - min.y)),
            Side::South => Vec2::new(min.x + along * (max.x - min.x), max.y),
            Side::West => Vec2::new(min.x, min.y + along * (max.y - min.y)),
        };
        let pad = Vec2::splat(self.balance.edge_padding);
        point.clamp(pad, (world_max - pad).max(pad))
    }

    /// Projectiles touching the player are spent. Returns their damage.
    pub fn hit_player(&mut self, player_pos: Vec2, player_radius: f32) -> Vec<f32> {
        self.projectiles
            .iter_mut()
            .filter(|p| p.active && circle_overlap(p.position, p.radius, player_pos, player_radius))
            .map(|p| {
                p.active = false;
                p.damage
            })
            .collect()
    }

    /// Drop spent and escaped projectiles and the timers of dead monsters.
    pub fn sweep(&mut self, enemies: &[Enemy], bounds: &WorldBounds, margin: f32) {
        for projectile in &mut self.projectiles {
            if bounds.is_outside(projectile.position, margin) {
                projectile.active = false;
            }
        }
        self.projectiles.retain(|p| p.active);
        self.attack_states
            .retain(|id, _| enemies.iter().any(|e| &e.id == id && e.active));
    }

    pub fn reset(&mut self) {
        self.spawned_phases.clear();
        self.projectiles.clear();
        self.attack_states.clear();
        self.counter = 0;
    }
}

/// Radial beats burst beats the basic shot. A running burst keeps firing on its own clock.
#[allow(clippy::too_many_arguments)]
fn drive_attacks(
    balance: &NamedBalance,
    phase: &NamedPhase,
    state: &mut AttackState,
    origin: Vec2,
    player_pos: Vec2,
    delta: f32,
    rng: &mut impl Rng,
    requests: &mut Vec<FireRequest>,
) {
    state.attack_timer += delta;
    state.burst_timer += delta;
    state.radial_timer += delta;

    if state.burst_remaining > 0 {
        state.burst_delay -= delta;
        while state.burst_remaining > 0 && state.burst_delay <= 0.0 {
            if origin != player_pos {
                let aim = direction(origin, player_pos);
                let angle = aim.y.atan2(aim.x) + (rng.gen::<f32>() - 0.5) * 2.0 * balance.burst_jitter;
                requests.push(FireRequest {
                    origin,
                    direction: Vec2::new(angle.cos(), angle.sin()),
                    damage: phase.projectile_damage,
                });
            }
            state.burst_remaining -= 1;
            state.burst_delay += balance.burst_interval;
        }
    }

    let range = distance(origin, player_pos);
    if state.radial_timer >= phase.radial_cooldown && range < balance.radial_range {
        state.radial_timer = 0.0;
        let count = balance.radial_count.max(1);
        for i in 0..count {
            let angle = TAU * i as f32 / count as f32;
            requests.push(FireRequest {
                origin,
                direction: Vec2::new(angle.cos(), angle.sin()),
                damage: phase.projectile_damage,
            });
        }
        return;
    }

    if state.burst_timer >= phase.burst_cooldown && range < balance.burst_range {
        state.burst_timer = 0.0;
        state.burst_remaining = balance.burst_count;
        state.burst_delay = 0.0;
        return;
    }

    if state.attack_timer >= phase.attack_cooldown && range < balance.basic_range && origin != player_pos {
        state.attack_timer = 0.0;
        requests.push(FireRequest {
            origin,
            direction: direction(origin, player_pos),
            damage: phase.projectile_damage,
        });
    }
}
