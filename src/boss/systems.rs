//! Boss lifecycle: spawn, combat, defeat, reward, stage clear.

use bevy::prelude::*;
use std::f32::consts::TAU;

use super::components::*;
use super::white_tiger::WhiteTiger;
use crate::combat::KnockbackBalance;
use crate::core::{DamageSource, StageStats};
use crate::enemies::{Enemy, EnemyStats, EnemyTier};
use crate::player::Player;
use crate::progression::{LevelSystem, Pickups, XpBalance};
use crate::world::{bodies_overlap, WorldBalance, WorldBounds};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BossPhase {
    #[default]
    Inactive,
    Spawning,
    InCombat,
    Defeated,
    RewardPending,
    StageCleared,
}

/// Owns the boss driver and everything the boss puts into the world.
/// The boss body itself lives in the enemy roster under `BOSS_ID`.
#[derive(Resource, Debug, Default)]
pub struct BossSystem {
    pub phase: BossPhase,
    pub tiger: Option<WhiteTiger>,
    pub intents: Vec<BossIntent>,
    pub projectiles: Vec<BossProjectile>,
    pub warning_lines: Vec<TimedMarker>,
    pub stomp_warnings: Vec<TimedMarker>,
    pub fire_zones: Vec<FireZone>,
    pub lightning: Vec<TimedMarker>,
    pub charge_effect: Option<TimedMarker>,
    pub health_bar: Option<BossHealthBar>,
    pub chest: Option<RewardChest>,
    pub stage_stats: Option<StageStats>,
    last_position: Vec2,
}

impl BossSystem {
    /// Straight above the player, one view height away; below when the player hugs the top edge.
    pub fn spawn_position(player_pos: Vec2, world: &WorldBalance, balance: &BossBalance) -> Vec2 {
        let offset = world.view_size().y;
        if player_pos.y < balance.edge_threshold {
            Vec2::new(player_pos.x, player_pos.y + offset)
        } else {
            Vec2::new(player_pos.x, player_pos.y - offset)
        }
    }

    /// Put the boss into the roster and go straight to combat. False unless inactive.
    pub fn spawn_boss(&mut self, position: Vec2, stats: &EnemyStats, balance: &BossBalance, enemies: &mut Vec<Enemy>) -> bool {
        if self.phase != BossPhase::Inactive {
            return false;
        }
        self.phase = BossPhase::Spawning;

        let boss = Enemy::new(BOSS_ID, "white_tiger", EnemyTier::Boss, position, stats);
        self.health_bar = Some(BossHealthBar {
            name: balance.name.clone(),
            health: boss.health,
            max_health: boss.max_health,
        });
        self.last_position = position;
        enemies.push(boss);
        self.tiger = Some(WhiteTiger::default());

        self.phase = BossPhase::InCombat;
        info!("{} spawned at ({:.0}, {:.0})", balance.name, position.x, position.y);
        true
    }

    pub fn is_active(&self) -> bool {
        self.phase != BossPhase::Inactive
    }

    pub fn health_fraction(&self) -> Option<f32> {
        self.health_bar.as_ref().map(BossHealthBar::fraction)
    }

    /// Run the boss and every boss-owned hazard one frame.
    /// Returns the hits the player should take.
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        delta: f32,
        enemies: &mut [Enemy],
        player: &Player,
        balance: &BossBalance,
        knockback: &KnockbackBalance,
        bounds: &WorldBounds,
        margin: f32,
    ) -> Vec<(f32, DamageSource)> {
        let mut hits = Vec::new();

        if self.phase == BossPhase::InCombat {
            if let (Some(tiger), Some(boss)) = (
                self.tiger.as_mut(),
                enemies.iter_mut().find(|e| e.id == BOSS_ID && e.active),
            ) {
                tiger.update(boss, player.position, delta, balance, knockback, &mut self.intents);
                self.last_position = boss.position;
                if let Some(bar) = self.health_bar.as_mut() {
                    bar.health = boss.health;
                }
                if tiger.is_dashing() && bodies_overlap(boss, player) {
                    hits.push((balance.dash_damage, DamageSource::BossDash));
                }
            }
        }

        self.drain_intents(balance);

        for projectile in self.projectiles.iter_mut().filter(|p| p.active) {
            projectile.advance(delta);
            if projectile.active && bodies_overlap(projectile, player) {
                projectile.active = false;
                hits.push((projectile.damage, DamageSource::BossProjectile));
            }
            if bounds.is_outside(projectile.position, margin) {
                projectile.active = false;
            }
        }

        for marker in self.warning_lines.iter_mut().chain(self.lightning.iter_mut()) {
            marker.tick(delta);
        }
        if self.charge_effect.as_mut().is_some_and(|charge| charge.tick(delta)) {
            self.charge_effect = None;
        }

        for warning in &mut self.stomp_warnings {
            if warning.tick(delta) {
                self.fire_zones.push(FireZone {
                    center: warning.position,
                    radius: warning.size,
                    damage: balance.fire_damage,
                    remaining: balance.fire_duration,
                    has_hit_player: false,
                });
            }
        }

        for zone in &mut self.fire_zones {
            if let Some(damage) = zone.touch(player.position, player.radius) {
                hits.push((damage, DamageSource::FireZone));
            }
            zone.remaining -= delta;
        }

        self.projectiles.retain(|p| p.active);
        self.warning_lines.retain(|m| !m.is_expired());
        self.lightning.retain(|m| !m.is_expired());
        self.stomp_warnings.retain(|m| !m.is_expired());
        self.fire_zones.retain(FireZone::is_active);
        hits
    }

    /// Turn queued intents into projectiles and telegraphs.
    fn drain_intents(&mut self, balance: &BossBalance) {
        for intent in self.intents.drain(..) {
            match intent {
                BossIntent::Barrage { origin, count, speed } => {
                    let count = count.max(1);
                    for i in 0..count {
                        let angle = TAU * i as f32 / count as f32;
                        self.projectiles.push(BossProjectile {
                            kind: BossProjectileKind::Lightning,
                            position: origin,
                            velocity: Vec2::new(angle.cos(), angle.sin()) * speed,
                            radius: balance.bullet_radius,
                            damage: balance.bullet_damage,
                            active: true,
                            remaining: balance.bullet_lifetime,
                        });
                    }
                }
                BossIntent::WarningLine { origin, direction } => {
                    self.warning_lines
                        .push(TimedMarker::new(origin, direction, balance.warning_line_length, balance.dash_warning));
                }
                BossIntent::LightningTrail { position, rotation } => {
                    self.lightning
                        .push(TimedMarker::new(position, Vec2::new(rotation, 0.0), 0.0, balance.trail_lifetime));
                }
                BossIntent::Stomp { center } => {
                    self.stomp_warnings
                        .push(TimedMarker::new(center, Vec2::ZERO, balance.fire_radius, balance.stomp_warning));
                }
                BossIntent::ChargeStarted => {
                    self.charge_effect = Some(TimedMarker::new(
                        self.last_position,
                        Vec2::ZERO,
                        0.0,
                        balance.charge_duration,
                    ));
                }
                BossIntent::Fireball { origin, direction } => {
                    self.charge_effect = None;
                    self.projectiles.push(BossProjectile {
                        kind: BossProjectileKind::Fireball,
                        position: origin,
                        velocity: direction * balance.fireball_speed,
                        radius: balance.fireball_radius,
                        damage: balance.fireball_damage,
                        active: true,
                        remaining: balance.fireball_lifetime,
                    });
                }
            }
        }
    }

    /// Once the boss is down: drop its XP, remove it, and leave the chest.
    /// Returns where it fell, only on the first call.
    pub fn check_defeat(
        &mut self,
        enemies: &mut [Enemy],
        pickups: &mut Pickups,
        xp: &XpBalance,
        balance: &BossBalance,
    ) -> Option<Vec2> {
        if self.phase != BossPhase::InCombat {
            return None;
        }
        let position = match enemies.iter_mut().find(|e| e.id == BOSS_ID) {
            Some(boss) if boss.active && boss.is_alive() => return None,
            Some(boss) => {
                boss.active = false;
                boss.position
            }
            None => self.last_position,
        };

        self.phase = BossPhase::Defeated;
        self.tiger = None;
        self.health_bar = None;
        self.intents.clear();
        self.warning_lines.clear();
        self.stomp_warnings.clear();
        self.lightning.clear();
        self.charge_effect = None;

        pickups.spawn_gem(position, balance.reward_xp, xp);
        self.chest = Some(RewardChest {
            position,
            radius: balance.chest_radius,
            pickup_range: balance.chest_pickup_range,
            opened: false,
        });
        info!("Boss defeated at ({:.0}, {:.0})", position.x, position.y);
        Some(position)
    }

    /// Open the chest once the player reaches it. True on the frame it opens.
    pub fn poll_reward(&mut self, player_pos: Vec2) -> bool {
        if self.phase != BossPhase::Defeated {
            return false;
        }
        match self.chest.as_mut() {
            Some(chest) if chest.in_reach(player_pos) => {
                chest.opened = true;
                self.phase = BossPhase::RewardPending;
                true
            }
            _ => false,
        }
    }

    /// Heal, remove the chest, and report the run. Only once, after the chest opened.
    pub fn clear_stage(&mut self, player: &mut Player, levels: &LevelSystem, elapsed: f32, kills: u32) -> Option<StageStats> {
        if self.phase != BossPhase::RewardPending {
            return None;
        }
        player.restore_full_health();
        self.chest = None;
        let stats = StageStats {
            clear_time: elapsed,
            total_xp: levels.total_xp,
            level: levels.level,
            kills,
        };
        self.stage_stats = Some(stats.clone());
        self.phase = BossPhase::StageCleared;
        info!("Stage cleared in {}", stats.formatted_time());
        Some(stats)
    }

    /// Remove the boss and everything it owns, from any phase.
    /// The stage stats outlive the run for the clear screen.
    pub fn cleanup(&mut self, enemies: &mut [Enemy]) {
        for boss in enemies.iter_mut().filter(|e| e.id == BOSS_ID) {
            boss.active = false;
        }
        let stats = self.stage_stats.take();
        *self = Self::default();
        self.stage_stats = stats;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enemies::TierStatsTable;
    use crate::player::PlayerBalance;

    fn spawned() -> (BossSystem, Vec<Enemy>) {
        let mut system = BossSystem::default();
        let mut enemies = Vec::new();
        assert!(system.spawn_boss(
            Vec2::new(1600.0, 200.0),
            &TierStatsTable::default().boss,
            &BossBalance::default(),
            &mut enemies
        ));
        (system, enemies)
    }

    fn player_at(pos: Vec2) -> Player {
        Player::new(&PlayerBalance::default(), pos)
    }

    #[test]
    fn spawns_above_player_or_below_near_top() {
        let world = WorldBalance::default();
        let balance = BossBalance::default();
        let height = world.view_size().y;
        let mid = BossSystem::spawn_position(Vec2::new(1000.0, 1500.0), &world, &balance);
        assert_eq!(mid, Vec2::new(1000.0, 1500.0 - height));
        let top = BossSystem::spawn_position(Vec2::new(1000.0, 300.0), &world, &balance);
        assert_eq!(top, Vec2::new(1000.0, 300.0 + height));
    }

    #[test]
    fn spawn_goes_straight_to_combat_once() {
        let (mut system, mut enemies) = spawned();
        assert_eq!(system.phase, BossPhase::InCombat);
        assert_eq!(enemies.len(), 1);
        assert_eq!(system.health_fraction(), Some(1.0));
        assert!(!system.spawn_boss(Vec2::ZERO, &EnemyStats::default(), &BossBalance::default(), &mut enemies));
        assert_eq!(enemies.len(), 1);
    }

    #[test]
    fn defeat_is_idempotent() {
        let (mut system, mut enemies) = spawned();
        let mut pickups = Pickups::default();
        let xp = XpBalance::default();
        let balance = BossBalance::default();

        assert_eq!(system.check_defeat(&mut enemies, &mut pickups, &xp, &balance), None);
        enemies[0].health = 0.0;
        assert!(system.check_defeat(&mut enemies, &mut pickups, &xp, &balance).is_some());
        assert!(system.check_defeat(&mut enemies, &mut pickups, &xp, &balance).is_none());

        assert_eq!(system.phase, BossPhase::Defeated);
        assert_eq!(pickups.gems.len(), 1);
        assert_eq!(pickups.gems[0].value, 1000);
        assert!(system.chest.is_some());
        assert!(system.health_bar.is_none());
        assert!(!enemies[0].active);
    }

    #[test]
    fn chest_then_stage_clear() {
        let (mut system, mut enemies) = spawned();
        let mut pickups = Pickups::default();
        enemies[0].health = 0.0;
        system.check_defeat(&mut enemies, &mut pickups, &XpBalance::default(), &BossBalance::default());

        let mut player = player_at(Vec2::new(1600.0, 600.0));
        player.health = 10.0;
        let levels = LevelSystem {
            level: 12,
            current_xp: 0,
            total_xp: 4321,
        };
        assert!(!system.poll_reward(player.position));
        assert!(system.clear_stage(&mut player, &levels, 500.0, 800).is_none());

        player.position = Vec2::new(1650.0, 220.0);
        assert!(system.poll_reward(player.position));
        let stats = system.clear_stage(&mut player, &levels, 545.0, 800).unwrap();
        assert_eq!(stats.formatted_time(), "9:05");
        assert_eq!(stats.total_xp, 4321);
        assert_eq!(stats.level, 12);
        assert_eq!(player.health, player.max_health);
        assert!(system.chest.is_none());
        assert!(system.clear_stage(&mut player, &levels, 546.0, 800).is_none());
    }

    #[test]
    fn barrage_bullets_hit_the_player() {
        let mut system = BossSystem::default();
        let balance = BossBalance::default();
        system.intents.push(BossIntent::Barrage {
            origin: Vec2::new(100.0, 100.0),
            count: 8,
            speed: 250.0,
        });
        let player = player_at(Vec2::new(130.0, 100.0));
        let hits = system.update(
            0.016,
            &mut [],
            &player,
            &balance,
            &KnockbackBalance::default(),
            &WorldBounds::new(3200.0, 2400.0),
            100.0,
        );
        assert!(hits.contains(&(40.0, DamageSource::BossProjectile)));
        assert!(system.projectiles.len() < 8);
    }

    #[test]
    fn stomp_becomes_fire_that_burns_once() {
        let mut system = BossSystem::default();
        let balance = BossBalance::default();
        let player = player_at(Vec2::new(500.0, 500.0));
        system.intents.push(BossIntent::Stomp { center: player.position });
        let bounds = WorldBounds::new(3200.0, 2400.0);
        let knockback = KnockbackBalance::default();

        let mut fire_hits = 0;
        for _ in 0..120 {
            let hits = system.update(0.05, &mut [], &player, &balance, &knockback, &bounds, 100.0);
            fire_hits += hits.iter().filter(|(_, source)| *source == DamageSource::FireZone).count();
        }
        assert_eq!(fire_hits, 1);
        assert!(system.fire_zones.is_empty());
        assert!(system.stomp_warnings.is_empty());
    }

    #[test]
    fn cleanup_from_any_phase() {
        let mut idle = BossSystem::default();
        idle.cleanup(&mut []);
        assert_eq!(idle.phase, BossPhase::Inactive);

        let (mut system, mut enemies) = spawned();
        system.intents.push(BossIntent::ChargeStarted);
        system.cleanup(&mut enemies);
        assert_eq!(system.phase, BossPhase::Inactive);
        assert!(system.tiger.is_none());
        assert!(!enemies[0].active);
    }
}
