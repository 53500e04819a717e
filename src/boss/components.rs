//! Boss tuning, the intents the boss emits, and the things it leaves in the world.

use bevy::prelude::*;
use serde::Deserialize;

use crate::world::{circle_overlap, CircleBody};

pub const BOSS_ID: &str = "boss_white_tiger";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BossBalance {
    pub name: String,
    /// The boss arrives this many seconds before `victory_time`.
    pub lead_time: f32,
    /// The boss enters from below when the player is this close to the top edge.
    pub edge_threshold: f32,
    /// Health fraction under which the enraged patterns unlock.
    pub enrage_threshold: f32,

    pub bullet_cooldown: f32,
    pub bullet_count: u32,
    pub enraged_bullet_count: u32,
    pub bullet_speed: f32,
    pub enraged_bullet_speed: f32,
    pub bullet_damage: f32,
    pub bullet_radius: f32,
    pub bullet_lifetime: f32,

    pub dash_cooldown: f32,
    pub enraged_dash_cooldown: f32,
    pub dash_warning: f32,
    pub dash_duration: f32,
    pub dash_speed: f32,
    pub dash_recovery: f32,
    pub dash_damage: f32,
    pub warning_line_length: f32,
    pub trail_interval: f32,
    pub trail_lifetime: f32,

    pub stomp_cooldown: f32,
    pub stomp_warning: f32,
    pub fire_duration: f32,
    pub fire_radius: f32,
    pub fire_damage: f32,

    pub fireball_cooldown: f32,
    pub charge_duration: f32,
    pub fireball_speed: f32,
    pub fireball_damage: f32,
    pub fireball_radius: f32,
    pub fireball_lifetime: f32,

    pub reward_xp: u32,
    pub chest_radius: f32,
    pub chest_pickup_range: f32,
}

impl Default for BossBalance {
    fn default() -> Self {
        Self {
            name: "Black-Blooded White Tiger".to_string(),
            lead_time: 120.0,
            edge_threshold: 600.0,
            enrage_threshold: 0.5,

            bullet_cooldown: 3.0,
            bullet_count: 8,
            enraged_bullet_count: 12,
            bullet_speed: 250.0,
            enraged_bullet_speed: 300.0,
            bullet_damage: 40.0,
            bullet_radius: 12.0,
            bullet_lifetime: 4.0,

            dash_cooldown: 6.0,
            enraged_dash_cooldown: 4.0,
            dash_warning: 1.5,
            dash_duration: 0.8,
            dash_speed: 800.0,
            dash_recovery: 0.5,
            dash_damage: 100.0,
            warning_line_length: 1500.0,
            trail_interval: 0.1,
            trail_lifetime: 0.5,

            stomp_cooldown: 8.0,
            stomp_warning: 3.0,
            fire_duration: 2.0,
            fire_radius: 144.0,
            fire_damage: 40.0,

            fireball_cooldown: 10.0,
            charge_duration: 2.0,
            fireball_speed: 400.0,
            fireball_damage: 50.0,
            fireball_radius: 20.0,
            fireball_lifetime: 3.0,

            reward_xp: 1000,
            chest_radius: 40.0,
            chest_pickup_range: 100.0,
        }
    }
}

/// Something the boss wants to happen. The boss system drains these every frame.
#[derive(Debug, Clone, PartialEq)]
pub enum BossIntent {
    /// A ring of lightning bullets.
    Barrage { origin: Vec2, count: u32, speed: f32 },
    /// Telegraph for an upcoming dash.
    WarningLine { origin: Vec2, direction: Vec2 },
    /// Cosmetic spark left behind a dash.
    LightningTrail { position: Vec2, rotation: f32 },
    /// A ground ring that turns into a fire zone when it expires.
    Stomp { center: Vec2 },
    /// The fireball wind-up effect.
    ChargeStarted,
    Fireball { origin: Vec2, direction: Vec2 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BossProjectileKind {
    Lightning,
    Fireball,
}

#[derive(Debug, Clone)]
pub struct BossProjectile {
    pub kind: BossProjectileKind,
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub damage: f32,
    pub active: bool,
    pub remaining: f32,
}

impl BossProjectile {
    pub fn advance(&mut self, delta: f32) {
        self.position += self.velocity * delta;
        self.remaining -= delta;
        if self.remaining <= 0.0 {
            self.active = false;
        }
    }
}

impl CircleBody for BossProjectile {
    fn center(&self) -> Vec2 {
        self.position
    }

    fn radius(&self) -> f32 {
        self.radius
    }
}

/// A telegraph or cosmetic effect with a countdown.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedMarker {
    pub position: Vec2,
    /// Direction for lines, rotation in `x` for sparks, unused for rings.
    pub direction: Vec2,
    /// Line length or ring radius.
    pub size: f32,
    pub remaining: f32,
}

impl TimedMarker {
    pub fn new(position: Vec2, direction: Vec2, size: f32, duration: f32) -> Self {
        Self {
            position,
            direction,
            size,
            remaining: duration,
        }
    }

    /// Count down. True on the frame the marker expires.
    pub fn tick(&mut self, delta: f32) -> bool {
        let was_live = self.remaining > 0.0;
        self.remaining -= delta;
        was_live && self.remaining <= 0.0
    }

    pub fn is_expired(&self) -> bool {
        self.remaining <= 0.0
    }
}

/// Burning ground. Hurts the player at most once.
#[derive(Debug, Clone)]
pub struct FireZone {
    pub center: Vec2,
    pub radius: f32,
    pub damage: f32,
    pub remaining: f32,
    pub has_hit_player: bool,
}

impl FireZone {
    pub fn is_active(&self) -> bool {
        self.remaining > 0.0
    }

    /// Damage owed to a player at `position`, once per zone.
    pub fn touch(&mut self, position: Vec2, radius: f32) -> Option<f32> {
        if !self.is_active() || self.has_hit_player || !circle_overlap(self.center, self.radius, position, radius) {
            return None;
        }
        self.has_hit_player = true;
        Some(self.damage)
    }
}

/// Reward left where the boss fell.
#[derive(Debug, Clone, PartialEq)]
pub struct RewardChest {
    pub position: Vec2,
    pub radius: f32,
    pub pickup_range: f32,
    pub opened: bool,
}

impl RewardChest {
    pub fn in_reach(&self, player_pos: Vec2) -> bool {
        player_pos.distance(self.position) <= self.pickup_range
    }
}

/// What the boss health bar shows.
#[derive(Debug, Clone, PartialEq)]
pub struct BossHealthBar {
    pub name: String,
    pub health: f32,
    pub max_health: f32,
}

impl BossHealthBar {
    pub fn fraction(&self) -> f32 {
        if self.max_health <= 0.0 {
            0.0
        } else {
            (self.health / self.max_health).clamp(0.0, 1.0)
        }
    }
}
