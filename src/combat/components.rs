//! Player-owned attacks: projectiles, area effects, and melee swings.

use bevy::prelude::*;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};

use crate::world::{point_in_sector, CircleBody, WorldBounds};

/// What kind of weapon produced a hit. Artifacts filter on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum WeaponCategory {
    Projectile,
    Melee,
    Area,
    Orbital,
}

/// Remaining pass-throughs before a projectile is spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Piercing {
    /// Extra enemies it may pass through; `Finite(0)` dies on the first hit.
    Finite(u32),
    Infinite,
}

/// Knockback forces per attack source.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KnockbackBalance {
    pub projectile: f32,
    pub area: f32,
    pub melee: f32,
    pub orbital: f32,
    pub jakdu: f32,
    /// Fraction of velocity lost per second.
    pub friction: f32,
    /// Below this speed knockback stops.
    pub min_velocity: f32,
}

impl Default for KnockbackBalance {
    fn default() -> Self {
        Self {
            projectile: 150.0,
            area: 100.0,
            melee: 120.0,
            orbital: 80.0,
            jakdu: 200.0,
            friction: 8.0,
            min_velocity: 1.0,
        }
    }
}

impl KnockbackBalance {
    pub fn for_category(&self, category: WeaponCategory) -> f32 {
        match category {
            WeaponCategory::Projectile => self.projectile,
            WeaponCategory::Melee => self.melee,
            WeaponCategory::Area => self.area,
            WeaponCategory::Orbital => self.orbital,
        }
    }
}

/// Per-hit damage falloff for piercing projectiles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageDecay {
    /// Fraction of base damage lost per enemy already hit.
    pub per_hit: f32,
    /// Floor as a fraction of base damage.
    pub min_factor: f32,
}

#[derive(Debug, Clone)]
pub struct Projectile {
    pub id: String,
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub active: bool,
    pub damage: f32,
    pub piercing: Piercing,
    pub hit_enemy_ids: HashSet<String>,
    pub lifetime: f32,
    pub elapsed: f32,
    pub category: WeaponCategory,
    pub knockback: f32,
    pub is_critical: bool,
    pub decay: Option<DamageDecay>,
    /// Enemies hit so far.
    pub hits: u32,
}

impl Projectile {
    pub fn new(id: impl Into<String>, position: Vec2, velocity: Vec2, radius: f32, damage: f32, lifetime: f32) -> Self {
        Self {
            id: id.into(),
            position,
            velocity,
            radius,
            active: true,
            damage,
            piercing: Piercing::Finite(0),
            hit_enemy_ids: HashSet::new(),
            lifetime,
            elapsed: 0.0,
            category: WeaponCategory::Projectile,
            knockback: KnockbackBalance::default().projectile,
            is_critical: false,
            decay: None,
            hits: 0,
        }
    }

    pub fn with_piercing(mut self, piercing: Piercing) -> Self {
        self.piercing = piercing;
        self
    }

    /// Damage after piercing falloff.
    pub fn current_damage(&self) -> f32 {
        match self.decay {
            Some(decay) => {
                let factor = (1.0 - decay.per_hit * self.hits as f32).max(decay.min_factor);
                self.damage * factor
            }
            None => self.damage,
        }
    }

    pub fn has_hit(&self, target_id: &str) -> bool {
        self.hit_enemy_ids.contains(target_id)
    }

    /// Record a target. Returns false if it was already recorded.
    pub fn record_hit(&mut self, target_id: &str) -> bool {
        self.hit_enemy_ids.insert(target_id.to_string())
    }

    /// Spend one pass-through; deactivates when none remain.
    pub fn consume_pierce(&mut self) {
        self.hits += 1;
        match self.piercing {
            Piercing::Infinite => {}
            Piercing::Finite(0) => self.active = false,
            Piercing::Finite(n) => self.piercing = Piercing::Finite(n - 1),
        }
    }

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

impl CircleBody for Projectile {
    fn center(&self) -> Vec2 {
        self.position
    }

    fn radius(&self) -> f32 {
        self.radius
    }
}

/// How often one effect may damage the same target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitPolicy {
    Once,
    /// Again after this many seconds.
    EveryTick(f32),
}

/// Circular motion around the player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orbit {
    pub radius: f32,
    pub angular_speed: f32,
    pub angle: f32,
}

/// A circular damage zone, optionally delayed and optionally orbiting the player.
#[derive(Debug, Clone)]
pub struct AoeEffect {
    pub position: Vec2,
    pub radius: f32,
    pub damage: f32,
    pub active: bool,
    pub elapsed: f32,
    pub max_lifetime: f32,
    pub start_delay: f32,
    pub category: WeaponCategory,
    pub knockback: f32,
    pub is_critical: bool,
    pub hit_policy: HitPolicy,
    pub orbit: Option<Orbit>,
    /// Stays centred on the player.
    pub follow_player: bool,
    /// Target id -> effect time of the last hit.
    hit_record: HashMap<String, f32>,
}

impl AoeEffect {
    pub fn new(position: Vec2, radius: f32, damage: f32, max_lifetime: f32) -> Self {
        Self {
            position,
            radius,
            damage,
            active: true,
            elapsed: 0.0,
            max_lifetime,
            start_delay: 0.0,
            category: WeaponCategory::Area,
            knockback: KnockbackBalance::default().area,
            is_critical: false,
            hit_policy: HitPolicy::Once,
            orbit: None,
            follow_player: false,
            hit_record: HashMap::new(),
        }
    }

    /// Delay elapsed; the effect now deals damage.
    pub fn is_started(&self) -> bool {
        self.elapsed >= self.start_delay
    }

    pub fn can_hit(&self, target_id: &str) -> bool {
        if !self.active || !self.is_started() {
            return false;
        }
        match (self.hit_policy, self.hit_record.get(target_id)) {
            (_, None) => true,
            (HitPolicy::Once, Some(_)) => false,
            (HitPolicy::EveryTick(interval), Some(last)) => self.elapsed - last >= interval,
        }
    }

    pub fn record_hit(&mut self, target_id: &str) {
        self.hit_record.insert(target_id.to_string(), self.elapsed);
    }

    pub fn contains(&self, point: Vec2, radius: f32) -> bool {
        crate::world::circle_overlap(self.position, self.radius, point, radius)
    }

    pub fn advance(&mut self, delta: f32, player_pos: Vec2) {
        if !self.active {
            return;
        }
        self.elapsed += delta;
        if let Some(orbit) = &mut self.orbit {
            orbit.angle += orbit.angular_speed * delta;
            self.position = player_pos + Vec2::new(orbit.angle.cos(), orbit.angle.sin()) * orbit.radius;
        } else if self.follow_player {
            self.position = player_pos;
        }
        if self.elapsed >= self.start_delay + self.max_lifetime {
            self.active = false;
        }
    }
}

/// A sweeping blade anchored on the player.
#[derive(Debug, Clone)]
pub struct MeleeSwing {
    pub origin: Vec2,
    pub radius: f32,
    pub start_angle: f32,
    pub sweep: f32,
    pub damage: f32,
    pub active: bool,
    pub elapsed: f32,
    pub max_lifetime: f32,
    pub knockback: f32,
    pub is_critical: bool,
    hit_enemy_ids: HashSet<String>,
}

impl MeleeSwing {
    pub fn new(origin: Vec2, start_angle: f32, radius: f32, damage: f32) -> Self {
        Self {
            origin,
            radius,
            start_angle,
            sweep: std::f32::consts::PI,
            damage,
            active: true,
            elapsed: 0.0,
            max_lifetime: 0.3,
            knockback: KnockbackBalance::default().melee,
            is_critical: false,
            hit_enemy_ids: HashSet::new(),
        }
    }

    pub fn has_hit(&self, target_id: &str) -> bool {
        self.hit_enemy_ids.contains(target_id)
    }

    pub fn record_hit(&mut self, target_id: &str) -> bool {
        self.hit_enemy_ids.insert(target_id.to_string())
    }

    /// Whether a circle of `radius` at `point` is inside the blade's arc.
    pub fn reaches(&self, point: Vec2, radius: f32) -> bool {
        point_in_sector(self.origin, self.radius + radius, self.start_angle, self.sweep, point)
    }

    /// Current blade angle for drawing.
    pub fn blade_angle(&self) -> f32 {
        let progress = (self.elapsed / self.max_lifetime).clamp(0.0, 1.0);
        self.start_angle + self.sweep * progress
    }

    pub fn advance(&mut self, delta: f32, player_pos: Vec2) {
        if !self.active {
            return;
        }
        self.origin = player_pos;
        self.elapsed += delta;
        if self.elapsed >= self.max_lifetime {
            self.active = false;
        }
    }
}

/// Everything the player's weapons have put into the world this run.
#[derive(Resource, Default, Debug)]
pub struct PlayerAttacks {
    pub projectiles: Vec<Projectile>,
    pub effects: Vec<AoeEffect>,
    pub swings: Vec<MeleeSwing>,
    next_id: u64,
}

impl PlayerAttacks {
    pub fn next_projectile_id(&mut self) -> String {
        let id = format!("projectile_{}", self.next_id);
        self.next_id += 1;
        id
    }

    pub fn advance(&mut self, delta: f32, player_pos: Vec2) {
        for projectile in &mut self.projectiles {
            projectile.advance(delta);
        }
        for effect in &mut self.effects {
            effect.advance(delta, player_pos);
        }
        for swing in &mut self.swings {
            swing.advance(delta, player_pos);
        }
    }

    /// Drop spent attacks and projectiles that left the world.
    pub fn sweep(&mut self, bounds: &WorldBounds, margin: f32) {
        self.projectiles
            .retain(|p| p.active && !bounds.is_outside(p.position, margin));
        self.effects.retain(|e| e.active);
        self.swings.retain(|s| s.active);
    }

    pub fn clear(&mut self) {
        self.projectiles.clear();
        self.effects.clear();
        self.swings.clear();
        self.next_id = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bolt(piercing: Piercing) -> Projectile {
        Projectile::new("p", Vec2::ZERO, Vec2::X * 100.0, 8.0, 10.0, 3.0).with_piercing(piercing)
    }

    #[test]
    fn zero_piercing_dies_on_first_hit() {
        let mut p = bolt(Piercing::Finite(0));
        p.consume_pierce();
        assert!(!p.active);
    }

    #[test]
    fn piercing_two_survives_two_hits() {
        let mut p = bolt(Piercing::Finite(2));
        p.consume_pierce();
        p.consume_pierce();
        assert!(p.active);
        p.consume_pierce();
        assert!(!p.active);
    }

    #[test]
    fn infinite_piercing_only_expires_with_time() {
        let mut p = bolt(Piercing::Infinite);
        for _ in 0..100 {
            p.consume_pierce();
        }
        assert!(p.active);
        p.advance(3.0);
        assert!(!p.active);
    }

    #[test]
    fn decay_has_a_floor() {
        let mut p = bolt(Piercing::Infinite);
        p.decay = Some(DamageDecay { per_hit: 0.25, min_factor: 0.33 });
        assert_eq!(p.current_damage(), 10.0);
        p.consume_pierce();
        assert!((p.current_damage() - 7.5).abs() < 1e-5);
        for _ in 0..10 {
            p.consume_pierce();
        }
        assert!((p.current_damage() - 3.3).abs() < 1e-5);
    }

    #[test]
    fn ticking_effect_rehits_after_interval() {
        let mut effect = AoeEffect::new(Vec2::ZERO, 20.0, 5.0, 2.0);
        effect.hit_policy = HitPolicy::EveryTick(0.25);
        assert!(effect.can_hit("e"));
        effect.record_hit("e");
        effect.advance(0.2, Vec2::ZERO);
        assert!(!effect.can_hit("e"));
        effect.advance(0.1, Vec2::ZERO);
        assert!(effect.can_hit("e"));
    }

    #[test]
    fn delayed_effect_waits_before_hitting() {
        let mut effect = AoeEffect::new(Vec2::ZERO, 20.0, 5.0, 0.5);
        effect.start_delay = 0.3;
        assert!(!effect.can_hit("e"));
        effect.advance(0.3, Vec2::ZERO);
        assert!(effect.can_hit("e"));
        effect.advance(0.5, Vec2::ZERO);
        assert!(!effect.active);
    }

    #[test]
    fn orbit_tracks_player() {
        let mut effect = AoeEffect::new(Vec2::ZERO, 12.0, 8.0, 5.0);
        effect.orbit = Some(Orbit { radius: 80.0, angular_speed: 0.0, angle: 0.0 });
        effect.advance(0.1, Vec2::new(500.0, 500.0));
        assert_eq!(effect.position, Vec2::new(580.0, 500.0));
    }

    #[test]
    fn swing_covers_a_half_circle() {
        let swing = MeleeSwing::new(Vec2::ZERO, -std::f32::consts::FRAC_PI_2, 100.0, 18.0);
        assert!(swing.reaches(Vec2::new(50.0, 0.0), 10.0));
        assert!(!swing.reaches(Vec2::new(-50.0, 0.0), 10.0));
        assert!(!swing.reaches(Vec2::new(150.0, 0.0), 10.0));
    }

    #[test]
    fn sweep_drops_out_of_bounds_projectiles() {
        let mut attacks = PlayerAttacks::default();
        let mut far = bolt(Piercing::Finite(0));
        far.position = Vec2::new(-500.0, 0.0);
        attacks.projectiles.push(far);
        attacks.projectiles.push(bolt(Piercing::Finite(0)));
        attacks.sweep(&WorldBounds::new(1000.0, 1000.0), 100.0);
        assert_eq!(attacks.projectiles.len(), 1);
    }
}
