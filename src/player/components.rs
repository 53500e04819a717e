//! Player state and tuning.

use bevy::prelude::*;
use rand::Rng;
use serde::Deserialize;

use crate::world::{normalize, CircleBody, WorldBounds};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlayerBalance {
    pub max_health: f32,
    pub speed: f32,
    pub radius: f32,
    /// Seconds of invulnerability after taking a hit.
    pub invincible_duration: f32,
    pub critical_rate: f32,
    pub critical_damage: f32,
    pub max_critical_rate: f32,
}

impl Default for PlayerBalance {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            speed: 250.0,
            radius: 40.0,
            invincible_duration: 0.5,
            critical_rate: 0.05,
            critical_damage: 1.5,
            max_critical_rate: 0.8,
        }
    }
}

/// The player character.
#[derive(Resource, Debug, Clone)]
pub struct Player {
    pub position: Vec2,
    pub radius: f32,
    pub health: f32,
    pub max_health: f32,
    pub speed: f32,
    /// Last non-zero movement direction.
    pub facing: Vec2,
    pub invincible_timer: f32,
    pub invincible_duration: f32,
    pub critical_rate: f32,
    pub critical_damage: f32,
    pub max_critical_rate: f32,
    /// Fraction of incoming damage ignored (0.0 - 1.0).
    pub damage_reduction: f32,
    /// Upgrade-driven damage scale.
    pub damage_multiplier: f32,
    /// Additive artifact bonus on top of `damage_multiplier`.
    pub bonus_damage: f32,
    /// Temporary artifact scale (berserk and similar).
    pub frenzy_multiplier: f32,
    /// Weapon cooldowns tick at `delta / cooldown_multiplier`.
    pub cooldown_multiplier: f32,
    pub speed_multiplier: f32,
    pub pickup_multiplier: f32,
    /// Share of max health restored each second.
    pub regen_rate: f32,
    pub xp_multiplier: f32,
}

impl Default for Player {
    fn default() -> Self {
        Self::new(&PlayerBalance::default(), Vec2::ZERO)
    }
}

impl Player {
    pub fn new(balance: &PlayerBalance, position: Vec2) -> Self {
        Self {
            position,
            radius: balance.radius,
            health: balance.max_health,
            max_health: balance.max_health,
            speed: balance.speed,
            facing: Vec2::X,
            invincible_timer: 0.0,
            invincible_duration: balance.invincible_duration,
            critical_rate: balance.critical_rate,
            critical_damage: balance.critical_damage,
            max_critical_rate: balance.max_critical_rate,
            damage_reduction: 0.0,
            damage_multiplier: 1.0,
            bonus_damage: 0.0,
            frenzy_multiplier: 1.0,
            cooldown_multiplier: 1.0,
            speed_multiplier: 1.0,
            pickup_multiplier: 1.0,
            regen_rate: 0.0,
            xp_multiplier: 1.0,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    pub fn is_invincible(&self) -> bool {
        self.invincible_timer > 0.0
    }

    /// Whether a hit would land right now.
    pub fn can_be_hit(&self) -> bool {
        self.is_alive() && !self.is_invincible()
    }

    /// Apply a hit after damage reduction. Ignored while invincible.
    /// Returns the health actually lost.
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        if !self.can_be_hit() || amount <= 0.0 {
            return 0.0;
        }
        let reduced = amount * (1.0 - self.damage_reduction.clamp(0.0, 1.0));
        let actual = reduced.min(self.health);
        self.health -= actual;
        self.invincible_timer = self.invincible_duration;
        actual
    }

    pub fn heal(&mut self, amount: f32) -> f32 {
        let actual = amount.max(0.0).min(self.max_health - self.health);
        self.health += actual;
        actual
    }

    /// Passive regeneration for one frame. Returns the health restored.
    pub fn regenerate(&mut self, delta: f32) -> f32 {
        if !self.is_alive() || self.regen_rate <= 0.0 {
            return 0.0;
        }
        self.heal(self.max_health * self.regen_rate * delta)
    }

    /// XP after the gain multiplier, rounded to whole points.
    pub fn scaled_xp(&self, xp: u32) -> u32 {
        (xp as f32 * self.xp_multiplier).round() as u32
    }

    pub fn restore_full_health(&mut self) {
        self.health = self.max_health;
    }

    /// Every damage scale combined.
    pub fn effective_damage_multiplier(&self) -> f32 {
        self.damage_multiplier * (1.0 + self.bonus_damage) * self.frenzy_multiplier
    }

    /// Roll for a critical hit. Returns the flag and the total damage scale.
    pub fn roll_critical(&self, rng: &mut impl Rng) -> (bool, f32) {
        let base = self.effective_damage_multiplier();
        if rng.gen::<f32>() < self.critical_rate {
            (true, base * self.critical_damage)
        } else {
            (false, base)
        }
    }

    pub fn add_critical_rate(&mut self, amount: f32) {
        self.critical_rate = (self.critical_rate + amount).min(self.max_critical_rate);
    }

    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0.0 {
            0.0
        } else {
            self.health / self.max_health
        }
    }

    /// Move by a normalized input vector and stay inside the world.
    pub fn step(&mut self, input: Vec2, delta: f32, bounds: &WorldBounds) {
        let dir = if input.length_squared() > 1.0 { normalize(input) } else { input };
        if dir != Vec2::ZERO {
            self.facing = normalize(dir);
        }
        self.position += dir * self.speed * self.speed_multiplier * delta;
        self.position = bounds.clamp(self.position, self.radius);
    }

    pub fn tick_timers(&mut self, delta: f32) {
        self.invincible_timer = (self.invincible_timer - delta).max(0.0);
    }
}

impl CircleBody for Player {
    fn center(&self) -> Vec2 {
        self.position
    }

    fn radius(&self) -> f32 {
        self.radius
    }
}

/// Per-frame input, filled by whatever input backend is active.
#[derive(Resource, Default, Debug, Clone, Copy)]
pub struct PlayerInput {
    /// Movement with magnitude at most one.
    pub movement: Vec2,
    pub interact: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn invincibility_blocks_follow_up_hits() {
        let mut player = Player::default();
        assert_eq!(player.take_damage(10.0), 10.0);
        assert_eq!(player.take_damage(10.0), 0.0);
        player.tick_timers(0.5);
        assert_eq!(player.take_damage(10.0), 10.0);
        assert_eq!(player.health, 80.0);
    }

    #[test]
    fn reduction_and_clamp() {
        let mut player = Player::default();
        player.damage_reduction = 0.5;
        assert_eq!(player.take_damage(40.0), 20.0);
        player.tick_timers(1.0);
        player.damage_reduction = 0.0;
        assert_eq!(player.take_damage(500.0), 80.0);
        assert_eq!(player.health, 0.0);
        assert!(!player.is_alive());
    }

    #[test]
    fn crit_always_lands_at_full_rate() {
        let mut player = Player::default();
        player.critical_rate = 1.0;
        player.damage_multiplier = 2.0;
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(player.roll_critical(&mut rng), (true, 3.0));
        player.critical_rate = 0.0;
        assert_eq!(player.roll_critical(&mut rng), (false, 2.0));
    }

    #[test]
    fn movement_is_clamped_to_world() {
        let mut player = Player::new(&PlayerBalance::default(), Vec2::new(50.0, 50.0));
        player.step(Vec2::new(-1.0, 0.0), 1.0, &WorldBounds::new(1000.0, 1000.0));
        assert_eq!(player.position, Vec2::new(40.0, 50.0));
        assert_eq!(player.facing, Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn breathing_heals_a_share_of_max_health_per_second() {
        let mut player = Player::default();
        player.health = 50.0;
        assert_eq!(player.regenerate(1.0), 0.0);

        player.regen_rate = 0.025;
        for _ in 0..10 {
            player.regenerate(0.1);
        }
        assert!((player.health - 52.5).abs() < 1e-3);

        player.health = 99.9;
        player.regenerate(10.0);
        assert_eq!(player.health, 100.0);

        player.health = 0.0;
        assert_eq!(player.regenerate(1.0), 0.0);
    }

    #[test]
    fn xp_multiplier_rounds_to_whole_points() {
        let mut player = Player::default();
        assert_eq!(player.scaled_xp(7), 7);
        player.xp_multiplier = 1.25;
        assert_eq!(player.scaled_xp(10), 13);
        assert_eq!(player.scaled_xp(0), 0);
    }
}
