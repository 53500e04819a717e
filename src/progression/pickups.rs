//! XP gems and health potions dropped by enemies.

use bevy::prelude::*;
use serde::Deserialize;

use crate::core::EnemyKilledEvent;
use crate::enemies::EnemyTier;
use crate::player::Player;
use crate::world::distance;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct XpBalance {
    pub gem_radius: f32,
    /// Top speed of an attracted gem.
    pub gem_speed: f32,
    /// Seconds before an uncollected gem disappears.
    pub gem_lifetime: f32,
    pub pickup_radius: f32,
    /// Attracted gems are collected inside this distance.
    pub collect_distance: f32,
    /// How fast an attracted gem picks up speed, per second.
    pub magnet_acceleration: f32,
}

impl Default for XpBalance {
    fn default() -> Self {
        Self {
            gem_radius: 10.0,
            gem_speed: 500.0,
            gem_lifetime: 120.0,
            pickup_radius: 80.0,
            collect_distance: 60.0,
            magnet_acceleration: 2000.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PotionBalance {
    pub drop_rate: f32,
    /// Fraction of max health restored.
    pub heal_amount: f32,
    pub attract_radius: f32,
    pub attract_speed: f32,
    pub radius: f32,
}

impl Default for PotionBalance {
    fn default() -> Self {
        Self {
            drop_rate: 0.05,
            heal_amount: 0.5,
            attract_radius: 80.0,
            attract_speed: 300.0,
            radius: 12.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct XpGem {
    pub position: Vec2,
    pub value: u32,
    pub active: bool,
    pub lifetime: f32,
    pub attracted: bool,
    magnet_speed: f32,
}

impl XpGem {
    pub fn new(position: Vec2, value: u32, lifetime: f32) -> Self {
        Self {
            position,
            value,
            active: true,
            lifetime,
            attracted: false,
            magnet_speed: 0.0,
        }
    }

    /// Expire, get pulled toward the player, or be collected. Returns XP on collection.
    pub fn update(&mut self, delta: f32, player: &Player, balance: &XpBalance) -> Option<u32> {
        if !self.active {
            return None;
        }
        self.lifetime -= delta;
        if self.lifetime <= 0.0 {
            self.active = false;
            return None;
        }

        let offset = player.position - self.position;
        let dist = offset.length();
        if !self.attracted && dist < balance.pickup_radius * player.pickup_multiplier {
            self.attracted = true;
        }
        if !self.attracted {
            return None;
        }

        self.magnet_speed = (self.magnet_speed + delta * balance.magnet_acceleration).min(balance.gem_speed);
        if dist > 0.0 {
            let ratio = (self.magnet_speed * delta / dist).min(1.0);
            self.position += offset * ratio;
        }
        if dist < balance.collect_distance {
            self.active = false;
            return Some(self.value);
        }
        None
    }
}

#[derive(Debug, Clone)]
pub struct Potion {
    pub position: Vec2,
    pub radius: f32,
    pub active: bool,
    pub attracted: bool,
}

impl Potion {
    pub fn new(position: Vec2, radius: f32) -> Self {
        Self {
            position,
            radius,
            active: true,
            attracted: false,
        }
    }

    /// Heal on touch, otherwise drift toward the player once in range.
    /// Returns the health restored on collection.
    pub fn update(&mut self, delta: f32, player: &mut Player, balance: &PotionBalance) -> Option<f32> {
        if !self.active {
            return None;
        }
        let dist = distance(self.position, player.position);
        if dist < player.radius + self.radius {
            self.active = false;
            return Some(player.heal(player.max_health * balance.heal_amount));
        }
        if dist < balance.attract_radius * player.pickup_multiplier {
            self.attracted = true;
        }
        if self.attracted && dist > 0.0 {
            let step = (balance.attract_speed * delta).min(dist);
            self.position += (player.position - self.position) / dist * step;
        }
        None
    }
}

/// What the player picked up this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PickupOutcome {
    pub xp: u32,
    pub healed: f32,
}

/// Every gem and potion lying in the world.
#[derive(Resource, Debug, Clone, Default)]
pub struct Pickups {
    pub gems: Vec<XpGem>,
    pub potions: Vec<Potion>,
}

impl Pickups {
    pub fn spawn_gem(&mut self, position: Vec2, value: u32, balance: &XpBalance) {
        if value > 0 {
            self.gems.push(XpGem::new(position, value, balance.gem_lifetime));
        }
    }

    pub fn spawn_potion(&mut self, position: Vec2, balance: &PotionBalance) {
        self.potions.push(Potion::new(position, balance.radius));
    }

    /// Loot for a kill. The boss drops its own reward.
    pub fn drop_for_kill(&mut self, kill: &EnemyKilledEvent, xp: &XpBalance, potion: &PotionBalance) {
        if kill.tier == EnemyTier::Boss {
            return;
        }
        self.spawn_gem(kill.position, kill.xp_value, xp);
        if kill.drop_potion {
            self.spawn_potion(kill.position, potion);
        }
    }

    pub fn update(&mut self, delta: f32, player: &mut Player, xp: &XpBalance, potion: &PotionBalance) -> PickupOutcome {
        let mut outcome = PickupOutcome::default();
        for gem in &mut self.gems {
            if let Some(value) = gem.update(delta, player, xp) {
                outcome.xp += value;
            }
        }
        for item in &mut self.potions {
            if let Some(healed) = item.update(delta, player, potion) {
                outcome.healed += healed;
            }
        }
        outcome
    }

    pub fn sweep(&mut self) {
        self.gems.retain(|g| g.active);
        self.potions.retain(|p| p.active);
    }

    pub fn clear(&mut self) {
        self.gems.clear();
        self.potions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::PlayerBalance;

    fn player_at(pos: Vec2) -> Player {
        Player::new(&PlayerBalance::default(), pos)
    }

    fn kill(tier: EnemyTier, drop_potion: bool) -> EnemyKilledEvent {
        EnemyKilledEvent {
            enemy_id: "enemy_1".into(),
            kind: "skeleton".into(),
            tier,
            position: Vec2::new(10.0, 10.0),
            xp_value: 5,
            drop_potion,
        }
    }

    #[test]
    fn gem_outside_range_stays_put() {
        let player = player_at(Vec2::ZERO);
        let mut gem = XpGem::new(Vec2::new(200.0, 0.0), 5, 120.0);
        assert_eq!(gem.update(0.1, &player, &XpBalance::default()), None);
        assert_eq!(gem.position, Vec2::new(200.0, 0.0));
    }

    #[test]
    fn gem_in_range_is_pulled_then_collected() {
        let player = player_at(Vec2::ZERO);
        let balance = XpBalance::default();
        let mut gem = XpGem::new(Vec2::new(75.0, 0.0), 5, 120.0);
        assert_eq!(gem.update(0.016, &player, &balance), None);
        assert!(gem.attracted);
        assert!(gem.position.x < 75.0);

        let mut collected = None;
        for _ in 0..60 {
            collected = collected.or(gem.update(0.016, &player, &balance));
        }
        assert_eq!(collected, Some(5));
        assert!(!gem.active);
    }

    #[test]
    fn gem_expires() {
        let player = player_at(Vec2::ZERO);
        let mut gem = XpGem::new(Vec2::new(500.0, 0.0), 5, 1.0);
        gem.update(1.5, &player, &XpBalance::default());
        assert!(!gem.active);
    }

    #[test]
    fn potion_heals_half_of_max() {
        let mut player = player_at(Vec2::ZERO);
        player.health = 20.0;
        let mut potion = Potion::new(Vec2::new(10.0, 0.0), 12.0);
        assert_eq!(potion.update(0.016, &mut player, &PotionBalance::default()), Some(50.0));
        assert_eq!(player.health, 70.0);
    }

    #[test]
    fn boss_kills_leave_no_loot() {
        let mut pickups = Pickups::default();
        pickups.drop_for_kill(&kill(EnemyTier::Boss, true), &XpBalance::default(), &PotionBalance::default());
        assert!(pickups.gems.is_empty() && pickups.potions.is_empty());

        pickups.drop_for_kill(&kill(EnemyTier::Low, true), &XpBalance::default(), &PotionBalance::default());
        assert_eq!(pickups.gems.len(), 1);
        assert_eq!(pickups.potions.len(), 1);
    }
}
