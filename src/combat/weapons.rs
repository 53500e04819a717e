//! Auto-firing weapons, targeting, and evolution recipes.

use bevy::prelude::*;
use rand::Rng;
use serde::Deserialize;
use std::f32::consts::{PI, TAU};

use super::components::*;
use crate::enemies::Enemy;
use crate::player::Player;
use crate::world::{direction, distance_squared, ValidationError};

pub const MAX_WEAPON_LEVEL: u32 = 8;
/// Weapon level needed before an evolution artifact takes effect.
pub const EVOLUTION_LEVEL: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeaponKind {
    Talisman,
    FanWind,
    Moktak,
    JakduBlade,
    DokkaebiFire,
    PurifyingWater,
}

impl WeaponKind {
    pub const ALL: [WeaponKind; 6] = [
        WeaponKind::Talisman,
        WeaponKind::FanWind,
        WeaponKind::Moktak,
        WeaponKind::JakduBlade,
        WeaponKind::DokkaebiFire,
        WeaponKind::PurifyingWater,
    ];

    pub fn id(self) -> &'static str {
        match self {
            WeaponKind::Talisman => "talisman",
            WeaponKind::FanWind => "fan_wind",
            WeaponKind::Moktak => "moktak",
            WeaponKind::JakduBlade => "jakdu_blade",
            WeaponKind::DokkaebiFire => "dokkaebi_fire",
            WeaponKind::PurifyingWater => "purifying_water",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.id() == id)
    }

    pub fn display_name(self) -> &'static str {
        match self {
            WeaponKind::Talisman => "Talisman",
            WeaponKind::FanWind => "Fan Wind",
            WeaponKind::Moktak => "Moktak",
            WeaponKind::JakduBlade => "Jakdu Blade",
            WeaponKind::DokkaebiFire => "Dokkaebi Fire",
            WeaponKind::PurifyingWater => "Purifying Water",
        }
    }

    pub fn category(self) -> WeaponCategory {
        match self {
            WeaponKind::Talisman | WeaponKind::FanWind => WeaponCategory::Projectile,
            WeaponKind::Moktak | WeaponKind::PurifyingWater => WeaponCategory::Area,
            WeaponKind::JakduBlade => WeaponCategory::Melee,
            WeaponKind::DokkaebiFire => WeaponCategory::Orbital,
        }
    }
}

/// What evolving does to a weapon.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EvolutionProfile {
    pub damage_multiplier: f32,
    pub cooldown_multiplier: f32,
    /// Added to the volley count and to its cap.
    pub extra_count: u32,
}

impl Default for EvolutionProfile {
    fn default() -> Self {
        Self {
            damage_multiplier: 1.0,
            cooldown_multiplier: 1.0,
            extra_count: 0,
        }
    }
}

/// Base numbers for one weapon plus its per-level growth.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WeaponStats {
    pub damage: f32,
    pub cooldown: f32,
    pub damage_per_level: f32,
    pub cooldown_reduction_per_level: f32,
    pub min_cooldown: f32,
    /// Projectile speed, or orbit angular speed for orbitals.
    pub speed: f32,
    /// Projectile radius, AoE radius, blade reach, or orbit radius.
    pub radius: f32,
    /// Projectile lifetime, or how long an area stays up.
    pub lifetime: f32,
    /// `None` pierces without limit.
    pub piercing: Option<u32>,
    /// Projectiles per volley, flames per orbit, or bottles per throw.
    pub count: u32,
    /// One more in the volley every this many levels past the first. Zero never grows.
    pub count_step: u32,
    pub max_count: u32,
    /// Spread between projectiles of one volley, radians.
    pub spread: f32,
    /// Seconds between ticks for per-tick weapons.
    pub tick_interval: f32,
    pub decay_per_hit: f32,
    pub decay_min: f32,
    pub max_range: f32,
    pub evolution: EvolutionProfile,
}

impl Default for WeaponStats {
    fn default() -> Self {
        Self {
            damage: 10.0,
            cooldown: 1.0,
            damage_per_level: 0.0,
            cooldown_reduction_per_level: 0.0,
            min_cooldown: 0.1,
            speed: 0.0,
            radius: 10.0,
            lifetime: 1.0,
            piercing: Some(0),
            count: 1,
            count_step: 0,
            max_count: 1,
            spread: 0.0,
            tick_interval: 0.0,
            decay_per_hit: 0.0,
            decay_min: 1.0,
            max_range: f32::INFINITY,
            evolution: EvolutionProfile::default(),
        }
    }
}

impl WeaponStats {
    pub fn damage_at(&self, level: u32, evolved: bool) -> f32 {
        let base = self.damage + self.damage_per_level * level.saturating_sub(1) as f32;
        if evolved {
            base * self.evolution.damage_multiplier
        } else {
            base
        }
    }

    pub fn cooldown_at(&self, level: u32, evolved: bool) -> f32 {
        let base = (self.cooldown - self.cooldown_reduction_per_level * level.saturating_sub(1) as f32).max(self.min_cooldown);
        if evolved {
            base * self.evolution.cooldown_multiplier
        } else {
            base
        }
    }

    pub fn count_at(&self, level: u32, evolved: bool) -> u32 {
        let grown = match self.count_step {
            0 => 0,
            step => level.saturating_sub(1) / step,
        };
        let count = (self.count + grown).min(self.max_count.max(self.count));
        let extra = if evolved { self.evolution.extra_count } else { 0 };
        (count + extra).max(1)
    }

    pub fn piercing(&self) -> Piercing {
        match self.piercing {
            Some(n) => Piercing::Finite(n),
            None => Piercing::Infinite,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WeaponBalanceTable {
    pub talisman: WeaponStats,
    pub fan_wind: WeaponStats,
    pub moktak: WeaponStats,
    pub jakdu_blade: WeaponStats,
    pub dokkaebi_fire: WeaponStats,
    pub purifying_water: WeaponStats,
}

impl Default for WeaponBalanceTable {
    fn default() -> Self {
        Self {
            talisman: WeaponStats {
                damage: 15.0,
                cooldown: 1.0,
                damage_per_level: 5.0,
                cooldown_reduction_per_level: 0.05,
                speed: 500.0,
                radius: 8.0,
                lifetime: 3.0,
                piercing: Some(0),
                max_range: 800.0,
                evolution: EvolutionProfile {
                    damage_multiplier: 1.5,
                    cooldown_multiplier: 0.8,
                    extra_count: 2,
                },
                ..default()
            },
            fan_wind: WeaponStats {
                damage: 12.0,
                cooldown: 2.0,
                damage_per_level: 8.0,
                cooldown_reduction_per_level: 0.15,
                speed: 350.0,
                radius: 15.0,
                lifetime: 1.2,
                piercing: None,
                count: 1,
                count_step: 1,
                max_count: 5,
                spread: 0.3,
                decay_per_hit: 0.2,
                decay_min: 0.33,
                max_range: 600.0,
                evolution: EvolutionProfile {
                    damage_multiplier: 1.4,
                    cooldown_multiplier: 0.85,
                    extra_count: 2,
                },
                ..default()
            },
            moktak: WeaponStats {
                damage: 12.0,
                cooldown: 2.0,
                damage_per_level: 5.0,
                cooldown_reduction_per_level: 0.1,
                radius: 150.0,
                lifetime: 0.3,
                piercing: None,
                evolution: EvolutionProfile {
                    damage_multiplier: 1.5,
                    cooldown_multiplier: 0.8,
                    extra_count: 0,
                },
                ..default()
            },
            jakdu_blade: WeaponStats {
                damage: 18.0,
                cooldown: 3.0,
                damage_per_level: 6.0,
                cooldown_reduction_per_level: 0.1,
                radius: 120.0,
                lifetime: 0.3,
                piercing: None,
                evolution: EvolutionProfile {
                    damage_multiplier: 1.6,
                    cooldown_multiplier: 0.75,
                    extra_count: 0,
                },
                ..default()
            },
            dokkaebi_fire: WeaponStats {
                damage: 8.0,
                cooldown: 3.0,
                damage_per_level: 3.0,
                cooldown_reduction_per_level: 0.1,
                speed: 3.5,
                radius: 80.0,
                lifetime: 5.0,
                piercing: None,
                count: 3,
                count_step: 3,
                max_count: 5,
                tick_interval: 0.25,
                evolution: EvolutionProfile {
                    damage_multiplier: 1.4,
                    cooldown_multiplier: 1.0,
                    extra_count: 2,
                },
                ..default()
            },
            purifying_water: WeaponStats {
                damage: 20.0,
                cooldown: 2.5,
                damage_per_level: 6.0,
                cooldown_reduction_per_level: 0.1,
                // Bottle flight speed.
                speed: 300.0,
                // Splash radius.
                radius: 80.0,
                // Splash duration.
                lifetime: 2.0,
                piercing: None,
                count: 1,
                count_step: 3,
                max_count: 3,
                spread: 0.5,
                tick_interval: 0.5,
                max_range: 500.0,
                evolution: EvolutionProfile {
                    damage_multiplier: 1.5,
                    cooldown_multiplier: 0.9,
                    extra_count: 1,
                },
                ..default()
            },
        }
    }
}

impl WeaponBalanceTable {
    pub fn stats(&self, kind: WeaponKind) -> &WeaponStats {
        match kind {
            WeaponKind::Talisman => &self.talisman,
            WeaponKind::FanWind => &self.fan_wind,
            WeaponKind::Moktak => &self.moktak,
            WeaponKind::JakduBlade => &self.jakdu_blade,
            WeaponKind::DokkaebiFire => &self.dokkaebi_fire,
            WeaponKind::PurifyingWater => &self.purifying_water,
        }
    }
}

/// One owned weapon.
#[derive(Debug, Clone)]
pub struct Weapon {
    pub kind: WeaponKind,
    pub level: u32,
    pub cooldown_timer: f32,
    pub evolved: bool,
}

impl Weapon {
    pub fn new(kind: WeaponKind) -> Self {
        Self {
            kind,
            level: 1,
            cooldown_timer: 0.0,
            evolved: false,
        }
    }

    pub fn can_fire(&self) -> bool {
        self.cooldown_timer <= 0.0
    }

    pub fn is_max_level(&self) -> bool {
        self.level >= MAX_WEAPON_LEVEL
    }

    /// Count the cooldown down; `cooldown_multiplier` above one slows it.
    pub fn tick(&mut self, delta: f32, cooldown_multiplier: f32) {
        if self.cooldown_timer > 0.0 {
            self.cooldown_timer -= delta / cooldown_multiplier.max(0.01);
        }
    }
}

/// The player's weapons, in the order they were acquired.
#[derive(Resource, Debug, Clone, Default)]
pub struct Loadout {
    pub weapons: Vec<Weapon>,
}

impl Loadout {
    pub fn starting() -> Self {
        Self {
            weapons: vec![Weapon::new(WeaponKind::Talisman)],
        }
    }

    pub fn has(&self, kind: WeaponKind) -> bool {
        self.weapons.iter().any(|w| w.kind == kind)
    }

    pub fn get(&self, kind: WeaponKind) -> Option<&Weapon> {
        self.weapons.iter().find(|w| w.kind == kind)
    }

    /// Add a weapon at level 1. False if already owned.
    pub fn add(&mut self, kind: WeaponKind) -> bool {
        if self.has(kind) {
            return false;
        }
        self.weapons.push(Weapon::new(kind));
        true
    }

    /// Raise a weapon one level. False if missing or maxed.
    pub fn upgrade(&mut self, kind: WeaponKind) -> bool {
        match self.weapons.iter_mut().find(|w| w.kind == kind) {
            Some(weapon) if !weapon.is_max_level() => {
                weapon.level += 1;
                true
            }
            _ => false,
        }
    }
}

/// Active, living enemies within `max_range` of `origin`, nearest first.
pub fn find_closest_enemies(origin: Vec2, enemies: &[Enemy], count: usize, max_range: f32) -> Vec<&Enemy> {
    let max_sq = max_range * max_range;
    let mut candidates: Vec<(&Enemy, f32)> = enemies
        .iter()
        .filter(|e| e.active && e.is_alive())
        .map(|e| (e, distance_squared(origin, e.position)))
        .filter(|(_, d)| *d <= max_sq)
        .collect();
    candidates.sort_by(|a, b| a.1.total_cmp(&b.1));
    candidates.into_iter().take(count).map(|(e, _)| e).collect()
}

/// Heading for each shot of a volley: one per target while targets last,
/// then fanned out past the nearest one by `spread`.
fn volley_angles(origin: Vec2, targets: &[Vec2], count: u32, spread: f32) -> Vec<f32> {
    let heading = |target: Vec2| {
        let aim = direction(origin, target);
        aim.y.atan2(aim.x)
    };
    let Some(&nearest) = targets.first() else {
        return Vec::new();
    };
    (0..count as usize)
        .map(|i| match targets.get(i) {
            Some(&target) => heading(target),
            None => heading(nearest) + spread * (i + 1 - targets.len()) as f32,
        })
        .collect()
}

/// Where each bottle of a throw lands. Several bottles fan out across `spread`
/// at the distance of their own target.
fn throw_landings(origin: Vec2, targets: &[Vec2], spread: f32) -> Vec<Vec2> {
    let n = targets.len();
    targets
        .iter()
        .enumerate()
        .map(|(i, &target)| {
            if n < 2 {
                return target;
            }
            let offset = target - origin;
            let angle = offset.y.atan2(offset.x) + (i as f32 - (n - 1) as f32 / 2.0) * (spread / (n - 1) as f32);
            origin + Vec2::new(angle.cos(), angle.sin()) * offset.length()
        })
        .collect()
}

/// Tick every cooldown and emit attacks for weapons that are ready.
pub fn fire_weapons(
    loadout: &mut Loadout,
    table: &WeaponBalanceTable,
    knockback: &KnockbackBalance,
    player: &Player,
    enemies: &[Enemy],
    attacks: &mut PlayerAttacks,
    projectile_cap: usize,
    delta: f32,
    rng: &mut impl Rng,
) {
    for weapon in loadout.weapons.iter_mut() {
        weapon.tick(delta, player.cooldown_multiplier);
        if !weapon.can_fire() {
            continue;
        }
        let stats = table.stats(weapon.kind);
        let (is_critical, multiplier) = player.roll_critical(rng);
        let damage = stats.damage_at(weapon.level, weapon.evolved) * multiplier;
        let count = stats.count_at(weapon.level, weapon.evolved);

        match weapon.kind {
            WeaponKind::Talisman | WeaponKind::FanWind => {
                let targets: Vec<Vec2> = find_closest_enemies(player.position, enemies, count as usize, stats.max_range)
                    .iter()
                    .map(|e| e.position)
                    .collect();
                if targets.is_empty() {
                    // Hold the shot until something is in range.
                    continue;
                }
                if attacks.projectiles.len() >= projectile_cap {
                    debug!("Projectile cap reached, {} holds fire", weapon.kind.id());
                    continue;
                }
                for angle in volley_angles(player.position, &targets, count, stats.spread) {
                    if attacks.projectiles.len() >= projectile_cap {
                        break;
                    }
                    let velocity = Vec2::new(angle.cos(), angle.sin()) * stats.speed;
                    let id = attacks.next_projectile_id();
                    let mut projectile = Projectile::new(id, player.position, velocity, stats.radius, damage, stats.lifetime)
                        .with_piercing(stats.piercing());
                    projectile.knockback = knockback.projectile;
                    projectile.is_critical = is_critical;
                    if stats.decay_per_hit > 0.0 {
                        projectile.decay = Some(DamageDecay {
                            per_hit: stats.decay_per_hit,
                            min_factor: stats.decay_min,
                        });
                    }
                    attacks.projectiles.push(projectile);
                }
            }
            WeaponKind::Moktak => {
                let mut ring = AoeEffect::new(player.position, stats.radius, damage, stats.lifetime);
                ring.follow_player = true;
                ring.knockback = knockback.area;
                ring.is_critical = is_critical;
                attacks.effects.push(ring);
            }
            WeaponKind::JakduBlade => {
                let facing = player.facing;
                let start = facing.y.atan2(facing.x) - PI / 2.0;
                let mut swing = MeleeSwing::new(player.position, start, stats.radius, damage);
                swing.max_lifetime = stats.lifetime;
                swing.knockback = knockback.jakdu;
                swing.is_critical = is_critical;
                attacks.swings.push(swing);
            }
            WeaponKind::DokkaebiFire => {
                for i in 0..count {
                    let angle = TAU * i as f32 / count as f32;
                    let mut flame = AoeEffect::new(player.position, 16.0, damage, stats.lifetime);
                    flame.category = WeaponCategory::Orbital;
                    flame.hit_policy = HitPolicy::EveryTick(stats.tick_interval);
                    flame.knockback = knockback.orbital;
                    flame.is_critical = is_critical;
                    flame.orbit = Some(Orbit {
                        radius: stats.radius,
                        angular_speed: stats.speed,
                        angle,
                    });
                    flame.advance(0.0, player.position);
                    attacks.effects.push(flame);
                }
            }
            WeaponKind::PurifyingWater => {
                let targets: Vec<Vec2> = find_closest_enemies(player.position, enemies, count as usize, stats.max_range)
                    .iter()
                    .map(|e| e.position)
                    .collect();
                if targets.is_empty() {
                    continue;
                }
                for landing in throw_landings(player.position, &targets, stats.spread) {
                    // The splash waits out the bottle's flight.
                    let mut splash = AoeEffect::new(landing, stats.radius, damage, stats.lifetime);
                    splash.start_delay = player.position.distance(landing) / stats.speed.max(1.0);
                    splash.hit_policy = HitPolicy::EveryTick(stats.tick_interval);
                    splash.knockback = knockback.area;
                    splash.is_critical = is_critical;
                    attacks.effects.push(splash);
                }
            }
        }

        weapon.cooldown_timer = stats.cooldown_at(weapon.level, weapon.evolved);
        // Orbitals stay up for their lifetime before the cooldown starts.
        if weapon.kind == WeaponKind::DokkaebiFire {
            weapon.cooldown_timer += stats.lifetime;
        }
    }
}

/// Weapon + artifact -> evolved weapon.
#[derive(Debug, Clone, PartialEq)]
pub struct EvolutionRecipe {
    pub weapon: &'static str,
    pub artifact: &'static str,
    pub evolved_name: &'static str,
}

pub const EVOLUTION_RECIPES: [EvolutionRecipe; 6] = [
    EvolutionRecipe {
        weapon: "talisman",
        artifact: "fine_line_mirror",
        evolved_name: "Fine-Line Mirror Seal",
    },
    EvolutionRecipe {
        weapon: "jakdu_blade",
        artifact: "baekje_incense_burner",
        evolved_name: "Incense Burner Blade",
    },
    EvolutionRecipe {
        weapon: "dokkaebi_fire",
        artifact: "crown_of_silla",
        evolved_name: "Golden Crown Flames",
    },
    EvolutionRecipe {
        weapon: "moktak",
        artifact: "pensive_buddha",
        evolved_name: "Pensive Bodhisattva Bell",
    },
    EvolutionRecipe {
        weapon: "fan_wind",
        artifact: "celestial_horse",
        evolved_name: "Celestial Horse Gale",
    },
    EvolutionRecipe {
        weapon: "purifying_water",
        artifact: "celadon_crane_vase",
        evolved_name: "Celadon Crane Vase Spring",
    },
];

pub fn recipe_for(weapon: WeaponKind) -> Option<&'static EvolutionRecipe> {
    EVOLUTION_RECIPES.iter().find(|r| r.weapon == weapon.id())
}

/// Evolve every weapon at `EVOLUTION_LEVEL` whose artifact is held.
/// Returns the kinds that evolved this call.
pub fn evolve(loadout: &mut Loadout, held_artifacts: &[&str]) -> Vec<WeaponKind> {
    evolve_with(loadout, held_artifacts, &EVOLUTION_RECIPES)
}

fn evolve_with(loadout: &mut Loadout, held_artifacts: &[&str], recipes: &[EvolutionRecipe]) -> Vec<WeaponKind> {
    let mut evolved = Vec::new();
    for weapon in loadout.weapons.iter_mut().filter(|w| !w.evolved && w.level >= EVOLUTION_LEVEL) {
        let Some(recipe) = recipes.iter().find(|r| r.weapon == weapon.kind.id()) else {
            continue;
        };
        if recipe.evolved_name.is_empty() || !held_artifacts.contains(&recipe.artifact) {
            continue;
        }
        weapon.evolved = true;
        info!("{} evolved into {}", weapon.kind.display_name(), recipe.evolved_name);
        evolved.push(weapon.kind);
    }
    evolved
}

/// Development-time check that every recipe points at real ids and
/// produces an evolved weapon. `is_evolution_artifact` answers `None` for
/// unknown artifact ids.
pub fn validate_evolutions(recipes: &[EvolutionRecipe], is_evolution_artifact: impl Fn(&str) -> Option<bool>) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for recipe in recipes {
        let Some(kind) = WeaponKind::from_id(recipe.weapon) else {
            errors.push(ValidationError::UnknownWeapon(recipe.weapon.to_string()));
            continue;
        };
        match is_evolution_artifact(recipe.artifact) {
            None => errors.push(ValidationError::UnknownArtifact(recipe.artifact.to_string())),
            Some(false) => errors.push(ValidationError::NotEvolutionArtifact(recipe.artifact.to_string())),
            Some(true) => {}
        }
        let mut probe = Loadout {
            weapons: vec![Weapon {
                level: EVOLUTION_LEVEL,
                ..Weapon::new(kind)
            }],
        };
        if evolve_with(&mut probe, &[recipe.artifact], std::slice::from_ref(recipe)).is_empty() {
            errors.push(ValidationError::MissingEvolvedMarker(recipe.weapon.to_string()));
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enemies::{EnemyStats, EnemyTier};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn enemy(id: &str, pos: Vec2) -> Enemy {
        Enemy::new(id, "skeleton", EnemyTier::Low, pos, &EnemyStats::default())
    }

    #[test]
    fn closest_enemies_sorted_and_filtered() {
        let mut far = enemy("far", Vec2::new(300.0, 0.0));
        let near = enemy("near", Vec2::new(50.0, 0.0));
        let mid = enemy("mid", Vec2::new(100.0, 0.0));
        let mut dead = enemy("dead", Vec2::new(10.0, 0.0));
        dead.active = false;
        far.health = 10.0;
        let enemies = vec![far, near, mid, dead];

        let found: Vec<&str> = find_closest_enemies(Vec2::ZERO, &enemies, 5, 200.0).iter().map(|e| e.id.as_str()).collect();
        assert_eq!(found, vec!["near", "mid"]);
        assert_eq!(find_closest_enemies(Vec2::ZERO, &enemies, 1, f32::INFINITY)[0].id, "near");
    }

    #[test]
    fn talisman_fires_at_nearest_and_waits_for_cooldown() {
        let mut loadout = Loadout::starting();
        let table = WeaponBalanceTable::default();
        let mut player = Player::default();
        player.critical_rate = 0.0;
        let enemies = vec![enemy("a", Vec2::new(0.0, 200.0))];
        let mut attacks = PlayerAttacks::default();
        let mut rng = StdRng::seed_from_u64(1);

        fire_weapons(&mut loadout, &table, &KnockbackBalance::default(), &player, &enemies, &mut attacks, 500, 0.016, &mut rng);
        assert_eq!(attacks.projectiles.len(), 1);
        let shot = &attacks.projectiles[0];
        assert!(shot.velocity.y > 499.0);
        assert_eq!(shot.damage, 15.0);
        assert_eq!(shot.piercing, Piercing::Finite(0));

        fire_weapons(&mut loadout, &table, &KnockbackBalance::default(), &player, &enemies, &mut attacks, 500, 0.5, &mut rng);
        assert_eq!(attacks.projectiles.len(), 1);
    }

    #[test]
    fn no_target_means_no_shot_and_no_cooldown() {
        let mut loadout = Loadout::starting();
        let mut attacks = PlayerAttacks::default();
        let mut rng = StdRng::seed_from_u64(1);
        fire_weapons(&mut loadout, &WeaponBalanceTable::default(), &KnockbackBalance::default(), &Player::default(), &[], &mut attacks, 500, 0.1, &mut rng);
        assert!(attacks.projectiles.is_empty());
        assert!(loadout.weapons[0].can_fire());
    }

    #[test]
    fn fan_wind_volley_pierces_forever_with_decay() {
        let mut loadout = Loadout {
            weapons: vec![Weapon::new(WeaponKind::FanWind)],
        };
        let mut player = Player::default();
        player.critical_rate = 0.0;
        let enemies = vec![enemy("a", Vec2::new(100.0, 0.0))];
        let mut attacks = PlayerAttacks::default();
        let mut rng = StdRng::seed_from_u64(2);
        fire_weapons(&mut loadout, &WeaponBalanceTable::default(), &KnockbackBalance::default(), &player, &enemies, &mut attacks, 500, 0.016, &mut rng);
        assert_eq!(attacks.projectiles.len(), 1);
        assert!(attacks.projectiles.iter().all(|p| p.piercing == Piercing::Infinite && p.decay.is_some()));
    }

    #[test]
    fn fan_wind_grows_with_level_and_splits_across_targets() {
        let stats = WeaponBalanceTable::default().fan_wind;
        let counts: Vec<u32> = (1..=MAX_WEAPON_LEVEL).map(|level| stats.count_at(level, false)).collect();
        assert_eq!(counts, vec![1, 2, 3, 4, 5, 5, 5, 5]);

        let mut loadout = Loadout {
            weapons: vec![Weapon {
                level: 3,
                ..Weapon::new(WeaponKind::FanWind)
            }],
        };
        let mut player = Player::default();
        player.critical_rate = 0.0;
        let enemies = vec![
            enemy("east", Vec2::new(100.0, 0.0)),
            enemy("south", Vec2::new(0.0, 120.0)),
            enemy("west", Vec2::new(-140.0, 0.0)),
        ];
        let mut attacks = PlayerAttacks::default();
        let mut rng = StdRng::seed_from_u64(4);
        fire_weapons(&mut loadout, &WeaponBalanceTable::default(), &KnockbackBalance::default(), &player, &enemies, &mut attacks, 500, 0.016, &mut rng);

        let headings: Vec<Vec2> = attacks.projectiles.iter().map(|p| p.velocity.normalize()).collect();
        assert_eq!(headings.len(), 3);
        assert!(headings[0].distance(Vec2::X) < 1e-4);
        assert!(headings[1].distance(Vec2::Y) < 1e-4);
        assert!(headings[2].distance(-Vec2::X) < 1e-4);
    }

    #[test]
    fn extra_shots_fan_out_past_the_nearest_target() {
        let angles = volley_angles(Vec2::ZERO, &[Vec2::new(100.0, 0.0)], 3, 0.3);
        assert_eq!(angles.len(), 3);
        assert!(angles[0].abs() < 1e-6);
        assert!((angles[1] - 0.3).abs() < 1e-6);
        assert!((angles[2] - 0.6).abs() < 1e-6);
        assert!(volley_angles(Vec2::ZERO, &[], 3, 0.3).is_empty());
    }

    #[test]
    fn evolution_uses_each_weapons_own_profile() {
        let table = WeaponBalanceTable::default();
        let talisman = &table.talisman;
        assert_eq!(talisman.count_at(EVOLUTION_LEVEL, false), 1);
        assert_eq!(talisman.count_at(EVOLUTION_LEVEL, true), 3);
        assert!((talisman.damage_at(EVOLUTION_LEVEL, true) - talisman.damage_at(EVOLUTION_LEVEL, false) * 1.5).abs() < 1e-4);
        assert!(talisman.cooldown_at(EVOLUTION_LEVEL, true) < talisman.cooldown_at(EVOLUTION_LEVEL, false));

        let blade = &table.jakdu_blade;
        assert!((blade.damage_at(1, true) - 18.0 * 1.6).abs() < 1e-4);
        assert_eq!(table.dokkaebi_fire.count_at(MAX_WEAPON_LEVEL, true), 7);
        assert_ne!(table.moktak.evolution, table.jakdu_blade.evolution);
    }

    #[test]
    fn evolved_talisman_fires_a_wider_volley() {
        let mut loadout = Loadout {
            weapons: vec![Weapon {
                level: EVOLUTION_LEVEL,
                evolved: true,
                ..Weapon::new(WeaponKind::Talisman)
            }],
        };
        let mut player = Player::default();
        player.critical_rate = 0.0;
        let enemies = vec![enemy("a", Vec2::new(100.0, 0.0)), enemy("b", Vec2::new(0.0, 200.0))];
        let mut attacks = PlayerAttacks::default();
        let mut rng = StdRng::seed_from_u64(5);
        fire_weapons(&mut loadout, &WeaponBalanceTable::default(), &KnockbackBalance::default(), &player, &enemies, &mut attacks, 500, 0.016, &mut rng);

        assert_eq!(attacks.projectiles.len(), 3);
        let expected = WeaponBalanceTable::default().talisman.damage_at(EVOLUTION_LEVEL, true);
        assert!(attacks.projectiles.iter().all(|p| (p.damage - expected).abs() < 1e-4));
    }

    #[test]
    fn purifying_water_throws_a_delayed_splash_at_the_target() {
        let mut loadout = Loadout {
            weapons: vec![Weapon::new(WeaponKind::PurifyingWater)],
        };
        let mut player = Player::default();
        player.critical_rate = 0.0;
        let target = player.position + Vec2::new(150.0, 0.0);
        let enemies = vec![enemy("a", target)];
        let mut attacks = PlayerAttacks::default();
        let mut rng = StdRng::seed_from_u64(6);
        fire_weapons(&mut loadout, &WeaponBalanceTable::default(), &KnockbackBalance::default(), &player, &enemies, &mut attacks, 500, 0.016, &mut rng);

        assert_eq!(attacks.effects.len(), 1);
        let splash = &attacks.effects[0];
        assert_eq!(splash.position, target);
        assert!((splash.start_delay - 0.5).abs() < 1e-4);
        assert_eq!(splash.hit_policy, HitPolicy::EveryTick(0.5));
        assert!(!splash.is_started());
        assert!(!loadout.weapons[0].can_fire());
    }

    #[test]
    fn several_bottles_fan_out_at_their_targets_distance() {
        let landings = throw_landings(Vec2::ZERO, &[Vec2::new(100.0, 0.0), Vec2::new(200.0, 0.0)], 0.5);
        assert_eq!(landings.len(), 2);
        assert!((landings[0].length() - 100.0).abs() < 1e-3);
        assert!((landings[1].length() - 200.0).abs() < 1e-3);
        assert!(landings[0].y < 0.0 && landings[1].y > 0.0);
        assert_eq!(throw_landings(Vec2::ZERO, &[Vec2::new(50.0, 5.0)], 0.5), vec![Vec2::new(50.0, 5.0)]);
    }

    #[test]
    fn projectile_cap_blocks_new_shots() {
        let mut loadout = Loadout::starting();
        let enemies = vec![enemy("a", Vec2::new(100.0, 0.0))];
        let mut attacks = PlayerAttacks::default();
        for _ in 0..3 {
            let id = attacks.next_projectile_id();
            attacks.projectiles.push(Projectile::new(id, Vec2::ZERO, Vec2::X, 4.0, 1.0, 5.0));
        }
        let mut rng = StdRng::seed_from_u64(3);
        fire_weapons(&mut loadout, &WeaponBalanceTable::default(), &KnockbackBalance::default(), &Player::default(), &enemies, &mut attacks, 3, 0.016, &mut rng);
        assert_eq!(attacks.projectiles.len(), 3);
    }

    #[test]
    fn cooldown_multiplier_slows_ticks() {
        let mut weapon = Weapon::new(WeaponKind::Moktak);
        weapon.cooldown_timer = 1.0;
        weapon.tick(0.5, 2.0);
        assert!((weapon.cooldown_timer - 0.75).abs() < 1e-6);
    }

    #[test]
    fn level_scaling() {
        let stats = WeaponBalanceTable::default().talisman;
        assert_eq!(stats.damage_at(1, false), 15.0);
        assert_eq!(stats.damage_at(3, false), 25.0);
        assert!((stats.cooldown_at(3, false) - 0.9).abs() < 1e-6);
    }

    #[test]
    fn loadout_add_and_upgrade_limits() {
        let mut loadout = Loadout::starting();
        assert!(!loadout.add(WeaponKind::Talisman));
        assert!(loadout.add(WeaponKind::Moktak));
        for _ in 0..7 {
            assert!(loadout.upgrade(WeaponKind::Moktak));
        }
        assert!(!loadout.upgrade(WeaponKind::Moktak));
        assert!(!loadout.upgrade(WeaponKind::JakduBlade));
    }

    #[test]
    fn evolution_needs_level_and_artifact() {
        let mut loadout = Loadout::starting();
        assert!(evolve(&mut loadout, &["fine_line_mirror"]).is_empty());
        loadout.weapons[0].level = EVOLUTION_LEVEL;
        assert!(evolve(&mut loadout, &["chuksal"]).is_empty());
        assert_eq!(evolve(&mut loadout, &["fine_line_mirror"]), vec![WeaponKind::Talisman]);
        assert!(loadout.weapons[0].evolved);
    }

    #[test]
    fn validation_reports_bad_recipes() {
        let known = |id: &str| match id {
            "fine_line_mirror" => Some(true),
            "chuksal" => Some(false),
            _ => None,
        };
        let recipes = [
            EvolutionRecipe {
                weapon: "talisman",
                artifact: "fine_line_mirror",
                evolved_name: "ok",
            },
            EvolutionRecipe {
                weapon: "bow",
                artifact: "fine_line_mirror",
                evolved_name: "x",
            },
            EvolutionRecipe {
                weapon: "talisman",
                artifact: "chuksal",
                evolved_name: "x",
            },
            EvolutionRecipe {
                weapon: "talisman",
                artifact: "nothing",
                evolved_name: "x",
            },
            EvolutionRecipe {
                weapon: "moktak",
                artifact: "fine_line_mirror",
                evolved_name: "",
            },
        ];
        let errors = validate_evolutions(&recipes, known);
        assert_eq!(
            errors,
            vec![
                ValidationError::UnknownWeapon("bow".into()),
                ValidationError::NotEvolutionArtifact("chuksal".into()),
                ValidationError::UnknownArtifact("nothing".into()),
                ValidationError::MissingEvolvedMarker("moktak".into()),
            ]
        );
    }
}
