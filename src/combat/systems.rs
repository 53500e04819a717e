//! Combat systems - collision resolution, damage, kills.

use bevy::prelude::*;
use rand::{Rng, RngCore};

use super::components::*;
use super::weapons::{fire_weapons, Loadout};
use crate::artifacts::ArtifactSystem;
use crate::core::{
    AnalyticsEvent, DamageSource, EnemyHitEvent, EnemyKilledEvent, FrameSet, GameRng, GameState, PlayerDamagedEvent,
    PlayerDiedEvent, RunClock,
};
use crate::enemies::{Enemy, EnemyRoster, EnemyTier, StatusEffectKind};
use crate::player::Player;
use crate::world::{bodies_overlap, direction, Balance};

/// Damage one player attack dealt to one enemy.
#[derive(Debug, Clone, PartialEq)]
pub struct HitReport {
    pub enemy_id: String,
    pub damage: f32,
    pub is_critical: bool,
    pub category: WeaponCategory,
}

/// Everything that happened in one resolution pass.
#[derive(Debug, Default)]
pub struct CombatOutcome {
    pub hits: Vec<HitReport>,
    pub kills: Vec<EnemyKilledEvent>,
}

impl CombatOutcome {
    pub fn kill_count(&self) -> usize {
        self.kills.len()
    }
}

/// Collision-driven damage between player attacks, enemies, and the player.
#[derive(Resource, Debug, Clone)]
pub struct CombatSystem {
    /// Chance a slain non-boss enemy drops a potion.
    pub potion_drop_rate: f32,
}

impl Default for CombatSystem {
    fn default() -> Self {
        Self { potion_drop_rate: 0.05 }
    }
}

/// Mark `enemy` dead and describe the kill.
pub fn finish_kill(enemy: &mut Enemy, potion_drop_rate: f32, rng: &mut impl Rng) -> EnemyKilledEvent {
    enemy.active = false;
    let drop_potion = enemy.tier != EnemyTier::Boss && rng.gen::<f32>() < potion_drop_rate;
    EnemyKilledEvent {
        enemy_id: enemy.id.clone(),
        kind: enemy.kind.clone(),
        tier: enemy.tier,
        position: enemy.position,
        xp_value: enemy.xp_drop,
        drop_potion,
    }
}

/// One landed hit: damage, on-hit artifacts, knockback, then death.
struct Strike {
    damage: f32,
    is_critical: bool,
    category: WeaponCategory,
    knockback: f32,
    from: Vec2,
}

impl CombatSystem {
    pub fn new(potion_drop_rate: f32) -> Self {
        Self { potion_drop_rate }
    }

    /// Resolve every active player projectile, area and swing against `enemies`.
    pub fn resolve_player_attacks<R: RngCore>(
        &self,
        attacks: &mut PlayerAttacks,
        enemies: &mut [Enemy],
        artifacts: &mut ArtifactSystem,
        rng: &mut R,
    ) -> CombatOutcome {
        let mut outcome = CombatOutcome::default();

        for projectile in attacks.projectiles.iter_mut().filter(|p| p.active) {
            for enemy in enemies.iter_mut() {
                if !enemy.active || !enemy.is_alive() || projectile.has_hit(&enemy.id) {
                    continue;
                }
                if !bodies_overlap(&*projectile, &*enemy) {
                    continue;
                }
                projectile.record_hit(&enemy.id);
                let strike = Strike {
                    damage: projectile.current_damage(),
                    is_critical: projectile.is_critical,
                    category: projectile.category,
                    knockback: projectile.knockback,
                    from: projectile.position,
                };
                self.land(strike, enemy, artifacts, rng, &mut outcome);
                projectile.consume_pierce();
                if !projectile.active {
                    break;
                }
            }
        }

        for effect in attacks.effects.iter_mut().filter(|e| e.active && e.is_started()) {
            for enemy in enemies.iter_mut() {
                if !enemy.active || !enemy.is_alive() || !effect.can_hit(&enemy.id) {
                    continue;
                }
                if !effect.contains(enemy.position, enemy.radius) {
                    continue;
                }
                effect.record_hit(&enemy.id);
                let strike = Strike {
                    damage: effect.damage,
                    is_critical: effect.is_critical,
                    category: effect.category,
                    knockback: effect.knockback,
                    from: effect.position,
                };
                self.land(strike, enemy, artifacts, rng, &mut outcome);
            }
        }

        for swing in attacks.swings.iter_mut().filter(|s| s.active) {
            for enemy in enemies.iter_mut() {
                if !enemy.active || !enemy.is_alive() || swing.has_hit(&enemy.id) {
                    continue;
                }
                if !swing.reaches(enemy.position, enemy.radius) {
                    continue;
                }
                swing.record_hit(&enemy.id);
                let strike = Strike {
                    damage: swing.damage,
                    is_critical: swing.is_critical,
                    category: WeaponCategory::Melee,
                    knockback: swing.knockback,
                    from: swing.origin,
                };
                self.land(strike, enemy, artifacts, rng, &mut outcome);
            }
        }

        outcome
    }

    fn land<R: RngCore>(
        &self,
        strike: Strike,
        enemy: &mut Enemy,
        artifacts: &mut ArtifactSystem,
        rng: &mut R,
        outcome: &mut CombatOutcome,
    ) {
        let dealt = enemy.take_damage(strike.damage);
        outcome.hits.push(HitReport {
            enemy_id: enemy.id.clone(),
            damage: dealt,
            is_critical: strike.is_critical,
            category: strike.category,
        });
        artifacts.trigger_hit(enemy, dealt, strike.category, &mut *rng);
        enemy.apply_knockback(direction(strike.from, enemy.position), strike.knockback);
        if !enemy.is_alive() {
            outcome.kills.push(finish_kill(enemy, self.potion_drop_rate, rng));
        }
    }

    /// Every enemy currently touching the player, as (damage, source).
    /// Charmed enemies are friendly and never deal contact damage.
    pub fn contact_hits(&self, enemies: &[Enemy], player: &Player) -> Vec<(f32, DamageSource)> {
        enemies
            .iter()
            .filter(|e| e.active && e.is_alive() && !e.has_status(StatusEffectKind::Charmed))
            .filter(|e| bodies_overlap(*e, player))
            .map(|e| {
                let source = if e.tier == EnemyTier::Boss {
                    DamageSource::BossContact
                } else {
                    DamageSource::Contact(e.kind.clone())
                };
                (e.damage, source)
            })
            .collect()
    }
}

/// Route incoming damage through the artifacts and into the player.
/// Returns the health actually lost; zero while invincible.
pub fn apply_player_damage(player: &mut Player, artifacts: &mut ArtifactSystem, raw: f32) -> f32 {
    if !player.can_be_hit() || raw <= 0.0 {
        return 0.0;
    }
    let amount = artifacts.trigger_take_damage(raw, player);
    player.take_damage(amount)
}

/// `apply_player_damage` plus the damage event.
pub fn hurt_player(
    player: &mut Player,
    artifacts: &mut ArtifactSystem,
    raw: f32,
    source: DamageSource,
    events: &mut EventWriter<PlayerDamagedEvent>,
) -> f32 {
    let applied = apply_player_damage(player, artifacts, raw);
    if applied > 0.0 {
        events.send(PlayerDamagedEvent { amount: applied, source });
    }
    applied
}

/// Configure combat systems.
pub fn setup_combat_systems(app: &mut App) {
    app
        // Resources
        .init_resource::<CombatSystem>()
        .init_resource::<PlayerAttacks>()
        .init_resource::<Loadout>()

        .add_systems(OnEnter(GameState::InGame), reset_combat)
        .add_systems(Update, fire_player_weapons.in_set(FrameSet::Weapons))
        .add_systems(Update, advance_attacks.in_set(FrameSet::Advance))
        .add_systems(Update, (resolve_attacks, resolve_contact).chain().in_set(FrameSet::Combat))
        .add_systems(Update, (sweep_attacks, check_player_death).in_set(FrameSet::Cleanup));
}

fn reset_combat(
    balance: Res<Balance>,
    mut combat: ResMut<CombatSystem>,
    mut attacks: ResMut<PlayerAttacks>,
    mut loadout: ResMut<Loadout>,
) {
    *combat = CombatSystem::new(balance.potion.drop_rate);
    attacks.clear();
    *loadout = Loadout::starting();
}

fn fire_player_weapons(
    time: Res<Time>,
    balance: Res<Balance>,
    player: Res<Player>,
    roster: Res<EnemyRoster>,
    mut loadout: ResMut<Loadout>,
    mut attacks: ResMut<PlayerAttacks>,
    mut rng: ResMut<GameRng>,
) {
    fire_weapons(
        &mut loadout,
        &balance.weapons,
        &balance.knockback,
        &player,
        &roster.enemies,
        &mut attacks,
        balance.world.projectile_cap,
        time.delta_secs(),
        &mut rng.0,
    );
}

fn advance_attacks(time: Res<Time>, player: Res<Player>, mut attacks: ResMut<PlayerAttacks>) {
    attacks.advance(time.delta_secs(), player.position);
}

fn resolve_attacks(
    combat: Res<CombatSystem>,
    mut attacks: ResMut<PlayerAttacks>,
    mut roster: ResMut<EnemyRoster>,
    mut artifacts: ResMut<ArtifactSystem>,
    mut rng: ResMut<GameRng>,
    mut clock: ResMut<RunClock>,
    mut hit_events: EventWriter<EnemyHitEvent>,
    mut kill_events: EventWriter<EnemyKilledEvent>,
) {
    let outcome = combat.resolve_player_attacks(&mut attacks, &mut roster.enemies, &mut artifacts, &mut rng.0);

    clock.kills += outcome.kill_count() as u32;
    for hit in outcome.hits {
        hit_events.send(EnemyHitEvent {
            enemy_id: hit.enemy_id,
            damage: hit.damage,
            is_critical: hit.is_critical,
            category: hit.category,
        });
    }
    for kill in outcome.kills {
        kill_events.send(kill);
    }
}

fn resolve_contact(
    combat: Res<CombatSystem>,
    roster: Res<EnemyRoster>,
    mut player: ResMut<Player>,
    mut artifacts: ResMut<ArtifactSystem>,
    mut damage_events: EventWriter<PlayerDamagedEvent>,
) {
    for (damage, source) in combat.contact_hits(&roster.enemies, &player) {
        hurt_player(&mut player, &mut artifacts, damage, source, &mut damage_events);
    }
}

fn sweep_attacks(balance: Res<Balance>, mut attacks: ResMut<PlayerAttacks>) {
    attacks.sweep(&balance.world.bounds(), balance.world.out_of_bounds_margin);
}

/// End the run when the player is out of health.
fn check_player_death(
    player: Res<Player>,
    clock: Res<RunClock>,
    mut damaged: EventReader<PlayerDamagedEvent>,
    mut died: EventWriter<PlayerDiedEvent>,
    mut analytics: EventWriter<AnalyticsEvent>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let last_source = damaged.read().last().map(|event| event.source.clone());
    if player.is_alive() {
        return;
    }

    let cause = last_source.unwrap_or_else(|| DamageSource::Contact("unknown".to_string()));
    let result = clock.result();
    info!(
        "Player died to {} at {:.1}s ({} kills, score {})",
        cause.label(),
        result.time,
        result.enemies_killed,
        result.score
    );
    analytics.send(
        AnalyticsEvent::new("player_death")
            .with("cause", cause.label())
            .with("time", format!("{:.0}", result.time))
            .with("kills", result.enemies_killed),
    );
    died.send(PlayerDiedEvent { cause, result });
    next_state.set(GameState::GameOver);
}
