//! Enemy movement: knockback, status timers, and chasing.

use bevy::prelude::*;

use super::components::{Enemy, EnemyRoster, EnemyTier, StatusEffectKind};
use crate::combat::KnockbackBalance;
use crate::player::Player;
use crate::world::Balance;

/// Move every active field and named enemy one frame.
///
/// Knockback overrides chasing until it decays. Hostile enemies chase the
/// player; charmed ones keep whatever target their charm assigned. The boss
/// is driven by its own system.
pub fn advance_enemies(enemies: &mut [Enemy], player_pos: Vec2, delta: f32, knockback: &KnockbackBalance) {
    for enemy in enemies.iter_mut().filter(|e| e.active && e.tier != EnemyTier::Boss) {
        enemy.tick_timers(delta);
        if enemy.update_knockback(delta, knockback) {
            continue;
        }
        if !enemy.has_status(StatusEffectKind::Charmed) {
            enemy.target = Some(player_pos);
        }
        enemy.chase(delta);
    }
}

pub fn move_enemies(time: Res<Time>, balance: Res<Balance>, player: Res<Player>, mut roster: ResMut<EnemyRoster>) {
    advance_enemies(&mut roster.enemies, player.position, time.delta_secs(), &balance.knockback);
}

/// Drop dead and out-of-play enemies. The only place the roster shrinks.
pub fn sweep_enemies(mut roster: ResMut<EnemyRoster>) {
    let removed = roster.sweep();
    if removed > 0 {
        trace!("Removed {} inactive enemies", removed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enemies::EnemyStats;

    fn enemy(pos: Vec2) -> Enemy {
        Enemy::new("e", "skeleton", EnemyTier::Low, pos, &EnemyStats::default())
    }

    #[test]
    fn chases_player() {
        let mut enemies = vec![enemy(Vec2::new(100.0, 0.0))];
        advance_enemies(&mut enemies, Vec2::ZERO, 0.5, &KnockbackBalance::default());
        assert_eq!(enemies[0].position, Vec2::new(50.0, 0.0));
    }

    #[test]
    fn knockback_replaces_chasing() {
        let mut enemies = vec![enemy(Vec2::new(100.0, 0.0))];
        enemies[0].apply_knockback(Vec2::X, 100.0);
        advance_enemies(&mut enemies, Vec2::ZERO, 0.1, &KnockbackBalance::default());
        assert!(enemies[0].position.x > 100.0);
    }

    #[test]
    fn charmed_enemy_keeps_its_own_target() {
        let mut enemies = vec![enemy(Vec2::new(100.0, 0.0))];
        enemies[0].add_status(StatusEffectKind::Charmed, 5.0, "test");
        enemies[0].target = Some(Vec2::new(200.0, 0.0));
        advance_enemies(&mut enemies, Vec2::ZERO, 0.5, &KnockbackBalance::default());
        assert_eq!(enemies[0].position, Vec2::new(150.0, 0.0));
    }

    #[test]
    fn inactive_enemies_stay_put() {
        let mut enemies = vec![enemy(Vec2::new(100.0, 0.0))];
        enemies[0].active = false;
        advance_enemies(&mut enemies, Vec2::ZERO, 0.5, &KnockbackBalance::default());
        assert_eq!(enemies[0].position, Vec2::new(100.0, 0.0));
    }
}
