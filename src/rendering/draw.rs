//! Per-frame drawing of the simulation state.
//!
//! The simulation is y-down; Bevy's 2D space is y-up, so every position is
//! flipped on the way out. Bodies use a cached sprite when one has loaded and a
//! gizmo circle otherwise. Attacks, telegraphs and pickups are always gizmos.

use bevy::prelude::*;

use super::assets::{enemy_sprite_key, AssetCache, FallbackShape, SpriteVisual};
use super::visual_config::{rgb, VisualConfig};
use crate::boss::{BossProjectileKind, BossSystem};
use crate::combat::PlayerAttacks;
use crate::enemies::{EnemyRegistry, EnemyRoster, NamedSpawnSystem, StatusEffectKind};
use crate::player::Player;
use crate::progression::Pickups;
use crate::world::{Balance, GameCamera};

/// Marker for the in-run camera.
#[derive(Component)]
pub struct GameView;

/// Reusable sprite entity.
#[derive(Component)]
pub struct PooledSprite;

#[derive(Resource, Default)]
pub struct SpritePool {
    entities: Vec<Entity>,
}

/// Simulation position to render position.
pub fn to_render(position: Vec2) -> Vec2 {
    Vec2::new(position.x, -position.y)
}

pub fn spawn_game_view(mut commands: Commands) {
    commands.spawn((Camera2d, GameView));
}

pub fn despawn_game_view(
    mut commands: Commands,
    views: Query<Entity, With<GameView>>,
    sprites: Query<Entity, With<PooledSprite>>,
    mut pool: ResMut<SpritePool>,
) {
    for entity in views.iter().chain(sprites.iter()) {
        commands.entity(entity).despawn_recursive();
    }
    pool.entities.clear();
}

pub fn sync_camera(camera: Res<GameCamera>, mut views: Query<(&mut Transform, &mut OrthographicProjection), With<GameView>>) {
    for (mut transform, mut projection) in views.iter_mut() {
        let center = to_render(camera.center);
        transform.translation.x = center.x;
        transform.translation.y = center.y;
        projection.scale = 1.0 / camera.zoom;
    }
}

pub fn resize_camera(mut resized: EventReader<bevy::window::WindowResized>, mut camera: ResMut<GameCamera>) {
    for event in resized.read() {
        camera.resize(Vec2::new(event.width, event.height));
    }
}

fn in_view(camera: &GameCamera, position: Vec2, radius: f32) -> bool {
    let (min, max) = camera.visible_rect();
    position.x + radius >= min.x && position.x - radius <= max.x && position.y + radius >= min.y && position.y - radius <= max.y
}

/// Player and enemies.
#[allow(clippy::too_many_arguments)]
pub fn draw_bodies(
    mut commands: Commands,
    mut gizmos: Gizmos,
    camera: Res<GameCamera>,
    config: Res<VisualConfig>,
    cache: Res<AssetCache>,
    registry: Res<EnemyRegistry>,
    player: Res<Player>,
    roster: Res<EnemyRoster>,
    mut pool: ResMut<SpritePool>,
    mut sprites: Query<(&mut Sprite, &mut Transform, &mut Visibility), With<PooledSprite>>,
) {
    let player_color = if player.is_invincible() {
        config.player_invincible
    } else {
        config.player
    };
    let mut bodies = vec![("player", player.position, player.radius, rgb(player_color))];
    for enemy in roster.enemies.iter().filter(|e| e.active) {
        if !in_view(&camera, enemy.position, enemy.radius) {
            continue;
        }
        let color = if enemy.is_flashing() {
            rgb(config.hit_flash)
        } else if enemy.has_status(StatusEffectKind::Charmed) {
            rgb(config.charmed)
        } else {
            registry
                .get(&enemy.kind)
                .map(|def| rgb(def.color))
                .unwrap_or(Color::WHITE)
        };
        let key = if registry.get(&enemy.kind).is_some() {
            enemy_sprite_key(&registry, &enemy.kind)
        } else {
            enemy.id.as_str()
        };
        bodies.push((key, enemy.position, enemy.radius, color));
    }

    let mut used = 0;
    for (key, position, radius, color) in bodies {
        let fallback = FallbackShape { radius, color };
        let handle = match cache.request(key, fallback) {
            SpriteVisual::Loaded(handle) => handle,
            SpriteVisual::Fallback(shape) => {
                gizmos.circle_2d(to_render(position), shape.radius, shape.color);
                continue;
            }
        };
        if used == pool.entities.len() {
            // Picked up next frame.
            let entity = commands.spawn((Sprite::default(), Transform::default(), Visibility::Hidden, PooledSprite)).id();
            pool.entities.push(entity);
            gizmos.circle_2d(to_render(position), radius, color);
            used += 1;
            continue;
        }
        if let Ok((mut sprite, mut transform, mut visibility)) = sprites.get_mut(pool.entities[used]) {
            sprite.image = handle;
            sprite.custom_size = Some(Vec2::splat(radius * 2.0));
            sprite.color = color;
            transform.translation = to_render(position).extend(1.0);
            *visibility = Visibility::Visible;
        }
        used += 1;
    }
    for &entity in &pool.entities[used..] {
        if let Ok((_, _, mut visibility)) = sprites.get_mut(entity) {
            *visibility = Visibility::Hidden;
        }
    }
}

/// Player weapons and named-monster shots.
pub fn draw_attacks(
    mut gizmos: Gizmos,
    config: Res<VisualConfig>,
    attacks: Res<PlayerAttacks>,
    named: Res<NamedSpawnSystem>,
) {
    for projectile in attacks.projectiles.iter().filter(|p| p.active) {
        gizmos.circle_2d(to_render(projectile.position), projectile.radius, rgb(config.projectile));
    }
    for effect in attacks.effects.iter().filter(|e| e.active && e.is_started()) {
        gizmos.circle_2d(to_render(effect.position), effect.radius, rgb(config.area));
    }
    for swing in attacks.swings.iter().filter(|s| s.active) {
        let angle = swing.blade_angle();
        let tip = swing.origin + Vec2::new(angle.cos(), angle.sin()) * swing.radius;
        gizmos.line_2d(to_render(swing.origin), to_render(tip), rgb(config.melee));
    }
    for shot in named.projectiles.iter().filter(|p| p.active) {
        gizmos.circle_2d(to_render(shot.position), shot.radius, rgb(config.named_projectile));
    }
}

/// Boss telegraphs, projectiles, fire and the reward chest.
pub fn draw_boss(mut gizmos: Gizmos, config: Res<VisualConfig>, boss: Res<BossSystem>) {
    if !boss.is_active() {
        return;
    }
    for projectile in &boss.projectiles {
        let color = match projectile.kind {
            BossProjectileKind::Lightning => config.boss_bullet,
            BossProjectileKind::Fireball => config.fireball,
        };
        gizmos.circle_2d(to_render(projectile.position), projectile.radius, rgb(color));
    }
    for line in &boss.warning_lines {
        let end = line.position + line.direction * line.size;
        gizmos.line_2d(to_render(line.position), to_render(end), rgb(config.warning));
    }
    for ring in &boss.stomp_warnings {
        gizmos.circle_2d(to_render(ring.position), ring.size, rgb(config.warning));
    }
    for zone in &boss.fire_zones {
        gizmos.circle_2d(to_render(zone.center), zone.radius, rgb(config.fire_zone));
    }
    for spark in &boss.lightning {
        gizmos.circle_2d(to_render(spark.position), 8.0, rgb(config.lightning));
    }
    if let Some(charge) = &boss.charge_effect {
        gizmos.circle_2d(to_render(charge.position), 30.0 + charge.remaining * 10.0, rgb(config.fireball));
    }
    if let Some(chest) = &boss.chest {
        gizmos.rect_2d(to_render(chest.position), Vec2::splat(chest.radius * 2.0), rgb(config.chest));
    }
}

/// XP gems, potions and the world edge.
pub fn draw_pickups(mut gizmos: Gizmos, config: Res<VisualConfig>, balance: Res<Balance>, pickups: Res<Pickups>) {
    let size = Vec2::new(balance.world.width, balance.world.height);
    gizmos.rect_2d(to_render(size / 2.0), size, rgb(config.world_border));

    let gem_radius = balance.xp.gem_radius;
    for gem in pickups.gems.iter().filter(|g| g.active) {
        gizmos.circle_2d(to_render(gem.position), gem_radius, rgb(config.xp_gem));
    }
    for potion in pickups.potions.iter().filter(|p| p.active) {
        gizmos.circle_2d(to_render(potion.position), potion.radius, rgb(config.potion));
    }
}
