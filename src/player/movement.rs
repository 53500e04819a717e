//! Top-down player movement and camera follow.

use bevy::prelude::*;

use super::components::*;
use crate::core::{FrameSet, GameState};
use crate::world::{Balance, GameCamera};

/// Set up player movement systems.
pub fn setup_movement_systems(app: &mut App) {
    app
        .init_resource::<Player>()
        .init_resource::<PlayerInput>()
        .add_systems(OnEnter(GameState::InGame), spawn_player)
        .add_systems(
            Update,
            read_keyboard_input
                .in_set(FrameSet::Input)
                .run_if(resource_exists::<ButtonInput<KeyCode>>),
        )
        .add_systems(Update, (move_player, regenerate_health, follow_player).chain().in_set(FrameSet::Player));
}

/// Place a fresh player in the middle of the world and point the camera at it.
pub fn spawn_player(balance: Res<Balance>, mut player: ResMut<Player>, mut camera: ResMut<GameCamera>) {
    let start = balance.world.bounds().center();
    *player = Player::new(&balance.player, start);
    *camera = GameCamera::from_balance(&balance.world);
    camera.follow(start);
    info!("Player spawned at ({:.0}, {:.0})", start.x, start.y);
}

/// Turn WASD / arrow keys into a movement vector of length at most one.
///
/// World y grows downward, so "up" is negative y.
pub fn read_keyboard_input(keyboard: Res<ButtonInput<KeyCode>>, mut input: ResMut<PlayerInput>) {
    let mut direction = Vec2::ZERO;
    if keyboard.any_pressed([KeyCode::KeyW, KeyCode::ArrowUp]) {
        direction.y -= 1.0;
    }
    if keyboard.any_pressed([KeyCode::KeyS, KeyCode::ArrowDown]) {
        direction.y += 1.0;
    }
    if keyboard.any_pressed([KeyCode::KeyA, KeyCode::ArrowLeft]) {
        direction.x -= 1.0;
    }
    if keyboard.any_pressed([KeyCode::KeyD, KeyCode::ArrowRight]) {
        direction.x += 1.0;
    }
    input.movement = direction.normalize_or_zero();
    input.interact = keyboard.just_pressed(KeyCode::Space);
}

pub fn move_player(time: Res<Time>, balance: Res<Balance>, input: Res<PlayerInput>, mut player: ResMut<Player>) {
    let delta = time.delta_secs();
    player.tick_timers(delta);
    player.step(input.movement, delta, &balance.world.bounds());
}

fn regenerate_health(time: Res<Time>, mut player: ResMut<Player>) {
    player.regenerate(time.delta_secs());
}

fn follow_player(player: Res<Player>, mut camera: ResMut<GameCamera>) {
    camera.follow(player.position);
}
