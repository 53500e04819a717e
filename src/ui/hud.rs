//! In-game HUD - health, XP, clock, kills and the boss bar.

use bevy::prelude::*;

use super::snapshot::HudSnapshot;
use crate::core::GameState;

/// Marker for HUD root entity.
#[derive(Component)]
pub struct HudRoot;

/// Marker for health bar fill.
#[derive(Component)]
pub struct HealthBar;

/// Marker for XP bar fill.
#[derive(Component)]
pub struct XpBar;

/// Marker for boss bar fill.
#[derive(Component)]
pub struct BossBar;

/// The boss bar row, hidden until the boss appears.
#[derive(Component)]
pub struct BossBarRow;

#[derive(Component)]
pub enum HudText {
    Clock,
    Kills,
    Level,
    BossName,
}

/// Setup HUD systems.
pub fn setup_hud_systems(app: &mut App) {
    app.add_systems(OnEnter(GameState::InGame), spawn_hud)
        .add_systems(OnExit(GameState::InGame), cleanup_hud)
        .add_systems(
            Update,
            (update_bars, update_texts, update_boss_bar)
                .run_if(in_state(GameState::InGame))
                .run_if(resource_changed::<HudSnapshot>),
        );
}

/// Spawn the HUD UI.
fn spawn_hud(mut commands: Commands) {
    // Top row: clock in the middle, kills and level on the right
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::SpaceBetween,
                padding: UiRect::all(Val::Px(20.0)),
                position_type: PositionType::Absolute,
                ..default()
            },
            HudRoot,
        ))
        .with_children(|parent| {
            parent
                .spawn(Node {
                    flex_direction: FlexDirection::Row,
                    justify_content: JustifyContent::SpaceBetween,
                    ..default()
                })
                .with_children(|row| {
                    spawn_text(row, "Lv 1", 20.0, HudText::Level);
                    spawn_text(row, "0:00", 32.0, HudText::Clock);
                    spawn_text(row, "0", 20.0, HudText::Kills);
                });

            // Boss bar under the clock
            parent
                .spawn((
                    Node {
                        flex_direction: FlexDirection::Column,
                        align_items: AlignItems::Center,
                        ..default()
                    },
                    Visibility::Hidden,
                    BossBarRow,
                ))
                .with_children(|row| {
                    spawn_text(row, "", 18.0, HudText::BossName);
                    spawn_fill(row, 480.0, 14.0, Color::srgb(0.85, 0.15, 0.15), BossBar);
                });

            // Bottom-left status bars
            parent
                .spawn(Node {
                    flex_direction: FlexDirection::Column,
                    ..default()
                })
                .with_children(|column| {
                    spawn_bar(column, "XP", Color::srgb(0.3, 0.8, 0.5), XpBar);
                    spawn_bar(column, "Health", Color::srgb(0.8, 0.2, 0.2), HealthBar);
                });
        });
}

fn spawn_text(parent: &mut ChildBuilder, text: &str, size: f32, marker: HudText) {
    parent.spawn((
        Text::new(text),
        TextFont {
            font_size: size,
            ..default()
        },
        TextColor(Color::srgb(0.9, 0.9, 0.9)),
        marker,
    ));
}

/// Helper to spawn a labelled status bar.
fn spawn_bar<M: Component>(parent: &mut ChildBuilder, label: &str, color: Color, bar_marker: M) {
    parent
        .spawn(Node {
            flex_direction: FlexDirection::Row,
            align_items: AlignItems::Center,
            margin: UiRect::bottom(Val::Px(5.0)),
            ..default()
        })
        .with_children(|bar_parent| {
            bar_parent.spawn((
                Text::new(label),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(Color::srgb(0.8, 0.8, 0.8)),
                Node {
                    width: Val::Px(60.0),
                    ..default()
                },
            ));
            spawn_fill(bar_parent, 200.0, 12.0, color, bar_marker);
        });
}

fn spawn_fill<M: Component>(parent: &mut ChildBuilder, width: f32, height: f32, color: Color, marker: M) {
    parent
        .spawn((
            Node {
                width: Val::Px(width),
                height: Val::Px(height),
                ..default()
            },
            BackgroundColor(Color::srgb(0.1, 0.1, 0.1)),
        ))
        .with_children(|bg| {
            bg.spawn((
                Node {
                    width: Val::Percent(100.0),
                    height: Val::Percent(100.0),
                    ..default()
                },
                BackgroundColor(color),
                marker,
            ));
        });
}

fn update_bars(
    snapshot: Res<HudSnapshot>,
    mut health: Query<&mut Node, (With<HealthBar>, Without<XpBar>)>,
    mut xp: Query<&mut Node, (With<XpBar>, Without<HealthBar>)>,
) {
    if let Ok(mut bar) = health.get_single_mut() {
        bar.width = Val::Percent(snapshot.health_fraction() * 100.0);
    }
    if let Ok(mut bar) = xp.get_single_mut() {
        bar.width = Val::Percent(snapshot.xp_progress * 100.0);
    }
}

fn update_texts(snapshot: Res<HudSnapshot>, mut texts: Query<(&mut Text, &HudText)>) {
    for (mut text, kind) in texts.iter_mut() {
        text.0 = match kind {
            HudText::Clock => snapshot.clock_text(),
            HudText::Kills => format!("Kills {}", snapshot.kills),
            HudText::Level => format!("Lv {}", snapshot.level),
            HudText::BossName => match (&snapshot.boss_name, snapshot.boss_percent()) {
                (Some(name), Some(percent)) => format!("{} {}%", name, percent),
                _ => String::new(),
            },
        };
    }
}

fn update_boss_bar(
    snapshot: Res<HudSnapshot>,
    mut rows: Query<&mut Visibility, With<BossBarRow>>,
    mut fill: Query<&mut Node, With<BossBar>>,
) {
    for mut visibility in rows.iter_mut() {
        *visibility = if snapshot.boss_health.is_some() {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
    }
    if let (Ok(mut bar), Some(fraction)) = (fill.get_single_mut(), snapshot.boss_health) {
        bar.width = Val::Percent(fraction * 100.0);
    }
}

/// Clean up HUD entities.
fn cleanup_hud(mut commands: Commands, query: Query<Entity, With<HudRoot>>) {
    for entity in query.iter() {
        commands.entity(entity).despawn_recursive();
    }
}
