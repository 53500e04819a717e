//! UI plugin - menus, HUD, and the level-up and end-of-run screens.
//!
//! UI never touches simulation state directly. Buttons and hotkeys either
//! change state or send `UpgradeChosenEvent`.

use bevy::prelude::*;

use super::hud;
use super::snapshot::HudSnapshot;
use crate::artifacts::Rarity;
use crate::boss::BossSystem;
use crate::core::{format_clock, GameState, PlayState, RunClock, UpgradeChosenEvent};

/// UI plugin - handles all user interface.
pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        hud::setup_hud_systems(app);

        app
            .add_systems(Update, menu_button_input)

            // Main menu
            .add_systems(OnEnter(GameState::MainMenu), setup_main_menu)
            .add_systems(OnExit(GameState::MainMenu), despawn_screen::<MainMenuUi>)

            // Pause menu
            .add_systems(OnEnter(PlayState::Paused), setup_pause_menu)
            .add_systems(OnExit(PlayState::Paused), despawn_screen::<PauseMenuUi>)

            // Level-up choices
            .add_systems(
                Update,
                (refresh_choice_overlay, choice_hotkeys.run_if(resource_exists::<ButtonInput<KeyCode>>))
                    .run_if(in_state(PlayState::ChoosingUpgrade)),
            )
            .add_systems(OnExit(PlayState::ChoosingUpgrade), despawn_screen::<LevelUpUi>)

            // Game over
            .add_systems(OnEnter(GameState::GameOver), setup_game_over)
            .add_systems(OnExit(GameState::GameOver), despawn_screen::<GameOverUi>)

            // Stage clear
            .add_systems(OnEnter(GameState::StageCleared), setup_stage_clear)
            .add_systems(OnExit(GameState::StageCleared), despawn_screen::<StageClearUi>);
    }
}

/// Marker for main menu UI entities.
#[derive(Component)]
struct MainMenuUi;

/// Marker for pause menu UI entities.
#[derive(Component)]
struct PauseMenuUi;

/// Marker for the level-up overlay.
#[derive(Component)]
struct LevelUpUi;

/// Marker for game over UI entities.
#[derive(Component)]
struct GameOverUi;

#[derive(Component)]
struct StageClearUi;

/// Marker for menu buttons.
#[derive(Component)]
enum MenuButton {
    NewGame,
    Quit,
    Resume,
    MainMenu,
    Retry,
    Choose(String),
}

const BUTTON_IDLE: Color = Color::srgb(0.15, 0.15, 0.2);
const BUTTON_HOVER: Color = Color::srgb(0.25, 0.25, 0.3);
const BUTTON_PRESSED: Color = Color::srgb(0.3, 0.3, 0.35);

fn rarity_color(rarity: Rarity) -> Color {
    match rarity {
        Rarity::Common => Color::srgb(0.8, 0.8, 0.85),
        Rarity::Rare => Color::srgb(0.35, 0.6, 1.0),
        Rarity::Epic => Color::srgb(0.7, 0.4, 1.0),
        Rarity::Legendary => Color::srgb(1.0, 0.75, 0.2),
    }
}

/// Full-screen column that centres its children.
fn overlay(background: Color) -> (Node, BackgroundColor) {
    (
        Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            flex_direction: FlexDirection::Column,
            justify_content: JustifyContent::Center,
            align_items: AlignItems::Center,
            position_type: PositionType::Absolute,
            ..default()
        },
        BackgroundColor(background),
    )
}

fn spawn_title(parent: &mut ChildBuilder, text: &str, size: f32, color: Color) {
    parent.spawn((
        Text::new(text),
        TextFont {
            font_size: size,
            ..default()
        },
        TextColor(color),
        Node {
            margin: UiRect::bottom(Val::Px(30.0)),
            ..default()
        },
    ));
}

/// Helper to spawn a menu button.
fn spawn_menu_button(parent: &mut ChildBuilder, text: &str, button: MenuButton) {
    parent
        .spawn((
            Button,
            Node {
                width: Val::Px(200.0),
                height: Val::Px(50.0),
                margin: UiRect::all(Val::Px(10.0)),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            BackgroundColor(BUTTON_IDLE),
            button,
        ))
        .with_children(|button| {
            button.spawn((
                Text::new(text),
                TextFont {
                    font_size: 24.0,
                    ..default()
                },
                TextColor(Color::srgb(0.8, 0.8, 0.85)),
            ));
        });
}

/// Set up the main menu.
fn setup_main_menu(mut commands: Commands) {
    commands.spawn((Camera2d, MainMenuUi));
    commands
        .spawn((overlay(Color::srgb(0.05, 0.06, 0.05)), MainMenuUi))
        .with_children(|parent| {
            spawn_title(parent, "SPIRIT SURVIVOR", 72.0, Color::srgb(0.85, 0.8, 0.65));
            spawn_menu_button(parent, "New Game", MenuButton::NewGame);
            spawn_menu_button(parent, "Quit", MenuButton::Quit);
        });
}

/// Set up the pause menu.
fn setup_pause_menu(mut commands: Commands) {
    commands
        .spawn((overlay(Color::srgba(0.0, 0.0, 0.0, 0.7)), PauseMenuUi))
        .with_children(|parent| {
            spawn_title(parent, "PAUSED", 48.0, Color::srgb(0.8, 0.8, 0.85));
            spawn_menu_button(parent, "Resume", MenuButton::Resume);
            spawn_menu_button(parent, "Main Menu", MenuButton::MainMenu);
        });
}

/// Rebuild the choice cards whenever a new set is dealt.
fn refresh_choice_overlay(
    mut commands: Commands,
    snapshot: Res<HudSnapshot>,
    existing: Query<Entity, With<LevelUpUi>>,
    mut shown: Local<Vec<String>>,
) {
    let ids: Vec<String> = snapshot.choices.iter().map(|c| c.id.clone()).collect();
    if !existing.is_empty() && *shown == ids {
        return;
    }
    for entity in existing.iter() {
        commands.entity(entity).despawn_recursive();
    }
    *shown = ids;

    commands
        .spawn((overlay(Color::srgba(0.0, 0.0, 0.0, 0.75)), LevelUpUi))
        .with_children(|parent| {
            spawn_title(parent, &format!("LEVEL {}", snapshot.level), 48.0, Color::srgb(1.0, 0.9, 0.5));
            for (index, choice) in snapshot.choices.iter().enumerate() {
                parent
                    .spawn((
                        Button,
                        Node {
                            width: Val::Px(520.0),
                            padding: UiRect::all(Val::Px(12.0)),
                            margin: UiRect::all(Val::Px(8.0)),
                            flex_direction: FlexDirection::Column,
                            border: UiRect::all(Val::Px(2.0)),
                            ..default()
                        },
                        BorderColor(rarity_color(choice.rarity)),
                        BackgroundColor(BUTTON_IDLE),
                        MenuButton::Choose(choice.id.clone()),
                    ))
                    .with_children(|card| {
                        card.spawn((
                            Text::new(format!("{}. {}", index + 1, choice.name)),
                            TextFont {
                                font_size: 24.0,
                                ..default()
                            },
                            TextColor(rarity_color(choice.rarity)),
                        ));
                        card.spawn((
                            Text::new(choice.description.clone()),
                            TextFont {
                                font_size: 16.0,
                                ..default()
                            },
                            TextColor(Color::srgb(0.75, 0.75, 0.8)),
                        ));
                    });
            }
        });
}

/// Keys 1-3 pick the matching card.
fn choice_hotkeys(
    keyboard: Res<ButtonInput<KeyCode>>,
    snapshot: Res<HudSnapshot>,
    mut chosen: EventWriter<UpgradeChosenEvent>,
) {
    const KEYS: [KeyCode; 3] = [KeyCode::Digit1, KeyCode::Digit2, KeyCode::Digit3];
    for (key, choice) in KEYS.iter().zip(&snapshot.choices) {
        if keyboard.just_pressed(*key) {
            chosen.send(UpgradeChosenEvent {
                choice_id: choice.id.clone(),
            });
            return;
        }
    }
}

/// Set up the game over screen.
fn setup_game_over(mut commands: Commands, clock: Res<RunClock>) {
    let result = clock.result();
    commands.spawn((Camera2d, GameOverUi));
    commands
        .spawn((overlay(Color::srgba(0.1, 0.0, 0.0, 0.9)), GameOverUi))
        .with_children(|parent| {
            spawn_title(parent, "YOU DIED", 72.0, Color::srgb(0.8, 0.2, 0.2));
            spawn_title(
                parent,
                &format!(
                    "Survived {}   Kills {}   Score {}",
                    format_clock(result.time),
                    result.enemies_killed,
                    result.score
                ),
                22.0,
                Color::srgb(0.8, 0.75, 0.75),
            );
            spawn_menu_button(parent, "Retry", MenuButton::Retry);
            spawn_menu_button(parent, "Main Menu", MenuButton::MainMenu);
        });
}

fn setup_stage_clear(mut commands: Commands, boss: Res<BossSystem>) {
    commands.spawn((Camera2d, StageClearUi));
    commands
        .spawn((overlay(Color::srgba(0.02, 0.05, 0.1, 0.9)), StageClearUi))
        .with_children(|parent| {
            spawn_title(parent, "STAGE CLEAR", 72.0, Color::srgb(1.0, 0.85, 0.4));
            if let Some(stats) = &boss.stage_stats {
                spawn_title(
                    parent,
                    &format!(
                        "Time {}   Level {}   XP {}   Kills {}",
                        stats.formatted_time(),
                        stats.level,
                        stats.total_xp,
                        stats.kills
                    ),
                    22.0,
                    Color::srgb(0.8, 0.85, 0.9),
                );
            }
            spawn_menu_button(parent, "Play Again", MenuButton::Retry);
            spawn_menu_button(parent, "Main Menu", MenuButton::MainMenu);
        });
}

/// Handle button interactions on every screen.
fn menu_button_input(
    mut interaction_query: Query<
        (&Interaction, &MenuButton, &mut BackgroundColor),
        (Changed<Interaction>, With<Button>),
    >,
    mut next_game: ResMut<NextState<GameState>>,
    mut next_play: Option<ResMut<NextState<PlayState>>>,
    mut chosen: EventWriter<UpgradeChosenEvent>,
    mut exit: EventWriter<AppExit>,
) {
    for (interaction, button, mut bg_color) in interaction_query.iter_mut() {
        match interaction {
            Interaction::Pressed => {
                *bg_color = BUTTON_PRESSED.into();
                match button {
                    MenuButton::NewGame | MenuButton::Retry => next_game.set(GameState::InGame),
                    MenuButton::MainMenu => next_game.set(GameState::MainMenu),
                    MenuButton::Quit => {
                        exit.send(AppExit::Success);
                    }
                    MenuButton::Resume => {
                        if let Some(next_play) = next_play.as_mut() {
                            next_play.set(PlayState::Running);
                        }
                    }
                    MenuButton::Choose(id) => {
                        chosen.send(UpgradeChosenEvent { choice_id: id.clone() });
                    }
                }
            }
            Interaction::Hovered => {
                *bg_color = BUTTON_HOVER.into();
            }
            Interaction::None => {
                *bg_color = BUTTON_IDLE.into();
            }
        }
    }
}

/// Despawn every entity of one screen.
fn despawn_screen<T: Component>(mut commands: Commands, query: Query<Entity, With<T>>) {
    for entity in query.iter() {
        commands.entity(entity).despawn_recursive();
    }
}
