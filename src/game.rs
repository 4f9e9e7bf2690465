use bevy::prelude::*;

mod control;
pub mod config;
pub mod navigation;
pub mod scene;

use control::ControlPlugin;
use config::{GameConfigPlugin, InitialConfig};
use navigation::{FootPosition, NavRect, NavigationDebugPlugin, NavigationPlugin, PathFollower, SolidObject};
use scene::{SceneArea, ScenePlugin};

/// The player-controlled actor.
#[derive(Component, Debug, Default)]
pub struct Player;

pub struct GamePlugin;

impl Plugin for GamePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            GameConfigPlugin,
            NavigationPlugin,
            NavigationDebugPlugin,
            ScenePlugin,
            ControlPlugin,
        ))
        .add_systems(Startup, setup_game.after(config::load_initial_config));
    }
}

fn setup_game(mut commands: Commands, config: Res<InitialConfig>) {
    info!("Game setup started");

    let area = SceneArea::new(config.game_width, config.game_area_height);

    commands.spawn(Camera2d);

    // Floor
    commands.spawn((
        Sprite::from_color(Color::srgb(0.35, 0.3, 0.25), Vec2::new(area.width as f32, area.height as f32)),
        Transform::from_xyz(0.0, 0.0, -10.0),
    ));

    let solids = [
        SolidObject::hotspot(NavRect::new(330.0, 230.0, 120.0, 60.0)),
        SolidObject::hotspot(NavRect::new(120.0, 120.0, 50.0, 140.0)),
        SolidObject::ambient(NavRect::new(580.0, 300.0, 80.0, 80.0)),
    ];
    for solid in solids {
        let color = match solid.kind {
            navigation::SolidKind::Hotspot => Color::srgb(0.55, 0.35, 0.2),
            navigation::SolidKind::Ambient => Color::srgb(0.2, 0.45, 0.6),
        };
        commands.spawn((
            Sprite::from_color(color, solid.bounds.size()),
            Transform::from_translation(area.to_world(solid.bounds.center(), -1.0)),
            solid,
        ));
    }

    let spawn = Vec2::new(60.0, 400.0);
    commands.spawn((
        Player,
        FootPosition(spawn),
        PathFollower::new(config.player_speed),
        Sprite::from_color(Color::srgb(0.9, 0.85, 0.7), Vec2::new(20.0, 48.0)),
        Transform::from_translation(area.to_world(spawn, 1.0)),
    ));

    commands.insert_resource(area);
}
