use bevy::prelude::*;
use crate::game::config::{GameConfig, GameConfigHandle};
use crate::game::scene::SceneArea;
use super::context::NavigationContext;
use super::follower::{FootPosition, PathFollower};

/// Whether the navigation overlay is drawn. Seeded from `GameConfig` once it
/// loads, then flipped with the configured key.
#[derive(Resource, Debug, Default)]
pub struct NavigationDebug {
    pub enabled: bool,
    seeded: bool,
}

pub struct NavigationDebugPlugin;

impl Plugin for NavigationDebugPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<NavigationDebug>()
           .add_systems(Update, (toggle_navigation_debug, draw_navigation_gizmos).chain());
    }
}

fn toggle_navigation_debug(
    keys: Res<ButtonInput<KeyCode>>,
    config_handle: Option<Res<GameConfigHandle>>,
    game_configs: Res<Assets<GameConfig>>,
    mut debug: ResMut<NavigationDebug>,
) {
    let Some(config) = config_handle.and_then(|h| game_configs.get(&h.0)) else { return };

    if !debug.seeded {
        debug.enabled = config.show_navigation_debug;
        debug.seeded = true;
    }
    if keys.just_pressed(config.key_toggle_navigation_debug) {
        debug.enabled = !debug.enabled;
        let state = if debug.enabled { "on" } else { "off" };
        info!("[NAVIGATION] Debug overlay {}", state);
    }
}

fn draw_navigation_gizmos(
    debug: Res<NavigationDebug>,
    ctx: Res<NavigationContext>,
    area: Option<Res<SceneArea>>,
    q_walkers: Query<(&FootPosition, &PathFollower)>,
    mut gizmos: Gizmos,
) {
    if !debug.enabled || !ctx.is_loaded() {
        return;
    }
    let Some(area) = area else { return };
    let to_world = |p: Vec2| area.to_world(p, 0.0).truncate();

    let bounds = ctx.bounds;
    gizmos.rect_2d(
        Isometry2d::from_translation(to_world(bounds.center())),
        bounds.size(),
        Color::srgb(0.3, 0.3, 1.0),
    );

    for rect in ctx.obstacles.iter() {
        gizmos.rect_2d(
            Isometry2d::from_translation(to_world(rect.center())),
            rect.size(),
            Color::srgb(1.0, 0.2, 0.2),
        );
    }

    // Unwalkable mask samples on a coarse lattice, so the overlay stays cheap
    if ctx.field.has_mask() {
        let step = (ctx.grid_size() * 2).max(1) as usize;
        for y in (0..ctx.field.height()).step_by(step) {
            for x in (0..ctx.field.width()).step_by(step) {
                let p = Vec2::new(x as f32, y as f32);
                if !ctx.field.is_walkable_at(p) {
                    gizmos.circle_2d(Isometry2d::from_translation(to_world(p)), 1.5, Color::srgb(0.5, 0.0, 0.5));
                }
            }
        }
    }

    for (foot, follower) in q_walkers.iter() {
        if !follower.is_following() {
            continue;
        }
        let points = std::iter::once(foot.0).chain(follower.remaining().iter().copied()).map(to_world);
        gizmos.linestrip_2d(points, Color::srgb(1.0, 1.0, 0.0));
        for &waypoint in follower.remaining() {
            gizmos.circle_2d(Isometry2d::from_translation(to_world(waypoint)), 3.0, Color::srgb(1.0, 1.0, 0.0));
        }
    }
}
