//! Scene-side glue for navigation: the navigable area of the active scene,
//! building its navigation context on load, and mapping scene space (pixels,
//! y down) to world space for rendering.

use bevy::asset::LoadState;
use bevy::prelude::*;
use crate::game::config::InitialConfig;
use crate::game::navigation::{
    FootPosition, NavigationContext, NavigationSystems, ObstacleRebuild, ObstacleSet, SolidObject,
    WalkabilityField,
};

/// Navigable area of the active scene. Replacing this resource loads a new scene.
#[derive(Resource, Clone, Debug)]
pub struct SceneArea {
    pub width: u32,
    pub height: u32,
    /// Walkability mask; `None` means the whole area is floor.
    pub mask: Option<Handle<Image>>,
}

impl SceneArea {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, mask: None }
    }

    /// Scene point to world translation, with the scene centered on the origin.
    pub fn to_world(&self, point: Vec2, z: f32) -> Vec3 {
        Vec3::new(
            point.x - self.width as f32 / 2.0,
            self.height as f32 / 2.0 - point.y,
            z,
        )
    }

    pub fn to_scene(&self, world: Vec2) -> Vec2 {
        Vec2::new(
            world.x + self.width as f32 / 2.0,
            self.height as f32 / 2.0 - world.y,
        )
    }
}

pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, build_scene_navigation.before(NavigationSystems))
           .add_systems(PostUpdate, sync_actor_transforms.before(bevy::transform::TransformSystems::Propagate));
    }
}

/// Build the navigation context whenever the scene area changes.
///
/// A scene with a mask waits until the mask image is loaded; if loading fails
/// the scene is treated as fully walkable.
pub fn build_scene_navigation(
    area: Option<Res<SceneArea>>,
    config: Res<InitialConfig>,
    images: Option<Res<Assets<Image>>>,
    asset_server: Option<Res<AssetServer>>,
    mut ctx: ResMut<NavigationContext>,
    mut rebuild: ResMut<ObstacleRebuild>,
    q_solids: Query<&SolidObject>,
    mut built: Local<bool>,
) {
    let Some(area) = area else { return };
    if area.is_changed() {
        *built = false;
    }
    if *built {
        return;
    }

    let field = match &area.mask {
        None => WalkabilityField::open(area.width, area.height),
        Some(handle) => match images.as_ref().and_then(|images| images.get(handle)) {
            Some(image) => WalkabilityField::from_mask(Some(image), area.width, area.height),
            None => {
                let failed = asset_server
                    .as_ref()
                    .is_some_and(|server| matches!(server.load_state(handle.id()), LoadState::Failed(_)));
                if !failed {
                    return;
                }
                warn!("[SCENE] Walkability mask failed to load, treating scene as fully walkable");
                WalkabilityField::open(area.width, area.height)
            }
        },
    };

    let settings = config.nav_settings();
    let obstacles = ObstacleSet::new(
        q_solids
            .iter()
            .map(|s| s.obstacle_rect(settings.hotspot_inflation, settings.ambient_inflation)),
    );
    info!(
        "[SCENE] Navigation built: {}x{}, mask: {}, {} obstacles, grid {}",
        area.width,
        area.height,
        field.has_mask(),
        obstacles.len(),
        settings.grid_size
    );
    *ctx = NavigationContext::new(field, settings).with_obstacles(obstacles);
    rebuild.pending = false;
    *built = true;
}

fn sync_actor_transforms(
    area: Option<Res<SceneArea>>,
    mut q_actors: Query<(&FootPosition, &mut Transform), Changed<FootPosition>>,
) {
    let Some(area) = area else { return };
    for (foot, mut transform) in q_actors.iter_mut() {
        let z = transform.translation.z;
        transform.translation = area.to_world(foot.0, z);
    }
}
