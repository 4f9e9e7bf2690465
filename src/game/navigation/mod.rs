mod types;
mod walkability;
mod obstacles;
mod context;
mod open_set;
mod astar;
mod nearest;
mod follower;
mod systems;
mod debug;


// ============================================================================
// PUBLIC API
// ============================================================================

pub use types::{NavRect, GridNode, Path, HeuristicMode, NavError, ORTHOGONAL_COST, DIAGONAL_COST, WALKABLE_THRESHOLD};
pub use walkability::WalkabilityField;
pub use obstacles::{ObstacleSet, SolidObject, SolidKind};
pub use context::{NavigationContext, NavSettings};
pub use astar::{find_path, find_path_with_stats, SearchStats};
pub use nearest::find_nearest_walkable;
pub use follower::{PathFollower, FootPosition, Anchor, ArrivalCallback};
pub use systems::{WalkRequest, WalkFinished, WalkFailed, ObstacleRebuild, NavigationStats, plan_walk};
pub use debug::{NavigationDebug, NavigationDebugPlugin};

use bevy::prelude::*;

/// Systems that plan and advance walks. Anything reading actor positions for
/// the current frame should run after this set.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct NavigationSystems;

pub struct NavigationPlugin;

impl Plugin for NavigationPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<WalkRequest>();
        app.add_message::<WalkFinished>();
        app.add_message::<WalkFailed>();
        app.init_resource::<NavigationContext>();
        app.init_resource::<ObstacleRebuild>();
        app.init_resource::<NavigationStats>();
        app.add_systems(
            Update,
            (
                systems::rebuild_obstacles,
                systems::process_walk_requests,
                systems::follow_paths,
            )
                .chain()
                .in_set(NavigationSystems),
        );
    }
}
