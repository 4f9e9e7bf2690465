use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use super::obstacles::ObstacleSet;
use super::types::{HeuristicMode, NavError, NavRect, Path};
use super::walkability::WalkabilityField;

/// Search parameters fixed for the lifetime of a navigation context.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NavSettings {
    /// Quantization step in scene units. Smaller is more precise and slower.
    pub grid_size: u32,
    pub heuristic: HeuristicMode,
    /// Node expansions allowed per search before giving up.
    pub max_iterations: usize,
    /// How far an invalid goal may be moved to reach walkable ground.
    pub goal_repair_radius: f32,
    /// Second-chance radius used by walk requests whose first search failed.
    pub fallback_radius: f32,
    /// Total width/height change applied to solid hotspots.
    pub hotspot_inflation: Vec2,
    /// Total width/height change applied to solid ambient animations.
    pub ambient_inflation: Vec2,
}

impl Default for NavSettings {
    fn default() -> Self {
        Self {
            grid_size: 10,
            heuristic: HeuristicMode::Euclidean,
            max_iterations: 10_000,
            goal_repair_radius: 200.0,
            fallback_radius: 120.0,
            hotspot_inflation: Vec2::new(10.0, 10.0),
            ambient_inflation: Vec2::new(0.0, -4.0),
        }
    }
}

/// Everything a search needs about the active scene: where the floor is,
/// what stands on it, and how far the search may roam.
///
/// Replaced on scene load; only `obstacles` changes between loads.
#[derive(Resource, Clone, Debug, Default)]
pub struct NavigationContext {
    pub field: WalkabilityField,
    pub obstacles: ObstacleSet,
    pub bounds: NavRect,
    pub settings: NavSettings,
}

impl NavigationContext {
    /// Context whose bounds cover the whole field.
    pub fn new(field: WalkabilityField, settings: NavSettings) -> Self {
        let bounds = NavRect::new(0.0, 0.0, field.width() as f32, field.height() as f32);
        Self { field, obstacles: ObstacleSet::default(), bounds, settings }
    }

    pub fn with_bounds(mut self, bounds: NavRect) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_obstacles(mut self, obstacles: ObstacleSet) -> Self {
        self.obstacles = obstacles;
        self
    }

    /// A context for a scene that has not been built yet has a zero-sized field.
    pub fn is_loaded(&self) -> bool {
        self.field.width() > 0 && self.field.height() > 0
    }

    pub fn grid_size(&self) -> u32 {
        self.settings.grid_size
    }

    pub fn is_walkable(&self, x: f32, y: f32) -> bool {
        self.field.is_walkable(x, y)
    }

    pub fn set_obstacles(&mut self, rects: impl IntoIterator<Item = NavRect>) {
        self.obstacles.set_obstacles(rects);
    }

    /// In bounds, outside every obstacle, and on walkable ground.
    pub fn is_position_valid(&self, point: Vec2) -> bool {
        self.bounds.contains(point)
            && !self.obstacles.blocks(point.x, point.y)
            && self.field.is_walkable(point.x, point.y)
    }

    /// Plan a route between two scene-space points. See [`super::astar::find_path`].
    pub fn find_path(&self, start: Vec2, goal: Vec2) -> Result<Path, NavError> {
        super::astar::find_path(self, start, goal)
    }

    /// Nearest valid point to `point`; `step` defaults to the grid size.
    pub fn find_nearest_walkable(&self, point: Vec2, max_radius: f32, step: Option<f32>) -> Option<Vec2> {
        let step = step.unwrap_or(self.settings.grid_size as f32);
        super::nearest::find_nearest_walkable(self, point, max_radius, step)
    }
}
