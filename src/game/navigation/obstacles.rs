use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use super::types::NavRect;

/// Solid scene objects as inflated rectangles.
///
/// The set is only ever replaced wholesale. Rebuilding happens at scene load and
/// when a solid object appears or disappears, never while an actor is walking.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObstacleSet {
    rects: Vec<NavRect>,
}

impl ObstacleSet {
    pub fn new(rects: impl IntoIterator<Item = NavRect>) -> Self {
        Self { rects: rects.into_iter().collect() }
    }

    pub fn set_obstacles(&mut self, rects: impl IntoIterator<Item = NavRect>) {
        self.rects.clear();
        self.rects.extend(rects);
    }

    /// True if the point lies inside any obstacle.
    pub fn blocks(&self, x: f32, y: f32) -> bool {
        let point = Vec2::new(x, y);
        self.rects.iter().any(|r| r.contains(point))
    }

    pub fn iter(&self) -> impl Iterator<Item = &NavRect> + '_ {
        self.rects.iter()
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }
}

/// What kind of scene object produced an obstacle; decides its clearance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolidKind {
    /// Interactive object (furniture, props). Gets extra clearance all around.
    Hotspot,
    /// Decorative animation. Slightly shrunk vertically so actors can brush past.
    Ambient,
}

/// Marks an entity as blocking navigation. `bounds` are the object's own
/// scene-space bounds before inflation.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct SolidObject {
    pub bounds: NavRect,
    pub kind: SolidKind,
}

impl SolidObject {
    pub fn hotspot(bounds: NavRect) -> Self {
        Self { bounds, kind: SolidKind::Hotspot }
    }

    pub fn ambient(bounds: NavRect) -> Self {
        Self { bounds, kind: SolidKind::Ambient }
    }

    /// The rectangle this object contributes to the obstacle set.
    pub fn obstacle_rect(&self, hotspot_inflation: Vec2, ambient_inflation: Vec2) -> NavRect {
        let inflation = match self.kind {
            SolidKind::Hotspot => hotspot_inflation,
            SolidKind::Ambient => ambient_inflation,
        };
        self.bounds.inflate(inflation.x, inflation.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_obstacles_replaces_everything() {
        let mut set = ObstacleSet::new([NavRect::new(0.0, 0.0, 10.0, 10.0)]);
        assert!(set.blocks(5.0, 5.0));

        set.set_obstacles([NavRect::new(50.0, 50.0, 10.0, 10.0)]);
        assert_eq!(set.len(), 1);
        assert!(!set.blocks(5.0, 5.0));
        assert!(set.blocks(55.0, 55.0));
    }

    #[test]
    fn test_right_and_bottom_edges_are_open() {
        let set = ObstacleSet::new([NavRect::new(10.0, 10.0, 20.0, 20.0)]);
        assert!(set.blocks(10.0, 10.0));
        assert!(!set.blocks(30.0, 20.0));
        assert!(!set.blocks(20.0, 30.0));
    }

    #[test]
    fn test_solid_kinds_get_their_own_clearance() {
        let bounds = NavRect::new(100.0, 100.0, 40.0, 20.0);
        let hotspot = SolidObject::hotspot(bounds).obstacle_rect(Vec2::new(10.0, 10.0), Vec2::new(0.0, -4.0));
        assert_eq!(hotspot, NavRect::new(95.0, 95.0, 50.0, 30.0));

        let ambient = SolidObject::ambient(bounds).obstacle_rect(Vec2::new(10.0, 10.0), Vec2::new(0.0, -4.0));
        assert_eq!(ambient, NavRect::new(100.0, 102.0, 40.0, 16.0));
    }
}
