use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Cost of one orthogonal grid step.
pub const ORTHOGONAL_COST: u32 = 10;

/// Cost of one diagonal grid step (√2 × 10, rounded down).
pub const DIAGONAL_COST: u32 = 14;

/// Mask samples whose primary channel is above this value are walkable.
pub const WALKABLE_THRESHOLD: u8 = 50;

/// Axis-aligned rectangle in scene space (origin top-left, y pointing down).
///
/// Containment is half-open: `left <= x < left + width`, same for y.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NavRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl NavRect {
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self { left, top, width, height }
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.left && point.x < self.right() && point.y >= self.top && point.y < self.bottom()
    }

    /// Grow (or shrink, with negative amounts) around the center.
    /// `dx` and `dy` are the total change in width and height.
    pub fn inflate(&self, dx: f32, dy: f32) -> Self {
        Self {
            left: self.left - dx / 2.0,
            top: self.top - dy / 2.0,
            width: self.width + dx,
            height: self.height + dy,
        }
    }

    /// Pull a point into the rectangle. Coordinates already inside are untouched;
    /// anything past the right/bottom edge lands on the last whole unit.
    pub fn clamp_point(&self, point: Vec2) -> Vec2 {
        let clamp_axis = |v: f32, min: f32, max: f32| {
            if v < min {
                min
            } else if v >= max {
                (max - 1.0).max(min)
            } else {
                v
            }
        };
        Vec2::new(
            clamp_axis(point.x, self.left, self.right()),
            clamp_axis(point.y, self.top, self.bottom()),
        )
    }
}

/// Distance estimate used to rank open nodes during a search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeuristicMode {
    /// Straight-line distance × 10.
    #[default]
    Euclidean,
    /// (|dx| + |dy|) × 10.
    Manhattan,
    /// Chebyshev-weighted octile estimate: 10·(|dx|+|dy|) + (14 − 20)·min(|dx|,|dy|).
    Diagonal,
}

impl HeuristicMode {
    /// Estimate the remaining cost for a displacement measured in grid cells.
    pub fn estimate(self, dx: f32, dy: f32) -> f32 {
        let dx = dx.abs();
        let dy = dy.abs();
        let straight = ORTHOGONAL_COST as f32;
        match self {
            HeuristicMode::Euclidean => dx.hypot(dy) * straight,
            HeuristicMode::Manhattan => (dx + dy) * straight,
            HeuristicMode::Diagonal => {
                straight * (dx + dy)
                    + (DIAGONAL_COST as f32 - 2.0 * straight) * dx.min(dy)
            }
        }
    }
}

/// Grid-aligned search coordinate. Both components are multiples of the grid size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridNode {
    pub x: i32,
    pub y: i32,
}

impl GridNode {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Snap a continuous point to the cell containing it (floor division).
    pub fn quantize(point: Vec2, grid_size: u32) -> Self {
        let g = grid_size as f32;
        Self {
            x: ((point.x / g).floor() as i32).saturating_mul(grid_size as i32),
            y: ((point.y / g).floor() as i32).saturating_mul(grid_size as i32),
        }
    }

    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32)
    }
}

/// Ordered route of scene-space waypoints.
///
/// Intermediate waypoints sit on grid corners; the last one is the exact
/// (possibly repaired) destination.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    waypoints: Vec<Vec2>,
}

impl Path {
    pub fn new(waypoints: Vec<Vec2>) -> Self {
        Self { waypoints }
    }

    pub fn waypoints(&self) -> &[Vec2] {
        &self.waypoints
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn first(&self) -> Option<Vec2> {
        self.waypoints.first().copied()
    }

    pub fn last(&self) -> Option<Vec2> {
        self.waypoints.last().copied()
    }

    /// Polyline length from the first waypoint to the last.
    pub fn length(&self) -> f32 {
        self.waypoints.windows(2).map(|w| w[0].distance(w[1])).sum()
    }

    pub fn into_waypoints(self) -> Vec<Vec2> {
        self.waypoints
    }
}

impl From<Vec<Vec2>> for Path {
    fn from(waypoints: Vec<Vec2>) -> Self {
        Self::new(waypoints)
    }
}

/// Why a navigation query produced nothing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NavError {
    /// Open set exhausted or iteration cap hit before reaching the goal cell.
    #[error("goal {goal} is unreachable from {start} ({expansions} nodes expanded)")]
    UnreachableGoal { start: Vec2, goal: Vec2, expansions: usize },
    /// The goal was invalid and nothing walkable exists within the repair radius.
    #[error("no walkable point within {radius} of goal {goal}")]
    GoalRepairFailed { goal: Vec2, radius: f32 },
    /// A walkability mask buffer does not match its declared dimensions.
    #[error("walkability mask is {actual} bytes, expected {expected} for {width}x{height}")]
    InvalidMask { width: u32, height: u32, expected: usize, actual: usize },
    /// The mask image could not be sampled (unsupported or compressed format).
    #[error("walkability mask could not be sampled: {0}")]
    MaskSampling(String),
}
