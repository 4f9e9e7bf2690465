use bevy::prelude::*;
use fixedbitset::FixedBitSet;
use smallvec::SmallVec;
use super::context::NavigationContext;
use super::nearest::find_nearest_walkable;
use super::open_set::{NodeId, OpenSet};
use super::types::{GridNode, NavError, NavRect, Path, DIAGONAL_COST, ORTHOGONAL_COST};

/// Searches expanding more nodes than this are logged as slow.
const SLOW_SEARCH_EXPANSIONS: usize = 2_000;

/// Neighbor offsets in grid steps: orthogonal first, then diagonal.
const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (0, -1),
    (0, 1),
    (-1, 0),
    (1, 0),
    (-1, -1),
    (-1, 1),
    (1, -1),
    (1, 1),
];

/// Bookkeeping from one search, for logging and tests.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchStats {
    /// Nodes popped from the open set and finalized.
    pub expansions: usize,
    /// Accumulated step cost (10 per orthogonal, 14 per diagonal) up to the cell
    /// that ended the search, excluding the final hop onto the exact goal.
    pub goal_cost: Option<u32>,
    /// Where an invalid goal was moved to, if it had to be.
    pub repaired_goal: Option<Vec2>,
    /// The search stopped on the iteration cap rather than an empty open set.
    pub hit_iteration_cap: bool,
}

/// Arena entry. Parents are arena indices so the whole tree drops with the search.
#[derive(Clone, Copy, Debug)]
struct SearchNode {
    cell: GridNode,
    g: u32,
    parent: Option<NodeId>,
}

/// Finalized cells, as a bitset over the lattice covering the search bounds.
///
/// Only the start cell can lie outside the bounds; neighbors never do. An
/// out-of-bounds cell can therefore never be reached again and is not tracked.
struct ClosedSet {
    bits: FixedBitSet,
    col_min: i32,
    row_min: i32,
    cols: i32,
    rows: i32,
    step: i32,
}

impl ClosedSet {
    fn new(bounds: &NavRect, grid_size: u32) -> Self {
        let g = grid_size as f32;
        let col_min = (bounds.left / g).floor() as i32;
        let row_min = (bounds.top / g).floor() as i32;
        let cols = ((bounds.right() / g).ceil() as i32 - col_min + 1).max(0);
        let rows = ((bounds.bottom() / g).ceil() as i32 - row_min + 1).max(0);
        Self {
            bits: FixedBitSet::with_capacity(cols as usize * rows as usize),
            col_min,
            row_min,
            cols,
            rows,
            step: grid_size as i32,
        }
    }

    fn slot(&self, cell: GridNode) -> Option<usize> {
        let col = cell.x.div_euclid(self.step) - self.col_min;
        let row = cell.y.div_euclid(self.step) - self.row_min;
        if col < 0 || row < 0 || col >= self.cols || row >= self.rows {
            return None;
        }
        Some(row as usize * self.cols as usize + col as usize)
    }

    fn contains(&self, cell: GridNode) -> bool {
        self.slot(cell).is_some_and(|i| self.bits.contains(i))
    }

    fn insert(&mut self, cell: GridNode) {
        if let Some(i) = self.slot(cell) {
            self.bits.insert(i);
        }
    }
}

/// Plan a walkable route from `start` to `goal` (scene space).
///
/// An invalid goal is first moved to the nearest valid point within
/// `goal_repair_radius`. The returned path ends exactly on that (repaired) goal.
pub fn find_path(ctx: &NavigationContext, start: Vec2, goal: Vec2) -> Result<Path, NavError> {
    find_path_with_stats(ctx, start, goal).0
}

pub fn find_path_with_stats(
    ctx: &NavigationContext,
    start: Vec2,
    goal: Vec2,
) -> (Result<Path, NavError>, SearchStats) {
    let mut stats = SearchStats::default();
    let result = search(ctx, start, goal, &mut stats);

    if stats.hit_iteration_cap {
        warn!(
            "[NAVIGATION] A* hit the iteration cap ({}) from {} to {}",
            ctx.settings.max_iterations, start, goal
        );
    } else if stats.expansions > SLOW_SEARCH_EXPANSIONS {
        debug!("[NAVIGATION] A* expanded {} nodes from {} to {}", stats.expansions, start, goal);
    }
    if let Err(e) = &result {
        debug!("[NAVIGATION] No path: {}", e);
    }

    (result, stats)
}

fn search(
    ctx: &NavigationContext,
    start: Vec2,
    goal: Vec2,
    stats: &mut SearchStats,
) -> Result<Path, NavError> {
    let settings = &ctx.settings;
    let grid_size = settings.grid_size.max(1);
    let step = grid_size as i32;

    let goal = if ctx.is_position_valid(goal) {
        goal
    } else {
        let radius = settings.goal_repair_radius;
        let repaired = find_nearest_walkable(ctx, goal, radius, grid_size as f32)
            .ok_or(NavError::GoalRepairFailed { goal, radius })?;
        stats.repaired_goal = Some(repaired);
        repaired
    };

    let start_cell = GridNode::quantize(start, grid_size);
    let goal_cell = GridNode::quantize(goal, grid_size);
    if start_cell == goal_cell {
        stats.goal_cost = Some(0);
        return Ok(Path::new(vec![goal]));
    }

    let estimate = |cell: GridNode| {
        settings.heuristic.estimate(
            (cell.x as f32 - goal_cell.x as f32) / grid_size as f32,
            (cell.y as f32 - goal_cell.y as f32) / grid_size as f32,
        )
    };

    let mut arena: Vec<SearchNode> = vec![SearchNode { cell: start_cell, g: 0, parent: None }];
    let mut open = OpenSet::new();
    let mut closed = ClosedSet::new(&ctx.bounds, grid_size);
    open.push(start_cell, 0, 0, estimate(start_cell));

    loop {
        if stats.expansions >= settings.max_iterations {
            stats.hit_iteration_cap = true;
            break;
        }
        let Some((cell, id)) = open.pop() else {
            break;
        };
        if closed.contains(cell) {
            continue;
        }
        closed.insert(cell);
        stats.expansions += 1;

        let current = arena[id as usize];
        // The goal cell itself may be blocked even when the goal point is not,
        // so any cell touching it ends the search.
        if current.cell.x.abs_diff(goal_cell.x) <= grid_size && current.cell.y.abs_diff(goal_cell.y) <= grid_size {
            stats.goal_cost = Some(current.g);
            return Ok(reconstruct_path(&arena, id, goal));
        }

        for (neighbor, cost) in neighbors(ctx, current.cell, step) {
            if closed.contains(neighbor) {
                continue;
            }
            let tentative_g = current.g + cost;
            if open.queued_g(neighbor).is_some_and(|g| g <= tentative_g) {
                continue;
            }
            let node = arena.len() as NodeId;
            arena.push(SearchNode { cell: neighbor, g: tentative_g, parent: Some(id) });
            open.push(neighbor, node, tentative_g, estimate(neighbor));
        }
    }

    Err(NavError::UnreachableGoal { start, goal, expansions: stats.expansions })
}

fn neighbors(ctx: &NavigationContext, cell: GridNode, step: i32) -> SmallVec<[(GridNode, u32); 8]> {
    NEIGHBOR_OFFSETS
        .iter()
        .filter_map(|&(dx, dy)| {
            let next = GridNode::new(cell.x.saturating_add(dx * step), cell.y.saturating_add(dy * step));
            if !ctx.is_position_valid(next.to_vec2()) {
                return None;
            }
            let cost = if dx != 0 && dy != 0 { DIAGONAL_COST } else { ORTHOGONAL_COST };
            Some((next, cost))
        })
        .collect()
}

fn reconstruct_path(arena: &[SearchNode], terminal: NodeId, goal: Vec2) -> Path {
    let mut waypoints = Vec::new();
    let mut current = Some(terminal);
    while let Some(id) = current {
        let node = arena[id as usize];
        waypoints.push(node.cell.to_vec2());
        current = node.parent;
    }
    waypoints.reverse();
    if let Some(last) = waypoints.last_mut() {
        *last = goal;
    }
    Path::new(waypoints)
}
