use bevy::prelude::*;
use super::astar::{find_path_with_stats, SearchStats};
use super::context::NavigationContext;
use super::follower::{FootPosition, PathFollower};
use super::obstacles::SolidObject;
use super::types::{NavError, Path};

/// Ask an actor to walk to a scene-space point.
///
/// Replaces any walk in progress. The outcome is reported by [`WalkFinished`]
/// on arrival or [`WalkFailed`] when no route exists.
#[derive(Message, Debug, Clone)]
pub struct WalkRequest {
    pub entity: Entity,
    pub target: Vec2,
}

/// An actor reached the end of its path. Sent exactly once per completed walk;
/// never sent for walks that were stopped or replaced.
#[derive(Message, Debug, Clone, PartialEq)]
pub struct WalkFinished {
    pub entity: Entity,
}

/// A walk request could not be planned. The actor has been stopped.
#[derive(Message, Debug, Clone)]
pub struct WalkFailed {
    pub entity: Entity,
    pub target: Vec2,
    pub reason: NavError,
}

/// Set when solid objects changed and the obstacle set has to be rebuilt.
/// The rebuild waits until no actor is following a path.
#[derive(Resource, Debug, Default)]
pub struct ObstacleRebuild {
    pub pending: bool,
}

/// Running totals over all searches.
#[derive(Resource, Debug, Default)]
pub struct NavigationStats {
    pub searches: u64,
    pub failures: u64,
    pub expansions: u64,
    pub iteration_cap_hits: u64,
}

impl NavigationStats {
    fn record(&mut self, stats: &SearchStats, succeeded: bool) {
        self.searches += 1;
        self.expansions += stats.expansions as u64;
        if !succeeded {
            self.failures += 1;
        }
        if stats.hit_iteration_cap {
            self.iteration_cap_hits += 1;
        }
        crate::profile_log!(
            self.searches,
            "[NAVIGATION] {} searches, {} failed, {} capped, {} nodes expanded",
            self.searches,
            self.failures,
            self.iteration_cap_hits,
            self.expansions
        );
    }
}

/// Plan a walk the way the player expects a click to behave: straight to the
/// target when possible, otherwise toward the nearest walkable point around it.
pub fn plan_walk(
    ctx: &NavigationContext,
    from: Vec2,
    target: Vec2,
    stats: &mut NavigationStats,
) -> Result<Path, NavError> {
    let (first, search) = find_path_with_stats(ctx, from, target);
    stats.record(&search, first.is_ok());
    let first_error = match first {
        Ok(path) => return Ok(path),
        Err(e) => e,
    };

    // A repair that already failed over a wider radius cannot succeed here
    if matches!(first_error, NavError::GoalRepairFailed { .. })
        && ctx.settings.fallback_radius <= ctx.settings.goal_repair_radius
    {
        return Err(first_error);
    }
    let Some(nearest) = ctx.find_nearest_walkable(target, ctx.settings.fallback_radius, None) else {
        return Err(first_error);
    };
    if nearest == target {
        return Err(first_error);
    }
    debug!("[NAVIGATION] Retrying walk toward {} instead of {}", nearest, target);
    let (retry, search) = find_path_with_stats(ctx, from, nearest);
    stats.record(&search, retry.is_ok());
    retry
}

pub(super) fn process_walk_requests(
    mut requests: MessageReader<WalkRequest>,
    ctx: Res<NavigationContext>,
    mut q_walkers: Query<(&FootPosition, &mut PathFollower)>,
    mut failed: MessageWriter<WalkFailed>,
    mut stats: ResMut<NavigationStats>,
) {
    if requests.is_empty() {
        return;
    }

    if !ctx.is_loaded() {
        for request in requests.read() {
            warn!("[NAVIGATION] Walk request for {:?} before scene navigation was built", request.entity);
        }
        return;
    }

    for request in requests.read() {
        let Ok((foot, mut follower)) = q_walkers.get_mut(request.entity) else {
            warn!("[NAVIGATION] Walk request for {:?}, which cannot walk", request.entity);
            continue;
        };

        match plan_walk(&ctx, foot.0, request.target, &mut stats) {
            Ok(path) => follower.set_path(path, None),
            Err(reason) => {
                info!("[NAVIGATION] {:?} cannot reach {}: {}", request.entity, request.target, reason);
                follower.stop();
                failed.write(WalkFailed {
                    entity: request.entity,
                    target: request.target,
                    reason,
                });
            }
        }
    }
}

pub(super) fn follow_paths(
    time: Res<Time>,
    mut q_walkers: Query<(Entity, &mut FootPosition, &mut PathFollower)>,
    mut finished: MessageWriter<WalkFinished>,
) {
    let dt = time.delta_secs();
    for (entity, mut foot, mut follower) in q_walkers.iter_mut() {
        if !follower.is_following() {
            continue;
        }
        if !follower.update(dt, &mut *foot) {
            finished.write(WalkFinished { entity });
        }
    }
}

pub(super) fn rebuild_obstacles(
    mut ctx: ResMut<NavigationContext>,
    mut rebuild: ResMut<ObstacleRebuild>,
    q_changed: Query<(), Changed<SolidObject>>,
    mut removed: RemovedComponents<SolidObject>,
    q_solids: Query<&SolidObject>,
    q_followers: Query<&PathFollower>,
) {
    if !q_changed.is_empty() || removed.read().count() > 0 {
        rebuild.pending = true;
    }
    if !rebuild.pending || !ctx.is_loaded() {
        return;
    }
    if q_followers.iter().any(PathFollower::is_following) {
        return;
    }

    let hotspot_inflation = ctx.settings.hotspot_inflation;
    let ambient_inflation = ctx.settings.ambient_inflation;
    ctx.set_obstacles(q_solids.iter().map(|s| s.obstacle_rect(hotspot_inflation, ambient_inflation)));
    rebuild.pending = false;
    debug!("[NAVIGATION] Rebuilt obstacle set ({} rects)", ctx.obstacles.len());
}
