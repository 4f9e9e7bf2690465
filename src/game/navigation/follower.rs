use bevy::prelude::*;
use std::fmt;
use super::types::Path;

/// One-shot notification fired when a follower reaches the end of its path.
pub type ArrivalCallback = Box<dyn FnOnce() + Send + Sync + 'static>;

/// Something with a scene-space anchor that a follower can move.
/// For characters the anchor is the point between the feet.
pub trait Anchor {
    fn anchor(&self) -> Vec2;
    fn set_anchor(&mut self, anchor: Vec2);
}

impl Anchor for Vec2 {
    fn anchor(&self) -> Vec2 {
        *self
    }

    fn set_anchor(&mut self, anchor: Vec2) {
        *self = anchor;
    }
}

/// Scene-space foot position of an actor (origin top-left, y down).
///
/// This is the authoritative position for navigation; the `Transform` is
/// derived from it each frame.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
pub struct FootPosition(pub Vec2);

impl Anchor for FootPosition {
    fn anchor(&self) -> Vec2 {
        self.0
    }

    fn set_anchor(&mut self, anchor: Vec2) {
        self.0 = anchor;
    }
}

/// Moves an actor along a waypoint list at a fixed speed, one tick at a time.
///
/// Idle when it has no path. `set_path` starts following (replacing whatever was
/// in flight); reaching the last waypoint or calling `stop` returns to idle.
/// The arrival callback runs at most once and never on `stop`.
#[derive(Component, Default)]
pub struct PathFollower {
    path: Vec<Vec2>,
    index: usize,
    direction: Vec2,
    /// Scene units per second.
    pub speed: f32,
    on_arrival: Option<ArrivalCallback>,
}

impl fmt::Debug for PathFollower {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathFollower")
            .field("path", &self.path)
            .field("index", &self.index)
            .field("direction", &self.direction)
            .field("speed", &self.speed)
            .field("has_callback", &self.on_arrival.is_some())
            .finish()
    }
}

impl PathFollower {
    pub fn new(speed: f32) -> Self {
        Self { speed, ..default() }
    }

    /// Start following `path`. An empty path is the same as `stop`.
    /// Any previous path and its callback are dropped without firing.
    pub fn set_path(&mut self, path: Path, on_arrival: Option<ArrivalCallback>) {
        if path.is_empty() {
            self.stop();
            return;
        }
        self.path = path.into_waypoints();
        self.index = 0;
        self.direction = Vec2::ZERO;
        self.on_arrival = on_arrival;
    }

    /// Drop the path and callback. Safe to call at any time.
    pub fn stop(&mut self) {
        self.path.clear();
        self.index = 0;
        self.direction = Vec2::ZERO;
        self.on_arrival = None;
    }

    pub fn is_following(&self) -> bool {
        !self.path.is_empty()
    }

    /// Unit vector of the current movement, zero while idle.
    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    pub fn current_target(&self) -> Option<Vec2> {
        self.path.get(self.index).copied()
    }

    /// Waypoints not yet reached, starting with the current target.
    pub fn remaining(&self) -> &[Vec2] {
        self.path.get(self.index..).unwrap_or(&[])
    }

    /// Advance `actor` by one tick of `dt` seconds. Returns whether it is still moving.
    ///
    /// When the current waypoint is within this tick's travel distance the actor
    /// snaps onto it and the next waypoint becomes the target. Snapping onto the
    /// last waypoint ends the walk and fires the arrival callback.
    pub fn update(&mut self, dt: f32, actor: &mut impl Anchor) -> bool {
        let Some(target) = self.current_target() else {
            return false;
        };

        let position = actor.anchor();
        let delta = target - position;
        let distance = delta.length();
        if distance > 0.0 {
            self.direction = delta / distance;
        }

        let travel = self.speed * dt;
        if distance <= travel {
            actor.set_anchor(target);
            self.index += 1;
            if self.index >= self.path.len() {
                let on_arrival = self.on_arrival.take();
                self.stop();
                if let Some(callback) = on_arrival {
                    callback();
                }
                return false;
            }
            return true;
        }

        actor.set_anchor(position + self.direction * travel);
        true
    }
}
