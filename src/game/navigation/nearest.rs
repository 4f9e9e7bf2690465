use bevy::prelude::*;
use std::f32::consts::TAU;
use super::context::NavigationContext;

/// Samples taken on each ring.
const RING_SAMPLES: usize = 8;

/// Radial scan for the closest valid point around `point`.
///
/// The point is first clamped into the navigable bounds. If that is already
/// valid it is returned as-is; otherwise rings of radius `step`, `2·step`, …
/// up to and including `max_radius` are sampled at eight evenly spaced angles,
/// starting east and turning toward +y. The first valid sample wins.
pub fn find_nearest_walkable(
    ctx: &NavigationContext,
    point: Vec2,
    max_radius: f32,
    step: f32,
) -> Option<Vec2> {
    let center = ctx.bounds.clamp_point(point);
    if ctx.is_position_valid(center) {
        return Some(center);
    }

    if step.is_nan() || step <= 0.0 {
        return None;
    }

    let mut ring = 1u32;
    loop {
        let radius = step * ring as f32;
        if radius > max_radius {
            return None;
        }
        for i in 0..RING_SAMPLES {
            let angle = TAU * i as f32 / RING_SAMPLES as f32;
            let candidate = center + Vec2::new(angle.cos(), angle.sin()) * radius;
            if ctx.is_position_valid(candidate) {
                return Some(candidate);
            }
        }
        ring += 1;
    }
}
