//! Walkable-surface sampling.
//!
//! A scene's walkable area is painted as a mask image: bright pixels are floor,
//! dark pixels are walls, furniture and sky. Only the primary (red) channel is
//! consulted. Scenes without a mask are walkable everywhere inside their bounds.

use bevy::prelude::*;
use super::types::{NavError, WALKABLE_THRESHOLD};

#[derive(Clone, Debug, PartialEq)]
enum Samples {
    /// No mask: every in-bounds point is walkable.
    Open,
    /// Primary channel, row-major, one byte per pixel.
    Mask(Vec<u8>),
}

/// 2D binary walkability surface of fixed dimensions.
///
/// Rebuilt on scene load and never mutated afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct WalkabilityField {
    width: u32,
    height: u32,
    samples: Samples,
}

impl Default for WalkabilityField {
    fn default() -> Self {
        Self::open(0, 0)
    }
}

impl WalkabilityField {
    /// Uniformly walkable field, used when a scene has no mask.
    pub fn open(width: u32, height: u32) -> Self {
        Self { width, height, samples: Samples::Open }
    }

    /// Build from one primary-channel byte per pixel.
    pub fn from_primary_channel(width: u32, height: u32, samples: Vec<u8>) -> Result<Self, NavError> {
        let expected = width as usize * height as usize;
        if samples.len() != expected {
            return Err(NavError::InvalidMask { width, height, expected, actual: samples.len() });
        }
        Ok(Self { width, height, samples: Samples::Mask(samples) })
    }

    /// Build from tightly packed RGBA8 pixels, keeping the red channel.
    pub fn from_rgba8(width: u32, height: u32, rgba: &[u8]) -> Result<Self, NavError> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(NavError::InvalidMask { width, height, expected, actual: rgba.len() });
        }
        let samples = rgba.chunks_exact(4).map(|px| px[0]).collect();
        Ok(Self { width, height, samples: Samples::Mask(samples) })
    }

    /// Sample a mask image, stretching it (nearest neighbour) to the scene size.
    pub fn from_image(image: &Image, width: u32, height: u32) -> Result<Self, NavError> {
        let src_w = image.width();
        let src_h = image.height();
        if src_w == 0 || src_h == 0 {
            return Err(NavError::InvalidMask { width: src_w, height: src_h, expected: 1, actual: 0 });
        }

        let mut samples = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            let sy = (y as u64 * src_h as u64 / height as u64) as u32;
            for x in 0..width {
                let sx = (x as u64 * src_w as u64 / width as u64) as u32;
                let color = image
                    .get_color_at(sx, sy)
                    .map_err(|e| NavError::MaskSampling(e.to_string()))?;
                let red = color.to_srgba().red.clamp(0.0, 1.0);
                samples.push((red * 255.0).round() as u8);
            }
        }
        Ok(Self { width, height, samples: Samples::Mask(samples) })
    }

    /// Use the mask when one is present and readable, otherwise fall back to an open field.
    pub fn from_mask(mask: Option<&Image>, width: u32, height: u32) -> Self {
        let Some(image) = mask else {
            return Self::open(width, height);
        };
        match Self::from_image(image, width, height) {
            Ok(field) => field,
            Err(e) => {
                warn!("[NAVIGATION] Unusable walkability mask ({}), treating scene as fully walkable", e);
                Self::open(width, height)
            }
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn has_mask(&self) -> bool {
        matches!(self.samples, Samples::Mask(_))
    }

    /// Whether a scene-space point is walkable. Anything outside
    /// `[0, width) × [0, height)` (including NaN) is not.
    pub fn is_walkable(&self, x: f32, y: f32) -> bool {
        if !(x >= 0.0 && x < self.width as f32 && y >= 0.0 && y < self.height as f32) {
            return false;
        }
        match &self.samples {
            Samples::Open => true,
            Samples::Mask(samples) => {
                let idx = y as usize * self.width as usize + x as usize;
                samples.get(idx).is_some_and(|&s| s > WALKABLE_THRESHOLD)
            }
        }
    }

    pub fn is_walkable_at(&self, point: Vec2) -> bool {
        self.is_walkable(point.x, point.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds_is_never_walkable() {
        let field = WalkabilityField::open(100, 50);
        for (x, y) in [(-0.1, 10.0), (10.0, -1.0), (100.0, 10.0), (10.0, 50.0), (1e9, 1e9), (f32::NAN, 1.0)] {
            assert!(!field.is_walkable(x, y), "({x}, {y}) should be outside");
        }
        assert!(field.is_walkable(0.0, 0.0));
        assert!(field.is_walkable(99.9, 49.9));
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let field = WalkabilityField::from_primary_channel(3, 1, vec![50, 51, 255]).unwrap();
        assert!(!field.is_walkable(0.5, 0.0));
        assert!(field.is_walkable(1.5, 0.0));
        assert!(field.is_walkable(2.0, 0.5));
    }

    #[test]
    fn test_rgba_uses_red_channel() {
        // Bright green/blue but dark red must stay unwalkable
        let rgba = [10, 255, 255, 255, 200, 0, 0, 255];
        let field = WalkabilityField::from_rgba8(2, 1, &rgba).unwrap();
        assert!(!field.is_walkable(0.0, 0.0));
        assert!(field.is_walkable(1.0, 0.0));
    }

    #[test]
    fn test_mismatched_buffer_is_rejected() {
        let err = WalkabilityField::from_primary_channel(4, 4, vec![255; 15]).unwrap_err();
        assert!(matches!(err, NavError::InvalidMask { expected: 16, actual: 15, .. }));
    }

    #[test]
    fn test_missing_mask_falls_back_to_open() {
        let field = WalkabilityField::from_mask(None, 800, 450);
        assert!(!field.has_mask());
        assert!(field.is_walkable(400.0, 200.0));
        assert!(!field.is_walkable(800.0, 200.0));
    }
}
