//! Pixel-resolution activity field with a radial falloff kernel.

use super::{HeatmapAccumulator, IntensityBuffer};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Field heatmap settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Field width in pixels
    pub width: usize,
    /// Field height in pixels
    pub height: usize,
    /// Multiplicative fade applied every frame
    pub decay_factor: f32,
    /// Kernel radius in pixels
    pub radius: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            width: 160,
            height: 120,
            decay_factor: 0.95,
            radius: 12.0,
        }
    }
}

/// Pixel field; each hit paints `intensity * (1 - dist / radius)^2` around it.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapField {
    buffer: IntensityBuffer,
    config: FieldConfig,
    active_threshold: f32,
}

impl HeatmapField {
    /// Create an empty field
    pub fn new(config: FieldConfig, active_threshold: f32) -> Self {
        let width = config.width.max(1);
        let height = config.height.max(1);
        debug!(
            "HeatmapField created: {}x{}, radius={}, decay={}",
            width, height, config.radius, config.decay_factor
        );
        Self {
            buffer: IntensityBuffer::new(width, height),
            config,
            active_threshold,
        }
    }

    /// Kernel weight at `distance` pixels from a hit.
    pub fn falloff(&self, distance: f32) -> f32 {
        let radius = self.config.radius;
        if radius <= 0.0 || distance >= radius {
            return 0.0;
        }
        let t = 1.0 - distance / radius;
        t * t
    }
}

impl HeatmapAccumulator for HeatmapField {
    fn width(&self) -> usize {
        self.buffer.width()
    }

    fn height(&self) -> usize {
        self.buffer.height()
    }

    fn cells(&self) -> &[f32] {
        self.buffer.values()
    }

    fn active_threshold(&self) -> f32 {
        self.active_threshold
    }

    fn decay(&mut self) {
        self.buffer.decay(self.config.decay_factor);
    }

    fn deposit(&mut self, position: Vec2, intensity: f32) {
        if !position.is_finite() || self.config.radius <= 0.0 {
            return;
        }

        let width = self.buffer.width();
        let height = self.buffer.height();
        let center = position * Vec2::new(width as f32, height as f32);
        let radius = self.config.radius;

        // Pixel bounding box of the kernel, clipped to the field
        let x0 = (center.x - radius).floor().max(0.0) as usize;
        let y0 = (center.y - radius).floor().max(0.0) as usize;
        let x1 = ((center.x + radius).ceil().max(0.0) as usize).min(width);
        let y1 = ((center.y + radius).ceil().max(0.0) as usize).min(height);

        for y in y0..y1 {
            for x in x0..x1 {
                let pixel = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let weight = self.falloff(pixel.distance(center));
                if weight > 0.0 {
                    self.buffer.raise(x, y, intensity * weight);
                }
            }
        }
    }

    fn reset(&mut self) {
        self.buffer.clear();
    }
}
