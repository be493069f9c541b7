//! Coarse N×N activity grid.

use super::{HeatmapAccumulator, IntensityBuffer};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Grid heatmap settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Cells per side
    pub size: usize,
    /// Multiplicative fade applied every frame
    pub decay_factor: f32,
    /// Share of the deposit given to edge-adjacent neighbours (diagonals get it divided by √2)
    pub neighbor_weight: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            size: 5,
            decay_factor: 0.92,
            neighbor_weight: 0.5,
        }
    }
}

/// N×N grid; each hit lights one cell and, more faintly, its 8 neighbours.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapGrid {
    buffer: IntensityBuffer,
    config: GridConfig,
    active_threshold: f32,
}

impl HeatmapGrid {
    /// Create an empty grid
    pub fn new(config: GridConfig, active_threshold: f32) -> Self {
        let size = config.size.max(1);
        debug!(
            "HeatmapGrid created: {}x{}, decay={}",
            size, size, config.decay_factor
        );
        Self {
            buffer: IntensityBuffer::new(size, size),
            config,
            active_threshold,
        }
    }

    /// Cell covering a normalized position; positions outside `[0, 1]` snap to the border.
    pub fn cell_at(&self, position: Vec2) -> Option<(usize, usize)> {
        if !position.is_finite() {
            return None;
        }
        let size = self.buffer.width();
        let to_cell = |v: f32| ((v.clamp(0.0, 1.0) * size as f32) as usize).min(size - 1);
        Some((to_cell(position.x), to_cell(position.y)))
    }
}

impl HeatmapAccumulator for HeatmapGrid {
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
        let Some((cx, cy)) = self.cell_at(position) else {
            return;
        };

        self.buffer.raise(cx, cy, intensity);

        for dy in -1i32..=1 {
            for dx in -1i32..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let (Some(x), Some(y)) = (
                    cx.checked_add_signed(dx as isize),
                    cy.checked_add_signed(dy as isize),
                ) else {
                    continue;
                };
                let distance = ((dx * dx + dy * dy) as f32).sqrt();
                self.buffer
                    .raise(x, y, intensity * self.config.neighbor_weight / distance);
            }
        }
    }

    fn reset(&mut self) {
        self.buffer.clear();
    }
}
