//! Decaying spatial heatmaps of recent hand activity.
//!
//! Each frame the whole map fades by a constant factor, then every landmark
//! of every detected hand refreshes the cells around its position. Fresh
//! intensity is combined with the faded value by taking the maximum, so a
//! cell never exceeds 1 no matter how often it is hit.
//!
//! Two shapes are provided:
//! - [`HeatmapGrid`]: a small N×N grid, one cell plus weighted neighbours per hit
//! - [`HeatmapField`]: a pixel field with a quadratic radial falloff per hit

mod field;
mod grid;

pub use field::{FieldConfig, HeatmapField};
pub use grid::{GridConfig, HeatmapGrid};

use crate::landmark::HandLandmarks;
use crate::{CoreError, Result};
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Intensities below this are snapped to zero while decaying.
pub const DECAY_FLOOR: f32 = 1e-3;

/// Which heatmap shape a session uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeatmapMode {
    /// Coarse N×N grid
    #[default]
    Grid,
    /// Fine pixel field
    Field,
}

/// Heatmap configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapConfig {
    /// Shape used for new sessions
    pub mode: HeatmapMode,
    /// Intensity deposited by each landmark
    pub deposit_intensity: f32,
    /// Cells above this intensity count as active
    pub active_threshold: f32,
    /// Grid settings
    pub grid: GridConfig,
    /// Field settings
    pub field: FieldConfig,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            mode: HeatmapMode::Grid,
            deposit_intensity: 1.0,
            active_threshold: 0.1,
            grid: GridConfig::default(),
            field: FieldConfig::default(),
        }
    }
}

impl HeatmapConfig {
    /// Check every value is inside its accepted range.
    pub fn validate(&self) -> Result<()> {
        check_unit("heatmap.deposit_intensity", self.deposit_intensity)?;
        check_unit("heatmap.active_threshold", self.active_threshold)?;
        check_decay("heatmap.grid.decay_factor", self.grid.decay_factor)?;
        check_decay("heatmap.field.decay_factor", self.field.decay_factor)?;
        check_unit("heatmap.grid.neighbor_weight", self.grid.neighbor_weight)?;

        if self.grid.size == 0 {
            return Err(CoreError::InvalidConfig(
                "heatmap.grid.size must be at least 1".to_string(),
            ));
        }
        if self.field.width == 0 || self.field.height == 0 {
            return Err(CoreError::InvalidConfig(format!(
                "heatmap.field dimensions must be non-zero, got {}x{}",
                self.field.width, self.field.height
            )));
        }
        if !(self.field.radius.is_finite() && self.field.radius > 0.0) {
            return Err(CoreError::InvalidConfig(format!(
                "heatmap.field.radius must be positive, got {}",
                self.field.radius
            )));
        }
        Ok(())
    }
}

fn check_unit(name: &str, value: f32) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(CoreError::InvalidConfig(format!(
            "{name} must be within [0, 1], got {value}"
        )))
    }
}

fn check_decay(name: &str, value: f32) -> Result<()> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(CoreError::InvalidConfig(format!(
            "{name} must be within (0, 1], got {value}"
        )))
    }
}

/// Point-in-time view of a heatmap for consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapSnapshot {
    /// Columns
    pub width: usize,
    /// Rows
    pub height: usize,
    /// Cells above the active threshold
    pub active_cells: usize,
    /// Highest intensity in the map
    pub peak: f32,
    /// Row-major intensities, present only when requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cells: Option<Vec<Vec<f32>>>,
}

/// A fixed-size 2D intensity map that fades over time.
pub trait HeatmapAccumulator {
    /// Number of columns
    fn width(&self) -> usize;

    /// Number of rows
    fn height(&self) -> usize;

    /// Row-major intensities, each in `[0, 1]`
    fn cells(&self) -> &[f32];

    /// Intensity threshold for [`active_cells`](Self::active_cells)
    fn active_threshold(&self) -> f32;

    /// Fade every cell by the configured factor.
    fn decay(&mut self);

    /// Refresh the cells around a normalized image position.
    fn deposit(&mut self, position: Vec2, intensity: f32);

    /// Zero every cell.
    fn reset(&mut self);

    /// Intensity at column `x`, row `y`.
    fn cell(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        self.cells().get(y * self.width() + x).copied()
    }

    /// Number of cells above the active threshold.
    fn active_cells(&self) -> usize {
        let threshold = self.active_threshold();
        self.cells().iter().filter(|&&v| v > threshold).count()
    }

    /// Highest intensity in the map.
    fn peak(&self) -> f32 {
        self.cells().iter().copied().fold(0.0, f32::max)
    }

    /// Deposit every landmark of a hand.
    fn deposit_hand(&mut self, hand: &HandLandmarks, intensity: f32) {
        for point in hand.points() {
            self.deposit(point.truncate(), intensity);
        }
    }

    /// Summarize the current state.
    fn snapshot(&self, include_cells: bool) -> HeatmapSnapshot {
        let cells = include_cells.then(|| {
            self.cells()
                .chunks(self.width().max(1))
                .map(<[f32]>::to_vec)
                .collect()
        });

        HeatmapSnapshot {
            width: self.width(),
            height: self.height(),
            active_cells: self.active_cells(),
            peak: self.peak(),
            cells,
        }
    }
}

/// Row-major intensity storage shared by both heatmap shapes.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct IntensityBuffer {
    width: usize,
    height: usize,
    values: Vec<f32>,
}

impl IntensityBuffer {
    pub(crate) fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            values: vec![0.0; width * height],
        }
    }

    pub(crate) fn width(&self) -> usize {
        self.width
    }

    pub(crate) fn height(&self) -> usize {
        self.height
    }

    pub(crate) fn values(&self) -> &[f32] {
        &self.values
    }

    pub(crate) fn decay(&mut self, factor: f32) {
        for value in &mut self.values {
            *value *= factor;
            if *value < DECAY_FLOOR {
                *value = 0.0;
            }
        }
    }

    /// Raise a cell to `value` if it is currently lower.
    pub(crate) fn raise(&mut self, x: usize, y: usize, value: f32) {
        if x >= self.width || y >= self.height || !value.is_finite() {
            return;
        }
        let cell = &mut self.values[y * self.width + x];
        *cell = cell.max(value).clamp(0.0, 1.0);
    }

    pub(crate) fn clear(&mut self) {
        self.values.fill(0.0);
    }
}

/// Runtime choice between the two heatmap shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum Heatmap {
    /// Coarse grid
    Grid(HeatmapGrid),
    /// Pixel field
    Field(HeatmapField),
}

impl Heatmap {
    /// Build the shape selected by `config.mode`.
    pub fn from_config(config: &HeatmapConfig) -> Self {
        match config.mode {
            HeatmapMode::Grid => {
                Heatmap::Grid(HeatmapGrid::new(config.grid, config.active_threshold))
            }
            HeatmapMode::Field => {
                Heatmap::Field(HeatmapField::new(config.field, config.active_threshold))
            }
        }
    }

    /// Shape of this heatmap
    pub fn mode(&self) -> HeatmapMode {
        match self {
            Heatmap::Grid(_) => HeatmapMode::Grid,
            Heatmap::Field(_) => HeatmapMode::Field,
        }
    }

    fn inner(&self) -> &dyn HeatmapAccumulator {
        match self {
            Heatmap::Grid(grid) => grid,
            Heatmap::Field(field) => field,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn HeatmapAccumulator {
        match self {
            Heatmap::Grid(grid) => grid,
            Heatmap::Field(field) => field,
        }
    }
}

impl Default for Heatmap {
    fn default() -> Self {
        Heatmap::from_config(&HeatmapConfig::default())
    }
}

impl HeatmapAccumulator for Heatmap {
    fn width(&self) -> usize {
        self.inner().width()
    }

    fn height(&self) -> usize {
        self.inner().height()
    }

    fn cells(&self) -> &[f32] {
        self.inner().cells()
    }

    fn active_threshold(&self) -> f32 {
        self.inner().active_threshold()
    }

    fn decay(&mut self) {
        self.inner_mut().decay();
    }

    fn deposit(&mut self, position: Vec2, intensity: f32) {
        self.inner_mut().deposit(position, intensity);
    }

    fn reset(&mut self) {
        self.inner_mut().reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_validate() {
        assert!(HeatmapConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_rejects_bad_decay() {
        let mut config = HeatmapConfig::default();
        config.grid.decay_factor = 1.5;
        assert!(config.validate().is_err());

        let mut config = HeatmapConfig::default();
        config.field.decay_factor = 0.0;
        assert!(config.validate().is_err());

        let mut config = HeatmapConfig::default();
        config.field.radius = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_config_picks_mode() {
        let mut config = HeatmapConfig::default();
        assert_eq!(Heatmap::from_config(&config).mode(), HeatmapMode::Grid);

        config.mode = HeatmapMode::Field;
        let heatmap = Heatmap::from_config(&config);
        assert_eq!(heatmap.mode(), HeatmapMode::Field);
        assert_eq!(heatmap.width(), config.field.width);
        assert_eq!(heatmap.height(), config.field.height);
    }

    #[test]
    fn test_snapshot_rows() {
        let mut heatmap = Heatmap::default();
        heatmap.deposit(Vec2::new(0.0, 0.0), 1.0);

        let snapshot = heatmap.snapshot(true);
        let cells = snapshot.cells.unwrap();
        assert_eq!(cells.len(), snapshot.height);
        assert!(cells.iter().all(|row| row.len() == snapshot.width));
        assert_eq!(cells[0][0], 1.0);
        assert_eq!(snapshot.peak, 1.0);

        assert!(heatmap.snapshot(false).cells.is_none());
    }

    #[test]
    fn test_buffer_raise_is_max_and_clamped() {
        let mut buffer = IntensityBuffer::new(2, 2);
        buffer.raise(0, 0, 0.5);
        buffer.raise(0, 0, 0.3);
        assert_eq!(buffer.values()[0], 0.5);
        buffer.raise(1, 1, 3.0);
        assert_eq!(buffer.values()[3], 1.0);
        buffer.raise(5, 5, 1.0);
        buffer.raise(0, 1, f32::NAN);
        assert_eq!(buffer.values()[2], 0.0);
    }

    #[test]
    fn test_buffer_decay_snaps_to_zero() {
        let mut buffer = IntensityBuffer::new(1, 1);
        buffer.raise(0, 0, 0.0015);
        buffer.decay(0.5);
        assert_eq!(buffer.values()[0], 0.0);
    }
}
