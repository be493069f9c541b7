//! Configuration surface.
//!
//! Every tunable constant of the pipeline lives here so that it can be
//! adjusted from a config file without touching the algorithms.

use crate::analyzer::AnalyzerConfig;
use crate::classifier::GestureThresholds;
use crate::heatmap::HeatmapConfig;
use crate::logging::LogConfig;
use crate::Result;
use serde::{Deserialize, Serialize};

/// Settings for the per-frame tracking pipeline
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Finger extension and pinch settings
    pub analyzer: AnalyzerConfig,
    /// Gesture rule thresholds
    pub gestures: GestureThresholds,
    /// Heatmap shape and decay
    pub heatmap: HeatmapConfig,
}

impl TrackingConfig {
    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        self.analyzer.validate()?;
        self.gestures.validate()?;
        self.heatmap.validate()?;
        Ok(())
    }
}

/// Root of a HandFlow configuration file
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HandflowConfig {
    /// Tracking pipeline settings
    pub tracking: TrackingConfig,
    /// Logging configuration
    pub log: LogConfig,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heatmap::HeatmapMode;

    #[test]
    fn test_default_config_is_valid() {
        assert!(TrackingConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let config: HandflowConfig = ron::from_str(
            "(tracking: (heatmap: (mode: field), analyzer: (pinch: (distance_threshold: 0.08))))",
        )
        .unwrap();

        assert_eq!(config.tracking.heatmap.mode, HeatmapMode::Field);
        assert_eq!(config.tracking.analyzer.pinch.distance_threshold, 0.08);
        assert_eq!(config.tracking.analyzer.pinch.history_capacity, 50);
        assert_eq!(config.tracking.gestures, GestureThresholds::default());
        assert_eq!(config.log, LogConfig::default());
    }

    #[test]
    fn test_json_roundtrip() {
        let mut config = HandflowConfig::default();
        config.tracking.heatmap.grid.size = 15;
        let json = serde_json::to_string(&config).unwrap();
        let back: HandflowConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
