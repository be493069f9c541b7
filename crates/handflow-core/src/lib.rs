//! HandFlow Core - Hand Telemetry Domain Model
//!
//! This crate turns the 21 landmarks a hand detector reports per frame into
//! derived telemetry:
//! - Geometry primitives (distances, angles, palm normals)
//! - Finger extension, palm orientation and pinch analysis
//! - Priority-ordered gesture classification
//! - Decaying spatial heatmaps
//! - The per-frame session driver tying them together

#![warn(missing_docs)]

pub use glam::Vec3;
use thiserror::Error;

pub mod analyzer;
pub mod classifier;
pub mod config;
pub mod geometry;
pub mod heatmap;
pub mod landmark;
pub mod logging;
pub mod session;

// --- Re-exports grouped by category ---

// Landmarks
pub use landmark::{Finger, HandLandmarks, Handedness, LandmarkIndex, LANDMARK_COUNT};

// Analysis
pub use analyzer::{
    analyze_hand, calculate_finger_extension, calculate_orientation, calculate_pinch,
    AnalyzerConfig, ExtensionCoefficients, ExtensionConfig, FingerExtension, HandOrientation,
    HandSignals, PinchConfig, PinchData, PinchHistory, PINCH_HISTORY_SIZE,
};

// Classification
pub use classifier::{classify_gesture, thumb_angle, GestureThresholds, GestureType};

// Heatmap
pub use heatmap::{
    FieldConfig, GridConfig, Heatmap, HeatmapAccumulator, HeatmapConfig, HeatmapField,
    HeatmapGrid, HeatmapMode, HeatmapSnapshot,
};

// Session & Config
pub use config::{HandflowConfig, TrackingConfig};
pub use logging::LogConfig;
pub use session::{process_frame, FrameInput, FrameOutput, FrameReport, HandData, SessionState};

/// Core error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// A hand was supplied with the wrong number of landmarks
    #[error("Invalid landmark count: expected {expected}, found {found}")]
    LandmarkCount {
        /// Landmarks required per hand
        expected: usize,
        /// Landmarks actually supplied
        found: usize,
    },

    /// A configuration value is out of its accepted range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
