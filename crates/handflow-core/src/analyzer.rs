//! Hand Signal Analyzer - per-frame derived signals
//!
//! Converts one hand's landmarks into finger extension, palm orientation and
//! pinch data. Nothing here keeps state between calls: the only cross-frame
//! value, the pinch history, is passed in by the caller and handed back.

use crate::geometry::{
    calculate_heading, calculate_normal, distance_2d, distance_3d, finite_or_zero, normalize,
};
use crate::landmark::{Finger, HandLandmarks, LandmarkIndex};
use crate::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::trace;

/// Default capacity of the pinch strength history
pub const PINCH_HISTORY_SIZE: usize = 50;

/// Tunable coefficients of the finger extension ratio.
///
/// `ratio = (tip_to_wrist - mcp_to_wrist * offset_fraction) / (mcp_to_wrist * scale_factor)`,
/// clamped to `[0, 1]` and then multiplied by `sensitivity_gain` (clamped again).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtensionCoefficients {
    /// Fraction of the MCP-to-wrist distance subtracted from the tip distance
    pub offset_fraction: f32,
    /// Multiplier on the MCP-to-wrist distance used as the denominator
    pub scale_factor: f32,
    /// Final gain applied to the ratio
    pub sensitivity_gain: f32,
}

impl Default for ExtensionCoefficients {
    fn default() -> Self {
        Self {
            offset_fraction: 0.4,
            scale_factor: 1.0,
            sensitivity_gain: 1.2,
        }
    }
}

impl ExtensionCoefficients {
    fn validate(&self, name: &str) -> Result<()> {
        let values = [self.offset_fraction, self.scale_factor, self.sensitivity_gain];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(CoreError::InvalidConfig(format!(
                "{name}: coefficients must be finite"
            )));
        }
        if self.scale_factor <= 0.0 {
            return Err(CoreError::InvalidConfig(format!(
                "{name}: scale_factor must be positive, got {}",
                self.scale_factor
            )));
        }
        if self.sensitivity_gain <= 0.0 {
            return Err(CoreError::InvalidConfig(format!(
                "{name}: sensitivity_gain must be positive, got {}",
                self.sensitivity_gain
            )));
        }
        Ok(())
    }
}

/// Finger extension configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtensionConfig {
    /// Coefficients shared by every finger
    pub fingers: ExtensionCoefficients,
    /// Optional thumb-specific override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumb: Option<ExtensionCoefficients>,
}

impl ExtensionConfig {
    /// Coefficients that apply to `finger`.
    pub fn coefficients(&self, finger: Finger) -> ExtensionCoefficients {
        match (finger, self.thumb) {
            (Finger::Thumb, Some(thumb)) => thumb,
            _ => self.fingers,
        }
    }
}

/// Pinch detection configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinchConfig {
    /// Thumb-to-index distance (normalized image units) at which strength reaches 0
    pub distance_threshold: f32,
    /// Maximum number of strength values kept in the history
    pub history_capacity: usize,
}

impl Default for PinchConfig {
    fn default() -> Self {
        Self {
            distance_threshold: 0.05,
            history_capacity: PINCH_HISTORY_SIZE,
        }
    }
}

/// Configuration of the whole analyzer stage.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Finger extension coefficients
    pub extension: ExtensionConfig,
    /// Pinch settings
    pub pinch: PinchConfig,
}

impl AnalyzerConfig {
    /// Check every value is inside its accepted range.
    pub fn validate(&self) -> Result<()> {
        self.extension.fingers.validate("extension.fingers")?;
        if let Some(thumb) = &self.extension.thumb {
            thumb.validate("extension.thumb")?;
        }
        if !(self.pinch.distance_threshold.is_finite() && self.pinch.distance_threshold > 0.0) {
            return Err(CoreError::InvalidConfig(format!(
                "pinch.distance_threshold must be positive, got {}",
                self.pinch.distance_threshold
            )));
        }
        if self.pinch.history_capacity == 0 {
            return Err(CoreError::InvalidConfig(
                "pinch.history_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// How straight each finger is (0.0 = curled, 1.0 = extended).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FingerExtension {
    /// Thumb extension (0.0 - 1.0)
    pub thumb: f32,
    /// Index finger extension (0.0 - 1.0)
    pub index: f32,
    /// Middle finger extension (0.0 - 1.0)
    pub middle: f32,
    /// Ring finger extension (0.0 - 1.0)
    pub ring: f32,
    /// Pinky extension (0.0 - 1.0)
    pub pinky: f32,
}

impl FingerExtension {
    /// Same value for every finger.
    pub fn uniform(value: f32) -> Self {
        Self {
            thumb: value,
            index: value,
            middle: value,
            ring: value,
            pinky: value,
        }
    }

    /// Values in anatomical order, thumb first.
    pub fn as_array(&self) -> [f32; 5] {
        [self.thumb, self.index, self.middle, self.ring, self.pinky]
    }
}

/// Palm orientation estimated from the palm-plane normal.
///
/// This is a simplified, non-quaternion estimate: it is only meaningful for
/// moderate rotations and shows gimbal-like jumps near extreme poses.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HandOrientation {
    /// Heading in degrees (0.0 - 360.0, exclusive)
    pub heading: f32,
    /// Pitch in degrees (-90.0 - 90.0)
    pub pitch: f32,
    /// Roll in degrees (-180.0 - 180.0)
    pub roll: f32,
}

/// Bounded FIFO of recent pinch strengths, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinchHistory {
    values: VecDeque<f32>,
    capacity: usize,
}

impl Default for PinchHistory {
    fn default() -> Self {
        Self::new(PINCH_HISTORY_SIZE)
    }
}

impl PinchHistory {
    /// Create an empty history holding at most `capacity` values
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a value, evicting the oldest ones past capacity.
    pub fn push(&mut self, value: f32) {
        self.values.push_back(value);
        while self.values.len() > self.capacity {
            self.values.pop_front();
        }
    }

    /// Change the capacity, dropping the oldest values if it shrinks.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        while self.values.len() > self.capacity {
            self.values.pop_front();
        }
    }

    /// Maximum number of values kept
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of values currently held
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no value has been recorded
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Most recent value
    pub fn latest(&self) -> Option<f32> {
        self.values.back().copied()
    }

    /// Iterate from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        self.values.iter().copied()
    }

    /// Copy of the values, oldest first
    pub fn to_vec(&self) -> Vec<f32> {
        self.values.iter().copied().collect()
    }

    /// Clear all values, keeping the capacity
    pub fn clear(&mut self) {
        self.values.clear();
    }
}

/// Pinch between thumb tip and index tip.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PinchData {
    /// Pinch strength (0.0 - 1.0, 1.0 = fingertips touching)
    pub strength: f32,
    /// Raw thumb-to-index distance in normalized image units
    pub distance: f32,
    /// Recent strengths including this frame's
    pub history: PinchHistory,
}

/// Everything the analyzer derives from one hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandSignals {
    /// Finger extension ratios
    pub finger_extension: FingerExtension,
    /// Palm orientation
    pub orientation: HandOrientation,
    /// Pinch state
    pub pinch: PinchData,
}

/// Extension ratio of a single finger.
///
/// Measures how far the tip has moved away from the wrist relative to the
/// finger's own base-to-wrist length, which keeps the value roughly
/// independent of hand size and camera distance.
pub fn finger_extension(
    hand: &HandLandmarks,
    finger: Finger,
    coefficients: &ExtensionCoefficients,
) -> f32 {
    let wrist = hand.wrist();
    let tip_to_wrist = distance_3d(hand.point(finger.tip()), wrist);
    let mcp_to_wrist = distance_3d(hand.point(finger.mcp()), wrist);

    let denominator = mcp_to_wrist * coefficients.scale_factor;
    if denominator <= f32::EPSILON {
        return 0.0;
    }

    let ratio = (tip_to_wrist - mcp_to_wrist * coefficients.offset_fraction) / denominator;
    let ratio = finite_or_zero(ratio).clamp(0.0, 1.0);
    finite_or_zero(ratio * coefficients.sensitivity_gain).clamp(0.0, 1.0)
}

/// Extension ratios of all five fingers.
pub fn calculate_finger_extension(
    hand: &HandLandmarks,
    config: &ExtensionConfig,
) -> FingerExtension {
    let [thumb, index, middle, ring, pinky] =
        Finger::ALL.map(|finger| finger_extension(hand, finger, &config.coefficients(finger)));

    FingerExtension {
        thumb,
        index,
        middle,
        ring,
        pinky,
    }
}

/// Palm orientation from the wrist / index-MCP / pinky-MCP plane.
pub fn calculate_orientation(hand: &HandLandmarks) -> HandOrientation {
    // Fixed winding keeps the normal's sign stable between frames
    let normal = calculate_normal(
        hand.wrist(),
        hand.point(LandmarkIndex::IndexMcp),
        hand.point(LandmarkIndex::PinkyMcp),
    )
    .normalize_or_zero();

    if normal == glam::Vec3::ZERO {
        return HandOrientation::default();
    }

    let heading = calculate_heading(normal);
    let pitch = finite_or_zero(normal.y.clamp(-1.0, 1.0).asin().to_degrees());
    let roll = finite_or_zero(normal.x.atan2(normal.z).to_degrees());

    HandOrientation {
        heading,
        pitch: pitch.clamp(-90.0, 90.0),
        roll: roll.clamp(-180.0, 180.0),
    }
}

/// Pinch strength between thumb tip and index tip.
///
/// `previous` is the caller's history from the last frame; the returned
/// [`PinchData`] carries it forward with this frame's strength appended.
pub fn calculate_pinch(
    hand: &HandLandmarks,
    previous: PinchHistory,
    config: &PinchConfig,
) -> PinchData {
    let distance = distance_2d(
        hand.point(LandmarkIndex::ThumbTip),
        hand.point(LandmarkIndex::IndexTip),
    );
    let strength = (1.0 - normalize(distance, 0.0, config.distance_threshold)).clamp(0.0, 1.0);

    let mut history = previous;
    if history.capacity() != config.history_capacity {
        history.set_capacity(config.history_capacity);
    }
    history.push(strength);

    trace!(distance, strength, "pinch");

    PinchData {
        strength,
        distance,
        history,
    }
}

/// Run all three analyzer stages on one hand.
pub fn analyze_hand(
    hand: &HandLandmarks,
    previous: PinchHistory,
    config: &AnalyzerConfig,
) -> HandSignals {
    HandSignals {
        finger_extension: calculate_finger_extension(hand, &config.extension),
        orientation: calculate_orientation(hand),
        pinch: calculate_pinch(hand, previous, &config.pinch),
    }
}
