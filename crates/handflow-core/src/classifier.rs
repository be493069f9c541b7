//! Gesture classification.
//!
//! Maps the analyzer's signals to a single [`GestureType`] per frame. Rules
//! are evaluated in a fixed priority order and the first match wins: pinch
//! is the most deliberate signal and would otherwise be hidden by low
//! extension readings, and the thumb gestures depend on an angle feature the
//! generic extension patterns ignore.

use crate::analyzer::{FingerExtension, PinchData};
use crate::geometry::angle_between_points;
use crate::landmark::{HandLandmarks, LandmarkIndex};
use crate::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

/// Discrete gesture recognised in a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GestureType {
    /// All fingers extended
    Open,
    /// All fingers curled (fist)
    Closed,
    /// Thumb tip and index tip together
    Pinch,
    /// Thumb extended upwards, index and middle curled
    ThumbsUp,
    /// Thumb extended downwards, index and middle curled
    ThumbsDown,
    /// Only the index finger extended
    Point,
    /// Index and middle extended, the rest curled
    Victory,
    /// No rule matched
    #[default]
    None,
}

impl GestureType {
    /// Every gesture, in rule priority order.
    pub const ALL: [GestureType; 8] = [
        GestureType::Pinch,
        GestureType::ThumbsUp,
        GestureType::ThumbsDown,
        GestureType::Point,
        GestureType::Victory,
        GestureType::Open,
        GestureType::Closed,
        GestureType::None,
    ];

    /// Display label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Closed => "CLOSED",
            Self::Pinch => "PINCH",
            Self::ThumbsUp => "THUMBS_UP",
            Self::ThumbsDown => "THUMBS_DOWN",
            Self::Point => "POINT",
            Self::Victory => "VICTORY",
            Self::None => "NONE",
        }
    }
}

impl fmt::Display for GestureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Thresholds used by the classification rules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureThresholds {
    /// Pinch strength above which the frame is a pinch
    pub pinch_strength: f32,
    /// Signed thumb angle (degrees) above which the thumb points up
    pub thumb_up_angle: f32,
    /// Signed thumb angle (degrees) below which the thumb points down
    pub thumb_down_angle: f32,
    /// Thumb extension required for the thumb gestures
    pub thumb_extended: f32,
    /// Thumb extension required for OPEN
    pub thumb_open: f32,
    /// Thumb extension VICTORY must stay below
    pub victory_thumb_max: f32,
    /// Extension above which a non-thumb finger counts as extended
    pub finger_extended: f32,
    /// Extension below which any finger counts as curled
    pub finger_curled: f32,
}

impl Default for GestureThresholds {
    fn default() -> Self {
        Self {
            pinch_strength: 0.5,
            thumb_up_angle: 45.0,
            thumb_down_angle: -45.0,
            thumb_extended: 0.8,
            thumb_open: 0.5,
            victory_thumb_max: 0.5,
            finger_extended: 0.7,
            finger_curled: 0.3,
        }
    }
}

impl GestureThresholds {
    /// Check every value is inside its accepted range.
    pub fn validate(&self) -> Result<()> {
        let ratios = [
            ("pinch_strength", self.pinch_strength),
            ("thumb_extended", self.thumb_extended),
            ("thumb_open", self.thumb_open),
            ("victory_thumb_max", self.victory_thumb_max),
            ("finger_extended", self.finger_extended),
            ("finger_curled", self.finger_curled),
        ];
        for (name, value) in ratios {
            if !(0.0..=1.0).contains(&value) {
                return Err(CoreError::InvalidConfig(format!(
                    "gestures.{name} must be within [0, 1], got {value}"
                )));
            }
        }
        for (name, value) in [
            ("thumb_up_angle", self.thumb_up_angle),
            ("thumb_down_angle", self.thumb_down_angle),
        ] {
            if !(-180.0..=180.0).contains(&value) {
                return Err(CoreError::InvalidConfig(format!(
                    "gestures.{name} must be within [-180, 180], got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Signed angle at the wrist between the middle MCP and the thumb tip.
///
/// The magnitude is the unsigned angle in `[0, 180]`. It is positive when the
/// thumb tip sits above the wrist in the image (smaller y) and negative when
/// it sits below, so a thumbs-down pose yields a negative angle.
pub fn thumb_angle(hand: &HandLandmarks) -> f32 {
    let wrist = hand.wrist();
    let thumb_tip = hand.point(LandmarkIndex::ThumbTip);
    let angle = angle_between_points(hand.point(LandmarkIndex::MiddleMcp), wrist, thumb_tip);

    if thumb_tip.y <= wrist.y {
        angle
    } else {
        -angle
    }
}

/// Classify one frame.
pub fn classify_gesture(
    hand: &HandLandmarks,
    extension: &FingerExtension,
    pinch: &PinchData,
    thresholds: &GestureThresholds,
) -> GestureType {
    let gesture = classify_signals(thumb_angle(hand), extension, pinch.strength, thresholds);
    trace!(%gesture, strength = pinch.strength, "classified");
    gesture
}

/// Rule table over already derived values.
fn classify_signals(
    thumb_angle: f32,
    ext: &FingerExtension,
    pinch_strength: f32,
    t: &GestureThresholds,
) -> GestureType {
    let extended = |value: f32| value > t.finger_extended;
    let curled = |value: f32| value < t.finger_curled;

    if pinch_strength > t.pinch_strength {
        return GestureType::Pinch;
    }

    let thumb_only = ext.thumb > t.thumb_extended && curled(ext.index) && curled(ext.middle);
    if thumb_only && thumb_angle > t.thumb_up_angle {
        return GestureType::ThumbsUp;
    }
    if thumb_only && thumb_angle < t.thumb_down_angle {
        return GestureType::ThumbsDown;
    }

    if extended(ext.index) && curled(ext.middle) && curled(ext.ring) && curled(ext.pinky) {
        return GestureType::Point;
    }

    if extended(ext.index)
        && extended(ext.middle)
        && curled(ext.ring)
        && curled(ext.pinky)
        && ext.thumb < t.victory_thumb_max
    {
        return GestureType::Victory;
    }

    if ext.thumb > t.thumb_open
        && extended(ext.index)
        && extended(ext.middle)
        && extended(ext.ring)
        && extended(ext.pinky)
    {
        return GestureType::Open;
    }

    if ext.as_array().into_iter().all(curled) {
        return GestureType::Closed;
    }

    GestureType::None
}
