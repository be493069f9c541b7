//! Hand landmark model.
//!
//! A detected hand is 21 points in normalized image space (origin top-left,
//! x/y in `[0, 1]`, z is depth relative to the wrist). Indices follow the
//! usual wrist / CMC / MCP / PIP / DIP / TIP anatomy.

use crate::{CoreError, Result};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Number of landmarks per hand.
pub const LANDMARK_COUNT: usize = 21;

/// Named landmark positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum LandmarkIndex {
    Wrist = 0,
    ThumbCmc = 1,
    ThumbMcp = 2,
    ThumbIp = 3,
    ThumbTip = 4,
    IndexMcp = 5,
    IndexPip = 6,
    IndexDip = 7,
    IndexTip = 8,
    MiddleMcp = 9,
    MiddlePip = 10,
    MiddleDip = 11,
    MiddleTip = 12,
    RingMcp = 13,
    RingPip = 14,
    RingDip = 15,
    RingTip = 16,
    PinkyMcp = 17,
    PinkyPip = 18,
    PinkyDip = 19,
    PinkyTip = 20,
}

impl LandmarkIndex {
    /// Position of this landmark in a hand's point array.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// The five fingers, thumb first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    /// All fingers in anatomical order.
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];

    /// Base knuckle used as the finger's scale reference.
    pub fn mcp(self) -> LandmarkIndex {
        match self {
            Finger::Thumb => LandmarkIndex::ThumbMcp,
            Finger::Index => LandmarkIndex::IndexMcp,
            Finger::Middle => LandmarkIndex::MiddleMcp,
            Finger::Ring => LandmarkIndex::RingMcp,
            Finger::Pinky => LandmarkIndex::PinkyMcp,
        }
    }

    /// Fingertip landmark.
    pub fn tip(self) -> LandmarkIndex {
        match self {
            Finger::Thumb => LandmarkIndex::ThumbTip,
            Finger::Index => LandmarkIndex::IndexTip,
            Finger::Middle => LandmarkIndex::MiddleTip,
            Finger::Ring => LandmarkIndex::RingTip,
            Finger::Pinky => LandmarkIndex::PinkyTip,
        }
    }
}

/// Which hand the detector believes it saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum Handedness {
    Left,
    Right,
}

/// One detected hand: 21 landmarks plus detector metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawHand", into = "RawHand")]
pub struct HandLandmarks {
    points: [Vec3; LANDMARK_COUNT],
    /// Detector handedness, if reported
    pub handedness: Option<Handedness>,
    /// Detector confidence (0.0 - 1.0)
    pub score: f32,
}

impl HandLandmarks {
    /// Build a hand from exactly 21 points.
    ///
    /// Non-finite coordinates are replaced with 0 so that nothing downstream
    /// sees NaN.
    pub fn from_points(points: &[Vec3]) -> Result<Self> {
        let points: [Vec3; LANDMARK_COUNT] =
            points.try_into().map_err(|_| CoreError::LandmarkCount {
                expected: LANDMARK_COUNT,
                found: points.len(),
            })?;

        Ok(Self {
            points: sanitize(points),
            handedness: None,
            score: 1.0,
        })
    }

    /// Attach the detector's handedness label.
    pub fn with_handedness(mut self, handedness: Handedness) -> Self {
        self.handedness = Some(handedness);
        self
    }

    /// Attach the detector's confidence score.
    pub fn with_score(mut self, score: f32) -> Self {
        self.score = if score.is_finite() {
            score.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self
    }

    /// Position of a named landmark.
    pub fn point(&self, index: LandmarkIndex) -> Vec3 {
        self.points[index.index()]
    }

    /// All 21 points in index order.
    pub fn points(&self) -> &[Vec3; LANDMARK_COUNT] {
        &self.points
    }

    /// Wrist position.
    pub fn wrist(&self) -> Vec3 {
        self.point(LandmarkIndex::Wrist)
    }
}

fn sanitize(mut points: [Vec3; LANDMARK_COUNT]) -> [Vec3; LANDMARK_COUNT] {
    let mut replaced = 0usize;
    for point in points.iter_mut() {
        for axis in 0..3 {
            if !point[axis].is_finite() {
                point[axis] = 0.0;
                replaced += 1;
            }
        }
    }
    if replaced > 0 {
        warn!("Replaced {} non-finite landmark coordinates", replaced);
    }
    points
}

/// Wire shape of a hand: a plain list of `[x, y, z]` points.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawHand {
    landmarks: Vec<Vec3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    handedness: Option<Handedness>,
    #[serde(default = "default_score")]
    score: f32,
}

fn default_score() -> f32 {
    1.0
}

impl TryFrom<RawHand> for HandLandmarks {
    type Error = CoreError;

    fn try_from(raw: RawHand) -> Result<Self> {
        let mut hand = HandLandmarks::from_points(&raw.landmarks)?.with_score(raw.score);
        hand.handedness = raw.handedness;
        Ok(hand)
    }
}

impl From<HandLandmarks> for RawHand {
    fn from(hand: HandLandmarks) -> Self {
        Self {
            landmarks: hand.points.to_vec(),
            handedness: hand.handedness,
            score: hand.score,
        }
    }
}
