//! Frame Orchestrator - per-frame driver
//!
//! [`process_frame`] runs analyzer, classifier and heatmap for one frame of
//! detector output. The only state that outlives a frame (pinch history,
//! heatmap, last gesture) lives in a caller-owned [`SessionState`] that is
//! moved in and handed back, so every session is independent and the whole
//! pipeline can be driven without a session object in tests.

use crate::analyzer::{
    analyze_hand, FingerExtension, HandOrientation, HandSignals, PinchData, PinchHistory,
};
use crate::classifier::{classify_gesture, GestureType};
use crate::config::TrackingConfig;
use crate::heatmap::{Heatmap, HeatmapAccumulator, HeatmapSnapshot};
use crate::landmark::HandLandmarks;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Detector output for one frame.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameInput {
    /// Capture time in milliseconds
    #[serde(default)]
    pub timestamp_ms: f64,
    /// Detected hands; empty when nothing was detected
    #[serde(default)]
    pub hands: Vec<HandLandmarks>,
}

impl FrameInput {
    /// Frame with the given hands
    pub fn new(timestamp_ms: f64, hands: Vec<HandLandmarks>) -> Self {
        Self {
            timestamp_ms,
            hands,
        }
    }

    /// Frame without any detection
    pub fn empty(timestamp_ms: f64) -> Self {
        Self::new(timestamp_ms, Vec::new())
    }
}

/// Everything derived for the primary hand of a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandData {
    /// Source landmarks
    pub landmarks: HandLandmarks,
    /// Finger extension ratios
    pub finger_extension: FingerExtension,
    /// Palm orientation
    pub orientation: HandOrientation,
    /// Pinch state including history
    pub pinch: PinchData,
    /// Recognised gesture
    pub gesture: GestureType,
    /// Detector confidence (0.0 - 1.0)
    pub confidence: f32,
}

/// Cross-frame state owned by one session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState<H = Heatmap> {
    /// Pinch strengths of previous frames
    pub pinch_history: PinchHistory,
    /// Decaying activity map
    pub heatmap: H,
    /// Gesture reported for the previous frame
    pub last_gesture: GestureType,
    /// Frames processed so far
    pub frame_count: u64,
}

impl SessionState<Heatmap> {
    /// Fresh state using the heatmap shape selected in `config`.
    pub fn new(config: &TrackingConfig) -> Self {
        Self::with_heatmap(config, Heatmap::from_config(&config.heatmap))
    }
}

impl<H: HeatmapAccumulator> SessionState<H> {
    /// Fresh state around a caller-supplied heatmap.
    pub fn with_heatmap(config: &TrackingConfig, mut heatmap: H) -> Self {
        heatmap.reset();
        Self {
            pinch_history: PinchHistory::new(config.analyzer.pinch.history_capacity),
            heatmap,
            last_gesture: GestureType::None,
            frame_count: 0,
        }
    }

    /// Start the session over.
    pub fn reset(&mut self) {
        self.pinch_history.clear();
        self.heatmap.reset();
        self.last_gesture = GestureType::None;
        self.frame_count = 0;
    }
}

/// Per-frame telemetry handed to consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    /// Zero-based frame number within the session
    pub frame_index: u64,
    /// Capture time in milliseconds
    pub timestamp_ms: f64,
    /// Number of hands detected
    pub hand_count: usize,
    /// Signals of the primary hand, absent when no hand was detected
    pub hand: Option<HandData>,
    /// Heatmap after this frame
    pub heatmap: HeatmapSnapshot,
    /// Gesture differs from the previous frame's
    pub gesture_changed: bool,
}

/// Result of [`process_frame`]: the report plus the state for the next frame.
#[derive(Debug, Clone)]
pub struct FrameOutput<H = Heatmap> {
    /// Telemetry for this frame
    pub report: FrameReport,
    /// State to pass into the next call
    pub state: SessionState<H>,
}

/// Process one frame.
///
/// Signals are derived for the first hand only; every detected hand feeds
/// the heatmap. A frame without hands still decays the heatmap and leaves the
/// pinch history untouched.
pub fn process_frame<H: HeatmapAccumulator>(
    config: &TrackingConfig,
    frame: FrameInput,
    mut state: SessionState<H>,
) -> FrameOutput<H> {
    let frame_index = state.frame_count;
    state.frame_count += 1;

    state.heatmap.decay();
    for hand in &frame.hands {
        state
            .heatmap
            .deposit_hand(hand, config.heatmap.deposit_intensity);
    }

    let hand_count = frame.hands.len();
    let hand = frame.hands.into_iter().next().map(|landmarks| {
        let previous = std::mem::take(&mut state.pinch_history);
        let HandSignals {
            finger_extension,
            orientation,
            pinch,
        } = analyze_hand(&landmarks, previous, &config.analyzer);
        let gesture = classify_gesture(&landmarks, &finger_extension, &pinch, &config.gestures);

        state.pinch_history = pinch.history.clone();

        HandData {
            confidence: landmarks.score,
            landmarks,
            finger_extension,
            orientation,
            pinch,
            gesture,
        }
    });

    let gesture = hand.as_ref().map_or(GestureType::None, |h| h.gesture);
    let gesture_changed = gesture != state.last_gesture;
    if gesture_changed {
        debug!(
            frame = frame_index,
            "Gesture changed: {} -> {}", state.last_gesture, gesture
        );
    }
    state.last_gesture = gesture;

    let heatmap = state.heatmap.snapshot(false);
    trace!(
        frame = frame_index,
        hands = hand_count,
        active_cells = heatmap.active_cells,
        "frame processed"
    );

    FrameOutput {
        report: FrameReport {
            frame_index,
            timestamp_ms: frame.timestamp_ms,
            hand_count,
            hand,
            heatmap,
            gesture_changed,
        },
        state,
    }
}
