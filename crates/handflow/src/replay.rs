//! Replay driver: recording in, telemetry and a summary out.

use anyhow::{Context, Result};
use handflow_core::{process_frame, GestureType, SessionState, TrackingConfig};
use handflow_io::{open_recording, RecordingReader, TelemetryWriter};
use std::collections::HashMap;
use std::fmt;
use std::io::{BufRead, Write};
use std::path::Path;
use tracing::{debug, info};

/// Totals gathered over one replay.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplaySummary {
    /// Frames processed
    pub frames: u64,
    /// Frames with at least one detected hand
    pub frames_with_hand: u64,
    /// Gesture changes seen
    pub gesture_changes: u64,
    /// Recording lines skipped as unparseable
    pub skipped_lines: usize,
    /// Hands dropped for a malformed landmark list
    pub dropped_hands: usize,
    gestures: HashMap<GestureType, u64>,
}

impl ReplaySummary {
    /// Frames classified as `gesture`
    pub fn count(&self, gesture: GestureType) -> u64 {
        self.gestures.get(&gesture).copied().unwrap_or(0)
    }

    /// Non-zero gesture counts in rule priority order
    pub fn histogram(&self) -> Vec<(GestureType, u64)> {
        GestureType::ALL
            .into_iter()
            .map(|gesture| (gesture, self.count(gesture)))
            .filter(|&(_, count)| count > 0)
            .collect()
    }
}

impl fmt::Display for ReplaySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Frames:           {}", self.frames)?;
        writeln!(f, "Frames with hand: {}", self.frames_with_hand)?;
        writeln!(f, "Gesture changes:  {}", self.gesture_changes)?;
        if self.skipped_lines > 0 || self.dropped_hands > 0 {
            writeln!(f, "Skipped lines:    {}", self.skipped_lines)?;
            writeln!(f, "Dropped hands:    {}", self.dropped_hands)?;
        }
        writeln!(f, "Gestures:")?;
        for (gesture, count) in self.histogram() {
            writeln!(f, "  {:<12} {}", gesture.as_str(), count)?;
        }
        Ok(())
    }
}

/// Run every frame of a recording through a fresh session.
pub fn replay_frames<R, W>(
    config: &TrackingConfig,
    reader: &mut RecordingReader<R>,
    mut telemetry: Option<&mut TelemetryWriter<W>>,
) -> Result<ReplaySummary>
where
    R: BufRead,
    W: Write,
{
    let mut state = SessionState::new(config);
    let mut summary = ReplaySummary::default();

    while let Some(frame) = reader.next_frame().context("Failed to read recording")? {
        let out = process_frame(config, frame, state);

        summary.frames += 1;
        if let Some(hand) = &out.report.hand {
            summary.frames_with_hand += 1;
            *summary.gestures.entry(hand.gesture).or_default() += 1;
        }
        if out.report.gesture_changed {
            summary.gesture_changes += 1;
        }

        if let Some(writer) = telemetry.as_deref_mut() {
            writer
                .write_report(&out.report, &out.state.heatmap)
                .context("Failed to write telemetry")?;
        }
        state = out.state;
    }

    summary.skipped_lines = reader.skipped_lines();
    summary.dropped_hands = reader.dropped_hands();
    debug!(
        lines = reader.line(),
        frames = summary.frames,
        with_hand = summary.frames_with_hand,
        "Replay finished"
    );
    Ok(summary)
}

/// Replay a recording file, optionally writing telemetry to `output`.
pub fn replay_file(
    config: &TrackingConfig,
    recording: &Path,
    output: Option<&Path>,
    with_cells: bool,
) -> Result<ReplaySummary> {
    let mut reader = open_recording(recording)
        .with_context(|| format!("Failed to open recording: {}", recording.display()))?;
    info!("Replaying {}", recording.display());

    match output {
        Some(path) => {
            let mut writer = TelemetryWriter::create(path, with_cells).with_context(|| {
                format!("Failed to create telemetry file: {}", path.display())
            })?;
            let summary = replay_frames(config, &mut reader, Some(&mut writer))?;
            writer.finish().context("Failed to flush telemetry")?;
            info!("Wrote {} reports to {}", summary.frames, path.display());
            Ok(summary)
        }
        None => replay_frames::<_, std::io::Sink>(config, &mut reader, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use handflow_core::{FrameInput, HandLandmarks, Vec3};
    use handflow_io::RecordingWriter;
    use std::io::Cursor;

    fn flat_hand() -> HandLandmarks {
        let points: Vec<Vec3> = (0..21)
            .map(|i| Vec3::new(0.5, 0.4 + i as f32 * 0.01, 0.0))
            .collect();
        HandLandmarks::from_points(&points).unwrap()
    }

    fn recording(frames: &[FrameInput]) -> Vec<u8> {
        let mut writer = RecordingWriter::new(Vec::new());
        for frame in frames {
            writer.write_frame(frame).unwrap();
        }
        writer.finish().unwrap()
    }

    fn replay(bytes: Vec<u8>) -> Result<ReplaySummary> {
        let mut reader = RecordingReader::new(Cursor::new(bytes));
        replay_frames::<_, std::io::Sink>(&TrackingConfig::default(), &mut reader, None)
    }

    #[test]
    fn test_summary_counts() {
        let bytes = recording(&[
            FrameInput::new(0.0, vec![flat_hand()]),
            FrameInput::empty(33.0),
            FrameInput::new(66.0, vec![flat_hand()]),
        ]);

        let summary = replay(bytes).unwrap();
        assert_eq!(summary.frames, 3);
        assert_eq!(summary.frames_with_hand, 2);
        let total: u64 = summary.histogram().iter().map(|(_, n)| n).sum();
        assert_eq!(total, 2);
        assert_eq!(summary.skipped_lines, 0);
    }

    #[test]
    fn test_malformed_input_is_counted_not_fatal() {
        let mut bytes = recording(&[FrameInput::new(0.0, vec![flat_hand()])]);
        bytes.extend_from_slice(b"{oops\n");
        bytes.extend_from_slice(b"{\"timestamp_ms\": 66.0, \"hands\": [{\"landmarks\": []}]}\n");
        bytes.extend(recording(&[FrameInput::new(99.0, vec![flat_hand()])]));

        let summary = replay(bytes).unwrap();
        assert_eq!(summary.frames, 3);
        assert_eq!(summary.frames_with_hand, 2);
        assert_eq!(summary.skipped_lines, 1);
        assert_eq!(summary.dropped_hands, 1);
        assert!(summary.to_string().contains("Skipped lines:    1"));
    }

    #[test]
    fn test_unreadable_line_stops_replay() {
        let mut bytes = recording(&[FrameInput::empty(0.0)]);
        bytes.extend_from_slice(&[0xff, 0xfe, b'\n']);

        let err = replay(bytes).unwrap_err();
        assert!(format!("{err:#}").contains("Recording line 2"));
    }

    #[test]
    fn test_summary_display_lists_gestures() {
        let mut summary = ReplaySummary {
            frames: 4,
            frames_with_hand: 3,
            ..Default::default()
        };
        summary.gestures.insert(GestureType::Open, 2);
        summary.gestures.insert(GestureType::Pinch, 1);

        let text = summary.to_string();
        assert!(text.contains("Frames:           4"));
        let pinch = text.find("PINCH").unwrap();
        let open = text.find("OPEN").unwrap();
        assert!(pinch < open);
        assert!(!text.contains("VICTORY"));
        assert!(!text.contains("Skipped"));
    }
}
