//! Landmark recordings in JSON Lines form.
//!
//! Each non-empty line holds one frame:
//!
//! ```json
//! {"timestamp_ms": 33.3, "hands": [{"landmarks": [[0.5, 0.8, 0.0], ...], "handedness": "Right", "score": 0.97}]}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. Recordings are read
//! leniently: a line that is not a frame is skipped and a hand that is not
//! exactly 21 points is dropped from its frame, each with a warning naming
//! the 1-based line number. Only unreadable input (I/O failure, invalid
//! UTF-8) is an error.

use crate::error::{IoError, Result};
use handflow_core::{FrameInput, HandLandmarks};
use serde::Deserialize;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::Path;
use tracing::{debug, info, warn};

/// Maximum accepted recording size (256 MB).
pub const MAX_RECORDING_FILE_SIZE: u64 = 256 * 1024 * 1024;

/// One recorded line before its hands are checked.
#[derive(Deserialize)]
struct RecordedFrame {
    #[serde(default)]
    timestamp_ms: f64,
    #[serde(default)]
    hands: Vec<serde_json::Value>,
}

/// Streaming reader yielding one [`FrameInput`] per recorded line.
pub struct RecordingReader<R> {
    reader: R,
    line: usize,
    buffer: String,
    skipped_lines: usize,
    dropped_hands: usize,
}

impl<R: BufRead> RecordingReader<R> {
    /// Wrap any buffered reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buffer: String::new(),
            skipped_lines: 0,
            dropped_hands: 0,
        }
    }

    /// Number of lines consumed so far
    pub fn line(&self) -> usize {
        self.line
    }

    /// Lines that could not be parsed as a frame
    pub fn skipped_lines(&self) -> usize {
        self.skipped_lines
    }

    /// Hands dropped for a malformed landmark list
    pub fn dropped_hands(&self) -> usize {
        self.dropped_hands
    }

    /// Read the next frame, or `None` at end of input.
    pub fn next_frame(&mut self) -> Result<Option<FrameInput>> {
        loop {
            self.buffer.clear();
            let read = match self.reader.read_line(&mut self.buffer) {
                Ok(read) => read,
                Err(e) if e.kind() == ErrorKind::InvalidData => {
                    self.line += 1;
                    return Err(IoError::recording(self.line, e.to_string()));
                }
                Err(e) => return Err(e.into()),
            };
            if read == 0 {
                return Ok(None);
            }
            self.line += 1;

            let content = self.buffer.trim();
            if content.is_empty() || content.starts_with('#') {
                continue;
            }

            let recorded: RecordedFrame = match serde_json::from_str(content) {
                Ok(recorded) => recorded,
                Err(e) => {
                    warn!("Skipping recording line {}: {}", self.line, e);
                    self.skipped_lines += 1;
                    continue;
                }
            };
            return Ok(Some(self.collect_hands(recorded)));
        }
    }

    fn collect_hands(&mut self, recorded: RecordedFrame) -> FrameInput {
        let mut hands = Vec::with_capacity(recorded.hands.len());
        for (slot, value) in recorded.hands.into_iter().enumerate() {
            match serde_json::from_value::<HandLandmarks>(value) {
                Ok(hand) => hands.push(hand),
                Err(e) => {
                    warn!(
                        "Dropping hand {} on recording line {}: {}",
                        slot, self.line, e
                    );
                    self.dropped_hands += 1;
                }
            }
        }
        FrameInput::new(recorded.timestamp_ms, hands)
    }
}

impl<R: BufRead> Iterator for RecordingReader<R> {
    type Item = Result<FrameInput>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_frame().transpose()
    }
}

/// Open a recording file for streaming.
pub fn open_recording(path: &Path) -> Result<RecordingReader<BufReader<File>>> {
    open_recording_with_limit(path, MAX_RECORDING_FILE_SIZE)
}

fn open_recording_with_limit(
    path: &Path,
    limit: u64,
) -> Result<RecordingReader<BufReader<File>>> {
    let size = fs::metadata(path)?.len();
    if size > limit {
        return Err(IoError::FileTooLarge { size, limit });
    }

    debug!("Opening recording {} ({} bytes)", path.display(), size);
    Ok(RecordingReader::new(BufReader::new(File::open(path)?)))
}

/// Read a whole recording into memory.
pub fn read_recording(path: &Path) -> Result<Vec<FrameInput>> {
    let frames = open_recording(path)?.collect::<Result<Vec<_>>>()?;
    info!("Read {} frames from {}", frames.len(), path.display());
    Ok(frames)
}

/// Writes frames in the format [`RecordingReader`] reads.
pub struct RecordingWriter<W: Write> {
    writer: W,
    frames: usize,
}

impl RecordingWriter<BufWriter<File>> {
    /// Create (or truncate) a recording file.
    pub fn create(path: &Path) -> Result<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> RecordingWriter<W> {
    /// Wrap any writer.
    pub fn new(writer: W) -> Self {
        Self { writer, frames: 0 }
    }

    /// Append one frame as a single line.
    pub fn write_frame(&mut self, frame: &FrameInput) -> Result<()> {
        serde_json::to_writer(&mut self.writer, frame)?;
        self.writer.write_all(b"\n")?;
        self.frames += 1;
        Ok(())
    }

    /// Frames written so far
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Flush and hand back the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use handflow_core::{HandLandmarks, Handedness, Vec3};
    use std::io::Cursor;

    fn hand_json(x: f32) -> String {
        let points: Vec<String> = (0..21)
            .map(|i| format!("[{x}, {}, 0.0]", i as f32 * 0.01))
            .collect();
        format!("{{\"landmarks\": [{}]}}", points.join(", "))
    }

    #[test]
    fn test_reads_frames_and_skips_comments() {
        let input = format!(
            "# captured by test\n\n{{\"timestamp_ms\": 0.0, \"hands\": [{}]}}\n{{\"timestamp_ms\": 33.0, \"hands\": []}}\n",
            hand_json(0.5)
        );
        let frames: Vec<FrameInput> = RecordingReader::new(Cursor::new(input))
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].hands.len(), 1);
        assert_eq!(frames[0].hands[0].score, 1.0);
        assert_eq!(frames[0].hands[0].handedness, None);
        assert_eq!(frames[1].timestamp_ms, 33.0);
        assert!(frames[1].hands.is_empty());
    }

    #[test]
    fn test_unparseable_line_is_skipped() {
        let input = "# header\n{\"timestamp_ms\": 0.0, \"hands\": []}\nnot json\n{\"timestamp_ms\": 66.0}\n";
        let mut reader = RecordingReader::new(Cursor::new(input));

        let frames: Vec<FrameInput> = reader.by_ref().collect::<Result<_>>().unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].timestamp_ms, 66.0);
        assert_eq!(reader.skipped_lines(), 1);
        assert_eq!(reader.line(), 4);
    }

    #[test]
    fn test_short_hand_is_dropped_from_its_frame() {
        let short: Vec<String> = (0..20).map(|_| "[0.1, 0.2, 0.3]".to_string()).collect();
        let input = format!(
            "{{\"timestamp_ms\": 0.0, \"hands\": [{{\"landmarks\": [{}]}}, {}]}}\n{{\"timestamp_ms\": 33.0, \"hands\": [{}]}}\n",
            short.join(", "),
            hand_json(0.4),
            hand_json(0.6)
        );
        let mut reader = RecordingReader::new(Cursor::new(input));

        let frames: Vec<FrameInput> = reader.by_ref().collect::<Result<_>>().unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].hands.len(), 1);
        assert_eq!(frames[0].hands[0].wrist().x, 0.4);
        assert_eq!(frames[1].hands.len(), 1);
        assert_eq!(reader.dropped_hands(), 1);
        assert_eq!(reader.skipped_lines(), 0);
    }

    #[test]
    fn test_frame_with_only_bad_hands_is_empty() {
        let input = "{\"timestamp_ms\": 5.0, \"hands\": [{\"landmarks\": [[0.1, 0.2, 0.3]]}, 7]}\n";
        let mut reader = RecordingReader::new(Cursor::new(input));

        let frame = reader.next_frame().unwrap().unwrap();
        assert_eq!(frame, FrameInput::empty(5.0));
        assert_eq!(reader.dropped_hands(), 2);
    }

    #[test]
    fn test_invalid_utf8_reports_line() {
        let mut input = b"{\"timestamp_ms\": 0.0, \"hands\": []}\n".to_vec();
        input.extend_from_slice(&[0xff, 0xfe, b'\n']);
        let mut reader = RecordingReader::new(Cursor::new(input));

        assert!(reader.next_frame().unwrap().is_some());
        match reader.next_frame() {
            Err(IoError::Recording { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected recording error, got {other:?}"),
        }
    }

    #[test]
    fn test_writer_output_reads_back() {
        let points: Vec<Vec3> = (0..21).map(|i| Vec3::new(0.5, i as f32 * 0.02, 0.0)).collect();
        let hand = HandLandmarks::from_points(&points)
            .unwrap()
            .with_handedness(Handedness::Left)
            .with_score(0.9);
        let frame = FrameInput::new(16.5, vec![hand]);

        let mut writer = RecordingWriter::new(Vec::new());
        writer.write_frame(&frame).unwrap();
        writer.write_frame(&FrameInput::empty(33.0)).unwrap();
        assert_eq!(writer.frames(), 2);
        let bytes = writer.finish().unwrap();

        let frames: Vec<FrameInput> = RecordingReader::new(Cursor::new(bytes))
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(frames, vec![frame, FrameInput::empty(33.0)]);
    }

    #[test]
    fn test_open_recording_too_large() {
        let file = tempfile::NamedTempFile::new().unwrap();
        fs::write(file.path(), vec![b'\n'; 1024]).unwrap();

        let result = open_recording_with_limit(file.path(), 500);
        assert!(matches!(
            result,
            Err(IoError::FileTooLarge {
                size: 1024,
                limit: 500
            })
        ));
    }
}
