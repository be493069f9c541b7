//! Telemetry output: one [`FrameReport`] per JSON line.

use crate::error::Result;
use handflow_core::{FrameReport, HeatmapAccumulator};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Streams frame reports to a writer.
pub struct TelemetryWriter<W: Write> {
    writer: W,
    include_cells: bool,
    frames: usize,
}

impl TelemetryWriter<BufWriter<File>> {
    /// Create (or truncate) a telemetry file.
    pub fn create(path: &Path, include_cells: bool) -> Result<Self> {
        debug!("Writing telemetry to {}", path.display());
        Ok(Self::new(BufWriter::new(File::create(path)?), include_cells))
    }
}

impl<W: Write> TelemetryWriter<W> {
    /// Wrap any writer. With `include_cells`, every line carries the full
    /// heatmap intensities.
    pub fn new(writer: W, include_cells: bool) -> Self {
        Self {
            writer,
            include_cells,
            frames: 0,
        }
    }

    /// Append one report. `heatmap` is the state the report was taken from.
    pub fn write_report<H: HeatmapAccumulator>(
        &mut self,
        report: &FrameReport,
        heatmap: &H,
    ) -> Result<()> {
        if self.include_cells {
            let mut report = report.clone();
            report.heatmap = heatmap.snapshot(true);
            serde_json::to_writer(&mut self.writer, &report)?;
        } else {
            serde_json::to_writer(&mut self.writer, report)?;
        }
        self.writer.write_all(b"\n")?;
        self.frames += 1;
        Ok(())
    }

    /// Reports written so far
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
    use handflow_core::{process_frame, FrameInput, SessionState, TrackingConfig};

    fn run_empty_frames(include_cells: bool) -> Vec<serde_json::Value> {
        let config = TrackingConfig::default();
        let mut state = SessionState::new(&config);
        let mut writer = TelemetryWriter::new(Vec::new(), include_cells);

        for i in 0..3 {
            let out = process_frame(&config, FrameInput::empty(i as f64 * 10.0), state);
            writer.write_report(&out.report, &out.state.heatmap).unwrap();
            state = out.state;
        }
        assert_eq!(writer.frames(), 3);

        let bytes = writer.finish().unwrap();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_one_line_per_report() {
        let lines = run_empty_frames(false);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2]["frame_index"], 2);
        assert_eq!(lines[2]["timestamp_ms"], 20.0);
        assert!(lines[0]["hand"].is_null());
        assert!(lines[0]["heatmap"].get("cells").is_none());
    }

    #[test]
    fn test_cells_included_on_request() {
        let lines = run_empty_frames(true);
        let cells = lines[0]["heatmap"]["cells"].as_array().unwrap();
        assert_eq!(cells.len(), 5);
        assert!(cells.iter().all(|row| row.as_array().unwrap().len() == 5));
    }
}
