use handflow_core::{
    process_frame, FrameInput, GestureType, HandLandmarks, Handedness, SessionState,
    TrackingConfig, Vec3,
};
use handflow_io::{read_recording, RecordingWriter, TelemetryWriter};
use tempfile::tempdir;

/// Fist: every fingertip folded back just past halfway to the wrist.
fn fist() -> HandLandmarks {
    let wrist = Vec3::new(0.5, 0.8, 0.0);
    let mcps = [
        Vec3::new(0.36, 0.72, 0.0),
        Vec3::new(0.44, 0.60, 0.0),
        Vec3::new(0.50, 0.58, 0.0),
        Vec3::new(0.55, 0.60, 0.0),
        Vec3::new(0.60, 0.63, 0.0),
    ];
    let mut points = vec![wrist];
    for mcp in mcps {
        let tip = wrist + (mcp - wrist) * 0.55;
        points.extend([mcp, mcp.lerp(tip, 1.0 / 3.0), mcp.lerp(tip, 2.0 / 3.0), tip]);
    }
    points[1] = wrist.lerp(mcps[0], 0.5);
    HandLandmarks::from_points(&points)
        .unwrap()
        .with_handedness(Handedness::Right)
}

#[test]
fn test_recording_to_telemetry() {
    let dir = tempdir().unwrap();
    let recording = dir.path().join("fist.jsonl");
    let telemetry = dir.path().join("fist.telemetry.jsonl");

    let mut writer = RecordingWriter::create(&recording).unwrap();
    for i in 0..5 {
        writer.write_frame(&FrameInput::new(i as f64, vec![fist()])).unwrap();
    }
    writer.finish().unwrap();

    let frames = read_recording(&recording).unwrap();
    assert_eq!(frames.len(), 5);
    assert_eq!(frames[0].hands[0].handedness, Some(Handedness::Right));

    let config = TrackingConfig::default();
    let mut state = SessionState::new(&config);
    let mut out_writer = TelemetryWriter::create(&telemetry, false).unwrap();
    for frame in frames {
        let out = process_frame(&config, frame, state);
        assert_eq!(out.report.hand.as_ref().unwrap().gesture, GestureType::Closed);
        out_writer.write_report(&out.report, &out.state.heatmap).unwrap();
        state = out.state;
    }
    assert_eq!(out_writer.frames(), 5);
    out_writer.finish().unwrap();

    let content = std::fs::read_to_string(&telemetry).unwrap();
    let lines: Vec<serde_json::Value> = content
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0]["gesture_changed"], true);
    assert_eq!(lines[4]["gesture_changed"], false);
    assert_eq!(lines[4]["hand"]["pinch"]["history"]["values"].as_array().unwrap().len(), 5);
}

#[test]
fn test_missing_recording_is_io_error() {
    let dir = tempdir().unwrap();
    let err = read_recording(&dir.path().join("missing.jsonl")).unwrap_err();
    assert!(matches!(err, handflow_io::IoError::Io(_)));
}
