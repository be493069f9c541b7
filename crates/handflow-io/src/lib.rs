//! HandFlow IO - files in and out of the tracking pipeline
//!
//! - Configuration documents in TOML, RON or JSON, picked by file extension
//! - Landmark recordings (JSON Lines, one frame per line)
//! - Telemetry output (JSON Lines, one frame report per line)

#![warn(missing_docs)]

pub mod config_format;
pub mod error;
pub mod recording;
pub mod telemetry;

pub use config_format::{load_config, save_config, ConfigFormat, MAX_CONFIG_FILE_SIZE};
pub use error::{IoError, Result};
pub use recording::{
    open_recording, read_recording, RecordingReader, RecordingWriter, MAX_RECORDING_FILE_SIZE,
};
pub use telemetry::TelemetryWriter;
