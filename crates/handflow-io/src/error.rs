//! Error types for HandFlow file operations.

/// Result type alias for IO operations.
pub type Result<T> = std::result::Result<T, IoError>;

/// Error type for config, recording and telemetry files.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Generic I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// RON document could not be parsed
    #[error("RON parse error: {0}")]
    RonParse(#[from] ron::error::SpannedError),

    /// RON document could not be written
    #[error("RON error: {0}")]
    Ron(#[from] ron::Error),

    /// TOML document could not be parsed
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML document could not be written
    #[error("TOML error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// File extension does not name a known format
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// File exceeds the size accepted for its kind
    #[error("File too large: {size} bytes (limit {limit} bytes)")]
    FileTooLarge {
        /// Actual size in bytes
        size: u64,
        /// Accepted maximum in bytes
        limit: u64,
    },

    /// A recording line could not be turned into a frame
    #[error("Recording line {line}: {message}")]
    Recording {
        /// 1-based line number
        line: usize,
        /// What went wrong
        message: String,
    },

    /// Configuration loaded but failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] handflow_core::CoreError),
}

impl IoError {
    /// Creates a recording error for the given line.
    pub fn recording(line: usize, message: impl Into<String>) -> Self {
        Self::Recording {
            line,
            message: message.into(),
        }
    }
}
