//! On-disk configuration documents.
//!
//! A config file holds a [`HandflowConfig`]; its format is chosen by the file
//! extension. Missing sections fall back to their defaults, and a loaded
//! document is validated before it is handed out.

use crate::error::{IoError, Result};
use handflow_core::HandflowConfig;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Maximum accepted config file size (1 MB).
pub const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

/// Serialization format of a config document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.toml`
    Toml,
    /// `.ron`
    Ron,
    /// `.json`
    Json,
}

impl ConfigFormat {
    /// Pick the format from a path's extension. Paths without one are TOML.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("toml");

        match extension.to_ascii_lowercase().as_str() {
            "toml" => Ok(Self::Toml),
            "ron" => Ok(Self::Ron),
            "json" => Ok(Self::Json),
            _ => Err(IoError::UnsupportedFormat(extension.to_string())),
        }
    }

    /// Parse a document in this format.
    pub fn parse(self, content: &str) -> Result<HandflowConfig> {
        let config = match self {
            Self::Toml => toml::from_str(content)?,
            Self::Ron => ron::from_str(content)?,
            Self::Json => serde_json::from_str(content)?,
        };
        Ok(config)
    }

    /// Render a document in this format.
    pub fn render(self, config: &HandflowConfig) -> Result<String> {
        let content = match self {
            Self::Toml => toml::to_string_pretty(config)?,
            Self::Ron => ron::ser::to_string_pretty(config, ron::ser::PrettyConfig::default())?,
            Self::Json => serde_json::to_string_pretty(config)?,
        };
        Ok(content)
    }
}

/// Load and validate a config file.
pub fn load_config(path: &Path) -> Result<HandflowConfig> {
    load_config_with_limit(path, MAX_CONFIG_FILE_SIZE)
}

fn load_config_with_limit(path: &Path, limit: u64) -> Result<HandflowConfig> {
    let format = ConfigFormat::from_path(path)?;

    let size = fs::metadata(path)?.len();
    if size > limit {
        return Err(IoError::FileTooLarge { size, limit });
    }

    let content = fs::read_to_string(path)?;
    let config = format.parse(&content)?;
    config.tracking.validate()?;

    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Write a config file, creating parent directories as needed.
pub fn save_config(config: &HandflowConfig, path: &Path) -> Result<()> {
    let format = ConfigFormat::from_path(path)?;
    let content = format.render(config)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;

    debug!("Saved {:?} configuration to {}", format, path.display());
    Ok(())
}
