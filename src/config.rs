//! Decoder configuration

use crate::column::ColumnTyping;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration text is not valid YAML for this shape
    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A value is out of range
    #[error("Invalid configuration value: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Response decoding configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WireConfig {
    /// Bytes held in memory before the rest of a body spills to disk (None = never spill)
    pub spill_threshold: Option<usize>,
    /// Directory for spill files (None = system temp dir)
    pub spill_dir: Option<PathBuf>,
    /// Read size used by the background drain
    pub drain_buffer_size: usize,
    /// Maximum rows returned per response (None = unbounded)
    pub max_rows: Option<usize>,
    /// How column types are reported
    pub column_typing: ColumnTyping,
}

impl Default for WireConfig {
    fn default() -> Self {
        Self {
            spill_threshold: Some(4 * 1024 * 1024),
            spill_dir: None,
            drain_buffer_size: 64 * 1024,
            max_rows: None,
            column_typing: ColumnTyping::Detected,
        }
    }
}

impl WireConfig {
    pub fn from_yaml_str(text: &str) -> ConfigResult<Self> {
        let config: WireConfig = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.drain_buffer_size == 0 {
            return Err(ConfigError::Invalid(
                "drain_buffer_size must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn with_spill_threshold(mut self, threshold: Option<usize>) -> Self {
        self.spill_threshold = threshold;
        self
    }

    pub fn with_max_rows(mut self, max_rows: Option<usize>) -> Self {
        self.max_rows = max_rows;
        self
    }

    pub fn with_column_typing(mut self, typing: ColumnTyping) -> Self {
        self.column_typing = typing;
        self
    }
}
