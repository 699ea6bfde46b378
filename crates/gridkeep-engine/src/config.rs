//! User configuration.
//!
//! Stored as pretty-printed JSON. Missing keys take their defaults, unknown
//! keys are ignored on load and dropped on the next save, and a missing file
//! simply yields [`Config::default`].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Smallest accepted console dimension, in cells.
pub const MIN_CONSOLE_SIZE: usize = 10;

/// Largest accepted console dimension, in cells.
pub const MAX_CONSOLE_SIZE: usize = 1000;

/// Default config file path.
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Environment variable overriding [`DEFAULT_CONFIG_PATH`].
pub const CONFIG_PATH_ENV: &str = "GRIDKEEP_CONFIG";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors from loading or saving the config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to access config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode config: {0}")]
    Encode(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Console size settings. Changes take effect on the next start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub columns: usize,
    pub rows: usize,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            columns: 80,
            rows: 50,
        }
    }
}

impl ConsoleConfig {
    /// `(columns, rows)`.
    pub fn size(&self) -> (usize, usize) {
        (self.columns, self.rows)
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub console: ConsoleConfig,
}

impl Config {
    /// The config path, honouring [`CONFIG_PATH_ENV`].
    pub fn default_path() -> PathBuf {
        std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    /// Parse a config from JSON text, clamping values into
    /// `[MIN_CONSOLE_SIZE, MAX_CONSOLE_SIZE]`.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let mut config: Config = serde_json::from_str(text)?;
        config.clamp();
        Ok(config)
    }

    /// Load the config at `path`; a missing file gives the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file exists but cannot be read or is
    /// not valid JSON for this schema.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_owned(),
                    source,
                })
            }
        };
        let config = Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })?;
        tracing::debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }

    /// Write the config to `path` as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let mut text = serde_json::to_string_pretty(self)?;
        text.push('\n');
        fs::write(path, text).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })
    }

    fn clamp(&mut self) {
        self.console.columns = clamp_size(self.console.columns);
        self.console.rows = clamp_size(self.console.rows);
    }
}

// ---------------------------------------------------------------------------
// Setting
// ---------------------------------------------------------------------------

/// A single editable config value, as exposed by the options menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Setting {
    Columns,
    Rows,
}

impl Setting {
    pub fn label(self) -> &'static str {
        match self {
            Setting::Columns => "Columns",
            Setting::Rows => "Rows",
        }
    }

    pub fn get(self, config: &Config) -> usize {
        match self {
            Setting::Columns => config.console.columns,
            Setting::Rows => config.console.rows,
        }
    }

    /// Store `value`, clamped to `[MIN_CONSOLE_SIZE, MAX_CONSOLE_SIZE]`.
    pub fn set(self, config: &mut Config, value: usize) {
        let value = clamp_size(value);
        match self {
            Setting::Columns => config.console.columns = value,
            Setting::Rows => config.console.rows = value,
        }
    }

    /// Parse `text` as a number and store it. Returns `false`, leaving the
    /// config unchanged, when `text` is not a non-negative integer.
    pub fn set_from_text(self, config: &mut Config, text: &str) -> bool {
        match text.trim().parse::<usize>() {
            Ok(value) => {
                self.set(config, value);
                true
            }
            Err(_) => false,
        }
    }
}

fn clamp_size(value: usize) -> usize {
    value.clamp(MIN_CONSOLE_SIZE, MAX_CONSOLE_SIZE)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
