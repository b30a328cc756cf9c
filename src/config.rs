use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use tracing::Level;

/// Program configuration read from a configuration file
#[derive(Clone, Deserialize, Debug, Default, Eq, PartialEq)]
#[serde(default)]
pub(crate) struct Config {
    /// Which camera to use for the face challenge
    pub(crate) camera: CameraKind,

    /// Settings for the log file
    pub(crate) log: LogConfig,
}

impl Config {
    /// Return the default configuration file path
    pub(crate) fn default_path() -> Result<PathBuf, ConfigError> {
        dirs::config_local_dir()
            .map(|p| p.join("revivesnake").join("config.toml"))
            .ok_or(ConfigError::NoPath)
    }

    /// Read configuration from a file on disk.  If the file does not exist and
    /// `allow_missing` is true, a default `Config` value is returned.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the file could not be read or if the file's contents
    /// could not be deserialized.
    pub(crate) fn load(path: &Path, allow_missing: bool) -> Result<Config, ConfigError> {
        let content = match fs_err::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && allow_missing => {
                return Ok(Config::default())
            }
            Err(e) => return Err(ConfigError::Read(e)),
        };
        toml::from_str(&content).map_err(Into::into)
    }
}

#[derive(Clone, Copy, Deserialize, Debug, Default, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum CameraKind {
    /// A synthetic video feed whose "face" is steered with the arrow keys
    #[default]
    Simulated,

    /// No camera; only the math challenge can be used
    None,
}

#[derive(Clone, Deserialize, Debug, Eq, PartialEq)]
#[serde(default)]
pub(crate) struct LogConfig {
    /// Whether to write a log file at all
    pub(crate) enabled: bool,

    /// Path to the log file.  If not set, [`LogConfig::default_file()`] is
    /// used.
    pub(crate) file: Option<PathBuf>,

    /// Only log events at this level or more severe
    pub(crate) level: LogLevel,
}

impl LogConfig {
    /// Return the default log file path
    pub(crate) fn default_file() -> Option<PathBuf> {
        dirs::data_local_dir().map(|p| p.join("revivesnake").join("revivesnake.log"))
    }
}

impl Default for LogConfig {
    fn default() -> LogConfig {
        LogConfig {
            enabled: true,
            file: None,
            level: LogLevel::default(),
        }
    }
}

/// A `tracing` verbosity level, as written in the configuration file or on
/// the command line
#[derive(Clone, Copy, Deserialize, Debug, Eq, PartialEq)]
#[serde(try_from = "String")]
pub(crate) struct LogLevel(Level);

impl LogLevel {
    pub(crate) fn filter(self) -> LevelFilter {
        LevelFilter::from_level(self.0)
    }
}

impl Default for LogLevel {
    fn default() -> LogLevel {
        LogLevel(Level::INFO)
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LogLevel {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<LogLevel, ParseLevelError> {
        // Numeric levels are accepted by `tracing` but not by us
        match s.parse::<Level>() {
            Ok(level) if !s.trim().starts_with(|c: char| c.is_ascii_digit()) => Ok(LogLevel(level)),
            _ => Err(ParseLevelError(s.to_owned())),
        }
    }
}

impl TryFrom<String> for LogLevel {
    type Error = ParseLevelError;

    fn try_from(s: String) -> Result<LogLevel, ParseLevelError> {
        s.parse()
    }
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("invalid log level {0:?}; expected one of: trace, debug, info, warn, error")]
pub(crate) struct ParseLevelError(String);

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to determine path to local configuration directory")]
    NoPath,
    #[error("failed to read configuration file")]
    Read(#[from] std::io::Error),
    #[error("failed to parse configuration file")]
    Parse(#[from] toml::de::Error),
}
