//! Board configuration: defaults, optional TOML file, environment overrides.
//!
//! # Responsibility
//! - Resolve where durable storage and logs live.
//! - Carry the optional activity log cap.
//!
//! # Invariants
//! - Precedence is defaults < file < environment; callers apply CLI flags last.
//! - Invalid environment values are ignored with a warning, never fatal.

use crate::logging::default_log_level;
use log::warn;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// File name of the durable SQLite database inside `data_dir`.
pub const DATABASE_FILE_NAME: &str = "taskboard.sqlite3";
/// File name of the optional config file inside the default data dir.
pub const CONFIG_FILE_NAME: &str = "config.toml";

pub const ENV_DATA_DIR: &str = "TASKBOARD_DATA_DIR";
pub const ENV_LOG_LEVEL: &str = "TASKBOARD_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "TASKBOARD_LOG_DIR";
pub const ENV_MAX_ACTIVITY_ENTRIES: &str = "TASKBOARD_MAX_ACTIVITY_ENTRIES";

/// Fully resolved runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    pub data_dir: PathBuf,
    pub log_level: String,
    /// Defaults to `<data_dir>/logs` when unset.
    pub log_dir: Option<PathBuf>,
    /// `None` keeps the activity log unbounded.
    pub max_activity_entries: Option<usize>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level().to_string(),
            log_dir: None,
            max_activity_entries: None,
        }
    }
}

impl BoardConfig {
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE_NAME)
    }

    pub fn effective_log_dir(&self) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("logs"))
    }
}

/// One partial configuration source (a TOML file).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayer {
    pub data_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_dir: Option<PathBuf>,
    pub max_activity_entries: Option<usize>,
}

impl ConfigLayer {
    pub fn apply_to(self, config: &mut BoardConfig) {
        if let Some(data_dir) = self.data_dir {
            config.data_dir = data_dir;
        }
        if let Some(log_level) = self.log_level {
            config.log_level = log_level;
        }
        if self.log_dir.is_some() {
            config.log_dir = self.log_dir;
        }
        if self.max_activity_entries.is_some() {
            config.max_activity_entries = self.max_activity_entries;
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse config `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
        }
    }
}

/// `$HOME/.taskboard`, or `.taskboard` under the working directory.
pub fn default_data_dir() -> PathBuf {
    match std::env::var_os("HOME").filter(|home| !home.is_empty()) {
        Some(home) => PathBuf::from(home).join(".taskboard"),
        None => std::env::current_dir()
            .unwrap_or_default()
            .join(".taskboard"),
    }
}

/// Loads configuration from process environment and an optional file.
///
/// An explicit `path` must exist; otherwise `<default data dir>/config.toml`
/// is read when present.
pub fn load(path: Option<&Path>) -> Result<BoardConfig, ConfigError> {
    let layer = match path {
        Some(path) => Some(load_layer(path)?),
        None => {
            let implicit = default_data_dir().join(CONFIG_FILE_NAME);
            if implicit.exists() {
                Some(load_layer(&implicit)?)
            } else {
                None
            }
        }
    };

    let mut config = BoardConfig::default();
    if let Some(layer) = layer {
        layer.apply_to(&mut config);
    }
    apply_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

/// Parses one TOML config file.
pub fn load_layer(path: &Path) -> Result<ConfigLayer, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Applies `TASKBOARD_*` overrides read through `lookup`.
pub fn apply_overrides<F>(config: &mut BoardConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| {
        lookup(key)
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
    };

    if let Some(raw) = non_empty(ENV_DATA_DIR) {
        config.data_dir = PathBuf::from(raw);
    }
    if let Some(raw) = non_empty(ENV_LOG_LEVEL) {
        config.log_level = raw;
    }
    if let Some(raw) = non_empty(ENV_LOG_DIR) {
        config.log_dir = Some(PathBuf::from(raw));
    }
    if let Some(raw) = non_empty(ENV_MAX_ACTIVITY_ENTRIES) {
        match raw.parse::<usize>() {
            Ok(value) => config.max_activity_entries = Some(value),
            Err(err) => warn!("invalid {ENV_MAX_ACTIVITY_ENTRIES}, ignoring: {err}"),
        }
    }
}
