//! Runtime paths and log level.
//!
//! # Responsibility
//! - Resolve data directory, database file and log directory.
//! - Apply `PNOTES_*` environment overrides on top of defaults.
//!
//! # Invariants
//! - Every resolved path is absolute.
//! - Resolution never touches the filesystem; `ensure_dirs` does.

use crate::logging::{default_log_level, normalize_level};
use crate::service::legacy_import::LEGACY_FILE_NAME;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const DATA_DIR_ENV: &str = "PNOTES_DATA_DIR";
pub const DB_PATH_ENV: &str = "PNOTES_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "PNOTES_LOG_LEVEL";

const DEFAULT_DIR_NAME: &str = ".pnotes";
const DB_FILE_NAME: &str = "notes.db";
const LOG_DIR_NAME: &str = "logs";

#[derive(Debug)]
pub enum ConfigError {
    /// No home directory and no `PNOTES_DATA_DIR` override.
    NoHomeDir,
    /// An override resolved to a relative path.
    RelativePath { var: &'static str, value: PathBuf },
    InvalidLogLevel(String),
    Io(std::io::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoHomeDir => write!(
                f,
                "home directory not found; set {DATA_DIR_ENV} to choose a data directory"
            ),
            Self::RelativePath { var, value } => {
                write!(f, "{var} must be an absolute path, got `{}`", value.display())
            }
            Self::InvalidLogLevel(message) => write!(f, "{message}"),
            Self::Io(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: &'static str,
}

impl CoreConfig {
    /// Defaults rooted at `data_dir`, which must be absolute.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        absolute("data_dir", data_dir.into()).map(Self::rooted_at)
    }

    fn rooted_at(data_dir: PathBuf) -> Self {
        Self {
            db_path: data_dir.join(DB_FILE_NAME),
            log_dir: data_dir.join(LOG_DIR_NAME),
            data_dir,
            log_level: default_log_level(),
        }
    }

    /// Resolves from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok(), dirs::home_dir())
    }

    /// Resolves from `lookup` and `home`; empty values count as unset.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        home: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let data_dir = match read(DATA_DIR_ENV) {
            Some(value) => absolute(DATA_DIR_ENV, PathBuf::from(value.trim()))?,
            None => home.ok_or(ConfigError::NoHomeDir)?.join(DEFAULT_DIR_NAME),
        };
        let mut config = Self::rooted_at(data_dir);

        if let Some(value) = read(DB_PATH_ENV) {
            config.db_path = absolute(DB_PATH_ENV, PathBuf::from(value.trim()))?;
        }
        if let Some(value) = read(LOG_LEVEL_ENV) {
            config.log_level = normalize_level(&value).map_err(ConfigError::InvalidLogLevel)?;
        }
        Ok(config)
    }

    /// Location of the pre-SQLite JSON store.
    pub fn legacy_json_path(&self) -> PathBuf {
        self.data_dir.join(LEGACY_FILE_NAME)
    }

    /// Creates the data, database-parent and log directories.
    pub fn ensure_dirs(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.data_dir)?;
        if let Some(parent) = self.db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::create_dir_all(&self.log_dir)?;
        Ok(())
    }
}

fn absolute(var: &'static str, value: PathBuf) -> Result<PathBuf, ConfigError> {
    if Path::new(&value).is_absolute() {
        Ok(value)
    } else {
        Err(ConfigError::RelativePath { var, value })
    }
}
