use crate::core::config::data::{path_display, Config};
use directories::ProjectDirs;
use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Errors that can occur when loading configuration from disk.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    Read {
        /// Path to the configuration file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the configuration file as valid TOML.
    Parse {
        /// Path to the configuration file with invalid TOML.
        path: PathBuf,
        /// The TOML deserialization error.
        source: toml::de::Error,
    },

    /// No platform configuration directory could be determined.
    NoConfigDir,
}

impl ConfigError {
    fn display_path(path: &Path) -> String {
        path_display(path)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(
                    f,
                    "Failed to read config at {}: {}",
                    Self::display_path(path),
                    source
                )
            }
            ConfigError::Parse { path, source } => {
                write!(
                    f,
                    "Failed to parse config at {}: {}",
                    Self::display_path(path),
                    source
                )
            }
            ConfigError::NoConfigDir => {
                write!(f, "Could not determine a configuration directory; pass --config")
            }
        }
    }
}

impl StdError for ConfigError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::NoConfigDir => None,
        }
    }
}

impl Config {
    /// Load the file at `config_path`, falling back to defaults when it does not exist.
    pub fn load_from_path(config_path: &Path) -> Result<Config, ConfigError> {
        if config_path.exists() {
            Self::load_existing(config_path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load the file at `config_path`; a missing file is an error.
    pub fn load_existing(config_path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
            path: config_path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents, config_path)
    }

    pub(crate) fn parse(contents: &str, config_path: &Path) -> Result<Config, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: config_path.to_path_buf(),
            source,
        })
    }

    /// Resolve the configuration for this run.
    ///
    /// An explicit path must exist. Without one, the platform config file is
    /// used if present and defaults otherwise.
    pub fn resolve(explicit: Option<&Path>) -> Result<(Config, PathBuf), ConfigError> {
        match explicit {
            Some(path) => Ok((Self::load_existing(path)?, path.to_path_buf())),
            None => {
                let path = Self::default_config_path().ok_or(ConfigError::NoConfigDir)?;
                Ok((Self::load_from_path(&path)?, path))
            }
        }
    }

    pub fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
    }

    pub fn default_log_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.cache_dir().join("dggterm.log"))
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("gg", "dggterm", "dggterm")
}
