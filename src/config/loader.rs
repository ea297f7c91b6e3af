//! Locating and reading the configuration file.

use std::path::{Path, PathBuf};

use super::SplitterConfig;

/// File name looked up in the current directory.
pub const LOCAL_CONFIG_FILE: &str = ".coq-defsplit.toml";

/// Where configuration is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// A file named with `--config`. It has to exist.
    Explicit(PathBuf),
    /// The first of these files that exists, or built-in defaults if none
    /// does. Earlier entries win.
    Discovered(Vec<PathBuf>),
}

impl Default for ConfigSource {
    fn default() -> Self {
        Self::discover()
    }
}

impl ConfigSource {
    /// Look in `./.coq-defsplit.toml`, then
    /// `<config dir>/coq-defsplit/config.toml`.
    #[must_use]
    pub fn discover() -> Self {
        let user = dirs::config_dir().map(|dir| dir.join("coq-defsplit").join("config.toml"));
        Self::Discovered(
            std::iter::once(PathBuf::from(LOCAL_CONFIG_FILE))
                .chain(user)
                .collect(),
        )
    }

    /// The source selected by an optional `--config` argument.
    #[must_use]
    pub fn from_cli(path: Option<PathBuf>) -> Self {
        path.map_or_else(Self::discover, Self::Explicit)
    }

    /// The file that will be read, if any.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if an explicit file does not exist.
    pub fn resolve(&self) -> Result<Option<&Path>, ConfigError> {
        match self {
            Self::Explicit(path) if path.is_file() => Ok(Some(path)),
            Self::Explicit(path) => Err(ConfigError::Missing { path: path.clone() }),
            Self::Discovered(candidates) => Ok(candidates
                .iter()
                .map(PathBuf::as_path)
                .find(|path| path.is_file())),
        }
    }

    /// Read the configuration, falling back to defaults when discovery
    /// finds nothing.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an explicit file is missing, or if the
    /// selected file cannot be read or parsed.
    pub fn load(&self) -> Result<SplitterConfig, ConfigError> {
        let Some(path) = self.resolve()? else {
            tracing::debug!("No config file found, using defaults");
            return Ok(SplitterConfig::default());
        };

        tracing::debug!(path = %path.display(), "Loading config file");
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        SplitterConfig::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file {path} does not exist")]
    Missing { path: PathBuf },

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
