//! Configuration file loading for the CLI
//!
//! This module handles finding and loading TOML configuration files
//! from various locations (explicit path, local directory, system directory).

use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use collage::{CollageError, config::AppConfig};

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),
}

impl From<ConfigError> for CollageError {
    fn from(err: ConfigError) -> Self {
        CollageError::Config(err.to_string())
    }
}

/// Where a configuration file was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigSource {
    Explicit,
    Local,
    System,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Explicit => "explicit",
            Self::Local => "local",
            Self::System => "system",
        };
        f.write_str(name)
    }
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (collage/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, CollageError> {
    let explicit = explicit_path.map(|path| path.as_ref().to_path_buf());

    match discover(explicit) {
        Some((source, path)) => {
            info!(source:%, path = path.display().to_string(); "Loading configuration");
            load_config_file(&path)
        }
        None => {
            debug!("No configuration file found, using default configuration");
            Ok(AppConfig::default())
        }
    }
}

/// The configuration file to use, if any.
///
/// An explicit path is returned even if it does not exist, so that loading
/// it reports the missing file.
fn discover(explicit: Option<PathBuf>) -> Option<(ConfigSource, PathBuf)> {
    if let Some(path) = explicit {
        return Some((ConfigSource::Explicit, path));
    }

    let local = PathBuf::from("collage/config.toml");
    if local.exists() {
        return Some((ConfigSource::Local, local));
    }

    let Some(dirs) = ProjectDirs::from("com", "collage", "collage") else {
        debug!("Could not determine platform-specific config directory");
        return None;
    };
    let system = dirs.config_dir().join("config.toml");
    if system.exists() {
        return Some((ConfigSource::System, system));
    }

    debug!(path = system.display().to_string(); "System configuration file not found");
    None
}

/// Load configuration from a TOML file
fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, CollageError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

fn parse_config(content: &str) -> Result<AppConfig, CollageError> {
    let config: AppConfig =
        toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
    Ok(config)
}
