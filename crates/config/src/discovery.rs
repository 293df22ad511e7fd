//! Configuration file discovery and `.env` loading.
//!
//! Responsibilities:
//! - Load `.env` files through `dotenvy`, unless `DOTENV_DISABLED` is set.
//! - Decide which configuration document to read.
//!
//! Does NOT handle:
//! - Parsing the document (see `document`).
//!
//! Invariants:
//! - Precedence: explicit path > `SETTINGS_CONFIG_PATH` > platform default.
//! - The platform default is only returned when the file exists; an explicit
//!   or environment-provided path is returned as is.
//! - Missing `.env` files are silently ignored.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ConfigError;

/// Environment variable naming the configuration document.
pub const CONFIG_PATH_ENV: &str = "SETTINGS_CONFIG_PATH";

/// File name of the document inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "settings.json";

const APP_DIR_NAME: &str = "settings-chain";

fn dotenv_disabled() -> bool {
    matches!(
        std::env::var("DOTENV_DISABLED").ok().as_deref(),
        Some("true") | Some("1")
    )
}

fn is_not_found(err: &dotenvy::Error) -> bool {
    matches!(
        err,
        dotenvy::Error::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound
    )
}

/// Loads variables from a `.env` file in the current directory or a parent.
///
/// Skipped entirely when `DOTENV_DISABLED` is `true` or `1`.
///
/// # Errors
///
/// Returns [`ConfigError::DotenvParse`] or [`ConfigError::DotenvIo`] if the
/// file exists but cannot be used. Error messages never contain file content.
pub fn load_dotenv() -> Result<(), ConfigError> {
    if dotenv_disabled() {
        return Ok(());
    }

    match dotenvy::dotenv() {
        Ok(path) => {
            debug!(path = %path.display(), "Loaded .env file");
            Ok(())
        }
        Err(e) if is_not_found(&e) => Ok(()),
        Err(dotenvy::Error::LineParse(_, idx)) => Err(ConfigError::DotenvParse { error_index: idx }),
        Err(dotenvy::Error::Io(io_err)) => Err(ConfigError::DotenvIo {
            kind: io_err.kind(),
        }),
        Err(_) => Err(ConfigError::DotenvUnknown),
    }
}

/// Returns the platform path of the configuration document.
///
/// - Linux: `~/.config/settings-chain/settings.json`
/// - macOS: `~/Library/Application Support/settings-chain/settings.json`
/// - Windows: `%AppData%\settings-chain\config\settings.json`
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let dirs = directories::ProjectDirs::from("", "", APP_DIR_NAME).ok_or_else(|| {
        ConfigError::ConfigDirUnavailable("no home directory for the current user".to_string())
    })?;
    Ok(dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// Picks the configuration document to read, if any.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Ok(value) = std::env::var(CONFIG_PATH_ENV)
        && !value.trim().is_empty()
    {
        return Some(PathBuf::from(value.trim()));
    }

    match default_config_path() {
        Ok(path) if path.is_file() => Some(path),
        Ok(path) => {
            debug!(path = %path.display(), "No configuration document at default location");
            None
        }
        Err(err) => {
            debug!(error = %err, "Default configuration location unavailable");
            None
        }
    }
}
