use crate::kernel::services::ports::settings::Settings;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "commit-search";
const SETTINGS_FILE: &str = "settings.json";
const LOG_DIR: &str = "logs";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("settings io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("cannot determine settings directory")]
    NoConfigDir,
}

pub fn get_settings_path() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join(APP_NAME).join(SETTINGS_FILE))
}

/// Writes default settings if the file does not exist yet.
pub fn ensure_settings_file() -> Result<PathBuf, SettingsError> {
    let path = get_settings_path().ok_or(SettingsError::NoConfigDir)?;
    let io_err = |source| SettingsError::Io {
        path: path.clone(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    if !path.exists() {
        let content = serde_json::to_string_pretty(&Settings::default()).map_err(|source| {
            SettingsError::Parse {
                path: path.clone(),
                source,
            }
        })?;
        std::fs::write(&path, content).map_err(io_err)?;
    }
    Ok(path)
}

/// Missing fields take their defaults; a missing file is an error.
pub fn load_settings(path: &Path) -> Result<Settings, SettingsError> {
    let data = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&data).map_err(|source| SettingsError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Explicit path first, then the per-user file, then defaults.
pub fn resolve_settings(explicit: Option<&Path>) -> Result<Settings, SettingsError> {
    if let Some(path) = explicit {
        return load_settings(path);
    }
    match get_settings_path() {
        Some(path) if path.exists() => load_settings(&path),
        _ => Ok(Settings::default()),
    }
}

pub fn get_log_dir() -> Option<PathBuf> {
    get_data_dir().map(|dir| dir.join(APP_NAME).join(LOG_DIR))
}

pub fn ensure_log_dir() -> std::io::Result<PathBuf> {
    let dir = get_log_dir().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "cannot determine log directory",
        )
    })?;
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

fn get_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        return std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join("Library/Application Support"));
    }

    #[cfg(target_os = "linux")]
    {
        if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            return Some(PathBuf::from(xdg));
        }
        return std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join(".config"));
    }

    #[cfg(target_os = "windows")]
    {
        return std::env::var("APPDATA").ok().map(PathBuf::from);
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        None
    }
}

fn get_data_dir() -> Option<PathBuf> {
    #[cfg(target_os = "linux")]
    {
        if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
            return Some(PathBuf::from(xdg));
        }
        return std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join(".local/share"));
    }

    #[cfg(not(target_os = "linux"))]
    {
        get_config_dir()
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/settings.rs"]
mod tests;
