//! Settings persistence
//!
//! Loads and saves [`BotSettings`] as JSON. The default location is
//! `settings.json` in the user's configuration directory; an explicit path
//! can be given on the command line.
//!
//! # Error Handling
//!
//! [`load_settings`] never fails: a missing or unreadable file falls back to
//! default settings with a warning. [`read_settings`] and [`save_settings`]
//! report errors to the caller.

use crate::core::error::CoreResult;
use crate::core::BotSettings;
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Settings filename
const SETTINGS_FILENAME: &str = "settings.json";

/// Helper to resolve the settings file path
///
/// Returns a path to `settings.json` in the user's configuration directory,
/// e.g. `~/.config/chessroom/settings.json`. Falls back to a local
/// `settings.json` if the system config dir cannot be found.
pub fn settings_path() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("com", "trilltino", "chessroom") {
        proj_dirs.config_dir().join(SETTINGS_FILENAME)
    } else {
        PathBuf::from(SETTINGS_FILENAME)
    }
}

/// Read settings from `path`, failing on I/O or parse errors.
pub fn read_settings(path: &Path) -> CoreResult<BotSettings> {
    let contents = fs::read_to_string(path)?;
    let settings = serde_json::from_str(&contents)?;
    Ok(settings)
}

/// Load settings from `path`, or from [`settings_path`] when none is given.
///
/// Missing or invalid files yield the defaults.
pub fn load_settings(path: Option<&Path>) -> BotSettings {
    let settings_path = path.map(Path::to_path_buf).unwrap_or_else(settings_path);

    if !settings_path.exists() {
        info!(
            "[SETTINGS] No settings file found at {:?}. Using defaults.",
            settings_path
        );
        return BotSettings::default();
    }

    match read_settings(&settings_path) {
        Ok(settings) => {
            info!("[SETTINGS] Loaded settings from {:?}", settings_path);
            settings
        }
        Err(e) => {
            warn!(
                "[SETTINGS] Failed to load settings file at {:?}: {}. Using defaults.",
                settings_path, e
            );
            BotSettings::default()
        }
    }
}

/// Write settings as pretty JSON, creating the parent directory if needed.
pub fn save_settings(settings: &BotSettings, path: &Path) -> CoreResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json)?;
    info!("[SETTINGS] Saved settings to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CoreError;

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings(Some(&dir.path().join("absent.json")));
        assert_eq!(settings, BotSettings::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let settings = BotSettings {
            command_prefix: "?".to_string(),
            announce_draws: true,
            ..Default::default()
        };
        save_settings(&settings, &path).unwrap();

        assert_eq!(load_settings(Some(&path)), settings);
    }

    #[test]
    fn test_invalid_file_is_an_error_for_read_but_not_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            read_settings(&path),
            Err(CoreError::SettingsSerialization(_))
        ));
        assert_eq!(load_settings(Some(&path)), BotSettings::default());
    }
}
