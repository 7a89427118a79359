//! Persisted user settings (live in the OS config directory).

use std::path::PathBuf;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::model::Granularity;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Timeline granularity restored on next launch.
    pub granularity: Granularity,
    /// Most recently opened schedule file.
    pub last_file: Option<PathBuf>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            granularity: Granularity::Day,
            last_file: None,
        }
    }
}

impl AppSettings {
    /// Load settings, falling back to defaults on any failure. A missing
    /// file is normal on first launch and not logged.
    pub fn load() -> Self {
        let path = Self::settings_path();
        match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    warn!("ignoring malformed settings file {}: {e}", path.display());
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Persist settings; failures are logged, never surfaced to the user.
    pub fn save(&self) {
        let path = Self::settings_path();
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&path, json) {
                    warn!("failed to save settings to {}: {e}", path.display());
                }
            }
            Err(e) => warn!("failed to serialize settings: {e}"),
        }
    }

    fn settings_path() -> PathBuf {
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "Planboard") {
            proj_dirs.config_dir().join("settings.json")
        } else {
            PathBuf::from("settings.json")
        }
    }
}
