//! User settings persistence.
//!
//! The chat window remembers the last model picked; the file lives in the
//! user's config directory (e.g. `~/.config/screenlens/settings.json` on
//! Linux). Only UI preferences go here; conversation history is never
//! persisted.

use crate::error::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// User-configurable settings persisted between sessions.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Selected vision model name.
    pub model: String,
    /// Inference endpoint override (empty = use the environment config).
    #[serde(default)]
    pub endpoint: String,
}

impl Settings {
    /// Returns the path to the settings file.
    ///
    /// Creates the config directory if it doesn't exist.
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "screenlens").map(|dirs| {
            let config_dir = dirs.config_dir();
            if !config_dir.exists() {
                let _ = fs::create_dir_all(config_dir);
            }
            config_dir.join("settings.json")
        })
    }

    /// Loads settings from disk, falling back to defaults if not found.
    pub fn load(default_model: &str) -> Self {
        Self::config_path()
            .and_then(|path| fs::read_to_string(&path).ok())
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_else(|| Self::with_defaults(default_model))
    }

    /// Creates default settings with the specified model.
    pub fn with_defaults(model: &str) -> Self {
        Self {
            model: model.to_string(),
            endpoint: String::new(),
        }
    }

    /// Persists settings to disk.
    pub fn save(&self) -> Result<()> {
        if let Some(path) = Self::config_path() {
            let json = serde_json::to_string_pretty(self)?;
            fs::write(path, json)?;
        }
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::with_defaults(crate::config::DEFAULT_MODEL)
    }
}
