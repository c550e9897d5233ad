//! Highlighter configuration persistence
//!
//! Stores user preferences in `~/.config/hlstream/config.yaml`

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::engine::PLAINTEXT;

/// Highlighter configuration that persists across runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightConfig {
    /// Language used when none is given (e.g., "plaintext", "html")
    #[serde(default = "default_language")]
    pub default_language: String,

    /// Keep highlighting over syntax errors instead of failing
    #[serde(default = "default_ignore_illegals")]
    pub ignore_illegals: bool,

    /// Extra names for registered languages (alias -> language)
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

fn default_language() -> String {
    PLAINTEXT.to_string()
}

fn default_ignore_illegals() -> bool {
    true
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            default_language: default_language(),
            ignore_illegals: default_ignore_illegals(),
            aliases: BTreeMap::new(),
        }
    }
}

impl HighlightConfig {
    /// Load config from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load config from `path`, falling back to defaults on any problem
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_yaml::from_str(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config at {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<(), String> {
        let path = crate::config_paths::config_file()
            .ok_or_else(|| "No config directory available".to_string())?;
        self.save_to(&path)
    }

    /// Save config to `path`
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        let content = serde_yaml::to_string(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        std::fs::write(path, content)
            .map_err(|e| format!("Failed to write config to {}: {}", path.display(), e))?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }
}
