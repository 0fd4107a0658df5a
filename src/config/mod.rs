//! Configuration management for mention-composer

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::ConfigError;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MentionConfig {
    pub trigger: TriggerConfig,
    pub dropdown: DropdownConfig,
    pub filter: FilterConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerConfig {
    /// Character that opens a mention session
    pub character: char,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self { character: '@' }
    }
}

/// Dropdown placement box, in host coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DropdownConfig {
    pub width: f32,
    pub height: f32,
    /// Minimum distance kept from the viewport edges
    pub margin: f32,
    /// Rows rendered before the "more" line
    pub max_visible: usize,
}

impl Default for DropdownConfig {
    fn default() -> Self {
        Self {
            width: 280.0,
            height: 250.0,
            margin: 4.0,
            max_visible: 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Also match the search text against candidate ids
    pub match_id: bool,
    /// Cap on the number of filtered candidates
    pub limit: Option<usize>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            match_id: true,
            limit: None,
        }
    }
}

impl MentionConfig {
    /// Load configuration from the default location
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from a file; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: MentionConfig = toml::from_str(&content)?;
            tracing::debug!(path = %path.display(), "Loaded config");
            Ok(config)
        } else {
            Ok(MentionConfig::default())
        }
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "mention-composer") {
            let config_dir = proj_dirs.config_dir();
            std::fs::create_dir_all(config_dir)?;
            Ok(config_dir.join("config.toml"))
        } else {
            Ok(PathBuf::from("config.toml"))
        }
    }

    /// Save configuration to default location
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_toml()?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
