//=========================================================================
// Framework Options
//=========================================================================
//
// Serializable options consumed by the framework builder. Every field has
// a default, so a TOML file only needs the keys it changes.
//
// Example (options.toml):
// ```toml
// initial_scene = "Menu"
// view_suffix = "SceneView"
// reclaim_memory_before_load = true
// unhandled_commands = "warn"
// singleton_replacement = "silent"
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

//=== Internal Dependencies ===============================================

use crate::core::command_bus::UnhandledCommands;
use crate::core::registry::SingletonReplacement;
use crate::core::scene::SceneSettings;

//=== ConfigError =========================================================

/// Errors raised while loading or saving options.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid option: {0}")]
    Invalid(String),
}

//=== FrameworkOptions ====================================================

/// Options shared by the framework, its scopes and the scene controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameworkOptions {
    /// Scene requested as soon as the framework is built.
    pub initial_scene: Option<String>,

    /// Suffix appended to a scene name to find its view.
    pub view_suffix: String,

    /// Hint the environment to reclaim memory before each scene load.
    pub reclaim_memory_before_load: bool,

    /// Command bus policy for commands without a handler.
    pub unhandled_commands: UnhandledCommands,

    /// Scope policy when a singleton type is registered twice.
    pub singleton_replacement: SingletonReplacement,
}

impl Default for FrameworkOptions {
    fn default() -> Self {
        let scenes = SceneSettings::default();
        Self {
            initial_scene: None,
            view_suffix: scenes.view_suffix,
            reclaim_memory_before_load: scenes.reclaim_memory_before_load,
            unhandled_commands: UnhandledCommands::default(),
            singleton_replacement: SingletonReplacement::default(),
        }
    }
}

impl FrameworkOptions {
    //--- Loading ----------------------------------------------------------

    /// Parses and validates options from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let options: Self = toml::from_str(contents)?;
        options.validate()?;
        Ok(options)
    }

    /// Reads, parses and validates an options file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Serializes the options to TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    //--- Validation -------------------------------------------------------

    /// Checks values serde cannot reject on its own.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.view_suffix.trim().is_empty() {
            return Err(ConfigError::Invalid("view_suffix must not be empty".into()));
        }

        if let Some(scene) = &self.initial_scene {
            if scene.trim().is_empty() {
                return Err(ConfigError::Invalid("initial_scene must not be empty".into()));
            }
        }

        Ok(())
    }

    /// Scene controller settings derived from these options.
    pub fn scene_settings(&self) -> SceneSettings {
        SceneSettings {
            view_suffix: self.view_suffix.clone(),
            reclaim_memory_before_load: self.reclaim_memory_before_load,
            singleton_replacement: self.singleton_replacement,
        }
    }
}

//=========================================================================
// Tests
//=========================================================================
