//! Content-testing settings and their TOML loader.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::error::ConfigError;

/// Name of the administrative site that never sees test variants.
pub const DEFAULT_SHELL_SITE_NAME: &str = "shell";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
/// Settings captured once when a [`ResolutionOrchestrator`](crate::ResolutionOrchestrator) is
/// built.
pub struct ContentTestingSettings {
    /// Master switch for automatic content testing.
    pub automatic_testing_enabled: bool,
    /// Whether decisions are memoized in the request cache.
    pub allow_cache: bool,
    /// Site name treated as the administrative shell.
    pub shell_site_name: String,
}

impl Default for ContentTestingSettings {
    fn default() -> Self {
        Self {
            automatic_testing_enabled: true,
            allow_cache: true,
            shell_site_name: DEFAULT_SHELL_SITE_NAME.to_string(),
        }
    }
}

impl ContentTestingSettings {
    /// Parses settings from TOML text; absent keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for invalid TOML or unknown keys.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Returns a copy with caching switched on or off.
    pub fn with_allow_cache(mut self, allow_cache: bool) -> Self {
        self.allow_cache = allow_cache;
        self
    }

    /// Returns a copy with automatic testing switched on or off.
    pub fn with_testing_enabled(mut self, enabled: bool) -> Self {
        self.automatic_testing_enabled = enabled;
        self
    }
}

/// File-backed settings loader.
///
/// Handles only filesystem access and TOML deserialization.
#[derive(Clone, Debug)]
pub struct SettingsLoader {
    path: PathBuf,
}

impl SettingsLoader {
    /// Creates a loader for `relative_path` under `root`.
    pub fn new(root: &Path, relative_path: &str) -> Self {
        Self {
            path: root.join(relative_path),
        }
    }

    /// Reads and deserializes the settings file.
    ///
    /// # Errors
    ///
    /// Missing or unreadable files surface as [`ConfigError::Read`], TOML failures as
    /// [`ConfigError::ParseFile`].
    pub fn load(&self) -> Result<ContentTestingSettings, ConfigError> {
        let body = fs::read_to_string(&self.path).map_err(|source| ConfigError::Read {
            path: self.path.clone(),
            source,
        })?;
        toml::from_str(&body).map_err(|source| ConfigError::ParseFile {
            path: self.path.clone(),
            source,
        })
    }

    /// Returns the settings path on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
