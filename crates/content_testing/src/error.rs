//! Error types for content-test resolution.

use std::path::PathBuf;

use content_testing_contract::ProviderError;
use thiserror::Error;

#[derive(Debug, Error)]
/// Settings could not be read or parsed.
pub enum ConfigError {
    /// The settings file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        /// Settings file path.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The settings file is not valid TOML for [`ContentTestingSettings`](crate::ContentTestingSettings).
    #[error("failed to parse {}: {source}", .path.display())]
    ParseFile {
        /// Settings file path.
        path: PathBuf,
        /// Underlying TOML failure.
        #[source]
        source: toml::de::Error,
    },
    /// Inline settings text is not valid TOML.
    #[error("failed to parse content testing settings: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Error)]
/// Failures surfaced by resolution. Missing tests, fields, or versions are never errors.
pub enum ContentTestingError {
    /// The item store failed; failure policy belongs to the calling pipeline.
    #[error(transparent)]
    Provider(#[from] ProviderError),
    /// Settings were invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
