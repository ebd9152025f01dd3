//! Simulator errors

use std::path::PathBuf;

use thiserror::Error;

use auscultation_engine::audio::AudioError;
use auscultation_engine::config::ConfigError;
use auscultation_engine::sound::CollectionError;

/// Errors that end a simulator run
#[derive(Debug, Error)]
pub enum SimError {
    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Audio backend could not be created
    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    /// Sound catalog is invalid
    #[error("Collection error: {0}")]
    Collection(#[from] CollectionError),

    /// Scenario file could not be read
    #[error("Failed to read scenario '{path}': {source}")]
    ScenarioIo {
        /// Scenario path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Scenario file is not valid RON
    #[error("Failed to parse scenario '{path}': {reason}")]
    ScenarioParse {
        /// Scenario path
        path: PathBuf,
        /// Parser message
        reason: String,
    },
}
