//! Audio subsystem
//!
//! Platform-independent playback primitives, resource fetching, payload
//! sniffing and distance attenuation for trigger-attached sounds.

pub mod asset;
pub mod backend;
pub mod fetch;
pub mod spatial;

use thiserror::Error;

/// Errors raised by audio backends and resource fetchers
#[derive(Debug, Error)]
pub enum AudioError {
    /// Backend used before `initialize`
    #[error("Audio backend not initialized")]
    BackendNotInitialized,

    /// Backend failed to open an output device
    #[error("Audio backend initialization failed: {0}")]
    BackendInitFailed(String),

    /// Handle refers to a disposed or unknown instance
    #[error("Invalid sound handle")]
    InvalidHandle,

    /// Playback could not be started
    #[error("Playback failed: {0}")]
    PlaybackFailed(String),

    /// Resource bytes could not be fetched
    #[error("Failed to fetch '{resource}': {reason}")]
    FetchFailed {
        /// Resource reference that failed
        resource: String,
        /// Underlying cause
        reason: String,
    },

    /// Resource bytes are not a playable audio payload
    #[error("Failed to decode '{resource}': {reason}")]
    DecodeFailed {
        /// Resource reference that failed
        resource: String,
        /// Underlying cause
        reason: String,
    },
}
