//! Audio backend implementations
//!
//! Platform-independent abstraction over audio playback libraries. A backend
//! owns sound *instances*: one per loaded sound, created from a validated
//! payload, played and stopped any number of times, and finally disposed.

pub mod headless;
#[cfg(feature = "rodio")]
pub mod rodio_backend;

use serde::{Deserialize, Serialize};

use crate::audio::asset::SoundData;
use crate::audio::AudioError;

pub use headless::{BackendCall, HeadlessBackend};

slotmap::new_key_type! {
    /// Handle to a sound instance owned by a backend
    ///
    /// Handles are generational: once an instance is disposed its handle
    /// never resolves again, even if the slot is reused.
    pub struct SoundHandle;
}

/// Audio backend trait for platform abstraction
///
/// # Threading
/// Backends are driven from the single session event loop and are not
/// required to be `Send` or `Sync`.
pub trait AudioBackend {
    /// Initialize the audio backend
    fn initialize(&mut self, config: &AudioBackendConfig) -> Result<(), AudioError>;

    /// Shutdown the audio backend, stopping and releasing every instance
    fn shutdown(&mut self);

    /// Check if backend is initialized
    fn is_initialized(&self) -> bool;

    /// Create a looping, initially stopped instance from a payload
    fn create_instance(&mut self, name: &str, data: &SoundData) -> Result<SoundHandle, AudioError>;

    /// Start playback of an instance
    ///
    /// # Errors
    /// `InvalidHandle` when the instance was disposed.
    fn play(&mut self, handle: SoundHandle) -> Result<(), AudioError>;

    /// Stop playback of an instance (idempotent for live handles)
    ///
    /// # Errors
    /// `InvalidHandle` when the instance was disposed.
    fn stop(&mut self, handle: SoundHandle) -> Result<(), AudioError>;

    /// Release an instance; unknown handles are ignored
    fn dispose(&mut self, handle: SoundHandle);

    /// Check if an instance is currently playing (false for disposed handles)
    fn is_playing(&self, handle: SoundHandle) -> bool;

    /// Set the volume of an instance (0.0 = silent, 1.0 = full volume)
    fn set_volume(&mut self, handle: SoundHandle, volume: f32) -> Result<(), AudioError>;
}

impl<T: AudioBackend + ?Sized> AudioBackend for Box<T> {
    fn initialize(&mut self, config: &AudioBackendConfig) -> Result<(), AudioError> {
        (**self).initialize(config)
    }

    fn shutdown(&mut self) {
        (**self).shutdown();
    }

    fn is_initialized(&self) -> bool {
        (**self).is_initialized()
    }

    fn create_instance(&mut self, name: &str, data: &SoundData) -> Result<SoundHandle, AudioError> {
        (**self).create_instance(name, data)
    }

    fn play(&mut self, handle: SoundHandle) -> Result<(), AudioError> {
        (**self).play(handle)
    }

    fn stop(&mut self, handle: SoundHandle) -> Result<(), AudioError> {
        (**self).stop(handle)
    }

    fn dispose(&mut self, handle: SoundHandle) {
        (**self).dispose(handle);
    }

    fn is_playing(&self, handle: SoundHandle) -> bool {
        (**self).is_playing(handle)
    }

    fn set_volume(&mut self, handle: SoundHandle, volume: f32) -> Result<(), AudioError> {
        (**self).set_volume(handle, volume)
    }
}

/// Which backend implementation to construct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// In-memory backend without an output device
    #[default]
    Headless,
    /// Rodio output device (requires the `rodio` feature)
    Rodio,
}

/// Configuration for audio backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioBackendConfig {
    /// Backend implementation
    pub kind: BackendKind,
    /// Sample rate (e.g., 44100, 48000)
    pub sample_rate: u32,
    /// Number of output channels (1=mono, 2=stereo)
    pub channels: u16,
    /// Volume applied on top of spatial attenuation
    pub master_volume: f32,
}

impl Default for AudioBackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::Headless,
            sample_rate: 44100,
            channels: 2,
            master_volume: 1.0,
        }
    }
}

/// Create and initialize the backend selected by `config.kind`
///
/// # Errors
/// `BackendInitFailed` when the rodio backend is requested without the
/// `rodio` feature, or when the output device cannot be opened.
pub fn create_backend(config: &AudioBackendConfig) -> Result<Box<dyn AudioBackend>, AudioError> {
    let mut backend: Box<dyn AudioBackend> = match config.kind {
        BackendKind::Headless => Box::new(HeadlessBackend::new()),
        #[cfg(feature = "rodio")]
        BackendKind::Rodio => Box::new(rodio_backend::RodioBackend::new()),
        #[cfg(not(feature = "rodio"))]
        BackendKind::Rodio => {
            return Err(AudioError::BackendInitFailed(
                "built without the `rodio` feature".to_string(),
            ))
        }
    };
    backend.initialize(config)?;
    Ok(backend)
}
