//! Rodio audio backend implementation
//!
//! Uses the Rodio library for cross-platform audio playback.
//! Rodio is pure Rust and supports WAV, OGG Vorbis, MP3, and FLAC formats.
//! Every instance loops until stopped; a stopped instance keeps its payload
//! so it can be started again without refetching.
//!
//! # Example
//!
//! ```no_run
//! use auscultation_engine::audio::asset::SoundData;
//! use auscultation_engine::audio::backend::{AudioBackend, AudioBackendConfig};
//! use auscultation_engine::audio::backend::rodio_backend::RodioBackend;
//!
//! let mut backend = RodioBackend::new();
//! backend.initialize(&AudioBackendConfig::default()).unwrap();
//!
//! let bytes = std::fs::read("assets/audio/Normal_heart.mp3").unwrap();
//! let data = SoundData::from_bytes("Normal_heart.mp3", bytes).unwrap();
//! let handle = backend.create_instance("Normal Heart", &data).unwrap();
//! backend.play(handle).unwrap();
//! ```

use std::io::Cursor;
use std::sync::Arc;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use slotmap::SlotMap;

use super::{AudioBackend, AudioBackendConfig, SoundHandle};
use crate::audio::asset::SoundData;
use crate::audio::AudioError;

/// A loaded instance and its sink while playing
struct RodioVoice {
    name: String,
    bytes: Arc<[u8]>,
    sink: Option<Sink>,
    volume: f32,
}

/// Rodio-based audio backend
pub struct RodioBackend {
    /// Audio output stream (must be kept alive)
    _output_stream: Option<OutputStream>,
    /// Output stream handle for creating sinks
    stream_handle: Option<OutputStreamHandle>,
    /// Loaded instances
    voices: SlotMap<SoundHandle, RodioVoice>,
    /// Volume multiplier applied to every sink
    master_volume: f32,
}

impl RodioBackend {
    /// Create a new, uninitialized Rodio backend
    pub fn new() -> Self {
        Self {
            _output_stream: None,
            stream_handle: None,
            voices: SlotMap::with_key(),
            master_volume: 1.0,
        }
    }

    fn start_sink(&self, voice: &RodioVoice) -> Result<Sink, AudioError> {
        let stream_handle = self.stream_handle.as_ref().ok_or(AudioError::BackendNotInitialized)?;

        let sink = Sink::try_new(stream_handle)
            .map_err(|e| AudioError::PlaybackFailed(format!("Failed to create sink: {e}")))?;
        let source = Decoder::new_looped(Cursor::new(Arc::clone(&voice.bytes)))
            .map_err(|e| AudioError::PlaybackFailed(format!("Failed to decode '{}': {e}", voice.name)))?;

        sink.set_volume(voice.volume * self.master_volume);
        sink.append(source);
        Ok(sink)
    }
}

impl Default for RodioBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioBackend for RodioBackend {
    fn initialize(&mut self, config: &AudioBackendConfig) -> Result<(), AudioError> {
        if self.stream_handle.is_some() {
            return Ok(());
        }

        let (stream, stream_handle) = OutputStream::try_default()
            .map_err(|e| AudioError::BackendInitFailed(format!("Failed to create audio output: {e}")))?;

        self._output_stream = Some(stream);
        self.stream_handle = Some(stream_handle);
        self.master_volume = config.master_volume.max(0.0);

        log::info!("Rodio audio backend initialized");
        Ok(())
    }

    fn shutdown(&mut self) {
        if self.stream_handle.is_none() {
            return;
        }

        for (_handle, voice) in self.voices.drain() {
            if let Some(sink) = voice.sink {
                sink.stop();
            }
        }

        self.stream_handle = None;
        self._output_stream = None;

        log::info!("Rodio audio backend shutdown");
    }

    fn is_initialized(&self) -> bool {
        self.stream_handle.is_some()
    }

    fn create_instance(&mut self, name: &str, data: &SoundData) -> Result<SoundHandle, AudioError> {
        if self.stream_handle.is_none() {
            return Err(AudioError::BackendNotInitialized);
        }

        // Surface decode errors at load time rather than on first touch
        Decoder::new(Cursor::new(data.bytes())).map_err(|e| AudioError::DecodeFailed {
            resource: name.to_string(),
            reason: e.to_string(),
        })?;

        Ok(self.voices.insert(RodioVoice {
            name: name.to_string(),
            bytes: data.bytes(),
            sink: None,
            volume: 1.0,
        }))
    }

    fn play(&mut self, handle: SoundHandle) -> Result<(), AudioError> {
        let voice = self.voices.get(handle).ok_or(AudioError::InvalidHandle)?;
        if voice.sink.as_ref().is_some_and(|sink| !sink.empty()) {
            return Ok(());
        }

        let sink = self.start_sink(voice)?;
        if let Some(voice) = self.voices.get_mut(handle) {
            voice.sink = Some(sink);
        }
        Ok(())
    }

    fn stop(&mut self, handle: SoundHandle) -> Result<(), AudioError> {
        let voice = self.voices.get_mut(handle).ok_or(AudioError::InvalidHandle)?;
        if let Some(sink) = voice.sink.take() {
            sink.stop();
        }
        Ok(())
    }

    fn dispose(&mut self, handle: SoundHandle) {
        if let Some(voice) = self.voices.remove(handle) {
            if let Some(sink) = voice.sink {
                sink.stop();
            }
        }
    }

    fn is_playing(&self, handle: SoundHandle) -> bool {
        self.voices
            .get(handle)
            .and_then(|voice| voice.sink.as_ref())
            .is_some_and(|sink| !sink.is_paused() && !sink.empty())
    }

    fn set_volume(&mut self, handle: SoundHandle, volume: f32) -> Result<(), AudioError> {
        let master = self.master_volume;
        let voice = self.voices.get_mut(handle).ok_or(AudioError::InvalidHandle)?;
        voice.volume = volume.max(0.0);
        if let Some(sink) = &voice.sink {
            sink.set_volume(voice.volume * master);
        }
        Ok(())
    }
}
