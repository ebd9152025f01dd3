//! Headless audio backend
//!
//! Keeps instance state in memory and records every call it receives. Used
//! for simulator runs without an output device and by the test suite to
//! observe exactly which play/stop calls the interaction layer issued.

use std::collections::HashSet;

use slotmap::SlotMap;

use super::{AudioBackend, AudioBackendConfig, SoundHandle};
use crate::audio::asset::SoundData;
use crate::audio::AudioError;

/// A call received by the headless backend
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    /// Instance created
    Create(SoundHandle, String),
    /// Play requested
    Play(SoundHandle),
    /// Stop requested
    Stop(SoundHandle),
    /// Instance disposed
    Dispose(SoundHandle),
    /// Volume changed
    SetVolume(SoundHandle, f32),
}

#[derive(Debug)]
struct Voice {
    name: String,
    playing: bool,
    volume: f32,
}

/// In-memory backend that records calls
#[derive(Debug)]
pub struct HeadlessBackend {
    voices: SlotMap<SoundHandle, Voice>,
    calls: Vec<BackendCall>,
    failing_names: HashSet<String>,
    initialized: bool,
}

impl HeadlessBackend {
    /// Create an initialized headless backend
    pub fn new() -> Self {
        Self {
            voices: SlotMap::with_key(),
            calls: Vec::new(),
            failing_names: HashSet::new(),
            initialized: true,
        }
    }

    /// Make `create_instance` fail for sounds with this display name
    pub fn fail_instances_named(&mut self, name: impl Into<String>) {
        self.failing_names.insert(name.into());
    }

    /// Every call received so far, in order
    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    /// Forget recorded calls (instance state is kept)
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Number of play calls received for a handle
    pub fn play_count(&self, handle: SoundHandle) -> usize {
        self.calls.iter().filter(|call| **call == BackendCall::Play(handle)).count()
    }

    /// Number of stop calls received for a handle
    pub fn stop_count(&self, handle: SoundHandle) -> usize {
        self.calls.iter().filter(|call| **call == BackendCall::Stop(handle)).count()
    }

    /// Number of instances not yet disposed
    pub fn live_instances(&self) -> usize {
        self.voices.len()
    }

    /// Display names of playing instances, sorted
    pub fn playing_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .voices
            .values()
            .filter(|voice| voice.playing)
            .map(|voice| voice.name.clone())
            .collect();
        names.sort();
        names
    }

    /// Display name of a live instance
    pub fn name_of(&self, handle: SoundHandle) -> Option<&str> {
        self.voices.get(handle).map(|voice| voice.name.as_str())
    }

    /// Current volume of a live instance
    pub fn volume(&self, handle: SoundHandle) -> Option<f32> {
        self.voices.get(handle).map(|voice| voice.volume)
    }

    fn voice_mut(&mut self, handle: SoundHandle) -> Result<&mut Voice, AudioError> {
        self.voices.get_mut(handle).ok_or(AudioError::InvalidHandle)
    }
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioBackend for HeadlessBackend {
    fn initialize(&mut self, config: &AudioBackendConfig) -> Result<(), AudioError> {
        log::debug!(
            "Headless audio backend initialized ({} Hz, {} channels)",
            config.sample_rate,
            config.channels
        );
        self.initialized = true;
        Ok(())
    }

    fn shutdown(&mut self) {
        if !self.initialized {
            return;
        }
        let handles: Vec<SoundHandle> = self.voices.keys().collect();
        for handle in handles {
            self.dispose(handle);
        }
        self.initialized = false;
        log::debug!("Headless audio backend shutdown");
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn create_instance(&mut self, name: &str, data: &SoundData) -> Result<SoundHandle, AudioError> {
        if !self.initialized {
            return Err(AudioError::BackendNotInitialized);
        }
        if self.failing_names.contains(name) {
            return Err(AudioError::DecodeFailed {
                resource: name.to_string(),
                reason: "rejected by headless backend".to_string(),
            });
        }

        let handle = self.voices.insert(Voice {
            name: name.to_string(),
            playing: false,
            volume: 1.0,
        });
        log::trace!("Created instance '{}' ({} bytes, {:?})", name, data.len(), data.format());
        self.calls.push(BackendCall::Create(handle, name.to_string()));
        Ok(handle)
    }

    fn play(&mut self, handle: SoundHandle) -> Result<(), AudioError> {
        self.voice_mut(handle)?.playing = true;
        self.calls.push(BackendCall::Play(handle));
        Ok(())
    }

    fn stop(&mut self, handle: SoundHandle) -> Result<(), AudioError> {
        self.voice_mut(handle)?.playing = false;
        self.calls.push(BackendCall::Stop(handle));
        Ok(())
    }

    fn dispose(&mut self, handle: SoundHandle) {
        if self.voices.remove(handle).is_some() {
            self.calls.push(BackendCall::Dispose(handle));
        }
    }

    fn is_playing(&self, handle: SoundHandle) -> bool {
        self.voices.get(handle).is_some_and(|voice| voice.playing)
    }

    fn set_volume(&mut self, handle: SoundHandle, volume: f32) -> Result<(), AudioError> {
        self.voice_mut(handle)?.volume = volume.max(0.0);
        self.calls.push(BackendCall::SetVolume(handle, volume));
        Ok(())
    }
}
