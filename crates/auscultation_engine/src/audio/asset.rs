//! Fetched audio payloads
//!
//! A [`SoundData`] is the encoded file as fetched, validated by its magic
//! bytes. Actual decoding happens in the backend at instance creation.

use std::sync::Arc;

use crate::audio::AudioError;

/// Supported audio formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    /// WAV uncompressed
    Wav,
    /// OGG Vorbis compressed
    Ogg,
    /// MP3 compressed
    Mp3,
    /// FLAC lossless
    Flac,
}

impl AudioFormat {
    /// Sniff the container format from the leading bytes
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [b'R', b'I', b'F', b'F', ..] => Some(Self::Wav),
            [b'O', b'g', b'g', b'S', ..] => Some(Self::Ogg),
            [b'f', b'L', b'a', b'C', ..] => Some(Self::Flac),
            [b'I', b'D', b'3', ..] | [0xFF, 0xFB | 0xFA | 0xF3 | 0xF2, ..] => Some(Self::Mp3),
            _ => None,
        }
    }
}

/// Encoded audio payload ready to hand to a backend
#[derive(Debug, Clone)]
pub struct SoundData {
    bytes: Arc<[u8]>,
    format: AudioFormat,
}

impl SoundData {
    /// Validate fetched bytes for `resource`
    ///
    /// # Errors
    /// `DecodeFailed` when the payload is empty or not a known container.
    pub fn from_bytes(resource: &str, bytes: Vec<u8>) -> Result<Self, AudioError> {
        if bytes.is_empty() {
            return Err(AudioError::DecodeFailed {
                resource: resource.to_string(),
                reason: "empty payload".to_string(),
            });
        }

        let format = AudioFormat::sniff(&bytes).ok_or_else(|| AudioError::DecodeFailed {
            resource: resource.to_string(),
            reason: "unrecognized audio container".to_string(),
        })?;

        Ok(Self { bytes: bytes.into(), format })
    }

    /// Encoded bytes, shared between instances of the same payload
    pub fn bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    /// Detected container format
    pub fn format(&self) -> AudioFormat {
        self.format
    }

    /// Payload size in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the payload is empty (never true for a validated payload)
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
