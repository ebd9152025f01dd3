//! Synthesized sound payloads
//!
//! Lets the simulator run without audio assets: every resource reference maps
//! to a short looping sine tone whose pitch is derived from the reference, so
//! different sounds stay distinguishable on a real output device.

use std::f32::consts::TAU;
use std::future::Future;

use auscultation_engine::audio::fetch::{FileFetcher, SoundFetcher};
use auscultation_engine::audio::AudioError;

/// Builds 16-bit mono WAV tones on demand
#[derive(Debug, Clone)]
pub struct ToneFetcher {
    sample_rate: u32,
    duration_secs: f32,
}

impl ToneFetcher {
    /// Create a fetcher producing one-second tones at `sample_rate`
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            duration_secs: 1.0,
        }
    }

    /// Pitch assigned to a resource reference
    pub fn frequency_for(resource: &str) -> f32 {
        // FNV-1a
        let hash = resource
            .bytes()
            .fold(0xcbf2_9ce4_8422_2325_u64, |hash, byte| {
                (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
            });
        110.0 * 2f32.powf((hash % 24) as f32 / 12.0)
    }

    /// Render the WAV payload for a resource
    pub fn render(&self, resource: &str) -> Vec<u8> {
        let frequency = Self::frequency_for(resource);
        let samples = (self.sample_rate as f32 * self.duration_secs) as u32;
        let data_len = samples * 2;

        let mut wav = Vec::with_capacity(44 + data_len as usize);
        wav.extend_from_slice(b"RIFF");
        wav.extend_from_slice(&(36 + data_len).to_le_bytes());
        wav.extend_from_slice(b"WAVEfmt ");
        wav.extend_from_slice(&16u32.to_le_bytes());
        wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
        wav.extend_from_slice(&1u16.to_le_bytes()); // mono
        wav.extend_from_slice(&self.sample_rate.to_le_bytes());
        wav.extend_from_slice(&(self.sample_rate * 2).to_le_bytes());
        wav.extend_from_slice(&2u16.to_le_bytes());
        wav.extend_from_slice(&16u16.to_le_bytes());
        wav.extend_from_slice(b"data");
        wav.extend_from_slice(&data_len.to_le_bytes());

        for n in 0..samples {
            let t = n as f32 / self.sample_rate as f32;
            let sample = (TAU * frequency * t).sin() * 0.25 * f32::from(i16::MAX);
            wav.extend_from_slice(&(sample as i16).to_le_bytes());
        }
        wav
    }
}

impl SoundFetcher for ToneFetcher {
    fn fetch(&self, resource: &str) -> impl Future<Output = Result<Vec<u8>, AudioError>> + Send {
        let wav = self.render(resource);
        async move { Ok(wav) }
    }
}

/// The configured payload source
#[derive(Debug, Clone)]
pub enum PayloadSource {
    /// Synthesized tones
    Tone(ToneFetcher),
    /// Files on disk
    Files(FileFetcher),
}

impl SoundFetcher for PayloadSource {
    fn fetch(&self, resource: &str) -> impl Future<Output = Result<Vec<u8>, AudioError>> + Send {
        async move {
            match self {
                Self::Tone(tones) => tones.fetch(resource).await,
                Self::Files(files) => files.fetch(resource).await,
            }
        }
    }
}
