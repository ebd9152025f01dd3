//! Simulator configuration

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use auscultation_engine::audio::backend::AudioBackendConfig;
use auscultation_engine::config::{Config, ConfigError};
use auscultation_engine::foundation::logging::{self, LevelFilter};
use auscultation_engine::physics::TRIGGER_DIAMETER;
use auscultation_engine::sound::{CollectionDefinition, SoundCatalog, SoundKey};
use auscultation_engine::SessionConfig;

/// Output sample rates the simulator accepts
const SAMPLE_RATES: std::ops::RangeInclusive<u32> = 8_000..=192_000;

/// Where sound payloads come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundSource {
    /// Synthesized tones; no assets needed
    #[default]
    Tone,
    /// Files below `assets_root`
    Files,
}

/// Simulator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Log level filter (`RUST_LOG` overrides it)
    pub log_level: String,
    /// Root directory for sound files and model manifests
    pub assets_root: PathBuf,
    /// Audio backend selection and output settings
    pub audio: AudioBackendConfig,
    /// Payload source
    pub sound_source: SoundSource,
    /// Collection loaded at startup
    pub default_collection: String,
    /// Model manifest, relative to `assets_root`; built-in SAMII when absent
    pub model_manifest: Option<String>,
    /// Radius of a tracked controller volume
    pub controller_radius: f32,
    /// Radius of a trigger volume
    pub trigger_radius: f32,
    /// Scenario file; built-in walkthrough when absent
    pub scenario: Option<PathBuf>,
    /// Wall-clock seconds per scenario second (0 runs as fast as possible)
    pub time_scale: f64,
    /// Session behaviour
    pub session: SessionConfig,
    /// Registered collections, in panel order
    pub collections: Vec<CollectionDefinition>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            assets_root: PathBuf::from("assets"),
            audio: AudioBackendConfig::default(),
            sound_source: SoundSource::Tone,
            default_collection: "normal".to_string(),
            model_manifest: None,
            controller_radius: 0.05,
            trigger_radius: TRIGGER_DIAMETER / 2.0,
            scenario: None,
            time_scale: 0.0,
            session: SessionConfig::default(),
            collections: default_collections(),
        }
    }
}

impl Config for SimulatorConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let level = self.log_level.trim().to_ascii_lowercase();
        if !matches!(level.as_str(), "off" | "error" | "warn" | "warning" | "info" | "debug" | "trace") {
            return Err(ConfigError::Invalid(format!("unknown log level '{}'", self.log_level)));
        }
        if self.collections.is_empty() {
            return Err(ConfigError::Invalid("no sound collections configured".to_string()));
        }
        if !self.collections.iter().any(|c| c.name == self.default_collection) {
            return Err(ConfigError::Invalid(format!(
                "default collection '{}' is not configured",
                self.default_collection
            )));
        }
        if self.controller_radius <= 0.0 || self.trigger_radius <= 0.0 {
            return Err(ConfigError::Invalid("volume radii must be positive".to_string()));
        }
        if !(self.time_scale.is_finite() && self.time_scale >= 0.0) {
            return Err(ConfigError::Invalid("time_scale must be finite and non-negative".to_string()));
        }
        if !SAMPLE_RATES.contains(&self.audio.sample_rate) {
            return Err(ConfigError::Invalid(format!(
                "sample_rate {} is outside {}..={} Hz",
                self.audio.sample_rate,
                SAMPLE_RATES.start(),
                SAMPLE_RATES.end()
            )));
        }
        self.catalog().map(|_| ()).map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

impl SimulatorConfig {
    /// Log level filter for `env_logger`
    pub fn level_filter(&self) -> LevelFilter {
        logging::parse_level(&self.log_level)
    }

    /// Validated catalog of the configured collections
    pub fn catalog(&self) -> Result<SoundCatalog, auscultation_engine::sound::CollectionError> {
        SoundCatalog::new(self.collections.clone())
    }
}

/// The trainer's stock collections
pub fn default_collections() -> Vec<CollectionDefinition> {
    vec![
        CollectionDefinition::new("normal")
            .with_sound(SoundKey::Lung, "Normal Bronchial", "audio/Bronchial.mp3")
            .with_sound(SoundKey::Heart, "Normal Heart", "audio/Normal_heart.mp3")
            .with_sound(SoundKey::Crackles, "Fine Crackles", "audio/Crackles_Fine.mp3"),
        CollectionDefinition::new("intermediate")
            .with_sound(SoundKey::Lung, "Normal Bronchial", "audio/Bronchial.mp3")
            .with_sound(SoundKey::Heart, "Third Heart", "audio/Third_heart.mp3")
            .with_sound(SoundKey::Crackles, "Late Inspiratory Crackles", "audio/Crackles_Late_Inspiratory.mp3"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use auscultation_engine::config::ConfigFormat;

    #[test]
    fn test_default_config_is_valid() {
        let config = SimulatorConfig::default();
        config.validate().unwrap();
        assert_eq!(config.catalog().unwrap().names().collect::<Vec<_>>(), vec!["normal", "intermediate"]);
    }

    #[test]
    fn test_bundled_config_parses() {
        let contents = include_str!("../resources/simulator.toml");
        let config = SimulatorConfig::parse(contents, ConfigFormat::Toml).unwrap();
        assert_eq!(config.default_collection, "normal");
        assert_eq!(config.collections.len(), 2);
    }

    #[test]
    fn test_unknown_default_collection_is_invalid() {
        let config = SimulatorConfig {
            default_collection: "advanced".to_string(),
            ..SimulatorConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_non_finite_time_scale_is_invalid() {
        for time_scale in [f64::NAN, f64::INFINITY, -1.0] {
            let config = SimulatorConfig { time_scale, ..SimulatorConfig::default() };
            assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))), "{time_scale}");
        }
    }

    #[test]
    fn test_sample_rate_is_bounded() {
        let mut config = SimulatorConfig::default();
        config.audio.sample_rate = u32::MAX;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        config.audio.sample_rate = 0;
        assert!(config.validate().is_err());
        config.audio.sample_rate = 48_000;
        config.validate().unwrap();
    }

    #[test]
    fn test_toml_round_trip_keeps_collections() {
        let config = SimulatorConfig::default();
        let rendered = config.render(ConfigFormat::Toml).unwrap();
        let parsed = SimulatorConfig::parse(&rendered, ConfigFormat::Toml).unwrap();
        assert_eq!(parsed, config);
    }
}
